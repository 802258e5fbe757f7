//! Run report output.
//!
//! - [`json`]: writes a [`ScrapeOutcome`](crate::models::ScrapeOutcome) to a dated JSON file
//!
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── 08-00-12.json
//!     └── 14-30-05.json
//! ```

pub mod json;
