//! Post-extraction hygiene, applied whichever extraction stage produced the text.
//!
//! Two kinds of boilerplate leak into extracted bodies: the city navigation
//! chain of the SoyChile/SoyTV header menu, and the accessibility text of
//! embedded video-player dialogs.

/// Substrings that show the header menu was captured.
pub const MENU_MARKERS: &[&str] = &[
    "SOYTV Actualidad Entretención Economía",
    "piapó soyvalparaíso",
    "arica soyiquique",
    "soycalama soyan",
    "soyosorno soypuertomontt",
    "soychiloé",
];

/// Last city in the menu chain; the article starts after it.
pub const MENU_LAST_CITY: &str = "soychiloé";

/// Video-player dialog text. The body is cut at the first one found.
pub const MODAL_PHRASES: &[&str] = &[
    "This is a modal window",
    "Beginning of dialog window",
    "Escape will cancel and close the window",
];

/// Drop a captured header menu, if any.
///
/// Everything up to and including the last city name is removed. When that
/// anchor is missing only the first marker found is removed.
pub fn strip_header_menu(text: &str) -> String {
    let Some(marker) = MENU_MARKERS.iter().find(|marker| text.contains(*marker)) else {
        return text.to_string();
    };
    match text.rfind(MENU_LAST_CITY) {
        Some(idx) => text[idx + MENU_LAST_CITY.len()..].trim().to_string(),
        None => text.replacen(marker, "", 1).trim().to_string(),
    }
}

/// Truncate at video-modal boilerplate.
pub fn truncate_at_modal(text: &str) -> String {
    let mut text = text.to_string();
    for phrase in MODAL_PHRASES {
        if let Some(idx) = text.find(phrase) {
            text = text[..idx].trim().to_string();
        }
    }
    text
}

/// Full cleaning pass.
pub fn clean_content(text: &str) -> String {
    truncate_at_modal(&strip_header_menu(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_trimmed_after_last_city() {
        let text = "arica soyiquique soycalama soyantofagasta soychiloé  El alcalde anunció obras.";
        assert_eq!(strip_header_menu(text), "El alcalde anunció obras.");
    }

    #[test]
    fn test_menu_marker_removed_without_last_city() {
        let text = "SOYTV Actualidad Entretención Economía La noticia del día.";
        assert_eq!(strip_header_menu(text), "La noticia del día.");
    }

    #[test]
    fn test_clean_text_untouched() {
        let text = "Texto normal sin menú.";
        assert_eq!(clean_content(text), text);
    }

    #[test]
    fn test_truncate_at_modal() {
        let text = "Cuerpo de la nota.\n\nThis is a modal window. Beginning of dialog window.";
        assert_eq!(truncate_at_modal(text), "Cuerpo de la nota.");
        assert_eq!(
            truncate_at_modal("Escape will cancel and close the window"),
            ""
        );
    }

    #[test]
    fn test_clean_content_runs_both_passes() {
        let text = "soyosorno soypuertomontt soychiloé Cuerpo real. Beginning of dialog window x";
        assert_eq!(clean_content(text), "Cuerpo real.");
    }
}
