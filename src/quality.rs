//! Acceptance gate for extracted article bodies.

use crate::anchors::char_len;
use crate::models::ExtractedArticle;
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

/// Bodies shorter than this are rejected.
pub const MIN_BODY_CHARS: usize = 100;
/// Summary length before the ellipsis.
pub const SUMMARY_CHARS: usize = 200;

/// A body containing any of these (case-insensitively) is a paywall, login
/// wall, error page, extraction failure or known recurring filler.
pub const INVALID_CONTENT_PHRASES: &[&str] = &[
    "Error de conexión",
    "timeout",
    "Ver términos y condiciones",
    "Suscríbete para leer",
    "Contenido exclusivo",
    "Inicia sesión",
    "404 Not Found",
    "Página no encontrada",
    "No se pudo extraer el contenido completo",
    "Debes estar registrado",
    "Acceso restringido",
    "Puertos y Logística Radio Temporada II",
];

/// Why a body was turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    InvalidPhrase(&'static str),
    TooShort(usize),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::InvalidPhrase(phrase) => write!(f, "invalid phrase \"{phrase}\""),
            Rejection::TooShort(chars) => write!(f, "short content ({chars} chars)"),
        }
    }
}

/// Check a body against the phrase denylist, then the minimum length.
pub fn validate_body(body: &str) -> Result<(), Rejection> {
    let lower = body.to_lowercase();
    if let Some(&phrase) = INVALID_CONTENT_PHRASES
        .iter()
        .find(|phrase| lower.contains(&phrase.to_lowercase()))
    {
        return Err(Rejection::InvalidPhrase(phrase));
    }

    let chars = char_len(body);
    if chars < MIN_BODY_CHARS {
        return Err(Rejection::TooShort(chars));
    }
    Ok(())
}

/// First [`SUMMARY_CHARS`] characters of the body, `...` appended when cut.
pub fn summarize(body: &str) -> String {
    let mut summary: String = body.chars().take(SUMMARY_CHARS).collect();
    if char_len(body) > SUMMARY_CHARS {
        summary.push_str("...");
    }
    summary
}

/// Keep the first article for each distinct body, in order.
pub fn drop_duplicate_bodies(articles: Vec<ExtractedArticle>) -> Vec<ExtractedArticle> {
    let mut seen = HashSet::new();
    articles
        .into_iter()
        .filter(|article| {
            let fresh = seen.insert(article.content.clone());
            if !fresh {
                warn!(url = %article.original_url, "Skipping duplicate content");
            }
            fresh
        })
        .collect()
}
