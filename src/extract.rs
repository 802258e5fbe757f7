//! Article body extraction.
//!
//! A page is run through an ordered cascade of strategies ([`Stage`]); the
//! first one that yields [`SUFFICIENT_CHARS`] of text wins. If none does, the
//! longest partial result is kept, and anything under
//! [`PLACEHOLDER_MIN_CHARS`] is replaced by a notice that downstream
//! validation rejects. The winning text is then passed through
//! [`clean_content`].

use crate::anchors::{char_len, clean_text, collapse_whitespace};
use crate::clean::clean_content;
use crate::locator::{Selector, absolutize, find_container};
use crate::models::Source;
use crate::sites::{SiteStrategy, strategy_for};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use url::Url;

/// Paragraphs must be strictly longer than this to count.
pub const PARAGRAPH_MIN_CHARS: usize = 20;
/// Page-wide fallback paragraphs must be strictly longer than this.
pub const LOOSE_PARAGRAPH_MIN_CHARS: usize = 40;
/// Page-wide fallback keeps at most this many paragraphs.
pub const LOOSE_PARAGRAPH_LIMIT: usize = 20;
/// A stage producing at least this much text ends the cascade.
pub const SUFFICIENT_CHARS: usize = 100;
/// A generic container pattern wins with strictly more than this.
pub const CONTAINER_MIN_CHARS: usize = 50;
/// Selector containers shorter than this also get their nested div text.
pub const SELECTOR_DIV_FALLBACK_CHARS: usize = 200;
/// Final text shorter than this is replaced by [`placeholder`].
pub const PLACEHOLDER_MIN_CHARS: usize = 50;
/// Bytes scanned after a site-specific container marker.
pub const SITE_CHUNK_BYTES: usize = 25_000;
/// Loose text runs must be strictly longer than this.
pub const LOOSE_TEXT_MIN_CHARS: usize = 30;

/// Appended to the title when nothing usable was found.
pub const UNEXTRACTED_NOTICE: &str = "No se pudo extraer el contenido completo.";

/// Loose text containing any of these is inline script, not prose.
const SCRIPT_MARKERS: &[&str] = &["function(", "var ", "window.", "googletag"];

/// Emol divs whose opening tag carries one of these are related-news boxes or floats.
const EMOL_SKIP_MARKERS: &[&str] = &[
    "contRelacionadas",
    "flo_left",
    "cont_items_detalle",
    "relacionadas",
];

/// Emol body ends at the related-news box or the "report an error" footer.
const EMOL_STOP_MARKERS: &[&str] = &[r#"id="contRelacionadas""#, r#"class="error_txt""#];

static PARAGRAPH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<p[^>]*>([\s\S]*?)</p>").unwrap());
static DIV_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<div[^>]*>([\s\S]*?)</div>").unwrap());
static ARTICLE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<article[^>]*>([\s\S]*?)</article>").unwrap());
static SCRIPT_OR_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<script[\s\S]*?</script>|<style[\s\S]*?</style>").unwrap()
});
static LOOSE_TEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r">([^<]{30,})<").unwrap());
static JUSTIFIED_DIV: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)<div[^>]*style=["'][^"']*text-align:\s*justify[^"']*["'][^>]*>([\s\S]*?)</div>"#,
    )
    .unwrap()
});
static SOYCHILE_BODY_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<div[^>]*(?:id|class)=["']textoDetalle["'][^>]*>"#).unwrap()
});
static EMOL_TEXT_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)class=["']EmolText["']"#).unwrap());
static EMOL_TEXT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)id=["']cuDetalle_cuTexto_textoNoticia["']"#).unwrap());
static IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<img[^>]*src=["']([^"']+)["'][^>]*>"#).unwrap());

/// Common content containers, most specific first.
static CONTENT_CONTAINERS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(
            r#"(?i)<div[^>]*class=["'][^"']*(?:article-content|post-content|entry-content|story-content|news-content)[^"']*["'][^>]*>([\s\S]*?)</div>"#,
        )
        .unwrap(),
        Regex::new(
            r#"(?i)<div[^>]*id=["'][^"']*(?:article|content|post|entry)[^"']*["'][^>]*>([\s\S]*?)</div>"#,
        )
        .unwrap(),
        Regex::new(r"(?i)<main[^>]*>([\s\S]*?)</main>").unwrap(),
    ]
});

/// Cleaned text of every `<p>` in `html` longer than `min_chars`.
fn paragraph_texts(html: &str, min_chars: usize) -> impl Iterator<Item = String> + '_ {
    PARAGRAPH
        .captures_iter(html)
        .map(|caps| clean_text(&caps[1]))
        .filter(move |text| char_len(text) > min_chars)
}

/// Paragraph text of a fragment, blank-line separated.
pub fn extract_paragraphs(html: &str) -> String {
    paragraph_texts(html, PARAGRAPH_MIN_CHARS).join("\n\n")
}

/// Largest index `<= idx` that sits on a char boundary of `s`.
fn floor_boundary(s: &str, idx: usize) -> usize {
    let mut idx = idx.min(s.len());
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn already_has(blocks: &[String], text: &str) -> bool {
    blocks.iter().any(|block| block.contains(text))
}

/// Body of the container named by a source's content selector.
pub fn selector_body(html: &str, selector: Selector<'_>) -> Option<String> {
    let container = find_container(html, selector)?;
    let mut blocks: Vec<String> = paragraph_texts(container, PARAGRAPH_MIN_CHARS).collect();

    if char_len(&blocks.join("\n\n")) < SELECTOR_DIV_FALLBACK_CHARS {
        blocks.extend(
            DIV_BLOCK
                .captures_iter(container)
                .map(|caps| clean_text(&caps[1]))
                .filter(|text| char_len(text) > PARAGRAPH_MIN_CHARS),
        );
    }
    Some(blocks.join("\n\n"))
}

/// SoyChile article body inside `textoDetalle`.
///
/// Text there is a mix of a leading text run, `<p>` tags, justified divs and
/// bare text nodes between empty paragraphs; all four are collected.
pub fn soychile_body(html: &str) -> Option<String> {
    let open = SOYCHILE_BODY_OPEN.find(html)?;
    let rest = &html[open.start()..];
    let end = rest
        .find(r#"id="comentarios""#)
        .or_else(|| rest.find(r#"class="note-footer""#))
        .map(|offset| open.start() + offset)
        .unwrap_or_else(|| floor_boundary(html, open.start() + SITE_CHUNK_BYTES));
    let chunk = html.get(open.end()..end.max(open.end())).unwrap_or_default();

    let mut blocks = Vec::new();

    if let Some(first_tag) = chunk.find('<').filter(|&idx| idx > 0) {
        let lead = collapse_whitespace(&chunk[..first_tag]);
        if char_len(&lead) > PARAGRAPH_MIN_CHARS {
            blocks.push(lead);
        }
    }

    blocks.extend(paragraph_texts(chunk, PARAGRAPH_MIN_CHARS));

    for caps in JUSTIFIED_DIV.captures_iter(chunk) {
        let text = clean_text(&caps[1]);
        if char_len(&text) > PARAGRAPH_MIN_CHARS && !already_has(&blocks, &text) {
            blocks.push(text);
        }
    }

    let scriptless = SCRIPT_OR_STYLE.replace_all(chunk, "");
    for caps in LOOSE_TEXT.captures_iter(&scriptless) {
        let text = collapse_whitespace(&caps[1]);
        if char_len(&text) > LOOSE_TEXT_MIN_CHARS
            && !already_has(&blocks, &text)
            && !SCRIPT_MARKERS.iter().any(|marker| text.contains(marker))
        {
            blocks.push(text);
        }
    }

    Some(blocks.join("\n\n"))
}

/// Emol article body after the `EmolText` / `textoNoticia` marker.
///
/// Emol writes paragraphs as divs. Related-news boxes and floats are skipped
/// and the scan stops at the related-news or error-report footer.
pub fn emol_body(html: &str) -> Option<String> {
    let start = EMOL_TEXT_CLASS
        .find(html)
        .or_else(|| EMOL_TEXT_ID.find(html))?
        .start();
    let chunk = &html[start..floor_boundary(html, start + SITE_CHUNK_BYTES)];

    let mut blocks = Vec::new();
    for caps in DIV_BLOCK.captures_iter(chunk) {
        let whole = caps.get(0).map_or("", |m| m.as_str());
        let inner = caps.get(1).map_or("", |m| m.as_str());
        let open_tag = whole.find('>').map_or(whole, |idx| &whole[..=idx]);

        if EMOL_SKIP_MARKERS.iter().any(|marker| open_tag.contains(marker)) {
            continue;
        }

        let text = clean_text(inner);
        if char_len(&text) > PARAGRAPH_MIN_CHARS && !text.contains("Noticias relacionadas") {
            blocks.push(text);
        }

        if EMOL_STOP_MARKERS.iter().any(|marker| inner.contains(marker)) {
            break;
        }
    }

    let body = blocks.join("\n\n");
    if char_len(&body) < PLACEHOLDER_MIN_CHARS {
        return Some(extract_paragraphs(chunk));
    }
    Some(body)
}

/// Paragraph text of the first `<article>` element.
pub fn article_tag_body(html: &str) -> Option<String> {
    ARTICLE_TAG
        .captures(html)
        .map(|caps| extract_paragraphs(&caps[1]))
}

/// Paragraph text of the first common content container with enough text.
pub fn generic_container_body(html: &str) -> Option<String> {
    CONTENT_CONTAINERS.iter().find_map(|pattern| {
        let caps = pattern.captures(html)?;
        let text = extract_paragraphs(caps.get(1)?.as_str());
        (char_len(&text) > CONTAINER_MIN_CHARS).then_some(text)
    })
}

/// The first paragraphs of the whole page, skipping short ones.
pub fn loose_paragraphs(html: &str) -> String {
    paragraph_texts(html, LOOSE_PARAGRAPH_MIN_CHARS)
        .take(LOOSE_PARAGRAPH_LIMIT)
        .join("\n\n")
}

/// Body returned when nothing usable could be extracted.
pub fn placeholder(title: &str) -> String {
    format!("{title}\n\n{UNEXTRACTED_NOTICE}")
}

/// One step of the extraction cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The source's configured content selector.
    Selector,
    /// The site registry's hand-written extractor.
    Site,
    ArticleTag,
    Container,
    Paragraphs,
}

impl Stage {
    pub const CASCADE: [Stage; 5] = [
        Stage::Selector,
        Stage::Site,
        Stage::ArticleTag,
        Stage::Container,
        Stage::Paragraphs,
    ];

    fn run(self, html: &str, source: &Source, site: &SiteStrategy) -> Option<String> {
        match self {
            Stage::Selector => source
                .content_selector
                .as_deref()
                .and_then(Selector::parse)
                .and_then(|selector| selector_body(html, selector)),
            Stage::Site => site.content.and_then(|extract| extract(html)),
            Stage::ArticleTag => article_tag_body(html),
            Stage::Container => generic_container_body(html),
            Stage::Paragraphs => Some(loose_paragraphs(html)),
        }
    }
}

/// Run the cascade over an article page and clean the result.
///
/// Never fails: when every stage comes up short the [`placeholder`] is
/// returned and left for validation to reject.
pub fn extract_content(html: &str, title: &str, source: &Source) -> String {
    let site = strategy_for(&source.url);
    let mut best = String::new();
    let mut winner = None;

    for stage in Stage::CASCADE {
        let Some(text) = stage.run(html, source, site) else {
            continue;
        };
        let text = text.trim().to_string();
        let chars = char_len(&text);
        if chars > char_len(&best) {
            best = text;
            winner = Some(stage);
        }
        if chars >= SUFFICIENT_CHARS {
            break;
        }
    }

    let chars = char_len(&best);
    debug!(?winner, chars, site = site.name, "Extraction cascade finished");
    if chars < PLACEHOLDER_MIN_CHARS {
        return placeholder(title);
    }
    clean_content(&best)
}

/// First image on the page, resolved against the page's origin when root-relative.
pub fn extract_lead_image(html: &str, page_url: &str) -> Option<String> {
    let src = IMAGE.captures(html)?.get(1)?.as_str();
    let base = Url::parse(page_url).ok();
    Some(absolutize(src, base.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(url: &str, content_selector: Option<&str>) -> Source {
        Source {
            id: "s1".into(),
            name: "Test".into(),
            url: url.into(),
            is_active: true,
            list_container_selector: None,
            content_selector: content_selector.map(String::from),
        }
    }

    fn sentence(n: usize) -> String {
        "Los vecinos del sector denunciaron cortes de agua. ".repeat(n)
    }

    #[test]
    fn test_extract_paragraphs_filters_and_joins() {
        let html = "<p>Corto</p><p class=\"lead\">Un párrafo <b>con negrita</b>\n y salto</p><p>Otro párrafo suficientemente largo</p>";
        assert_eq!(
            extract_paragraphs(html),
            "Un párrafo con negrita y salto\n\nOtro párrafo suficientemente largo"
        );
    }

    #[test]
    fn test_falls_through_short_article_tag_to_container() {
        let short = "c".repeat(40);
        let long = "d".repeat(300);
        let html = format!(
            "<html><body><article><p>{short}</p></article>\
             <div class=\"entry-content single\"><p>{long}</p></div></body></html>"
        );
        let text = extract_content(&html, "Titulo", &source("https://diario.cl", None));
        assert_eq!(text, long);
        assert_eq!(char_len(&text), 300);
    }

    #[test]
    fn test_article_tag_wins_when_long_enough() {
        let body = sentence(3);
        let html = format!("<article><p>{body}</p></article><main><p>{}</p></main>", sentence(6));
        let text = extract_content(&html, "T", &source("https://diario.cl", None));
        assert_eq!(text, body.trim());
    }

    #[test]
    fn test_container_pattern_order() {
        let html = format!(
            "<div id=\"post-12\"><p>{}</p></div><main><p>{}</p></main>",
            sentence(2),
            "m".repeat(80)
        );
        assert_eq!(generic_container_body(&html), Some(sentence(2).trim().to_string()));

        // Too short in the id container, so <main> is used.
        let html = format!(
            "<div id=\"content\"><p>{}</p></div><main><p>{}</p></main>",
            "x".repeat(30),
            "m".repeat(80)
        );
        assert_eq!(generic_container_body(&html), Some("m".repeat(80)));
    }

    #[test]
    fn test_dynamic_selector_with_div_fallback() {
        let html = format!(
            "<div id=\"cuerpo-nota\"><div>{}</div></div><p>{}</p>",
            sentence(3),
            "otro texto fuera del contenedor que no debe aparecer"
        );
        let src = source("https://diario.cl", Some("#cuerpo-nota"));
        let text = extract_content(&html, "T", &src);
        assert_eq!(text, sentence(3).trim());
    }

    #[test]
    fn test_soychile_loose_text_and_justified_divs() {
        let lead = "Texto inicial de la nota que aparece antes de cualquier etiqueta";
        let loose = "Este es un nodo de texto suelto entre dos parrafos vacios de SoyChile";
        let justified = "Contenido dentro de un div justificado como usa el sitio";
        let html = format!(
            "<div id=\"textoDetalle\">{lead}<p></p> {loose} <p></p>\
             <div style=\"text-align: justify;\">{justified}</div>\
             <script>var x = function() {{ window.googletag = 1; }}; var y = 'texto largo de script aqui';</script>\
             </div><div id=\"comentarios\">Comentario de un lector que no es parte de la nota</div>"
        );
        let body = soychile_body(&html).unwrap();
        assert_eq!(body, format!("{lead}\n\n{justified}\n\n{loose}"));
        assert!(!body.contains("Comentario"));
        assert!(!body.contains("googletag"));
    }

    #[test]
    fn test_soychile_used_only_for_soychile_sources() {
        let body = sentence(3);
        let html = format!("<div class=\"textoDetalle\"><p>{body}</p></div>");
        let soy = extract_content(&html, "T", &source("https://www.soychile.cl/", None));
        assert_eq!(soy, body.trim());
        assert!(soychile_body("<p>no container</p>").is_none());
    }

    #[test]
    fn test_emol_skips_related_and_stops_at_footer() {
        let html = format!(
            "<div id=\"cuDetalle_cuTexto_textoNoticia\" class=\"EmolText\">\
             <div>{}</div>\
             <div class=\"flo_left\">Nota flotante que se debe ignorar por completo</div>\
             <div>{}</div>\
             <div><span class=\"error_txt\">Enviar corrección</span></div>\
             <div>{}</div>",
            sentence(1),
            "Segundo parrafo del cuerpo de la noticia de Emol",
            "Texto posterior al pie que no debe aparecer"
        );
        let body = emol_body(&html).unwrap();
        assert_eq!(
            body,
            format!(
                "{}\n\nSegundo parrafo del cuerpo de la noticia de Emol",
                sentence(1).trim()
            )
        );
    }

    #[test]
    fn test_emol_falls_back_to_paragraphs() {
        let html = format!("<div class='EmolText'><p>{}</p></div>", sentence(2));
        assert_eq!(emol_body(&html), Some(sentence(2).trim().to_string()));
    }

    #[test]
    fn test_loose_paragraph_fallback_limit() {
        let html: String = (0..25)
            .map(|i| format!("<p>Parrafo numero {i:02} con texto suficiente para pasar el filtro</p>"))
            .collect();
        let text = loose_paragraphs(&html);
        assert_eq!(text.split("\n\n").count(), LOOSE_PARAGRAPH_LIMIT);
        assert!(text.starts_with("Parrafo numero 00"));
        assert!(text.ends_with("pasar el filtro") && text.contains("numero 19"));
        assert!(!text.contains("numero 20"));
    }

    #[test]
    fn test_placeholder_when_nothing_found() {
        let text = extract_content("<p>tiny</p>", "Titular", &source("https://diario.cl", None));
        assert_eq!(text, "Titular\n\nNo se pudo extraer el contenido completo.");
    }

    #[test]
    fn test_cleaning_applied_to_result() {
        let html = format!(
            "<article><p>soyosorno soypuertomontt soychiloé {} This is a modal window trailing text</p></article>",
            sentence(3)
        );
        let text = extract_content(&html, "T", &source("https://diario.cl", None));
        assert_eq!(text, sentence(3).trim());
    }

    #[test]
    fn test_lead_image() {
        let html = r#"<header><img class="logo" src="/img/foto.jpg"></header><img src="https://cdn.cl/b.png">"#;
        assert_eq!(
            extract_lead_image(html, "https://www.diario.cl/nota/1"),
            Some("https://www.diario.cl/img/foto.jpg".to_string())
        );
        assert_eq!(extract_lead_image("<p>none</p>", "https://x.cl"), None);
    }

    #[test]
    fn test_floor_boundary() {
        let s = "añb";
        assert_eq!(floor_boundary(s, 2), 1);
        assert_eq!(floor_boundary(s, 99), s.len());
    }
}
