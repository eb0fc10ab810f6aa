//! Helpers over the editor's HTML: inline image discovery and plain-text
//! extraction for the model.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid img regex")
});

/// Wrap width for rendered text. Wide enough that paragraphs stay on one line.
const TEXT_WIDTH: usize = 2000;

/// Path under which uploaded images are served.
pub const MEDIA_PREFIX: &str = "/media/";

/// `src` of every `<img>` in document order, without duplicates.
pub fn image_urls(html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    IMG_SRC
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|src| !src.is_empty() && seen.insert(src.clone()))
        .collect()
}

/// Images present in `before` that are gone from `after`.
pub fn removed_images(before: &str, after: &str) -> Vec<String> {
    let remaining: HashSet<String> = image_urls(after).into_iter().map(|u| canonical_image_url(&u)).collect();
    image_urls(before)
        .into_iter()
        .filter(|u| !remaining.contains(&canonical_image_url(u)))
        .collect()
}

/// Id of an uploaded image referenced by `url`, absolute or relative.
pub fn media_id(url: &str) -> Option<Uuid> {
    let idx = url.find(MEDIA_PREFIX)?;
    let rest = &url[idx + MEDIA_PREFIX.len()..];
    let id = rest.split(['?', '#', '/']).next()?;
    id.parse().ok()
}

/// Uploaded images are keyed by `/media/{id}` whatever host the editor used.
pub fn canonical_image_url(url: &str) -> String {
    match media_id(url) {
        Some(id) => media_url(id),
        None => url.trim().to_string(),
    }
}

pub fn media_url(id: Uuid) -> String {
    format!("{MEDIA_PREFIX}{id}")
}

/// Visible text of the entry with markup, styles and scripts dropped and
/// entities decoded. Blank lines are collapsed.
pub fn plain_text(html: &str) -> Result<String, html2text::Error> {
    let rendered = html2text::config::plain_no_decorate().string_from_read(html.as_bytes(), TEXT_WIDTH)?;
    Ok(rendered
        .lines()
        .map(|line| line.replace('\u{a0}', " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Cut text to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
