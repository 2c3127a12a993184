use crate::constants::DEFAULT_STYLE_CACHE_KEY;
use log::warn;
use std::ops::Range;

/// The CSS rules one cache instance contributed to a single render, ready to
/// be emitted as one `<style>` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleChunk {
    pub key: String,
    pub ids: Vec<String>,
    pub css: String,
}

/// Capability for inserting style rules, fixed at construction instead of
/// probed per call.
pub trait StyleSheet {
    fn insert_rule(&mut self, id: &str, css: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StyleRule {
    id: String,
    css: String,
}

/// Collects the CSS rules emitted while rendering one response. One cache
/// instance per render pass; rules are deduplicated by identifier and kept
/// in insertion order.
#[derive(Debug, Clone)]
pub struct StyleCache {
    key: String,
    rules: Vec<StyleRule>,
}

impl StyleCache {
    #[inline]
    pub fn new() -> Self {
        Self::with_key(DEFAULT_STYLE_CACHE_KEY)
    }

    #[inline]
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            rules: Vec::new(),
        }
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Keeps only the rules whose identifier actually occurs in the rendered
    /// HTML (the critical subset), grouped into a single chunk for this
    /// cache instance. No used rules means no chunk.
    pub fn extract_critical_to_chunks(&self, html: &str) -> Vec<StyleChunk> {
        let mut ids = Vec::new();
        let mut css = String::new();

        for rule in &self.rules {
            if html.contains(&rule.id) {
                ids.push(rule.id.clone());
                css.push_str(&rule.css);
            }
        }

        if ids.is_empty() {
            return Vec::new();
        }

        vec![StyleChunk {
            key: self.key.clone(),
            ids,
            css,
        }]
    }
}

impl Default for StyleCache {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleSheet for StyleCache {
    fn insert_rule(&mut self, id: &str, css: &str) {
        if self.rules.iter().any(|r| r.id == id) {
            return;
        }
        self.rules.push(StyleRule {
            id: id.to_string(),
            css: css.to_string(),
        });
    }
}

/// Renders one `<style>` tag per chunk, each tagged with the shared nonce
/// and a `data-emotion` attribute of the cache key followed by the rule
/// identifiers it covers.
pub fn render_style_tags(chunks: &[StyleChunk], nonce: &str) -> String {
    let mut tags = String::new();
    for chunk in chunks {
        tags.push_str("<style nonce=\"");
        tags.push_str(nonce);
        tags.push_str("\" data-emotion=\"");
        tags.push_str(&chunk.key);
        for id in &chunk.ids {
            tags.push(' ');
            tags.push_str(id);
        }
        tags.push_str("\">");
        tags.push_str(&chunk.css);
        tags.push_str("</style>");
    }
    tags
}

/// Splices `style_tags` into `html` immediately after the insertion-point
/// marker `<meta name="emotion-insertion-point"
/// content="emotion-insertion-point"/>`. A missing marker leaves the HTML
/// unchanged and logs a warning.
pub fn inject_styles(html: &str, style_tags: &str) -> String {
    if style_tags.is_empty() {
        return html.to_string();
    }

    match find_insertion_point(html) {
        Some(marker) => {
            let mut out = String::with_capacity(html.len() + style_tags.len());
            out.push_str(&html[..marker.end]);
            out.push_str(style_tags);
            out.push_str(&html[marker.end..]);
            out
        }
        None => {
            warn!("style insertion point not found; extracted styles were dropped");
            html.to_string()
        }
    }
}

/// Full per-response pipeline: extract the critical chunks for `html`,
/// render them as nonce-tagged `<style>` tags, and splice them in at the
/// marker.
pub fn render_critical_styles(html: &str, cache: &StyleCache, nonce: &str) -> String {
    let chunks = cache.extract_critical_to_chunks(html);
    let tags = render_style_tags(&chunks, nonce);
    inject_styles(html, &tags)
}

// Accepts arbitrary whitespace between the attributes and before the
// self-closing slash, the same shapes a `<meta\s*name=...\s*content=...\s*/>`
// pattern would.
fn find_insertion_point(html: &str) -> Option<Range<usize>> {
    const META_OPEN: &str = "<meta";
    const NAME_ATTR: &str = "name=\"emotion-insertion-point\"";
    const CONTENT_ATTR: &str = "content=\"emotion-insertion-point\"";

    let mut search = 0;
    while let Some(found) = html[search..].find(META_OPEN) {
        let start = search + found;
        let bytes = html.as_bytes();

        let mut pos = start + META_OPEN.len();
        pos = skip_whitespace(bytes, pos);
        if let Some(after_name) = match_literal(bytes, pos, NAME_ATTR) {
            pos = skip_whitespace(bytes, after_name);
            if let Some(after_content) = match_literal(bytes, pos, CONTENT_ATTR) {
                pos = skip_whitespace(bytes, after_content);
                if let Some(end) = match_literal(bytes, pos, "/>") {
                    return Some(start..end);
                }
            }
        }

        search = start + 1;
    }

    None
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

fn match_literal(bytes: &[u8], pos: usize, literal: &str) -> Option<usize> {
    let end = pos.checked_add(literal.len())?;
    if end <= bytes.len() && &bytes[pos..end] == literal.as_bytes() {
        Some(end)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str =
        r#"<meta name="emotion-insertion-point" content="emotion-insertion-point"/>"#;

    fn page(head_extra: &str, body: &str) -> String {
        format!(
            "<html><head>{}{}</head><body>{}</body></html>",
            MARKER, head_extra, body
        )
    }

    fn cache_with_button_rule() -> StyleCache {
        let mut cache = StyleCache::new();
        cache.insert_rule("1a2b3c", ".css-1a2b3c{color:red;}");
        cache
    }

    #[test]
    fn style_tags_carry_nonce_and_data_emotion() {
        let chunks = vec![StyleChunk {
            key: "css".to_string(),
            ids: vec!["1a2b3c".to_string(), "4d5e6f".to_string()],
            css: ".css-1a2b3c{color:red;}.css-4d5e6f{color:blue;}".to_string(),
        }];

        let tags = render_style_tags(&chunks, "test-nonce-123");

        assert_eq!(
            tags,
            "<style nonce=\"test-nonce-123\" data-emotion=\"css 1a2b3c 4d5e6f\">\
             .css-1a2b3c{color:red;}.css-4d5e6f{color:blue;}</style>"
        );
    }

    #[test]
    fn one_tag_per_chunk_in_order() {
        let chunks = vec![
            StyleChunk {
                key: "css".to_string(),
                ids: vec!["aaa".to_string()],
                css: ".css-aaa{}".to_string(),
            },
            StyleChunk {
                key: "global".to_string(),
                ids: vec!["bbb".to_string()],
                css: ".global-bbb{}".to_string(),
            },
        ];

        let tags = render_style_tags(&chunks, "n");
        let first = tags.find("data-emotion=\"css aaa\"").unwrap();
        let second = tags.find("data-emotion=\"global bbb\"").unwrap();
        assert!(first < second);
        assert_eq!(tags.matches("<style").count(), 2);
    }

    #[test]
    fn critical_extraction_keeps_only_used_rules() {
        let mut cache = cache_with_button_rule();
        cache.insert_rule("unused1", ".css-unused1{display:none;}");

        let html = page("", r#"<div class="css-1a2b3c">hi</div>"#);
        let chunks = cache.extract_critical_to_chunks(&html);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].ids, ["1a2b3c"]);
        assert_eq!(chunks[0].css, ".css-1a2b3c{color:red;}");
    }

    #[test]
    fn no_used_rules_yields_no_chunk() {
        let cache = cache_with_button_rule();
        let chunks = cache.extract_critical_to_chunks("<html><body>plain</body></html>");
        assert!(chunks.is_empty());
    }

    #[test]
    fn duplicate_rule_ids_are_ignored() {
        let mut cache = cache_with_button_rule();
        cache.insert_rule("1a2b3c", ".css-1a2b3c{color:green;}");

        let html = page("", r#"<div class="css-1a2b3c"/>"#);
        let chunks = cache.extract_critical_to_chunks(&html);
        assert_eq!(chunks[0].css, ".css-1a2b3c{color:red;}");
    }

    #[test]
    fn styles_are_injected_directly_after_marker() {
        let html = page("", r#"<div class="css-1a2b3c"/>"#);
        let cache = cache_with_button_rule();

        let out = render_critical_styles(&html, &cache, "test-nonce-123");

        let expected_prefix = format!(
            "{}<style nonce=\"test-nonce-123\" data-emotion=\"css 1a2b3c\">",
            MARKER
        );
        assert!(out.contains(&expected_prefix));
        // Marker itself is unchanged.
        assert!(out.contains(MARKER));
    }

    #[test]
    fn marker_match_tolerates_whitespace() {
        let spaced = "<html><head><meta  name=\"emotion-insertion-point\"\n content=\"emotion-insertion-point\"  /></head><body><div class=\"css-1a2b3c\"/></body></html>";
        let cache = cache_with_button_rule();

        let out = render_critical_styles(spaced, &cache, "n");
        assert!(out.contains("data-emotion=\"css 1a2b3c\""));
    }

    #[test]
    fn missing_marker_leaves_html_unchanged() {
        let html = "<html><head></head><body><div class=\"css-1a2b3c\"/></body></html>";
        let cache = cache_with_button_rule();

        let out = render_critical_styles(html, &cache, "n");
        assert_eq!(out, html);
    }

    #[test]
    fn other_meta_tags_do_not_match() {
        let html = "<html><head><meta name=\"viewport\" content=\"width=device-width\"/></head><body><div class=\"css-1a2b3c\"/></body></html>";
        let cache = cache_with_button_rule();

        let out = render_critical_styles(html, &cache, "n");
        assert_eq!(out, html);
    }

    #[test]
    fn empty_tag_string_is_a_no_op() {
        let html = page("", "");
        assert_eq!(inject_styles(&html, ""), html);
    }
}
