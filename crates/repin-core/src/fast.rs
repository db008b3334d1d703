//! Single-pass CSS resolution for latency-sensitive direct interaction.
//!
//! A distinct contract from the full resolver: no live match counting, no
//! uniqueness guarantee, just the first usable rung of a fixed priority
//! chain. Callers who can afford the probe round trip should prefer
//! `resolve_selector`.

use crate::candidates::escape_value;
use crate::fingerprint::ElementFingerprint;
use crate::stability::{is_dynamic_id, is_dynamic_text};

/// Maximum short-text length usable for the text rung.
const FAST_TEXT_MAX: usize = 60;

/// First match of: test-id > stable id > aria-label > name > placeholder >
/// title > stable short text > tag+role > bare tag > None.
///
/// The text rung emits `:has-text("…")`, understood by mainstream
/// automation CSS engines but not by strict `querySelector`; callers
/// restricted to the latter get their answer from the rungs below it.
pub fn fast_css_selector(fp: &ElementFingerprint) -> Option<String> {
    if let Some((attr, value)) = fp.test_id() {
        return Some(format!("[{attr}=\"{}\"]", escape_value(value)));
    }
    if let Some(id) = fp.attr("id") {
        if !is_dynamic_id(id) {
            return Some(format!("[id=\"{}\"]", escape_value(id)));
        }
    }
    if let Some(aria) = fp.attr("aria-label") {
        if !is_dynamic_text(aria) {
            return Some(format!("[aria-label=\"{}\"]", escape_value(aria)));
        }
    }
    if let Some(name) = fp.attr("name") {
        if !is_dynamic_id(name) {
            return Some(format!("[name=\"{}\"]", escape_value(name)));
        }
    }
    if let Some(placeholder) = fp.attr("placeholder") {
        if !is_dynamic_text(placeholder) {
            return Some(format!("[placeholder=\"{}\"]", escape_value(placeholder)));
        }
    }
    if let Some(title) = fp.attr("title") {
        if !is_dynamic_text(title) {
            return Some(format!("[title=\"{}\"]", escape_value(title)));
        }
    }
    if let Some(text) = fp.matching_text() {
        if text.chars().count() <= FAST_TEXT_MAX && !is_dynamic_text(text) {
            return Some(format!("{}:has-text(\"{}\")", fp.tag, escape_value(text)));
        }
    }
    if let Some(role) = fp.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        return Some(format!("{}[role=\"{}\"]", fp.tag, escape_value(role)));
    }
    let tag = fp.tag.trim();
    if tag.is_empty() {
        None
    } else {
        Some(tag.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::Rect;
    use std::collections::HashMap;

    fn make_fingerprint(tag: &str) -> ElementFingerprint {
        ElementFingerprint {
            id: 1,
            tag: tag.into(),
            role: None,
            text: None,
            short_text: None,
            label: None,
            control_label: None,
            attributes: HashMap::new(),
            rect: Rect::default(),
            visible: true,
            nth_index: 0,
            parent: None,
        }
    }

    #[test]
    fn chain_order() {
        let mut fp = make_fingerprint("input");
        fp.attributes.insert("data-testid".into(), "q".into());
        fp.attributes.insert("id".into(), "search".into());
        fp.attributes.insert("placeholder".into(), "Search".into());
        assert_eq!(fast_css_selector(&fp).as_deref(), Some("[data-testid=\"q\"]"));

        fp.attributes.remove("data-testid");
        assert_eq!(fast_css_selector(&fp).as_deref(), Some("[id=\"search\"]"));

        fp.attributes.insert("id".into(), ":r4:".into());
        assert_eq!(
            fast_css_selector(&fp).as_deref(),
            Some("[placeholder=\"Search\"]")
        );
    }

    #[test]
    fn text_and_structural_rungs() {
        let mut fp = make_fingerprint("button");
        fp.short_text = Some("Save".into());
        assert_eq!(
            fast_css_selector(&fp).as_deref(),
            Some("button:has-text(\"Save\")")
        );

        let mut fp = make_fingerprint("div");
        fp.role = Some("tablist".into());
        assert_eq!(
            fast_css_selector(&fp).as_deref(),
            Some("div[role=\"tablist\"]")
        );

        assert_eq!(fast_css_selector(&make_fingerprint("span")).as_deref(), Some("span"));
        assert_eq!(fast_css_selector(&make_fingerprint("")), None);
    }

    #[test]
    fn dynamic_attributes_fall_through() {
        let mut fp = make_fingerprint("span");
        fp.attributes.insert("id".into(), "mui-9912".into());
        fp.attributes.insert("title".into(), "3 days ago".into());
        fp.text = Some("$19.99".into());
        assert_eq!(fast_css_selector(&fp).as_deref(), Some("span"));
    }
}
