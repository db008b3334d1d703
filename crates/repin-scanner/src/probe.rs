//! Uniqueness probe script builder.
//!
//! Phase one of the validation protocol: one script covering the union of
//! every CSS-expressible candidate across a batch of fingerprints. Run in
//! the live page it returns `{selector: matchCount}`, with -1 for
//! selectors the engine cannot parse, so the resolver can tell "zero
//! matches" from "invalid selector". Must execute in the same page state
//! the fingerprints were captured from.

use repin_core::{generate_candidates, ElementFingerprint};
use std::collections::HashSet;

/// Build the probe script for a batch of fingerprints. Selector order is
/// deterministic: batch order, then candidate order, first occurrence
/// wins.
pub fn probe_script(fingerprints: &[ElementFingerprint]) -> String {
    let mut seen = HashSet::new();
    let mut selectors = Vec::new();
    for fp in fingerprints {
        for candidate in generate_candidates(fp) {
            if let Some(css) = candidate.css {
                if seen.insert(css.clone()) {
                    selectors.push(css);
                }
            }
        }
    }
    // A Vec<String> always serializes.
    let payload = serde_json::to_string(&selectors).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"(() => {{
  const selectors = {payload};
  const counts = {{}};
  for (const selector of selectors) {{
    try {{
      counts[selector] = document.querySelectorAll(selector).length;
    }} catch (e) {{
      counts[selector] = -1;
    }}
  }}
  return JSON.stringify(counts);
}})()"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use repin_core::Rect;
    use std::collections::HashMap;

    fn make_fingerprint(id: u32, tag: &str) -> ElementFingerprint {
        ElementFingerprint {
            id,
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
    fn covers_css_candidates_once() {
        let mut first = make_fingerprint(1, "button");
        first
            .attributes
            .insert("data-testid".into(), "save".into());
        first.attributes.insert("title".into(), "Save".into());
        // Second element shares the title selector; it must appear once.
        let mut second = make_fingerprint(2, "a");
        second.attributes.insert("title".into(), "Save".into());

        let script = probe_script(&[first, second]);
        assert_eq!(script.matches("[data-testid=\\\"save\\\"]").count(), 1);
        assert_eq!(script.matches("[title=\\\"Save\\\"]").count(), 1);
        assert!(script.contains("querySelectorAll"));
        assert!(script.contains("= -1"));
    }

    #[test]
    fn skips_non_css_candidates() {
        // role+name has no CSS form; a fingerprint with only that
        // candidate contributes nothing.
        let mut fp = make_fingerprint(1, "button");
        fp.label = Some("Save".into());
        let script = probe_script(&[fp]);
        assert!(!script.contains("role=button"));
        assert!(script.contains("const selectors = []"));
    }

    #[test]
    fn output_is_deterministic() {
        let mut fp = make_fingerprint(1, "input");
        fp.attributes.insert("placeholder".into(), "Email".into());
        fp.attributes.insert("name".into(), "email".into());
        let batch = [fp];
        assert_eq!(probe_script(&batch), probe_script(&batch));
    }
}
