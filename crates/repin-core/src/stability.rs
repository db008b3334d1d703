//! Heuristics classifying ids and text as dynamic (likely to change
//! between page loads) or stable enough to build a selector on.

use regex::Regex;
use std::sync::LazyLock;

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

static HEX_TAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9a-fA-F]{6,}$").unwrap());

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\d{1,4}[-/.]\d{1,2}[-/.]\d{1,4}|\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2}(,?\s+\d{2,4})?\b",
    )
    .unwrap()
});

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b\d{1,2}:\d{2}(:\d{2})?(\s*(am|pm))?\b").unwrap());

static RELATIVE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(just now|yesterday|today|tomorrow|(a|an|\d+)\s+(second|minute|hour|day|week|month|year)s?\s+ago|in\s+\d+\s+(second|minute|hour|day|week|month|year)s?)\b",
    )
    .unwrap()
});

static CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[$€£¥₹]\s*[\d,.]*\d|\b\d[\d,.]*\s*(usd|eur|gbp|jpy|inr)\b").unwrap()
});

static COUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b\d+\s+(results?|items?|matches|entries|reviews?|comments?|votes?|likes?)\b|\bshowing\s+\d|\bpage\s+\d+\s+of\s+\d+\b",
    )
    .unwrap()
});

/// Framework auto-id prefixes. An id starting with one of these was
/// generated at render time and will not survive the next load.
const DYNAMIC_ID_PREFIXES: &[&str] = &[
    "__next",
    "css-",
    "sc-",
    "jss",
    "mui-",
    "radix-",
    "headlessui-",
    "downshift-",
    "mat-",
    "cdk-",
    "ember",
];

/// True when an id looks auto-generated and is unusable in a selector.
pub fn is_dynamic_id(id: &str) -> bool {
    let id = id.trim();
    if id.is_empty() {
        return true;
    }
    if UUID_RE.is_match(id) {
        return true;
    }
    // React useId and friends wrap their tokens in colons (":r0:").
    if id.starts_with(':') && id.ends_with(':') {
        return true;
    }
    if DYNAMIC_ID_PREFIXES.iter().any(|p| id.starts_with(p)) {
        return true;
    }
    let digits = id.chars().filter(|c| c.is_ascii_digit()).count();
    let letters = id.chars().filter(|c| c.is_ascii_alphabetic()).count();
    if digits > 4 && digits > letters {
        return true;
    }
    if id.len() > 10 && HEX_TAIL_RE.is_match(id) {
        return true;
    }
    false
}

/// True when visible text is too volatile to match on: dates, times,
/// relative-time phrases, currency amounts, counts, or anything over
/// 200 characters.
pub fn is_dynamic_text(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return true;
    }
    if text.chars().count() > 200 {
        return true;
    }
    DATE_RE.is_match(text)
        || TIME_RE.is_match(text)
        || RELATIVE_TIME_RE.is_match(text)
        || CURRENCY_RE.is_match(text)
        || COUNT_RE.is_match(text)
}

/// Strip the volatile parts of a text (currency, dates, times,
/// relative-time phrases, leading/trailing numeric runs) and return the
/// residual, if at least 3 characters survive.
pub fn stable_text_portion(text: &str) -> Option<String> {
    let mut residual = text.trim().to_string();
    for re in [&*CURRENCY_RE, &*DATE_RE, &*TIME_RE, &*RELATIVE_TIME_RE] {
        residual = re.replace_all(&residual, "").into_owned();
    }
    let residual = residual
        .trim_matches(|c: char| {
            c.is_ascii_digit()
                || c.is_whitespace()
                || matches!(c, ',' | '.' | ':' | ';' | '-' | '–' | '(' | ')' | '#' | '·' | '|')
        })
        .to_string();
    if residual.chars().count() >= 3 {
        Some(residual)
    } else {
        None
    }
}

/// Implicit ARIA roles for tags that carry one.
const IMPLICIT_ROLES: &[(&str, &str)] = &[
    ("a", "link"),
    ("button", "button"),
    ("input", "textbox"),
    ("select", "combobox"),
    ("textarea", "textbox"),
    ("h1", "heading"),
    ("h2", "heading"),
    ("h3", "heading"),
    ("h4", "heading"),
    ("h5", "heading"),
    ("h6", "heading"),
    ("img", "img"),
    ("nav", "navigation"),
    ("form", "form"),
    ("table", "table"),
    ("ul", "list"),
    ("ol", "list"),
    ("li", "listitem"),
    ("option", "option"),
    ("dialog", "dialog"),
];

/// Resolve the role to match on: the explicit role unless it is
/// "presentation"/"none", else the tag's implicit role. Generic
/// containers map to nothing.
pub fn map_aria_role<'a>(explicit_role: Option<&'a str>, tag: &str) -> Option<&'a str> {
    if let Some(role) = explicit_role.map(str::trim).filter(|r| !r.is_empty()) {
        if !role.eq_ignore_ascii_case("presentation") && !role.eq_ignore_ascii_case("none") {
            return Some(role);
        }
    }
    let tag = tag.to_ascii_lowercase();
    IMPLICIT_ROLES
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, role)| *role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_ids() {
        assert!(is_dynamic_id("550e8400-e29b-41d4-a716-446655440000"));
        assert!(is_dynamic_id(":r0:"));
        assert!(is_dynamic_id(":R2d6:"));
        assert!(is_dynamic_id("mui-12b4"));
        assert!(is_dynamic_id("__next-root"));
        assert!(is_dynamic_id("css-1q2w3e"));
        assert!(is_dynamic_id("radix-:r1:"));
        assert!(is_dynamic_id("item-48291734"));
        assert!(is_dynamic_id("widget-a1b2c3d4e5f6"));
        assert!(is_dynamic_id(""));
        assert!(is_dynamic_id("   "));
    }

    #[test]
    fn stable_ids() {
        assert!(!is_dynamic_id("search-input"));
        assert!(!is_dynamic_id("main-nav"));
        assert!(!is_dynamic_id("login"));
        assert!(!is_dynamic_id("step-2"));
    }

    #[test]
    fn dynamic_text() {
        assert!(is_dynamic_text("$1,250,000"));
        assert!(is_dynamic_text("42 results"));
        assert!(is_dynamic_text("3 days ago"));
        assert!(is_dynamic_text("Updated 12/31/2024"));
        assert!(is_dynamic_text("Jan 5, 2025"));
        assert!(is_dynamic_text("Meeting at 10:30 AM"));
        assert!(is_dynamic_text("Showing 1-20 of 240"));
        assert!(is_dynamic_text("Page 3 of 12"));
        assert!(is_dynamic_text(""));
        assert!(is_dynamic_text(&"x".repeat(201)));
    }

    #[test]
    fn stable_text() {
        assert!(!is_dynamic_text("Search"));
        assert!(!is_dynamic_text("Add to cart"));
        assert!(!is_dynamic_text("Continue"));
    }

    #[test]
    fn stable_portion_strips_volatile_parts() {
        assert_eq!(
            stable_text_portion("Order #48213 shipped 3 days ago").as_deref(),
            Some("Order #48213 shipped")
        );
        assert_eq!(
            stable_text_portion("$12.50 Premium plan").as_deref(),
            Some("Premium plan")
        );
        assert_eq!(
            stable_text_portion("Invoice dated 2024/01/15").as_deref(),
            Some("Invoice dated")
        );
    }

    #[test]
    fn stable_portion_rejects_short_residuals() {
        assert_eq!(stable_text_portion("42"), None);
        assert_eq!(stable_text_portion("$5.00"), None);
        assert_eq!(stable_text_portion(""), None);
    }

    #[test]
    fn role_mapping() {
        assert_eq!(map_aria_role(Some("tab"), "a"), Some("tab"));
        assert_eq!(map_aria_role(Some("presentation"), "img"), Some("img"));
        assert_eq!(map_aria_role(None, "a"), Some("link"));
        assert_eq!(map_aria_role(None, "BUTTON"), Some("button"));
        assert_eq!(map_aria_role(None, "h3"), Some("heading"));
        assert_eq!(map_aria_role(None, "div"), None);
        assert_eq!(map_aria_role(Some(""), "span"), None);
    }
}
