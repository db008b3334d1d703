//! Candidate selector generation.
//!
//! A pure function of one fingerprint: no hidden state, deterministic
//! output, ordered by stability score with a declared per-strategy rank as
//! the tie-break.

use crate::fingerprint::ElementFingerprint;
use crate::stability::{is_dynamic_id, is_dynamic_text, map_aria_role, stable_text_portion};
use serde::{Deserialize, Serialize};
use url::Url;

/// Maximum visible-text length usable for an exact-text candidate.
const EXACT_TEXT_MAX: usize = 80;
/// Href targets at or beyond this length are skipped.
const HREF_MAX: usize = 100;

/// How a candidate selector was derived. Declaration order doubles as the
/// tie-break rank between equal-score candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Explicit test-automation id attribute.
    TestId,
    /// Accessible role plus stable accessible name, exact match.
    RoleName,
    /// Non-dynamic HTML id.
    DomId,
    /// Role plus the stable residual of a dynamic name, contains match.
    RoleNamePartial,
    /// Stable aria-label attribute.
    AriaLabel,
    /// Associated `<label>` text.
    LabelText,
    Placeholder,
    AltText,
    Title,
    NameAttr,
    /// Short non-dynamic exact visible text.
    ExactText,
    /// Link path, domain stripped.
    HrefPath,
    /// Degraded tag + sibling index, emitted only by the resolver.
    TagIndex,
    /// Composite: parent locator scoping a child selector.
    ParentScope,
    /// Composite: base selector refined by a text-containment filter.
    TextFilter,
    /// Composite: base selector pinned to a sibling index.
    IndexGuard,
}

impl Strategy {
    /// Fixed base stability score for generated strategies. Composite
    /// strategies carry computed scores; their base is never consulted.
    pub fn base_score(self) -> u8 {
        match self {
            Strategy::TestId => 10,
            Strategy::RoleName => 9,
            Strategy::DomId => 8,
            Strategy::RoleNamePartial | Strategy::AriaLabel => 7,
            Strategy::LabelText | Strategy::Placeholder | Strategy::AltText => 6,
            Strategy::Title | Strategy::NameAttr => 5,
            Strategy::ExactText => 4,
            Strategy::HrefPath => 3,
            Strategy::TagIndex | Strategy::ParentScope | Strategy::TextFilter
            | Strategy::IndexGuard => 1,
        }
    }

    /// Tie-break rank among equal scores: lower wins.
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::TestId => "test-id",
            Strategy::RoleName => "role-name",
            Strategy::DomId => "dom-id",
            Strategy::RoleNamePartial => "role-name-partial",
            Strategy::AriaLabel => "aria-label",
            Strategy::LabelText => "label-text",
            Strategy::Placeholder => "placeholder",
            Strategy::AltText => "alt-text",
            Strategy::Title => "title",
            Strategy::NameAttr => "name-attr",
            Strategy::ExactText => "exact-text",
            Strategy::HrefPath => "href-path",
            Strategy::TagIndex => "tag-index",
            Strategy::ParentScope => "parent-scope",
            Strategy::TextFilter => "text-filter",
            Strategy::IndexGuard => "index-guard",
        }
    }
}

/// A scored, not-yet-validated selector guess. Regenerated on every call,
/// never cached across snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorCandidate {
    pub strategy: Strategy,
    /// Plain CSS form, when the strategy is CSS-expressible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    /// Locator expression: `css=…`, `role=…[name="…"]`, `text="…"`,
    /// composites chained with ` >> ` and `nth=<i>`.
    pub locator: String,
    pub score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_count: Option<i32>,
    #[serde(default)]
    pub is_unique: bool,
}

impl SelectorCandidate {
    fn new(strategy: Strategy, css: Option<String>, locator: String) -> Self {
        Self {
            strategy,
            css,
            locator,
            score: strategy.base_score(),
            match_count: None,
            is_unique: false,
        }
    }

    fn css_backed(strategy: Strategy, css: String) -> Self {
        let locator = format!("css={css}");
        Self::new(strategy, Some(css), locator)
    }
}

/// Escape a value for embedding inside a double-quoted CSS attribute
/// selector or locator string.
pub(crate) fn escape_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// CSS id selector: `#id` when the id is a plain identifier, the
/// attribute form otherwise.
fn id_selector(id: &str) -> String {
    let plain = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        && !id.starts_with(|c: char| c.is_ascii_digit());
    if plain {
        format!("#{id}")
    } else {
        format!("[id=\"{}\"]", escape_value(id))
    }
}

/// Path portion of an href, domain stripped so the selector survives
/// cross-environment moves. Skips empty, root, overlong, and
/// `javascript:` targets.
fn href_path(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href == "/" || href.len() >= HREF_MAX {
        return None;
    }
    if href.to_ascii_lowercase().starts_with("javascript:") {
        return None;
    }
    let path = match Url::parse(href) {
        Ok(url) => url.path().to_string(),
        // Relative href: take it up to any query or fragment.
        Err(_) => href
            .split(['?', '#'])
            .next()
            .unwrap_or(href)
            .to_string(),
    };
    if path.is_empty() || path == "/" {
        return None;
    }
    Some(path)
}

/// Generate every eligible candidate for a fingerprint, best first.
pub fn generate_candidates(fp: &ElementFingerprint) -> Vec<SelectorCandidate> {
    let mut candidates = Vec::new();

    if let Some((attr, value)) = fp.test_id() {
        candidates.push(SelectorCandidate::css_backed(
            Strategy::TestId,
            format!("[{attr}=\"{}\"]", escape_value(value)),
        ));
    }

    let role = map_aria_role(fp.role.as_deref(), &fp.tag);
    let name = fp.accessible_name();
    if let (Some(role), Some(name)) = (role, name) {
        if !is_dynamic_text(name) {
            candidates.push(SelectorCandidate::new(
                Strategy::RoleName,
                None,
                format!("role={role}[name=\"{}\"]", escape_value(name)),
            ));
        } else if let Some(residual) = stable_text_portion(name) {
            // The name itself is dynamic; match on its stable residual.
            candidates.push(SelectorCandidate::new(
                Strategy::RoleNamePartial,
                None,
                format!("role={role}[name*=\"{}\"]", escape_value(&residual)),
            ));
        }
    }

    if let Some(id) = fp.attr("id") {
        if !is_dynamic_id(id) {
            candidates.push(SelectorCandidate::css_backed(
                Strategy::DomId,
                id_selector(id),
            ));
        }
    }

    if let Some(aria) = fp.attr("aria-label") {
        if !is_dynamic_text(aria) {
            candidates.push(SelectorCandidate::css_backed(
                Strategy::AriaLabel,
                format!("[aria-label=\"{}\"]", escape_value(aria)),
            ));
        }
    }

    if let Some(label) = fp.control_label.as_deref().map(str::trim) {
        if !label.is_empty() && !is_dynamic_text(label) {
            candidates.push(SelectorCandidate::new(
                Strategy::LabelText,
                None,
                format!("label=\"{}\"", escape_value(label)),
            ));
        }
    }

    if let Some(placeholder) = fp.attr("placeholder") {
        if !is_dynamic_text(placeholder) {
            candidates.push(SelectorCandidate::css_backed(
                Strategy::Placeholder,
                format!("[placeholder=\"{}\"]", escape_value(placeholder)),
            ));
        }
    }

    if let Some(alt) = fp.attr("alt") {
        if !is_dynamic_text(alt) {
            candidates.push(SelectorCandidate::css_backed(
                Strategy::AltText,
                format!("[alt=\"{}\"]", escape_value(alt)),
            ));
        }
    }

    if let Some(title) = fp.attr("title") {
        if !is_dynamic_text(title) {
            candidates.push(SelectorCandidate::css_backed(
                Strategy::Title,
                format!("[title=\"{}\"]", escape_value(title)),
            ));
        }
    }

    if let Some(name_attr) = fp.attr("name") {
        if !is_dynamic_id(name_attr) {
            candidates.push(SelectorCandidate::css_backed(
                Strategy::NameAttr,
                format!("[name=\"{}\"]", escape_value(name_attr)),
            ));
        }
    }

    if let Some(text) = fp.matching_text() {
        if text.chars().count() <= EXACT_TEXT_MAX && !is_dynamic_text(text) {
            candidates.push(SelectorCandidate::new(
                Strategy::ExactText,
                None,
                format!("text=\"{}\"", escape_value(text)),
            ));
        }
    }

    if let Some(href) = fp.attr("href") {
        if let Some(path) = href_path(href) {
            candidates.push(SelectorCandidate::css_backed(
                Strategy::HrefPath,
                format!("{}[href*=\"{}\"]", fp.tag, escape_value(&path)),
            ));
        }
    }

    candidates
}

/// The unconditional degraded candidate: tag plus sibling index.
pub(crate) fn tag_index_candidate(fp: &ElementFingerprint) -> SelectorCandidate {
    let css = format!("{}:nth-of-type({})", fp.tag, fp.nth_index + 1);
    let locator = format!("css={} >> nth={}", fp.tag, fp.nth_index);
    SelectorCandidate {
        strategy: Strategy::TagIndex,
        css: Some(css),
        locator,
        score: 1,
        match_count: None,
        is_unique: false,
    }
}
