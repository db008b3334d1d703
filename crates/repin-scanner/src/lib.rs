//! In-page script assets for the selector engine.
//!
//! The walker and the probe run inside the target page, a different
//! runtime from the resolver, so they are shipped as script text for
//! whatever browser-automation bridge the caller supplies.

mod probe;

pub use probe::probe_script;

/// The DOM fingerprint walker. Injected into the page, it returns a JSON
/// array of element fingerprints; feed that to
/// `repin_core::decode_snapshot`.
pub const WALKER_JS: &str = include_str!("walker.js");

/// The walker source, for callers that prefer a function.
pub fn walker_source() -> &'static str {
    WALKER_JS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::const_is_empty)]
    fn walker_source_is_shipped() {
        assert!(!WALKER_JS.is_empty());
        assert!(WALKER_JS.contains("INTERACTIVE_TAGS"));
        assert!(WALKER_JS.contains("INTERACTIVE_ROLES"));
        assert!(WALKER_JS.contains("nth_index"));
        assert!(WALKER_JS.contains("short_text"));
        assert_eq!(walker_source(), WALKER_JS);
    }
}
