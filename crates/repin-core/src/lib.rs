//! Selector engine: turns captured element fingerprints into selectors
//! that re-identify the same element on a later page load.
//!
//! Everything here is a pure, synchronous function of its inputs. The two
//! pieces that need a live page, the fingerprint walker and the uniqueness
//! probe, live in `repin-scanner` as script assets; this crate only
//! consumes their output, so it runs anywhere (analysis, replay, tests).

pub mod candidates;
pub mod fast;
pub mod fingerprint;
pub mod resolve;
pub mod stability;

pub use candidates::{generate_candidates, SelectorCandidate, Strategy};
pub use fast::fast_css_selector;
pub use fingerprint::{
    decode_snapshot, ElementFingerprint, MatchCounts, Rect, SnapshotError, TEST_ID_ATTRIBUTES,
};
pub use resolve::{resolve_selector, resolve_snapshot, AncestorIndex, SelectorDescriptor};
pub use stability::{is_dynamic_id, is_dynamic_text, map_aria_role, stable_text_portion};
