//! Uniqueness resolution.
//!
//! Takes one fingerprint plus the match counts observed by the probe
//! script and picks the selector to trust. When no single candidate is
//! unique, composite strategies are tried in a fixed priority order:
//! structural scoping is generally more durable than incidental text,
//! which is in turn more durable than raw layout position. Every path
//! terminates in a returned descriptor; there are no fatal conditions.

use crate::candidates::{
    escape_value, generate_candidates, tag_index_candidate, SelectorCandidate, Strategy,
};
use crate::fingerprint::{ElementFingerprint, MatchCounts};
use crate::stability::is_dynamic_text;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Minimum stability score a parent must reach before a child is scoped
/// under it. Refuses to anchor on an already-fragile ancestor.
const PARENT_SCORE_FLOOR: u8 = 5;
/// Maximum text length usable for the text-filter composite.
const FILTER_TEXT_MAX: usize = 60;

/// Lookup from walker-assigned reference id to fingerprint, used to
/// resolve `parent` references for the parent-scope composite.
#[derive(Debug, Default)]
pub struct AncestorIndex<'a> {
    by_id: HashMap<u32, &'a ElementFingerprint>,
}

impl<'a> AncestorIndex<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(elements: &'a [ElementFingerprint]) -> Self {
        Self {
            by_id: elements.iter().map(|fp| (fp.id, fp)).collect(),
        }
    }

    pub fn insert(&mut self, fp: &'a ElementFingerprint) {
        self.by_id.insert(fp.id, fp);
    }

    pub fn get(&self, id: u32) -> Option<&'a ElementFingerprint> {
        self.by_id.get(&id).copied()
    }
}

/// The resolver's output: the chosen selector and its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorDescriptor {
    pub primary: SelectorCandidate,
    /// First candidate other than the primary, kept for diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<SelectorCandidate>,
    /// Set when a composite strategy produced the primary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<SelectorCandidate>,
    pub strategy: Strategy,
    pub score: u8,
    pub is_unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_count: Option<i32>,
    /// Plain CSS form of the primary, when derivable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
}

impl SelectorDescriptor {
    fn from_primary(
        primary: SelectorCandidate,
        fallback: Option<SelectorCandidate>,
        composite: Option<SelectorCandidate>,
    ) -> Self {
        Self {
            strategy: primary.strategy,
            score: primary.score,
            is_unique: primary.is_unique,
            match_count: primary.match_count,
            css: primary.css.clone(),
            primary,
            fallback,
            composite,
        }
    }
}

/// A composite builder: combines weaker signals around the best
/// non-unique candidate. Tried in declaration order, first success wins.
struct CompositeRule {
    name: &'static str,
    build: fn(&CompositeInput) -> Option<SelectorCandidate>,
}

struct CompositeInput<'a> {
    fp: &'a ElementFingerprint,
    base: &'a SelectorCandidate,
    ancestors: &'a AncestorIndex<'a>,
    counts: &'a MatchCounts,
}

const COMPOSITE_RULES: &[CompositeRule] = &[
    CompositeRule {
        name: "parent-scope",
        build: build_parent_scope,
    },
    CompositeRule {
        name: "text-filter",
        build: build_text_filter,
    },
    CompositeRule {
        name: "index-guard",
        build: build_index_guard,
    },
];

/// Scope the child selector under the parent's own best candidate.
/// Skipped when the fingerprint declares no parent, the parent is not in
/// the index, or the parent's best score is below the stability floor.
fn build_parent_scope(input: &CompositeInput) -> Option<SelectorCandidate> {
    let parent_fp = input.ancestors.get(input.fp.parent?)?;
    if parent_fp.id == input.fp.id {
        return None;
    }
    let mut parent_candidates = generate_candidates(parent_fp);
    sort_candidates(&mut parent_candidates);
    let parent = parent_candidates.first()?;
    if parent.score < PARENT_SCORE_FLOOR {
        return None;
    }
    let css = match (&parent.css, &input.base.css) {
        (Some(p), Some(c)) => Some(format!("{p} {c}")),
        _ => None,
    };
    let score = parent.score.min(input.base.score).saturating_sub(1).max(1);
    Some(probed(
        SelectorCandidate {
            strategy: Strategy::ParentScope,
            locator: format!("{} >> {}", parent.locator, input.base.locator),
            css,
            score,
            match_count: None,
            is_unique: false,
        },
        input.counts,
    ))
}

/// Refine the base selector with a text-containment filter, when the
/// element has short non-dynamic visible text.
fn build_text_filter(input: &CompositeInput) -> Option<SelectorCandidate> {
    let text = input.fp.matching_text()?;
    if text.chars().count() > FILTER_TEXT_MAX || is_dynamic_text(text) {
        return None;
    }
    Some(probed(
        SelectorCandidate {
            strategy: Strategy::TextFilter,
            locator: format!("{} >> text=\"{}\"", input.base.locator, escape_value(text)),
            css: None,
            score: input.base.score.saturating_sub(1).max(1),
            match_count: None,
            is_unique: false,
        },
        input.counts,
    ))
}

/// Pin the base selector to the element's same-kind sibling index. The
/// steepest penalty: position is the least semantically stable signal.
fn build_index_guard(input: &CompositeInput) -> Option<SelectorCandidate> {
    Some(probed(
        SelectorCandidate {
            strategy: Strategy::IndexGuard,
            locator: format!("{} >> nth={}", input.base.locator, input.fp.nth_index),
            css: None,
            score: input.base.score.saturating_sub(3).max(1),
            match_count: None,
            is_unique: false,
        },
        input.counts,
    ))
}

/// Attach a match count to a candidate when the counts map has one,
/// keyed by CSS text first, then by locator expression.
fn probed(mut candidate: SelectorCandidate, counts: &MatchCounts) -> SelectorCandidate {
    let count = candidate
        .css
        .as_deref()
        .and_then(|css| counts.get(css))
        .or_else(|| counts.get(&candidate.locator));
    candidate.match_count = count;
    candidate.is_unique = count == Some(1);
    candidate
}

fn sort_candidates(candidates: &mut [SelectorCandidate]) {
    candidates.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.strategy.rank().cmp(&b.strategy.rank()))
    });
}

/// Resolve one fingerprint into a selector descriptor.
///
/// Never panics and never returns an error: a fingerprint with no
/// eligible attributes degrades to a tag + sibling-index selector, and
/// unresolvable uniqueness is reported through `is_unique`, not an
/// exception. Inputs are never mutated.
pub fn resolve_selector(
    fp: &ElementFingerprint,
    counts: &MatchCounts,
    ancestors: &AncestorIndex,
) -> SelectorDescriptor {
    let mut candidates = generate_candidates(fp);
    if candidates.is_empty() {
        return SelectorDescriptor::from_primary(tag_index_candidate(fp), None, None);
    }
    sort_candidates(&mut candidates);
    for candidate in candidates.iter_mut() {
        *candidate = probed(candidate.clone(), counts);
    }

    if let Some(pos) = candidates.iter().position(|c| c.is_unique) {
        let primary = candidates[pos].clone();
        let fallback = candidates
            .iter()
            .enumerate()
            .find(|(i, _)| *i != pos)
            .map(|(_, c)| c.clone());
        return SelectorDescriptor::from_primary(primary, fallback, None);
    }

    // No candidate is unique; try the composite chain around the best one.
    let best = candidates[0].clone();
    for rule in COMPOSITE_RULES {
        let input = CompositeInput {
            fp,
            base: &best,
            ancestors,
            counts,
        };
        if let Some(composite) = (rule.build)(&input) {
            debug_assert_eq!(composite.strategy.name(), rule.name);
            // A composite the caller already probed as non-unique (or
            // unparseable) did not succeed; fall through to the next rule.
            if composite.match_count.is_some_and(|n| n != 1) {
                continue;
            }
            return SelectorDescriptor::from_primary(
                composite.clone(),
                Some(best.clone()),
                Some(composite),
            );
        }
    }

    // Nothing composes either: accept the best raw candidate as-is, with
    // its own score and is_unique=false.
    let fallback = candidates.get(1).cloned();
    SelectorDescriptor::from_primary(best, fallback, None)
}

/// Resolve a whole snapshot, building the ancestor index once.
pub fn resolve_snapshot(
    elements: &[ElementFingerprint],
    counts: &MatchCounts,
) -> Vec<SelectorDescriptor> {
    let ancestors = AncestorIndex::from_snapshot(elements);
    elements
        .iter()
        .map(|fp| resolve_selector(fp, counts, &ancestors))
        .collect()
}
