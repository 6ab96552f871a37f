//! Ordered rule checklist
//!
//! The Panta and Kandler schemes are published as lists of independent
//! checks rather than a nested tree. Every check is evaluated against every
//! row and a matching check overwrites the label assigned so far, so the
//! **last matching rule in declaration order** decides the row. Rules near
//! each other's boundaries can overlap; the declared order is the tie-break
//! and must not be reordered.
//!
//! The same apply-then-overwrite order is used for the grouping pass.

use super::MineralLabel;

/// A labelled predicate over one row of ratios.
pub struct Rule<R, L> {
    pub label: L,
    pub check: fn(&R) -> bool,
}

impl<R, L: Copy> Clone for Rule<R, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, L: Copy> Copy for Rule<R, L> {}

pub const fn rule<R, L>(label: L, check: fn(&R) -> bool) -> Rule<R, L> {
    Rule { label, check }
}

/// Run the checklist: start at the default (unknown) label and let every
/// matching rule overwrite it.
pub fn apply<R, L: MineralLabel>(rules: &[Rule<R, L>], ratios: &R) -> L {
    rules.iter().fold(L::default(), |current, rule| {
        if (rule.check)(ratios) {
            rule.label
        } else {
            current
        }
    })
}

/// Every rule that matches a row, in declaration order.
///
/// Useful for spotting rows where the tie-break decided the outcome.
pub fn matching<R, L: MineralLabel>(rules: &[Rule<R, L>], ratios: &R) -> Vec<L> {
    rules
        .iter()
        .filter(|rule| (rule.check)(ratios))
        .map(|rule| rule.label)
        .collect()
}

/// One grouping entry: every member leaf maps to `group`.
#[derive(Debug, Clone, Copy)]
pub struct GroupRule<L: 'static> {
    pub group: &'static str,
    pub members: &'static [L],
}

/// Coarse group for a leaf label.
///
/// Entries are applied in order and later entries overwrite earlier ones.
/// A leaf that no entry lists keeps `leaf_code` as its group.
pub fn group_of<'a, L, Q>(groups: &[GroupRule<L>], leaf: &Q, leaf_code: &'a str) -> &'a str
where
    L: PartialEq<Q>,
    Q: ?Sized,
{
    groups.iter().fold(leaf_code, |current, entry| {
        if entry.members.iter().any(|member| member == leaf) {
            entry.group
        } else {
            current
        }
    })
}
