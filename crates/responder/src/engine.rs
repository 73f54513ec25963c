//! First-match-wins lookup over the rule table.

use crate::rule::Rule;
use crate::table::RuleTable;

/// The rule that fired for a piece of text.
#[derive(Debug, Clone, Copy)]
pub struct Match<'t> {
    pub position: usize,
    pub rule: &'t Rule,
}

/// Scan the table in order and return the first rule matching anywhere in `text`.
pub fn first_match<'t>(table: &'t RuleTable, text: &str) -> Option<Match<'t>> {
    table
        .iter()
        .enumerate()
        .find(|(_, rule)| rule.is_match(text))
        .map(|(position, rule)| Match { position, rule })
}
