//! Chat commands that inspect and edit the rule table.
//!
//! ```text
//! list_entries
//! entries_delete <index>|#<id>
//! entries_add <index> When <pattern> answer <responseText>
//! ```
//!
//! Callers check authorization before running a mutating command. Every
//! failure is answered with a message and leaves the table untouched.

use regex::Regex;

use crate::error::{Result, RuleError};
use crate::rule::{Builtin, RuleId};
use crate::table::RuleTable;

pub const NOT_ADMIN: &str = "No never, you are not a team administrator.";
pub const ADD_USAGE: &str = "entries_add <index> When <pattern> answer <responseText>";

const ADD_GRAMMAR: &str = r"entries_add\s+([0-9]+)\s+When\s+(.+)\s+answer\s+(.+)";

/// Parses and runs the built-in commands.
#[derive(Debug, Clone)]
pub struct AdminCommands {
    add_grammar: Regex,
}

impl AdminCommands {
    pub fn new() -> Result<Self> {
        Ok(Self {
            add_grammar: crate::rule::compile(ADD_GRAMMAR)?,
        })
    }

    /// Run `builtin` against the table. Authorization is the caller's business.
    pub fn execute(&self, builtin: Builtin, table: &mut RuleTable, text: &str) -> String {
        match builtin {
            Builtin::ListEntries => table.list(),
            Builtin::DeleteEntry => delete_entry(table, text),
            Builtin::AddEntry => self.add_entry(table, text),
        }
    }

    fn add_entry(&self, table: &mut RuleTable, text: &str) -> String {
        let Some(caps) = self.add_grammar.captures(text) else {
            return format!("No comprendo. Must be something along: {}", ADD_USAGE);
        };
        let raw_index = &caps[1];
        let pattern = caps[2].trim();
        let answer = caps[3].trim();
        if pattern.is_empty() || answer.is_empty() {
            return format!("No comprendo. Must be something along: {}", ADD_USAGE);
        }

        let Ok(index) = raw_index.parse::<usize>() else {
            return format!("I do not understand which index you wanted to insert: {}", raw_index);
        };

        match table.insert(index, pattern, answer) {
            Ok(id) => {
                tracing::info!(rule = %id, position = index, pattern, "Rule added");
                table.list()
            }
            Err(RuleError::InvalidPattern { pattern, .. }) => {
                format!("This is not a valid regular expression: {}", pattern)
            }
            Err(RuleError::IndexOutOfRange { index, len }) => format!(
                "I cannot insert at {}, positions go from {} to {}.",
                index,
                table.first_editable(),
                len
            ),
            Err(e) => format!("I could not add that rule: {}", e),
        }
    }
}

/// How a delete command names its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Position(usize),
    Id(RuleId),
}

fn parse_target(token: &str) -> Option<Target> {
    match token.strip_prefix('#') {
        Some(id) => id.parse().ok().map(|n| Target::Id(RuleId(n))),
        None => token.parse().ok().map(Target::Position),
    }
}

fn delete_entry(table: &mut RuleTable, text: &str) -> String {
    let token = text.split_whitespace().nth(1).unwrap_or("");
    let Some(target) = parse_target(token) else {
        return format!("I do not understand which entry you wanted to delete: {}", token);
    };

    let result = match target {
        Target::Position(position) => table.remove(position),
        Target::Id(id) => table.remove_by_id(id).map(|(_, rule)| rule),
    };

    match result {
        Ok(rule) => {
            tracing::info!(rule = %rule.id(), pattern = rule.pattern(), "Rule deleted");
            format!("Done. I have deleted {}", token)
        }
        Err(RuleError::ProtectedRule { .. }) => "Sorry, I cannot delete an internal command!".to_string(),
        Err(RuleError::IndexOutOfRange { index, len }) => {
            format!("There is no entry {}, I only know {} rules.", index, len)
        }
        Err(RuleError::UnknownRule(id)) => format!("There is no rule with id {}.", id),
        Err(e) => format!("I could not delete that rule: {}", e),
    }
}
