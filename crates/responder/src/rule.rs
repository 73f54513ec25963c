//! A single pattern-to-response mapping.

use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::error::{Result, RuleError};

/// Compiled program size cap for user-supplied patterns.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Stable identifier handed out at insertion time, never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub u64);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The administrative commands that are wired into the table as rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    ListEntries,
    DeleteEntry,
    AddEntry,
}

impl Builtin {
    pub const ALL: [Builtin; 3] = [Builtin::ListEntries, Builtin::DeleteEntry, Builtin::AddEntry];

    pub fn command(&self) -> &'static str {
        match self {
            Builtin::ListEntries => "list_entries",
            Builtin::DeleteEntry => "entries_delete",
            Builtin::AddEntry => "entries_add",
        }
    }

    /// Trigger pattern: the command word delimited by non-word characters or the text edges.
    pub fn pattern(&self) -> String {
        format!(r"(?:^|\W){}(?:$|\W)", self.command())
    }

    /// Whether the command changes the table and therefore needs an admin.
    pub fn mutates(&self) -> bool {
        !matches!(self, Builtin::ListEntries)
    }
}

/// What a rule answers with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Reply verbatim.
    Static(String),
    /// Run an administrative command.
    Builtin(Builtin),
}

#[derive(Debug, Clone)]
pub struct Rule {
    id: RuleId,
    pattern: String,
    matcher: Regex,
    response: Response,
}

impl Rule {
    pub fn new(id: RuleId, pattern: impl Into<String>, response: Response) -> Result<Self> {
        let pattern = pattern.into();
        let matcher = compile(&pattern)?;
        Ok(Self {
            id,
            pattern,
            matcher,
            response,
        })
    }

    pub fn id(&self) -> RuleId {
        self.id
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    /// True if the pattern matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }

    /// Built-in rules cannot be deleted.
    pub fn is_protected(&self) -> bool {
        matches!(self.response, Response::Builtin(_))
    }
}

/// Compile a pattern the way every rule is compiled.
pub fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
        .map_err(|e| RuleError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_anywhere_in_text() {
        let rule = Rule::new(RuleId(1), "hello", Response::Static("Hi".into())).unwrap();
        assert!(rule.is_match("well hello there"));
        assert!(!rule.is_match("goodbye"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = Rule::new(RuleId(1), "(unclosed", Response::Static("x".into())).unwrap_err();
        match err {
            RuleError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "(unclosed"),
            other => panic!("expected InvalidPattern, got: {:?}", other),
        }
    }

    #[test]
    fn builtin_patterns_need_word_boundaries() {
        let rule = Rule::new(
            RuleId(1),
            Builtin::ListEntries.pattern(),
            Response::Builtin(Builtin::ListEntries),
        )
        .unwrap();
        assert!(rule.is_match("list_entries"));
        assert!(rule.is_match("please list_entries now"));
        assert!(!rule.is_match("list_entriesX"));
        assert!(rule.is_protected());
    }

    #[test]
    fn only_delete_and_add_mutate() {
        assert!(!Builtin::ListEntries.mutates());
        assert!(Builtin::DeleteEntry.mutates());
        assert!(Builtin::AddEntry.mutates());
    }

    #[test]
    fn rule_id_display() {
        assert_eq!(RuleId(7).to_string(), "#7");
    }
}
