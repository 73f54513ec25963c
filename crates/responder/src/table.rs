//! The ordered, mutable rule table.
//!
//! Order is the match order: the first rule whose pattern matches wins.
//! Every member compiled successfully when it was added.

use crate::error::{Result, RuleError};
use crate::rule::{Builtin, Response, Rule, RuleId};

#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
    next_id: u64,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding the three administrative commands, in command order.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        for builtin in Builtin::ALL {
            if let Err(e) = table.push(builtin.pattern(), Response::Builtin(builtin)) {
                tracing::error!(command = builtin.command(), error = %e, "Built-in pattern failed to compile");
            }
        }
        table
    }

    /// Append each entry; entries whose pattern does not compile are skipped and logged.
    pub fn extend_lossy<I, P>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = (P, Response)>,
        P: Into<String>,
    {
        let mut skipped = 0;
        for (pattern, response) in entries {
            if let Err(e) = self.push(pattern, response) {
                tracing::warn!(error = %e, "We failed to compile a rule, skipping it");
                skipped += 1;
            }
        }
        skipped
    }

    fn allocate_id(&mut self) -> RuleId {
        self.next_id += 1;
        RuleId(self.next_id)
    }

    /// Append a rule at the end of the table.
    pub fn push(&mut self, pattern: impl Into<String>, response: Response) -> Result<RuleId> {
        let position = self.rules.len();
        self.insert_rule(position, pattern.into(), response)
    }

    /// Insert a static-answer rule at `position`, shifting later rules right.
    ///
    /// Valid positions are `first_editable()..=len`, so the leading built-ins
    /// keep their slots. Nothing changes on error.
    pub fn insert(&mut self, position: usize, pattern: &str, answer: &str) -> Result<RuleId> {
        let rule = self.compile_next(pattern.to_string(), Response::Static(answer.to_string()))?;
        if position < self.first_editable() {
            return Err(RuleError::IndexOutOfRange {
                index: position,
                len: self.rules.len(),
            });
        }
        self.place(position, rule)
    }

    /// First position a static rule may take: the slot after the leading built-ins.
    pub fn first_editable(&self) -> usize {
        self.rules.iter().take_while(|r| r.is_protected()).count()
    }

    fn insert_rule(&mut self, position: usize, pattern: String, response: Response) -> Result<RuleId> {
        let rule = self.compile_next(pattern, response)?;
        self.place(position, rule)
    }

    fn compile_next(&self, pattern: String, response: Response) -> Result<Rule> {
        Rule::new(RuleId(self.next_id + 1), pattern, response)
    }

    fn place(&mut self, position: usize, rule: Rule) -> Result<RuleId> {
        if position > self.rules.len() {
            return Err(RuleError::IndexOutOfRange {
                index: position,
                len: self.rules.len(),
            });
        }

        let id = self.allocate_id();
        debug_assert_eq!(id, rule.id());
        self.rules.insert(position, rule);
        Ok(id)
    }

    /// Remove the rule at `position`, shifting later rules left.
    pub fn remove(&mut self, position: usize) -> Result<Rule> {
        let rule = self.rules.get(position).ok_or(RuleError::IndexOutOfRange {
            index: position,
            len: self.rules.len(),
        })?;
        if rule.is_protected() {
            return Err(RuleError::ProtectedRule { index: position });
        }
        Ok(self.rules.remove(position))
    }

    /// Remove the rule carrying `id`, wherever it currently sits.
    pub fn remove_by_id(&mut self, id: RuleId) -> Result<(usize, Rule)> {
        let position = self.position_of(id).ok_or(RuleError::UnknownRule(id))?;
        self.remove(position).map(|rule| (position, rule))
    }

    pub fn position_of(&self, id: RuleId) -> Option<usize> {
        self.rules.iter().position(|r| r.id() == id)
    }

    pub fn get(&self, position: usize) -> Option<&Rule> {
        self.rules.get(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Markdown table of every rule in match order.
    pub fn list(&self) -> String {
        let mut out = format!("I know {} rules\n\n", self.rules.len());
        out.push_str("|   #   |   id   |   RegExp   |   Answer   |\n");
        out.push_str("| :----: | :----: |:----------:|:----------:|\n");
        for (position, rule) in self.rules.iter().enumerate() {
            let answer = match rule.response() {
                Response::Static(text) => escape_cell(text),
                Response::Builtin(builtin) => format!("_built-in: {}_", builtin.command()),
            };
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                position,
                rule.id(),
                escape_cell(rule.pattern()),
                answer
            ));
        }
        out
    }
}

/// Keep a value on one Markdown table row.
fn escape_cell(text: &str) -> String {
    text.replace('|', "&#124;").replace(|c: char| c == '\r' || c == '\n', " ")
}
