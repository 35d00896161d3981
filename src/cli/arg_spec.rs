// src/cli/arg_spec.rs

//! Argument grammar as data.
//!
//! A handler declares its arguments once as a table of [`ArgSpec`] records. The table answers
//! two questions about any [`ParsedLine`]: what value an argument has, and whether the argument
//! may appear next. Completion uses the second one to decide what to offer.

use crate::{
    cli::completion::CompletionProvider,
    core::arg_parser::{LineParseError, ParsedLine, tokenize},
};
use std::fmt;

/// Index of an argument in its [`ArgTable`].
pub type ArgId = usize;

/// Custom "may appear next" rule, evaluated after the ordering constraints.
pub type Eligibility = Box<dyn Fn(&ArgTable, &ParsedLine) -> bool + Send + Sync>;

/// Declarative description of one argument.
pub struct ArgSpec {
    pub flag: &'static str,
    /// Index among the positional arguments, for arguments that may also be given bare.
    pub position: Option<usize>,
    /// `--flag=value` when true, a bare `--flag` switch otherwise.
    pub takes_value: bool,
    pub completer: Option<CompletionProvider>,
    /// Arguments that must already have a complete value.
    pub requires_preceding: Vec<ArgId>,
    /// Arguments whose presence rules this one out.
    pub cant_appear_after: Vec<ArgId>,
    /// Replaces the default rule ("not present yet") when set.
    pub eligibility: Option<Eligibility>,
}

impl fmt::Debug for ArgSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgSpec")
            .field("flag", &self.flag)
            .field("position", &self.position)
            .field("takes_value", &self.takes_value)
            .field("completer", &self.completer)
            .field("requires_preceding", &self.requires_preceding)
            .field("cant_appear_after", &self.cant_appear_after)
            .field("eligibility", &self.eligibility.as_ref().map(|_| "custom"))
            .finish()
    }
}

impl ArgSpec {
    /// A named argument taking a value, with no constraints.
    pub fn new(flag: &'static str) -> Self {
        Self {
            flag,
            position: None,
            takes_value: true,
            completer: None,
            requires_preceding: Vec::new(),
            cant_appear_after: Vec::new(),
            eligibility: None,
        }
    }

    pub fn at_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    pub fn switch(mut self) -> Self {
        self.takes_value = false;
        self
    }

    pub fn completed_by(mut self, provider: CompletionProvider) -> Self {
        self.completer = Some(provider);
        self
    }

    pub fn requires(mut self, preceding: &[ArgId]) -> Self {
        self.requires_preceding.extend_from_slice(preceding);
        self
    }

    pub fn not_after(mut self, others: &[ArgId]) -> Self {
        self.cant_appear_after.extend_from_slice(others);
        self
    }

    pub fn eligible_when(
        mut self,
        rule: impl Fn(&ArgTable, &ParsedLine) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.eligibility = Some(Box::new(rule));
        self
    }

    /// What completion inserts for the argument name.
    fn completion_name(&self) -> String {
        if self.takes_value {
            format!("{}=", self.flag)
        } else {
            self.flag.to_string()
        }
    }
}

/// An immutable, ordered set of arguments. Ids are indices into the table.
#[derive(Debug)]
pub struct ArgTable {
    specs: Vec<ArgSpec>,
}

impl ArgTable {
    pub fn new(specs: Vec<ArgSpec>) -> Self {
        Self { specs }
    }

    pub fn get(&self, id: ArgId) -> Option<&ArgSpec> {
        self.specs.get(id)
    }

    pub fn by_flag(&self, flag: &str) -> Option<ArgId> {
        self.specs.iter().position(|spec| spec.flag == flag)
    }

    pub fn positional_at(&self, index: usize) -> Option<ArgId> {
        self.specs
            .iter()
            .position(|spec| spec.position == Some(index))
    }

    /// True if the argument was given, by name or at its position.
    pub fn is_present(&self, id: ArgId, line: &ParsedLine) -> bool {
        let Some(spec) = self.get(id) else {
            return false;
        };
        line.has_property(spec.flag)
            || spec
                .position
                .is_some_and(|position| line.positional(position).is_some())
    }

    /// The argument's value. A named value wins over a positional one.
    pub fn value<'l>(&self, id: ArgId, line: &'l ParsedLine) -> Option<&'l str> {
        let spec = self.get(id)?;
        line.property_value(spec.flag)
            .or_else(|| spec.position.and_then(|position| line.positional(position)))
    }

    /// True if the argument has a value the user has finished typing.
    pub fn is_value_complete(&self, id: ArgId, line: &ParsedLine) -> bool {
        let Some(spec) = self.get(id) else {
            return false;
        };
        line.is_value_complete(spec.flag)
            || spec
                .position
                .is_some_and(|position| line.is_positional_complete(position))
    }

    /// Whether the argument may appear next on `line`.
    ///
    /// Ordering constraints are checked first, so an argument is never eligible while one of its
    /// required predecessors lacks a complete value.
    pub fn can_appear_next(&self, id: ArgId, line: &ParsedLine) -> bool {
        let Some(spec) = self.get(id) else {
            return false;
        };
        if spec
            .cant_appear_after
            .iter()
            .any(|other| self.is_present(*other, line))
        {
            return false;
        }
        if !spec
            .requires_preceding
            .iter()
            .all(|other| self.is_value_complete(*other, line))
        {
            return false;
        }
        match &spec.eligibility {
            Some(rule) => rule(self, line),
            None => !self.is_present(id, line),
        }
    }

    /// Names (`--flag=` or `--flag`) of every argument that may appear next, in table order.
    pub fn eligible_names(&self, line: &ParsedLine) -> Vec<String> {
        (0..self.specs.len())
            .filter(|id| self.can_appear_next(*id, line))
            .filter_map(|id| self.get(id).map(ArgSpec::completion_name))
            .collect()
    }
}

/// What the cursor sits on at the end of a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionTarget {
    /// `--flag=partial`
    Value {
        flag: String,
        partial: String,
        offset: usize,
    },
    /// `--fla`
    ArgName { partial: String, offset: usize },
    /// A bare word at positional `index`.
    Positional {
        index: usize,
        partial: String,
        offset: usize,
    },
    /// Whitespace: nothing typed yet.
    NewToken { offset: usize },
}

/// Splits `buffer` into the line before the token under the cursor and that token.
///
/// # Errors
/// Returns the parse error of the preceding line (a duplicated named argument).
pub fn locate(buffer: &str) -> Result<(ParsedLine, CompletionTarget), LineParseError> {
    let tokens = tokenize(buffer);
    let typing = tokens
        .last()
        .filter(|token| !token.complete && tokens.len() > 1);

    let Some(token) = typing else {
        return Ok((
            ParsedLine::parse(buffer)?,
            CompletionTarget::NewToken {
                offset: buffer.len(),
            },
        ));
    };

    let preceding = ParsedLine::parse(buffer.get(..token.start).unwrap_or_default())?;
    let target = if token.text.starts_with("--") {
        match token.text.split_once('=') {
            Some((flag, partial)) => {
                let raw = buffer.get(token.start..token.end).unwrap_or_default();
                let offset = raw
                    .find('=')
                    .map_or(token.end, |eq| token.start + eq + 1);
                CompletionTarget::Value {
                    flag: flag.to_string(),
                    partial: partial.to_string(),
                    offset,
                }
            }
            None => CompletionTarget::ArgName {
                partial: token.text.clone(),
                offset: token.start,
            },
        }
    } else {
        CompletionTarget::Positional {
            index: preceding.positional_count(),
            partial: token.text.clone(),
            offset: token.start,
        }
    };
    Ok((preceding, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRST: ArgId = 0;
    const SECOND: ArgId = 1;
    const STOP: ArgId = 2;

    fn table() -> ArgTable {
        ArgTable::new(vec![
            ArgSpec::new("--first").at_position(0).not_after(&[STOP]),
            ArgSpec::new("--second").requires(&[FIRST]),
            ArgSpec::new("--stop").switch(),
        ])
    }

    fn line(text: &str) -> ParsedLine {
        ParsedLine::parse(text).unwrap()
    }

    #[test]
    fn test_named_or_positional_value() {
        let table = table();
        assert_eq!(table.value(FIRST, &line("cmd one ")), Some("one"));
        assert_eq!(table.value(FIRST, &line("cmd --first=two ")), Some("two"));
        assert!(table.is_present(FIRST, &line("cmd one")));
        assert!(!table.is_value_complete(FIRST, &line("cmd one")));
        assert!(table.is_value_complete(FIRST, &line("cmd one ")));
        assert_eq!(table.value(SECOND, &line("cmd one")), None);
    }

    #[test]
    fn test_ordering_constraints() {
        let table = table();
        assert!(table.can_appear_next(FIRST, &line("cmd ")));
        assert!(!table.can_appear_next(FIRST, &line("cmd --stop ")));
        assert!(!table.can_appear_next(FIRST, &line("cmd --first=x ")));

        assert!(!table.can_appear_next(SECOND, &line("cmd ")));
        assert!(!table.can_appear_next(SECOND, &line("cmd --first=x")));
        assert!(table.can_appear_next(SECOND, &line("cmd --first=x ")));
        assert!(table.can_appear_next(SECOND, &line("cmd x ")));
    }

    #[test]
    fn test_custom_rule_runs_after_constraints() {
        let table = ArgTable::new(vec![
            ArgSpec::new("--first"),
            ArgSpec::new("--second")
                .requires(&[FIRST])
                .eligible_when(|_, _| true),
        ]);
        assert!(!table.can_appear_next(SECOND, &line("cmd ")));
        assert!(table.can_appear_next(SECOND, &line("cmd --first=x --second=y ")));
    }

    #[test]
    fn test_eligible_names() {
        let table = table();
        assert_eq!(table.eligible_names(&line("cmd ")), vec!["--first=", "--stop"]);
        assert_eq!(
            table.eligible_names(&line("cmd --first=a ")),
            vec!["--second=", "--stop"]
        );
        assert!(table.eligible_names(&line("cmd --stop --first=a --second=b ")).is_empty());
    }

    #[test]
    fn test_locate_targets() {
        let (preceding, target) = locate("command --action=ad").unwrap();
        assert!(!preceding.has_named_arguments());
        assert_eq!(
            target,
            CompletionTarget::Value {
                flag: "--action".to_string(),
                partial: "ad".to_string(),
                offset: 17,
            }
        );

        let (_, target) = locate("command --act").unwrap();
        assert_eq!(
            target,
            CompletionTarget::ArgName {
                partial: "--act".to_string(),
                offset: 8,
            }
        );

        let (_, target) = locate("command --action=add  re").unwrap();
        assert_eq!(
            target,
            CompletionTarget::Positional {
                index: 0,
                partial: "re".to_string(),
                offset: 22,
            }
        );

        let (preceding, target) = locate("command --action=add ").unwrap();
        assert_eq!(preceding.property_value("--action"), Some("add"));
        assert_eq!(target, CompletionTarget::NewToken { offset: 21 });
    }

    #[test]
    fn test_locate_rejects_duplicate_arguments() {
        assert!(locate("command --action=add --action=list --x").is_err());
    }
}
