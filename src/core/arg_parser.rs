// EN: src/core/arg_parser.rs

use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineParseError {
    #[error("Argument '{0}' appears more than once.")]
    DuplicateArgument(String),
}

/// One whitespace-delimited word of the input line, with quotes and escapes removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// Byte offset of the first character of the raw token.
    pub start: usize,
    /// Byte offset one past the last character of the raw token.
    pub end: usize,
    /// True when whitespace follows the token, i.e. the user has finished typing it.
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NamedArg {
    value: Option<String>,
    complete: bool,
}

/// An immutable snapshot of one input line.
///
/// The first token is the command name. `--name=value` and `--name` tokens are named
/// arguments, keyed by their full flag (`--name`); everything else is positional.
/// Every argument remembers whether its token was complete when the line was captured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLine {
    tokens: Vec<Token>,
    positional: Vec<Token>,
    named: HashMap<String, NamedArg>,
}

impl ParsedLine {
    /// Tokenizes and classifies `line`.
    ///
    /// # Errors
    /// Returns `LineParseError::DuplicateArgument` if a named argument is given twice.
    pub fn parse(line: &str) -> Result<Self, LineParseError> {
        let tokens = tokenize(line);
        let mut positional = Vec::new();
        let mut named = HashMap::new();

        for token in tokens.iter().skip(1) {
            match split_named(&token.text) {
                Some((flag, value)) => {
                    if named.contains_key(flag) {
                        return Err(LineParseError::DuplicateArgument(flag.to_string()));
                    }
                    named.insert(
                        flag.to_string(),
                        NamedArg {
                            value: value.map(str::to_string),
                            complete: token.complete,
                        },
                    );
                }
                None => positional.push(token.clone()),
            }
        }

        Ok(Self {
            tokens,
            positional,
            named,
        })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The first word of the line.
    pub fn command_name(&self) -> Option<&str> {
        self.tokens.first().map(|token| token.text.as_str())
    }

    /// Positional argument `index`, not counting the command name.
    pub fn positional(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(|token| token.text.as_str())
    }

    pub fn positional_count(&self) -> usize {
        self.positional.len()
    }

    pub fn is_positional_complete(&self, index: usize) -> bool {
        self.positional.get(index).is_some_and(|token| token.complete)
    }

    pub fn has_property(&self, flag: &str) -> bool {
        self.named.contains_key(flag)
    }

    /// The value of `--flag=value`; `None` if absent or given without `=`.
    pub fn property_value(&self, flag: &str) -> Option<&str> {
        self.named.get(flag).and_then(|arg| arg.value.as_deref())
    }

    pub fn is_value_complete(&self, flag: &str) -> bool {
        self.named
            .get(flag)
            .is_some_and(|arg| arg.value.is_some() && arg.complete)
    }

    pub fn has_named_arguments(&self) -> bool {
        !self.named.is_empty()
    }

    /// The last token, if the user is still typing it.
    pub fn incomplete_token(&self) -> Option<&Token> {
        self.tokens.last().filter(|token| !token.complete)
    }
}

/// Splits `--name=value` into `("--name", Some("value"))` and `--name` into `("--name", None)`.
fn split_named(text: &str) -> Option<(&str, Option<&str>)> {
    let body = text.strip_prefix("--")?;
    if body.is_empty() || body.starts_with('=') {
        return None;
    }
    match text.find('=') {
        Some(eq) => Some((text.get(..eq)?, text.get(eq + 1..))),
        None => Some((text, None)),
    }
}

/// Splits a line into tokens. Double or single quotes group whitespace and `\` escapes
/// the next character; both are removed from the token text but kept in the byte span.
pub fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current: Option<(usize, String)> = None;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, ch) in line.char_indices() {
        if escaped {
            current.get_or_insert_with(|| (i, String::new())).1.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' => {
                current.get_or_insert_with(|| (i, String::new()));
                escaped = true;
            }
            '"' | '\'' if quote.is_none() => {
                current.get_or_insert_with(|| (i, String::new()));
                quote = Some(ch);
            }
            c if quote == Some(c) => quote = None,
            c if c.is_whitespace() && quote.is_none() => {
                if let Some((start, text)) = current.take() {
                    tokens.push(Token {
                        text,
                        start,
                        end: i,
                        complete: true,
                    });
                }
            }
            c => current.get_or_insert_with(|| (i, String::new())).1.push(c),
        }
    }

    if let Some((start, text)) = current.take() {
        tokens.push(Token {
            text,
            start,
            end: line.len(),
            complete: false,
        });
    }
    tokens
}

// MARK: --- UNIT TESTS ---
