// compat-suite-core/src/filter/options.rs
// ============================================================================
// Module: Option Filter Resolution
// Description: Declared option introspection and command-line filtering.
// Purpose: Carry only recognized arguments from one invocation to the next.
// Dependencies: none
// ============================================================================

//! ## Overview
//! An [`OptionSource`] reports the options a component declares. Given a raw
//! command line, [`get_valid_cli_args`] keeps the `--name value` and
//! `-c value` pairs that source recognizes, in their original order, and
//! drops everything else.
//!
//! Tokenization splits on whitespace; a double-quoted span stays one token
//! with its quotes removed. A token starting with `-` followed by a digit or
//! `.` is a value, so negative numbers can be option values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::mem;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One declared option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    /// Long name, used as `--name`.
    pub name: String,
    /// Short name, used as `-c`.
    pub short_name: Option<char>,
}

/// Component that declares command-line options.
pub trait OptionSource {
    /// Returns the declared options.
    fn option_specs(&self) -> Vec<OptionSpec>;
}

/// In-memory option declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionRegistry {
    /// Declared options in registration order.
    specs: Vec<OptionSpec>,
}

impl OptionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            specs: Vec::new(),
        }
    }

    /// Declares an option.
    #[must_use]
    pub fn with_option(mut self, name: impl Into<String>, short_name: Option<char>) -> Self {
        self.specs.push(OptionSpec {
            name: name.into(),
            short_name,
        });
        self
    }
}

impl OptionSource for OptionRegistry {
    fn option_specs(&self) -> Vec<OptionSpec> {
        self.specs.clone()
    }
}

/// Classified command-line token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    /// `--name` or `-c`, expecting a value in the next token.
    Flag {
        /// Name without dashes.
        name: &'a str,
        /// True for the single-dash form.
        short: bool,
    },
    /// `--name=value`.
    Inline {
        /// Name without dashes.
        name: &'a str,
    },
    /// Anything else.
    Value,
}

// ============================================================================
// SECTION: Introspection
// ============================================================================

/// Returns the long names declared by `source`.
#[must_use]
pub fn get_option_names<S: OptionSource + ?Sized>(source: &S) -> BTreeSet<String> {
    source.option_specs().into_iter().map(|spec| spec.name).collect()
}

/// Returns the short names declared by `source`.
#[must_use]
pub fn get_option_short_names<S: OptionSource + ?Sized>(source: &S) -> BTreeSet<String> {
    source
        .option_specs()
        .into_iter()
        .filter_map(|spec| spec.short_name)
        .map(String::from)
        .collect()
}

// ============================================================================
// SECTION: Filtering
// ============================================================================

/// Returns the option/value pairs in `command_line` that `source` declares.
#[must_use]
pub fn get_valid_cli_args<S: OptionSource + ?Sized>(command_line: &str, source: &S) -> Vec<String> {
    let names = get_option_names(source);
    let short_names = get_option_short_names(source);
    let recognized = |name: &str, short: bool| {
        if short { short_names.contains(name) } else { names.contains(name) }
    };

    let tokens = tokenize(command_line);
    let mut valid = Vec::new();
    let mut index = 0;
    while let Some(token) = tokens.get(index) {
        index += 1;
        match classify(token) {
            Token::Value => {}
            Token::Inline {
                name,
            } => {
                if recognized(name, false) {
                    valid.push(token.clone());
                }
            }
            Token::Flag {
                name,
                short,
            } => {
                let Some(value) = tokens.get(index).filter(|next| classify(next) == Token::Value)
                else {
                    continue;
                };
                index += 1;
                if recognized(name, short) {
                    valid.push(token.clone());
                    valid.push(value.clone());
                }
            }
        }
    }
    valid
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Splits on whitespace outside double quotes; quotes are removed.
fn tokenize(command_line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut in_token = false;
    for ch in command_line.chars() {
        if ch == '"' {
            quoted = !quoted;
            in_token = true;
        } else if ch.is_whitespace() && !quoted {
            if in_token {
                tokens.push(mem::take(&mut current));
                in_token = false;
            }
        } else {
            current.push(ch);
            in_token = true;
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

/// Classifies one token.
fn classify(token: &str) -> Token<'_> {
    if let Some(long) = token.strip_prefix("--") {
        if long.is_empty() {
            return Token::Value;
        }
        return match long.split_once('=') {
            Some((name, _)) => Token::Inline {
                name,
            },
            None => Token::Flag {
                name: long,
                short: false,
            },
        };
    }
    match token.strip_prefix('-') {
        Some(short) if short.starts_with(|ch: char| ch.is_ascii_alphabetic()) => Token::Flag {
            name: short,
            short: true,
        },
        _ => Token::Value,
    }
}
