//! # Argument Map
//!
//! The build scripts take a tiny set of informal flags (`-c debug`, `-p editor`).
//! Rather than teach `clap` every one of them, the raw tokens after the sub-command
//! are folded into a flat `name -> value` map and looked up with a default.
//!
//! Accepted shapes:
//! - `-c release` / `--config release`
//! - `-c=release` / `config=release`
//! - a bare `-x` with nothing after it maps to the empty string.

use std::collections::HashMap;
use std::fmt;

/// A flag the scripts understand, known by a short and a long name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flag {
    pub short: &'static str,
    pub long: &'static str,
}

/// Build configuration (`-c`, `--config`).
pub const CONFIG: Flag = Flag { short: "c", long: "config" };

/// Project to launch (`-p`, `--project`).
pub const PROJECT: Flag = Flag { short: "p", long: "project" };

/// Immutable mapping from flag name to raw value, built once per invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentMap {
    values: HashMap<String, String>,
}

impl ArgumentMap {
    /// Folds a raw argument vector into a map.
    ///
    /// Tokens that are neither a flag nor the value of a preceding flag are ignored.
    /// When a flag repeats, the last occurrence wins.
    pub fn parse<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = HashMap::new();
        let mut pending: Option<String> = None;

        for token in raw {
            let token = token.as_ref();

            if let Some(name) = flag_name(token) {
                if let Some(prev) = pending.take() {
                    values.insert(prev, String::new());
                }
                match name.split_once('=') {
                    Some((key, value)) => {
                        values.insert(key.to_string(), value.to_string());
                    }
                    None => pending = Some(name.to_string()),
                }
                continue;
            }

            if let Some(key) = pending.take() {
                values.insert(key, token.to_string());
            } else if let Some((key, value)) = token.split_once('=') {
                if !key.is_empty() {
                    values.insert(key.to_string(), value.to_string());
                }
            }
        }

        if let Some(key) = pending {
            values.insert(key, String::new());
        }

        Self { values }
    }

    /// Returns the value supplied for `flag`, or `default` when it was never given.
    ///
    /// The long name wins over the short one if both were supplied.
    pub fn value_or(&self, flag: Flag, default: &str) -> String {
        self.values
            .get(flag.long)
            .or_else(|| self.values.get(flag.short))
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }
}

impl fmt::Display for ArgumentMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();
        write!(f, "{{")?;
        for (i, key) in keys.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:?}", key, self.values[*key])?;
        }
        write!(f, "}}")
    }
}

/// Strips the leading dashes off a flag token. Returns `None` for values,
/// including negative numbers and a lone `-`.
fn flag_name(token: &str) -> Option<&str> {
    let name = token
        .strip_prefix("--")
        .or_else(|| token.strip_prefix('-'))?;
    match name.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => Some(name),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn short_and_long_names_resolve() {
        let args = ArgumentMap::parse(["-c", "release", "--project", "editor"]);
        assert_eq!(args.value_or(CONFIG, "debug"), "release");
        assert_eq!(args.value_or(PROJECT, "sandbox"), "editor");
        assert_eq!(args.to_string(), r#"{c: "release", project: "editor"}"#);
    }

    #[test]
    fn equals_forms_are_accepted() {
        let args = ArgumentMap::parse(["-c=release", "project=launcher"]);
        assert_eq!(args.value_or(CONFIG, "debug"), "release");
        assert_eq!(args.value_or(PROJECT, "sandbox"), "launcher");
    }

    #[test]
    fn bare_flag_maps_to_empty_string() {
        let args = ArgumentMap::parse(["-p", "-c"]);
        assert_eq!(args.value_or(PROJECT, "sandbox"), "");
        assert_eq!(args.value_or(CONFIG, "debug"), "");
    }

    #[test]
    fn unknown_tokens_and_flags_are_ignored() {
        let args = ArgumentMap::parse(["stray", "-x", "1", "-", "-5"]);
        assert_eq!(args.value_or(CONFIG, "debug"), "debug");
        assert_eq!(args.value_or(PROJECT, "sandbox"), "sandbox");
    }

    #[test]
    fn last_occurrence_wins() {
        let args = ArgumentMap::parse(["-c", "debug", "-c", "release"]);
        assert_eq!(args.value_or(CONFIG, "debug"), "release");
    }

    #[test]
    fn display_is_sorted() {
        let args = ArgumentMap::parse(["-p", "editor", "-c", "release"]);
        assert_eq!(args.to_string(), r#"{c: "release", p: "editor"}"#);
    }

    proptest! {
        #[test]
        fn unspecified_flags_fall_back_to_default(
            tokens in prop::collection::vec("(-[a-bd-oq-z]|[a-z]{1,6})", 0..12),
            default in "[a-z]{1,8}"
        ) {
            // No token can spell -c/-p or their long names, so both must default.
            let args = ArgumentMap::parse(&tokens);
            prop_assert_eq!(args.value_or(CONFIG, &default), default.clone());
            prop_assert_eq!(args.value_or(PROJECT, &default), default);
        }
    }
}
