// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! SQL-LIKE name patterns
//!
//! `%` matches any run of characters, `_` matches exactly one character and a
//! backslash escapes the character that follows it. Whether a match ignores
//! case is decided by the caller, usually from the owning namespace's flag.

use regex::{Regex, RegexBuilder};
use std::fmt;

#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    contains_wildcards: bool,
    exact: Regex,
    folded: Regex,
}

impl Pattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        let source = pattern.into();
        let (expression, contains_wildcards) = translate(&source);

        // The expression only contains escaped literals and `.`/`.*`, so
        // compilation cannot fail.
        let exact = RegexBuilder::new(&expression)
            .build()
            .unwrap_or_else(|_| unreachable!("translated LIKE pattern is always valid"));
        let folded = RegexBuilder::new(&expression)
            .case_insensitive(true)
            .build()
            .unwrap_or_else(|_| unreachable!("translated LIKE pattern is always valid"));

        Self {
            source,
            contains_wildcards,
            exact,
            folded,
        }
    }

    /// A pattern that matches `name` literally
    pub fn literal(name: &str) -> Self {
        let mut escaped = String::with_capacity(name.len());
        for c in name.chars() {
            if matches!(c, '%' | '_' | '\\') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        Self::new(escaped)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn contains_wildcards(&self) -> bool {
        self.contains_wildcards
    }

    pub fn matches(&self, name: &str, case_sensitive: bool) -> bool {
        if case_sensitive {
            self.exact.is_match(name)
        } else {
            self.folded.is_match(name)
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern[{}]", self.source)
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        Pattern::new(s)
    }
}

fn translate(pattern: &str) -> (String, bool) {
    let mut expression = String::with_capacity(pattern.len() + 8);
    let mut wildcards = false;
    let mut chars = pattern.chars();
    let mut buf = [0u8; 4];

    expression.push('^');
    while let Some(c) = chars.next() {
        match c {
            '%' => {
                wildcards = true;
                expression.push_str(".*");
            }
            '_' => {
                wildcards = true;
                expression.push('.');
            }
            '\\' => match chars.next() {
                Some(escaped) => expression.push_str(&regex::escape(escaped.encode_utf8(&mut buf))),
                None => expression.push_str(&regex::escape("\\")),
            },
            other => expression.push_str(&regex::escape(other.encode_utf8(&mut buf))),
        }
    }
    expression.push('$');

    (expression, wildcards)
}

/// Compare two names the way a namespace with the given flag would
pub(crate) fn names_equal(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.to_lowercase() == b.to_lowercase()
    }
}
