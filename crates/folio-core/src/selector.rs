#![forbid(unsafe_code)]

//! Simple element selectors.
//!
//! The page markup contract only ever needs three selector shapes: `.class`,
//! `#id` and a bare tag name. Keeping the grammar this small lets the
//! in-memory tree match selectors exactly the way a browser would, while the
//! DOM adapter hands [`Selector::as_css`] straight to `querySelector`.

use std::fmt;
use std::str::FromStr;

use crate::lookup::LookupError;

/// A parsed single-token selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    Class(String),
    Id(String),
    Tag(String),
}

impl Selector {
    /// `.name`
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self::Class(name.into())
    }

    /// `#name`
    #[must_use]
    pub fn id(name: impl Into<String>) -> Self {
        Self::Id(name.into())
    }

    /// Bare tag name.
    #[must_use]
    pub fn tag(name: impl Into<String>) -> Self {
        Self::Tag(name.into())
    }

    /// Parse `.class`, `#id` or `tag`.
    ///
    /// # Errors
    ///
    /// [`LookupError::InvalidSelector`] when the input is empty or contains
    /// characters outside `[A-Za-z0-9_-]` after the prefix, or when the name
    /// is not a CSS identifier (leading digit, `-` followed by a digit, or a
    /// lone `-`).
    pub fn parse(input: &str) -> Result<Self, LookupError> {
        let trimmed = input.trim();
        let (ctor, name): (fn(String) -> Self, &str) = match trimmed.as_bytes().first() {
            Some(b'.') => (Self::Class, &trimmed[1..]),
            Some(b'#') => (Self::Id, &trimmed[1..]),
            Some(_) => (Self::Tag, trimmed),
            None => {
                return Err(LookupError::InvalidSelector {
                    input: input.to_owned(),
                    reason: "empty selector",
                });
            }
        };
        if name.is_empty() {
            return Err(LookupError::InvalidSelector {
                input: input.to_owned(),
                reason: "missing name after prefix",
            });
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(LookupError::InvalidSelector {
                input: input.to_owned(),
                reason: "only [A-Za-z0-9_-] are supported",
            });
        }
        if !is_css_ident(name) {
            return Err(LookupError::InvalidSelector {
                input: input.to_owned(),
                reason: "name is not a CSS identifier",
            });
        }
        Ok(ctor(name.to_owned()))
    }

    /// Whether an element with the given tag, id and classes matches.
    ///
    /// Tag comparison is ASCII case-insensitive, as in HTML documents.
    #[must_use]
    pub fn matches<'a>(
        &self,
        tag: &str,
        id: Option<&str>,
        mut classes: impl Iterator<Item = &'a str>,
    ) -> bool {
        match self {
            Self::Class(name) => classes.any(|c| c == name),
            Self::Id(name) => id == Some(name.as_str()),
            Self::Tag(name) => tag.eq_ignore_ascii_case(name),
        }
    }

    /// CSS text suitable for `querySelector`.
    #[must_use]
    pub fn as_css(&self) -> String {
        self.to_string()
    }
}

/// Identifier start rule for names already restricted to `[A-Za-z0-9_-]`.
fn is_css_ident(name: &str) -> bool {
    let bytes = name.as_bytes();
    match bytes {
        [] | [b'-'] => false,
        [b'-', second, ..] => !second.is_ascii_digit(),
        [first, ..] => !first.is_ascii_digit(),
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(name) => write!(f, ".{name}"),
            Self::Id(name) => write!(f, "#{name}"),
            Self::Tag(name) => f.write_str(name),
        }
    }
}

impl FromStr for Selector {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
