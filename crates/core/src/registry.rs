//! Variable-length thing identifiers.
//!
//! Blocks, items and drops are keyed by an ordered tuple of string parts,
//! e.g. `("stone",)` or `("mayhem", "1")`. Identifiers are validated so they
//! can double as stable config/logging keys, and render as `stone` or
//! `mayhem:1`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when parsing or constructing an invalid [`ThingId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThingIdError {
    /// The identifier had no parts at all.
    #[error("identifier cannot be empty")]
    Empty,
    /// One of the parts was empty or contained invalid characters.
    #[error("identifier part {0:?} is invalid (allowed: a-z0-9_-)")]
    InvalidPart(String),
}

/// Error returned by the block/item factories for identifiers that name
/// nothing. These are configuration errors: the triggering action must be
/// aborted, never silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FactoryError {
    /// No block is defined for this identifier.
    #[error("no block defined for {0}")]
    UnknownBlock(ThingId),
    /// No item is defined for this identifier.
    #[error("no item defined for {0}")]
    UnknownItem(ThingId),
}

/// An ordered, variable-length identifier tuple.
///
/// Ordering is lexical over the parts and is stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThingId {
    parts: Vec<String>,
}

impl ThingId {
    /// Build a single-part identifier, e.g. `ThingId::new("stone")`.
    ///
    /// Panics in debug builds if the part fails validation; use
    /// [`ThingId::from_parts`] for untrusted input.
    pub fn new(head: &str) -> Self {
        debug_assert!(validate_part(head).is_ok());
        Self {
            parts: vec![head.to_string()],
        }
    }

    /// Build an identifier from an ordered sequence of parts.
    pub fn from_parts<I, S>(parts: I) -> Result<Self, ThingIdError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parts: Vec<String> = parts.into_iter().map(Into::into).collect();
        if parts.is_empty() {
            return Err(ThingIdError::Empty);
        }
        for part in &parts {
            validate_part(part)?;
        }
        Ok(Self { parts })
    }

    /// Parse an identifier of the form `head` or `head:arg[:arg...]`.
    pub fn parse(input: &str) -> Result<Self, ThingIdError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ThingIdError::Empty);
        }
        Self::from_parts(input.split(':'))
    }

    /// First part of the identifier.
    pub fn head(&self) -> &str {
        &self.parts[0]
    }

    /// All parts, in order.
    pub fn parts(&self) -> &[String] {
        &self.parts
    }
}

impl fmt::Display for ThingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.join(":"))
    }
}

impl FromStr for ThingId {
    type Err = ThingIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn validate_part(part: &str) -> Result<(), ThingIdError> {
    if part.is_empty()
        || part.len() > 64
        || !part
            .chars()
            .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-'))
    {
        return Err(ThingIdError::InvalidPart(part.to_string()));
    }
    Ok(())
}
