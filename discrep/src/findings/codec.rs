//! Packed string form of a [`Finding`].
//!
//! Keys are joined to the locator with one delimiter per nesting level,
//! taken from [`DELIMITERS`] outermost first: a two-level finding packs as
//! `outer$inner#locator`. Keys may not contain any reserved delimiter; the
//! locator may contain anything.

use thiserror::Error;

use super::Finding;

/// Level delimiters, outermost first.
pub const DELIMITERS: [char; 4] = ['$', '#', '@', '&'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("key {key:?} contains reserved delimiter {delimiter:?}")]
    ReservedDelimiter { key: String, delimiter: char },

    #[error("expected {expected} key(s), found {found}")]
    Arity { expected: usize, found: usize },

    #[error("at most {max} nesting levels are supported, got {0}", max = DELIMITERS.len())]
    TooDeep(usize),

    #[error("empty locator")]
    EmptyLocator,
}

fn check_key(key: &str) -> Result<(), CodecError> {
    match key.chars().find(|c| DELIMITERS.contains(c)) {
        Some(delimiter) => {
            Err(CodecError::ReservedDelimiter {
                key: key.to_owned(),
                delimiter,
            })
        },
        None => Ok(()),
    }
}

/// Packs a finding, rejecting keys that would corrupt grouping.
pub fn encode(finding: &Finding) -> Result<String, CodecError> {
    if finding.class_keys.len() > DELIMITERS.len() {
        return Err(CodecError::TooDeep(finding.class_keys.len()));
    }
    if finding.locator.is_empty() {
        return Err(CodecError::EmptyLocator);
    }
    let mut packed = String::new();
    for (key, delimiter) in finding.class_keys.iter().zip(DELIMITERS) {
        check_key(key)?;
        packed.push_str(key);
        packed.push(delimiter);
    }
    packed.push_str(&finding.locator);
    Ok(packed)
}

/// Unpacks a finding that must carry exactly `arity` keys.
pub fn decode(
    raw: &str,
    arity: usize,
) -> Result<Finding, CodecError> {
    if arity > DELIMITERS.len() {
        return Err(CodecError::TooDeep(arity));
    }
    let mut keys = Vec::with_capacity(arity);
    let mut rest = raw;
    for (level, delimiter) in DELIMITERS.iter().take(arity).enumerate() {
        let (key, tail) = rest
            .split_once(*delimiter)
            .ok_or(CodecError::Arity {
                expected: arity,
                found:    level,
            })?;
        check_key(key)?;
        keys.push(key.to_owned());
        rest = tail;
    }
    if rest.is_empty() {
        return Err(CodecError::EmptyLocator);
    }
    Ok(Finding::keyed(keys, rest))
}
