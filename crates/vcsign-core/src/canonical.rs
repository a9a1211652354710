//! # Canonical Serialization — Deterministic Byte Production
//!
//! This module defines `CanonicalBytes`, the sole construction path for bytes
//! that are signed or verified anywhere in vcsign.
//!
//! ## Security Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way to
//! construct it is through `CanonicalBytes::new()` (or `from_document()`),
//! which applies the full canonicalization pipeline. Any function requiring
//! signing input must accept `&CanonicalBytes`, so a signature can never be
//! computed over bytes that merely happen to be JSON.
//!
//! ## Rules
//!
//! 1. **Mappings** — keys sorted byte-wise on their UTF-8 text, values
//!    canonicalized recursively.
//! 2. **Sequences** — element order preserved, elements canonicalized
//!    recursively.
//! 3. **Numbers** — integers within ±2^53 render as plain decimal digits.
//!    Every other finite number, including larger integers, is taken as an
//!    IEEE-754 double and rendered in the RFC 8785 / ECMAScript shortest
//!    round-trip form via `serde_jcs`. So `1.0`, `1` and `1e0` produce the
//!    same bytes, and `9007199254740993` renders as `9007199254740992`.
//!    Non-finite numbers are rejected.
//! 4. **Strings** — RFC 8785 escaping via `serde_jcs`; non-ASCII passes
//!    through as UTF-8.
//! 5. **Literals** — `true`, `false`, `null`.
//!
//! Output uses compact separators with no insignificant whitespace.

use serde::Serialize;
use serde_json::{Number, Value};

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by the canonicalization pipeline.
///
/// # Invariants
///
/// - The only constructors are `CanonicalBytes::new()` and
///   `CanonicalBytes::from_document()`.
/// - Two documents that are equal as values produce identical bytes,
///   whatever the key order or formatting of their source text.
/// - The bytes are valid UTF-8 and valid JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if the value
    /// cannot be represented as a document (e.g. non-string map keys), and
    /// `CanonicalizationError::NonFiniteNumber` for NaN or infinities.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Self::from_document(&value)
    }

    /// Construct canonical bytes from an already-built document tree.
    pub fn from_document(value: &Value) -> Result<Self, CanonicalizationError> {
        let mut out = Vec::new();
        write_canonical(value, &mut out)?;
        Ok(Self(out))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume and return the inner byte vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn write_canonical(value: &Value, out: &mut Vec<u8>) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => write_number(n, out)?,
        Value::String(s) => write_string(s, out)?,
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_canonical(item, out)?;
            }
            out.push(b']');
        }
        Value::Object(map) => {
            // serde_json::Map may preserve insertion order depending on
            // feature unification, so ordering is imposed here.
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

            out.push(b'{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_string(key, out)?;
                out.push(b':');
                write_canonical(item, out)?;
            }
            out.push(b'}');
        }
    }
    Ok(())
}

/// Largest magnitude every integer up to which is exact as an `f64`.
const MAX_EXACT_INTEGER: u64 = 1 << 53;

fn write_number(n: &Number, out: &mut Vec<u8>) -> Result<(), CanonicalizationError> {
    let magnitude = n.as_i64().map(i64::unsigned_abs).or_else(|| n.as_u64());
    if magnitude.is_some_and(|m| m <= MAX_EXACT_INTEGER) {
        out.extend_from_slice(n.to_string().as_bytes());
        return Ok(());
    }
    match n.as_f64() {
        Some(f) if f.is_finite() => {
            let s = serde_jcs::to_string(&f)?;
            out.extend_from_slice(s.as_bytes());
            Ok(())
        }
        Some(f) => Err(CanonicalizationError::NonFiniteNumber(f)),
        None => Err(CanonicalizationError::NonFiniteNumber(f64::NAN)),
    }
}

fn write_string(s: &str, out: &mut Vec<u8>) -> Result<(), CanonicalizationError> {
    let escaped = serde_jcs::to_string(s)?;
    out.extend_from_slice(escaped.as_bytes());
    Ok(())
}
