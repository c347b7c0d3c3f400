use std::collections::BTreeMap;
use std::fmt;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/* ===== errors ===== */

/// Failure to parse distinguished name text. The offset is the byte position
/// in the input at which the problem was detected. Malformed name text is
/// always surfaced to the caller, never silently recovered.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Error)]
#[serde(rename_all = "lowercase")]
pub enum NameParseError {
    #[error("unexpected end of name text")]
    UnexpectedEnd,
    #[error("empty attribute type at offset {0}")]
    EmptyAttributeType(usize),
    #[error("expected '=' after attribute type at offset {0}")]
    ExpectedEquals(usize),
    #[error("expected component separator at offset {0}")]
    ExpectedSeparator(usize),
    #[error("unterminated quoted value starting at offset {0}")]
    UnterminatedQuote(usize),
    #[error("invalid escape sequence at offset {0}")]
    InvalidEscape(usize),
    #[error("invalid hex-encoded value at offset {0}")]
    InvalidHexValue(usize),
    #[error("decoded value is not valid utf-8 at offset {0}")]
    InvalidUtf8(usize),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Error)]
#[serde(rename_all = "lowercase")]
pub enum OperationError {
    #[error("name parse failed: {0}")]
    NameParse(#[from] NameParseError),
    #[error("the entry is in a state that forbids this operation")]
    InvalidEntryState,
    #[error("value is not valid for this use")]
    InvalidValueState,
    #[error("operation not supported: {0}")]
    UnsupportedOperation(String),
}

/* ===== modifications ===== */

/// One attribute value as it travels across the modification boundary.
/// Distinguished names travel in their stored string form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModifyValue {
    Utf8(String),
    Binary(Vec<u8>),
    Url(String),
}

impl ModifyValue {
    pub fn new_utf8(s: &str) -> Self {
        ModifyValue::Utf8(s.to_string())
    }
}

/// A single directory modify operation: the attribute id and the value group
/// it applies to. A `Remove` with an empty value group removes the whole
/// attribute.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Modify {
    Add(String, Vec<ModifyValue>),
    Replace(String, Vec<ModifyValue>),
    Remove(String, Vec<ModifyValue>),
}

impl Modify {
    pub fn attr(&self) -> &str {
        match self {
            Modify::Add(a, _) | Modify::Replace(a, _) | Modify::Remove(a, _) => a.as_str(),
        }
    }
}

/// The ordered list of modifications for one directory modify request. The
/// order of this list matters, each change must be applied in order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifyList {
    pub mods: Vec<Modify>,
}

impl ModifyList {
    pub fn new_list(mods: Vec<Modify>) -> Self {
        ModifyList { mods }
    }

    pub fn len(&self) -> usize {
        self.mods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }
}

/* ===== entries ===== */

/// The transferable form of a directory entry: the distinguished name text
/// and the attribute map as returned by a read. Displaying an entry emits
/// the line-oriented dump format: `dn:` first, then one line per value, with
/// `::` marking base64 payloads and `:<` marking URI-typed values.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub dn: String,
    pub attrs: BTreeMap<String, Vec<ModifyValue>>,
}

/// A string is dump-safe when it is ASCII, free of NUL/CR/LF, and does not
/// lead with space, colon or '<'. Anything else is emitted base64-encoded.
fn dump_safe(s: &str) -> bool {
    let b = s.as_bytes();
    match b.first().copied() {
        Some(b' ') | Some(b':') | Some(b'<') => return false,
        _ => {}
    }
    b.iter()
        .all(|c| matches!(*c, 0x01..=0x09 | 0x0b | 0x0c | 0x0e..=0x7f))
}

fn dump_line(f: &mut fmt::Formatter<'_>, id: &str, v: &ModifyValue) -> fmt::Result {
    match v {
        ModifyValue::Utf8(s) if dump_safe(s) => writeln!(f, "{}: {}", id, s),
        ModifyValue::Utf8(s) => writeln!(f, "{}:: {}", id, B64.encode(s.as_bytes())),
        ModifyValue::Binary(b) => writeln!(f, "{}:: {}", id, B64.encode(b)),
        ModifyValue::Url(u) => writeln!(f, "{}:< {}", id, u),
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if dump_safe(&self.dn) {
            writeln!(f, "dn: {}", self.dn)?;
        } else {
            writeln!(f, "dn:: {}", B64.encode(self.dn.as_bytes()))?;
        }
        self.attrs
            .iter()
            .try_for_each(|(id, vs)| vs.iter().try_for_each(|v| dump_line(f, id, v)))
    }
}
