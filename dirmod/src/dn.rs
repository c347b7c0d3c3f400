//! The distinguished name model. Names are parsed from RFC2253-style text,
//! compared structurally, and manipulated as ordered sequences of relative
//! name components. Inside a [`Dn`] the components are stored from the root
//! (index 0) to the leaf, which is the reverse of the textual notation.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smartstring::alias::String as AttrString;

use dirmod_proto::v1::NameParseError;

/// Case folding applied to attribute types at component construction time.
/// This is an explicit call-time value, there is no ambient default beyond
/// `Lower`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeyCase {
    #[default]
    Lower,
    Upper,
    Preserve,
}

impl KeyCase {
    fn fold(self, key: &str) -> AttrString {
        match self {
            KeyCase::Lower => AttrString::from(key.to_lowercase()),
            KeyCase::Upper => AttrString::from(key.to_uppercase()),
            KeyCase::Preserve => AttrString::from(key),
        }
    }
}

/// Textual layout of an encoded name. Both layouts re-parse to an equal name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameFormat {
    #[default]
    Compact,
    Spaced,
}

impl NameFormat {
    fn separator(self) -> &'static str {
        match self {
            NameFormat::Compact => ",",
            NameFormat::Spaced => ", ",
        }
    }
}

/// One relative name: one or more `key=value` components joined with `+` in
/// text form. Components are keyed by the case-folded attribute type, so a
/// duplicate type within one relative name overwrites rather than
/// accumulates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rdn {
    components: BTreeMap<AttrString, String>,
}

impl Rdn {
    pub fn new(key: &str, value: &str) -> Self {
        Self::new_with(key, value, KeyCase::default())
    }

    pub fn new_with(key: &str, value: &str, case: KeyCase) -> Self {
        let mut components = BTreeMap::new();
        components.insert(case.fold(key), value.to_string());
        Rdn { components }
    }

    pub(crate) fn empty() -> Self {
        Rdn {
            components: BTreeMap::new(),
        }
    }

    pub fn add_component(&mut self, key: &str, value: &str, case: KeyCase) {
        self.components.insert(case.fold(key), value.to_string());
    }

    /// Case-insensitive component lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.components
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// The type of the first component as stored.
    pub fn key(&self) -> Option<&str> {
        self.components.keys().next().map(|k| k.as_str())
    }

    /// The value of the first component.
    pub fn value(&self) -> Option<&str> {
        self.components.values().next().map(|v| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> impl Iterator<Item = (&str, &str)> {
        self.components.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Content under comparison: components sorted by their case-folded key,
    /// values folded too. Two relative names built under different fold
    /// policies still compare equal when their content matches.
    fn fold_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .components
            .iter()
            .map(|(k, v)| (k.to_lowercase(), v.to_lowercase()))
            .collect();
        pairs.sort();
        pairs
    }

    fn encode(&self, out: &mut String) {
        for (i, (k, v)) in self.components.iter().enumerate() {
            if i > 0 {
                out.push('+');
            }
            out.push_str(k);
            out.push('=');
            escape_value(v, out);
        }
    }

    fn encode_url(&self, out: &mut String) {
        for (i, (k, v)) in self.components.iter().enumerate() {
            if i > 0 {
                out.push('+');
            }
            out.push_str(k);
            out.push('=');
            percent_encode(v, out);
        }
    }
}

impl PartialEq for Rdn {
    fn eq(&self, other: &Self) -> bool {
        self.fold_pairs() == other.fold_pairs()
    }
}

impl Eq for Rdn {}

impl PartialOrd for Rdn {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rdn {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fold_pairs().cmp(&other.fold_pairs())
    }
}

impl fmt::Display for Rdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.encode(&mut out);
        f.write_str(&out)
    }
}

/// A distinguished name: an ordered sequence of relative names from the root
/// to the leaf. The sequence may be empty, naming the root entry. Equality
/// and ordering are structural, component by component from the most
/// significant end.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Dn {
    rdns: Vec<Rdn>,
}

impl Dn {
    pub fn new() -> Self {
        Dn { rdns: Vec::new() }
    }

    /// Parse name text with the default (lowercase) key folding.
    pub fn parse(text: &str) -> Result<Self, NameParseError> {
        Self::parse_with(text, KeyCase::default())
    }

    pub fn parse_with(text: &str, case: KeyCase) -> Result<Self, NameParseError> {
        let mut rdns = Parser::new(text, case).parse_name()?;
        // Text is leaf first, storage is root first.
        rdns.reverse();
        Ok(Dn { rdns })
    }

    pub fn len(&self) -> usize {
        self.rdns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rdns.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Rdn> {
        self.rdns.get(idx)
    }

    /// The least significant component, if any.
    pub fn leaf(&self) -> Option<&Rdn> {
        self.rdns.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rdn> {
        self.rdns.iter()
    }

    /// The first `n` components counted from the root.
    pub fn prefix(&self, n: usize) -> Dn {
        Dn {
            rdns: self.rdns[..n.min(self.rdns.len())].to_vec(),
        }
    }

    /// The components from index `n` to the leaf.
    pub fn suffix(&self, n: usize) -> Dn {
        Dn {
            rdns: self.rdns[n.min(self.rdns.len())..].to_vec(),
        }
    }

    pub fn starts_with(&self, other: &Dn) -> bool {
        other.len() <= self.len() && self.rdns[..other.len()] == other.rdns[..]
    }

    pub fn ends_with(&self, other: &Dn) -> bool {
        other.len() <= self.len() && self.rdns[self.len() - other.len()..] == other.rdns[..]
    }

    /// Subsequence test anchored at the first occurrence of `other`'s first
    /// component: true when `other` appears contiguously starting there.
    pub fn contains(&self, other: &Dn) -> bool {
        let Some(first) = other.rdns.first() else {
            return true;
        };
        match self.rdns.iter().position(|r| r == first) {
            Some(i) => {
                self.len() - i >= other.len() && self.rdns[i..i + other.len()] == other.rdns[..]
            }
            None => false,
        }
    }

    /// Append `other` on the leaf side.
    pub fn append(&mut self, other: &Dn) -> &mut Self {
        self.rdns.extend(other.rdns.iter().cloned());
        self
    }

    pub fn append_component(&mut self, key: &str, value: &str) -> &mut Self {
        self.rdns.push(Rdn::new(key, value));
        self
    }

    /// Insert `other` on the root side.
    pub fn prepend(&mut self, other: &Dn) -> &mut Self {
        self.rdns.splice(0..0, other.rdns.iter().cloned());
        self
    }

    pub fn prepend_component(&mut self, key: &str, value: &str) -> &mut Self {
        self.rdns.insert(0, Rdn::new(key, value));
        self
    }

    /// Remove and return the root component.
    pub fn remove_first(&mut self) -> Option<Rdn> {
        if self.rdns.is_empty() {
            None
        } else {
            Some(self.rdns.remove(0))
        }
    }

    /// Remove and return the leaf component.
    pub fn remove_last(&mut self) -> Option<Rdn> {
        self.rdns.pop()
    }

    pub fn encode(&self, format: NameFormat) -> String {
        let mut out = String::new();
        for (i, rdn) in self.rdns.iter().rev().enumerate() {
            if i > 0 {
                out.push_str(format.separator());
            }
            rdn.encode(&mut out);
        }
        out
    }

    /// `a=b,c=d` — no space after separators.
    pub fn to_compact_string(&self) -> String {
        self.encode(NameFormat::Compact)
    }

    /// `a=b, c=d` — the legacy spaced layout.
    pub fn to_spaced_string(&self) -> String {
        self.encode(NameFormat::Spaced)
    }

    /// Compact form with percent-encoded values, for embedding in a URL.
    pub fn to_url_string(&self) -> String {
        let mut out = String::new();
        for (i, rdn) in self.rdns.iter().rev().enumerate() {
            if i > 0 {
                out.push(',');
            }
            rdn.encode_url(&mut out);
        }
        out
    }

    /// Freeze into the immutable variant. The frozen copy shares storage and
    /// clones cheaply.
    pub fn freeze(self) -> FrozenDn {
        FrozenDn(Arc::new(self))
    }
}

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_compact_string())
    }
}

impl FromStr for Dn {
    type Err = NameParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dn::parse(s)
    }
}

impl TryFrom<&str> for Dn {
    type Error = NameParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Dn::parse(s)
    }
}

impl<'a> IntoIterator for &'a Dn {
    type Item = &'a Rdn;
    type IntoIter = std::slice::Iter<'a, Rdn>;

    fn into_iter(self) -> Self::IntoIter {
        self.rdns.iter()
    }
}

/// The immutable variant of [`Dn`]. Only the read API is reachable through
/// `Deref`; producing one requires an explicit [`Dn::freeze`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FrozenDn(Arc<Dn>);

impl FrozenDn {
    /// A mutable copy of the underlying name.
    pub fn thaw(&self) -> Dn {
        (*self.0).clone()
    }
}

impl Deref for FrozenDn {
    type Target = Dn;

    fn deref(&self) -> &Dn {
        &self.0
    }
}

impl PartialEq<Dn> for FrozenDn {
    fn eq(&self, other: &Dn) -> bool {
        *self.0 == *other
    }
}

impl fmt::Display for FrozenDn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/* ===== text encoding ===== */

/// Escape one attribute value for the textual name form: specials and the
/// escape character get a backslash, leading `#`/space and trailing space get
/// a backslash, control bytes become `\XX` pairs.
fn escape_value(value: &str, out: &mut String) {
    let last = value.len().saturating_sub(1);
    for (i, c) in value.char_indices() {
        match c {
            ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=' => {
                out.push('\\');
                out.push(c);
            }
            '#' if i == 0 => {
                out.push('\\');
                out.push(c);
            }
            ' ' if i == 0 || i == last => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || (c as u32) == 0x7f => {
                let mut buf = [0u8; 4];
                for b in c.encode_utf8(&mut buf).as_bytes() {
                    out.push('\\');
                    out.push_str(&hex::encode_upper([*b]));
                }
            }
            c => out.push(c),
        }
    }
}

/// Minimal percent-encoder for values embedded in a URL: unreserved bytes
/// pass through, everything else becomes `%XX`.
fn percent_encode(value: &str, out: &mut String) {
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(b as char)
            }
            _ => {
                out.push('%');
                out.push_str(&hex::encode_upper([b]));
            }
        }
    }
}

/* ===== parsing ===== */

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    case: KeyCase,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, case: KeyCase) -> Self {
        Parser {
            input: text.as_bytes(),
            pos: 0,
            case,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(b' ') | Some(b'\t')) {
            self.pos += 1;
        }
    }

    /// Parse the whole input as a name. The returned components are in text
    /// order, leaf first.
    fn parse_name(mut self) -> Result<Vec<Rdn>, NameParseError> {
        let mut rdns = Vec::new();
        self.skip_spaces();
        if self.peek().is_none() {
            // The empty name addresses the root entry.
            return Ok(rdns);
        }
        loop {
            rdns.push(self.parse_rdn()?);
            self.skip_spaces();
            match self.bump() {
                None => break,
                Some(b',') | Some(b';') => continue,
                Some(_) => return Err(NameParseError::ExpectedSeparator(self.pos - 1)),
            }
        }
        Ok(rdns)
    }

    fn parse_rdn(&mut self) -> Result<Rdn, NameParseError> {
        let mut rdn = Rdn::empty();
        loop {
            self.skip_spaces();
            let key = self.parse_key()?;
            self.skip_spaces();
            match self.bump() {
                Some(b'=') => {}
                Some(_) => return Err(NameParseError::ExpectedEquals(self.pos - 1)),
                None => return Err(NameParseError::UnexpectedEnd),
            }
            self.skip_spaces();
            let value = self.parse_value()?;
            rdn.add_component(&key, &value, self.case);
            self.skip_spaces();
            if self.peek() == Some(b'+') {
                self.pos += 1;
                continue;
            }
            break;
        }
        Ok(rdn)
    }

    fn parse_key(&mut self) -> Result<String, NameParseError> {
        let start = self.pos;
        loop {
            match self.peek() {
                None | Some(b'=') | Some(b' ') | Some(b'\t') => break,
                Some(b',') | Some(b';') | Some(b'+') => {
                    return if self.pos == start {
                        Err(NameParseError::EmptyAttributeType(start))
                    } else {
                        Err(NameParseError::ExpectedEquals(self.pos))
                    };
                }
                Some(_) => self.pos += 1,
            }
        }
        if self.pos == start {
            return Err(NameParseError::EmptyAttributeType(start));
        }
        std::str::from_utf8(&self.input[start..self.pos])
            .map(str::to_string)
            .map_err(|_| NameParseError::InvalidUtf8(start))
    }

    fn parse_value(&mut self) -> Result<String, NameParseError> {
        match self.peek() {
            Some(b'#') => self.parse_hex_value(),
            Some(b'"') => self.parse_quoted_value(),
            _ => self.parse_plain_value(),
        }
    }

    /// `#` followed by a hex encoding of the whole value.
    fn parse_hex_value(&mut self) -> Result<String, NameParseError> {
        let start = self.pos;
        self.pos += 1;
        let hstart = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
            self.pos += 1;
        }
        let raw = &self.input[hstart..self.pos];
        if raw.is_empty() {
            return Err(NameParseError::InvalidHexValue(start));
        }
        let bytes = hex::decode(raw).map_err(|_| NameParseError::InvalidHexValue(start))?;
        String::from_utf8(bytes).map_err(|_| NameParseError::InvalidUtf8(start))
    }

    fn parse_quoted_value(&mut self) -> Result<String, NameParseError> {
        let start = self.pos;
        self.pos += 1;
        let mut buf: Vec<u8> = Vec::new();
        loop {
            match self.bump() {
                None => return Err(NameParseError::UnterminatedQuote(start)),
                Some(b'"') => break,
                Some(b'\\') => buf.extend(self.parse_escape()?),
                Some(c) => buf.push(c),
            }
        }
        String::from_utf8(buf).map_err(|_| NameParseError::InvalidUtf8(start))
    }

    fn parse_plain_value(&mut self) -> Result<String, NameParseError> {
        let start = self.pos;
        let mut buf: Vec<u8> = Vec::new();
        // Length of buf up to the last significant byte. Unescaped trailing
        // spaces are consumed but truncated away.
        let mut keep = 0;
        loop {
            match self.peek() {
                None | Some(b',') | Some(b';') | Some(b'+') => break,
                Some(b'\\') => {
                    self.pos += 1;
                    buf.extend(self.parse_escape()?);
                    keep = buf.len();
                }
                Some(b' ') => {
                    self.pos += 1;
                    buf.push(b' ');
                }
                Some(c) => {
                    self.pos += 1;
                    buf.push(c);
                    keep = buf.len();
                }
            }
        }
        buf.truncate(keep);
        String::from_utf8(buf).map_err(|_| NameParseError::InvalidUtf8(start))
    }

    /// One escape sequence, the backslash already consumed: either a special
    /// character taken literally or a `\XX` hex pair naming a byte.
    fn parse_escape(&mut self) -> Result<Vec<u8>, NameParseError> {
        let epos = self.pos - 1;
        match self.bump() {
            None => Err(NameParseError::UnexpectedEnd),
            Some(
                c @ (b',' | b'+' | b'"' | b'\\' | b'<' | b'>' | b';' | b'=' | b' ' | b'#'),
            ) => Ok(vec![c]),
            Some(c) if c.is_ascii_hexdigit() => match self.bump() {
                Some(c2) if c2.is_ascii_hexdigit() => {
                    hex::decode([c, c2]).map_err(|_| NameParseError::InvalidEscape(epos))
                }
                _ => Err(NameParseError::InvalidEscape(epos)),
            },
            Some(_) => Err(NameParseError::InvalidEscape(epos)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dn_parse_simple() {
        let dn = Dn::parse("cn=Some Person,ou=People,dc=example,dc=com").unwrap();
        assert_eq!(dn.len(), 4);
        // Root first in storage.
        assert_eq!(dn.get(0).unwrap().value(), Some("com"));
        assert_eq!(dn.get(1).unwrap().value(), Some("example"));
        let leaf = dn.leaf().unwrap();
        assert_eq!(leaf.key(), Some("cn"));
        assert_eq!(leaf.value(), Some("Some Person"));
    }

    #[test]
    fn test_dn_parse_empty_is_root() {
        let dn = Dn::parse("").unwrap();
        assert!(dn.is_empty());
        assert_eq!(dn.to_compact_string(), "");
    }

    #[test]
    fn test_dn_parse_whitespace_and_semicolon() {
        let a = Dn::parse("cn = foo ; ou = bar").unwrap();
        let b = Dn::parse("cn=foo,ou=bar").unwrap();
        assert_eq!(a, b);
        // Semicolons normalise to commas on output.
        assert_eq!(a.to_compact_string(), "cn=foo,ou=bar");
    }

    #[test]
    fn test_dn_case_insensitive_equality() {
        let a = Dn::parse("CN = Foo , OU = Bar").unwrap();
        let b = Dn::parse("cn=foo,ou=bar").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn test_dn_key_case_policies() {
        let lower = Dn::parse_with("CN=x,DC=y", KeyCase::Lower).unwrap();
        assert_eq!(lower.leaf().unwrap().key(), Some("cn"));
        let upper = Dn::parse_with("cn=x,dc=y", KeyCase::Upper).unwrap();
        assert_eq!(upper.leaf().unwrap().key(), Some("CN"));
        let keep = Dn::parse_with("cN=x,dC=y", KeyCase::Preserve).unwrap();
        assert_eq!(keep.leaf().unwrap().key(), Some("cN"));
        // Policy never affects equality.
        assert_eq!(lower, upper);
        assert_eq!(lower, keep);
    }

    #[test]
    fn test_dn_multivalued_rdn() {
        let dn = Dn::parse("cn=John+sn=Doe,dc=example").unwrap();
        let leaf = dn.leaf().unwrap();
        assert_eq!(leaf.len(), 2);
        assert_eq!(leaf.get("SN"), Some("Doe"));
        // Same content in either component order.
        let swapped = Dn::parse("sn=Doe+cn=John,dc=example").unwrap();
        assert_eq!(dn, swapped);
    }

    #[test]
    fn test_dn_duplicate_key_in_rdn_overwrites() {
        let dn = Dn::parse("cn=first+cn=second,dc=example").unwrap();
        let leaf = dn.leaf().unwrap();
        assert_eq!(leaf.len(), 1);
        assert_eq!(leaf.value(), Some("second"));
    }

    #[test]
    fn test_dn_parse_escapes() {
        let dn = Dn::parse("cn=Doe\\, John,dc=example").unwrap();
        assert_eq!(dn.leaf().unwrap().value(), Some("Doe, John"));

        let dn = Dn::parse("cn=\\4Aohn,dc=example").unwrap();
        assert_eq!(dn.leaf().unwrap().value(), Some("John"));

        let dn = Dn::parse("cn=\\ padded\\ ,dc=example").unwrap();
        assert_eq!(dn.leaf().unwrap().value(), Some(" padded "));
    }

    #[test]
    fn test_dn_parse_quoted_value() {
        let dn = Dn::parse("cn=\"Doe, John + Co\",dc=example").unwrap();
        assert_eq!(dn.leaf().unwrap().value(), Some("Doe, John + Co"));
    }

    #[test]
    fn test_dn_parse_hex_value() {
        let dn = Dn::parse("cn=#4a6f686e").unwrap();
        assert_eq!(dn.leaf().unwrap().value(), Some("John"));
    }

    #[test]
    fn test_dn_parse_errors() {
        assert_eq!(Dn::parse("cn"), Err(NameParseError::UnexpectedEnd));
        assert_eq!(Dn::parse("=x"), Err(NameParseError::EmptyAttributeType(0)));
        assert_eq!(
            Dn::parse("cn=a,,dc=b"),
            Err(NameParseError::EmptyAttributeType(5))
        );
        assert_eq!(Dn::parse("cn=a\\"), Err(NameParseError::UnexpectedEnd));
        assert_eq!(Dn::parse("cn=a\\q"), Err(NameParseError::InvalidEscape(4)));
        assert_eq!(Dn::parse("cn=#4a6"), Err(NameParseError::InvalidHexValue(3)));
        assert_eq!(Dn::parse("cn=#"), Err(NameParseError::InvalidHexValue(3)));
        assert_eq!(
            Dn::parse("cn=\"abc"),
            Err(NameParseError::UnterminatedQuote(3))
        );
        assert_eq!(
            Dn::parse("cn=\"a\"x"),
            Err(NameParseError::ExpectedSeparator(6))
        );
        assert_eq!(Dn::parse("cn=#c3"), Err(NameParseError::InvalidUtf8(3)));
    }

    #[test]
    fn test_dn_round_trip_compact_and_spaced() {
        let texts = [
            "cn=Some Person,ou=People,dc=example,dc=com",
            "cn=Doe\\, John+sn=Doe,dc=example",
            "cn=\\#sharp\\ ,ou=x",
            "ou=a\\+b,dc=c",
        ];
        for t in texts {
            let dn = Dn::parse(t).unwrap();
            let compact = dn.to_compact_string();
            let spaced = dn.to_spaced_string();
            assert_eq!(Dn::parse(&compact).unwrap(), dn, "compact {}", t);
            assert_eq!(Dn::parse(&spaced).unwrap(), dn, "spaced {}", t);
        }
    }

    #[test]
    fn test_dn_spaced_layout() {
        let dn = Dn::parse("cn=a,ou=b,dc=c").unwrap();
        assert_eq!(dn.to_compact_string(), "cn=a,ou=b,dc=c");
        assert_eq!(dn.to_spaced_string(), "cn=a, ou=b, dc=c");
    }

    #[test]
    fn test_dn_escape_of_control_bytes() {
        let mut dn = Dn::new();
        dn.append_component("cn", "a\nb");
        let text = dn.to_compact_string();
        assert_eq!(text, "cn=a\\0Ab");
        assert_eq!(Dn::parse(&text).unwrap(), dn);
    }

    #[test]
    fn test_dn_url_string() {
        let dn = Dn::parse("cn=Some Person,dc=example,dc=com").unwrap();
        assert_eq!(dn.to_url_string(), "cn=Some%20Person,dc=example,dc=com");
    }

    #[test]
    fn test_dn_structural_ops() {
        let mut dn = Dn::parse("cn=leaf,ou=mid,dc=root").unwrap();
        let base = Dn::parse("dc=root").unwrap();
        let top = Dn::parse("cn=leaf,ou=mid").unwrap();

        assert!(dn.starts_with(&base));
        assert!(!dn.starts_with(&top));
        assert!(dn.ends_with(&top));
        assert!(dn.contains(&Dn::parse("ou=mid").unwrap()));
        assert!(dn.contains(&Dn::parse("cn=leaf,ou=mid").unwrap()));
        assert!(!dn.contains(&Dn::parse("ou=mid,dc=other").unwrap()));
        assert!(dn.contains(&Dn::new()));

        assert_eq!(dn.prefix(1), base);
        assert_eq!(dn.suffix(1), top);

        let first = dn.remove_first().unwrap();
        assert_eq!(first.key(), Some("dc"));
        assert_eq!(dn.to_compact_string(), "cn=leaf,ou=mid");
        dn.prepend(&base);
        assert_eq!(dn.to_compact_string(), "cn=leaf,ou=mid,dc=root");
        let last = dn.remove_last().unwrap();
        assert_eq!(last.key(), Some("cn"));
        dn.append_component("uid", "jdoe");
        assert_eq!(dn.to_compact_string(), "uid=jdoe,ou=mid,dc=root");
    }

    #[test]
    fn test_dn_append_name() {
        let mut dn = Dn::parse("dc=example,dc=com").unwrap();
        dn.append(&Dn::parse("cn=x,ou=y").unwrap());
        assert_eq!(dn.to_compact_string(), "cn=x,ou=y,dc=example,dc=com");
    }

    #[test]
    fn test_dn_ordering_by_significance() {
        let a = Dn::parse("cn=a,dc=x").unwrap();
        let b = Dn::parse("cn=b,dc=x").unwrap();
        let shorter = Dn::parse("dc=x").unwrap();
        assert!(a < b);
        assert!(shorter < a);
    }

    #[test]
    fn test_dn_freeze() {
        let dn = Dn::parse("cn=frozen,dc=example").unwrap();
        let frozen = dn.clone().freeze();
        assert_eq!(frozen, dn);
        assert_eq!(frozen.to_compact_string(), "cn=frozen,dc=example");
        let copy = frozen.clone();
        assert_eq!(copy, dn);
        let mut thawed = frozen.thaw();
        thawed.remove_last();
        assert_eq!(thawed.to_compact_string(), "dc=example");
        // The frozen original is untouched.
        assert_eq!(frozen.len(), 2);
    }
}
