//! The opaque scalar values carried by attribute containers. A value is a
//! plain string, a byte sequence, a URI, or a syntactically decoded
//! distinguished name. Names compare structurally, never by spelling.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::dn::Dn;
use dirmod_proto::v1::{ModifyValue, NameParseError, OperationError};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Value {
    Utf8(String),
    Binary(Vec<u8>),
    Url(Url),
    Dn(Dn),
}

impl Value {
    pub fn new_utf8(s: String) -> Self {
        Value::Utf8(s)
    }

    pub fn new_utf8s(s: &str) -> Self {
        Value::Utf8(s.to_string())
    }

    pub fn new_binary(b: Vec<u8>) -> Self {
        Value::Binary(b)
    }

    pub fn new_url(u: Url) -> Self {
        Value::Url(u)
    }

    pub fn new_url_s(s: &str) -> Result<Self, OperationError> {
        Url::parse(s)
            .map(Value::Url)
            .map_err(|_| OperationError::InvalidValueState)
    }

    pub fn new_dn(dn: Dn) -> Self {
        Value::Dn(dn)
    }

    pub fn new_dn_s(s: &str) -> Result<Self, NameParseError> {
        Dn::parse(s).map(Value::Dn)
    }

    pub fn as_utf8(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            Value::Url(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_dn(&self) -> Option<&Dn> {
        match self {
            Value::Dn(dn) => Some(dn),
            _ => None,
        }
    }

    pub fn is_dn(&self) -> bool {
        matches!(self, Value::Dn(_))
    }

    /// The string this value is stored under when a container tracks names:
    /// the literal text for strings, the compact form for decoded names.
    pub(crate) fn name_text(&self) -> Option<String> {
        match self {
            Value::Utf8(s) => Some(s.clone()),
            Value::Dn(dn) => Some(dn.to_compact_string()),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::new_utf8s(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Utf8(s)
    }
}

impl From<Dn> for Value {
    fn from(dn: Dn) -> Self {
        Value::Dn(dn)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Utf8(s) => f.write_str(s),
            Value::Binary(b) => write!(f, "<{} bytes>", b.len()),
            Value::Url(u) => f.write_str(u.as_str()),
            Value::Dn(dn) => write!(f, "{}", dn),
        }
    }
}

impl From<&Value> for ModifyValue {
    fn from(v: &Value) -> Self {
        match v {
            Value::Utf8(s) => ModifyValue::Utf8(s.clone()),
            Value::Binary(b) => ModifyValue::Binary(b.clone()),
            Value::Url(u) => ModifyValue::Url(u.to_string()),
            Value::Dn(dn) => ModifyValue::Utf8(dn.to_compact_string()),
        }
    }
}

impl TryFrom<&ModifyValue> for Value {
    type Error = OperationError;

    fn try_from(v: &ModifyValue) -> Result<Self, Self::Error> {
        Ok(match v {
            ModifyValue::Utf8(s) => Value::Utf8(s.clone()),
            ModifyValue::Binary(b) => Value::Binary(b.clone()),
            ModifyValue::Url(u) => Value::new_url_s(u)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_dn_structural_equality() {
        let a = Value::new_dn_s("cn=Foo,ou=Bar").unwrap();
        let b = Value::new_dn_s("CN = foo , OU = bar").unwrap();
        assert_eq!(a, b);
        let c = Value::new_dn_s("cn=other,ou=Bar").unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_value_kinds_never_cross_compare() {
        let s = Value::new_utf8s("cn=Foo");
        let n = Value::new_dn_s("cn=Foo").unwrap();
        assert_ne!(s, n);
    }

    #[test]
    fn test_value_proto_conversion() {
        let v = Value::new_dn_s("CN = Foo , dc = x").unwrap();
        let mv = ModifyValue::from(&v);
        assert_eq!(mv, ModifyValue::Utf8("cn=Foo,dc=x".to_string()));

        let b = Value::new_binary(vec![1, 2, 3]);
        assert_eq!(ModifyValue::from(&b), ModifyValue::Binary(vec![1, 2, 3]));

        let u = Value::new_url_s("ldap://example.com/").unwrap();
        let back = Value::try_from(&ModifyValue::from(&u)).unwrap();
        assert_eq!(u, back);

        assert!(Value::try_from(&ModifyValue::Url("not a url".to_string())).is_err());
    }
}
