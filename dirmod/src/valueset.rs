//! The value container of one attribute. A container holds the distinct
//! values of a single attribute id, optionally order-significant, and may
//! carry name semantics: once a structured name value is introduced, a
//! parallel mapping from the parsed name to its stored string form makes
//! differently-spelled but syntactically equal names one value. That mapping
//! persists for the container's lifetime.

use std::collections::BTreeMap;

use smartstring::alias::String as AttrString;
use tracing::warn;

use crate::dn::Dn;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct ValueSet {
    id: AttrString,
    ordered: bool,
    inner: Inner,
}

/// Storage strategy, resolved once: raw scalars, or scalars with the
/// parallel parsed-name mapping.
#[derive(Debug, Clone)]
enum Inner {
    Scalar(Vec<Value>),
    Named {
        values: Vec<Value>,
        names: BTreeMap<Dn, String>,
    },
}

fn value_as_dn(value: &Value) -> Option<Dn> {
    match value {
        Value::Dn(dn) => Some(dn.clone()),
        Value::Utf8(s) => Dn::parse(s).ok(),
        _ => None,
    }
}

impl ValueSet {
    pub fn new(id: &str) -> Self {
        ValueSet {
            id: AttrString::from(id),
            ordered: false,
            inner: Inner::Scalar(Vec::new()),
        }
    }

    pub fn new_ordered(id: &str) -> Self {
        ValueSet {
            id: AttrString::from(id),
            ordered: true,
            inner: Inner::Scalar(Vec::new()),
        }
    }

    pub fn with_values(id: &str, values: Vec<Value>, ordered: bool) -> Self {
        let mut vs = if ordered {
            Self::new_ordered(id)
        } else {
            Self::new(id)
        };
        for v in values {
            vs.add(v);
        }
        vs
    }

    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    pub fn ordered(&self) -> bool {
        self.ordered
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values().get(idx)
    }

    pub fn first(&self) -> Option<&Value> {
        self.values().first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values().iter()
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.values().to_vec()
    }

    pub fn is_named(&self) -> bool {
        matches!(self.inner, Inner::Named { .. })
    }

    pub(crate) fn names(&self) -> Option<&BTreeMap<Dn, String>> {
        match &self.inner {
            Inner::Named { names, .. } => Some(names),
            Inner::Scalar(_) => None,
        }
    }

    fn values(&self) -> &[Value] {
        match &self.inner {
            Inner::Scalar(v) | Inner::Named { values: v, .. } => v,
        }
    }

    /// Adopt name semantics for the existing values. Idempotent. When an
    /// existing value is not a syntactically valid name this is logged and
    /// the mapping is left unset.
    pub fn init_values_as_names(&mut self) -> bool {
        let existing = match &self.inner {
            Inner::Named { .. } => return true,
            Inner::Scalar(values) => values,
        };
        let mut names = BTreeMap::new();
        for v in existing {
            let Some(text) = v.name_text() else {
                warn!(attr = %self.id, "existing value cannot carry name semantics");
                return false;
            };
            let dn = match Dn::parse(&text) {
                Ok(dn) => dn,
                Err(err) => {
                    warn!(attr = %self.id, %err, "existing value is not a valid name");
                    return false;
                }
            };
            names.insert(dn, text);
        }
        let values = match std::mem::replace(&mut self.inner, Inner::Scalar(Vec::new())) {
            Inner::Scalar(values) => values,
            Inner::Named { values, .. } => values,
        };
        self.inner = Inner::Named { values, names };
        true
    }

    /// True when this container already holds an equal value, names compared
    /// by parsed identity.
    pub fn contains(&self, value: &Value) -> bool {
        match &self.inner {
            Inner::Scalar(values) => values.contains(value),
            Inner::Named { values, names } => match value_as_dn(value) {
                Some(dn) => names.contains_key(&dn),
                None => values.contains(value),
            },
        }
    }

    /// Add a value, reporting whether a new distinct value was stored.
    /// Adding a name equal to an existing one is a no-op even when spelled
    /// differently.
    pub fn add(&mut self, value: Value) -> bool {
        if value.is_dn() && !self.is_named() {
            // First structured name introduced: the whole container adopts
            // name semantics, or stays raw if the existing values refuse.
            self.init_values_as_names();
        }
        match &mut self.inner {
            Inner::Scalar(values) => {
                if values.contains(&value) {
                    false
                } else {
                    values.push(value);
                    true
                }
            }
            Inner::Named { values, names } => match value_as_dn(&value) {
                Some(dn) => {
                    if names.contains_key(&dn) {
                        return false;
                    }
                    let text = match &value {
                        Value::Utf8(s) => s.clone(),
                        _ => dn.to_compact_string(),
                    };
                    names.insert(dn, text);
                    values.push(value);
                    true
                }
                None => {
                    warn!(attr = %self.id, "value is not a valid name, stored without name identity");
                    if values.contains(&value) {
                        false
                    } else {
                        values.push(value);
                        true
                    }
                }
            },
        }
    }

    /// Append unconditionally, permitting duplicates.
    pub fn push(&mut self, value: Value) {
        if value.is_dn() && !self.is_named() {
            self.init_values_as_names();
        }
        match &mut self.inner {
            Inner::Scalar(values) => values.push(value),
            Inner::Named { values, names } => {
                if let Some(dn) = value_as_dn(&value) {
                    let text = match &value {
                        Value::Utf8(s) => s.clone(),
                        _ => dn.to_compact_string(),
                    };
                    names.entry(dn).or_insert(text);
                } else {
                    warn!(attr = %self.id, "value is not a valid name, stored without name identity");
                }
                values.push(value);
            }
        }
    }

    /// Remove a value, name-aware. Reports whether anything was removed.
    pub fn remove(&mut self, value: &Value) -> bool {
        match &mut self.inner {
            Inner::Scalar(values) => match values.iter().position(|v| v == value) {
                Some(i) => {
                    values.remove(i);
                    true
                }
                None => false,
            },
            Inner::Named { values, names } => match value_as_dn(value) {
                Some(dn) => {
                    if names.remove(&dn).is_none() {
                        return false;
                    }
                    if let Some(i) = values
                        .iter()
                        .position(|v| value_as_dn(v).as_ref() == Some(&dn))
                    {
                        values.remove(i);
                    }
                    true
                }
                None => match values.iter().position(|v| v == value) {
                    Some(i) => {
                        values.remove(i);
                        true
                    }
                    None => false,
                },
            },
        }
    }
}

/// Value equivalence in the context of two containers: parsed-name identity
/// when both sides carry name semantics, raw equality otherwise.
pub(crate) fn values_match(a_set: &ValueSet, b_set: &ValueSet, a: &Value, b: &Value) -> bool {
    if a_set.is_named() && b_set.is_named() {
        if let (Some(da), Some(db)) = (value_as_dn(a), value_as_dn(b)) {
            return da == db;
        }
    }
    a == b
}

fn multiset_eq(a: &ValueSet, b: &ValueSet) -> bool {
    let mut rest: Vec<&Value> = b.iter().collect();
    for v in a.iter() {
        match rest.iter().position(|&o| values_match(a, b, v, o)) {
            Some(i) => {
                rest.swap_remove(i);
            }
            None => return false,
        }
    }
    rest.is_empty()
}

impl PartialEq for ValueSet {
    fn eq(&self, other: &Self) -> bool {
        if !self.id.eq_ignore_ascii_case(&other.id) {
            return false;
        }
        if self.len() != other.len() {
            return false;
        }
        if self.ordered || other.ordered {
            return self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| values_match(self, other, a, b));
        }
        if let (Some(a), Some(b)) = (self.names(), other.names()) {
            if a.len() == self.len() && b.len() == other.len() {
                return a.keys().eq(b.keys());
            }
        }
        multiset_eq(self, other)
    }
}

impl Eq for ValueSet {}
