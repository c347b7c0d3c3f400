//! Modification expressions. This is how the entry engine stores and
//! expresses the series of changes needed to bring an entry's stored state to
//! its edited state, as "states" on what attribute values should appear as.

use std::slice;

use serde::{Deserialize, Serialize};
use smartstring::alias::String as AttrString;

use crate::value::Value;
use dirmod_proto::v1::{Modify as ProtoModify, ModifyList as ProtoModifyList, ModifyValue};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Modify {
    // These values should exist in addition to the current state.
    Add(AttrString, Vec<Value>),
    // The attribute state is replaced wholesale by these values.
    Replace(AttrString, Vec<Value>),
    // These values should not exist. An empty group removes the attribute.
    Remove(AttrString, Vec<Value>),
}

pub fn m_add(attr: &str, values: Vec<Value>) -> Modify {
    Modify::Add(AttrString::from(attr), values)
}

pub fn m_replace(attr: &str, values: Vec<Value>) -> Modify {
    Modify::Replace(AttrString::from(attr), values)
}

pub fn m_remove(attr: &str, values: Vec<Value>) -> Modify {
    Modify::Remove(AttrString::from(attr), values)
}

impl Modify {
    pub fn attr(&self) -> &str {
        match self {
            Modify::Add(a, _) | Modify::Replace(a, _) | Modify::Remove(a, _) => a.as_str(),
        }
    }

    pub fn values(&self) -> &[Value] {
        match self {
            Modify::Add(_, v) | Modify::Replace(_, v) | Modify::Remove(_, v) => v.as_slice(),
        }
    }
}

impl From<&Modify> for ProtoModify {
    fn from(m: &Modify) -> Self {
        let vals = |vs: &[Value]| vs.iter().map(ModifyValue::from).collect();
        match m {
            Modify::Add(a, v) => ProtoModify::Add(a.to_string(), vals(v)),
            Modify::Replace(a, v) => ProtoModify::Replace(a.to_string(), vals(v)),
            Modify::Remove(a, v) => ProtoModify::Remove(a.to_string(), vals(v)),
        }
    }
}

/// The ordered list of modifications for one entry. The order of this list
/// matters, each change must be applied in order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifyList {
    mods: Vec<Modify>,
}

impl<'a> IntoIterator for &'a ModifyList {
    type Item = &'a Modify;
    type IntoIter = slice::Iter<'a, Modify>;

    fn into_iter(self) -> Self::IntoIter {
        self.mods.iter()
    }
}

impl ModifyList {
    pub fn new() -> Self {
        ModifyList {
            mods: Vec::with_capacity(0),
        }
    }

    pub fn new_list(mods: Vec<Modify>) -> Self {
        ModifyList { mods }
    }

    pub fn push_mod(&mut self, modify: Modify) {
        self.mods.push(modify)
    }

    pub fn iter(&self) -> slice::Iter<'_, Modify> {
        self.mods.iter()
    }

    pub fn len(&self) -> usize {
        self.mods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&ModifyList> for ProtoModifyList {
    fn from(ml: &ModifyList) -> Self {
        ProtoModifyList::new_list(ml.iter().map(ProtoModify::from).collect())
    }
}
