//! A case-insensitive collection of attribute value containers: the full
//! attribute state of one entry. Keys are folded to lowercase, the contained
//! container keeps the id spelling it was created with. Iteration order is
//! deterministic for a given set of keys.

use std::collections::BTreeMap;

use smartstring::alias::String as AttrString;

use crate::valueset::ValueSet;

fn fold(id: &str) -> AttrString {
    AttrString::from(id.to_lowercase())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrSet {
    attrs: BTreeMap<AttrString, ValueSet>,
}

impl AttrSet {
    pub fn new() -> Self {
        AttrSet {
            attrs: BTreeMap::new(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&ValueSet> {
        self.attrs.get(&fold(id))
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ValueSet> {
        self.attrs.get_mut(&fold(id))
    }

    /// Insert a container under its own id, replacing and returning any
    /// previous container for that id.
    pub fn put(&mut self, vs: ValueSet) -> Option<ValueSet> {
        self.attrs.insert(fold(vs.id()), vs)
    }

    pub fn remove(&mut self, id: &str) -> Option<ValueSet> {
        self.attrs.remove(&fold(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.attrs.contains_key(&fold(id))
    }

    /// The stored ids, original spelling, in deterministic order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.attrs.values().map(|vs| vs.id())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValueSet> {
        self.attrs.values()
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// The container for `id`, created through `make` on first touch.
    pub fn entry_or_insert_with(
        &mut self,
        id: &str,
        make: impl FnOnce() -> ValueSet,
    ) -> &mut ValueSet {
        self.attrs.entry(fold(id)).or_insert_with(make)
    }
}

impl IntoIterator for AttrSet {
    type Item = ValueSet;
    type IntoIter = std::collections::btree_map::IntoValues<AttrString, ValueSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.attrs.into_values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_attrset_case_insensitive_access() {
        let mut set = AttrSet::new();
        set.put(ValueSet::with_values(
            "objectClass",
            vec![Value::new_utf8s("person")],
            false,
        ));
        assert!(set.contains("objectclass"));
        assert!(set.contains("OBJECTCLASS"));
        // The container keeps the original spelling.
        assert_eq!(set.get("objectclass").unwrap().id(), "objectClass");
        assert!(set.remove("ObjectClass").is_some());
        assert!(set.is_empty());
    }

    #[test]
    fn test_attrset_put_replaces() {
        let mut set = AttrSet::new();
        set.put(ValueSet::with_values(
            "cn",
            vec![Value::new_utf8s("old")],
            false,
        ));
        let prev = set.put(ValueSet::with_values(
            "CN",
            vec![Value::new_utf8s("new")],
            false,
        ));
        assert_eq!(prev.unwrap().first().unwrap().as_utf8(), Some("old"));
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.get("cn").unwrap().first().unwrap().as_utf8(),
            Some("new")
        );
    }

    #[test]
    fn test_attrset_deterministic_ids() {
        let mut set = AttrSet::new();
        set.put(ValueSet::new("sn"));
        set.put(ValueSet::new("cn"));
        set.put(ValueSet::new("mail"));
        let ids: Vec<&str> = set.ids().collect();
        assert_eq!(ids, vec!["cn", "mail", "sn"]);
    }

    #[test]
    fn test_attrset_clone_is_deep() {
        let mut set = AttrSet::new();
        set.put(ValueSet::with_values(
            "mail",
            vec![Value::new_utf8s("a")],
            false,
        ));
        let mut copy = set.clone();
        if let Some(vs) = copy.get_mut("mail") {
            vs.add(Value::new_utf8s("b"));
        }
        assert_eq!(set.get("mail").unwrap().len(), 1);
        assert_eq!(copy.get("mail").unwrap().len(), 2);
    }
}
