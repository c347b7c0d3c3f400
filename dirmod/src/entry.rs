//! Entries are the unit of editing. An entry is a collection of
//! attribute-value containers under a distinguished name. A pseudo example:
//!
//! ```text
//! Entry {
//!   "cn": ["william"],
//!   "mail": ["maila@example.com", "mailb@example.com"],
//! };
//! ```
//!
//! An entry starts outside update mode, where every mutation writes straight
//! into the stored attribute state. Switching into update mode is one-way:
//! from then on mutations land in a pending set holding only the touched
//! attributes, and [`Entry::modification_items`] computes the minimal ordered
//! operation list that transforms the stored state into the pending state.
//! After the operations have been applied over the boundary, [`Entry::update`]
//! folds the pending state back into the stored state.

use std::fmt;

use tracing::warn;
use url::Url;

use crate::attrset::AttrSet;
use crate::dn::Dn;
use crate::modify::{m_add, m_remove, m_replace, ModifyList};
use crate::value::Value;
use crate::valueset::{values_match, ValueSet};
use dirmod_proto::v1::{
    Entry as ProtoEntry, ModifyList as ProtoModifyList, ModifyValue, OperationError,
};

/// The outgoing half of the directory connection boundary. Implementations
/// submit one ordered modification list as a single modify request.
/// An implementation that only supports part of the capability may refuse
/// with [`OperationError::UnsupportedOperation`].
pub trait DirectoryWriter {
    fn modify(&mut self, dn: &Dn, mods: &ProtoModifyList) -> Result<(), OperationError>;
}

#[derive(Debug, Clone)]
pub struct Entry {
    dn: Dn,
    base: Dn,
    referral: Option<Url>,
    update_mode: bool,
    attrs: AttrSet,
    // Holds only the attributes touched since the last update() while in
    // update mode.
    pending: AttrSet,
}

impl Entry {
    pub fn new(dn: Dn) -> Self {
        Self::with_attrs(dn, AttrSet::new())
    }

    /// Construct from a read result: the stored attribute state plus the
    /// name, outside update mode.
    pub fn with_attrs(dn: Dn, attrs: AttrSet) -> Self {
        Entry {
            dn,
            base: Dn::new(),
            referral: None,
            update_mode: false,
            attrs,
            pending: AttrSet::new(),
        }
    }

    pub fn new_referral(dn: Dn, referral: Url) -> Self {
        let mut e = Self::new(dn);
        e.referral = Some(referral);
        e
    }

    /// The name relative to the connection root.
    pub fn dn(&self) -> &Dn {
        &self.dn
    }

    pub fn base(&self) -> &Dn {
        &self.base
    }

    pub fn set_base(&mut self, base: Dn) {
        self.base = base;
    }

    /// The absolute name: base suffix plus the relative name.
    pub fn name_in_namespace(&self) -> Dn {
        let mut full = self.base.clone();
        full.append(&self.dn);
        full
    }

    pub fn is_referral(&self) -> bool {
        self.referral.is_some()
    }

    pub fn referral_url(&self) -> Option<&Url> {
        self.referral.as_ref()
    }

    pub fn in_update_mode(&self) -> bool {
        self.update_mode
    }

    /// Enter update mode. The transition is one-way: asking to leave it
    /// again is an error. Re-entering is a no-op and never discards tracked
    /// changes.
    pub fn set_update_mode(&mut self, on: bool) -> Result<(), OperationError> {
        if on {
            if !self.update_mode {
                self.update_mode = true;
                self.pending = AttrSet::new();
            }
            Ok(())
        } else if self.update_mode {
            Err(OperationError::InvalidEntryState)
        } else {
            Ok(())
        }
    }

    /// Reassign the name. Forbidden while tracked edits may reference it.
    pub fn set_dn(&mut self, dn: Dn) -> Result<(), OperationError> {
        if self.update_mode {
            return Err(OperationError::InvalidEntryState);
        }
        self.dn = dn;
        Ok(())
    }

    /// Presence in the stored state. Pending-only attributes do not exist
    /// until [`Entry::update`] folds them in.
    pub fn exists(&self, id: &str) -> bool {
        self.attrs.contains(id)
    }

    /// First stored string value, if any.
    pub fn get_string_attribute(&self, id: &str) -> Option<&str> {
        self.attrs.get(id).and_then(|vs| vs.first()).and_then(Value::as_utf8)
    }

    /// All stored string values of one attribute.
    pub fn get_string_attributes(&self, id: &str) -> Vec<&str> {
        self.attrs
            .get(id)
            .map(|vs| vs.iter().filter_map(Value::as_utf8).collect())
            .unwrap_or_default()
    }

    /// First stored value of any kind.
    pub fn get_value_attribute(&self, id: &str) -> Option<&Value> {
        self.attrs.get(id).and_then(|vs| vs.first())
    }

    /// First stored value, as a parsed name.
    pub fn get_dn_attribute(&self, id: &str) -> Option<&Dn> {
        self.get_value_attribute(id).and_then(Value::as_dn)
    }

    pub fn attribute_names(&self) -> Vec<&str> {
        self.attrs.ids().collect()
    }

    /// The ids touched since the last update, or every stored id outside
    /// update mode.
    pub fn modified_attribute_names(&self) -> Vec<&str> {
        if self.update_mode {
            self.pending.ids().collect()
        } else {
            self.attrs.ids().collect()
        }
    }

    fn writable(&mut self) -> &mut AttrSet {
        if self.update_mode {
            &mut self.pending
        } else {
            &mut self.attrs
        }
    }

    /// The pending container for `id`, seeded from the stored state on first
    /// touch so value-level edits start from what is already there.
    fn touch(&mut self, id: &str) -> &mut ValueSet {
        if self.update_mode {
            let attrs = &self.attrs;
            self.pending.entry_or_insert_with(id, || {
                attrs
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| ValueSet::new(id))
            })
        } else {
            self.attrs.entry_or_insert_with(id, || ValueSet::new(id))
        }
    }

    /// Replace the attribute with a single value.
    pub fn set_attribute_value(&mut self, id: &str, value: Value) {
        let mut vs = ValueSet::new(id);
        vs.add(value);
        self.writable().put(vs);
    }

    /// Replace the attribute with a value group.
    pub fn set_attribute_values(&mut self, id: &str, values: Vec<Value>, order_matters: bool) {
        self.writable().put(ValueSet::with_values(id, values, order_matters));
    }

    /// Add one value, reporting whether it was distinct.
    pub fn add_attribute_value(&mut self, id: &str, value: Value) -> bool {
        self.touch(id).add(value)
    }

    /// Add one value even when an equal one is already present.
    pub fn add_attribute_value_allow_dup(&mut self, id: &str, value: Value) {
        self.touch(id).push(value)
    }

    /// Remove one value, reporting whether it was present.
    pub fn remove_attribute_value(&mut self, id: &str, value: &Value) -> bool {
        self.touch(id).remove(value)
    }

    /// The ordered operation list transforming the stored state into the
    /// pending state. Always empty outside update mode.
    pub fn modification_items(&self) -> ModifyList {
        let mut mods = ModifyList::new();
        if !self.update_mode {
            return mods;
        }
        for changed in self.pending.iter() {
            self.collect_modifications(changed, &mut mods);
        }
        mods
    }

    fn collect_modifications(&self, changed: &ValueSet, mods: &mut ModifyList) {
        let id = changed.id();
        let stored = self.attrs.get(id);

        // When the edited side carries name identity and the stored side
        // does not, re-derive the stored side's mapping so both compare by
        // parsed name. Stored values that are not names downgrade the
        // comparison to raw strings.
        let upgraded: Option<ValueSet> = match stored {
            Some(orig) if changed.is_named() && !orig.is_named() => {
                let mut copy = orig.clone();
                if copy.init_values_as_names() {
                    Some(copy)
                } else {
                    warn!(attr = id, "stored values are not names, comparing raw");
                    None
                }
            }
            _ => None,
        };
        let original = upgraded.as_ref().or(stored);

        match original {
            Some(orig) if changed == orig => return,
            None if changed.is_empty() => return,
            _ => {}
        }

        let orig_len = original.map_or(0, ValueSet::len);

        if orig_len == 1 && changed.len() == 1 {
            mods.push_mod(m_replace(id, changed.to_vec()));
        } else if changed.is_empty() && orig_len > 0 {
            // Removing every value removes the attribute itself.
            mods.push_mod(m_remove(id, Vec::new()));
        } else if orig_len == 0 {
            mods.push_mod(m_add(id, changed.to_vec()));
        } else if changed.ordered() {
            // Partial add/remove cannot express a reorder.
            mods.push_mod(m_replace(id, changed.to_vec()));
        } else if let Some(orig) = original {
            diff_values(orig, changed, mods);
        }
    }

    /// Fold the pending state into the stored state: an empty pending
    /// container removes its attribute, any other replaces it. The pending
    /// set is reset.
    pub fn update(&mut self) {
        if !self.update_mode {
            return;
        }
        let pending = std::mem::take(&mut self.pending);
        for vs in pending {
            if vs.is_empty() {
                self.attrs.remove(vs.id());
            } else {
                self.attrs.put(vs);
            }
        }
    }

    /// Compute the operation list, submit it over the boundary, and on
    /// success fold the pending state in. An empty list skips the
    /// submission.
    pub fn commit(
        &mut self,
        writer: &mut dyn DirectoryWriter,
    ) -> Result<ProtoModifyList, OperationError> {
        let mods = ProtoModifyList::from(&self.modification_items());
        if !mods.is_empty() {
            let dn = self.name_in_namespace();
            writer.modify(&dn, &mods)?;
        }
        self.update();
        Ok(mods)
    }

    pub fn to_proto(&self) -> ProtoEntry {
        let mut attrs = std::collections::BTreeMap::new();
        for vs in self.attrs.iter() {
            attrs.insert(
                vs.id().to_string(),
                vs.iter().map(ModifyValue::from).collect(),
            );
        }
        ProtoEntry {
            dn: self.name_in_namespace().to_compact_string(),
            attrs,
        }
    }
}

/// Value-level difference of one unordered multi-valued attribute. Values of
/// the stored side not present in the edited side form the removed group,
/// edited values not present in the stored side form the added group.
fn diff_values(original: &ValueSet, changed: &ValueSet, mods: &mut ModifyList) {
    let id = changed.id();
    let mut remaining: Vec<&Value> = original.iter().collect();
    let mut added: Vec<Value> = Vec::new();
    for v in changed.iter() {
        match remaining
            .iter()
            .position(|&o| values_match(changed, original, v, o))
        {
            Some(i) => {
                remaining.remove(i);
            }
            None => added.push(v.clone()),
        }
    }
    let removed: Vec<Value> = remaining.into_iter().cloned().collect();

    if removed.len() == original.len() {
        // No stored value survives: collapse to a whole-value replacement.
        mods.push_mod(m_replace(id, added));
    } else if removed.is_empty() && added.is_empty() {
        // The containers compared unequal yet no per-value difference was
        // found. Report a whole-value replacement rather than drop a change.
        mods.push_mod(m_replace(id, changed.to_vec()));
    } else {
        if !removed.is_empty() {
            mods.push_mod(m_remove(id, removed));
        }
        if !added.is_empty() {
            mods.push_mod(m_add(id, added));
        }
    }
}

impl TryFrom<&ProtoEntry> for Entry {
    type Error = OperationError;

    fn try_from(pe: &ProtoEntry) -> Result<Self, Self::Error> {
        let dn = Dn::parse(&pe.dn).map_err(OperationError::NameParse)?;
        let mut attrs = AttrSet::new();
        for (id, vals) in pe.attrs.iter() {
            let mut vs = ValueSet::new(id);
            for mv in vals {
                vs.push(Value::try_from(mv)?);
            }
            attrs.put(vs);
        }
        Ok(Entry::with_attrs(dn, attrs))
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_proto())
    }
}
