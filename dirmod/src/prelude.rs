//! One-stop imports for consumers of the engine.

pub use crate::attrset::AttrSet;
pub use crate::dn::{Dn, FrozenDn, KeyCase, NameFormat, Rdn};
pub use crate::entry::{DirectoryWriter, Entry};
pub use crate::modify::{m_add, m_remove, m_replace, Modify, ModifyList};
pub use crate::value::Value;
pub use crate::valueset::ValueSet;

pub use dirmod_proto::v1::{
    Entry as ProtoEntry, Modify as ProtoModify, ModifyList as ProtoModifyList, ModifyValue,
    NameParseError, OperationError,
};
