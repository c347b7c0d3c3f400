//! The directory entry editing engine. This implements the distinguished
//! name model, the attribute value containers and the change-tracking entry
//! that computes minimal modification operation lists for a directory modify
//! request.
//!
//! Everything here is synchronous, in-memory data manipulation. Issuing the
//! computed operations belongs to a directory connection implementing
//! [`entry::DirectoryWriter`]; transport, authentication and schema handling
//! live on that side of the boundary.

#![deny(warnings)]
#![warn(unused_extern_crates)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unreachable)]
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::trivially_copy_pass_by_ref)]

pub mod attrset;
pub mod dn;
pub mod entry;
pub mod modify;
pub mod prelude;
pub mod value;
pub mod valueset;
