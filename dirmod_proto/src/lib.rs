//! Wire and boundary types shared between the entry editing engine and the
//! directory connections that consume its output. These are here because they
//! have public, serializable definitions.

#![deny(warnings)]
#![warn(unused_extern_crates)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::trivially_copy_pass_by_ref)]

pub mod v1;
