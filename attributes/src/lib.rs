//! Dotted-path attribute container.
//!
//! [`Attributes`] wraps a JSON-shaped mapping and exposes it as a record:
//! reads accept dotted paths (`"user.address.city"`), writes address the
//! top level only, and a list of required paths is validated when the
//! container is built.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod container;
pub mod error;
pub mod key;
pub mod record;

pub use container::Attributes;
pub use error::{AttributesError, Result};
pub use key::Key;
pub use record::AttributeRecord;
