//! Domain logic for the Nexus cross-border instant payments gateway.
//!
//! Covers the quote lifecycle and invariant engine, the ISO 20022 schema
//! validator, the numeric kernel, and the participant/addressing registry
//! models. Pure domain logic: no database or HTTP transport lives here.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod addressing;
pub mod error;
pub mod numeric;
pub mod quote;
pub mod registry;
pub mod schema;
pub mod types;

pub use error::{Error, Result};
