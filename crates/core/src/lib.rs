//! Domain logic for the fleet core: credential encryption, secret
//! generation, probe interpretation, and host status rules.
//!
//! This crate has no internal dependencies and no I/O. Everything that
//! talks to the database or the network lives in `hostfleet-db` and
//! `hostfleet-jobs`.

pub mod crypto;
pub mod error;
pub mod probe;
pub mod secret;
pub mod status;
pub mod types;
