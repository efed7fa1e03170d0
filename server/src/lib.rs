//! Arena relay server library.
//!
//! This module exposes the relay components for use in tests and binaries.

pub mod config;
pub mod roster;
pub mod session;
pub mod validate;
pub mod ws;
