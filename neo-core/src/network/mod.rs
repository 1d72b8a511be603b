//! Network-facing inventory types.

pub mod payloads;
