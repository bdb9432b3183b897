//! Domains module containing business logic organized by bounded contexts.
//!
//! The gateway has a single domain: the tools that front the
//! pharmacovigilance API.

pub mod tools;
