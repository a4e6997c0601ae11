//! # IO Module
//!
//! Interface layer between HTTP clients and the domain logic. Requests are
//! deserialized into shared DTOs, mapped to domain commands, and domain
//! results or errors are mapped back to JSON responses.

pub mod rest;
