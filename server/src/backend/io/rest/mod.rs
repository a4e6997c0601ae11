//! # REST API Interface Layer
//!
//! HTTP endpoints under `/api`. Each `*_apis` module exposes a `router()`
//! that is merged in [`crate::backend::create_router`].
//!
//! - **note_apis**: note generation, assistant prompt, section extraction
//! - **template_apis**: template CRUD and the pending template selection
//! - **billing_apis**: checkout, billing portal, session lookup, webhooks
//! - **diagnostics_apis**: key check, live text-generation check, health
//!
//! Failures are rendered by [`errors::ApiError`] as
//! `{"error": {"message": ...}}`. Handlers take the [`extractors`] wrappers
//! so malformed bodies and queries are rendered the same way.

pub mod billing_apis;
pub mod diagnostics_apis;
pub mod errors;
pub mod extractors;
pub mod mappers;
pub mod note_apis;
pub mod template_apis;
