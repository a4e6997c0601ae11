//! # Domain Module
//!
//! Business logic for the note-writing backend. Nothing in here knows about
//! HTTP; services take commands or shared DTOs and return results that the
//! REST layer maps to responses.
//!
//! ## Module Organization
//!
//! - **note_assembly**: builds the markdown note from form values
//! - **note_sections**: splits a generated note back into labelled sections
//! - **note_service**: validation, sample / AI note generation, diagnostics
//! - **template_service**: saved templates and the pending template selection
//! - **billing_service**: checkout, billing portal and webhook intake
//! - **webhook**: payment-provider signature verification and event dispatch
//!
//! ## Business Rules
//!
//! - Required note fields are checked in form order; the first gap is reported
//! - Note assembly is deterministic for a given input
//! - Templates keep their stored order; duplicates always get a fresh id
//! - A pending template selection is consumed at most once

pub mod billing_service;
pub mod commands;
pub mod models;
pub mod note_assembly;
pub mod note_sections;
pub mod note_service;
pub mod template_service;
pub mod webhook;

pub use billing_service::{BillingError, BillingService};
pub use note_service::NoteService;
pub use template_service::TemplateService;
