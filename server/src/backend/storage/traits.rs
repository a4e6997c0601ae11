//! # Storage Traits
//!
//! Storage abstractions the domain layer works against, so the YAML file
//! backend can be swapped without touching the services.

use anyhow::Result;

use crate::backend::domain::models::template::{DomainTemplate, PendingSelection};

/// Persistence for the ordered template list and the one-shot selection slot
pub trait TemplateStorage: Send + Sync {
    /// Load all templates in stored order.
    /// Returns `None` when nothing has ever been saved.
    fn load_templates(&self) -> Result<Option<Vec<DomainTemplate>>>;

    /// Replace the stored list
    fn save_templates(&self, templates: &[DomainTemplate]) -> Result<()>;

    /// Overwrite the pending selection
    fn store_pending_selection(&self, selection: &PendingSelection) -> Result<()>;

    /// Remove and return the pending selection, if any
    fn take_pending_selection(&self) -> Result<Option<PendingSelection>>;
}
