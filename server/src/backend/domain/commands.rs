//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer maps the public DTOs defined
//! in the `shared` crate to these internal types.

pub mod templates {
    use shared::{NoteInput, TemplateData};

    use crate::backend::domain::models::template::DomainTemplate;

    /// Query for listing templates.
    #[derive(Debug, Clone, Default)]
    pub struct ListTemplatesQuery {
        /// Case-insensitive filter over title and description
        pub search: Option<String>,
    }

    /// Input for creating a new template.
    #[derive(Debug, Clone)]
    pub struct CreateTemplateCommand {
        pub title: String,
        pub description: String,
        pub icon: Option<String>,
        pub color: Option<String>,
        pub data: TemplateData,
    }

    /// Input for replacing an existing template.
    /// `icon` and `color` keep their stored values when absent.
    #[derive(Debug, Clone)]
    pub struct UpdateTemplateCommand {
        pub template_id: String,
        pub title: String,
        pub description: String,
        pub icon: Option<String>,
        pub color: Option<String>,
        pub data: TemplateData,
    }

    #[derive(Debug, Clone)]
    pub struct DuplicateTemplateCommand {
        pub template_id: String,
        pub title: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct ListTemplatesResult {
        pub templates: Vec<DomainTemplate>,
    }

    /// Result of create, update and duplicate.
    #[derive(Debug, Clone)]
    pub struct TemplateResult {
        pub template: DomainTemplate,
        pub success_message: String,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteTemplateResult {
        pub deleted_id: String,
        pub success_message: String,
    }

    /// Result of consuming the pending selection.
    #[derive(Debug, Clone)]
    pub struct ConsumeSelectionResult {
        pub applied: bool,
        pub input: NoteInput,
    }
}

pub mod billing {
    /// Input for starting a hosted subscription checkout.
    #[derive(Debug, Clone)]
    pub struct CreateCheckoutCommand {
        pub price_id: String,
        pub customer_id: Option<String>,
        /// Site origin the hosted page redirects back to
        pub origin: String,
    }

    #[derive(Debug, Clone)]
    pub struct CreatePortalSessionCommand {
        pub customer_id: String,
        pub origin: String,
    }
}
