use shared::{
    ApplyTemplateResponse, ConsumeSelectionResponse, DeleteTemplateResponse, Template as SharedTemplate,
    TemplateListResponse, TemplateRequest, TemplateResponse,
};

use crate::backend::domain::commands::templates::{
    ConsumeSelectionResult, CreateTemplateCommand, DeleteTemplateResult, ListTemplatesResult,
    TemplateResult, UpdateTemplateCommand,
};
use crate::backend::domain::models::template::{DomainTemplate, PendingSelection};

/// Mapper to convert between shared Template DTOs and domain templates.
pub struct TemplateMapper;

impl TemplateMapper {
    pub fn to_dto(domain: DomainTemplate) -> SharedTemplate {
        SharedTemplate {
            id: domain.id,
            title: domain.title,
            description: domain.description,
            icon: domain.icon.as_str().to_string(),
            color: domain.color,
            data: domain.data,
        }
    }

    pub fn to_list_response(result: ListTemplatesResult) -> TemplateListResponse {
        let templates: Vec<SharedTemplate> = result.templates.into_iter().map(Self::to_dto).collect();
        TemplateListResponse {
            count: templates.len(),
            templates,
        }
    }

    pub fn to_template_response(result: TemplateResult) -> TemplateResponse {
        TemplateResponse {
            template: Self::to_dto(result.template),
            success_message: result.success_message,
        }
    }

    pub fn to_delete_response(result: DeleteTemplateResult) -> DeleteTemplateResponse {
        DeleteTemplateResponse {
            deleted_id: result.deleted_id,
            success_message: result.success_message,
        }
    }

    pub fn to_apply_response(selection: PendingSelection) -> ApplyTemplateResponse {
        ApplyTemplateResponse {
            template_id: selection.template_id,
            data: selection.data,
        }
    }

    pub fn to_consume_response(result: ConsumeSelectionResult) -> ConsumeSelectionResponse {
        ConsumeSelectionResponse {
            applied: result.applied,
            input: result.input,
        }
    }

    pub fn to_create_command(request: TemplateRequest) -> CreateTemplateCommand {
        CreateTemplateCommand {
            title: request.title,
            description: request.description,
            icon: request.icon,
            color: request.color,
            data: request.data,
        }
    }

    pub fn to_update_command(template_id: String, request: TemplateRequest) -> UpdateTemplateCommand {
        UpdateTemplateCommand {
            template_id,
            title: request.title,
            description: request.description,
            icon: request.icon,
            color: request.color,
            data: request.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::template::default_templates;

    #[test]
    fn test_list_response_counts_templates() {
        let response = TemplateMapper::to_list_response(ListTemplatesResult {
            templates: default_templates(),
        });
        assert_eq!(response.count, 4);
        assert_eq!(response.templates[0].icon, "Phone");
        assert_eq!(response.templates[1].icon, "Clipboard");
    }
}
