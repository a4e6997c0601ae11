use anyhow::{anyhow, Result};
use shared::NoteInput;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::backend::domain::commands::templates::{
    ConsumeSelectionResult, CreateTemplateCommand, DeleteTemplateResult, DuplicateTemplateCommand,
    ListTemplatesQuery, ListTemplatesResult, TemplateResult, UpdateTemplateCommand,
};
use crate::backend::domain::models::note::apply_template_data;
use crate::backend::domain::models::template::{
    default_templates, DomainTemplate, PendingSelection, TemplateError, TemplateIcon,
    DEFAULT_TEMPLATE_COLOR,
};
use crate::backend::storage::TemplateStorage;

/// Service for managing saved note templates
#[derive(Clone)]
pub struct TemplateService {
    storage: Arc<dyn TemplateStorage>,
    // Serializes read-modify-write cycles on the template file
    lock: Arc<Mutex<()>>,
}

impl TemplateService {
    pub fn new(storage: Arc<dyn TemplateStorage>) -> Self {
        Self {
            storage,
            lock: Arc::new(Mutex::new(())),
        }
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>> {
        self.lock.lock().map_err(|_| anyhow!("Template store lock poisoned"))
    }

    /// Load the stored list, seeding the defaults on first use.
    /// An unreadable store is served as the defaults until the next save
    /// replaces it.
    fn load_all(&self) -> Result<Vec<DomainTemplate>> {
        match self.storage.load_templates() {
            Ok(Some(templates)) => Ok(templates),
            Err(e) => {
                warn!("Template store unreadable, using defaults: {:#}", e);
                Ok(default_templates())
            }
            Ok(None) => {
                let templates = default_templates();
                self.storage.save_templates(&templates)?;
                info!("Seeded {} default templates", templates.len());
                Ok(templates)
            }
        }
    }

    fn find_index(templates: &[DomainTemplate], template_id: &str) -> Result<usize> {
        templates
            .iter()
            .position(|t| t.id == template_id)
            .ok_or_else(|| TemplateError::NotFound(template_id.to_string()).into())
    }

    fn checked_title(title: &str) -> Result<String> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TemplateError::TitleRequired.into());
        }
        Ok(title.to_string())
    }

    /// List templates in stored order, optionally filtered
    pub fn list_templates(&self, query: ListTemplatesQuery) -> Result<ListTemplatesResult> {
        let _guard = self.guard()?;
        let templates = self.load_all()?;

        let templates = match query.search.as_deref().map(str::trim) {
            Some(search) if !search.is_empty() => {
                debug!("Filtering templates by '{}'", search);
                templates.into_iter().filter(|t| t.matches_search(search)).collect()
            }
            _ => templates,
        };

        info!("Found {} templates", templates.len());
        Ok(ListTemplatesResult { templates })
    }

    pub fn get_template(&self, template_id: &str) -> Result<DomainTemplate> {
        let _guard = self.guard()?;
        let mut templates = self.load_all()?;
        let index = Self::find_index(&templates, template_id)?;
        Ok(templates.swap_remove(index))
    }

    pub fn create_template(&self, command: CreateTemplateCommand) -> Result<TemplateResult> {
        let title = Self::checked_title(&command.title)?;
        info!("Creating template: {}", title);

        let _guard = self.guard()?;
        let mut templates = self.load_all()?;

        let template = DomainTemplate {
            id: DomainTemplate::generate_id(),
            title,
            description: command.description.trim().to_string(),
            icon: command
                .icon
                .as_deref()
                .map(TemplateIcon::from_string)
                .unwrap_or(TemplateIcon::FileText),
            color: command
                .color
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TEMPLATE_COLOR.to_string()),
            data: command.data,
        };

        templates.push(template.clone());
        self.storage.save_templates(&templates)?;

        info!("Created template: {} with ID: {}", template.title, template.id);
        Ok(TemplateResult {
            template,
            success_message: "Template created successfully".to_string(),
        })
    }

    pub fn update_template(&self, command: UpdateTemplateCommand) -> Result<TemplateResult> {
        info!("Updating template: {}", command.template_id);
        let title = Self::checked_title(&command.title)?;

        let _guard = self.guard()?;
        let mut templates = self.load_all()?;
        let index = Self::find_index(&templates, &command.template_id)?;

        let template = &mut templates[index];
        template.title = title;
        template.description = command.description.trim().to_string();
        if let Some(icon) = command.icon.as_deref() {
            template.icon = TemplateIcon::from_string(icon);
        }
        if let Some(color) = command.color.filter(|c| !c.trim().is_empty()) {
            template.color = color;
        }
        template.data = command.data;

        let template = template.clone();
        self.storage.save_templates(&templates)?;

        info!("Updated template: {} with ID: {}", template.title, template.id);
        Ok(TemplateResult {
            template,
            success_message: "Template updated successfully".to_string(),
        })
    }

    /// Remove exactly the template with this id
    pub fn delete_template(&self, template_id: &str) -> Result<DeleteTemplateResult> {
        info!("Deleting template: {}", template_id);

        let _guard = self.guard()?;
        let mut templates = self.load_all()?;
        let index = Self::find_index(&templates, template_id)?;
        let removed = templates.remove(index);
        self.storage.save_templates(&templates)?;

        info!("Deleted template: {} with ID: {}", removed.title, removed.id);
        Ok(DeleteTemplateResult {
            deleted_id: removed.id,
            success_message: "Template deleted successfully".to_string(),
        })
    }

    /// Copy a template under a fresh id, appended to the end of the list
    pub fn duplicate_template(&self, command: DuplicateTemplateCommand) -> Result<TemplateResult> {
        info!("Duplicating template: {}", command.template_id);

        let _guard = self.guard()?;
        let mut templates = self.load_all()?;
        let index = Self::find_index(&templates, &command.template_id)?;
        let source = &templates[index];

        let title = match command.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => format!("{} (Copy)", source.title),
        };

        let copy = DomainTemplate {
            id: DomainTemplate::generate_id(),
            title,
            ..source.clone()
        };
        templates.push(copy.clone());
        self.storage.save_templates(&templates)?;

        info!("Duplicated template {} as {}", command.template_id, copy.id);
        Ok(TemplateResult {
            template: copy,
            success_message: "Template duplicated successfully".to_string(),
        })
    }

    /// Hand a template's values to the next note form load
    pub fn apply_template(&self, template_id: &str) -> Result<PendingSelection> {
        info!("Selecting template for the note form: {}", template_id);

        let _guard = self.guard()?;
        let templates = self.load_all()?;
        let index = Self::find_index(&templates, template_id)?;

        let selection = PendingSelection {
            template_id: templates[index].id.clone(),
            data: templates[index].data.clone(),
        };
        self.storage.store_pending_selection(&selection)?;
        Ok(selection)
    }

    /// Take the pending selection once and lay it over the current values
    pub fn consume_selection(&self, current: NoteInput) -> Result<ConsumeSelectionResult> {
        let _guard = self.guard()?;

        match self.storage.take_pending_selection()? {
            Some(selection) => {
                info!("Applied template {} to the note form", selection.template_id);
                Ok(ConsumeSelectionResult {
                    applied: true,
                    input: apply_template_data(&current, &selection.data),
                })
            }
            None => {
                warn!("No pending template selection");
                Ok(ConsumeSelectionResult { applied: false, input: current })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::note::test_support::complete_input;
    use crate::backend::storage::{TemplateRepository, YamlConnection};
    use shared::TemplateData;
    use tempfile::TempDir;

    fn setup_service() -> (TemplateService, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection = YamlConnection::new(temp_dir.path()).expect("Failed to create connection");
        let storage = Arc::new(TemplateRepository::new(connection));
        (TemplateService::new(storage), temp_dir)
    }

    fn create_command(title: &str) -> CreateTemplateCommand {
        CreateTemplateCommand {
            title: title.to_string(),
            description: "Weekly call with the family".to_string(),
            icon: Some("Phone".to_string()),
            color: None,
            data: TemplateData {
                contact_type: "Phone Call".to_string(),
                contact_purpose: vec!["Service Check-in".to_string()],
                ..TemplateData::default()
            },
        }
    }

    fn not_found(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<TemplateError>(), Some(TemplateError::NotFound(_)))
    }

    #[test]
    fn test_first_list_seeds_defaults() {
        let (service, _temp_dir) = setup_service();

        let result = service.list_templates(ListTemplatesQuery::default()).unwrap();
        let ids: Vec<String> = default_templates().into_iter().map(|t| t.id).collect();
        assert_eq!(result.templates.iter().map(|t| t.id.clone()).collect::<Vec<_>>(), ids);
    }

    #[test]
    fn test_emptied_store_is_not_reseeded() {
        let (service, _temp_dir) = setup_service();
        let templates = service.list_templates(ListTemplatesQuery::default()).unwrap().templates;
        for template in templates {
            service.delete_template(&template.id).unwrap();
        }

        let result = service.list_templates(ListTemplatesQuery::default()).unwrap();
        assert!(result.templates.is_empty());
    }

    #[test]
    fn test_corrupt_store_falls_back_to_defaults() {
        let (service, temp_dir) = setup_service();
        std::fs::write(temp_dir.path().join("templates.yaml"), "- id: [unterminated").unwrap();

        let result = service.list_templates(ListTemplatesQuery::default()).unwrap();
        assert_eq!(result.templates.len(), default_templates().len());

        // The next save replaces the unreadable file
        let created = service.create_template(create_command("Weekly Check")).unwrap();
        let result = service.list_templates(ListTemplatesQuery::default()).unwrap();
        assert_eq!(result.templates.len(), default_templates().len() + 1);
        assert_eq!(result.templates.last().map(|t| t.id.clone()), Some(created.template.id));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let (service, _temp_dir) = setup_service();
        service.create_template(create_command("Weekly Check")).unwrap();

        let by_title = service
            .list_templates(ListTemplatesQuery { search: Some("WEEKLY check".to_string()) })
            .unwrap();
        assert_eq!(by_title.templates.len(), 1);

        let by_description = service
            .list_templates(ListTemplatesQuery { search: Some("with the FAMILY".to_string()) })
            .unwrap();
        assert_eq!(by_description.templates.len(), 1);

        let none = service
            .list_templates(ListTemplatesQuery { search: Some("zzz".to_string()) })
            .unwrap();
        assert!(none.templates.is_empty());
    }

    #[test]
    fn test_create_assigns_id_and_defaults() {
        let (service, _temp_dir) = setup_service();

        let result = service.create_template(create_command("  Weekly Check  ")).unwrap();
        assert!(result.template.id.starts_with("template::"));
        assert_eq!(result.template.title, "Weekly Check");
        assert_eq!(result.template.icon, TemplateIcon::Phone);
        assert_eq!(result.template.color, DEFAULT_TEMPLATE_COLOR);
        assert_eq!(result.success_message, "Template created successfully");

        let stored = service.get_template(&result.template.id).unwrap();
        assert_eq!(stored, result.template);
    }

    #[test]
    fn test_create_requires_title() {
        let (service, _temp_dir) = setup_service();
        let err = service.create_template(create_command("   ")).unwrap_err();
        assert_eq!(err.downcast_ref::<TemplateError>(), Some(&TemplateError::TitleRequired));
    }

    #[test]
    fn test_update_replaces_fields_and_keeps_icon() {
        let (service, _temp_dir) = setup_service();
        let created = service.create_template(create_command("Weekly Check")).unwrap().template;

        let result = service
            .update_template(UpdateTemplateCommand {
                template_id: created.id.clone(),
                title: "Monthly Check".to_string(),
                description: String::new(),
                icon: None,
                color: Some("bg-green-100".to_string()),
                data: TemplateData::default(),
            })
            .unwrap();

        assert_eq!(result.template.id, created.id);
        assert_eq!(result.template.title, "Monthly Check");
        assert_eq!(result.template.icon, TemplateIcon::Phone);
        assert_eq!(result.template.color, "bg-green-100");
        assert_eq!(result.template.data, TemplateData::default());
    }

    #[test]
    fn test_update_unknown_template() {
        let (service, _temp_dir) = setup_service();
        let err = service
            .update_template(UpdateTemplateCommand {
                template_id: "template::missing".to_string(),
                title: "Anything".to_string(),
                description: String::new(),
                icon: None,
                color: None,
                data: TemplateData::default(),
            })
            .unwrap_err();
        assert!(not_found(&err));
    }

    #[test]
    fn test_delete_removes_exactly_that_template() {
        let (service, _temp_dir) = setup_service();
        let before = service.list_templates(ListTemplatesQuery::default()).unwrap().templates;
        let target = before[1].id.clone();

        let result = service.delete_template(&target).unwrap();
        assert_eq!(result.deleted_id, target);

        let after = service.list_templates(ListTemplatesQuery::default()).unwrap().templates;
        let expected: Vec<_> = before.into_iter().filter(|t| t.id != target).collect();
        assert_eq!(after, expected);

        assert!(not_found(&service.delete_template(&target).unwrap_err()));
    }

    #[test]
    fn test_duplicate_gets_fresh_id_and_same_values() {
        let (service, _temp_dir) = setup_service();
        let source = service.create_template(create_command("Weekly Check")).unwrap().template;

        let copy = service
            .duplicate_template(DuplicateTemplateCommand {
                template_id: source.id.clone(),
                title: None,
            })
            .unwrap()
            .template;

        assert_ne!(copy.id, source.id);
        assert_eq!(copy.title, "Weekly Check (Copy)");
        assert_eq!(copy.description, source.description);
        assert_eq!(copy.icon, source.icon);
        assert_eq!(copy.color, source.color);
        assert_eq!(copy.data, source.data);

        let named = service
            .duplicate_template(DuplicateTemplateCommand {
                template_id: source.id.clone(),
                title: Some("Another".to_string()),
            })
            .unwrap()
            .template;
        assert_eq!(named.title, "Another");

        let list = service.list_templates(ListTemplatesQuery::default()).unwrap().templates;
        assert_eq!(list.last().map(|t| t.id.clone()), Some(named.id));
    }

    #[test]
    fn test_apply_then_consume_once() {
        let (service, _temp_dir) = setup_service();
        let template = service.get_template("template::phone-check-in").unwrap();

        service.apply_template(&template.id).unwrap();

        let current = complete_input();
        let first = service.consume_selection(current.clone()).unwrap();
        assert!(first.applied);
        assert_eq!(first.input.child_name, current.child_name);
        assert_eq!(first.input.contact_type, template.data.contact_type);
        assert_eq!(first.input.contact_purpose, template.data.contact_purpose);

        let second = service.consume_selection(current.clone()).unwrap();
        assert!(!second.applied);
        assert_eq!(second.input, current);
    }

    #[test]
    fn test_apply_unknown_template() {
        let (service, _temp_dir) = setup_service();
        assert!(not_found(&service.apply_template("template::missing").unwrap_err()));
    }
}
