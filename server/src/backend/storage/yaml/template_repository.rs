use anyhow::Result;
use serde::{Deserialize, Serialize};
use shared::TemplateData;
use tracing::{debug, info};

use super::connection::YamlConnection;
use crate::backend::domain::models::template::{DomainTemplate, PendingSelection, TemplateIcon};
use crate::backend::storage::traits::TemplateStorage;

const TEMPLATES_FILE: &str = "templates.yaml";
const PENDING_SELECTION_FILE: &str = "pending_template.yaml";

/// On-disk template shape; the icon is kept as its name so hand-edited
/// files with unknown icons still load
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TemplateRecord {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    color: String,
    #[serde(default)]
    data: TemplateData,
}

impl From<&DomainTemplate> for TemplateRecord {
    fn from(template: &DomainTemplate) -> Self {
        Self {
            id: template.id.clone(),
            title: template.title.clone(),
            description: template.description.clone(),
            icon: template.icon.as_str().to_string(),
            color: template.color.clone(),
            data: template.data.clone(),
        }
    }
}

impl From<TemplateRecord> for DomainTemplate {
    fn from(record: TemplateRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            icon: TemplateIcon::from_string(&record.icon),
            color: record.color,
            data: record.data,
        }
    }
}

/// YAML-file template repository
#[derive(Debug, Clone)]
pub struct TemplateRepository {
    connection: YamlConnection,
}

impl TemplateRepository {
    pub fn new(connection: YamlConnection) -> Self {
        Self { connection }
    }
}

impl TemplateStorage for TemplateRepository {
    fn load_templates(&self) -> Result<Option<Vec<DomainTemplate>>> {
        let records: Option<Vec<TemplateRecord>> = self.connection.read(TEMPLATES_FILE)?;
        Ok(records.map(|records| {
            debug!("Loaded {} templates", records.len());
            records.into_iter().map(DomainTemplate::from).collect()
        }))
    }

    fn save_templates(&self, templates: &[DomainTemplate]) -> Result<()> {
        let records: Vec<TemplateRecord> = templates.iter().map(TemplateRecord::from).collect();
        self.connection.write(TEMPLATES_FILE, &records)?;
        info!("Saved {} templates", records.len());
        Ok(())
    }

    fn store_pending_selection(&self, selection: &PendingSelection) -> Result<()> {
        self.connection.write(PENDING_SELECTION_FILE, selection)?;
        debug!("Stored pending selection for {}", selection.template_id);
        Ok(())
    }

    fn take_pending_selection(&self) -> Result<Option<PendingSelection>> {
        let selection: Option<PendingSelection> = self.connection.read(PENDING_SELECTION_FILE)?;
        if selection.is_some() {
            self.connection.remove(PENDING_SELECTION_FILE)?;
        }
        Ok(selection)
    }
}
