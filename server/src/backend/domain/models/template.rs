use serde::{Deserialize, Serialize};
use shared::TemplateData;
use std::fmt;
use uuid::Uuid;

pub const DEFAULT_TEMPLATE_COLOR: &str =
    "bg-blue-100 text-blue-600 dark:bg-blue-900 dark:text-blue-300";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainTemplate {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: TemplateIcon,
    pub color: String,
    pub data: TemplateData,
}

impl DomainTemplate {
    pub fn generate_id() -> String {
        format!("template::{}", Uuid::new_v4())
    }

    /// Case-insensitive substring match over title and description
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}

/// Icons a template card can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateIcon {
    FileText,
    Phone,
    Video,
    Users,
    Home,
    Calendar,
    Mail,
    MessageSquare,
    Clipboard,
    Building,
    Map,
    Briefcase,
}

impl TemplateIcon {
    pub const ALL: [TemplateIcon; 12] = [
        TemplateIcon::FileText,
        TemplateIcon::Phone,
        TemplateIcon::Video,
        TemplateIcon::Users,
        TemplateIcon::Home,
        TemplateIcon::Calendar,
        TemplateIcon::Mail,
        TemplateIcon::MessageSquare,
        TemplateIcon::Clipboard,
        TemplateIcon::Building,
        TemplateIcon::Map,
        TemplateIcon::Briefcase,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateIcon::FileText => "FileText",
            TemplateIcon::Phone => "Phone",
            TemplateIcon::Video => "Video",
            TemplateIcon::Users => "Users",
            TemplateIcon::Home => "Home",
            TemplateIcon::Calendar => "Calendar",
            TemplateIcon::Mail => "Mail",
            TemplateIcon::MessageSquare => "MessageSquare",
            TemplateIcon::Clipboard => "Clipboard",
            TemplateIcon::Building => "Building",
            TemplateIcon::Map => "Map",
            TemplateIcon::Briefcase => "Briefcase",
        }
    }

    /// Unknown names fall back to the generic document icon
    pub fn from_string(name: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|icon| icon.as_str() == name.trim())
            .unwrap_or(TemplateIcon::FileText)
    }
}

impl fmt::Display for TemplateIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("Template title is required")]
    TitleRequired,
    #[error("Template not found: {0}")]
    NotFound(String),
}

/// A template picked on the templates page, waiting for the note form to take it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSelection {
    pub template_id: String,
    pub data: TemplateData,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Templates offered before the user has saved any of their own
pub fn default_templates() -> Vec<DomainTemplate> {
    vec![
        DomainTemplate {
            id: "template::phone-check-in".to_string(),
            title: "Phone Check-in".to_string(),
            description: "Routine phone call to review how services are going".to_string(),
            icon: TemplateIcon::Phone,
            color: DEFAULT_TEMPLATE_COLOR.to_string(),
            data: TemplateData {
                contact_type: "Phone Call".to_string(),
                session_location: "Phone".to_string(),
                session_duration: "15 minutes".to_string(),
                contact_purpose: strings(&["Service Check-in"]),
                services_discussed: strings(&["Therapy Access", "Scheduling"]),
                family_input: strings(&["Satisfaction with Services", "Progress Updates"]),
                action_steps: strings(&["Provided Information"]),
                follow_up_needed: strings(&["Check Back with Family"]),
                additional_notes: String::new(),
            },
        },
        DomainTemplate {
            id: "template::ifsp-meeting".to_string(),
            title: "IFSP Meeting".to_string(),
            description: "Annual or periodic review of the family service plan".to_string(),
            icon: TemplateIcon::Clipboard,
            color: "bg-purple-100 text-purple-600 dark:bg-purple-900 dark:text-purple-300"
                .to_string(),
            data: TemplateData {
                contact_type: "In-person Meeting".to_string(),
                session_location: "Home".to_string(),
                session_duration: "60 minutes".to_string(),
                contact_purpose: strings(&["IFSP Meeting"]),
                services_discussed: strings(&["Developmental Concerns", "Therapy Access"]),
                family_input: strings(&["Progress Updates", "New Concerns"]),
                action_steps: strings(&["Updated IFSP", "Coordinated Services"]),
                follow_up_needed: strings(&["Schedule Next Meeting"]),
                additional_notes: String::new(),
            },
        },
        DomainTemplate {
            id: "template::home-visit".to_string(),
            title: "Home Visit".to_string(),
            description: "In-home visit covering routines and resource needs".to_string(),
            icon: TemplateIcon::Home,
            color: "bg-green-100 text-green-600 dark:bg-green-900 dark:text-green-300"
                .to_string(),
            data: TemplateData {
                contact_type: "Home Visit".to_string(),
                session_location: "Home".to_string(),
                session_duration: "45 minutes".to_string(),
                contact_purpose: strings(&["Service Check-in", "Resource Coordination"]),
                services_discussed: strings(&["Family Concerns", "Equipment Needs"]),
                family_input: strings(&["Changes in Routines", "Resource Needs"]),
                action_steps: strings(&["Provided Resources", "Addressed Concerns"]),
                follow_up_needed: strings(&["Send Resources"]),
                additional_notes: String::new(),
            },
        },
        DomainTemplate {
            id: "template::transition-planning".to_string(),
            title: "Transition Planning".to_string(),
            description: "Planning the move out of early intervention services".to_string(),
            icon: TemplateIcon::Calendar,
            color: "bg-amber-100 text-amber-600 dark:bg-amber-900 dark:text-amber-300"
                .to_string(),
            data: TemplateData {
                contact_type: "Virtual Meeting".to_string(),
                session_location: "Virtual".to_string(),
                session_duration: "30 minutes".to_string(),
                contact_purpose: strings(&["Transition Planning"]),
                services_discussed: strings(&["Childcare", "Developmental Concerns"]),
                family_input: strings(&["Questions about Development"]),
                action_steps: strings(&["Made Referrals", "Scheduled a Meeting"]),
                follow_up_needed: strings(&["Coordinate Transition", "Schedule Evaluation"]),
                additional_notes: String::new(),
            },
        },
    ]
}
