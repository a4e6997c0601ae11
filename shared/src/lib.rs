use serde::{Deserialize, Serialize};

/// Values captured by the service coordination note form.
///
/// Serialized in camelCase because the browser form posts it as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoteInput {
    pub child_name: String,
    /// Date of the session as entered in the form (usually YYYY-MM-DD)
    pub session_date: String,
    /// Free text such as "30 minutes"; empty means not provided
    pub session_duration: String,
    pub session_location: String,
    pub contact_type: String,
    pub contact_purpose: Vec<String>,
    pub services_discussed: Vec<String>,
    pub family_input: Vec<String>,
    pub action_steps: Vec<String>,
    pub follow_up_needed: Vec<String>,
    pub additional_notes: String,
}

/// The subset of note fields a template pre-fills.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateData {
    pub contact_type: String,
    pub session_location: String,
    pub session_duration: String,
    pub contact_purpose: Vec<String>,
    pub services_discussed: Vec<String>,
    pub family_input: Vec<String>,
    pub action_steps: Vec<String>,
    pub follow_up_needed: Vec<String>,
    pub additional_notes: String,
}

/// How a note should be produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteMode {
    /// Assemble the note locally from the form values
    #[default]
    Sample,
    /// Ask the text-generation service to write the note
    Ai,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateNoteRequest {
    pub input: NoteInput,
    #[serde(default)]
    pub mode: NoteMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateNoteResponse {
    pub note: String,
    pub mode: NoteMode,
}

/// Free-form prompt forwarded to the text-generation service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub reply: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteTextRequest {
    #[serde(default)]
    pub note: String,
}

/// Labelled sections recovered from a generated note.
///
/// Every field is optional; text that matched no label ends up in
/// `main_content`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSections {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_steps: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activities: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caregiver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSectionsResponse {
    /// True when the note is an error message rather than a generated note
    pub is_error: bool,
    pub sections: NoteSections,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteBodyResponse {
    pub body: String,
}

/// A multi-select group on the note form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckboxGroup {
    pub label: String,
    pub required: bool,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckboxGroups {
    pub contact_purpose: CheckboxGroup,
    pub services_discussed: CheckboxGroup,
    pub family_input: CheckboxGroup,
    pub action_steps: CheckboxGroup,
    pub follow_up_needed: CheckboxGroup,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteOptionsResponse {
    pub locations: Vec<String>,
    pub contact_types: Vec<String>,
    pub checkbox_groups: CheckboxGroups,
}

/// Template ID in format: "template::<uuid>"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Icon name, e.g. "Phone" or "FileText"
    pub icon: String,
    /// CSS class list used to tint the template card
    pub color: String,
    pub data: TemplateData,
}

/// Body for creating or updating a template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateRequest {
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub data: TemplateData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateListResponse {
    pub templates: Vec<Template>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResponse {
    pub template: Template,
    pub success_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicateTemplateRequest {
    /// Title for the copy; defaults to "<title> (Copy)"
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTemplateResponse {
    pub deleted_id: String,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyTemplateResponse {
    pub template_id: String,
    pub data: TemplateData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumeSelectionRequest {
    /// Current form values the pending template is laid over
    pub current: NoteInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumeSelectionResponse {
    pub applied: bool,
    pub input: NoteInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    #[serde(default)]
    pub price_id: String,
    #[serde(default)]
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutResponse {
    pub session_id: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePortalSessionRequest {
    #[serde(default)]
    pub customer_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalSessionResponse {
    pub url: String,
}

/// Checkout session with the provider's expanded customer and subscription
/// objects passed through untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSessionDetails {
    pub customer: serde_json::Value,
    pub subscription: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// JSON error body returned by every failing route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticStatus {
    Success,
    Error,
}

/// Non-secret facts about the configured API key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyInfo {
    pub prefix: String,
    pub length: usize,
    pub masked: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyStatusResponse {
    pub status: DiagnosticStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_info: Option<ApiKeyInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextGenerationCheckResponse {
    pub status: DiagnosticStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_info: Option<ApiKeyInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_response: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
