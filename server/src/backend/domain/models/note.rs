//! Domain rules for the service coordination note form.

use shared::{CheckboxGroup, CheckboxGroups, NoteInput, TemplateData};

/// Duration written into a note when the form leaves it blank
pub const DEFAULT_SESSION_DURATION: &str = "45 minutes";

pub const SESSION_LOCATIONS: &[&str] = &[
    "Home",
    "Phone",
    "Virtual",
    "Office",
    "Community Site",
    "Childcare Center",
    "School",
];

pub const CONTACT_TYPES: &[&str] = &[
    "Phone Call",
    "In-person Meeting",
    "Email",
    "Virtual Meeting",
    "Text Message",
    "Home Visit",
];

const CONTACT_PURPOSE_OPTIONS: &[&str] = &[
    "IFSP Meeting",
    "Service Check-in",
    "Referral Support",
    "Transition Planning",
    "Initial Contact",
    "Follow-up",
    "New Test",
    "Crisis Intervention",
    "Resource Coordination",
];

const SERVICES_DISCUSSED_OPTIONS: &[&str] = &[
    "Therapy Access",
    "Scheduling",
    "Family Concerns",
    "Developmental Concerns",
    "Financial Assistance",
    "Equipment Needs",
    "Childcare",
    "Medical Needs",
    "Housing",
    "Transportation",
];

const FAMILY_INPUT_OPTIONS: &[&str] = &[
    "Satisfaction with Services",
    "New Concerns",
    "Changes in Routines",
    "Progress Updates",
    "Challenges with Services",
    "Questions about Development",
    "Resource Needs",
    "Family Stressors",
];

const ACTION_STEP_OPTIONS: &[&str] = &[
    "Made Referrals",
    "Scheduled a Meeting",
    "Followed Up with Provider",
    "Provided Resources",
    "Updated IFSP",
    "Coordinated Services",
    "Addressed Concerns",
    "Provided Information",
];

const FOLLOW_UP_OPTIONS: &[&str] = &[
    "Update IFSP",
    "Check Back with Family",
    "Coordinate Transition",
    "Schedule Evaluation",
    "Contact Provider",
    "Send Resources",
    "Schedule Next Meeting",
    "No Follow-up Needed",
];

fn group(label: &str, options: &[&str]) -> CheckboxGroup {
    CheckboxGroup {
        label: label.to_string(),
        required: true,
        options: options.iter().map(|o| o.to_string()).collect(),
    }
}

/// The multi-select groups shown on the note form
pub fn checkbox_groups() -> CheckboxGroups {
    CheckboxGroups {
        contact_purpose: group("Purpose of the Contact", CONTACT_PURPOSE_OPTIONS),
        services_discussed: group("Services or Concerns Discussed", SERVICES_DISCUSSED_OPTIONS),
        family_input: group("Family Input/Concerns", FAMILY_INPUT_OPTIONS),
        action_steps: group("Action Steps Taken", ACTION_STEP_OPTIONS),
        follow_up_needed: group("Follow-Up Needed", FOLLOW_UP_OPTIONS),
    }
}

/// First missing required field on the note form.
///
/// The display text is shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoteValidationError {
    #[error("Please enter the child's name")]
    MissingChildName,
    #[error("Please select the session date")]
    MissingSessionDate,
    #[error("Please select the location of session")]
    MissingSessionLocation,
    #[error("Please select the type of contact")]
    MissingContactType,
    #[error("Please select at least one purpose of the contact")]
    MissingContactPurpose,
    #[error("Please select at least one service or concern discussed")]
    MissingServicesDiscussed,
    #[error("Please select at least one family input/concern")]
    MissingFamilyInput,
    #[error("Please select at least one action step taken")]
    MissingActionSteps,
    #[error("Please select at least one follow-up needed")]
    MissingFollowUp,
    /// Free-form prompt sent to the assistant was empty
    #[error("Please enter a message")]
    MissingMessage,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn has_selection(values: &[String]) -> bool {
    values.iter().any(|v| !is_blank(v))
}

/// Check required fields in form order, reporting the first one missing
pub fn validate_note_input(input: &NoteInput) -> Result<(), NoteValidationError> {
    if is_blank(&input.child_name) {
        return Err(NoteValidationError::MissingChildName);
    }
    if is_blank(&input.session_date) {
        return Err(NoteValidationError::MissingSessionDate);
    }
    if is_blank(&input.session_location) {
        return Err(NoteValidationError::MissingSessionLocation);
    }
    if is_blank(&input.contact_type) {
        return Err(NoteValidationError::MissingContactType);
    }
    if !has_selection(&input.contact_purpose) {
        return Err(NoteValidationError::MissingContactPurpose);
    }
    if !has_selection(&input.services_discussed) {
        return Err(NoteValidationError::MissingServicesDiscussed);
    }
    if !has_selection(&input.family_input) {
        return Err(NoteValidationError::MissingFamilyInput);
    }
    if !has_selection(&input.action_steps) {
        return Err(NoteValidationError::MissingActionSteps);
    }
    if !has_selection(&input.follow_up_needed) {
        return Err(NoteValidationError::MissingFollowUp);
    }
    Ok(())
}

/// Lay template values over the current form values.
///
/// Text fields are only replaced when the template provides a value;
/// selections are always replaced, so a template can clear them.
pub fn apply_template_data(current: &NoteInput, data: &TemplateData) -> NoteInput {
    let mut input = current.clone();

    if !is_blank(&data.contact_type) {
        input.contact_type = data.contact_type.clone();
    }
    if !is_blank(&data.session_location) {
        input.session_location = data.session_location.clone();
    }
    if !is_blank(&data.session_duration) {
        input.session_duration = data.session_duration.clone();
    }
    if !is_blank(&data.additional_notes) {
        input.additional_notes = data.additional_notes.clone();
    }

    input.contact_purpose = data.contact_purpose.clone();
    input.services_discussed = data.services_discussed.clone();
    input.family_input = data.family_input.clone();
    input.action_steps = data.action_steps.clone();
    input.follow_up_needed = data.follow_up_needed.clone();

    input
}
