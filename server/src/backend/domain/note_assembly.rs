//! Builds the markdown service coordination note from form values.
//!
//! Assembly is a pure function of the [`NoteInput`]: the same input always
//! produces the same text. The labels written here are the ones the section
//! extractor in `note_sections` looks for.

use shared::NoteInput;

use crate::backend::domain::models::note::DEFAULT_SESSION_DURATION;

pub const NOTE_TITLE: &str = "Service Coordination Note";

/// Appended to locally assembled notes so they are not mistaken for AI output
pub const SAMPLE_NOTE_FOOTER: &str = "This note was generated as a sample response.";

/// Fixed instruction sent with every text-generation request
pub const SERVICE_COORDINATION_INSTRUCTION: &str = "Create a professional early intervention service coordination note using markdown formatting with ** for headings and important terms. Include these sections: **Service Coordination Note**, **Child's Name**, **Session Date**, **Session Duration** (if provided), **Location of Session**, **Type of Contact**, **Purpose of Contact**, **Services/Concerns Discussed**, **Family Input/Concerns**, **Action Steps Taken**, **Follow-Up Needed**, and **Overview of Note** (This will be an overview of what was done. The goal of this section is to allow the user to copy this section with all the valid information. This section can't be more than 2 paragraphs, and should be in the first person point of view of the service coordinator). Make it sound detailed, structured, and in line with early intervention documentation standards. Use bullet points with - for lists and number items where appropriate.";

fn cleaned(values: &[String]) -> Vec<&str> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect()
}

fn inline_field(label: &str, value: &str) -> String {
    format!("**{}:** {}", label, value.trim())
}

fn list_field(label: &str, values: &[String]) -> String {
    let items: Vec<String> = cleaned(values)
        .into_iter()
        .map(|item| format!("- {}", item))
        .collect();
    format!("**{}:**\n{}", label, items.join("\n"))
}

/// First-person summary paragraph written from the selected options
pub fn overview_paragraph(input: &NoteInput) -> String {
    format!(
        "I conducted a {} with the family of {} to discuss their early intervention services. \
         We focused on {}. The family shared information about {}. I {}. For follow-up, I will {}.",
        input.contact_type.trim().to_lowercase(),
        input.child_name.trim(),
        cleaned(&input.services_discussed).join(", "),
        cleaned(&input.family_input).join(", "),
        cleaned(&input.action_steps).join(" and "),
        cleaned(&input.follow_up_needed).join(" and "),
    )
}

/// Assemble the full note. Blocks are separated by a blank line.
pub fn assemble_note(input: &NoteInput) -> String {
    let duration = match input.session_duration.trim() {
        "" => DEFAULT_SESSION_DURATION,
        duration => duration,
    };

    let mut blocks = vec![
        format!("**{}**", NOTE_TITLE),
        inline_field("Child's Name", &input.child_name),
        inline_field("Session Date", &input.session_date),
        inline_field("Session Duration", duration),
        inline_field("Location of Session", &input.session_location),
        inline_field("Type of Contact", &input.contact_type),
        list_field("Purpose of Contact", &input.contact_purpose),
        list_field("Services/Concerns Discussed", &input.services_discussed),
        list_field("Family Input/Concerns", &input.family_input),
        list_field("Action Steps Taken", &input.action_steps),
        list_field("Follow-Up Needed", &input.follow_up_needed),
        format!("**Overview of Note:**\n{}", overview_paragraph(input)),
    ];

    let notes = input.additional_notes.trim();
    if !notes.is_empty() {
        blocks.push(format!("**Additional Notes:**\n{}", notes));
    }

    blocks.join("\n\n")
}

/// Assembled note with the sample footer
pub fn sample_note(input: &NoteInput) -> String {
    format!("{}\n\n{}", assemble_note(input), SAMPLE_NOTE_FOOTER)
}

/// Prompt sent to the text generator for an AI-written note
pub fn generation_prompt(input: &NoteInput) -> String {
    format!(
        "Write a service coordination note from the following session details.\n\n{}",
        assemble_note(input)
    )
}
