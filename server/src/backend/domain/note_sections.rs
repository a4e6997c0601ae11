//! Splits a generated note back into labelled sections for display.
//!
//! This is a best-effort splitter, not a parser. A fixed, ordered list of
//! label patterns is matched against the note text; each match is cut out
//! of a running remainder, and whatever is left over becomes
//! `main_content`. Inline labels take the rest of their line; block labels
//! run until the next known `**Label:**` line or the end of the note, so
//! bold text a user typed inside a block stays in that block.

use once_cell::sync::Lazy;
use regex::Regex;
use shared::NoteSections;

use crate::backend::domain::note_assembly::SAMPLE_NOTE_FOOTER;

/// Prefix the UI uses when a generation attempt failed
pub const ERROR_NOTE_PREFIX: &str = "Error generating note:";

const BODY_MARKERS: &[&str] = &[
    "Session Note:",
    "Assessment Note:",
    "Progress Note:",
    "Consultation Note:",
    "SOAP Note:",
];

enum RuleKind {
    Inline,
    Block,
}

struct SectionRule {
    label: &'static str,
    pattern: Regex,
    kind: RuleKind,
    assign: fn(&mut NoteSections, String),
}

impl SectionRule {
    fn inline(label: &'static str, assign: fn(&mut NoteSections, String)) -> Self {
        let pattern = format!(r"\*\*(?:{}):\*\*[ \t]*([^\r\n]*)(?:\r?\n)?", label);
        Self {
            label,
            pattern: Regex::new(&pattern).expect("inline section pattern is valid"),
            kind: RuleKind::Inline,
            assign,
        }
    }

    fn block(label: &'static str, assign: fn(&mut NoteSections, String)) -> Self {
        let pattern = format!(r"(?m)^[ \t]*\*\*(?:{}):\*\*[ \t]*", label);
        Self {
            label,
            pattern: Regex::new(&pattern).expect("block section pattern is valid"),
            kind: RuleKind::Block,
            assign,
        }
    }

    /// Returns the matched span and the section value
    fn find<'a>(&self, text: &'a str, limit: usize) -> Option<(&'a str, &'a str)> {
        match self.kind {
            RuleKind::Inline => {
                let caps = self.pattern.captures(text)?;
                let span = caps.get(0)?;
                let value = caps.get(1)?;
                Some((span.as_str(), value.as_str().trim()))
            }
            RuleKind::Block => {
                let header = self.pattern.find(text)?;
                if header.start() >= limit {
                    return None;
                }
                let body_end = HEADING
                    .find_at(text, header.end())
                    .map(|m| m.start())
                    .unwrap_or(text.len())
                    .min(limit)
                    .max(header.end());
                Some((
                    &text[header.start()..body_end],
                    text[header.end()..body_end].trim(),
                ))
            }
        }
    }
}

/// Sign-off labels that also end a block
const TRAILER_LABELS: &[&str] = &["Signature", "Date", "Note"];

static HEADING: Lazy<Regex> = Lazy::new(|| {
    let labels: Vec<&str> = RULES
        .iter()
        .map(|rule| rule.label)
        .chain(TRAILER_LABELS.iter().copied())
        .collect();
    let pattern = format!(r"(?m)^[ \t]*\*\*(?:{}):\*\*", labels.join("|"));
    Regex::new(&pattern).expect("heading pattern is valid")
});

static TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*\*\*([^*\r\n]*[^*:\r\n])\*\*[ \t]*\r?$").expect("title pattern is valid")
});

static EXTRA_BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("blank line pattern is valid"));

static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-*•]|\d+[.)])\s+").expect("list marker pattern is valid"));

// Match order matters: each rule sees the original text, but its span is
// removed from the remainder in this order.
static RULES: Lazy<Vec<SectionRule>> = Lazy::new(|| {
    vec![
        SectionRule::inline("Child's Name", |s, v| s.child_name = Some(v)),
        SectionRule::inline("Session Date", |s, v| s.session_date = Some(v)),
        SectionRule::inline("Session Duration", |s, v| s.session_duration = Some(v)),
        SectionRule::inline("Location of Session", |s, v| s.location = Some(v)),
        SectionRule::inline("Type of Contact", |s, v| s.contact_type = Some(v)),
        SectionRule::inline("Therapist's Name|Provider", |s, v| s.provider = Some(v)),
        SectionRule::block("Purpose of Contact", |s, v| s.purpose = Some(v)),
        SectionRule::block("Services/Concerns Discussed", |s, v| s.services = Some(v)),
        SectionRule::block("Family Input/Concerns", |s, v| s.family_input = Some(v)),
        SectionRule::block("Action Steps Taken", |s, v| s.action_steps = Some(v)),
        SectionRule::block("Follow-Up Needed", |s, v| s.follow_up = Some(v)),
        SectionRule::block("Overview of Note", |s, v| s.overview = Some(v)),
        SectionRule::block("Additional Notes", |s, v| s.additional_notes = Some(v)),
        SectionRule::block(r"Targeted Skills/Goals[^:*\r\n]*", |s, v| s.goals = Some(v)),
        SectionRule::block("Activities or Strategies Used", |s, v| s.activities = Some(v)),
        SectionRule::block("Child's Response/Performance", |s, v| s.response = Some(v)),
        SectionRule::block(r"Caregiver Participation/Strategies[^:*\r\n]*", |s, v| {
            s.caregiver = Some(v)
        }),
        SectionRule::block(r"Next Steps[^:*\r\n]*", |s, v| s.next_steps = Some(v)),
    ]
});

fn remove_first(remainder: &mut String, span: &str) {
    if span.is_empty() {
        return;
    }
    if let Some(pos) = remainder.find(span) {
        remainder.replace_range(pos..pos + span.len(), "");
    }
}

/// Byte offset where labelled content stops; a trailing sample footer is
/// left for `main_content`
fn content_limit(text: &str) -> usize {
    text.trim_end()
        .strip_suffix(SAMPLE_NOTE_FOOTER)
        .map(|rest| rest.len())
        .unwrap_or(text.len())
}

/// Whether the text is a generation error message rather than a note
pub fn is_error_note(text: &str) -> bool {
    text.starts_with(ERROR_NOTE_PREFIX)
}

/// Segment a note into its labelled sections
pub fn extract_sections(text: &str) -> NoteSections {
    let mut sections = NoteSections::default();
    let mut remainder = text.to_string();
    let limit = content_limit(text);

    if let Some(caps) = TITLE.captures(text) {
        if let (Some(span), Some(title)) = (caps.get(0), caps.get(1)) {
            sections.title = Some(title.as_str().trim().to_string());
            remove_first(&mut remainder, span.as_str());
        }
    }

    for rule in RULES.iter() {
        if let Some((span, value)) = rule.find(text, limit) {
            if !value.is_empty() {
                (rule.assign)(&mut sections, value.to_string());
            }
            remove_first(&mut remainder, span);
        }
    }

    let rest = EXTRA_BLANK_LINES.replace_all(remainder.trim(), "\n\n");
    if !rest.is_empty() {
        sections.main_content = Some(rest.into_owned());
    }

    sections
}

/// Split a block section into its bullet or numbered items
pub fn list_items(block: &str) -> Vec<String> {
    block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| LIST_MARKER.replace(line, "").trim().to_string())
        .collect()
}

/// The text copied to the clipboard: the note body without markdown bold.
///
/// When the note has a "Session Note:"-style marker only the text after it
/// is kept, and any trailing "Additional Notes:" part is dropped.
pub fn extract_note_body(note: &str) -> String {
    let start = BODY_MARKERS
        .iter()
        .find_map(|marker| note.find(marker).map(|index| index + marker.len()));

    match start {
        Some(start) => {
            let mut body = note[start..].trim();
            if let Some(index) = body.find("Additional Notes:") {
                body = body[..index].trim();
            }
            body.replace("**", "").trim().to_string()
        }
        None => note.replace("**", ""),
    }
}
