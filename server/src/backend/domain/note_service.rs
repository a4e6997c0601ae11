use anyhow::Result;
use shared::{
    ApiKeyInfo, ApiKeyStatusResponse, DiagnosticStatus, GenerateNoteRequest, GenerateNoteResponse,
    NoteMode, NoteOptionsResponse, NoteSections, NoteSectionsResponse, TextGenerationCheckResponse,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::backend::clients::{TextGenerationError, TextGenerator};
use crate::backend::domain::models::note::{
    checkbox_groups, validate_note_input, NoteValidationError, CONTACT_TYPES, SESSION_LOCATIONS,
};
use crate::backend::domain::note_assembly::{
    generation_prompt, sample_note, SERVICE_COORDINATION_INSTRUCTION,
};
use crate::backend::domain::note_sections::{extract_note_body, extract_sections, is_error_note};

const DIAGNOSTIC_INSTRUCTION: &str = "You are a helpful assistant.";
const DIAGNOSTIC_PROMPT: &str = "Say hello";

/// Service for producing notes and working with generated note text
#[derive(Clone)]
pub struct NoteService {
    text_generator: Arc<dyn TextGenerator>,
}

/// Describe a key without revealing it: a short prefix, its length and a
/// masked form showing only the first and last few characters
pub fn describe_api_key(key: &str) -> ApiKeyInfo {
    let chars: Vec<char> = key.chars().collect();
    let length = chars.len();

    if length <= 11 {
        let prefix: String = chars.iter().take(3.min(length)).collect();
        return ApiKeyInfo {
            masked: format!("{}...", prefix),
            prefix,
            length,
        };
    }

    let prefix: String = chars[..7].iter().collect();
    let suffix: String = chars[length - 4..].iter().collect();
    ApiKeyInfo {
        masked: format!("{}...{}", prefix, suffix),
        prefix,
        length,
    }
}

impl NoteService {
    pub fn new(text_generator: Arc<dyn TextGenerator>) -> Self {
        Self { text_generator }
    }

    /// Validate the form values and produce a note in the requested mode
    pub async fn generate_note(&self, request: GenerateNoteRequest) -> Result<GenerateNoteResponse> {
        info!(
            "Generating {:?} note for session on {}",
            request.mode, request.input.session_date
        );
        validate_note_input(&request.input)?;

        let note = match request.mode {
            NoteMode::Sample => sample_note(&request.input),
            NoteMode::Ai => {
                let prompt = generation_prompt(&request.input);
                self.text_generator
                    .generate(SERVICE_COORDINATION_INSTRUCTION, &prompt)
                    .await
                    .map_err(|e| {
                        error!("Text generation failed: {}", e);
                        e
                    })?
            }
        };

        info!("Generated note ({} characters)", note.len());
        Ok(GenerateNoteResponse {
            note,
            mode: request.mode,
        })
    }

    /// Forward a free-form prompt with the service coordination instruction
    pub async fn ask(&self, message: &str) -> Result<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(NoteValidationError::MissingMessage.into());
        }
        let reply = self
            .text_generator
            .generate(SERVICE_COORDINATION_INSTRUCTION, message)
            .await?;
        Ok(reply)
    }

    /// Split a note into display sections. Error notes are passed through whole.
    pub fn note_sections(&self, note: &str) -> NoteSectionsResponse {
        if is_error_note(note) {
            return NoteSectionsResponse {
                is_error: true,
                sections: NoteSections {
                    main_content: Some(note.trim().to_string()),
                    ..NoteSections::default()
                },
            };
        }

        NoteSectionsResponse {
            is_error: false,
            sections: extract_sections(note),
        }
    }

    pub fn note_body(&self, note: &str) -> String {
        extract_note_body(note)
    }

    pub fn note_options(&self) -> NoteOptionsResponse {
        NoteOptionsResponse {
            locations: SESSION_LOCATIONS.iter().map(|s| s.to_string()).collect(),
            contact_types: CONTACT_TYPES.iter().map(|s| s.to_string()).collect(),
            checkbox_groups: checkbox_groups(),
        }
    }

    fn key_info(&self) -> Option<ApiKeyInfo> {
        self.text_generator
            .api_key()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(describe_api_key)
    }

    /// Report whether a text-generation key is configured, without calling out
    pub fn api_key_status(&self) -> ApiKeyStatusResponse {
        match self.key_info() {
            None => ApiKeyStatusResponse {
                status: DiagnosticStatus::Error,
                message: TextGenerationError::NotConfigured.to_string(),
                key_info: None,
            },
            Some(info) if !info.prefix.starts_with("sk-") => ApiKeyStatusResponse {
                status: DiagnosticStatus::Error,
                message: TextGenerationError::InvalidKeyFormat.to_string(),
                key_info: Some(info),
            },
            Some(info) => ApiKeyStatusResponse {
                status: DiagnosticStatus::Success,
                message: "OpenAI API key is configured".to_string(),
                key_info: Some(info),
            },
        }
    }

    /// Make a live round trip to the text-generation service
    pub async fn check_text_generation(&self) -> TextGenerationCheckResponse {
        let key_info = self.key_info();

        match self
            .text_generator
            .generate(DIAGNOSTIC_INSTRUCTION, DIAGNOSTIC_PROMPT)
            .await
        {
            Ok(reply) => TextGenerationCheckResponse {
                status: DiagnosticStatus::Success,
                message: "OpenAI API connection successful".to_string(),
                error: None,
                key_info,
                test_response: Some(reply),
            },
            Err(e) => {
                error!("OpenAI connectivity check failed: {}", e);
                TextGenerationCheckResponse {
                    status: DiagnosticStatus::Error,
                    message: "OpenAI API connection failed".to_string(),
                    error: Some(e.to_string()),
                    key_info,
                    test_response: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::note::test_support::complete_input;
    use crate::backend::domain::note_assembly::SAMPLE_NOTE_FOOTER;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns a canned reply and remembers the last prompt
    struct StubGenerator {
        key: Option<String>,
        reply: Result<String, TextGenerationError>,
        last_call: Mutex<Option<(String, String)>>,
    }

    impl StubGenerator {
        fn replying(reply: Result<String, TextGenerationError>) -> Self {
            Self {
                key: Some("sk-proj-abcdefghijklmnop".to_string()),
                reply,
                last_call: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, system: &str, prompt: &str) -> Result<String, TextGenerationError> {
            *self.last_call.lock().unwrap() = Some((system.to_string(), prompt.to_string()));
            self.reply.clone()
        }

        fn api_key(&self) -> Option<&str> {
            self.key.as_deref()
        }
    }

    fn setup_service(stub: StubGenerator) -> (NoteService, Arc<StubGenerator>) {
        let stub = Arc::new(stub);
        (NoteService::new(stub.clone()), stub)
    }

    #[tokio::test]
    async fn test_sample_note_never_calls_generator() {
        let (service, stub) = setup_service(StubGenerator::replying(Ok("unused".to_string())));

        let response = service
            .generate_note(GenerateNoteRequest { input: complete_input(), mode: NoteMode::Sample })
            .await
            .unwrap();

        assert_eq!(response.mode, NoteMode::Sample);
        assert!(response.note.starts_with("**Service Coordination Note**"));
        assert!(response.note.ends_with(SAMPLE_NOTE_FOOTER));
        assert!(stub.last_call.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ai_note_uses_instruction_and_assembled_prompt() {
        let (service, stub) = setup_service(StubGenerator::replying(Ok("**Service Coordination Note**".to_string())));

        let response = service
            .generate_note(GenerateNoteRequest { input: complete_input(), mode: NoteMode::Ai })
            .await
            .unwrap();
        assert_eq!(response.note, "**Service Coordination Note**");

        let (system, prompt) = stub.last_call.lock().unwrap().clone().expect("generator called");
        assert_eq!(system, SERVICE_COORDINATION_INSTRUCTION);
        assert!(prompt.contains("**Child's Name:** Ava Johnson"));
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected_before_generation() {
        let (service, stub) = setup_service(StubGenerator::replying(Ok("unused".to_string())));
        let mut input = complete_input();
        input.family_input.clear();

        let err = service
            .generate_note(GenerateNoteRequest { input, mode: NoteMode::Ai })
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<NoteValidationError>(),
            Some(&NoteValidationError::MissingFamilyInput)
        );
        assert!(stub.last_call.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_generator_failure_has_no_fallback() {
        let failure = TextGenerationError::Api { status: 429, message: "Rate limit reached".to_string() };
        let (service, _stub) = setup_service(StubGenerator::replying(Err(failure.clone())));

        let err = service
            .generate_note(GenerateNoteRequest { input: complete_input(), mode: NoteMode::Ai })
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<TextGenerationError>(), Some(&failure));
    }

    #[tokio::test]
    async fn test_ask_requires_message() {
        let (service, _stub) = setup_service(StubGenerator::replying(Ok("Hello".to_string())));

        let err = service.ask("   ").await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter a message");
        assert_eq!(service.ask("Hi").await.unwrap(), "Hello");
    }

    #[test]
    fn test_error_notes_are_not_segmented() {
        let (service, _stub) = setup_service(StubGenerator::replying(Ok(String::new())));

        let response = service.note_sections("Error generating note: timeout");
        assert!(response.is_error);
        assert_eq!(response.sections.main_content.as_deref(), Some("Error generating note: timeout"));
        assert_eq!(response.sections.title, None);

        let response = service.note_sections("**Service Coordination Note**\n\n**Child's Name:** Ava");
        assert!(!response.is_error);
        assert_eq!(response.sections.child_name.as_deref(), Some("Ava"));
    }

    #[test]
    fn test_note_options_catalogues() {
        let (service, _stub) = setup_service(StubGenerator::replying(Ok(String::new())));
        let options = service.note_options();
        assert_eq!(options.locations.len(), 7);
        assert_eq!(options.contact_types.len(), 6);
        assert!(options.checkbox_groups.contact_purpose.required);
    }

    #[test]
    fn test_describe_api_key_masks_middle() {
        let info = describe_api_key("sk-proj-abcdefghijklmnop");
        assert_eq!(info.prefix, "sk-proj");
        assert_eq!(info.length, 24);
        assert_eq!(info.masked, "sk-proj...mnop");

        let short = describe_api_key("sk-abc");
        assert_eq!(short.prefix, "sk-");
        assert_eq!(short.masked, "sk-...");
        assert!(!short.masked.contains("abc"));
    }

    #[test]
    fn test_api_key_status() {
        let (service, _stub) = setup_service(StubGenerator::replying(Ok(String::new())));
        let status = service.api_key_status();
        assert_eq!(status.status, DiagnosticStatus::Success);
        assert_eq!(status.key_info.map(|k| k.length), Some(24));

        let mut stub = StubGenerator::replying(Ok(String::new()));
        stub.key = None;
        let (service, _stub) = setup_service(stub);
        let status = service.api_key_status();
        assert_eq!(status.status, DiagnosticStatus::Error);
        assert_eq!(status.message, "OpenAI API key is not configured");
        assert_eq!(status.key_info, None);

        let mut stub = StubGenerator::replying(Ok(String::new()));
        stub.key = Some("pk-live-1234567890".to_string());
        let (service, _stub) = setup_service(stub);
        assert_eq!(service.api_key_status().status, DiagnosticStatus::Error);
    }

    #[tokio::test]
    async fn test_connectivity_check_reports_both_outcomes() {
        let (service, _stub) = setup_service(StubGenerator::replying(Ok("Hello!".to_string())));
        let report = service.check_text_generation().await;
        assert_eq!(report.status, DiagnosticStatus::Success);
        assert_eq!(report.test_response.as_deref(), Some("Hello!"));

        let (service, _stub) = setup_service(StubGenerator::replying(Err(TextGenerationError::NotConfigured)));
        let report = service.check_text_generation().await;
        assert_eq!(report.status, DiagnosticStatus::Error);
        assert_eq!(report.error.as_deref(), Some("OpenAI API key is not configured"));
    }
}
