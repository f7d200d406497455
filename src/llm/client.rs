use base64::Engine as _;

use crate::errors::{GhosthandError, GhosthandResult};
use crate::llm::types::Decision;
use crate::perception::screenshot::Frame;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MODEL: &str = "gemini-2.0-flash-exp";

/// Decision capability consumed by the agent loop. Implementations must be
/// total: every failure mode degrades to a `WAIT` decision instead of an
/// error, so one bad model reply never kills the loop.
pub trait DecisionSource {
    fn decide(&self, instruction: &str, history: &[String], frame: &Frame) -> Decision;
}

pub struct GeminiClient {
    api_base: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_api_base(DEFAULT_API_BASE.to_string(), api_key)
    }

    pub fn with_api_base(api_base: String, api_key: String) -> Self {
        Self {
            api_base,
            api_key,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn request(
        &self,
        instruction: &str,
        history: &[String],
        frame: &Frame,
    ) -> GhosthandResult<Decision> {
        let system_prompt = format!(
            "You are a Human-Computer Interaction agent controlling a {}x{} desktop.\n\
             RETURN JSON ONLY.\n\
             Format: {{ \"reasoning\": \"str\", \"action\": \"CLICK\"|\"TYPE\"|\"SCROLL\"|\"DONE\", \
             \"coordinates\": [x, y], \"text\": \"str\", \"scroll_amount\": int }}",
            frame.width, frame.height
        );
        let task = format!("Task: {instruction}\nHistory: {history:?}");
        let image_b64 = base64::engine::general_purpose::STANDARD.encode(&frame.jpeg);

        let body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": system_prompt },
                    { "text": task },
                    { "inline_data": { "mime_type": "image/jpeg", "data": image_b64 } },
                ],
            }],
            "generationConfig": { "responseMimeType": "application/json" },
        });

        tracing::debug!(
            model = MODEL,
            history = history.len(),
            image_bytes = frame.jpeg.len(),
            "sending decision request"
        );

        let response = self
            .client
            .post(format!("{}/{}:generateContent", self.api_base, MODEL))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let err_body = response.text().unwrap_or_default();
            return Err(GhosthandError::Model(format!("{status}: {err_body}")));
        }

        let json: serde_json::Value = response.json()?;
        let text = json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| GhosthandError::Model("no text in model reply".into()))?;

        parse_reply(text)
    }
}

/// Parse the model's textual reply into a `Decision`, tolerating markdown
/// code fences around the JSON document.
pub(crate) fn parse_reply(text: &str) -> GhosthandResult<Decision> {
    let cleaned = text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    Ok(serde_json::from_str(cleaned)?)
}

impl DecisionSource for GeminiClient {
    fn decide(&self, instruction: &str, history: &[String], frame: &Frame) -> Decision {
        match self.request(instruction, history, frame) {
            Ok(decision) => {
                tracing::info!(
                    action = %decision.action,
                    reasoning = %decision.reasoning,
                    "decision received"
                );
                decision
            }
            Err(e) => {
                tracing::warn!(error = %e, "model call failed, degrading to WAIT");
                Decision::wait(format!("Error: {e}"))
            }
        }
    }
}
