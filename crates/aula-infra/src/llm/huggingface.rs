//! HuggingFaceGenerator -- [`ResponseGenerator`] backed by the HuggingFace
//! text-generation Inference API.
//!
//! The context is rendered in the Llama-3 chat template, sent as
//! `{inputs, parameters}`, and the reply is cut out of the returned
//! `generated_text`. The API token is wrapped in [`SecretString`] and only
//! exposed when building the `Authorization` header.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;

use aula_core::llm::generator::ResponseGenerator;
use aula_types::chat::ContextEntry;
use aula_types::config::InferenceConfig;
use aula_types::llm::LlmError;

const END_OF_TURN: &str = "<|eot_id|>";
const END_OF_TEXT: &str = "<|end_of_text|>";

/// Reply used when the model returns nothing usable.
pub const EMPTY_REPLY: &str = "I'm not sure how to respond to that.";

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f64,
    top_p: f64,
    do_sample: bool,
    stop: [&'static str; 2],
}

/// HuggingFace Inference API generator.
///
/// Does not derive Debug so the token never ends up in logs.
pub struct HuggingFaceGenerator {
    client: reqwest::Client,
    token: SecretString,
    config: InferenceConfig,
}

impl HuggingFaceGenerator {
    pub fn new(token: SecretString, config: InferenceConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            token,
            config,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    fn parameters(&self) -> GenerationParameters {
        GenerationParameters {
            max_new_tokens: self.config.max_new_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            do_sample: true,
            stop: [END_OF_TURN, END_OF_TEXT],
        }
    }
}

impl ResponseGenerator for HuggingFaceGenerator {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn generate(&self, context: &[ContextEntry]) -> Result<String, LlmError> {
        let prompt = format_prompt(context);
        let body = GenerationRequest {
            inputs: &prompt,
            parameters: self.parameters(),
        };

        tracing::debug!(
            endpoint = %self.config.endpoint,
            messages = context.len(),
            "Querying HuggingFace inference"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(self.token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Provider {
                        message: format!("HTTP request failed: {e}"),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_ms = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs * 1000);
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimited { retry_after_ms },
                400 | 422 => LlmError::InvalidRequest(error_body),
                _ => LlmError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        let result: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout
            } else {
                LlmError::Deserialization(format!("failed to parse response: {e}"))
            }
        })?;

        let generated = extract_generated_text(&result)?;
        let reply = clean_response(&generated, &prompt);
        Ok(if reply.is_empty() {
            EMPTY_REPLY.to_string()
        } else {
            reply
        })
    }
}

/// Render the context in the Llama-3 chat template, ending with an open
/// assistant header for the model to complete.
pub fn format_prompt(context: &[ContextEntry]) -> String {
    let mut prompt = String::new();
    for entry in context {
        let role = match entry.role.as_str() {
            "system" | "user" | "assistant" => entry.role.as_str(),
            _ => continue,
        };
        prompt.push_str("<|start_header_id|>");
        prompt.push_str(role);
        prompt.push_str("<|end_header_id|>\n");
        prompt.push_str(&entry.content);
        prompt.push_str(END_OF_TURN);
    }
    prompt.push_str("<|start_header_id|>assistant<|end_header_id|>\n");
    prompt
}

/// `generated_text` from either `[{"generated_text": ..}]` or
/// `{"generated_text": ..}`. A missing field reads as empty text.
pub fn extract_generated_text(result: &Value) -> Result<String, LlmError> {
    let object = match result {
        Value::Array(items) if !items.is_empty() => &items[0],
        Value::Object(_) => result,
        other => {
            return Err(LlmError::Deserialization(format!(
                "unexpected response format: {other}"
            )));
        }
    };

    Ok(object
        .get("generated_text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string())
}

/// Strip the echoed prompt and stop tokens from the generated text.
pub fn clean_response(generated: &str, prompt: &str) -> String {
    let reply = if generated.contains(prompt) {
        generated.replace(prompt, "")
    } else {
        generated.to_string()
    };

    reply
        .trim()
        .replace(END_OF_TURN, "")
        .replace(END_OF_TEXT, "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(role: &str, content: &str) -> ContextEntry {
        ContextEntry {
            role: role.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_generator_name() {
        let generator =
            HuggingFaceGenerator::new(SecretString::from("hf-test"), InferenceConfig::default())
                .unwrap();
        assert_eq!(generator.name(), "huggingface");
        assert!(generator.endpoint().contains("Llama-3.1-8B-Instruct"));
    }

    #[test]
    fn test_format_prompt() {
        let prompt = format_prompt(&[
            entry("system", "Welcome to Topic 2"),
            entry("user", "hello"),
            entry("assistant", "Hi!"),
            entry("user", "what now?"),
        ]);

        assert_eq!(
            prompt,
            "<|start_header_id|>system<|end_header_id|>\nWelcome to Topic 2<|eot_id|>\
             <|start_header_id|>user<|end_header_id|>\nhello<|eot_id|>\
             <|start_header_id|>assistant<|end_header_id|>\nHi!<|eot_id|>\
             <|start_header_id|>user<|end_header_id|>\nwhat now?<|eot_id|>\
             <|start_header_id|>assistant<|end_header_id|>\n"
        );
    }

    #[test]
    fn test_format_prompt_skips_unknown_roles() {
        let prompt = format_prompt(&[entry("tool", "ignored"), entry("user", "hi")]);
        assert!(!prompt.contains("ignored"));
        assert!(prompt.starts_with("<|start_header_id|>user"));
    }

    #[test]
    fn test_extract_generated_text_shapes() {
        let list = json!([{"generated_text": "from list"}]);
        let object = json!({"generated_text": "from object"});
        let missing = json!({"error": "loading"});

        assert_eq!(extract_generated_text(&list).unwrap(), "from list");
        assert_eq!(extract_generated_text(&object).unwrap(), "from object");
        assert_eq!(extract_generated_text(&missing).unwrap(), "");
        assert!(matches!(
            extract_generated_text(&json!("plain string")),
            Err(LlmError::Deserialization(_))
        ));
        assert!(extract_generated_text(&json!([])).is_err());
    }

    #[test]
    fn test_clean_response_strips_prompt_and_stop_tokens() {
        let prompt = format_prompt(&[entry("user", "hello")]);
        let generated = format!("{prompt}Hello there!<|eot_id|>");
        assert_eq!(clean_response(&generated, &prompt), "Hello there!");
    }

    #[test]
    fn test_clean_response_without_echo() {
        assert_eq!(
            clean_response("  Sure thing.<|end_of_text|>  ", "unrelated prompt"),
            "Sure thing."
        );
        assert_eq!(clean_response("<|eot_id|>", "prompt"), "");
    }

    #[test]
    fn test_request_body_shape() {
        let generator =
            HuggingFaceGenerator::new(SecretString::from("hf-test"), InferenceConfig::default())
                .unwrap();
        let body = GenerationRequest {
            inputs: "prompt",
            parameters: generator.parameters(),
        };
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["inputs"], "prompt");
        assert_eq!(value["parameters"]["max_new_tokens"], 200);
        assert_eq!(value["parameters"]["do_sample"], true);
        assert_eq!(value["parameters"]["stop"], json!(["<|eot_id|>", "<|end_of_text|>"]));
    }
}
