use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse, InlineData, Part};
use crate::ai::PoemService;
use crate::models::{CanonicalImage, PoemRequest, PoemResponse};
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    response_mime_type: String,
}

pub struct GeminiPoemClient {
    http: GeminiHttpClient,
}

impl GeminiPoemClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, model, timeout, reqwest::Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, model, timeout, client),
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }
}

#[async_trait]
impl PoemService for GeminiPoemClient {
    async fn generate_poem(&self, request: &PoemRequest) -> Result<PoemResponse> {
        // Local schema validation happens before any network traffic.
        let image = CanonicalImage::from_data_uri(&request.photo_data_uri)
            .map_err(|e| Error::Generation(format!("Invalid photo payload: {}", e)))?;

        tracing::debug!(
            "Generating poem for {} payload ({} base64 chars)",
            image.mime_type,
            image.base64_body.len()
        );

        let request = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part::Text {
                    text: prompts::POEM_SYSTEM.to_string(),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type,
                            data: image.base64_body,
                        },
                    },
                    Part::Text {
                        text: prompts::POEM_USER.to_string(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: 1024,
                response_mime_type: "application/json".to_string(),
            },
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        let text = response
            .candidates
            .first()
            .and_then(|c| {
                c.content.parts.iter().find_map(|p| match p {
                    Part::Text { text } => Some(text.clone()),
                    _ => None,
                })
            })
            .ok_or_else(|| Error::Generation("No text in model response".to_string()))?;

        let poem: PoemResponse = serde_json::from_str(&text).map_err(|e| {
            Error::Generation(format!("Model response failed schema validation: {}", e))
        })?;

        if poem.poem.is_empty() {
            return Err(Error::Generation(
                "Model returned an empty poem".to_string(),
            ));
        }

        tracing::info!("Generated poem ({} chars)", poem.poem.len());

        Ok(poem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "gemini-2.5-flash";

    fn make_client(server: &MockServer) -> GeminiPoemClient {
        GeminiPoemClient::new(
            "test-key".to_string(),
            DEFAULT_MODEL.to_string(),
            Duration::from_secs(5),
        )
        .with_base_url(server.uri())
    }

    fn poem_request() -> PoemRequest {
        PoemRequest {
            photo_data_uri: "data:image/png;base64,iVBORw0KGgo=".to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_poem_parses_json_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(r"/v1beta/models/.+:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "parts": [{ "text": "{\"poem\": \"Soft light on still water\"}" }]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let response = make_client(&server)
            .generate_poem(&poem_request())
            .await
            .unwrap();
        assert_eq!(response.poem, "Soft light on still water");
    }

    #[tokio::test]
    async fn test_request_embeds_image_as_inline_data() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(r"/v1beta/models/.+:generateContent"))
            .and(body_string_contains("\"inlineData\""))
            .and(body_string_contains("\"mimeType\":\"image/png\""))
            .and(body_string_contains("iVBORw0KGgo="))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "{\"poem\": \"ok\"}" }] }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        make_client(&server)
            .generate_poem(&poem_request())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_malformed_data_uri_fails_without_a_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let request = PoemRequest {
            photo_data_uri: "http://example.com/cat.png".to_string(),
        };
        let err = make_client(&server).generate_poem(&request).await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[tokio::test]
    async fn test_empty_poem_is_a_hard_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(r"/v1beta/models/.+:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "{\"poem\": \"\"}" }] }
                }]
            })))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .generate_poem(&poem_request())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
        assert!(err.to_string().contains("empty poem"));
    }

    #[tokio::test]
    async fn test_missing_poem_field_fails_schema_validation() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(r"/v1beta/models/.+:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "{\"verse\": \"wrong field\"}" }] }
                }]
            })))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .generate_poem(&poem_request())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
        assert!(err.to_string().contains("schema"));
    }

    #[tokio::test]
    async fn test_api_error_returns_generation_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(r"/v1beta/models/.+:generateContent"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .generate_poem(&poem_request())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
        assert!(err.to_string().contains("429"));
    }
}
