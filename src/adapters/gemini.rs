use crate::domain::model::{ImageUpload, PricingTable};
use crate::domain::ports::{ConfigProvider, PriceExtractor};
use crate::utils::error::{QuoterError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const EXTRACTION_PROMPT: &str = "\
La imagen muestra la tabla de precios de los planes de salud.
Tomá solamente la columna \"Individual\" de cada plan (Plan 200, Plan 300, Plan 400 y Plan 500) \
y devolvé el precio de cada rango de edad.
Respondé con un objeto JSON que respete el esquema indicado: las claves principales son los \
números de plan como texto ('200', '300', '400', '500') y cada plan tiene las claves de rango \
de edad '01-29', '30-39', '40-49' y '50-59'.
Los valores son números: quitá el símbolo de moneda y los separadores de miles.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blob {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    pub response_mime_type: String,
    #[serde(rename = "responseSchema")]
    pub response_schema: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

/// Response schema: four plans, each with the four age brackets as numbers.
pub fn pricing_schema() -> serde_json::Value {
    let brackets = serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "01-29": { "type": "NUMBER" },
            "30-39": { "type": "NUMBER" },
            "40-49": { "type": "NUMBER" },
            "50-59": { "type": "NUMBER" }
        }
    });

    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "200": brackets.clone(),
            "300": brackets.clone(),
            "400": brackets.clone(),
            "500": brackets
        }
    })
}

pub fn build_request(image: &ImageUpload) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts: vec![
                Part::InlineData {
                    inline_data: Blob {
                        mime_type: image.mime.as_str().to_string(),
                        data: general_purpose::STANDARD.encode(&image.bytes),
                    },
                },
                Part::Text {
                    text: EXTRACTION_PROMPT.to_string(),
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: pricing_schema(),
        },
    }
}

/// Removes a surrounding Markdown code fence, if the model added one.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Reads the pricing table out of a generateContent response.
pub fn parse_response(response: &GenerateContentResponse) -> Result<PricingTable> {
    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| QuoterError::MalformedResponse {
            message: "response has no candidates".to_string(),
        })?;

    let text: String = candidate
        .content
        .iter()
        .flat_map(|content| content.parts.iter())
        .filter_map(|part| match part {
            Part::Text { text } => Some(text.as_str()),
            Part::InlineData { .. } => None,
        })
        .collect();

    if text.trim().is_empty() {
        return Err(QuoterError::MalformedResponse {
            message: format!(
                "candidate has no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ),
        });
    }

    let table = serde_json::from_str::<PricingTable>(strip_code_fence(&text))?;
    Ok(table)
}

/// Extractor backed by the Gemini generateContent API.
pub struct GeminiExtractor<C: ConfigProvider> {
    config: C,
    client: Client,
}

impl<C: ConfigProvider> GeminiExtractor<C> {
    pub fn new(config: C) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    async fn request_table(&self, image: &ImageUpload) -> Result<PricingTable> {
        let api_key = self
            .config
            .api_key()
            .ok_or_else(|| QuoterError::MissingConfigError {
                field: "extractor.api_key".to_string(),
            })?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_endpoint().trim_end_matches('/'),
            self.config.model()
        );
        tracing::debug!("Making extraction request to: {}", url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .timeout(Duration::from_secs(self.config.timeout_seconds()))
            .query(&[("key", api_key)])
            .json(&build_request(image))
            .send()
            .await?;

        tracing::debug!("Extraction response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(QuoterError::UpstreamError { status, message });
        }

        let body: GenerateContentResponse = response.json().await?;
        parse_response(&body)
    }
}

#[async_trait]
impl<C: ConfigProvider> PriceExtractor for GeminiExtractor<C> {
    async fn extract(&self, image: &ImageUpload) -> Result<PricingTable> {
        self.request_table(image).await.map_err(|e| {
            tracing::error!("Error processing image with Gemini API: {}", e);
            QuoterError::extraction_failed(e)
        })
    }
}
