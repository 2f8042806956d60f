//! Text-to-point-cloud requests against the Gemini `generateContent` API.
//!
//! The model is asked for ~500 points inside a [-4, 4] box as structured JSON.
//! Densifying the reply to the particle count is left to the caller.

use std::env;

use serde::Deserialize;
use serde_json::{Value, json};
use swarm_core::{Point3, parse_point_cloud};

use crate::error::{RemoteError, Result};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const SYSTEM_INSTRUCTION: &str = "You are a 3D geometry engine. \
Your task is to generate a list of 3D coordinates (x, y, z) that form a specific shape described by the user. \
The coordinates should be normalized to fit roughly within a -4 to +4 bounding box. \
Return exactly 500 representative points. The client will interpolate more points based on these. \
Use JSON format.";

/// Resolve the API key: `GEMINI_API_KEY`, then `API_KEY`. Blank values count as unset.
pub fn api_key_from_env() -> Option<String> {
    ["GEMINI_API_KEY", "API_KEY"]
        .iter()
        .filter_map(|name| env::var(name).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct ShapeClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl ShapeClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(api_key_from_env())
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn request_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// One request, no retries. Failure affects only this request.
    pub async fn generate(&self, prompt: &str) -> Result<Vec<Point3>> {
        let api_key = self.api_key.as_deref().ok_or(RemoteError::MissingCredential)?;
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(RemoteError::EmptyPrompt);
        }

        tracing::info!("requesting point cloud from {} for {prompt:?}", self.model);
        let response = self
            .http
            .post(self.request_url())
            .header("x-goog-api-key", api_key)
            .json(&request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let points = parse_response(&body)?;
        tracing::info!("received {} points", points.len());
        Ok(points)
    }
}

/// Request payload: system instruction, user prompt and a response schema
/// pinning the reply to `{points: [{x, y, z}]}`.
pub fn request_body(prompt: &str) -> Value {
    json!({
        "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
        "contents": [{
            "role": "user",
            "parts": [{ "text": format!("Generate a 3D point cloud for a shape that looks like: {prompt}") }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "points": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "x": { "type": "NUMBER" },
                                "y": { "type": "NUMBER" },
                                "z": { "type": "NUMBER" }
                            },
                            "required": ["x", "y", "z"]
                        }
                    }
                }
            }
        }
    })
}

#[derive(Deserialize, Debug, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize, Debug)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize, Debug)]
struct Part {
    text: Option<String>,
}

/// Pull the generated text out of a `generateContent` reply and parse it as
/// a point cloud.
pub fn parse_response(body: &str) -> Result<Vec<Point3>> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(RemoteError::Malformed("no data returned".to_string()));
    }
    Ok(parse_point_cloud(&text)?)
}
