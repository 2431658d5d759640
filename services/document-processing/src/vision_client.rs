//! OCR Client
//!
//! Google Vision `DOCUMENT_TEXT_DETECTION` for rasterized diagram pages.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use exview_models::{PageText, Word};
use exview_utils::{ExviewError, ExviewResult, OcrConfig};

/// Vision API client. The API key comes from configuration, never the ambient environment.
pub struct VisionClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl VisionClient {
    pub fn new(config: &OcrConfig) -> ExviewResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Full text and word boxes for one page image.
    pub async fn detect_text(&self, image_data: &[u8]) -> ExviewResult<PageText> {
        if self.api_key.is_empty() {
            return Err(ExviewError::configuration("ocr.api_key is not set"));
        }

        let request = AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: BASE64.encode(image_data),
                },
                features: vec![Feature {
                    kind: "DOCUMENT_TEXT_DETECTION".to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExviewError::ocr(format!("Vision API returned {}: {}", status, error_text)));
        }

        let body: AnnotateResponse = response.json().await?;
        let page = page_text_from_response(body)?;
        debug!(words = page.words.len(), "OCR completed");
        Ok(page)
    }
}

/// Map a Vision response to page text. The first text annotation is the whole
/// page and is skipped; the rest are individual words.
pub fn page_text_from_response(response: AnnotateResponse) -> ExviewResult<PageText> {
    let Some(first) = response.responses.into_iter().next() else {
        warn!("Vision response contained no results");
        return Ok(PageText::empty());
    };

    if let Some(status) = first.error {
        return Err(ExviewError::ocr(format!("Vision error {}: {}", status.code, status.message)));
    }

    let full_text = first
        .full_text_annotation
        .map(|a| a.text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| PageText::NO_TEXT.to_string());

    let words = first
        .text_annotations
        .iter()
        .skip(1)
        .filter_map(|annotation| {
            let vertices = &annotation.bounding_poly.as_ref()?.vertices;
            if vertices.len() < 4 {
                return None;
            }
            let (x_min, x_max) = min_max(vertices.iter().map(|v| v.x));
            let (y_min, y_max) = min_max(vertices.iter().map(|v| v.y));
            Some(Word::from_extents(annotation.description.trim(), x_min, y_min, x_max, y_max))
        })
        .collect();

    Ok(PageText { full_text, words })
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
struct AnnotateImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    full_text_annotation: Option<FullTextAnnotation>,
    #[serde(default)]
    text_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    error: Option<RpcStatus>,
}

#[derive(Debug, Deserialize)]
struct FullTextAnnotation {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityAnnotation {
    #[serde(default)]
    description: String,
    #[serde(default)]
    bounding_poly: Option<BoundingPoly>,
}

#[derive(Debug, Deserialize)]
struct BoundingPoly {
    #[serde(default)]
    vertices: Vec<Vertex>,
}

/// Vision omits zero coordinates.
#[derive(Debug, Deserialize)]
struct Vertex {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
}

#[derive(Debug, Deserialize)]
struct RpcStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}
