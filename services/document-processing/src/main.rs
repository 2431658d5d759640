//! Exview Document Processing Service
//!
//! BOM extraction from parts-list pages and part reference linking for
//! exploded-view diagrams.

use anyhow::Result;
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use exview_models::{BomRow, CandidateBox, PageNumber, PageText, Word};
use exview_utils::{
    init_logging, parse_page_range, validate_file_size, validate_file_type, validate_models, AppConfig,
    ErrorResponse, ExtractedTable, ExviewError, ExviewResult, ServerConfig,
};

mod service;
mod table_client;
mod vision_client;

use service::{BomReport, LinkRun, LinkingService, PageImage};

const IMAGE_TYPES: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff"];

#[derive(Clone)]
struct AppState {
    service: LinkingService,
    max_upload_bytes: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;
    config.validate()?;

    info!("Starting Exview Document Processing Service");

    let state = AppState {
        service: LinkingService::from_config(&config)?,
        max_upload_bytes: config.server.max_request_size as u64,
    };
    let app = build_router(state, &config.server);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = TcpListener::bind(&addr).await?;
    info!("Document Processing Service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/manufacturers", get(list_manufacturers))
        .route("/api/v1/bom/parse", post(parse_bom))
        .route("/api/v1/bom/extract", post(extract_bom))
        .route("/api/v1/diagrams/ocr", post(ocr_diagram))
        .route("/api/v1/diagrams/boxes", post(extract_boxes))
        .route("/api/v1/link", post(link_parts))
        .layer(DefaultBodyLimit::max(server.max_request_size))
        .layer(TimeoutLayer::new(Duration::from_secs(server.timeout_seconds)))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Service errors rendered as `ErrorResponse` bodies.
struct ApiError(ExviewError);

impl From<ExviewError> for ApiError {
    fn from(error: ExviewError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "document-processing",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[derive(Debug, Serialize)]
struct ManufacturersResponse {
    manufacturers: Vec<String>,
}

async fn list_manufacturers(State(state): State<AppState>) -> Json<ManufacturersResponse> {
    Json(ManufacturersResponse {
        manufacturers: state.service.manufacturers(),
    })
}

#[derive(Debug, Deserialize)]
struct ParseBomRequest {
    manufacturer: String,
    #[serde(default)]
    tables: Vec<ExtractedTable>,
}

async fn parse_bom(
    State(state): State<AppState>,
    Json(request): Json<ParseBomRequest>,
) -> Result<Json<BomReport>, ApiError> {
    Ok(Json(state.service.parse_bom(&request.manufacturer, &request.tables)?))
}

/// Multipart form: `manufacturer`, optional `pages` selection such as `"1,3-4"`,
/// and one image per page in upload order.
async fn extract_bom(State(state): State<AppState>, multipart: Multipart) -> Result<Json<BomReport>, ApiError> {
    let mut upload = read_upload(multipart, state.max_upload_bytes).await?;

    let manufacturer = upload
        .fields
        .remove("manufacturer")
        .ok_or_else(|| ExviewError::validation("manufacturer", "manufacturer field is required"))?;
    if upload.files.is_empty() {
        return Err(ExviewError::validation("files", "at least one page image is required").into());
    }

    let total = upload.files.len() as PageNumber;
    let selected: Vec<PageNumber> = match upload.fields.get("pages") {
        Some(selection) => parse_page_range(selection, total),
        None => (1..=total).collect(),
    };
    if selected.is_empty() {
        return Err(ExviewError::validation("pages", "selection matches none of the uploaded pages").into());
    }

    let pages = upload
        .files
        .into_iter()
        .zip(1..)
        .filter(|(_, page)| selected.contains(page))
        .map(|((file_name, data), page)| PageImage { page, file_name, data })
        .collect();

    Ok(Json(state.service.extract_bom(&manufacturer, pages).await?))
}

async fn ocr_diagram(State(state): State<AppState>, multipart: Multipart) -> Result<Json<PageText>, ApiError> {
    let upload = read_upload(multipart, state.max_upload_bytes).await?;
    let (_, data) = upload
        .files
        .into_iter()
        .next()
        .ok_or_else(|| ExviewError::validation("image", "no image provided"))?;

    Ok(Json(state.service.ocr_page(&data).await?))
}

#[derive(Debug, Deserialize)]
struct BoxesRequest {
    words: Vec<Word>,
    #[serde(default)]
    bom: Vec<BomRow>,
}

async fn extract_boxes(
    State(state): State<AppState>,
    Json(request): Json<BoxesRequest>,
) -> Result<Json<Vec<CandidateBox>>, ApiError> {
    validate_models(&request.bom)?;
    Ok(Json(state.service.extract_boxes(&request.words, &request.bom)))
}

#[derive(Debug, Deserialize)]
struct LinkRequest {
    pages: BTreeMap<PageNumber, Vec<Word>>,
    #[serde(default)]
    bom: Vec<BomRow>,
}

async fn link_parts(
    State(state): State<AppState>,
    Json(request): Json<LinkRequest>,
) -> Result<Json<LinkRun>, ApiError> {
    validate_models(&request.bom)?;
    Ok(Json(state.service.link(request.pages, request.bom).await?))
}

#[derive(Default)]
struct Upload {
    fields: HashMap<String, String>,
    files: Vec<(String, Vec<u8>)>,
}

async fn read_upload(mut multipart: Multipart, max_upload_bytes: u64) -> ExviewResult<Upload> {
    let mut upload = Upload::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                validate_file_type(&file_name, IMAGE_TYPES)?;
                let data = field.bytes().await.map_err(multipart_error)?;
                validate_file_size(data.len() as u64, max_upload_bytes)?;
                upload.files.push((file_name, data.to_vec()));
            }
            None => {
                let value = field.text().await.map_err(multipart_error)?;
                upload.fields.insert(name, value);
            }
        }
    }

    Ok(upload)
}

fn multipart_error(error: MultipartError) -> ExviewError {
    ExviewError::validation("multipart", error.to_string())
}
