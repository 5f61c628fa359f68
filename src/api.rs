//! REST API for the pallet calculator.
//!
//! Provides HTTP endpoints for the embedded web UI and other clients.
//! Uses Axum as the web framework and supports CORS.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Router,
    http::{StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use jiff::Timestamp;
use log::{debug, error, info};
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use std::sync::OnceLock;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use utoipa::{OpenApi, ToSchema};

use crate::calculator::{CalcEvent, PalletPlan, calculate, calculate_with_progress};
use crate::config::{ApiConfig, CalculatorConfig};
use crate::export::{ExportDocument, ExportedInput};
use crate::layout::LayoutSummary;
use crate::model::{BoxDimensions, FluteProfile, PalletFootprint, PalletPreset, ValidationError};

#[derive(Clone)]
struct ApiState {
    calculator_config: CalculatorConfig,
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

// SRI hashes verified against https://unpkg.com/swagger-ui-dist@5.17.14/ on 2025-10-29.
const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>pallet-calc API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-standalone-preset.js"
            integrity="sha384-2YH8WDRaj7V2OqU/trsmzSagmk/E2SutiCsGkdgoQwC9pNUJV1u/141DHB6jgs8t"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                const ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                    presets: [SwaggerUIBundle.presets.apis, SwaggerUIStandalonePreset],
                    layout: "StandaloneLayout",
                });
                window.ui = ui;
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Embedded Web Assets (HTML, CSS, JS)
#[derive(RustEmbed)]
#[folder = "web/"]
struct WebAssets;

/// Request structure shared by the calculation endpoints.
///
/// `pallet` selects a preset; without it the configured footprint is used.
#[derive(Deserialize, Clone, ToSchema)]
#[schema(
    example = json!({
        "length": 400.0,
        "width": 300.0,
        "height": 200.0,
        "flute": "BAF",
        "pallet": "tolerance"
    })
)]
pub struct CalculateRequest {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub flute: FluteProfile,
    #[serde(default)]
    #[schema(nullable = true)]
    pub pallet: Option<PalletPreset>,
}

#[derive(Debug)]
struct ValidatedCalculateRequest {
    dimensions: BoxDimensions,
    flute: FluteProfile,
    footprint: PalletFootprint,
}

impl ValidatedCalculateRequest {
    fn into_parts(self) -> (BoxDimensions, FluteProfile, PalletFootprint) {
        (self.dimensions, self.flute, self.footprint)
    }
}

impl CalculateRequest {
    fn into_validated(
        self,
        config: &CalculatorConfig,
    ) -> Result<ValidatedCalculateRequest, ValidationError> {
        let dimensions = config.box_dimensions(self.length, self.width, self.height)?;
        let footprint = self
            .pallet
            .map(PalletPreset::footprint)
            .unwrap_or_else(|| config.footprint());
        Ok(ValidatedCalculateRequest {
            dimensions,
            flute: self.flute,
            footprint,
        })
    }
}

/// Response structure with all candidate layouts and the selected one.
///
/// # Fields
/// * `candidates` - All eight layouts in table order
/// * `best_index` - Position of `best` within `candidates`
/// * `total_pieces` - `best.bundle_count * pieces_per_bundle`
#[derive(Serialize, ToSchema)]
pub struct CalculateResponse {
    pub input: ExportedInput,
    pub footprint: PalletFootprint,
    pub candidates: Vec<LayoutSummary>,
    pub best_index: usize,
    pub best: LayoutSummary,
    pub bundle_count: u64,
    pub layers_per_bundle: u64,
    pub pieces_per_layer: u64,
    pub pieces_per_bundle: u64,
    pub total_pieces: u64,
}

impl CalculateResponse {
    /// Creates a CalculateResponse from a PalletPlan.
    pub fn from_plan(plan: &PalletPlan) -> Self {
        Self {
            input: ExportedInput {
                length: plan.dimensions.length(),
                width: plan.dimensions.width(),
                height: plan.dimensions.height(),
                flute: plan.flute,
            },
            footprint: plan.footprint,
            candidates: plan.candidates.iter().map(LayoutSummary::from).collect(),
            best_index: plan.best_index,
            best: LayoutSummary::from(plan.best()),
            bundle_count: plan.bundle_count(),
            layers_per_bundle: plan.flute.layers_per_bundle(),
            pieces_per_layer: plan.flute.pieces_per_layer(),
            pieces_per_bundle: plan.pieces_per_bundle,
            total_pieces: plan.total_pieces,
        }
    }
}

/// Bundle make-up of one flute profile.
#[derive(Serialize, ToSchema)]
pub struct FluteInfo {
    pub name: FluteProfile,
    pub layers_per_bundle: u64,
    pub pieces_per_layer: u64,
    pub pieces_per_bundle: u64,
}

/// Dimensions of one pallet preset.
#[derive(Serialize, ToSchema)]
pub struct PalletInfo {
    pub name: PalletPreset,
    pub length: f64,
    pub width: f64,
}

/// Reference data for input forms.
#[derive(Serialize, ToSchema)]
pub struct ProfilesResponse {
    pub flutes: Vec<FluteInfo>,
    pub pallets: Vec<PalletInfo>,
    pub default_footprint: PalletFootprint,
    pub max_dimension: f64,
}

impl ProfilesResponse {
    fn from_config(config: &CalculatorConfig) -> Self {
        Self {
            flutes: FluteProfile::all()
                .into_iter()
                .map(|flute| FluteInfo {
                    name: flute,
                    layers_per_bundle: flute.layers_per_bundle(),
                    pieces_per_layer: flute.pieces_per_layer(),
                    pieces_per_bundle: flute.pieces_per_bundle(),
                })
                .collect(),
            pallets: PalletPreset::all()
                .into_iter()
                .map(|preset| {
                    let footprint = preset.footprint();
                    PalletInfo {
                        name: preset,
                        length: footprint.length(),
                        width: footprint.width(),
                    }
                })
                .collect(),
            default_footprint: config.footprint(),
            max_dimension: config.max_dimension(),
        }
    }
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    details: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    details: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(error, details))).into_response()
}

fn json_deserialize_error(err: JsonRejection) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid JSON data",
        err.to_string(),
    )
}

fn validation_error(details: impl Into<String>) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid input data",
        details,
    )
}

fn parse_calculate_request(
    payload: Result<Json<CalculateRequest>, JsonRejection>,
    config: &CalculatorConfig,
) -> Result<ValidatedCalculateRequest, Response> {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(err) => return Err(json_deserialize_error(err)),
    };

    payload.into_validated(config).map_err(|err| {
        debug!("rejected calculation input: {err}");
        validation_error(err.to_string())
    })
}

#[derive(OpenApi)]
#[openapi(
    paths(handle_calculate, handle_calculate_stream, handle_export, handle_profiles),
    components(
        schemas(
            CalculateRequest,
            CalculateResponse,
            ProfilesResponse,
            FluteInfo,
            PalletInfo,
            ErrorResponse,
            ExportDocument,
            ExportedInput,
            LayoutSummary,
            PalletFootprint,
            PalletPreset,
            FluteProfile,
            CalcEvent
        )
    ),
    tags((name = "calculation", description = "Endpoints for pallet loading calculation"))
)]
struct ApiDoc;

fn build_router(calculator_config: CalculatorConfig, stream_enabled: bool) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let state = ApiState { calculator_config };

    let mut app = Router::new()
        // API endpoints
        .route("/calculate", post(handle_calculate))
        .route("/export", post(handle_export))
        .route("/profiles", get(handle_profiles));
    if stream_enabled {
        app = app.route("/calculate_stream", post(handle_calculate_stream));
    }

    app
        // API documentation
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        // Web-UI (embedded)
        .route("/", get(serve_index))
        .route("/{*path}", get(serve_static))
        .layer(cors)
        .with_state(state)
}

/// Starts the API server.
///
/// Configures CORS for cross-origin requests from the frontend.
/// Blocks until the server is terminated.
pub async fn start_api_server(
    config: ApiConfig,
    calculator_config: CalculatorConfig,
) -> std::io::Result<()> {
    let footprint = calculator_config.footprint();
    let app = build_router(calculator_config, config.stream_enabled());

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let display_host = config.display_host().to_string();
    info!(
        "🚀 Server running on http://{}:{}",
        display_host,
        config.port()
    );
    if config.binds_to_all_interfaces() && config.uses_default_host() {
        info!("💡 Local access: http://localhost:{}", config.port());
    }
    info!(
        "📐 Default pallet footprint: {} x {} mm",
        footprint.length(),
        footprint.width()
    );
    info!("📦 API Endpoints:");
    info!("   - POST /calculate");
    if config.stream_enabled() {
        info!("   - POST /calculate_stream");
    }
    info!("   - POST /export");
    info!("   - GET /profiles");
    info!("📑 Documentation:");
    info!("   - GET /docs");
    info!("   - GET /docs/openapi.json");
    info!("🌐 Web-UI: http://{}:{}", display_host, config.port());

    axum::serve(listener, app).await
}

/// Handler for POST /calculate endpoint.
///
/// Evaluates all orientation combos for the box and returns them together
/// with the selected layout and piece totals.
#[utoipa::path(
    post,
    path = "/calculate",
    request_body = CalculateRequest,
    responses(
        (status = 200, description = "Calculated pallet plan", body = CalculateResponse),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid box dimensions or request body",
            body = ErrorResponse
        )
    ),
    tag = "calculation"
)]
async fn handle_calculate(
    State(state): State<ApiState>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Response {
    let request = match parse_calculate_request(payload, &state.calculator_config) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let (dimensions, flute, footprint) = request.into_parts();
    info!(
        "📥 New calculation: {} x {} x {} mm, flute {}",
        dimensions.length(),
        dimensions.width(),
        dimensions.height(),
        flute.name()
    );
    let plan = calculate(dimensions, flute, footprint);
    info!(
        "📦 Result: combo {} ({}), {} bundles, {} pieces",
        plan.best().combo.index,
        plan.best().combo.label(),
        plan.bundle_count(),
        plan.total_pieces
    );

    (StatusCode::OK, Json(CalculateResponse::from_plan(&plan))).into_response()
}

/// Handler for POST /calculate_stream endpoint (SSE).
///
/// Streams calculation events as Server-Sent Events (text/event-stream).
#[utoipa::path(
    post,
    path = "/calculate_stream",
    request_body = CalculateRequest,
    responses(
        (
            status = 200,
            description = "Streams calculation events",
            content_type = "text/event-stream",
            body = CalcEvent
        ),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid box dimensions or request body",
            body = ErrorResponse
        )
    ),
    tag = "calculation"
)]
async fn handle_calculate_stream(
    State(state): State<ApiState>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Response {
    let request = match parse_calculate_request(payload, &state.calculator_config) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let (dimensions, flute, footprint) = request.into_parts();
    let (tx, rx) = mpsc::channel::<String>(32);

    tokio::task::spawn_blocking(move || {
        let _ = calculate_with_progress(dimensions, flute, footprint, |evt| {
            if let Ok(json) = serde_json::to_string(evt) {
                // Receiver may already be gone; remaining events are discarded.
                let _ = tx.blocking_send(json);
            }
        });
    });

    let stream = ReceiverStream::new(rx)
        .map(|msg| Ok::<_, std::convert::Infallible>(Event::default().data(msg)));
    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(std::time::Duration::from_secs(10))
                .text("keep-alive"),
        )
        .into_response()
}

/// Handler for POST /export endpoint.
///
/// Runs the calculation and returns the export document as a file download.
#[utoipa::path(
    post,
    path = "/export",
    request_body = CalculateRequest,
    responses(
        (
            status = 200,
            description = "Export document as attachment",
            content_type = "application/json",
            body = ExportDocument
        ),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid box dimensions or request body",
            body = ErrorResponse
        )
    ),
    tag = "calculation"
)]
async fn handle_export(
    State(state): State<ApiState>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Response {
    let request = match parse_calculate_request(payload, &state.calculator_config) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let (dimensions, flute, footprint) = request.into_parts();
    let plan = calculate(dimensions, flute, footprint);
    let document = ExportDocument::from_plan(&plan, Timestamp::now());

    match document.to_json_pretty() {
        Ok(body) => {
            let file_name = document.file_name();
            info!("💾 Export {} ({} pieces)", file_name, document.total_pieces);
            (
                [
                    (header::CONTENT_TYPE, "application/json".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", file_name),
                    ),
                ],
                body,
            )
                .into_response()
        }
        Err(err) => {
            error!("❌ Export failed: {err}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Export failed",
                err.to_string(),
            )
        }
    }
}

/// Handler for GET /profiles endpoint.
#[utoipa::path(
    get,
    path = "/profiles",
    responses(
        (status = 200, description = "Flute profiles and pallet presets", body = ProfilesResponse)
    ),
    tag = "calculation"
)]
async fn handle_profiles(State(state): State<ApiState>) -> Json<ProfilesResponse> {
    Json(ProfilesResponse::from_config(&state.calculator_config))
}

/// Serves the index.html main page
async fn serve_index() -> Response {
    match WebAssets::get("index.html") {
        Some(content) => Html(content.data).into_response(),
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

/// Serves static assets (JS, CSS, etc.)
async fn serve_static(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    match WebAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref())], content.data).into_response()
        }
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

async fn serve_openapi_json() -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}
