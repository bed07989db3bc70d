use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use lighting_core::{report, CalculationRequest, Catalog, LightingPlan, Planner, PlannerError};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const OPENAPI_SPEC: &str = include_str!("../../../openapi.yaml");
const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Lighting Planner API Docs</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {
            SwaggerUIBundle({
                url: '/openapi.yaml',
                dom_id: '#swagger-ui',
                presets: [SwaggerUIBundle.presets.apis],
                layout: 'BaseLayout',
            });
        };
    </script>
</body>
</html>"#;

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Lighting Planner API");

    let catalog = load_catalog()?;
    let planner = Planner::new(catalog)?;
    let app = router(Arc::new(planner));

    let port = match std::env::var("PORT") {
        Ok(value) => value.parse()?,
        Err(_) => DEFAULT_PORT,
    };

    // Start server
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;

    info!("API server listening on http://0.0.0.0:{}", port);
    info!("Try: curl http://localhost:{}/api/health", port);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Reads the catalog named by `LIGHTING_CATALOG`, falling back to the built-in tables.
fn load_catalog() -> anyhow::Result<Catalog> {
    let Ok(path) = std::env::var("LIGHTING_CATALOG") else {
        return Ok(Catalog::default());
    };

    info!("Loading catalog from {}", path);
    let content = std::fs::read_to_string(&path)?;
    let catalog = if path.ends_with(".yaml") || path.ends_with(".yml") {
        Catalog::from_yaml_str(&content)?
    } else {
        Catalog::from_json_str(&content)?
    };
    Ok(catalog)
}

fn router(planner: Arc<Planner>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health_check))
        .route("/api/places", get(places))
        .route("/api/catalog", get(catalog))
        .route("/api/calculate", post(calculate))
        .route("/api/export/csv", post(export_csv))
        .route("/api/export/pdf", post(export_pdf))
        .route("/api/generate/svg", post(generate_svg))
        .route("/openapi.yaml", get(serve_openapi_spec))
        .route("/docs", get(serve_swagger_ui))
        .layer(CorsLayer::permissive())
        .with_state(planner)
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "status": "success",
        "message": "Welcome to the Lighting Planner API",
    }))
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "lighting-planner-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn places(State(planner): State<Arc<Planner>>) -> Json<Vec<String>> {
    Json(
        planner
            .catalog()
            .places()
            .into_iter()
            .map(str::to_string)
            .collect(),
    )
}

async fn catalog(State(planner): State<Arc<Planner>>) -> Json<Catalog> {
    Json(planner.catalog().clone())
}

/// Main planning endpoint
async fn calculate(
    State(planner): State<Arc<Planner>>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let request = json_body(payload)?;
    info!(
        "Received calculation request for '{}' ({:?}, height {} m)",
        request.place, request.sides, request.height
    );

    let plan = planner.plan(&request.place, request.sides, request.height)?;

    info!(
        "Calculation complete: {} zone, {} options",
        plan.zone,
        plan.results.len()
    );

    Ok(Json(json!({
        "status": "success",
        "project_info": request.project_info,
        "zone": plan.zone,
        "area": plan.area,
        "length": plan.length,
        "width": plan.width,
        "results": plan.results,
    })))
}

/// Plans the request and returns the results as CSV
async fn export_csv(
    State(planner): State<Arc<Planner>>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let calculation = json_body(payload)?;
    let plan = planner.plan(&calculation.place, calculation.sides, calculation.height)?;
    let csv = report::results_csv(&plan.results, &calculation.project_info)?;

    Ok((
        StatusCode::OK,
        [
            ("Content-Type", "text/csv; charset=utf-8"),
            ("Content-Disposition", "attachment; filename=\"lighting.csv\""),
        ],
        csv,
    )
        .into_response())
}

/// Plans the request and returns a paginated PDF report
async fn export_pdf(
    State(planner): State<Arc<Planner>>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let calculation = json_body(payload)?;
    let plan = planner.plan(&calculation.place, calculation.sides, calculation.height)?;
    let pdf = report::results_pdf(&plan.results, &calculation.project_info)?;

    info!("Generated PDF report with {} options", plan.results.len());

    Ok((
        StatusCode::OK,
        [
            ("Content-Type", "application/pdf"),
            ("Content-Disposition", "attachment; filename=\"report.pdf\""),
        ],
        pdf,
    )
        .into_response())
}

/// Generate SVG layout drawing from a plan
async fn generate_svg(
    State(planner): State<Arc<Planner>>,
    payload: Result<Json<LightingPlan>, JsonRejection>,
) -> Result<Response, AppError> {
    let plan = json_body(payload)?;
    info!("Generating SVG for {} options", plan.results.len());

    let svg = report::layout_svg(&plan, planner.catalog())?;

    Ok((StatusCode::OK, [("Content-Type", "image/svg+xml")], svg).into_response())
}

/// Unwraps a JSON body, reporting malformed bodies as rejected input.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| PlannerError::InvalidInput(rejection.body_text()).into())
}

/// Application error type
struct AppError(anyhow::Error);

impl From<PlannerError> for AppError {
    fn from(err: PlannerError) -> Self {
        AppError(err.into())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.0.to_string();

        let (status, kind) = match self.0.downcast_ref::<PlannerError>() {
            Some(err) if err.is_rejection() => {
                warn!("Request rejected: {}", message);
                (StatusCode::BAD_REQUEST, err.kind())
            }
            Some(err) => {
                error!("Request error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, err.kind())
            }
            None => {
                error!("Request error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };

        (
            status,
            Json(json!({
                "status": "error",
                "kind": kind,
                "message": message,
            })),
        )
            .into_response()
    }
}

async fn serve_openapi_spec() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("Content-Type", "application/yaml")],
        OPENAPI_SPEC,
    )
}

async fn serve_swagger_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(Planner::new(Catalog::default()).unwrap()))
    }

    async fn post_json(uri: &str, body: serde_json::Value) -> (StatusCode, Vec<u8>) {
        let response = app()
            .oneshot(
                Request::post(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_places_sorted() {
        let response = app()
            .oneshot(Request::get("/api/places").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let places: Vec<String> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(places.first().map(String::as_str), Some("Cafe"));
        assert_eq!(places.len(), 5);
    }

    #[tokio::test]
    async fn test_calculate_office() {
        let (status, body) = post_json(
            "/api/calculate",
            json!({
                "place": "Office",
                "sides": [10.0, 8.0, 10.0, 8.0],
                "height": 3.0,
                "project_info": { "Project Name": "HQ" }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["zone"], "interior");
        assert_eq!(value["length"], 10.0);
        assert_eq!(value["project_info"]["Project Name"], "HQ");
        assert_eq!(value["results"][0]["Luminaire"], "SC downlight");
    }

    #[tokio::test]
    async fn test_unknown_place_is_bad_request() {
        let (status, body) = post_json(
            "/api/calculate",
            json!({ "place": "Nonexistent Place", "sides": [10.0, 8.0, 10.0, 8.0], "height": 3.0 }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["kind"], "unknown_place");
    }

    #[tokio::test]
    async fn test_degenerate_room_is_bad_request() {
        let (status, body) = post_json(
            "/api/calculate",
            json!({ "place": "Office", "sides": [1.0, 1.0, 1.0, 10.0], "height": 3.0 }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["kind"], "geometry");
    }

    #[tokio::test]
    async fn test_export_csv() {
        let (status, body) = post_json(
            "/api/export/csv",
            json!({ "place": "Office", "sides": [10.0, 8.0, 10.0, 8.0], "height": 3.0 }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let csv = String::from_utf8(body).unwrap();
        assert!(csv.starts_with("Project Info"));
        assert!(csv.contains("SC triproof"));
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_envelope() {
        let (status, body) = post_json(
            "/api/calculate",
            json!({ "place": "Office", "sides": [10.0, 8.0, 10.0, 8.0], "height": "abc" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["kind"], "invalid_input");

        let (status, _) = post_json("/api/generate/svg", json!({ "results": 3 })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_oversized_svg_is_bad_request() {
        let mut plan = Planner::new(Catalog::default())
            .unwrap()
            .plan("Office", [10.0, 8.0, 10.0, 8.0], 3.0)
            .unwrap();
        plan.results[0].fixtures = u32::MAX;

        let (status, body) =
            post_json("/api/generate/svg", serde_json::to_value(&plan).unwrap()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["kind"], "invalid_input");
    }

    #[tokio::test]
    async fn test_export_pdf() {
        let (status, body) = post_json(
            "/api/export/pdf",
            json!({ "place": "Office", "sides": [10.0, 8.0, 10.0, 8.0], "height": 3.0 }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_index_route_is_documented() {
        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        for path in [
            "\n  /:\n",
            "/api/health:",
            "/api/places:",
            "/api/catalog:",
            "/api/calculate:",
            "/api/export/csv:",
            "/api/export/pdf:",
            "/api/generate/svg:",
        ] {
            assert!(OPENAPI_SPEC.contains(path), "{:?} not documented", path);
        }
    }

    #[tokio::test]
    async fn test_generate_svg_from_plan() {
        let plan = Planner::new(Catalog::default())
            .unwrap()
            .plan("Office", [10.0, 8.0, 10.0, 8.0], 3.0)
            .unwrap();

        let (status, body) = post_json("/api/generate/svg", serde_json::to_value(&plan).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        let svg = String::from_utf8(body).unwrap();
        assert!(svg.contains("<svg"));
    }
}
