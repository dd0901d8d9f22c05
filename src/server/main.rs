//! HTTP API for the apiary siting pre-check.
//!
//! # Endpoints
//!
//! - `POST /api/analyze` - evaluate the proximity rules for a GeoJSON polygon
//! - `GET /api/parcel?id=<id>` - fetch a parcel boundary as a GeoJSON Feature
//! - `GET /api/parcel_by_coords?lat=<f>&lon=<f>` - resolve a coordinate to a
//!   parcel first, then fetch its boundary
//! - `GET /health` - liveness probe
//!
//! All error responses are `{"error": <string>}` with status 400 or 500.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pasieka::overpass::{self, OverpassClient};
use pasieka::uldk::{self, UldkClient};
use pasieka::{rules, Error};

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Apiary siting pre-check API server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8000")]
    listen: String,

    /// ULDK base URL
    #[arg(long, default_value = uldk::client::DEFAULT_URL)]
    uldk_url: String,

    /// Overpass interpreter URL
    #[arg(long, default_value = overpass::client::DEFAULT_URL)]
    overpass_url: String,
}

/// Application state shared across handlers; holds only immutable clients.
struct AppState {
    uldk: UldkClient,
    overpass: OverpassClient,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let state = Arc::new(AppState {
        uldk: UldkClient::new(&args.uldk_url)?,
        overpass: OverpassClient::new(&args.overpass_url)?,
    });

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/parcel", get(parcel_handler))
        .route("/api/parcel_by_coords", get(parcel_by_coords_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// JSON error response with explicit status code.
struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

fn bad_request(message: impl Into<String>) -> ApiError {
    ApiError(StatusCode::BAD_REQUEST, message.into())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    geometry: Option<serde_json::Value>,
}

/// Evaluate the proximity rules for a client-supplied polygon.
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let geometry = request
        .geometry
        .ok_or_else(|| bad_request("Missing geometry"))?;

    let geometry = geojson::Geometry::try_from(geometry)
        .map_err(|e| bad_request(format!("Invalid geometry: {e}")))?;
    let boundary: geo_types::Polygon<f64> = geometry
        .try_into()
        .map_err(|e| bad_request(format!("Invalid geometry: expected a polygon ({e})")))?;

    let features = state.overpass.features_around(&boundary).await?;
    let violations =
        rules::evaluate(&boundary, &features).map_err(|e| bad_request(e.to_string()))?;

    if violations.is_empty() {
        Ok(Json(json!({ "message": "All checks passed!" })))
    } else {
        let violations: Vec<String> = violations.iter().map(ToString::to_string).collect();
        Ok(Json(json!({ "violations": violations })))
    }
}

#[derive(Deserialize)]
struct ParcelQuery {
    id: Option<String>,
}

/// Fetch a parcel boundary by registry id.
async fn parcel_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ParcelQuery>,
) -> Result<Json<geojson::Feature>, ApiError> {
    let id = query.id.ok_or_else(|| bad_request("Missing id parameter"))?;

    let parcel = state.uldk.parcel_by_id(&id).await?;
    Ok(Json(parcel.to_feature()))
}

#[derive(Deserialize)]
struct CoordsQuery {
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Resolve a WGS84 coordinate to a parcel, then fetch its boundary.
async fn parcel_by_coords_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CoordsQuery>,
) -> Result<Json<geojson::Feature>, ApiError> {
    let lat = query.lat.ok_or_else(|| bad_request("Missing lat parameter"))?;
    let lon = query.lon.ok_or_else(|| bad_request("Missing lon parameter"))?;

    let id = state.uldk.parcel_id_by_coords(lat, lon).await?;
    let parcel = state.uldk.parcel_by_id(&id).await?;
    Ok(Json(parcel.to_feature()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use geo::{Distance, Geodesic};
    use geo_types::Point;
    use std::collections::HashMap;

    // A parcel-sized square in PL-1992 near Warsaw.
    const PARCEL_WKT: &str = "POLYGON((637200 484900, 637300 484900, 637300 485000, 637200 485000, 637200 484900))";

    /// Serve a stub upstream on an ephemeral port, return its base URL.
    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/")
    }

    async fn uldk_stub(Query(params): Query<HashMap<String, String>>) -> String {
        match params.get("request").map(String::as_str) {
            Some("GetParcelByXY") => "0\n141201_1.0001.6509".to_string(),
            Some("GetParcelById") => format!("0\nSRID=2180;{PARCEL_WKT}"),
            _ => "-1\nunknown request".to_string(),
        }
    }

    async fn uldk_not_found_stub() -> String {
        "-1\nbrak wynikow".to_string()
    }

    fn overpass_stub_with(elements: serde_json::Value) -> Router {
        Router::new().route(
            "/",
            post(move || {
                let body = json!({
                    "version": 0.6,
                    "generator": "stub",
                    "elements": elements.clone(),
                });
                async move { Json(body) }
            }),
        )
    }

    async fn test_app(uldk_url: &str, overpass_url: &str) -> TestServer {
        let state = Arc::new(AppState {
            uldk: UldkClient::new(uldk_url).unwrap(),
            overpass: OverpassClient::new(overpass_url).unwrap(),
        });
        TestServer::new(app(state)).unwrap()
    }

    fn square_geometry() -> serde_json::Value {
        json!({
            "type": "Polygon",
            "coordinates": [[
                [20.9999, 51.9999],
                [21.0001, 51.9999],
                [21.0001, 52.0001],
                [20.9999, 52.0001],
                [20.9999, 51.9999],
            ]],
        })
    }

    #[tokio::test]
    async fn test_health() {
        let server = test_app("http://127.0.0.1:1/", "http://127.0.0.1:1/").await;
        let response = server.get("/health").await;
        response.assert_status_ok();
        response.assert_json(&json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_analyze_reports_industrial_violation() {
        let overpass_url = spawn_stub(overpass_stub_with(json!([{
            "type": "way",
            "id": 101,
            "tags": { "landuse": "industrial" },
            "geometry": [
                { "lat": 52.0045, "lon": 20.999 },
                { "lat": 52.0045, "lon": 21.001 },
            ],
        }])))
        .await;
        let server = test_app("http://127.0.0.1:1/", &overpass_url).await;

        let response = server
            .post("/api/analyze")
            .json(&json!({ "geometry": square_geometry() }))
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        let violations = body["violations"].as_array().unwrap();
        assert_eq!(violations.len(), 1);

        // The reported distance is the geodesic distance between the two
        // centroids, formatted to 2 decimal places.
        let expected = Geodesic.distance(Point::new(21.0, 52.0), Point::new(21.0, 52.0045));
        assert_eq!(
            violations[0],
            format!("Too close to a landfill/industrial area (N/A) - {expected:.2}m")
        );
    }

    #[tokio::test]
    async fn test_analyze_all_checks_passed() {
        let overpass_url = spawn_stub(overpass_stub_with(json!([]))).await;
        let server = test_app("http://127.0.0.1:1/", &overpass_url).await;

        let response = server
            .post("/api/analyze")
            .json(&json!({ "geometry": square_geometry() }))
            .await;
        response.assert_status_ok();
        response.assert_json(&json!({ "message": "All checks passed!" }));
    }

    #[tokio::test]
    async fn test_analyze_missing_geometry() {
        let server = test_app("http://127.0.0.1:1/", "http://127.0.0.1:1/").await;

        let response = server.post("/api/analyze").json(&json!({})).await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Missing geometry");
    }

    #[tokio::test]
    async fn test_analyze_rejects_non_polygon_geometry() {
        let server = test_app("http://127.0.0.1:1/", "http://127.0.0.1:1/").await;

        let response = server
            .post("/api/analyze")
            .json(&json!({ "geometry": { "type": "Point", "coordinates": [21.0, 52.0] } }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_parcel_by_id() {
        let uldk_url = spawn_stub(Router::new().route("/", get(uldk_stub))).await;
        let server = test_app(&uldk_url, "http://127.0.0.1:1/").await;

        let response = server.get("/api/parcel").add_query_param("id", "141201_1.0001.6509").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["properties"]["parcel_id"], "141201_1.0001.6509");
        assert_eq!(body["geometry"]["type"], "Polygon");

        // Reprojected boundary lands near Warsaw.
        let ring = body["geometry"]["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 5);
        let lon = ring[0][0].as_f64().unwrap();
        let lat = ring[0][1].as_f64().unwrap();
        assert!((20.0..22.0).contains(&lon), "lon {lon}");
        assert!((51.0..53.0).contains(&lat), "lat {lat}");
    }

    #[tokio::test]
    async fn test_parcel_missing_id() {
        let server = test_app("http://127.0.0.1:1/", "http://127.0.0.1:1/").await;

        let response = server.get("/api/parcel").await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Missing id parameter");
    }

    #[tokio::test]
    async fn test_parcel_by_coords() {
        let uldk_url = spawn_stub(Router::new().route("/", get(uldk_stub))).await;
        let server = test_app(&uldk_url, "http://127.0.0.1:1/").await;

        let response = server
            .get("/api/parcel_by_coords")
            .add_query_param("lat", 52.2297)
            .add_query_param("lon", 21.0122)
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["properties"]["parcel_id"], "141201_1.0001.6509");
    }

    #[tokio::test]
    async fn test_parcel_by_coords_missing_param() {
        let server = test_app("http://127.0.0.1:1/", "http://127.0.0.1:1/").await;

        let response = server
            .get("/api/parcel_by_coords")
            .add_query_param("lat", 52.2297)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Missing lon parameter");
    }

    #[tokio::test]
    async fn test_parcel_not_found_maps_to_500() {
        let uldk_url = spawn_stub(Router::new().route("/", get(uldk_not_found_stub))).await;
        let server = test_app(&uldk_url, "http://127.0.0.1:1/").await;

        let response = server.get("/api/parcel").add_query_param("id", "nope").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "No parcel found");
    }

    #[tokio::test]
    async fn test_uldk_unreachable_maps_to_500() {
        // Nothing listens on port 1.
        let server = test_app("http://127.0.0.1:1/", "http://127.0.0.1:1/").await;

        let response = server.get("/api/parcel").add_query_param("id", "x").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

        let body: serde_json::Value = response.json();
        let message = body["error"].as_str().unwrap();
        assert!(
            message.starts_with("Failed to connect to the ULDK API"),
            "unexpected message: {message}"
        );
    }
}
