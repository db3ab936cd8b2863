mod capture;
mod config;
mod dropper;
mod error;
mod image_processing;
mod pipeline;

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use colorpixel_core::{NormalizedPoint, Palette};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_scalar::{Scalar, Servable};

use crate::config::Config;
use crate::dropper::{Dropper, DropperPoints, PointBody};
use crate::error::AppError;
use crate::pipeline::{Pipeline, Readings, ReadingsView};

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    palette: Arc<Palette>,
    readings: watch::Receiver<Readings>,
    points: Arc<watch::Sender<DropperPoints>>,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ColorPixel API",
        description = "Live color readings under two movable droppers, named after the closest palette color",
        version = "0.1.0"
    ),
    tags(
        (name = "Readings", description = "Latest sampled colors"),
        (name = "Droppers", description = "Dropper positions"),
        (name = "Palette", description = "Named reference colors")
    ),
    paths(health, get_readings, get_palette, put_dropper),
    components(schemas(Dropper, PointBody, ReadingsView, PaletteColor))
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;
    let palette = Arc::new(load_palette(&config)?);

    // Producer -> presentation: latest readings only
    let (readings_tx, readings_rx) = watch::channel(Readings::default());
    // Presentation -> producer: dropper positions
    let (points_tx, points_rx) = watch::channel(DropperPoints::default());

    let source = capture::from_config(&config)?;
    let pipeline = Pipeline::new(
        source,
        palette.clone(),
        points_rx,
        readings_tx,
        config.frame_interval(),
    );
    tokio::spawn(pipeline.run());

    let state = AppState {
        palette,
        readings: readings_rx,
        points: Arc::new(points_tx),
    };

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", addr, e)))?;
    axum::serve(listener, router(state))
        .await
        .map_err(|e| AppError::Config(format!("Server error: {}", e)))
}

/// Load the configured palette document, or the embedded one
fn load_palette(config: &Config) -> Result<Palette, AppError> {
    match &config.palette_path {
        Some(path) => {
            tracing::info!("Loading palette from {}", path.display());
            let document = std::fs::read_to_string(path).map_err(|e| {
                AppError::Config(format!("Failed to read palette {}: {}", path.display(), e))
            })?;
            Ok(Palette::from_json(&document)?)
        }
        None => Ok(Palette::embedded()?),
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/readings", get(get_readings))
        .route("/palette", get(get_palette))
        .route("/droppers/{dropper}", put(put_dropper))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .route("/openapi.json", get(openapi_json))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    )
)]
async fn health() -> &'static str {
    "ok"
}

/// Get OpenAPI JSON specification
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Get latest readings
///
/// Returns the color and nearest palette name under each dropper for the
/// most recently processed frame.
#[utoipa::path(
    get,
    path = "/readings",
    tag = "Readings",
    responses(
        (status = 200, description = "Latest readings", body = ReadingsView)
    )
)]
async fn get_readings(State(state): State<AppState>) -> Json<ReadingsView> {
    let readings = *state.readings.borrow();
    Json(readings.to_view(&state.palette))
}

/// A palette entry as served over HTTP
#[derive(Debug, Clone, Serialize, ToSchema)]
struct PaletteColor {
    name: String,
    hex: String,
}

/// Get palette
///
/// Returns the named reference colors in match order.
#[utoipa::path(
    get,
    path = "/palette",
    tag = "Palette",
    responses(
        (status = 200, description = "Palette colors", body = Vec<PaletteColor>)
    )
)]
async fn get_palette(State(state): State<AppState>) -> Json<Vec<PaletteColor>> {
    let colors = state
        .palette
        .iter()
        .map(|entry| PaletteColor {
            name: entry.name.clone(),
            hex: entry.reference.to_hex(),
        })
        .collect();
    Json(colors)
}

/// Move a dropper
///
/// Takes effect from the next captured frame.
#[utoipa::path(
    put,
    path = "/droppers/{dropper}",
    tag = "Droppers",
    params(
        ("dropper" = Dropper, Path, description = "Dropper to move: top or bottom")
    ),
    request_body = PointBody,
    responses(
        (status = 200, description = "New position", body = PointBody),
        (status = 400, description = "Point outside [0, 1]"),
        (status = 404, description = "Unknown dropper")
    )
)]
async fn put_dropper(
    State(state): State<AppState>,
    Path(dropper): Path<String>,
    Json(body): Json<PointBody>,
) -> Result<Json<PointBody>, AppError> {
    let dropper: Dropper = dropper.parse()?;
    let point: NormalizedPoint = body.try_into()?;

    tracing::info!("Moving {} dropper to ({}, {})", dropper, body.x, body.y);
    state.points.send_modify(|points| points.set(dropper, point));

    Ok(Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn test_state() -> (AppState, watch::Sender<Readings>, watch::Receiver<DropperPoints>) {
        let (readings_tx, readings_rx) = watch::channel(Readings::default());
        let (points_tx, points_rx) = watch::channel(DropperPoints::default());
        let state = AppState {
            palette: Arc::new(Palette::from_pairs(&[("Black", "#000000"), ("White", "#FFFFFF")]).unwrap()),
            readings: readings_rx,
            points: Arc::new(points_tx),
        };
        (state, readings_tx, points_rx)
    }

    #[tokio::test]
    async fn test_readings_before_first_frame_are_unknown() {
        let (state, _readings, _points) = test_state();
        let Json(view) = get_readings(State(state)).await;

        assert_eq!(view.frame, 0);
        assert_eq!(view.droppers.len(), 2);
        assert!(view.droppers.iter().all(|d| d.name == "Unknown"));
    }

    #[tokio::test]
    async fn test_readings_show_latest() {
        let (state, readings, _points) = test_state();
        for frame_number in 1..=3 {
            readings.send_replace(Readings {
                frame_number,
                top: Some(pipeline::DropperReading {
                    color: colorpixel_core::RgbColor::new(0.902, 0.902, 0.902),
                    palette_index: 1,
                    distance: 0.17,
                }),
                bottom: None,
            });
        }

        let Json(view) = get_readings(State(state)).await;
        assert_eq!(view.frame, 3);
        assert_eq!(view.droppers[0].name, "White");
        assert_eq!(view.droppers[0].hex.as_deref(), Some("#E6E6E6"));
        assert_eq!(view.droppers[1].name, "Unknown");
    }

    #[tokio::test]
    async fn test_palette_listing() {
        let (state, _readings, _points) = test_state();
        let Json(colors) = get_palette(State(state)).await;
        let names: Vec<&str> = colors.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Black", "White"]);
        assert_eq!(colors[1].hex, "#FFFFFF");
    }

    #[tokio::test]
    async fn test_move_dropper() {
        let (state, _readings, points) = test_state();
        let body = PointBody { x: 0.25, y: 0.75 };

        let result = put_dropper(State(state), Path("bottom".to_string()), Json(body)).await;
        assert!(result.is_ok());
        assert_eq!(points.borrow().bottom, NormalizedPoint::new(0.25, 0.75));
        assert_eq!(points.borrow().top, Dropper::Top.default_point());
    }

    #[tokio::test]
    async fn test_move_dropper_rejects_bad_input() {
        let (state, _readings, points) = test_state();

        let result = put_dropper(
            State(state.clone()),
            Path("left".to_string()),
            Json(PointBody { x: 0.5, y: 0.5 }),
        )
        .await;
        assert!(matches!(result, Err(AppError::UnknownDropper(_))));

        let result = put_dropper(
            State(state),
            Path("top".to_string()),
            Json(PointBody { x: 2.0, y: 0.5 }),
        )
        .await;
        assert!(matches!(result, Err(AppError::InvalidPoint(_))));
        assert_eq!(*points.borrow(), DropperPoints::default());
    }

    #[test]
    fn test_load_palette_from_file() {
        let path = std::env::temp_dir().join(format!("colorpixel-palette-{}.json", std::process::id()));
        std::fs::write(&path, r##"[{"name": "Ink", "hex": "#101820"}]"##).unwrap();

        let vars: HashMap<&str, String> =
            HashMap::from([("PALETTE_PATH", path.display().to_string())]);
        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
        let palette = load_palette(&config).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(palette.len(), 1);
        assert_eq!(palette[0].name, "Ink");
    }

    #[test]
    fn test_load_palette_failures_are_fatal_errors() {
        let config = Config::from_lookup(|key| {
            (key == "PALETTE_PATH").then(|| "/nonexistent/colors.json".to_string())
        })
        .unwrap();
        assert!(matches!(load_palette(&config), Err(AppError::Config(_))));

        let path = std::env::temp_dir().join(format!("colorpixel-bad-{}.json", std::process::id()));
        std::fs::write(&path, r##"[{"name": "Bad", "hex": "12345"}]"##).unwrap();
        let config = Config::from_lookup(|key| {
            (key == "PALETTE_PATH").then(|| path.display().to_string())
        })
        .unwrap();
        let result = load_palette(&config);
        std::fs::remove_file(&path).ok();

        assert!(matches!(
            result,
            Err(AppError::Palette(colorpixel_core::Error::InvalidColorFormat { .. }))
        ));
    }

    #[test]
    fn test_embedded_palette_is_default() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert!(load_palette(&config).unwrap().len() > 100);
    }
}
