//! Slide viewer - maps viewer pixels to slide coordinates under rotation.
//!
//! This binary runs the session API, prints single-pixel mappings, or renders
//! a rotated view of a slide image.

use clap::Parser;
use serde::Serialize;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use slide_viewer::{
    config::{Cli, Command, MapConfig, RenderConfig, ServeConfig},
    render::{render_view, ViewEncoder, DEFAULT_FILL},
    server::{create_router, RouterConfig},
    session::SessionRegistry,
    transform::{SlideCoordinate, TransformState},
    viewer::Viewer,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Map(config) => run_map(config),
        Command::Render(config) => run_render(config),
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Slide viewer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Sessions: up to {}", config.max_sessions);
    info!("  Viewer size: up to {} pixels", config.max_viewer_pixels);
    info!("  Undo history: {} motions per viewer", config.max_history);

    let sessions = SessionRegistry::with_capacity(config.max_sessions, config.max_viewer_pixels)
        .with_history_limit(config.max_history);
    let router = create_router(sessions, build_router_config(&config));

    let addr = config.bind_address();

    info!("");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!(
        "    curl -X POST -H 'content-type: application/json' -d '{{\"width\":512,\"height\":512}}' http://{}/viewers",
        addr
    );
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "slide_viewer=debug,tower_http=debug"
    } else {
        "slide_viewer=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new().with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}

// =============================================================================
// Map Command
// =============================================================================

#[derive(Serialize)]
struct MapStep {
    angle_degrees: Option<f64>,
    dx: Option<f64>,
    dy: Option<f64>,
    vx: i32,
    vy: i32,
    sx: f64,
    sy: f64,
}

impl MapStep {
    fn of(state: &TransformState, angle_degrees: Option<f64>, translation: Option<(f64, f64)>) -> Self {
        let pixel = state.viewer_pixel();
        let SlideCoordinate { sx, sy } = state.current();
        Self {
            angle_degrees,
            dx: translation.map(|t| t.0),
            dy: translation.map(|t| t.1),
            vx: pixel.vx,
            vy: pixel.vy,
            sx,
            sy,
        }
    }
}

fn run_map(config: MapConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let (sx, sy) = config.initial_coordinate();
    let mut state = TransformState::initialize(config.vx, config.vy, sx, sy);
    let mut steps = vec![MapStep::of(&state, None, None)];

    if !config.json {
        println!("On initially loading the slide into the viewer:");
        println!("{}", state);
    }

    for spec in config.motions() {
        let motion = spec.to_motion();
        state.apply(&motion);
        let translation = spec.translation.map(|t| (t.dx, t.dy));
        steps.push(MapStep::of(&state, Some(spec.angle_degrees), translation));

        if !config.json {
            println!();
            match spec.translation {
                Some(t) => println!(
                    "After {} degree rotation and ({}, {}) translation of the slide:",
                    spec.angle_degrees, t.dx, t.dy
                ),
                None => println!("After {} degree rotation of the slide:", spec.angle_degrees),
            }
            println!("{}", state);
        }
    }

    if config.json {
        match serde_json::to_string_pretty(&steps) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Render Command
// =============================================================================

fn run_render(config: RenderConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let encoder = ViewEncoder::new();
    let slide = match encoder.load(&config.input) {
        Ok(slide) => slide,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let width = config.width.unwrap_or(slide.width());
    let height = config.height.unwrap_or(slide.height());
    info!(
        "Slide {}x{}, viewer {}x{}",
        slide.width(),
        slide.height(),
        width,
        height
    );

    let mut viewer = match Viewer::with_offset(width, height, config.offset_x, config.offset_y) {
        Ok(viewer) => viewer,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    for spec in &config.motions {
        info!("Applying {} degree rotation", spec.angle_degrees);
        viewer.apply(spec.to_motion());
    }

    let view = render_view(&viewer, &slide, DEFAULT_FILL);
    let jpeg = match encoder.encode(&view, config.quality) {
        Ok(jpeg) => jpeg,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = std::fs::write(&config.output, &jpeg) {
        error!("Failed to write {}: {}", config.output.display(), e);
        return ExitCode::FAILURE;
    }

    info!("Wrote {} ({} bytes)", config.output.display(), jpeg.len());
    ExitCode::SUCCESS
}
