//! Configuration management for the slide viewer.
//!
//! The binary exposes three subcommands, each with its own configuration:
//!
//! - `serve` - run the viewer session HTTP API ([`ServeConfig`])
//! - `map` - print where one viewer pixel lands after a sequence of motions ([`MapConfig`])
//! - `render` - rotate/translate a slide image into a viewer frame ([`RenderConfig`])
//!
//! # Environment Variables
//!
//! Server options can also be set via environment variables with the
//! `SLIDE_VIEWER_` prefix:
//!
//! - `SLIDE_VIEWER_HOST` - Server bind address (default: 0.0.0.0)
//! - `SLIDE_VIEWER_PORT` - Server port (default: 3000)
//! - `SLIDE_VIEWER_MAX_SESSIONS` - Live viewer sessions kept (default: 16)
//! - `SLIDE_VIEWER_MAX_VIEWER_PIXELS` - Pixel budget per viewer (default: 4194304)
//! - `SLIDE_VIEWER_MAX_HISTORY` - Motions kept for undo per viewer (default: 1024)
//! - `SLIDE_VIEWER_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};

use crate::render::{is_valid_quality, DEFAULT_JPEG_QUALITY};
use crate::session::{DEFAULT_MAX_VIEWER_PIXELS, DEFAULT_SESSION_CAPACITY};
use crate::transform::precision::all_finite;
use crate::transform::{Motion, Translation};
use crate::viewer::DEFAULT_MAX_HISTORY;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Upper bound for `--max-viewer-pixels` (8192 x 8192).
pub const MAX_VIEWER_PIXELS_LIMIT: u64 = 8192 * 8192;

/// Upper bound for `--max-history`.
pub const MAX_HISTORY_LIMIT: usize = 65_536;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Slide viewer - map viewer pixels to slide coordinates under rotation.
#[derive(Parser, Debug, Clone)]
#[command(name = "slide-viewer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the viewer session HTTP API.
    Serve(ServeConfig),

    /// Print the slide coordinate shown by one viewer pixel after each motion.
    Map(MapConfig),

    /// Render a rotated/translated view of a slide image.
    Render(RenderConfig),
}

// =============================================================================
// Motion Arguments
// =============================================================================

/// A motion as entered on the command line: `ANGLE` or `ANGLE,DX,DY`.
///
/// The angle is in degrees; positive rotates the slide counter-clockwise
/// relative to the viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSpec {
    pub angle_degrees: f64,
    pub translation: Option<Translation>,
}

impl MotionSpec {
    pub fn to_motion(&self) -> Motion {
        Motion::from_degrees(self.angle_degrees, self.translation)
    }
}

impl FromStr for MotionSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let number = |p: &str| {
            p.parse::<f64>()
                .map_err(|_| format!("invalid number '{}' in motion '{}'", p, s))
                .and_then(|v| {
                    if v.is_finite() {
                        Ok(v)
                    } else {
                        Err(format!("motion '{}' must be finite", s))
                    }
                })
        };

        match parts.as_slice() {
            [angle] => Ok(Self {
                angle_degrees: number(*angle)?,
                translation: None,
            }),
            [angle, dx, dy] => Ok(Self {
                angle_degrees: number(*angle)?,
                translation: Some(Translation::new(number(*dx)?, number(*dy)?)),
            }),
            _ => Err(format!(
                "invalid motion '{}': expected ANGLE or ANGLE,DX,DY",
                s
            )),
        }
    }
}

// =============================================================================
// Serve Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "SLIDE_VIEWER_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "SLIDE_VIEWER_PORT")]
    pub port: u16,

    /// Maximum number of live viewer sessions (least recently used are evicted).
    #[arg(long, default_value_t = DEFAULT_SESSION_CAPACITY, env = "SLIDE_VIEWER_MAX_SESSIONS")]
    pub max_sessions: usize,

    /// Maximum width * height of a single viewer.
    #[arg(long, default_value_t = DEFAULT_MAX_VIEWER_PIXELS, env = "SLIDE_VIEWER_MAX_VIEWER_PIXELS")]
    pub max_viewer_pixels: u64,

    /// Number of motions each viewer keeps for undo (oldest dropped first).
    #[arg(long, default_value_t = DEFAULT_MAX_HISTORY, env = "SLIDE_VIEWER_MAX_HISTORY")]
    pub max_history: usize,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "SLIDE_VIEWER_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_sessions == 0 {
            return Err("max_sessions must be greater than 0".to_string());
        }
        if self.max_viewer_pixels == 0 || self.max_viewer_pixels > MAX_VIEWER_PIXELS_LIMIT {
            return Err(format!(
                "max_viewer_pixels must be between 1 and {}",
                MAX_VIEWER_PIXELS_LIMIT
            ));
        }
        if self.max_history == 0 || self.max_history > MAX_HISTORY_LIMIT {
            return Err(format!(
                "max_history must be between 1 and {}",
                MAX_HISTORY_LIMIT
            ));
        }
        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Map Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct MapConfig {
    /// Viewer pixel x.
    #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
    pub vx: i32,

    /// Viewer pixel y.
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub vy: i32,

    /// Initial slide x (defaults to the viewer x).
    #[arg(long, allow_hyphen_values = true)]
    pub sx: Option<f64>,

    /// Initial slide y (defaults to the viewer y).
    #[arg(long, allow_hyphen_values = true)]
    pub sy: Option<f64>,

    /// Motion to apply, `ANGLE` or `ANGLE,DX,DY` (degrees, pixels). Repeatable.
    ///
    /// Defaults to a 90 degree turn followed by a -90 degree turn.
    #[arg(short, long = "motion", allow_hyphen_values = true)]
    pub motions: Vec<MotionSpec>,

    /// Print results as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl MapConfig {
    /// Initial slide coordinate, defaulting to the identity mapping.
    pub fn initial_coordinate(&self) -> (f64, f64) {
        (
            self.sx.unwrap_or(f64::from(self.vx)),
            self.sy.unwrap_or(f64::from(self.vy)),
        )
    }

    /// Motions to apply, falling back to the quarter-turn-and-back demo.
    pub fn motions(&self) -> Vec<MotionSpec> {
        if self.motions.is_empty() {
            vec![
                MotionSpec {
                    angle_degrees: 90.0,
                    translation: None,
                },
                MotionSpec {
                    angle_degrees: -90.0,
                    translation: None,
                },
            ]
        } else {
            self.motions.clone()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let (sx, sy) = self.initial_coordinate();
        if !all_finite(&[sx, sy]) {
            return Err("initial slide coordinate must be finite".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Render Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct RenderConfig {
    /// Slide image to read (JPEG or PNG).
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where to write the rendered JPEG view.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Motion to apply, `ANGLE` or `ANGLE,DX,DY` (degrees, pixels). Repeatable.
    #[arg(short, long = "motion", allow_hyphen_values = true)]
    pub motions: Vec<MotionSpec>,

    /// Viewer width (defaults to the slide width).
    #[arg(long)]
    pub width: Option<u32>,

    /// Viewer height (defaults to the slide height).
    #[arg(long)]
    pub height: Option<u32>,

    /// Initial slide x shown by viewer pixel (0, 0).
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub offset_x: f64,

    /// Initial slide y shown by viewer pixel (0, 0).
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub offset_y: f64,

    /// JPEG quality (1-100).
    #[arg(short, long, default_value_t = DEFAULT_JPEG_QUALITY)]
    pub quality: u8,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !is_valid_quality(self.quality) {
            return Err("quality must be between 1 and 100".to_string());
        }
        if self.width == Some(0) || self.height == Some(0) {
            return Err("width and height must be greater than 0".to_string());
        }
        if !all_finite(&[self.offset_x, self.offset_y]) {
            return Err("offset must be finite".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
