/// Robo3D Terminal Demo - Articulated Robot
///
/// Renders the hierarchical robot with the terminal rasterizer.
/// Controls:
///   - t/T s/S a/A h/H l/L y/Y u/U: Rotate torso, shoulders, arms, hands,
///     head, thighs, calves (Shift reverses)
///   - m/M: Frown / neutral eyebrows
///   - Left mouse drag: Orbit the robot
///   - Q/ESC: Quit

use anyhow::{Context, Result};
use clap::Parser;
use robo3d_core::{Scene, SceneConfig};
use robo3d_terminal::TerminalApp;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "robo3d-terminal")]
#[command(about = "Hierarchical robot renderer for the terminal")]
#[command(version)]
struct Cli {
    /// Target frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Degrees per key press
    #[arg(long, default_value_t = 15.0)]
    step: f32,

    /// Degrees of orbit per pixel dragged
    #[arg(long, default_value_t = 0.5)]
    sensitivity: f32,

    /// Write logs to this file (the screen belongs to the renderer)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = SceneConfig {
        key_step_deg: cli.step,
        drag_sensitivity: cli.sensitivity,
        ..SceneConfig::default()
    };

    println!("Robo3D Terminal Renderer - Loading...");
    let mut app =
        TerminalApp::new(Scene::new(config), cli.fps).context("failed to set up the terminal")?;

    app.run()?;

    println!("Thank you for using Robo3D Terminal Renderer!");
    Ok(())
}
