use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use handmorph_core::{
    spawn_model_loader, AnimationLoop, AppConfig, DetectionPipeline, DisplaySurface, FrameClock,
    FrameSnapshot, GestureClassifier, ParticleField, RecordedSession, RenderGraph, ReplayLoader,
    Scheduler, ShapeKind, SharedMode, StatusReport, Tick, VideoFrame,
};
use tracing_subscriber::EnvFilter;

fn main() -> handmorph_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Run {
            session,
            frames,
            log_every,
            snapshot,
        } => run_session(&config, &session, frames, log_every, snapshot.as_deref()),
        Commands::Classify { session } => run_classify(&config, &session),
        Commands::Shapes { output } => run_shapes(&config, &output),
        Commands::InitConfig { output } => {
            std::fs::write(&output, config.to_json_pretty()?)?;
            tracing::info!(?output, "configuration written");
            Ok(())
        }
    }
}

fn run_session(
    config: &AppConfig,
    session: &Path,
    frames: u64,
    log_every: u64,
    snapshot: Option<&Path>,
) -> handmorph_core::Result<()> {
    tracing::info!(?session, frames, "starting headless session");
    let mut scheduler = Scheduler::from_config(&config.timing)?;

    let shared = SharedMode::new(config.gesture.default_rotation_speed);
    let model = spawn_model_loader(ReplayLoader::new(session));
    let mut pipeline = DetectionPipeline::new(
        GestureClassifier::new(config.gesture.clone()),
        shared.clone(),
        model,
    );

    let field = ParticleField::from_config(config)?;
    let mut animation = AnimationLoop::new(
        field,
        shared,
        config.particles.lerp_speed,
        config.timing.rotation_step,
    );
    let mut render = RenderGraph::new();
    render.register_surface(Box::new(LogSurface::new(log_every)));

    let mut last_label = String::new();
    let mut status_sink = |status: &StatusReport| {
        if status.label != last_label {
            tracing::info!(
                mode = %status.mode,
                color = %format!("#{:06X}", status.color.to_hex()),
                "{}",
                status.label
            );
            last_label.clone_from(&status.label);
        }
    };

    let mut clock = FrameClock::default();
    while scheduler.display_frames_emitted() < frames {
        match scheduler.tick(&mut clock) {
            Tick::Video { index, .. } => {
                let frame = VideoFrame {
                    index,
                    timestamp: clock.millis(),
                };
                if let Err(err) = pipeline.process(&frame, &mut status_sink) {
                    tracing::error!(error = %err, "continuing without gesture control");
                }
            }
            Tick::Display { .. } => {
                animation.tick(&mut render)?;
            }
        }
    }

    let mode = pipeline.shared().mode();
    tracing::info!(
        frames = animation.frames(),
        %mode,
        offset = animation.field().mean_offset(ShapeKind::from(mode)),
        "session finished"
    );

    if let Some(path) = snapshot {
        let frame = FrameSnapshot::capture(
            animation.frames(),
            mode,
            animation.rotation_y(),
            animation.field(),
        );
        std::fs::write(path, serde_json::to_vec(&frame)?)?;
        tracing::info!(?path, "final frame written");
    }

    Ok(())
}

fn run_classify(config: &AppConfig, session: &Path) -> handmorph_core::Result<()> {
    let session = RecordedSession::load(session)?;
    let classifier = GestureClassifier::new(config.gesture.clone());

    for frame in &session.frames {
        let reading = classifier.classify(frame);
        println!(
            "{:>10.1} ms  {:<8} fingers={} rotation={:+.2}  {}",
            frame.timestamp,
            reading.mode,
            reading.open_fingers,
            reading.rotation_speed,
            reading.status.label
        );
    }

    Ok(())
}

fn run_shapes(config: &AppConfig, output: &Path) -> handmorph_core::Result<()> {
    let field = ParticleField::from_config(config)?;
    let shapes: serde_json::Map<String, serde_json::Value> = ShapeKind::ALL
        .iter()
        .map(|shape| -> handmorph_core::Result<(String, serde_json::Value)> {
            let groups: Vec<_> = field.groups().iter().map(|g| g.target(*shape).to_vec()).collect();
            Ok((format!("{shape:?}").to_lowercase(), serde_json::to_value(groups)?))
        })
        .collect::<handmorph_core::Result<_>>()?;

    std::fs::write(output, serde_json::to_vec(&shapes)?)?;
    tracing::info!(?output, particles = field.particle_count(), "target shapes written");
    Ok(())
}

/// Display surface that reports progress through the log instead of drawing.
struct LogSurface {
    every: u64,
}

impl LogSurface {
    fn new(every: u64) -> Self {
        Self { every: every.max(1) }
    }
}

impl DisplaySurface for LogSurface {
    fn present(&mut self, frame: &FrameSnapshot) -> handmorph_core::Result<()> {
        if frame.frame % self.every == 0 {
            let centroid = frame.centroid();
            tracing::debug!(
                frame = frame.frame,
                mode = %frame.mode,
                rotation = frame.rotation_y,
                particles = frame.particle_count(),
                centroid = ?centroid,
                "frame presented"
            );
        }
        Ok(())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Gesture-driven particle visualiser", long_about = None)]
struct Cli {
    /// JSON configuration file. Built-in defaults are used when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a recorded landmark session through the full pipeline.
    Run {
        /// Recorded landmark session (JSON).
        session: PathBuf,
        /// Number of display frames to simulate.
        #[arg(short, long, default_value_t = 600)]
        frames: u64,
        /// Log a frame summary every N display frames (at debug level).
        #[arg(long, default_value_t = 60)]
        log_every: u64,
        /// Write the last frame's particle positions to this file.
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
    /// Print the gesture classification of every frame in a session.
    Classify {
        session: PathBuf,
    },
    /// Generate the target shapes and write them as JSON.
    Shapes {
        output: PathBuf,
    },
    /// Write the effective configuration to a file.
    InitConfig {
        output: PathBuf,
    },
}
