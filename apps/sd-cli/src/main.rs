use clap::{Parser, Subcommand};
use sd_app::{
    AppError, AppResult, ChannelCall, DashboardConfig, DashboardController, DashboardView, Event,
    RecordingChannel, load_yaml,
};
use sd_core::{Size, format_elapsed};
use sd_layout::{fit_with_factor, fit_within};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sd-cli")]
#[command(about = "Seneca dashboard CLI - inspect and replay dashboard sessions", long_about = None)]
struct Cli {
    /// Dashboard configuration file (YAML); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format elapsed seconds the way the session timer shows them
    FormatTime {
        /// Elapsed time in seconds
        seconds: f64,
    },
    /// Fit a panel of natural size WxH into a bounding box
    Fit {
        width: f32,
        height: f32,
        bound_width: f32,
        bound_height: f32,
        /// Scale factor applied before bounding (never upscales when omitted)
        #[arg(long)]
        factor: Option<f32>,
    },
    /// Replay a scenario of UI and server events through the controller
    Replay {
        /// Scenario file (YAML or JSON)
        scenario: PathBuf,
        /// Print only the outbound calls
        #[arg(long)]
        calls_only: bool,
    },
    /// Print the effective configuration
    Config {
        /// Also write it to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Recorded session: optional configuration override plus events in order.
#[derive(Debug, Deserialize)]
struct Scenario {
    #[serde(default)]
    config: Option<DashboardConfig>,
    events: Vec<Event>,
}

#[derive(Serialize)]
struct ReplayReport {
    calls: Vec<ChannelCall>,
    rejected: Vec<Rejection>,
    view: DashboardView,
}

#[derive(Serialize)]
struct Rejection {
    index: usize,
    error: String,
}

fn main() -> AppResult<()> {
    // stdout carries command output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_yaml(path)?,
        None => DashboardConfig::default(),
    };

    match cli.command {
        Commands::FormatTime { seconds } => {
            println!("{}", format_elapsed(seconds));
            Ok(())
        }
        Commands::Fit {
            width,
            height,
            bound_width,
            bound_height,
            factor,
        } => cmd_fit(
            Size::new(width, height),
            Size::new(bound_width, bound_height),
            factor,
        ),
        Commands::Replay {
            scenario,
            calls_only,
        } => cmd_replay(&scenario, config, calls_only),
        Commands::Config { output } => cmd_config(&config, output.as_deref()),
    }
}

fn cmd_fit(natural: Size, bound: Size, factor: Option<f32>) -> AppResult<()> {
    let fitted = match factor {
        Some(f) if !(f.is_finite() && f > 0.0) => {
            return Err(AppError::InvalidInput(format!(
                "factor must be positive, got {f}"
            )));
        }
        Some(f) => fit_with_factor(natural, bound, f)?,
        None => fit_within(natural, bound)?,
    };
    println!("{:.2} x {:.2}", fitted.width, fitted.height);
    Ok(())
}

fn load_scenario(path: &Path) -> AppResult<Scenario> {
    let content = std::fs::read_to_string(path)?;
    let scenario = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        _ => serde_yaml::from_str(&content)?,
    };
    Ok(scenario)
}

fn cmd_replay(path: &Path, config: DashboardConfig, calls_only: bool) -> AppResult<()> {
    let scenario = load_scenario(path)?;
    let config = scenario.config.unwrap_or(config);
    config.validate()?;
    tracing::info!(events = scenario.events.len(), "replaying {}", path.display());

    let mut controller = DashboardController::new(config, RecordingChannel::new());
    let mut rejected = Vec::new();
    for (index, event) in scenario.events.into_iter().enumerate() {
        if let Err(err) = controller.dispatch(event) {
            rejected.push(Rejection {
                index,
                error: err.to_string(),
            });
        }
    }

    let view = controller.view();
    let calls = controller.channel_mut().take();
    let json = if calls_only {
        serde_json::to_string_pretty(&calls)?
    } else {
        serde_json::to_string_pretty(&ReplayReport {
            calls,
            rejected,
            view,
        })?
    };
    println!("{json}");
    Ok(())
}

fn cmd_config(config: &DashboardConfig, output: Option<&Path>) -> AppResult<()> {
    print!("{}", serde_yaml::to_string(config)?);
    if let Some(path) = output {
        sd_app::save_yaml(path, config)?;
        eprintln!("✓ Configuration written to {}", path.display());
    }
    Ok(())
}
