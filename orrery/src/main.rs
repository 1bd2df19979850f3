//! orrery: interactive entry point.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use orrery::app::{run, run_headless, AppConfig};
use orrery::catalog::ExhibitFile;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Looked for in the working directory when no `--config` is given.
const LOCAL_CONFIG: &str = "orrery.toml";

#[derive(Parser, Debug)]
#[command(name = "orrery", version, about = "Hand-steered solar system exhibit")]
struct Cli {
    /// Exhibit file (TOML).  Defaults to ./orrery.toml, then the built-in
    /// solar system.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Skip the local config lookup and use the built-in solar system.
    #[arg(long, conflicts_with = "config")]
    quick: bool,

    /// Run the scheduler for N ticks without a window or sound, then exit.
    #[arg(long, value_name = "N")]
    headless_ticks: Option<u64>,

    /// Print the effective exhibit file and exit.
    #[arg(long)]
    dump_config: bool,

    /// Do not open a MIDI port.
    #[arg(long)]
    mute: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orrery=info,orbit_rig=info,hand_signal=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let exhibit = load_exhibit(&cli)?;

    if cli.dump_config {
        print!("{}", exhibit.to_toml()?);
        return Ok(());
    }

    if let Some(ticks) = cli.headless_ticks {
        let report = run_headless(&exhibit, ticks)?;
        info!(
            ticks = report.ticks,
            selections = report.selections.len(),
            focused = report.focused.as_deref().unwrap_or("-"),
            mode = ?report.mode,
            "headless run finished"
        );
        return Ok(());
    }

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║             Orrery: a solar system in your hands             ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware (simulation if no device answers)");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Keyboard + mouse simulation  (use --features leap for hardware)");
    println!("  Bodies: {}", exhibit.bodies.len());
    println!();
    println!("  Opening visualizer window…");
    println!();

    run(AppConfig { exhibit, sound: !cli.mute })
}

fn load_exhibit(cli: &Cli) -> Result<ExhibitFile> {
    if let Some(path) = &cli.config {
        return ExhibitFile::load(path);
    }
    let local = Path::new(LOCAL_CONFIG);
    if !cli.quick && local.exists() {
        return ExhibitFile::load(local);
    }
    info!("using the built-in solar system");
    ExhibitFile::embedded()
}
