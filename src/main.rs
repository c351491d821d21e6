use anyhow::Result;
use clap::{Parser, Subcommand};
use random_people::{
    dag::{generate_task, load_task, run_pipeline},
    PipelineConfig,
};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Generate a synthetic people CSV and load it into a database table.
#[derive(Parser)]
#[command(name = "random_people", version)]
struct Cli {
    /// YAML configuration file; built-in defaults when omitted.
    #[arg(long, global = true, env = "RANDOM_PEOPLE_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides `data_dir` from the config file.
    #[arg(long, global = true, env = "RANDOM_PEOPLE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Overrides `profile` from the config file.
    #[arg(long, global = true, env = "RANDOM_PEOPLE_PROFILE")]
    profile: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write one new dataset file (task `generate_csv`).
    Generate,
    /// Replace the target table with a dataset file (task `load_csv`).
    Load {
        /// File to load; the latest dataset in the data directory when omitted.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Generate, then load the file just generated.
    Run,
    /// Print the scheduler definition as YAML.
    Dag,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(log_level.parse().unwrap_or(Level::INFO.into())),
        )
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) load + validate configuration ───────────────────────────
    let cli = Cli::parse();
    let cfg = PipelineConfig::load(cli.config.as_deref())?
        .with_overrides(cli.data_dir, cli.profile);

    if !matches!(cli.command, Command::Dag) {
        cfg.validate()?;
        info!(
            data_dir = %cfg.data_dir.display(),
            profile = %cfg.profile,
            "configuration loaded"
        );
    }

    // ─── 3) run the requested step(s) ───────────────────────────────
    match cli.command {
        Command::Generate => {
            let path = generate_task(&cfg)?;
            println!("{}", path.display());
        }
        Command::Load { file } => {
            let report = load_task(&cfg, file.as_deref())?;
            println!("{}\t{}", report.file.display(), report.rows);
        }
        Command::Run => {
            let summary = run_pipeline(&cfg)?;
            println!("{}\t{}", summary.dataset.display(), summary.rows);
        }
        Command::Dag => {
            print!("{}", cfg.dag.to_yaml()?);
            return Ok(());
        }
    }

    info!("all done");
    Ok(())
}
