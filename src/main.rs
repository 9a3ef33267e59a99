// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use churn_advisor::{config::AppConfig, logger, model, FIELDS};
use churn_advisor::{score_csv_file, Predictor, ProfileInput};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "churn-advisor", version, about = "Predict customer churn and suggest retention actions")]
struct Cli {
    /// TOML config file (defaults to ./churn-advisor.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model artifact path, overrides config and environment
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive terminal form (default)
    Ui,
    /// Score one profile given as JSON
    Predict {
        /// JSON file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
    },
    /// Score every row of a CSV file
    Batch {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the form fields and their allowed values
    Schema,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Ui);

    let config = AppConfig::load(cli.config.as_deref())?.with_model_path(cli.model);

    // Keep the terminal form clean unless asked otherwise
    let level = match command {
        Command::Ui if !cli.verbose => "warn",
        _ => config.logging.level.as_str(),
    };
    if let Err(e) = logger::init_logger(level, cli.verbose) {
        eprintln!("⚠️  Logging not initialized: {}", e);
    }

    if let Command::Schema = command {
        println!("{}", serde_json::to_string_pretty(&FIELDS)?);
        return Ok(());
    }

    let predictor = startup(&config);

    match command {
        Command::Ui => run_ui_mode(predictor),
        Command::Predict { input } => run_predict(&predictor, &input),
        Command::Batch { input, output } => run_batch(&predictor, &input, &output),
        Command::Schema => Ok(()),
    }
}

/// Load the model once for the whole process. Failure here halts.
fn startup(config: &AppConfig) -> Predictor {
    let loaded = model::load_model(&config.model_path).and_then(model::init_global);

    match loaded {
        Ok(model) => Predictor::from_loaded(model),
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            eprintln!("❌ {}", e);
            eprintln!("   Set model_path in the config, {}, or pass --model.", churn_advisor::config::ENV_MODEL_PATH);
            std::process::exit(1);
        }
    }
}

fn run_predict(predictor: &Predictor, input: &str) -> Result<()> {
    let raw = if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("Failed to read profile from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read profile: {}", input))?
    };

    let profile: ProfileInput = serde_json::from_str(&raw).context("Failed to parse profile JSON")?;
    let assessment = predictor.assess(&profile)?;

    println!("{}", serde_json::to_string_pretty(&assessment)?);
    Ok(())
}

fn run_batch(predictor: &Predictor, input: &Path, output: &Path) -> Result<()> {
    let summary = score_csv_file(input, output, predictor)?;

    println!("✓ Scored {} of {} rows ({} failed)", summary.scored, summary.total, summary.failed);
    println!(
        "✓ Predicted churners: {} ({:.2}%)",
        summary.predicted_churn,
        summary.churn_rate() * 100.0
    );
    println!("📁 Output saved to: {}", output.display());
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(predictor: Predictor) -> Result<()> {
    let mut app = ui::App::new(predictor);
    ui::run_ui(&mut app)?;
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_predictor: Predictor) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the web form: cargo run --bin churn-server --features server");
    std::process::exit(1);
}
