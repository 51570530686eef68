use anyhow::Result;
use clap::Parser;
use gemini_ask::app::App;
use gemini_ask::models::Config;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "gemini-ask")]
#[command(about = "Ask a Gemini model one question and save the answer")]
struct CliArgs {
    /// System instruction file (overrides GEMINI_INSTRUCTION_PATH).
    #[arg(long, value_name = "PATH")]
    instruction: Option<PathBuf>,

    /// Where to write the answer (overrides GEMINI_OUTPUT_PATH).
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Model number or name; skips the model prompt.
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,

    /// Do not open the answer in the default viewer.
    #[arg(long)]
    no_open: bool,
}

impl CliArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.instruction {
            config.instruction_path = path.clone();
        }
        if let Some(path) = &self.output {
            config.output_path = path.clone();
        }
        if self.no_open {
            config.open_viewer = false;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemini_ask=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    };
    args.apply(&mut config);

    let mut app = App::new(config).with_model_choice(args.model.clone());
    match app.run().await {
        Ok(outcome) => {
            info!(
                "Run completed with model {} (retried: {})",
                outcome.model, outcome.retried
            );
            Ok(())
        }
        Err(e) => {
            if e.is_startup() {
                error!("Startup failed, no request was sent: {}", e);
            } else {
                error!("Run failed: {}", e);
            }
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}
