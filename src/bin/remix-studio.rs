//! CLI for Remix Studio - AI product ad compositing.

use clap::{Args, Parser, Subcommand, ValueEnum};
use remix_studio::console::Console;
use remix_studio::{
    AssetLoader, GeminiModel, RemixClient, RemixConfig, RemixConfigBuilder, Session, SessionState,
    SessionView, DEFAULT_DOWNLOAD_NAME,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "remix-studio")]
#[command(about = "Composite a model photo and a product photo into an ad image via Gemini")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Gemini image model to use (overrides REMIX_MODEL)
    #[arg(long, value_enum, global = true)]
    gemini_model: Option<GeminiModelArg>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one ad image and save it
    Generate(GenerateArgs),

    /// Interactive session: load, generate, download, reset
    Studio,
}

#[derive(Args)]
struct GenerateArgs {
    /// The model (subject) image
    #[arg(short, long)]
    model: PathBuf,

    /// The product image
    #[arg(short, long)]
    product: PathBuf,

    /// How the model interacts with the product
    #[arg(short, long, default_value = "")]
    scenario: String,

    /// Output file path
    #[arg(short, long, default_value = DEFAULT_DOWNLOAD_NAME)]
    output: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GeminiModelArg {
    /// gemini-2.5-flash-image
    Flash,
    /// gemini-3-pro-image-preview
    Pro,
}

impl From<GeminiModelArg> for GeminiModel {
    fn from(arg: GeminiModelArg) -> Self {
        match arg {
            GeminiModelArg::Flash => GeminiModel::NanoBanana,
            GeminiModelArg::Pro => GeminiModel::NanoBananaPro,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("remix_studio=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(cli.gemini_model);
    tracing::debug!(?config, "resolved configuration");

    match cli.command {
        Commands::Generate(args) => generate(args, config, cli.json).await,
        Commands::Studio => studio(config).await,
    }
}

fn resolve_config(model: Option<GeminiModelArg>) -> RemixConfig {
    let builder = RemixConfigBuilder::from_env();
    match model {
        Some(model) => builder.model(model.into()).build(),
        None => builder.build(),
    }
}

async fn generate(args: GenerateArgs, config: RemixConfig, json_output: bool) -> anyhow::Result<()> {
    let loader = AssetLoader::new();
    let mut session = Session::new(RemixClient::new(config));

    session.select_model_asset(loader.load(&args.model).await?);
    session.select_product_asset(loader.load(&args.product).await?);
    session.set_scenario(args.scenario);

    if !json_output {
        eprintln!("Remixing Assets...");
    }
    session.submit().await;

    let saved = match session.state() {
        SessionState::Success(result) => {
            result.save(&args.output)?;
            true
        }
        _ => false,
    };

    if json_output {
        let view = SessionView::of(&session);
        let result = serde_json::json!({
            "type": "image",
            "success": saved,
            "state": view.state,
            "output": saved.then(|| args.output.display().to_string()),
            "error": view.error,
            "model": session.result().and_then(|r| r.metadata.model.clone()),
            "duration_ms": session.result().and_then(|r| r.metadata.duration_ms),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if saved {
        println!("Generated image: {}", args.output.display());
        if let Some(duration) = session.result().and_then(|r| r.metadata.duration_ms) {
            println!("Duration: {}ms", duration);
        }
    }

    if let Some(detail) = session.error() {
        anyhow::bail!("{detail}");
    }
    Ok(())
}

async fn studio(config: RemixConfig) -> anyhow::Result<()> {
    let session = Session::new(RemixClient::new(config));
    let mut console = Console::new(session, AssetLoader::new());

    println!("Remix Studio - type `help` for commands.");
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    console.run(stdin, tokio::io::stdout()).await?;
    Ok(())
}
