use anyhow::Result;
use clap::Parser;
use photopoem::app::App;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "photopoem")]
#[command(about = "Generate a poem from a photograph")]
#[command(group = clap::ArgGroup::new("source").required(true))]
struct CliArgs {
    /// Path to a local image file (JPEG, PNG, WebP, or GIF).
    #[arg(long, value_name = "PATH", group = "source")]
    file: Option<PathBuf>,

    /// URL of a remote image to fetch.
    #[arg(long, value_name = "URL", group = "source")]
    url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photopoem=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let app = match App::new() {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    let result = match (&args.file, &args.url) {
        (Some(path), _) => app.poem_from_file(path).await,
        (_, Some(url)) => app.poem_from_url(url).await,
        _ => unreachable!("clap enforces exactly one source"),
    };

    match result {
        Ok(poem) => {
            info!("Poem generated");
            println!("{}", poem);
            Ok(())
        }
        Err(e) => {
            error!("Poem generation failed: {}", e);
            std::process::exit(1);
        }
    }
}
