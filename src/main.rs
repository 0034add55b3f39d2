use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubetext::{cli, config, output, pipeline, utils};

use cli::{Cli, Commands, SourceKind};
use config::Config;
use pipeline::TranscriptPipeline;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_directive = if cli.verbose {
        "tubetext=debug"
    } else {
        "tubetext=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Transcript {
            video_id,
            lang,
            source,
            output,
            format,
        } => {
            // Reject malformed input before any config, network, or
            // filesystem work happens
            utils::validate_video_id(&video_id)?;
            if let Some(lang) = lang.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
                utils::validate_lang_param(lang)?;
            }

            if matches!(source, SourceKind::Ytdlp) {
                let missing_deps = utils::check_dependencies().await;
                if !missing_deps.is_empty() {
                    eprintln!("⚠️  Dependency check warnings:");
                    for dep in missing_deps {
                        eprintln!("   • {}", dep);
                    }
                    eprintln!("   (Continuing anyway - tools may be available)");
                }
            }

            let config = Config::load().await?;
            let pipeline = TranscriptPipeline::new(config, source).await?;

            let progress = if cli.quiet {
                ProgressBar::hidden()
            } else {
                let spinner = ProgressBar::new_spinner();
                spinner.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} {msg}")
                        .unwrap(),
                );
                spinner.enable_steady_tick(std::time::Duration::from_millis(120));
                spinner
            };
            progress.set_message(format!("Fetching transcript for {}...", video_id));

            let result = pipeline.transcript(&video_id, lang.as_deref()).await;
            progress.finish_and_clear();
            let result = result?;

            let content = output::format_transcript(&result, format)?;
            match output {
                Some(path) => {
                    output::save_to_file(&content, &path).await?;
                    println!("Transcript saved to: {}", path.display());
                }
                None => output::print_to_console(&content),
            }
        }
        Commands::Languages { video_id, format } => {
            utils::validate_video_id(&video_id)?;

            let config = Config::load().await?;
            // Metadata-only: the direct source needs no external tool
            let pipeline = TranscriptPipeline::new(config, SourceKind::Direct).await?;

            let summary = pipeline.languages(&video_id).await?;
            output::print_to_console(&output::format_languages(&summary, format)?);
        }
        Commands::Config { show } => {
            let config = Config::load().await?;
            if show {
                config.display();
            } else {
                config.interactive_setup().await?;
            }
        }
    }

    Ok(())
}
