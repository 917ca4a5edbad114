use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::Context;
use clap::Parser;
use reqwest::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vn_core::{Settings, VoiceConfig, DEFAULT_SPEECH_LANGUAGE, DEFAULT_TRANSLATION_LANGUAGE};
use vn_voice::VoiceServices;
use vn_web::AppState;

#[derive(Parser, Debug)]
#[command(author, version, about = "News sentiment reports with translated audio summaries", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind, overrides VN_BIND
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Build the news report for a company and print it as JSON
    Fetch {
        company: String,
        #[arg(long)]
        max_articles: Option<usize>,
    },
    /// Translate text and print the result
    Translate {
        text: String,
        #[arg(long = "to", default_value = DEFAULT_TRANSLATION_LANGUAGE)]
        target_language: String,
    },
    /// Synthesize speech and print the path of the audio file
    Speak {
        text: String,
        #[arg(long, default_value = DEFAULT_SPEECH_LANGUAGE)]
        lang: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Fetch, translate the final analysis and read it out
    Report {
        company: String,
        #[arg(long = "to", default_value = DEFAULT_TRANSLATION_LANGUAGE)]
        target_language: String,
        #[arg(long, default_value = DEFAULT_SPEECH_LANGUAGE)]
        lang: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn build_client(settings: &Settings) -> anyhow::Result<Arc<Client>> {
    let client = Client::builder()
        .user_agent(settings.user_agent.clone())
        .build()
        .context("failed to build HTTP client")?;
    Ok(Arc::new(client))
}

fn build_pipeline(settings: &Settings, client: Arc<Client>) -> anyhow::Result<vn_scrappers::NewsPipeline> {
    let models = vn_inference::create_models(settings, client.clone())?;
    info!("🧠 Models ready ({} / {})", models.generative.name(), models.chat.name());
    Ok(vn_scrappers::build_pipeline(settings, client, &models)?)
}

async fn speak(voice: &VoiceServices, text: &str, lang: &str, out: Option<&Path>) -> anyhow::Result<PathBuf> {
    let audio = voice.speech.synthesize(text, &VoiceConfig::for_language(lang)).await?;
    let dir = out.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir);
    let path = audio.write_transient(&dir).await?;
    info!("🔊 Wrote {} bytes of audio", audio.len());
    Ok(path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::from_env()?;
    let client = build_client(&settings)?;

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                settings.bind = bind;
            }
            let pipeline = build_pipeline(&settings, client.clone())?;
            let voice = vn_voice::create_voice_services(&settings, client)?;
            vn_web::serve(settings.bind, AppState::new(pipeline, voice)).await?;
        }
        Commands::Fetch { company, max_articles } => {
            if let Some(max_articles) = max_articles {
                settings.max_articles = max_articles;
            }
            let pipeline = build_pipeline(&settings, client)?;
            let report = pipeline.run(&company).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Translate { text, target_language } => {
            let voice = vn_voice::create_voice_services(&settings, client)?;
            println!("{}", voice.translator.translate(&text, &target_language).await?);
        }
        Commands::Speak { text, lang, out } => {
            let voice = vn_voice::create_voice_services(&settings, client)?;
            let path = speak(&voice, &text, &lang, out.as_deref()).await?;
            println!("{}", path.display());
        }
        Commands::Report { company, target_language, lang, out } => {
            let pipeline = build_pipeline(&settings, client.clone())?;
            let voice = vn_voice::create_voice_services(&settings, client)?;

            info!("🦗 Building report for {}", company);
            let report = pipeline.run(&company).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);

            let translated = voice
                .translator
                .translate(&report.final_summary, &target_language)
                .await?;
            println!("\n{}", translated);

            let path = speak(&voice, &translated, &lang, out.as_deref()).await?;
            println!("\n🔊 {}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_every_subcommand_has_help_text() {
        let cli = Cli::command();
        for sub in cli.get_subcommands() {
            assert!(sub.get_about().is_some(), "{} has no description", sub.get_name());
        }
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["vn", "report", "Acme"]);
        match cli.command {
            Commands::Report { company, target_language, lang, out } => {
                assert_eq!(company, "Acme");
                assert_eq!(target_language, "hi");
                assert_eq!(lang, "hi-IN");
                assert!(out.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_serve_bind_override() {
        let cli = Cli::parse_from(["vn", "serve", "--bind", "0.0.0.0:9000"]);
        assert!(matches!(cli.command, Commands::Serve { bind: Some(addr) } if addr.port() == 9000));
    }
}
