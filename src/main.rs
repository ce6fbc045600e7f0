use anyhow::Result;
use clap::{CommandFactory, Parser};
use kikitori::app::run_file_command;
use kikitori::cli::{Cli, Commands};
use kikitori::config::Config;
use kikitori::language::Language;
use owo_colors::OwoColorize;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::File {
            path,
            chunk_size,
            output,
            no_save,
        } => {
            run_file_command(
                config,
                &path,
                chunk_size,
                cli.language.as_deref(),
                output,
                no_save,
                cli.quiet,
                cli.verbose,
            )
            .await?;
        }
        Commands::Live {
            device,
            timeout,
            phrase_limit,
            output,
            no_save,
        } => {
            #[cfg(feature = "mic")]
            {
                kikitori::app::run_live_command(
                    config,
                    device,
                    timeout,
                    phrase_limit,
                    cli.language.as_deref(),
                    output,
                    no_save,
                    cli.quiet,
                    cli.verbose,
                )
                .await?;
            }
            #[cfg(not(feature = "mic"))]
            {
                let _ = (device, timeout, phrase_limit, output, no_save);
                anyhow::bail!("this build has no microphone support (enable the 'mic' feature)");
            }
        }
        Commands::Languages => {
            list_languages();
        }
        #[cfg(feature = "mic")]
        Commands::Devices => {
            list_audio_devices()?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "kikitori", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Load config from an explicit path (must exist) or the default location
/// (falls back to defaults when missing), then apply env overrides.
fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(p) => Config::load(p)?,
        None => Config::load_or_default(&Config::default_path())?,
    };
    Ok(config.with_env_overrides())
}

fn list_languages() {
    println!("Supported languages:");
    for language in Language::ALL {
        println!("  {:<10} {}", language.name(), language.code().dimmed());
    }
}

#[cfg(feature = "mic")]
fn list_audio_devices() -> Result<()> {
    let devices = kikitori::audio::capture::list_devices()?;

    if devices.is_empty() {
        println!("No audio input devices found.");
    } else {
        println!("Available audio input devices:");
        for device in devices {
            println!("  {}", device);
        }
    }

    Ok(())
}
