mod cli;
mod commands;
mod config;
mod paths;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command, OutputFormat};
use config::{Config, CredentialSources};
use statuscake::ProviderConfig;
use std::io;

/// Global context for the application
pub struct Context {
    pub quiet: bool,
    pub output: OutputFormat,
    username: Option<String>,
    api_key: Option<String>,
    api_base: Option<String>,
}

impl Context {
    /// Resolve credentials and build the provider configuration.
    pub fn provider_config(&self) -> Result<ProviderConfig> {
        let config = Config::load()?;
        let credentials =
            CredentialSources::gather(self.username.clone(), self.api_key.clone(), &config)
                .resolve()?;
        Ok(config::provider_config(
            &config,
            credentials,
            self.api_base.as_deref(),
        ))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        quiet: cli.quiet,
        output: cli.output,
        username: cli.username,
        api_key: cli.api_key,
        api_base: cli.api_base,
    };

    match cli.command {
        Command::Uptime(args) => commands::check::run(
            &ctx,
            statuscake::CheckType::Uptime,
            &args.run,
            &args.params(),
        ),
        Command::Ssl(args) => {
            commands::check::run(&ctx, statuscake::CheckType::Ssl, &args.run, &args.params())
        }
        Command::Apply(args) => commands::apply::run(&ctx, &args),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "cakectl", &mut io::stdout());
            Ok(())
        }
    }
}
