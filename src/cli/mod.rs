//! CLI module for potd
//!
//! Without a subcommand the GUI is started; subcommands run headless.

mod commands;
mod output;

use clap::{Parser, Subcommand};

pub use output::OutputFormat;

/// potd - picture of the day viewer
#[derive(Parser, Debug)]
#[command(name = "potd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[command(flatten)]
    pub output: OutputOptions,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output formatting options
#[derive(Parser, Debug, Clone)]
pub struct OutputOptions {
    /// Output in JSON format (for machine parsing)
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl OutputOptions {
    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the picture once and print it
    Fetch(commands::fetch::FetchArgs),

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: commands::config::ConfigCommands,
    },
}

/// Run a headless command
pub async fn run(command: Commands, output: &OutputOptions) -> anyhow::Result<()> {
    let format = output.format();
    let quiet = output.quiet;

    match command {
        Commands::Fetch(args) => commands::fetch::run(args, format, quiet).await,
        Commands::Config { command } => commands::config::run(command, format, quiet).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_gui() {
        let cli = Cli::try_parse_from(["potd"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_fetch_args() {
        let cli = Cli::try_parse_from(["potd", "fetch", "--url", "http://x/p", "--retries", "2", "--json"]).unwrap();
        assert!(cli.output.json);
        match cli.command {
            Some(Commands::Fetch(args)) => {
                assert_eq!(args.url.as_deref(), Some("http://x/p"));
                assert_eq!(args.retries, 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_config_set_args() {
        let cli = Cli::try_parse_from(["potd", "config", "set", "fetch.retry_limit", "5"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                command: commands::config::ConfigCommands::Set { .. }
            })
        ));
    }
}
