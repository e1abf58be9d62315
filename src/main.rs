use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use user_console::app::AppContext;
use user_console::config::Config;
use user_console::console::{Command, Shell};
use user_console::logging::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "user-console", version, about = "Manage user accounts from the terminal")]
struct Cli {
    /// Config file (default: <config dir>/user-console/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the API base URL from the config file
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Interactive console (default)
    Shell,
    /// Sign in and keep the session for later runs
    Login { email: String, password: String },
    /// Forget the saved session
    Logout,
    /// Print the user list
    List { search: Option<String> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }

    let ctx = AppContext::build(config).context("Failed to start")?;
    let mut shell = Shell::new(ctx);

    let command = match cli.command.unwrap_or(CliCommand::Shell) {
        CliCommand::Shell => {
            shell.run().await.context("Console I/O failed")?;
            return Ok(());
        }
        CliCommand::Login { email, password } => Command::Login { email, password },
        CliCommand::Logout => Command::Logout,
        CliCommand::List { search } => Command::List { search },
    };

    let reply = shell.execute(command).await;
    if !reply.text.is_empty() {
        println!("{}", reply.text);
    }
    Ok(())
}
