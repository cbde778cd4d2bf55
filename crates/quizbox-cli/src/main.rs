//! quizbox - Quiz result collection server
//!
//! Serves the quiz frontend, accepts result submissions over HTTP and
//! keeps them in an append-only JSON file.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "quizbox")]
#[command(about = "Quiz result collection server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file path (default: ./quizbox.toml or ~/.config/quizbox/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve(cmd::serve::ServeArgs),
    /// Inspect or modify stored results
    Results(cmd::results::ResultsArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    quizbox_core::init_logging(cli.quiet, cli.debug);

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Serve(args) => cmd::serve::run(args, &config),
        Command::Results(args) => cmd::results::run(args, &config),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec![
                "Listen address",
                &format!("{}:{}", config.server.host, config.server.port),
            ]);
            table.add_row(vec![
                "Body limit",
                &format!("{} bytes", config.server.body_limit),
            ]);
            table.add_row(vec![
                "Data directory",
                &config.storage.data_dir.display().to_string(),
            ]);
            table.add_row(vec!["Results file", &config.storage.file_name]);
            table.add_row(vec![
                "Static root",
                &config.assets.root.display().to_string(),
            ]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
