use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;

mod app;
mod chat;
mod config;
mod gemini;
mod handler;
mod tui;
mod ui;

use app::App;
use config::Config;
use gemini::GeminiClient;

#[derive(Parser)]
#[command(name = "chat-ai")]
#[command(about = "Terminal chat interface for the Google Gemini API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question and print the answer (no TUI)
    Ask {
        /// Your question
        question: String,
        /// Gemini model to use
        #[arg(short, long)]
        model: Option<String>,
    },
    /// List available Gemini models
    Models,
    /// Store the API key in the config file
    SetKey {
        /// The Gemini API key
        key: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_else(|_| Config::new());

    match cli.command {
        Some(Commands::SetKey { key }) => {
            let mut config = config;
            config.api_key = Some(key);
            config.save()?;
            println!("{}", "API key saved.".green());
            Ok(())
        }
        None => {
            let api_key = require_api_key(&config);
            run_tui(&api_key, &config).await
        }
        Some(Commands::Ask { question, model }) => {
            let api_key = require_api_key(&config);
            let model = model.unwrap_or_else(|| config.model());
            ask_once(&api_key, &model, &question).await
        }
        Some(Commands::Models) => {
            let api_key = require_api_key(&config);
            list_models(&api_key).await
        }
    }
}

fn require_api_key(config: &Config) -> String {
    config.resolve_api_key().unwrap_or_else(|| {
        eprintln!("{}", "No Gemini API key configured.".red());
        eprintln!(
            "Set the {} environment variable, or run: {}",
            "GEMINI_API_KEY".bold(),
            "chat-ai set-key <KEY>".bold()
        );
        std::process::exit(1);
    })
}

async fn run_tui(api_key: &str, config: &Config) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(api_key, config);

    while !app.should_quit {
        // Settle a finished answer before drawing so the transcript and the
        // thinking indicator never show a stale state
        app.poll_answer();

        terminal.draw(|frame| ui::render(&mut app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(&mut app, event)?,
            None => break,
        }
    }

    tui::restore()?;
    Ok(())
}

async fn ask_once(api_key: &str, model: &str, question: &str) -> Result<()> {
    let client = GeminiClient::new(api_key);

    println!("🤖 Asking {}...\n", model.bold().magenta());

    match client.generate(model, question).await {
        Ok(answer) => {
            println!("{}", "Answer:".bold().green());
            println!("{}", answer);
        }
        Err(e) => {
            println!("{}", chat::FALLBACK_ANSWER.yellow());
            eprintln!("{}: {}", "Error".red(), e);
        }
    }

    Ok(())
}

async fn list_models(api_key: &str) -> Result<()> {
    let client = GeminiClient::new(api_key);

    println!("\n{}", "🤖 Available Gemini Models".bold().blue());
    println!("{}", "=".repeat(30).dimmed());

    match client.list_models().await {
        Ok(models) => {
            for model in models {
                println!("  • {}", model.green());
            }
        }
        Err(e) => {
            eprintln!("{}: {}", "Error listing models".red(), e);
        }
    }

    Ok(())
}
