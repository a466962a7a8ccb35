use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use biaslens::api::{BiasApi, HttpBiasApi};
use biaslens::dispatcher::{Dispatcher, Outcome};
use biaslens::environment::Settings;
use biaslens::logging;
use biaslens::server;
use biaslens::ui::{render_page, TAB_ANALYZE_TEXT, TAB_COMPARE};

#[derive(Parser)]
#[command(name = "biaslens", version, about = "Analyze news articles for bias")]
struct Cli {
    /// Base URL of the analysis backend (defaults to BIASLENS_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze the article at a URL.
    AnalyzeUrl {
        url: String,
        /// Write the rendered page here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Analyze pasted text, given inline or read from a file.
    AnalyzeText {
        text: Option<String>,
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compare an article with coverage from other sources.
    Compare {
        url: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Look up the credibility of an article's source.
    SourceCheck { url: String },
    /// Serve the analyzer as a web page.
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env();
    logging::configure_logging(&settings.log_dir);

    let api_url = cli.api_url.unwrap_or(settings.api_url);
    let api = HttpBiasApi::new(&api_url)
        .with_context(|| format!("Invalid backend URL: {}", api_url))?;

    match cli.command {
        Command::AnalyzeUrl { url, output } => {
            let dispatcher = Dispatcher::new(api);
            let outcome = dispatcher.analyze_url(&url).await;
            finish(&dispatcher, outcome, output.as_ref())
        }
        Command::AnalyzeText { text, file, output } => {
            let text = match (text, file) {
                (_, Some(path)) => fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (Some(text), None) => text,
                (None, None) => String::new(),
            };
            let dispatcher = Dispatcher::new(api);
            dispatcher.activate_tab(TAB_ANALYZE_TEXT);
            let outcome = dispatcher.analyze_text(&text).await;
            finish(&dispatcher, outcome, output.as_ref())
        }
        Command::Compare { url, output } => {
            let dispatcher = Dispatcher::new(api);
            dispatcher.activate_tab(TAB_COMPARE);
            let outcome = dispatcher.compare_articles(&url).await;
            finish(&dispatcher, outcome, output.as_ref())
        }
        Command::SourceCheck { url } => source_check(&api, &url).await,
        Command::Serve { port } => {
            let port = port.unwrap_or(settings.port);
            println!("Using backend at {}", api.base_url().as_str().bright_yellow());
            server::serve_loop(Arc::new(api), port).await
        }
    }
}

/// Prints alerts, writes the rendered page, and exits non-zero when the
/// action did not produce results.
fn finish<A: BiasApi>(
    dispatcher: &Dispatcher<A>,
    outcome: Outcome,
    output: Option<&PathBuf>,
) -> Result<()> {
    let (alerts, html) = dispatcher.with_ui(|ui| (ui.take_alerts(), render_page(ui)));
    for alert in &alerts {
        eprintln!("{} {}", "!!".bright_red(), alert);
    }
    if outcome == Outcome::Fallback {
        eprintln!(
            "{}",
            "No automatic comparison available; the page lists manual search links.".yellow()
        );
    }

    let html = html.context("Failed to render page")?;
    match output {
        Some(path) => {
            fs::write(path, html)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display().to_string().bright_green());
        }
        None => println!("{}", html),
    }

    if matches!(outcome, Outcome::Failed | Outcome::Rejected) {
        process::exit(1);
    }
    Ok(())
}

async fn source_check(api: &HttpBiasApi, url: &str) -> Result<()> {
    let url = url.trim();
    if url.is_empty() {
        eprintln!("{} Please enter a URL", "!!".bright_red());
        process::exit(1);
    }

    match api.check_source(url).await {
        Ok(check) => {
            let credibility = check.credibility.unwrap_or_else(|| "Unknown".to_string());
            let colored_credibility = match credibility.to_lowercase().as_str() {
                "high" => credibility.bright_green(),
                "medium" => credibility.bright_yellow(),
                "low" => credibility.bright_red(),
                _ => credibility.dimmed(),
            };
            println!(
                "{}: {}",
                "Source".bright_blue(),
                check.source.unwrap_or_else(|| "Unknown".to_string())
            );
            println!("{}: {}", "Credibility".bright_blue(), colored_credibility);
            Ok(())
        }
        Err(err) => {
            eprintln!("{} Error checking source: {}", "!!".bright_red(), err);
            process::exit(1);
        }
    }
}
