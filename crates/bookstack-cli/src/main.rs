//! BookStack CLI - search and retrieve documentation from the terminal
//!
//! Configuration comes from the `BOOKSTACK_URL`, `BOOKSTACK_TOKEN_ID` and
//! `BOOKSTACK_TOKEN_SECRET` environment variables. With `--events`, every
//! event the tool emits is printed as one JSON line on stderr.

use async_trait::async_trait;
use bookstack::{
    Config, Event, EventSink, NullSink, PageFormat, Tool, DEFAULT_MAX_PAGES, TOOL_LLMTXT,
};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// BookStack - AI-friendly documentation search and retrieval tool
#[derive(Parser, Debug)]
#[command(name = "bookstack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print full help with examples (llmtxt)
    #[arg(long)]
    llmtxt: bool,

    /// Print emitted events as JSON lines on stderr
    #[arg(long, global = true)]
    events: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search BookStack and retrieve full content of matching pages
    Search {
        /// Free-text search term
        query: String,

        /// Maximum number of pages to fully retrieve
        #[arg(long, short, default_value_t = DEFAULT_MAX_PAGES)]
        max_pages: usize,
    },
    /// Retrieve a single page by id
    Page {
        /// Id of the page
        page_id: u64,

        /// Output format: markdown, text, or html
        #[arg(long, short, default_value = "markdown")]
        format: String,
    },
}

/// Sink that prints each event as a JSON line on stderr
struct StderrSink;

#[async_trait]
impl EventSink for StderrSink {
    async fn emit(&self, event: Event) {
        if let Ok(line) = serde_json::to_string(&event) {
            eprintln!("{line}");
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    // Handle --llmtxt flag
    if cli.llmtxt {
        writeln_safe(TOOL_LLMTXT);
        std::process::exit(0);
    }

    let Some(command) = cli.command else {
        eprintln!("Usage: bookstack search <QUERY>");
        eprintln!("   or: bookstack page <PAGE_ID>");
        eprintln!("   or: bookstack --help");
        std::process::exit(1);
    };

    // Configuration problems fail before any network call
    let config = Config::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(2);
    });
    let tool = Tool::new(config).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(2);
    });

    let stderr_sink = StderrSink;
    let null_sink = NullSink;
    let sink: &dyn EventSink = if cli.events { &stderr_sink } else { &null_sink };

    let result = match command {
        Commands::Search { query, max_pages } => tool.search(&query, max_pages, sink).await,
        Commands::Page { page_id, format } => {
            let format = PageFormat::from_str(&format).unwrap_or_else(|e| {
                eprintln!("Error: {e}");
                std::process::exit(2);
            });
            tool.get_page(page_id, format, sink).await
        }
    };

    match result {
        Ok(output) => writeln_safe(&output),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
