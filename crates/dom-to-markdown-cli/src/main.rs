//! Print the Markdown rendition of a web page.

mod error;
mod source;

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dom_to_markdown::{ConversionOptions, convert_html};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use crate::error::CliError;
use crate::source::Source;

const DEFAULT_USER_AGENT: &str = concat!("dom-to-markdown/", env!("CARGO_PKG_VERSION"));

/// Convert an HTML page to Markdown
#[derive(Parser, Debug)]
#[command(name = "dom-to-markdown")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// URL (http, https or file) or path of the page; stdin when omitted or `-`
    input: Option<String>,

    /// Write the Markdown to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Drop images instead of rendering `![alt](src)`
    #[arg(long)]
    no_images: bool,

    /// Render link text without link syntax
    #[arg(long)]
    no_links: bool,

    /// Skip elements matching this selector (repeatable)
    #[arg(long, value_name = "SELECTOR")]
    exclude: Vec<String>,

    /// User-Agent header for HTTP requests
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> ConversionOptions {
        let mut options = ConversionOptions::default()
            .with_images(!self.no_images)
            .with_links(!self.no_links);
        options.exclude.extend(self.exclude.iter().cloned());
        options
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let source = Source::resolve(cli.input.as_deref())?;
    debug!(?source, "loading input");
    let html = source.load(&cli.user_agent)?;

    let mut markdown = convert_html(&html, &cli.options())?;
    markdown.push('\n');

    match &cli.output {
        Some(path) => fs::write(path, markdown).map_err(CliError::Write),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(markdown.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(CliError::Write)
        }
    }
}
