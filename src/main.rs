//! `transamp` command-line tool.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use transamp::core::{TransAmp, TransAmpOptions, Translation};
use transamp::env::core::LogLevel;
use transamp::env::{EnvConfig, EnvVar};

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// Rewrites HTML into AMP-compatible markup and a generated stylesheet
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input file (reads stdin when omitted or "-")
    #[arg(value_hint = clap::ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Charset of the input document
    #[arg(short, long, default_value = "utf-8")]
    encoding: String,

    /// Write the markup here instead of stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Write the generated stylesheet to this file
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    styles: Option<PathBuf>,

    /// Print {"html": ..., "styles": ...} as JSON
    #[arg(long, conflicts_with = "styles")]
    json: bool,

    /// Prefix for generated class names
    #[arg(long)]
    class_prefix: Option<String>,

    /// Keep the children of removed elements by default
    #[arg(short, long)]
    keep_children: bool,

    /// Tag whose children always survive its removal (repeatable)
    #[arg(long = "keep-children-tag", value_name = "TAG")]
    keep_children_tags: Vec<String>,

    /// Tag whose children are always removed with it (repeatable)
    #[arg(long = "remove-children-tag", value_name = "TAG")]
    remove_children_tags: Vec<String>,

    /// Don't cache probed image dimensions
    #[arg(long)]
    no_dimension_cache: bool,

    /// Image probe timeout in seconds
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=600))]
    timeout: Option<u64>,

    /// User-Agent sent when probing images
    #[arg(short, long)]
    user_agent: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn options(&self, env_config: &EnvConfig) -> TransAmpOptions {
        let mut options = TransAmpOptions::default().with_env(env_config);

        if let Some(class_prefix) = &self.class_prefix {
            options.class_prefix = class_prefix.clone();
        }
        if self.keep_children {
            options.remove_children = false;
        }
        if !self.keep_children_tags.is_empty() {
            options.keep_children_tags = self.keep_children_tags.clone();
        }
        if !self.remove_children_tags.is_empty() {
            options.remove_children_tags = self.remove_children_tags.clone();
        }
        if self.no_dimension_cache {
            options.cache_dimensions = false;
        }
        if let Some(timeout) = self.timeout {
            options.probe_timeout = Some(Duration::from_secs(timeout));
        }
        if let Some(user_agent) = &self.user_agent {
            options.user_agent = Some(user_agent.clone());
        }

        options
    }
}

fn print_error_message(msg: &str) {
    eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(format!("transamp={level}"))
        .unwrap_or_else(|_| EnvFilter::new("transamp=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_input(input: Option<&PathBuf>) -> io::Result<Vec<u8>> {
    match input {
        Some(path) if path.as_os_str() != "-" => fs::read(path),
        _ => {
            let mut data = Vec::new();
            io::stdin().read_to_end(&mut data)?;
            Ok(data)
        }
    }
}

fn write_output(output: Option<&PathBuf>, content: &str) -> io::Result<()> {
    match output {
        Some(path) => fs::write(path, content),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()
        }
    }
}

fn emit(cli: &Cli, translation: &Translation) -> Result<(), Box<dyn std::error::Error>> {
    if cli.json {
        let json = serde_json::to_string(translation)?;
        write_output(cli.output.as_ref(), &json)?;
        return Ok(());
    }

    write_output(cli.output.as_ref(), &translation.html)?;
    if let Some(styles_path) = &cli.styles {
        fs::write(styles_path, &translation.styles)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Subscriber first, so that warnings about ignored variables reach stderr
    let level = match &cli.log_level {
        Some(level) => level.clone(),
        None => LogLevel::get().unwrap_or_else(|_| "warn".to_string()),
    };
    init_logging(&level);
    let env_config = EnvConfig::from_env();

    let data = match read_input(cli.input.as_ref()) {
        Ok(data) => data,
        Err(e) => {
            print_error_message(&format!("Error: could not read input: {e}"));
            process::exit(1);
        }
    };

    let engine = match TransAmp::new(cli.options(&env_config)) {
        Ok(engine) => engine,
        Err(e) => {
            print_error_message(&format!("Error: {e}"));
            process::exit(1);
        }
    };

    let translation = engine.translate_bytes(&data, &cli.encoding).await;

    if let Err(e) = emit(&cli, &translation) {
        print_error_message(&format!("Error: could not write output: {e}"));
        process::exit(1);
    }
}
