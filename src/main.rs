//! Richnote - edit and inspect rich-text notes from the terminal.
//!
//! # Usage
//!
//! ```bash
//! richnote note.txt
//! richnote --script edits.txt --write note.txt
//! richnote --format json --stats note.txt
//! ```

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;

use richnote::config::{
    ConfigFlags, OutputFormat, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use richnote::editor::SpanEditor;
use richnote::note::{NoteStats, share_text};
use richnote::render::render_ansi;
use richnote::script::{parse_script, run_script};

/// Edit and inspect rich-text notes
#[derive(Parser, Debug)]
#[command(name = "richnote", version, about, long_about = None)]
struct Cli {
    /// Note file holding plain text or stored markup
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Apply the edit commands in this file before output
    #[arg(short, long, value_name = "PATH")]
    script: Option<PathBuf>,

    /// How to print the edited note
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Print word, character and line counts
    #[arg(long)]
    stats: bool,

    /// Note title used by --stats and --share
    #[arg(long, default_value = "")]
    title: String,

    /// Print the title and plain body as shared text
    #[arg(long)]
    share: bool,

    /// Write the persisted form back to FILE
    #[arg(short, long)]
    write: bool,

    /// Write log events to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_logging(effective.log_file.as_ref())?;

    if !cli.file.exists() {
        anyhow::bail!("File not found: {}", cli.file.display());
    }
    let stored = fs::read_to_string(&cli.file)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;

    let mut editor = SpanEditor::new();
    editor.load_stored(&stored);
    tracing::debug!(
        chars = editor.len(),
        spans = editor.spans().len(),
        "loaded note"
    );

    if let Some(script_path) = &cli.script {
        let source = fs::read_to_string(script_path)
            .with_context(|| format!("Failed to read script {}", script_path.display()))?;
        let commands = parse_script(&source)
            .with_context(|| format!("Invalid script {}", script_path.display()))?;
        run_script(&mut editor, &commands);
        tracing::info!(commands = commands.len(), "script applied");
    }

    match effective.format.unwrap_or(OutputFormat::Ansi) {
        OutputFormat::Markup => println!("{}", editor.to_markup()),
        OutputFormat::Plain => println!("{}", editor.plain_text()),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&editor.snapshot()).context("Failed to encode note")?
        ),
        OutputFormat::Ansi => println!("{}", render_ansi(&editor)),
    }

    let plain = editor.plain_text();
    if effective.stats {
        println!();
        println!("{}", NoteStats::compute(&cli.title, &plain));
    }
    if cli.share {
        if let Some(text) = share_text(&cli.title, &plain) {
            println!();
            println!("{text}");
        } else {
            tracing::warn!("nothing to share");
        }
    }

    if cli.write {
        fs::write(&cli.file, editor.persisted_content())
            .with_context(|| format!("Failed to write {}", cli.file.display()))?;
    }

    Ok(())
}
