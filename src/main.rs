//! bespoke-docs: generate JSDoc scaffolding from the command line.
//!
//! Every subcommand reads a file (or stdin with `-`), edits it in memory
//! and prints the result to stdout. Logs go to stderr.

use anyhow::{Context, Result};
use bespoke_docs::buffer::{scope_for_path, MemoryBuffer};
use bespoke_docs::{edit, DocBlockCommand, Edit, Options, TextBuffer};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "bespoke-docs",
    about = "Generate JSDoc comment scaffolding for JavaScript and CoffeeScript"
)]
struct Cli {
    /// JSON settings file
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Scope name, e.g. source.coffee. Defaults to one derived from the file extension.
    #[arg(long, global = true)]
    scope: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Expand the `/**` opener at a position into a doc block
    Generate {
        /// Input file, or - for stdin
        file: String,

        /// 1-based line of the opener
        #[arg(long)]
        line: usize,

        /// 0-based column of the cursor. Defaults to the end of the line.
        #[arg(long)]
        column: Option<usize>,

        /// Produce a single-line `/** ... */` comment
        #[arg(long)]
        inline: bool,

        /// Print only the inserted text instead of the whole file
        #[arg(long)]
        snippet: bool,
    },
    /// Turn `[bracketed]` placeholders in a doc block back into tab-stops
    Reparse {
        file: String,
        #[arg(long)]
        line: usize,
    },
    /// Join a line with the next one, dropping the comment leader
    Join {
        file: String,
        #[arg(long)]
        line: usize,
    },
    /// Re-wrap the description text of a doc block
    Wrap {
        file: String,
        #[arg(long)]
        line: usize,
        #[arg(long, default_value_t = 80)]
        width: usize,
        #[arg(long, default_value_t = 4)]
        tab_size: usize,
    },
}

impl Command {
    fn file(&self) -> &str {
        match self {
            Command::Generate { file, .. }
            | Command::Reparse { file, .. }
            | Command::Join { file, .. }
            | Command::Wrap { file, .. } => file,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let opts = match &cli.settings {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };

    let path = cli.command.file();
    let text = read_input(path)?;
    let scope = cli.scope.clone().unwrap_or_else(|| scope_for_path(path));
    info!(path, scope = %scope, "loaded input");
    let mut buffer = MemoryBuffer::new(text, scope);

    match &cli.command {
        Command::Generate {
            line,
            column,
            inline,
            snippet,
            ..
        } => {
            let point = buffer.point_at(*line, *column);
            let edit = DocBlockCommand::new(&opts)
                .run(&mut buffer, point, *inline)
                .with_context(|| format!("failed to generate a doc block at line {}", line))?;
            if *snippet {
                print!("{}", edit.text);
                return Ok(());
            }
        }
        Command::Reparse { line, .. } => {
            let point = buffer.point_at(*line, None);
            let edit = edit::reparse(&buffer, point);
            apply_or_warn(&mut buffer, edit, "no doc block found", *line);
        }
        Command::Join { line, .. } => {
            let point = buffer.point_at(*line, None);
            let edit = edit::join_lines(&buffer, point);
            apply_or_warn(&mut buffer, edit, "nothing to join", *line);
        }
        Command::Wrap {
            line,
            width,
            tab_size,
            ..
        } => {
            let point = buffer.point_at(*line, None);
            let edit = edit::wrap_lines(&buffer, point, &opts, *width, *tab_size);
            apply_or_warn(&mut buffer, edit, "no description to wrap", *line);
        }
    }

    print!("{}", buffer.text());
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("failed to read stdin")?;
        return Ok(input);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path))
}

fn apply_or_warn(buffer: &mut MemoryBuffer, edit: Option<Edit>, reason: &str, line: usize) {
    match edit {
        Some(edit) => buffer.apply(&edit),
        None => warn!(line, "{}, leaving the file unchanged", reason),
    }
}
