use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use satang_core::{CanonicalOptionSet, FieldKind};
use satang_extract::{extract_balance, CommandParser};
use satang_resolve::OptionMatcher;

#[derive(Parser)]
#[command(name = "satang", version, about = "Resolve free-text ledger entries into canonical dropdown fields")]
struct Cli {
    /// Path to a TOML option-set file; the built-in set is used when omitted.
    #[arg(long, global = true)]
    options: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a single quick-entry line, e.g. `debit 2000 salaries cash`.
    Parse {
        text: Vec<String>,
    },
    /// Extract the balance from OCR text (file path, or `-` for stdin).
    Balance {
        input: String,
    },
    /// Match free text against one canonical field.
    Match {
        field: Field,
        text: Vec<String>,
        /// Advisory comment supplying extra context, e.g. a receipt note.
        #[arg(long)]
        comment: Option<String>,
    },
    /// Print the active canonical option set.
    Options,
}

#[derive(Clone, Copy, ValueEnum)]
enum Field {
    Property,
    Category,
    Payment,
}

impl From<Field> for FieldKind {
    fn from(field: Field) -> Self {
        match field {
            Field::Property => FieldKind::Property,
            Field::Category => FieldKind::Category,
            Field::Payment => FieldKind::Payment,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let options = load_options(cli.options.as_deref())?;

    match cli.command {
        Command::Parse { text } => {
            let line = text.join(" ");
            let parser = CommandParser::new(&options);
            let parsed = parser.parse(&line);
            if !parsed.accepted {
                tracing::warn!(
                    confidence = parsed.confidence,
                    "quick entry rejected: {}",
                    parsed.reasons.join("; ")
                );
            }
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        Command::Balance { input } => {
            let text = read_input(&input)?;
            let report = extract_balance(&text);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Match { field, text, comment } => {
            let matcher = OptionMatcher::new(&options);
            let result = matcher.resolve(field.into(), &text.join(" "), comment.as_deref());
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Options => {
            println!("{}", serde_json::to_string_pretty(&options)?);
        }
    }

    Ok(())
}

fn load_options(path: Option<&std::path::Path>) -> Result<CanonicalOptionSet> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading option set {}", path.display()))?;
            let options = CanonicalOptionSet::from_toml(&content)
                .with_context(|| format!("parsing option set {}", path.display()))?;
            tracing::info!("loaded option set from {}", path.display());
            Ok(options)
        }
        None => Ok(CanonicalOptionSet::builtin()),
    }
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading OCR text from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading OCR text {input}"))
    }
}
