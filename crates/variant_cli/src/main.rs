//! variant-weld: generate script bindings for built-in value types
//!
//! Environment:
//! - `WELD_LOG` - Log level (default: "info")

use anyhow::{anyhow, bail, Context, Result};
use std::{env, path::PathBuf};
use variant_weld::build::{BindingBuilder, OUTPUT_FILE, SCHEMA_FILE};

fn usage() {
    eprintln!("variant-weld <extract|generate|all|check> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  extract    Read documentation records and write the schema store");
    eprintln!("  generate   Synthesize bindings from an existing schema store");
    eprintln!("  all        Extract and generate in one run");
    eprintln!("  check      Fail if the artifacts on disk are out of date");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <file>   Override document (default: built-in classes)");
    eprintln!("  --docs <dir>      Directory of <Class>.json documentation records");
    eprintln!("  --schema <file>   Schema store path (default: {})", SCHEMA_FILE);
    eprintln!("  --output <file>   Generated source path (default: {})", OUTPUT_FILE);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Extract,
    Generate,
    All,
    Check,
}

#[derive(Debug, PartialEq, Eq)]
struct Options {
    command: Command,
    config: Option<PathBuf>,
    docs: Option<PathBuf>,
    schema: PathBuf,
    output: PathBuf,
}

fn parse_args(mut args: Vec<String>) -> Result<Options> {
    if args.is_empty() {
        bail!("missing command");
    }
    let command = match args.remove(0).as_str() {
        "extract" => Command::Extract,
        "generate" => Command::Generate,
        "all" => Command::All,
        "check" => Command::Check,
        other => bail!("Unknown command: {}", other),
    };

    let mut options = Options {
        command,
        config: None,
        docs: None,
        schema: PathBuf::from(SCHEMA_FILE),
        output: PathBuf::from(OUTPUT_FILE),
    };

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = args
            .get(i + 1)
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("{} requires a value", flag));
        match flag {
            "--config" => options.config = Some(value?),
            "--docs" => options.docs = Some(value?),
            "--schema" => options.schema = value?,
            "--output" => options.output = value?,
            _ => bail!("Unknown flag: {}", flag),
        }
        i += 2;
    }

    if options.command != Command::Generate && options.docs.is_none() {
        bail!("--docs is required for this command");
    }
    Ok(options)
}

fn builder(options: &Options) -> BindingBuilder {
    let mut builder = BindingBuilder::new()
        .schema(&options.schema)
        .output(&options.output);
    if let Some(config) = &options.config {
        builder = builder.config(config);
    }
    if let Some(docs) = &options.docs {
        builder = builder.docs(docs);
    }
    builder
}

fn main() -> Result<()> {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_env("WELD_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        usage();
        return Ok(());
    }

    let options = match parse_args(args) {
        Ok(options) => options,
        Err(err) => {
            usage();
            return Err(err);
        }
    };
    let builder = builder(&options);
    tracing::debug!(
        command = ?options.command,
        config = ?options.config,
        docs = ?options.docs,
        "Starting variant-weld"
    );

    match options.command {
        Command::Extract => {
            let path = builder.write_schema().context("schema extraction failed")?;
            println!("Wrote {}", path.display());
        }
        Command::Generate => {
            let path = builder.generate().context("binding generation failed")?;
            println!("Wrote {}", path.display());
        }
        Command::All => {
            let output = builder.run().context("binding generation failed")?;
            if let Some(schema) = &output.schema {
                println!("Wrote {}", schema.display());
            }
            println!("Wrote {} ({} classes)", output.output.display(), output.classes);
            tracing::info!(classes = output.classes, "Generated bindings");
        }
        Command::Check => {
            let report = builder.check().context("regeneration failed")?;
            if !report.schema_matches {
                tracing::warn!("Out of date: {}", options.schema.display());
            }
            if !report.output_matches {
                tracing::warn!("Out of date: {}", options.output.display());
            }
            if !report.is_clean() {
                bail!("generated artifacts are stale; run `variant-weld all`");
            }
            println!("Artifacts are up to date");
        }
    }
    Ok(())
}
