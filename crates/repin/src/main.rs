use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use repin_core::{decode_snapshot, fast_css_selector, resolve_snapshot, MatchCounts};
use repin_scanner::{probe_script, WALKER_JS};
use std::fs;

#[derive(Parser)]
#[command(name = "repin", version, about = "Offline selector resolution for captured snapshots")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a snapshot against probe match counts
    Resolve {
        /// Snapshot JSON file (the walker's output)
        snapshot: String,
        /// Match-count JSON file (the probe script's output)
        #[arg(long)]
        counts: Option<String>,
        /// Emit descriptors as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Emit the uniqueness probe script for a snapshot
    Probe {
        /// Snapshot JSON file
        snapshot: String,
    },
    /// Print the DOM fingerprint walker source
    Walker,
    /// Compute fast CSS selectors for a snapshot, skipping validation
    Fast {
        /// Snapshot JSON file
        snapshot: String,
        /// Emit results as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn load_snapshot(path: &str) -> Result<Vec<repin_core::ElementFingerprint>> {
    let payload =
        fs::read_to_string(path).with_context(|| format!("failed to read snapshot {path}"))?;
    let elements =
        decode_snapshot(&payload).with_context(|| format!("failed to decode snapshot {path}"))?;
    tracing::debug!(count = elements.len(), path, "snapshot decoded");
    Ok(elements)
}

fn load_counts(path: Option<&str>) -> Result<MatchCounts> {
    let Some(path) = path else {
        return Ok(MatchCounts::new());
    };
    let payload =
        fs::read_to_string(path).with_context(|| format!("failed to read counts {path}"))?;
    let counts: MatchCounts =
        serde_json::from_str(&payload).with_context(|| format!("failed to parse counts {path}"))?;
    Ok(counts)
}

fn main() -> Result<()> {
    // Log to stderr; stdout carries the command output.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Resolve {
            snapshot,
            counts,
            json,
        } => {
            let elements = load_snapshot(&snapshot)?;
            let counts = load_counts(counts.as_deref())?;
            let descriptors = resolve_snapshot(&elements, &counts);
            if json {
                println!("{}", serde_json::to_string_pretty(&descriptors)?);
            } else {
                for (fp, descriptor) in elements.iter().zip(&descriptors) {
                    let unique = if descriptor.is_unique { "unique" } else { "not unique" };
                    println!(
                        "#{} <{}> {} score={} ({}) -> {}",
                        fp.id,
                        fp.tag,
                        descriptor.strategy.name(),
                        descriptor.score,
                        unique,
                        descriptor.primary.locator,
                    );
                }
            }
        }
        Command::Probe { snapshot } => {
            let elements = load_snapshot(&snapshot)?;
            println!("{}", probe_script(&elements));
        }
        Command::Walker => {
            println!("{WALKER_JS}");
        }
        Command::Fast { snapshot, json } => {
            let elements = load_snapshot(&snapshot)?;
            if json {
                let results: Vec<_> = elements
                    .iter()
                    .map(|fp| {
                        serde_json::json!({
                            "id": fp.id,
                            "css": fast_css_selector(fp),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                for fp in &elements {
                    match fast_css_selector(fp) {
                        Some(css) => println!("#{} <{}> {}", fp.id, fp.tag, css),
                        None => println!("#{} <{}> (no selector)", fp.id, fp.tag),
                    }
                }
            }
        }
    }
    Ok(())
}
