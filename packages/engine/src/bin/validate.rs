//! CLI binary for validating definitions JSON files.
//!
//! Usage:
//!   validate <file1.json> [file2.json ...]
//!
//! Each file is hydrated into a fresh registry. On success the binary
//! reports the number of definitions per category; on failure it
//! reports the first hydration error and exits non-zero.

use std::collections::BTreeMap;
use std::path::Path;
use std::process;

use tagwerk_engine::{Builder, EngineConfig};

fn report(builder: &Builder, path: &Path) {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for (_, definition) in builder.registry().iter() {
        *counts.entry(definition.category().to_string()).or_default() += 1;
    }
    let summary = counts
        .iter()
        .map(|(category, count)| format!("{category}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");
    eprintln!("OK: {} ({summary})", path.display());
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() {
        eprintln!("Usage: validate <file1.json> [file2.json ...]");
        process::exit(1);
    }

    let mut failed = false;

    for arg in &args {
        let path = Path::new(arg);
        // Fresh registry per file so duplicate detection stays per-set.
        let mut builder = Builder::new(EngineConfig::default());
        match builder.hydrate_file(path) {
            Ok(count) => {
                tracing::debug!(path = %path.display(), count, "Hydrated definitions file");
                report(&builder, path);
            }
            Err(e) => {
                eprintln!("FAIL: {}: {e}", path.display());
                failed = true;
            }
        }
    }

    if failed {
        process::exit(1);
    }
}
