use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::mpsc;

use crate::compare;
use crate::config::Config;
use crate::coordinator::ChecksumCoordinator;
use crate::models::{Algorithm, CompletedSession, MatchOutcome};
use crate::utils;

#[derive(Debug, Parser)]
#[command(name = "verifile", version, about = "Compute the MD5, SHA1 and SHA256 of a file and check it against an expected digest")]
pub struct Args {
    /// File to hash on startup.
    pub file: Option<PathBuf>,

    /// Expected digest (any of the three algorithms, case-insensitive).
    #[arg(short, long)]
    pub expected: Option<String>,

    /// Read the expected digest from a checksum file (e.g. SHA256SUMS).
    #[arg(long, conflicts_with = "expected")]
    pub expected_file: Option<PathBuf>,

    /// Read buffer size in bytes.
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Config file to use instead of the default location.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Start the window in dark mode.
    #[arg(long)]
    pub dark: bool,

    /// Print the digests to stdout instead of opening a window.
    #[arg(long, requires = "file")]
    pub no_gui: bool,
}

impl Args {
    /// Command-line flags take precedence over the config file.
    pub fn apply_to(&self, config: &mut Config) -> Result<()> {
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        if self.dark {
            config.dark_mode = true;
        }
        config.validate()
    }

    pub fn expected_value(&self) -> Result<String> {
        if let Some(expected) = &self.expected {
            return Ok(expected.clone());
        }
        let Some(path) = &self.expected_file else {
            return Ok(String::new());
        };
        let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        match utils::parse_first_hash_from_text(&text) {
            Some(hash) => Ok(hash),
            None => bail!("no digest found in {}", path.display()),
        }
    }
}

/// Hash `path` and print a report. Returns the match verdict.
pub fn run_headless(coordinator: &ChecksumCoordinator, path: PathBuf, expected: &str) -> Result<MatchOutcome> {
    let (tx, rx) = mpsc::channel();
    let id = coordinator.process_file(path, tx).context("no file to hash")?;
    let session = loop {
        let session = rx.recv().context("checksum session ended without results")?;
        if session.id == id && coordinator.is_current(id) {
            break session;
        }
    };
    let outcome = compare::match_expected(expected, &session.results);
    let stdout = std::io::stdout();
    write_report(&mut stdout.lock(), &session, outcome)?;
    Ok(outcome)
}

pub fn write_report<W: Write>(out: &mut W, session: &CompletedSession, outcome: MatchOutcome) -> Result<()> {
    writeln!(out, "{}", session.path.display())?;
    for algorithm in Algorithm::all() {
        let text = session.results.get(algorithm).map(|r| r.text()).unwrap_or("");
        writeln!(out, "{:<8}{}", algorithm.name(), text)?;
    }
    if outcome != MatchOutcome::EmptyExpected {
        writeln!(out, "{}", outcome)?;
    }
    Ok(())
}
