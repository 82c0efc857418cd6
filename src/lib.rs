//! Incremental UTF-8 decoding driven by a byte-class automaton, and a small
//! `file`-style scanner built on top of it.
//!
//! The core is [`utf8::decode_utf8`]: one byte in, the caller's
//! `(state, codepoint)` pair advanced, no allocation. [`utf8::decode`] and
//! [`utf8::validate`] wrap it for whole streams.

pub mod utf8;

use std::{
    ffi::OsString,
    fmt,
    io::Write,
    path::{Path, PathBuf},
};

use clap::Parser;
use itertools::Itertools;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::utf8::{decode_lossy, validate, Utf8Error};

#[derive(Debug, Parser)]
#[command(name = "utf8scan", version, about = "Report whether files are well-formed UTF-8")]
pub struct Args {
    /// Files to scan
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
    /// Also print the code points of each file
    #[arg(long)]
    pub codepoints: bool,
    /// Also print each file with invalid sequences replaced by U+FFFD
    #[arg(long)]
    pub lossy: bool,
    /// Log filter directives, e.g. `debug` or `utf8scan=trace`
    #[arg(long, env = "UTF8SCAN_LOG", default_value = "warn")]
    pub log: String,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Usage(#[from] clap::Error),
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Empty,
    Ascii,
    Utf8 { codepoints: usize },
    Data(Utf8Error),
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Empty => f.write_str("empty"),
            Classification::Ascii => f.write_str("ASCII text"),
            Classification::Utf8 { codepoints } => write!(f, "UTF-8 text, {codepoints} code points"),
            Classification::Data(error) => write!(f, "data ({error})"),
        }
    }
}

pub fn classify(bytes: &[u8]) -> Classification {
    if bytes.is_empty() {
        return Classification::Empty;
    }
    if bytes.is_ascii() {
        return Classification::Ascii;
    }
    match validate(bytes) {
        Ok(codepoints) => Classification::Utf8 { codepoints },
        Err(error) => Classification::Data(error),
    }
}

/// Parses `argv` (without the program name) and scans to stdout.
pub fn scan<I, T>(argv: I) -> Result<(), ScanError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let argv = std::iter::once(OsString::from("utf8scan")).chain(argv.into_iter().map(Into::into));
    let args = Args::try_parse_from(argv)?;
    run(&args, &mut std::io::stdout().lock())
}

/// Scans every file on its own thread and writes the reports in argument
/// order.
pub fn run<W: Write>(args: &Args, out: &mut W) -> Result<(), ScanError> {
    let reports = Mutex::new(Vec::with_capacity(args.files.len()));
    std::thread::scope(|scope| {
        for (index, path) in args.files.iter().enumerate() {
            let reports = &reports;
            scope.spawn(move || {
                let report = report(path, args);
                reports.lock().push((index, report));
            });
        }
    });
    for (_, report) in reports.into_inner().into_iter().sorted_by_key(|(index, _)| *index) {
        out.write_all(report.as_bytes())?;
    }
    Ok(())
}

fn report(path: &Path, args: &Args) -> String {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(error) => {
            warn!(path = %path.display(), %error, "unreadable");
            return format!("{}: {error}\n", path.display());
        }
    };
    let classification = classify(&bytes);
    debug!(path = %path.display(), %classification, len = bytes.len(), "scanned");
    let mut report = format!("{}: {classification}\n", path.display());
    if classification == Classification::Empty {
        return report;
    }
    if args.codepoints {
        let line = decode_lossy(bytes.iter().copied())
            .map(|c| format!("U+{:04X}", c as u32))
            .join(" ");
        report.push_str(&format!("  {line}\n"));
    }
    if args.lossy {
        let text: String = decode_lossy(bytes.iter().copied()).collect();
        report.push_str(&format!("  {text:?}\n"));
    }
    report
}
