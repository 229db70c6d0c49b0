//! Numbered per-frame output files: `{dir}/{n}.{ext}`, where `n` is the
//! number of files with that extension already in `dir`.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use lp_encode::{write_coe, write_csv, write_traj};
use tracing::debug;

use crate::config::OutputFormat;
use crate::pipeline::FrameOutput;

/// Next free `{n}.{ext}` path in `dir`, creating `dir` if missing. Starts at
/// the count of existing `.ext` files and skips forward past gaps that
/// would otherwise collide.
pub fn next_numbered_path(dir: &Path, ext: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let mut n = 0usize;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == ext) {
            n += 1;
        }
    }
    loop {
        let candidate = dir.join(format!("{n}.{ext}"));
        if !candidate.exists() {
            return Ok(candidate);
        }
        n += 1;
    }
}

/// The `{n}.{ext}` files in `dir`, ordered by `n`. Files whose stem is not
/// a number are skipped.
pub fn numbered_files(dir: &Path, ext: &str) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().is_none_or(|e| e != ext) {
            continue;
        }
        let Some(n) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<u64>().ok())
        else {
            debug!(path = %path.display(), "skipping unnumbered file");
            continue;
        };
        found.push((n, path));
    }
    found.sort_unstable_by_key(|(n, _)| *n);
    Ok(found.into_iter().map(|(_, p)| p).collect())
}

/// Writes one of the text formats for `frame`. PNG is rendered by the
/// caller. Returns the written path.
pub fn write_text_output(
    dir: &Path,
    format: OutputFormat,
    frame: &FrameOutput,
) -> io::Result<PathBuf> {
    let path = next_numbered_path(dir, format.extension())?;
    let w = BufWriter::new(File::create(&path)?);
    match format {
        OutputFormat::Csv => write_csv(w, &frame.colored)?,
        OutputFormat::Coe => write_coe(w, &frame.commands)?,
        OutputFormat::Traj => write_traj(w, &frame.commands)?,
        OutputFormat::Png => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "png is not a text output",
            ));
        }
    }
    debug!(path = %path.display(), %format, "wrote frame output");
    Ok(path)
}
