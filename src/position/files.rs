use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::prelude::*;

lazy_static! {
    /// Board, side, castling, en passant and both move counters, ignoring whatever surrounds them.
    static ref FEN: Regex = Regex::new(r"(?<fen>[1-8pPrRnNbBqQkK/]+\s+[bw]\s+[KkQq-]+\s+(?:[a-h][36]|-)\s+\d+\s+\d+)").unwrap();
}

/// Extracts the first FEN found in a line of text.
pub fn extract_fen(line: &str) -> Option<&str>
{
    FEN.captures(line).and_then(|caps| caps.name("fen")).map(|m| m.as_str())
}

/// Reads every FEN out of a position file, one per line.
///
/// Lines without a FEN (comments, headers, blank lines) are skipped.
pub fn read_positions(path: &Path) -> Result<Vec<String>>
{
    let contents = std::fs::read_to_string(path).map_err(|e| {
        Error::from(e).chain(Error::new(Kind::IoError, format!("could not read positions from {}", path.display())))
    })?;

    let fens: Vec<String> = contents.lines().filter_map(extract_fen).map(str::to_owned).collect();
    log::debug!("read {} position(s) from {}", fens.len(), path.display());
    Ok(fens)
}
