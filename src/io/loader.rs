//! Session table loader
//!
//! Reads the spreadsheet export of session results: one row per session, a
//! `Date` column and one column per player. A blank or marker cell means the
//! player sat that session out.

use crate::error::{RatingError, Result};
use crate::types::{Cell, PlayerName, Session};
use anyhow::Context;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

const ABSENT_MARKERS: &[&str] = &["-", "na", "n/a", "nan", "null", "none"];

/// Loader behaviour switches
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// Drop rows with fewer than two results instead of passing them on
    pub skip_sparse_rows: bool,
}

/// Sessions in file order plus every player column of the table
#[derive(Debug, Clone)]
pub struct SessionTable {
    pub players: Vec<PlayerName>,
    pub sessions: Vec<Session>,
}

/// Read and parse a session CSV file
pub fn load_sessions(path: &Path, options: &LoaderOptions) -> Result<SessionTable> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file {}", path.display()))?;

    let table = parse_sessions(&raw, options)?;
    info!(
        "Loaded {} sessions for {} players from {}",
        table.sessions.len(),
        table.players.len(),
        path.display()
    );
    Ok(table)
}

/// Parse session CSV text
pub fn parse_sessions(raw: &str, options: &LoaderOptions) -> Result<SessionTable> {
    let mut records = read_records(raw.trim_start_matches('\u{feff}'))?.into_iter();

    // Spreadsheet exports may carry junk rows above the real header
    let (header_line, header) = records
        .by_ref()
        .find(|(_, cells)| cells.iter().any(|cell| cell.trim().eq_ignore_ascii_case("date")))
        .ok_or_else(|| RatingError::InvalidInput {
            reason: "no header row with a Date column".to_string(),
        })?;
    debug!("Header found on line {}", header_line);

    let date_column = header
        .iter()
        .position(|cell| cell.trim().eq_ignore_ascii_case("date"))
        .unwrap_or_default();

    let mut columns: Vec<(usize, PlayerName)> = Vec::new();
    let mut seen = HashSet::new();
    for (i, name) in header.iter().enumerate() {
        let name = name.trim();
        if i == date_column || name.is_empty() || name.starts_with("Unnamed") {
            continue;
        }
        if !seen.insert(name.to_string()) {
            return Err(RatingError::InvalidInput {
                reason: format!("player column {} appears more than once", name),
            }
            .into());
        }
        columns.push((i, name.to_string()));
    }

    if columns.is_empty() {
        return Err(RatingError::InvalidInput {
            reason: "no player columns in header".to_string(),
        }
        .into());
    }

    let mut sessions = Vec::new();
    for (line, record) in records {
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let raw_date = record.get(date_column).map(String::as_str).unwrap_or("");
        let Some(date) = parse_date(raw_date) else {
            warn!("Skipping line {}: no usable date ({:?})", line, raw_date.trim());
            continue;
        };

        let cells: Vec<(PlayerName, Cell)> = columns
            .iter()
            .map(|(i, player)| {
                let raw_cell = record.get(*i).map(String::as_str).unwrap_or("");
                let cell = parse_cell(raw_cell).unwrap_or_else(|reason| {
                    warn!("Line {}: ignoring {} result: {}", line, player, reason);
                    Cell::Absent
                });
                (player.clone(), cell)
            })
            .collect();

        let present = cells.iter().filter(|(_, cell)| cell.is_present()).count();
        if options.skip_sparse_rows && present < 2 {
            warn!(
                "Skipping line {} ({}): only {} result(s) recorded",
                line, date, present
            );
            continue;
        }

        sessions.push(Session::from_cells(sessions.len(), Some(date), cells));
    }

    Ok(SessionTable {
        players: columns.into_iter().map(|(_, player)| player).collect(),
        sessions,
    })
}

/// Split CSV text into records, each tagged with the line it starts on.
///
/// Double-quoted fields may contain commas, doubled quotes and line breaks.
/// A quote still open at the end of the input is an error.
pub fn read_records(raw: &str) -> Result<Vec<(usize, Vec<String>)>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' if in_quotes => {
                field.push('\n');
                line += 1;
            }
            '\n' => {
                fields.push(std::mem::take(&mut field));
                records.push((record_line, std::mem::take(&mut fields)));
                line += 1;
                record_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(RatingError::InvalidInput {
            reason: format!(
                "unterminated quoted field in record starting on line {}",
                record_line
            ),
        }
        .into());
    }

    // Last record without a trailing newline
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        records.push((record_line, fields));
    }

    Ok(records)
}

/// Interpret a player cell.
///
/// Blank cells and missing-value markers are [`Cell::Absent`]; anything that
/// is neither a marker nor a finite number is an error.
pub fn parse_cell(raw: &str) -> std::result::Result<Cell, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || ABSENT_MARKERS
            .iter()
            .any(|marker| trimmed.eq_ignore_ascii_case(marker))
    {
        return Ok(Cell::Absent);
    }

    // Accounting style: (25) is -25
    let (negated, body) = match trimmed.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };

    let cleaned: String = body
        .chars()
        .filter(|c| !matches!(*c, '$' | ',' | ' '))
        .collect();
    let value: f64 = cleaned
        .parse()
        .map_err(|_| format!("{:?} is not a number", trimmed))?;

    if !value.is_finite() {
        return Err(format!("{:?} is not a finite number", trimmed));
    }

    Ok(Cell::Present(if negated { -value } else { value }))
}

/// Parse a session date in one of the accepted formats.
///
/// The separator picks the layout; slash dates are month-first unless they
/// lead with a four-digit year.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    // Drop a trailing time component, e.g. "2024-01-05 00:00:00"
    let token = raw.split_whitespace().next()?;

    let format = if token.contains('-') {
        "%Y-%m-%d"
    } else if token.contains('.') {
        "%d.%m.%Y"
    } else if token.contains('/') {
        let parts: Vec<&str> = token.split('/').collect();
        match (parts.first().map(|p| p.len()), parts.last().map(|p| p.len())) {
            (Some(4), _) => "%Y/%m/%d",
            (_, Some(2)) => "%m/%d/%y",
            _ => "%m/%d/%Y",
        }
    } else {
        return None;
    };

    NaiveDate::parse_from_str(token, format).ok()
}
