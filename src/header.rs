//! TAMIS report preamble scanning.
//!
//! Locates the column header row and the field delimiter declared in the
//! free-form preamble that precedes the tabular section of a report. The
//! preamble length varies between reports, so both scans search for content
//! markers rather than fixed line numbers.

use crate::constants::{DELIMITER_MARKER, HEADER_MARKER, TAB_TOKEN};
use crate::error::{Result, TamisError};
use crate::models::ReportLayout;
use regex::Regex;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static DELIMITER_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{}\s*(\S+)", regex::escape(DELIMITER_MARKER)))
        .expect("delimiter pattern is valid")
});

/// Locate the header row and delimiter of a report
///
/// When `delimiter_override` is set the preamble delimiter scan is skipped.
pub fn locate_report(file_path: &Path, delimiter_override: Option<u8>) -> Result<ReportLayout> {
    let header_row = find_header_row(file_path)?;
    let delimiter = match delimiter_override {
        Some(delimiter) => delimiter,
        None => find_delimiter(file_path)?,
    };

    debug!(
        "Located report layout for {}: header_row={}, delimiter={:?}",
        file_path.display(),
        header_row,
        delimiter as char
    );

    Ok(ReportLayout {
        header_row,
        delimiter,
    })
}

/// Zero-based index of the first line containing the "State Cd" column marker
pub fn find_header_row(file_path: &Path) -> Result<usize> {
    scan_lines(file_path, |line_index, line| {
        line.contains(HEADER_MARKER).then_some(line_index)
    })?
    .ok_or_else(|| TamisError::HeaderNotFound {
        path: file_path.to_path_buf(),
    })
}

/// Field delimiter declared on the "Fields Delimited by: " preamble line
pub fn find_delimiter(file_path: &Path) -> Result<u8> {
    let token = scan_lines(file_path, |_, line| {
        DELIMITER_TOKEN
            .captures(line)
            .and_then(|captures| captures.get(1))
            .map(|token| token.as_str().to_string())
    })?
    .ok_or_else(|| TamisError::DelimiterNotFound {
        path: file_path.to_path_buf(),
    })?;

    parse_delimiter_token(&token)
}

/// Map a delimiter token to its separator byte
///
/// "Tab" is a horizontal tab; any other token is used verbatim and must be a
/// single ASCII character.
pub fn parse_delimiter_token(token: &str) -> Result<u8> {
    if token == TAB_TOKEN {
        return Ok(b'\t');
    }

    match token.as_bytes() {
        [byte] if byte.is_ascii() && !byte.is_ascii_alphanumeric() => Ok(*byte),
        [_] => Err(TamisError::InvalidDelimiter {
            token: token.to_string(),
            reason: "delimiter must be a punctuation or whitespace character".to_string(),
        }),
        _ => Err(TamisError::InvalidDelimiter {
            token: token.to_string(),
            reason: "delimiter must be a single character or \"Tab\"".to_string(),
        }),
    }
}

/// Walk the file line by line until `matcher` returns a value
///
/// Lines are decoded lossily so that stray bytes in the preamble never abort a scan.
fn scan_lines<T>(file_path: &Path, mut matcher: impl FnMut(usize, &str) -> Option<T>) -> Result<Option<T>> {
    let file = File::open(file_path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TamisError::ReportNotFound {
            path: file_path.to_path_buf(),
        },
        _ => TamisError::Io(e),
    })?;
    let mut reader = BufReader::new(file);
    let mut buffer = Vec::new();
    let mut line_index = 0;

    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            return Ok(None);
        }

        let line: Cow<'_, str> = String::from_utf8_lossy(&buffer);
        if let Some(found) = matcher(line_index, line.trim_end_matches(['\r', '\n'])) {
            return Ok(Some(found));
        }
        line_index += 1;
    }
}
