//! Delimiter detection for delimited text

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use super::RowParser;
use crate::error::{CodecError, CodecResult};
use crate::model::Record;

/// Delimiters tried first, in priority order
pub const CANDIDATE_DELIMITERS: [char; 5] = ['\t', ';', ',', '.', ' '];

/// Find a delimiter under which both witness lines parse.
///
/// The fixed candidates are tried first; then every character repeated
/// within `first`, in first-seen order.
pub fn sniff_delimiter<R: Record, P: RowParser>(
    parser: &P,
    prototype: &R,
    first: &str,
    last: &str,
) -> CodecResult<char> {
    let fallback = repeated_chars(first)
        .into_iter()
        .filter(|c| !CANDIDATE_DELIMITERS.contains(c));

    for delimiter in CANDIDATE_DELIMITERS.into_iter().chain(fallback) {
        if parses(parser, prototype, first, delimiter) && parses(parser, prototype, last, delimiter) {
            debug!(delimiter = ?delimiter, "Detected delimiter");
            return Ok(delimiter);
        }
        trace!(delimiter = ?delimiter, "Rejected delimiter");
    }

    Err(CodecError::UndetectableDelimiter)
}

fn parses<R: Record, P: RowParser>(parser: &P, prototype: &R, line: &str, delimiter: char) -> bool {
    let cells: Vec<&str> = line.split(delimiter).collect();
    let mut record = prototype.clone();
    parser.parse_row(&mut record, &cells);
    record.is_parsed()
}

/// Characters occurring more than once, in order of first appearance
fn repeated_chars(line: &str) -> Vec<char> {
    let mut counts: FxHashMap<char, usize> = FxHashMap::default();
    let mut order = Vec::new();
    for c in line.chars() {
        let count = counts.entry(c).or_insert(0);
        if *count == 0 {
            order.push(c);
        }
        *count += 1;
    }
    order.retain(|c| counts.get(c).is_some_and(|&n| n > 1));
    order
}
