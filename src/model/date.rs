//! Spreadsheet date serials and number-format date patterns
//!
//! Spreadsheet documents store dates as the number of days since
//! 1899-12-30, with the time of day in the fractional part.

use chrono::{Duration, NaiveDateTime};

/// Serial number of 1970-01-01 in the 1899-12-30 epoch
const UNIX_EPOCH_SERIAL: f64 = 25569.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Convert a date-time to its day-count serial
pub fn to_serial(dt: NaiveDateTime) -> f64 {
    let since_unix = dt - NaiveDateTime::default();
    UNIX_EPOCH_SERIAL + since_unix.num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Convert a day-count serial back to a date-time, rounded to the millisecond
pub fn from_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let millis = ((serial - UNIX_EPOCH_SERIAL) * MILLIS_PER_DAY).round();
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    NaiveDateTime::default().checked_add_signed(Duration::try_milliseconds(millis as i64)?)
}

/// Parse serial text as written into numeric cells
pub fn parse_serial(text: &str) -> Option<NaiveDateTime> {
    text.trim().parse::<f64>().ok().and_then(from_serial)
}

/// Translate a spreadsheet date format code (`dd.MM.yyyy`, `yyyy-mm-dd hh:mm`)
/// into a chrono pattern.
///
/// `M` is always a month. A lower-case `m` run is a minute when it follows an
/// hour or precedes a second, and a month otherwise. Quoted text and
/// backslash-escaped characters are copied literally.
pub fn excel_pattern_to_chrono(code: &str) -> String {
    let tokens = tokenize(code);
    let twelve_hour = tokens.iter().any(|t| matches!(t, Token::AmPm));
    let mut out = String::with_capacity(code.len() + 8);

    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Literal(text) => {
                for c in text.chars() {
                    if c == '%' {
                        out.push_str("%%");
                    } else {
                        out.push(c);
                    }
                }
            }
            Token::AmPm => out.push_str("%p"),
            Token::Run(c, len) => {
                let len = *len;
                let part = match c {
                    'y' | 'Y' => {
                        if len <= 2 {
                            "%y"
                        } else {
                            "%Y"
                        }
                    }
                    'M' => month(len),
                    'm' => {
                        let after_hour = previous_run(&tokens, i)
                            .is_some_and(|p| matches!(p, 'h' | 'H'));
                        let before_second =
                            next_run(&tokens, i).is_some_and(|n| matches!(n, 's' | 'S'));
                        if after_hour || before_second {
                            if len == 1 {
                                "%-M"
                            } else {
                                "%M"
                            }
                        } else {
                            month(len)
                        }
                    }
                    'd' | 'D' => match len {
                        1 => "%-d",
                        2 => "%d",
                        3 => "%a",
                        _ => "%A",
                    },
                    'h' | 'H' => match (twelve_hour, len) {
                        (true, 1) => "%-I",
                        (true, _) => "%I",
                        (false, 1) => "%-H",
                        (false, _) => "%H",
                    },
                    's' | 'S' => {
                        if len == 1 {
                            "%-S"
                        } else {
                            "%S"
                        }
                    }
                    _ => "",
                };
                out.push_str(part);
            }
        }
    }
    out
}

fn month(len: usize) -> &'static str {
    match len {
        1 => "%-m",
        2 => "%m",
        3 => "%b",
        _ => "%B",
    }
}

#[derive(Debug, PartialEq)]
enum Token {
    Literal(String),
    Run(char, usize),
    AmPm,
}

fn tokenize(code: &str) -> Vec<Token> {
    let chars: Vec<char> = code.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|&q| q == '"')
                    .map_or(chars.len(), |p| i + 1 + p);
                tokens.push(Token::Literal(chars[i + 1..end].iter().collect()));
                i = end + 1;
            }
            '\\' => {
                if let Some(&next) = chars.get(i + 1) {
                    tokens.push(Token::Literal(next.to_string()));
                }
                i += 2;
            }
            _ if starts_with_ignore_case(&chars[i..], "am/pm") => {
                tokens.push(Token::AmPm);
                i += 5;
            }
            _ if starts_with_ignore_case(&chars[i..], "tt") => {
                tokens.push(Token::AmPm);
                i += 2;
            }
            'y' | 'Y' | 'M' | 'm' | 'd' | 'D' | 'h' | 'H' | 's' | 'S' => {
                let len = chars[i..].iter().take_while(|&&n| n == c).count();
                tokens.push(Token::Run(c, len));
                i += len;
            }
            _ => {
                tokens.push(Token::Literal(c.to_string()));
                i += 1;
            }
        }
    }
    tokens
}

fn starts_with_ignore_case(chars: &[char], prefix: &str) -> bool {
    chars.len() >= prefix.len()
        && chars
            .iter()
            .zip(prefix.chars())
            .all(|(a, b)| a.eq_ignore_ascii_case(&b))
}

fn previous_run(tokens: &[Token], i: usize) -> Option<char> {
    tokens[..i].iter().rev().find_map(|t| match t {
        Token::Run(c, _) => Some(*c),
        _ => None,
    })
}

fn next_run(tokens: &[Token], i: usize) -> Option<char> {
    tokens[i + 1..].iter().find_map(|t| match t {
        Token::Run(c, _) => Some(*c),
        _ => None,
    })
}
