//! Culture-specific number and date formatting

use chrono::{NaiveDate, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serialize};

/// Formatting conventions of a locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct Culture {
    /// Culture name, empty for the invariant culture
    pub name: &'static str,
    pub decimal_separator: char,
    /// chrono pattern for dates
    pub date_pattern: &'static str,
    /// chrono pattern for date-times
    pub datetime_pattern: &'static str,
}

const CULTURES: &[Culture] = &[
    Culture {
        name: "",
        decimal_separator: '.',
        date_pattern: "%m/%d/%Y",
        datetime_pattern: "%m/%d/%Y %H:%M:%S",
    },
    Culture {
        name: "en-US",
        decimal_separator: '.',
        date_pattern: "%-m/%-d/%Y",
        datetime_pattern: "%-m/%-d/%Y %-I:%M:%S %p",
    },
    Culture {
        name: "en-GB",
        decimal_separator: '.',
        date_pattern: "%d/%m/%Y",
        datetime_pattern: "%d/%m/%Y %H:%M:%S",
    },
    Culture {
        name: "de-DE",
        decimal_separator: ',',
        date_pattern: "%d.%m.%Y",
        datetime_pattern: "%d.%m.%Y %H:%M:%S",
    },
    Culture {
        name: "fr-FR",
        decimal_separator: ',',
        date_pattern: "%d/%m/%Y",
        datetime_pattern: "%d/%m/%Y %H:%M:%S",
    },
    Culture {
        name: "ru-RU",
        decimal_separator: ',',
        date_pattern: "%d.%m.%Y",
        datetime_pattern: "%d.%m.%Y %H:%M:%S",
    },
];

/// Layouts accepted on input regardless of culture
const ISO_DATETIME_PATTERNS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

impl Default for Culture {
    fn default() -> Self {
        Self::invariant()
    }
}

impl Culture {
    /// The culture-independent conventions
    pub const fn invariant() -> Self {
        CULTURES[0]
    }

    /// Look up a culture by name (case-insensitive), `"invariant"` or `""`
    /// for the invariant culture
    pub fn from_name(name: &str) -> Option<Self> {
        if name.is_empty() || name.eq_ignore_ascii_case("invariant") {
            return Some(Self::invariant());
        }
        CULTURES
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .copied()
    }

    pub fn is_invariant(&self) -> bool {
        self.name.is_empty()
    }

    pub fn format_float(&self, f: f64) -> String {
        let s = f.to_string();
        if self.decimal_separator == '.' {
            s
        } else {
            s.replace('.', &self.decimal_separator.to_string())
        }
    }

    pub fn parse_float(&self, s: &str) -> Option<f64> {
        let s = s.trim();
        if self.decimal_separator == '.' {
            s.parse().ok()
        } else {
            s.replace(self.decimal_separator, ".").parse().ok()
        }
    }

    /// Parse a date or date-time written in this culture or in ISO 8601
    pub fn parse_datetime(&self, s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, self.datetime_pattern) {
            return Some(dt);
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, self.date_pattern) {
            return d.and_hms_opt(0, 0, 0);
        }
        for pattern in ISO_DATETIME_PATTERNS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, pattern) {
                return Some(dt);
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }
}

impl TryFrom<String> for Culture {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Culture::from_name(&name).ok_or_else(|| format!("Unknown culture: {}", name))
    }
}

impl<'de> Deserialize<'de> for Culture {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Culture::try_from(name).map_err(de::Error::custom)
    }
}

impl From<Culture> for String {
    fn from(culture: Culture) -> Self {
        if culture.is_invariant() {
            "invariant".to_string()
        } else {
            culture.name.to_string()
        }
    }
}

impl std::fmt::Display for Culture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_invariant() {
            write!(f, "invariant")
        } else {
            write!(f, "{}", self.name)
        }
    }
}
