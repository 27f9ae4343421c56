//! Enumerated selection of outputs, for use in command-line selection.

use super::{abs, err, json, table};
use serde::{Deserialize, Serialize};
use std::{io::Write, str::FromStr};

/// Enumeration of outputter choices.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum Choice {
    /// Selects the table outputter.
    Table,
    /// Selects the JSON outputter.
    Json,
}

impl Choice {
    /// Constructs the appropriate outputter for the choice, using the given
    /// writer.
    pub fn to_outputter<'a, W: Write + 'a>(self, writer: W) -> Box<dyn abs::Outputter + 'a> {
        match self {
            Self::Table => Box::new(table::Table::new(writer)),
            Self::Json => Box::new(json::Json::new(writer)),
        }
    }

    /// Gets an iterator of all available choices.
    pub fn all() -> impl Iterator<Item = Self> {
        vec![Self::Table, Self::Json].into_iter()
    }
}

/// Strings used when mapping outputter choices to command-line arguments.
pub mod string {
    /// The string representation for the table outputter.
    pub const TABLE: &str = "table";
    /// The string representation for the JSON outputter.
    pub const JSON: &str = "json";

    /// List of all possible string representations of outputter choices.
    pub const ALL: &[&str] = &[TABLE, JSON];
}

/// The default outputter is the table.
impl Default for Choice {
    fn default() -> Self {
        Self::Table
    }
}

impl FromStr for Choice {
    type Err = err::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let su = s.to_lowercase();
        match &*su {
            string::TABLE => Ok(Self::Table),
            string::JSON => Ok(Self::Json),
            _ => Err(Self::Err::BadOutputter(su)),
        }
    }
}

impl std::fmt::Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Table => string::TABLE,
            Self::Json => string::JSON,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that the ALL constant lines up with the choices.
    #[test]
    fn test_all_strings_in_sync() {
        let got_set: std::collections::HashSet<String> =
            string::ALL.iter().map(|x| x.to_string()).collect();
        let want_set: std::collections::HashSet<String> =
            Choice::all().map(|x| x.to_string()).collect();
        assert_eq!(got_set, want_set)
    }

    /// Tests that parsing inverts display.
    #[test]
    fn test_parse_display() {
        for choice in Choice::all() {
            assert_eq!(choice.to_string().parse::<Choice>().ok(), Some(choice));
        }
        assert!("csv".parse::<Choice>().is_err());
    }
}
