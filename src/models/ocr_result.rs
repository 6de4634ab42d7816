use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::medicine::MatchResult;

/// A single line of OCR output: never empty, never padded with whitespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecognizedLine(String);

impl RecognizedLine {
    /// Trim raw engine output. Returns None for blank segments.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RecognizedLine {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecognizedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RecognizedLine {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or_else(|| "recognized line must not be blank".to_string())
    }
}

impl From<RecognizedLine> for String {
    fn from(line: RecognizedLine) -> Self {
        line.0
    }
}

/// Combined result of one scan.
/// Each stage is independent, so every field may be empty on its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanReport {
    pub lines: Vec<RecognizedLine>,
    pub barcode: Option<String>,
    pub expiry: Option<NaiveDate>,
    pub matches: Vec<MatchResult>,
}

impl ScanReport {
    /// OCR lines joined with single spaces, the matcher's fallback query
    pub fn joined_text(&self) -> String {
        join_lines(&self.lines)
    }
}

pub fn join_lines(lines: &[RecognizedLine]) -> String {
    lines
        .iter()
        .map(RecognizedLine::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Extracted OCR lines:")?;
        if self.lines.is_empty() {
            writeln!(f, "  No text detected")?;
        } else {
            for line in &self.lines {
                writeln!(f, "  - {}", line)?;
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "Barcode / QR: {}",
            self.barcode.as_deref().unwrap_or("Not found")
        )?;
        match self.expiry {
            Some(date) => writeln!(f, "Detected Expiry Date: {}", date)?,
            None => writeln!(f, "Detected Expiry Date: Not found")?,
        }

        writeln!(f)?;
        writeln!(f, "Matching Results")?;
        if self.matches.is_empty() {
            writeln!(
                f,
                "  No matches found in database. Try a different angle or make the barcode visible."
            )?;
        }
        for (i, m) in self.matches.iter().enumerate() {
            writeln!(f, "  {}. {}  (Score: {})", i + 1, m.record.name, m.score)?;
            writeln!(f, "     Manufacturer: {}", or_dash(&m.record.manufacturer))?;
            writeln!(f, "     Uses: {}", or_dash(&m.record.uses))?;
            writeln!(f, "     Dosage: {}", or_dash(&m.record.dosage))?;
            writeln!(f, "     Side effects: {}", or_dash(&m.record.side_effects))?;
            if let Some(url) = m.record.more_info() {
                writeln!(f, "     More info: {}", url)?;
            }
        }

        Ok(())
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
