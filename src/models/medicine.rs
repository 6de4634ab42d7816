use serde::{Deserialize, Serialize};

/// One row of the reference database.
///
/// Every field is a plain string; a missing cell or column is an empty string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MedicineRecord {
    pub name: String,
    pub manufacturer: String,
    pub uses: String,
    pub dosage: String,
    pub side_effects: String,
    pub more_info_url: String,
    pub barcode: String,
}

impl MedicineRecord {
    /// String the fuzzy matcher compares a query against
    pub fn match_key(&self) -> String {
        format!("{} {}", self.name, self.manufacturer)
    }

    /// External reference link, if the row has one
    pub fn more_info(&self) -> Option<&str> {
        let url = self.more_info_url.trim();
        if url.is_empty() {
            None
        } else {
            Some(url)
        }
    }
}

/// A ranked candidate returned by the name matcher
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchResult {
    #[serde(flatten)]
    pub record: MedicineRecord,
    /// Similarity 0-100; 100 for an exact barcode hit
    pub score: u8,
}
