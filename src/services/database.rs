use crate::error::Result;
use crate::models::medicine::MedicineRecord;
use std::path::Path;

/// Cell values that mean "no value" in spreadsheet exports
const NULL_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Read-only reference table of medicines, in file row order
#[derive(Debug, Clone, Default)]
pub struct MedicineDatabase {
    records: Vec<MedicineRecord>,
}

impl MedicineDatabase {
    /// Load a CSV file with a header row.
    ///
    /// A missing file is an empty database. Unknown columns are ignored and
    /// missing columns or cells become empty strings.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Medicine database not found, using an empty one");
            return Ok(Self::default());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h.trim() == name);
        let columns = [
            column("name"),
            column("manufacturer"),
            column("uses"),
            column("dosage"),
            column("side_effects"),
            column("more_info_url"),
            column("barcode"),
        ];

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let [name, manufacturer, uses, dosage, side_effects, more_info_url, barcode] =
                columns.map(|idx| cell(&row, idx));
            records.push(MedicineRecord {
                name,
                manufacturer,
                uses,
                dosage,
                side_effects,
                more_info_url,
                barcode,
            });
        }

        tracing::info!(path = %path.display(), records = records.len(), "Loaded medicine database");
        Ok(Self { records })
    }

    pub fn from_records(records: Vec<MedicineRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[MedicineRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record whose barcode equals `code` exactly
    pub fn find_by_barcode(&self, code: &str) -> Option<&MedicineRecord> {
        if code.is_empty() {
            return None;
        }
        self.records.iter().find(|r| r.barcode == code)
    }
}

/// Cell at `idx`; absent columns, short rows and null markers read as ""
fn cell(row: &csv::StringRecord, idx: Option<usize>) -> String {
    match idx.and_then(|i| row.get(i)) {
        Some(value) if !NULL_MARKERS.contains(&value) => value.to_string(),
        _ => String::new(),
    }
}
