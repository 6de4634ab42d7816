use rayon::prelude::*;

use super::database::MedicineDatabase;
use super::fuzzy::wratio;
use crate::models::medicine::MatchResult;

/// Score reported for an exact barcode hit
pub const EXACT_BARCODE_SCORE: u8 = 100;

/// Name matcher: rank database records against a barcode or OCR text query.
///
/// - blank query or empty database: no results
/// - query equal to a record's barcode: that record alone, score 100
/// - otherwise the `top_k` best fuzzy matches on "name manufacturer",
///   highest score first, equal scores in row order, no minimum score
pub fn match_medicine(query: &str, database: &MedicineDatabase, top_k: usize) -> Vec<MatchResult> {
    let query = query.trim();
    if query.is_empty() || database.is_empty() {
        return Vec::new();
    }

    if let Some(record) = database.find_by_barcode(query) {
        tracing::debug!(barcode = %query, name = %record.name, "Exact barcode match");
        return vec![MatchResult {
            record: record.clone(),
            score: EXACT_BARCODE_SCORE,
        }];
    }

    let mut scored: Vec<(usize, u8)> = database
        .records()
        .par_iter()
        .map(|record| wratio(query, &record.match_key()))
        .enumerate()
        .collect();

    // Stable sort keeps row order among equal scores
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.truncate(top_k);

    tracing::debug!(
        candidates = database.len(),
        best = scored.first().map(|(_, score)| *score),
        "Fuzzy match complete"
    );

    scored
        .into_iter()
        .map(|(idx, score)| MatchResult {
            record: database.records()[idx].clone(),
            score,
        })
        .collect()
}
