use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

use super::date_parse::DateParser;

/// Substrings that usually hold a printed date, tried on every line
static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // 05/12/2026, 5-12-26, 05.12.2026
        Regex::new(r"(?i)\b\d{1,2}[/\-.\s]\d{1,2}[/\-.\s]\d{2,4}\b").expect("valid date regex"),
        // 2026/12/05
        Regex::new(r"(?i)\b\d{4}[/\-.\s]\d{1,2}[/\-.\s]\d{1,2}\b").expect("valid date regex"),
        // EXP: 05/2026, Expiry Dec 2026
        Regex::new(r"(?i)\b(?:exp|expiry|exp\.|exp:)\s*[:\-]?\s*([A-Za-z0-9 \-/.]+)\b")
            .expect("valid label regex"),
    ]
});

/// Years before this many years ago are not expiry dates
const MAX_YEARS_PAST: i32 = 1;
/// Nor are years further out than this
const MAX_YEARS_AHEAD: i32 = 30;

/// Expiry date extractor: earliest plausible date in the OCR lines
pub fn find_expiry<S: AsRef<str>>(lines: &[S]) -> Option<NaiveDate> {
    find_expiry_at(lines, Local::now().date_naive())
}

/// Same as [`find_expiry`] with a fixed "today"
///
/// Each line contributes the first match of every date pattern (read
/// day-first, missing day = 1st) and the whole line (read month-first,
/// missing parts taken from `today`). Unparsable candidates are skipped.
/// Of the candidates whose year is plausible the earliest wins.
pub fn find_expiry_at<S: AsRef<str>>(lines: &[S], today: NaiveDate) -> Option<NaiveDate> {
    let current_year = today.year();
    let start_of_month = today.with_day(1).unwrap_or(today);
    let fragment_parser = DateParser::new(true, start_of_month, current_year);
    let line_parser = DateParser::new(false, today, current_year);

    let mut candidates = Vec::new();
    for line in lines {
        let line = line.as_ref();

        for pattern in DATE_PATTERNS.iter() {
            if let Some(m) = pattern.find(line) {
                candidates.extend(fragment_parser.parse(m.as_str()));
            }
        }
        candidates.extend(line_parser.parse(line));
    }

    let chosen = candidates
        .into_iter()
        .filter(|date| validate_plausible_year(date.year(), current_year))
        .min();

    tracing::debug!(expiry = ?chosen, lines = lines.len(), "Expiry extraction complete");
    chosen
}

/// Validate expiry year range relative to the current year
pub fn validate_plausible_year(year: i32, current_year: i32) -> bool {
    year >= current_year - MAX_YEARS_PAST && year <= current_year + MAX_YEARS_AHEAD
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_label_with_month_and_year() {
        let lines = ["EXP: 05/2026", "Batch XJ221"];
        assert_eq!(find_expiry_at(&lines, today()), Some(date(2026, 5, 1)));
    }

    #[test]
    fn test_label_with_month_and_year_today() {
        let next_year = Local::now().year() + 1;
        let lines = [format!("EXP: 05/{next_year}"), "Batch XJ221".to_string()];
        assert_eq!(find_expiry(&lines), Some(date(next_year, 5, 1)));
    }

    #[test]
    fn test_no_dates() {
        assert_eq!(find_expiry_at(&["no dates here"], today()), None);
        let empty: [&str; 0] = [];
        assert_eq!(find_expiry_at(&empty, today()), None);
    }

    #[test]
    fn test_dayfirst_fragment_is_earliest() {
        // Fragment reads 12 Aug, whole line reads Dec 8
        let lines = ["Expiry 12/08/2027"];
        assert_eq!(find_expiry_at(&lines, today()), Some(date(2027, 8, 12)));
    }

    #[test]
    fn test_year_first_date() {
        let lines = ["EXP 2026/03/14"];
        assert_eq!(find_expiry_at(&lines, today()), Some(date(2026, 3, 14)));
    }

    #[test]
    fn test_month_name() {
        let lines = ["Paracetamol 500", "Exp. MAR 2027"];
        assert_eq!(find_expiry_at(&lines, today()), Some(date(2027, 3, 1)));
    }

    #[test]
    fn test_earliest_across_lines_wins() {
        let lines = ["MFG 15/02/2025", "EXP 31/01/2027"];
        assert_eq!(find_expiry_at(&lines, today()), Some(date(2025, 2, 15)));
    }

    #[test]
    fn test_dosing_hour_is_not_read_as_a_day() {
        // "8 pm" is a time, so the line only contributes day 1 of this month
        let lines = ["Take 1 tablet at 8 pm"];
        assert_eq!(find_expiry_at(&lines, today()), Some(date(2025, 6, 1)));
    }

    #[test]
    fn test_out_of_window_dates_rejected() {
        assert_eq!(find_expiry_at(&["EXP 01/01/1999"], today()), None);
        assert_eq!(find_expiry_at(&["EXP 01/01/2099"], today()), None);
    }

    #[test]
    fn test_large_numeric_tokens() {
        for line in ["1234567890", "Lot 9876543210", "Batch 20251399"] {
            let found = find_expiry_at(&[line], today());
            if let Some(date) = found {
                assert!(validate_plausible_year(date.year(), 2025), "{line} -> {date}");
            }
        }
        assert_eq!(find_expiry_at(&["1234567890"], today()), None);
    }

    #[test]
    fn test_result_always_in_window() {
        let lines = [
            "12/12/12",
            "EXP 99-99-9999",
            "31/12/2060",
            "Use before 1 Jan 2024",
            "05 2025",
        ];
        for line in lines {
            if let Some(date) = find_expiry_at(&[line], today()) {
                assert!((2024..=2055).contains(&date.year()), "{line} -> {date}");
            }
        }
    }

    #[test]
    fn test_works_with_recognized_lines() {
        use crate::models::ocr_result::RecognizedLine;

        let lines = vec![RecognizedLine::new("EXP 2026/03/14").unwrap()];
        assert_eq!(find_expiry_at(&lines, today()), Some(date(2026, 3, 14)));
    }

    #[test]
    fn test_validate_plausible_year() {
        assert!(validate_plausible_year(2024, 2025));
        assert!(validate_plausible_year(2055, 2025));
        assert!(!validate_plausible_year(2023, 2025));
        assert!(!validate_plausible_year(2056, 2025));
    }
}
