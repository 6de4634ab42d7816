//! Lenient date parsing for free-form package text.
//!
//! Reads the date out of a string that may contain arbitrary other words
//! ("EXP: 05/2026", "Best before 12 Mar 2027"). Unknown words and symbols are
//! skipped, numbers are collected into at most three year/month/day values and
//! then resolved the usual way: values above 31 are years, month names pin the
//! month, and ambiguous numeric triples follow the day-first preference.
//! Components the text does not mention come from a default date.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

static TIME_OF_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d{1,2}:\d{2}(?::\d{2})?(?:\s*[ap]\.?m\b\.?)?").expect("valid time regex")
});

const MONTHS: [&[&str]; 12] = [
    &["jan", "january"],
    &["feb", "february"],
    &["mar", "march"],
    &["apr", "april"],
    &["may"],
    &["jun", "june"],
    &["jul", "july"],
    &["aug", "august"],
    &["sep", "sept", "september"],
    &["oct", "october"],
    &["nov", "november"],
    &["dec", "december"],
];

const JUMP_WORDS: &[&str] = &[
    "at", "on", "and", "ad", "m", "t", "of", "st", "nd", "rd", "th",
];

const AMPM_WORDS: &[&str] = &["a", "am", "p", "pm"];

const HMS_WORDS: &[&str] = &[
    "h", "hr", "hrs", "hour", "hours", "min", "mins", "minute", "minutes", "s", "sec", "secs",
    "second", "seconds",
];

/// Fuzzy date parser settings
#[derive(Debug, Clone, Copy)]
pub struct DateParser {
    /// Prefer DD/MM over MM/DD when both readings are valid
    pub dayfirst: bool,
    /// Source of the components the text leaves out
    pub default: NaiveDate,
    /// Anchor for two-digit years, which land within 50 years of it
    pub current_year: i32,
}

impl DateParser {
    pub fn new(dayfirst: bool, default: NaiveDate, current_year: i32) -> Self {
        Self {
            dayfirst,
            default,
            current_year,
        }
    }

    /// Parse the date mentioned in `text`.
    ///
    /// `None` when the text has no date-like values, has conflicting ones
    /// (two years, more than three numbers), or resolves to an invalid
    /// calendar date.
    pub fn parse(&self, text: &str) -> Option<NaiveDate> {
        let text = TIME_OF_DAY.replace_all(text, " ");
        let tokens = tokenize(&text);
        let ymd = collect_ymd(&tokens)?;
        if ymd.values.is_empty() {
            return None;
        }

        let (year, month, day) = ymd.resolve(self.dayfirst)?;
        self.build(year, month, day, ymd.century_specified)
    }

    fn build(
        &self,
        year: Option<i64>,
        month: Option<i64>,
        day: Option<i64>,
        century_specified: bool,
    ) -> Option<NaiveDate> {
        let year = match year {
            Some(y) => self.convert_year(y, century_specified),
            None => i64::from(self.default.year()),
        };
        let year = i32::try_from(year).ok()?;
        let month = match month {
            Some(m) => u32::try_from(m).ok()?,
            None => self.default.month(),
        };
        // A defaulted day is clipped (default 31st, parsed month February)
        let day = match day {
            Some(d) => u32::try_from(d).ok()?,
            None => self.default.day().min(days_in_month(year, month)?),
        };

        NaiveDate::from_ymd_opt(year, month, day)
    }

    fn convert_year(&self, year: i64, century_specified: bool) -> i64 {
        if year >= 100 || century_specified {
            return year;
        }

        let current = i64::from(self.current_year);
        let mut year = year + current / 100 * 100;
        if year >= current + 50 {
            year -= 100;
        } else if year < current - 50 {
            year += 100;
        }
        year
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Number(String),
    Word(String),
    Space,
    Symbol(char),
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            tokens.push(Token::Space);
        } else if c.is_ascii_digit() {
            let mut digits = String::new();
            while let Some(d) = chars.next_if(char::is_ascii_digit) {
                digits.push(d);
            }
            tokens.push(Token::Number(digits));
        } else if c.is_alphabetic() {
            let mut word = String::new();
            while let Some(a) = chars.next_if(|c| c.is_alphabetic()) {
                word.push(a);
            }
            tokens.push(Token::Word(word));
        } else {
            chars.next();
            tokens.push(Token::Symbol(c));
        }
    }

    tokens
}

fn month_number(word: &str) -> Option<i64> {
    let word = word.to_lowercase();
    MONTHS
        .iter()
        .position(|names| names.contains(&word.as_str()))
        .map(|i| i as i64 + 1)
}

fn is_jump(token: &Token) -> bool {
    match token {
        Token::Space => true,
        Token::Symbol(c) => matches!(c, ',' | ';' | '-' | '/' | '.' | '\''),
        Token::Word(w) => JUMP_WORDS.contains(&w.to_lowercase().as_str()),
        Token::Number(_) => false,
    }
}

fn is_hms(token: Option<&Token>) -> bool {
    matches!(token, Some(Token::Word(w)) if HMS_WORDS.contains(&w.to_lowercase().as_str()))
}

fn is_ampm(token: Option<&Token>) -> bool {
    matches!(token, Some(Token::Word(w)) if AMPM_WORDS.contains(&w.to_lowercase().as_str()))
}

fn is_separator(token: Option<&Token>) -> Option<char> {
    match token {
        Some(Token::Symbol(c @ ('-' | '/' | '.'))) => Some(*c),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    Year,
    Month,
}

/// Up to three date values plus which of them are known years or months
#[derive(Debug, Default)]
struct Ymd {
    values: Vec<i64>,
    year_idx: Option<usize>,
    month_idx: Option<usize>,
    century_specified: bool,
}

impl Ymd {
    /// Value written as digits: three or more digits make it a year
    fn push_digits(&mut self, digits: &str, label: Option<Label>) -> Option<()> {
        let value: i64 = digits.parse().ok()?;
        let label = if digits.len() > 2 {
            self.century_specified = true;
            Some(Label::Year)
        } else {
            label
        };
        self.push(value, label)
    }

    /// Standalone number: anything above 100 is a year
    fn push_number(&mut self, value: i64) -> Option<()> {
        let label = if value > 100 {
            self.century_specified = true;
            Some(Label::Year)
        } else {
            None
        };
        self.push(value, label)
    }

    fn push_month(&mut self, month: i64) -> Option<()> {
        self.push(month, Some(Label::Month))
    }

    fn push(&mut self, value: i64, label: Option<Label>) -> Option<()> {
        let idx = self.values.len();
        match label {
            Some(Label::Year) if self.year_idx.is_some() => return None,
            Some(Label::Month) if self.month_idx.is_some() => return None,
            Some(Label::Year) => self.year_idx = Some(idx),
            Some(Label::Month) => self.month_idx = Some(idx),
            None => {}
        }
        self.values.push(value);
        Some(())
    }

    /// A member after a date separator: digits or a month name
    fn push_member(&mut self, token: &Token) -> Option<()> {
        match token {
            Token::Number(digits) => self.push_digits(digits, None),
            Token::Word(word) => self.push_month(month_number(word)?),
            _ => None,
        }
    }

    fn could_be_day(&self, value: i64) -> bool {
        let max_day = match (self.month_idx, self.year_idx) {
            (None, _) => Some(31),
            (Some(m), None) => u32::try_from(self.values[m])
                .ok()
                .and_then(|month| days_in_month(2000, month)),
            (Some(m), Some(y)) => u32::try_from(self.values[m])
                .ok()
                .zip(i32::try_from(self.values[y]).ok())
                .and_then(|(month, year)| days_in_month(year, month)),
        };
        max_day.is_some_and(|max| (1..=i64::from(max)).contains(&value))
    }

    fn resolve(&self, dayfirst: bool) -> Option<(Option<i64>, Option<i64>, Option<i64>)> {
        let v = &self.values;
        let labelled = usize::from(self.year_idx.is_some()) + usize::from(self.month_idx.is_some());

        if (v.len() == labelled && labelled > 0) || (v.len() == 3 && labelled == 2) {
            return Some(self.resolve_from_labels());
        }

        let (mut year, mut month, mut day) = (None, None, None);
        match v.len() {
            1 | 2 if v.len() == 1 || self.month_idx.is_some() => {
                // One value, or a month name plus one value
                let other = match self.month_idx {
                    Some(m) => {
                        month = Some(v[m]);
                        v[(m + v.len() - 1) % v.len()]
                    }
                    None => v[0],
                };
                if v.len() > 1 || self.month_idx.is_none() {
                    if other > 31 {
                        year = Some(other);
                    } else {
                        day = Some(other);
                    }
                }
            }
            2 => {
                if v[0] > 31 {
                    (year, month) = (Some(v[0]), Some(v[1]));
                } else if v[1] > 31 {
                    (month, year) = (Some(v[0]), Some(v[1]));
                } else if dayfirst && v[1] <= 12 {
                    (day, month) = (Some(v[0]), Some(v[1]));
                } else {
                    (month, day) = (Some(v[0]), Some(v[1]));
                }
            }
            3 => {
                let (a, b, c) = (Some(v[0]), Some(v[1]), Some(v[2]));
                match self.month_idx {
                    Some(0) if v[1] > 31 => (month, year, day) = (a, b, c),
                    Some(0) => (month, day, year) = (a, b, c),
                    Some(1) if v[0] > 31 => (year, month, day) = (a, b, c),
                    Some(1) => (day, month, year) = (a, b, c),
                    Some(_) if v[1] > 31 => (day, year, month) = (a, b, c),
                    Some(_) => (year, day, month) = (a, b, c),
                    None if v[0] > 31 || self.year_idx == Some(0) => {
                        if dayfirst && v[2] <= 12 {
                            (year, day, month) = (a, b, c);
                        } else {
                            (year, month, day) = (a, b, c);
                        }
                    }
                    None if v[0] > 12 || (dayfirst && v[1] <= 12) => (day, month, year) = (a, b, c),
                    None => (month, day, year) = (a, b, c),
                }
            }
            _ => return None,
        }

        Some((year, month, day))
    }

    fn resolve_from_labels(&self) -> (Option<i64>, Option<i64>, Option<i64>) {
        let year = self.year_idx.map(|i| self.values[i]);
        let month = self.month_idx.map(|i| self.values[i]);
        let day = if self.values.len() == 3 {
            (0..3)
                .find(|&i| Some(i) != self.year_idx && Some(i) != self.month_idx)
                .map(|i| self.values[i])
        } else {
            None
        };
        (year, month, day)
    }
}

fn collect_ymd(tokens: &[Token]) -> Option<Ymd> {
    let mut ymd = Ymd::default();
    let mut i = 0;

    while i < tokens.len() {
        i = match &tokens[i] {
            Token::Number(digits) => numeric_token(tokens, i, digits, &mut ymd)?,
            Token::Word(word) => match month_number(word) {
                Some(month) => month_token(tokens, i, month, &mut ymd)?,
                None => i + 1,
            },
            Token::Space | Token::Symbol(_) => i + 1,
        };
    }

    Some(ymd)
}

/// Handle the month name at `i` and any `-`/`/` members glued to it.
/// Returns the next token index.
fn month_token(tokens: &[Token], i: usize, month: i64, ymd: &mut Ymd) -> Option<usize> {
    ymd.push_month(month)?;

    let Some(sep @ ('-' | '/')) = is_separator(tokens.get(i + 1)) else {
        return Some(i + 1);
    };
    // Jan-01[-99]
    match tokens.get(i + 2)? {
        Token::Number(digits) => ymd.push_digits(digits, None)?,
        _ => return None,
    }
    if is_separator(tokens.get(i + 3)) == Some(sep) {
        match tokens.get(i + 4)? {
            Token::Number(digits) => ymd.push_digits(digits, None)?,
            _ => return None,
        }
        return Some(i + 5);
    }
    Some(i + 3)
}

/// Handle the number at `i`. Returns the next token index.
fn numeric_token(tokens: &[Token], i: usize, digits: &str, ymd: &mut Ymd) -> Option<usize> {
    let len = digits.len();

    // HHMM after a complete date
    if ymd.values.len() == 3 && (len == 2 || len == 4) {
        return Some(i + 1);
    }

    // YYMMDD, or HHMMSS once a date has started
    if len == 6 {
        if ymd.values.is_empty() {
            ymd.push_digits(&digits[..2], None)?;
            ymd.push_digits(&digits[2..4], None)?;
            ymd.push_digits(&digits[4..], None)?;
        }
        return Some(i + 1);
    }

    // YYYYMMDD[hhmm[ss]]
    if matches!(len, 8 | 12 | 14) {
        ymd.push_digits(&digits[..4], Some(Label::Year))?;
        ymd.push_digits(&digits[4..6], None)?;
        ymd.push_digits(&digits[6..8], None)?;
        return Some(i + 1);
    }

    // 10h, 30 min
    if is_hms(tokens.get(i + 1)) {
        return Some(i + 2);
    }
    if tokens.get(i + 1) == Some(&Token::Space) && is_hms(tokens.get(i + 2)) {
        return Some(i + 3);
    }

    // Bare hour: 8pm, 8 pm, 8 a.m.
    let value: i64 = digits.parse().ok()?;
    if value < 24 {
        if is_ampm(tokens.get(i + 1)) {
            return Some(i + 2);
        }
        if tokens.get(i + 1) == Some(&Token::Space) && is_ampm(tokens.get(i + 2)) {
            return Some(i + 3);
        }
    }

    if let Some(sep) = is_separator(tokens.get(i + 1)) {
        // 01-01[-01], 01-Jan[-01]
        ymd.push_digits(digits, None)?;
        match tokens.get(i + 2) {
            Some(second) if !is_jump(second) => {
                ymd.push_member(second)?;
                if is_separator(tokens.get(i + 3)) == Some(sep) {
                    ymd.push_member(tokens.get(i + 4)?)?;
                    return Some(i + 5);
                }
                return Some(i + 3);
            }
            _ => return Some(i + 2),
        }
    }

    match tokens.get(i + 1) {
        None => {
            ymd.push_number(value)?;
            Some(i + 1)
        }
        Some(next) if is_jump(next) => {
            ymd.push_number(value)?;
            Some(i + 2)
        }
        // Glued to a word, like "10mg"; kept only if it could be a day
        Some(_) => {
            if ymd.could_be_day(value) {
                ymd.push_number(value)?;
            }
            Some(i + 1)
        }
    }
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month.checked_add(1)?)
    };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    Some(first_of_next.pred_opt()?.day())
}
