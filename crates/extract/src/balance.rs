use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

/// How many ranked candidates are kept for diagnostics.
pub const MAX_TOP_CANDIDATES: usize = 5;

/// Amounts at or above this are OCR garbage, not balances.
const MAX_PLAUSIBLE: i64 = 1_000_000_000;

/// Balance-relevance triggers, bilingual. A line's score is the number of
/// these it contains.
const BALANCE_KEYWORDS: [&str; 13] = [
    "available",
    "balance",
    "total",
    "amount",
    "current",
    "ยอดคงเหลือ",
    "ยอดเงิน",
    "คงเหลือ",
    "ยอดพร้อมใช้",
    "thb",
    "฿",
    "บาท",
    "baht",
];

re!(re_amount_prefixed, r"(?i)(?:฿|thb|บาท)\s*([\d,]+(?:\.\d{1,2})?)");
re!(re_amount_suffixed, r"(?i)([\d,]+(?:\.\d{1,2})?)\s*(?:บาท|thb|baht)");
re!(re_amount_grouped, r"\b\d{1,3}(?:,\d{3})+(?:\.\d{1,2})?\b");
re!(re_amount_bare, r"\b\d{4,}(?:\.\d{1,2})?\b");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    High,
    Medium,
    Low,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::High => write!(f, "high"),
            Tier::Medium => write!(f, "medium"),
            Tier::Low => write!(f, "low"),
        }
    }
}

/// One monetary literal found on one line; inherits the whole line's
/// balance-relevance score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceCandidate {
    pub value: Decimal,
    pub source_line: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceReport {
    pub value: Decimal,
    pub source_line: String,
    pub confidence: Tier,
    /// Top candidates in rank order, for the review UI.
    pub top_candidates: Vec<BalanceCandidate>,
}

/// Pick the most likely account balance out of noisy bank-screenshot OCR.
///
/// Every line is scanned with four regex passes (currency-prefixed,
/// currency-suffixed, comma-grouped, bare ≥4-digit); a line may contribute
/// several raw hits — ranking absorbs the redundancy. Candidates sort by
/// `(score desc, value desc)`: balances are usually the largest number on a
/// relevant line. Total over its input; garbage text yields a low tier, not
/// an error.
pub fn extract_balance(ocr_text: &str) -> BalanceReport {
    let mut candidates: Vec<BalanceCandidate> = Vec::new();

    for line in ocr_text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let normalized = normalize_thai_digits(line);
        let score = line_score(&normalized);
        for value in harvest_amounts(&normalized) {
            candidates.push(BalanceCandidate {
                value,
                source_line: line.to_string(),
                score,
            });
        }
    }

    if candidates.is_empty() {
        return BalanceReport {
            value: Decimal::ZERO,
            source_line: String::new(),
            confidence: Tier::Low,
            top_candidates: Vec::new(),
        };
    }

    candidates.sort_by(|a, b| b.score.cmp(&a.score).then(b.value.cmp(&a.value)));
    let sole_candidate = candidates.len() == 1;
    let top = candidates[0].clone();

    let confidence = if top.score >= 2 {
        Tier::High
    } else if top.score >= 1 || sole_candidate {
        Tier::Medium
    } else {
        Tier::Low
    };

    candidates.truncate(MAX_TOP_CANDIDATES);
    BalanceReport {
        value: top.value,
        source_line: top.source_line,
        confidence,
        top_candidates: candidates,
    }
}

fn normalize_thai_digits(line: &str) -> String {
    line.chars()
        .map(|c| match c {
            '๐'..='๙' => char::from_digit(c as u32 - '๐' as u32, 10).unwrap_or(c),
            other => other,
        })
        .collect()
}

fn line_score(line: &str) -> u32 {
    let lower = line.to_lowercase();
    BALANCE_KEYWORDS.iter().filter(|k| lower.contains(*k)).count() as u32
}

fn harvest_amounts(line: &str) -> Vec<Decimal> {
    let mut amounts = Vec::new();
    for caps in re_amount_prefixed().captures_iter(line) {
        if let Some(m) = caps.get(1) {
            amounts.extend(parse_amount(m.as_str()));
        }
    }
    for caps in re_amount_suffixed().captures_iter(line) {
        if let Some(m) = caps.get(1) {
            amounts.extend(parse_amount(m.as_str()));
        }
    }
    for m in re_amount_grouped().find_iter(line) {
        amounts.extend(parse_amount(m.as_str()));
    }
    for m in re_amount_bare().find_iter(line) {
        amounts.extend(parse_amount(m.as_str()));
    }
    amounts
}

fn parse_amount(s: &str) -> Option<Decimal> {
    let value = Decimal::from_str(&s.replace(',', "")).ok()?;
    if value <= Decimal::ZERO || value >= Decimal::from(MAX_PLAUSIBLE) {
        return None;
    }
    Some(value)
}
