use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use satang_core::{CanonicalOptionSet, FieldKind};
use satang_resolve::OptionMatcher;

// Additive confidence weight contributed by each extractor on success.
const W_DIRECTION: f32 = 0.4;
const W_AMOUNT: f32 = 0.4;
const W_DATE: f32 = 0.1;
const W_PROPERTY: f32 = 0.05;
const W_PAYMENT: f32 = 0.2;
const W_CATEGORY: f32 = 0.3;

/// Aggregate confidence required before a quick entry can be accepted.
const ACCEPT_THRESHOLD: f32 = 0.75;

/// Property is a lower-stakes field, so its acceptance bar sits below the
/// matcher's own 0.8.
const PROPERTY_THRESHOLD: f32 = 0.5;

const EMPTY_DETAIL: &str = "Manual entry";

re!(re_credit_words, r"(?i)\b(credit|income|in|revenue|sales|rental|deposit)\b");
re!(re_debit_words, r"(?i)\b(debit|expense|exp|out|payment|paid|cost)\b");

re!(re_currency_unit, r"(?i)\b(thb|baht|bath|dollars?|usd)\b");
re!(re_amount, r"\d{1,3}(?:,\d{3})+(?:\.\d{1,2})?|\d+(?:\.\d{1,2})?");

re!(re_date_dmy_slash, r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b");
re!(re_date_dmy_dash, r"\b(\d{1,2})-(\d{1,2})-(\d{4})\b");
re!(re_date_iso, r"\b(\d{4})-(\d{2})-(\d{2})\b");
re!(re_be_marker, r"^\s*(?i:be\b|b\.e\.?|พ\.ศ\.?)");

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Last-resort property triggers, applied only when the option matcher finds
/// nothing. Keeps quick entry working even if someone edits the keyword
/// tables out of the deployed option set.
const EMERGENCY_PROPERTIES: [(&str, &str); 5] = [
    ("alesia", "Alesia House"),
    ("lanna", "Lanna House"),
    ("parents", "Parents House"),
    ("sia", "Sia Moon - Land - General"),
    ("moon", "Sia Moon - Land - General"),
];

/// One quick-entry line resolved into ledger columns, with per-run diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedCommand {
    pub debit: Decimal,
    pub credit: Decimal,
    pub day: String,
    /// 3-letter month abbreviation, e.g. `"Oct"`.
    pub month: String,
    pub year: String,
    /// Empty when no property signal was found.
    pub property: String,
    pub type_of_operation: String,
    pub type_of_payment: String,
    pub detail: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub confidence: f32,
    pub accepted: bool,
    /// Why fields defaulted or acceptance failed; for the review queue and
    /// the LLM-fallback escalation decision.
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Credit,
    Debit,
}

struct DateHit {
    date: NaiveDate,
    literal: String,
}

/// Heuristic parser for single-line quick entries like
/// `"debit 2000 salaries cash"`.
///
/// A fixed pipeline of independent extractors runs over the same input, each
/// contributing fields and an additive confidence weight. Never fails: an
/// unparseable line comes back with `accepted = false` and the reasons
/// recorded. The caller escalates rejected lines to the LLM extractor.
pub struct CommandParser<'a> {
    options: &'a CanonicalOptionSet,
    matcher: OptionMatcher<'a>,
}

impl<'a> CommandParser<'a> {
    pub fn new(options: &'a CanonicalOptionSet) -> Self {
        Self { options, matcher: OptionMatcher::new(options) }
    }

    pub fn parse(&self, input: &str) -> ParsedCommand {
        let input = input.trim();
        let mut reasons = Vec::new();
        let mut confidence = 0.0f32;
        // Literal tokens consumed by the extractors, removed from the detail.
        let mut consumed: Vec<String> = Vec::new();

        // ── Direction ─────────────────────────────────────────────────────
        let direction = detect_direction(input);
        match &direction {
            Some((_, token)) => {
                confidence += W_DIRECTION;
                consumed.push(token.clone());
            }
            None => reasons.push("no transaction direction keyword".to_string()),
        }

        // ── Amount ────────────────────────────────────────────────────────
        let amount = extract_amount(input);
        match &amount {
            Some((_, literal)) => {
                confidence += W_AMOUNT;
                consumed.push(literal.clone());
            }
            None => reasons.push("no amount found".to_string()),
        }

        let (mut debit, mut credit) = (Decimal::ZERO, Decimal::ZERO);
        if let Some((value, _)) = &amount {
            match direction {
                Some((Direction::Credit, _)) => credit = *value,
                Some((Direction::Debit, _)) => debit = *value,
                // Direction unknown: the amount cannot be placed on either
                // side, so both columns stay zero.
                None => reasons.push("amount left unassigned".to_string()),
            }
        }

        // ── Date ──────────────────────────────────────────────────────────
        let date = extract_date(input);
        let resolved_date = match &date {
            Some(hit) => {
                confidence += W_DATE;
                consumed.push(hit.literal.clone());
                hit.date
            }
            None => Local::now().date_naive(),
        };
        let day = resolved_date.day().to_string();
        let month = MONTH_ABBR[resolved_date.month0() as usize].to_string();
        let year = resolved_date.year().to_string();

        // ── Property ──────────────────────────────────────────────────────
        let mut property = String::new();
        let property_guess = self.matcher.match_property(input, None);
        if property_guess.confidence > PROPERTY_THRESHOLD {
            confidence += W_PROPERTY;
            consumed.push(property_guess.value.clone());
            self.push_keywords(FieldKind::Property, &property_guess.value, &mut consumed);
            property = property_guess.value;
        } else if let Some((value, token)) = emergency_property(input) {
            confidence += W_PROPERTY;
            consumed.push(token.to_string());
            property = value.to_string();
        } else {
            reasons.push("no property signal".to_string());
        }

        // ── Payment ───────────────────────────────────────────────────────
        let payment = self.matcher.match_payment(input, None);
        let payment_matched = payment.matched;
        let type_of_payment = if payment_matched {
            confidence += W_PAYMENT;
            consumed.push(payment.value.clone());
            self.push_keywords(FieldKind::Payment, &payment.value, &mut consumed);
            payment.value
        } else {
            reasons.push("payment method defaulted to Cash".to_string());
            FieldKind::Payment.default_value().to_string()
        };

        // ── Category ──────────────────────────────────────────────────────
        let category = self.matcher.match_category(input, None);
        let category_matched = category.matched;
        let type_of_operation = if category_matched {
            confidence += W_CATEGORY;
            consumed.push(category.value.clone());
            self.push_keywords(FieldKind::Category, &category.value, &mut consumed);
            category.value
        } else {
            reasons.push("category needs review (Uncategorized)".to_string());
            FieldKind::Category.default_value().to_string()
        };

        let confidence = confidence.min(1.0);

        // A usable entry needs a concrete number plus at least one of: a
        // specific category, a specific payment channel, a clear direction.
        let amount_found = amount.is_some();
        let direction_detected = direction.is_some();
        let anchored = category_matched || payment_matched || direction_detected;
        let accepted = confidence >= ACCEPT_THRESHOLD && amount_found && anchored;
        if !accepted {
            if confidence < ACCEPT_THRESHOLD {
                reasons.push(format!(
                    "confidence {confidence:.2} below acceptance bar {ACCEPT_THRESHOLD}"
                ));
            }
            if amount_found && !anchored {
                reasons.push("no category, payment, or direction to anchor the entry".to_string());
            }
        }

        let detail = remaining_detail(input, &consumed);

        ParsedCommand {
            debit,
            credit,
            day,
            month,
            year,
            property,
            type_of_operation,
            type_of_payment,
            detail,
            reference: String::new(),
            confidence,
            accepted,
            reasons,
        }
    }

    /// Queue the trigger keywords of a resolved value for detail removal;
    /// the keyword, not the canonical label, is usually what the user typed.
    fn push_keywords(&self, kind: FieldKind, value: &str, consumed: &mut Vec<String>) {
        if let Some(keywords) = self.options.keywords(kind).get(value) {
            consumed.extend(keywords.iter().cloned());
        }
    }
}

// ── Extractors ───────────────────────────────────────────────────────────────

fn detect_direction(input: &str) -> Option<(Direction, String)> {
    // Credit family first; a line naming both resolves as credit.
    if let Some(m) = re_credit_words().find(input) {
        return Some((Direction::Credit, m.as_str().to_string()));
    }
    if let Some(m) = re_debit_words().find(input) {
        return Some((Direction::Debit, m.as_str().to_string()));
    }
    None
}

fn extract_amount(input: &str) -> Option<(Decimal, String)> {
    // Currency symbols and unit words are noise around the number itself.
    let stripped = re_currency_unit().replace_all(input, " ");
    let stripped = stripped.replace(['฿', '$'], " ");

    let literal = re_amount().find(&stripped)?.as_str().to_string();
    let value = Decimal::from_str(&literal.replace(',', "")).ok()?;
    Some((value, literal))
}

fn extract_date(input: &str) -> Option<DateHit> {
    for (pattern, year_first) in [
        (re_date_iso(), true),
        (re_date_dmy_slash(), false),
        (re_date_dmy_dash(), false),
    ] {
        let Some(caps) = pattern.captures(input) else { continue };
        let m = caps.get(0)?;

        let (day, month, mut year): (u32, u32, i32) = if year_first {
            (
                caps.get(3)?.as_str().parse().ok()?,
                caps.get(2)?.as_str().parse().ok()?,
                caps.get(1)?.as_str().parse().ok()?,
            )
        } else {
            (
                caps.get(1)?.as_str().parse().ok()?,
                caps.get(2)?.as_str().parse().ok()?,
                caps.get(3)?.as_str().parse().ok()?,
            )
        };

        // Buddhist Era: explicit trailing marker, or a year far enough in the
        // future that it can only be BE.
        let mut end = m.end();
        if let Some(marker) = re_be_marker().find(&input[m.end()..]) {
            year -= 543;
            end += marker.end();
        } else if year > 2100 {
            year -= 543;
        }

        // Malformed dates are skipped, not raised; the caller defaults to today.
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        return Some(DateHit { date, literal: input[m.start()..end].to_string() });
    }
    None
}

fn emergency_property(input: &str) -> Option<(&'static str, &'static str)> {
    let lower = input.to_lowercase();
    EMERGENCY_PROPERTIES
        .iter()
        .find(|(token, _)| lower.contains(token))
        .map(|&(token, value)| (value, token))
}

/// Strip every consumed token from the input (word-boundary-safe,
/// case-insensitive), collapse the leftovers, and fall back to a fixed
/// placeholder when nothing remains.
fn remaining_detail(input: &str, consumed: &[String]) -> String {
    let mut text = input.to_string();
    for token in consumed {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if let Ok(re) = Regex::new(&token_pattern(token)) {
            text = re.replace_all(&text, " ").into_owned();
        }
    }
    // Unit words and symbols were consumed by the amount extractor.
    text = re_currency_unit().replace_all(&text, " ").into_owned();
    text = text.replace(['฿', '$'], " ");

    let detail = text
        .split_whitespace()
        .filter(|t| t.chars().any(char::is_alphanumeric))
        .collect::<Vec<_>>()
        .join(" ");
    if detail.is_empty() {
        EMPTY_DETAIL.to_string()
    } else {
        detail
    }
}

/// Case-insensitive pattern for one consumed token. `\b` is only valid next
/// to a word character, so it is applied per edge; a token ending in `.`
/// (like the Thai era marker) would otherwise never match.
fn token_pattern(token: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let lead = if token.chars().next().is_some_and(is_word) { r"\b" } else { "" };
    let trail = if token.chars().last().is_some_and(is_word) { r"\b" } else { "" };
    format!("(?i){lead}{}{trail}", regex::escape(token))
}
