use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical value → trigger keywords. `BTreeMap` keeps iteration order
/// deterministic, so tie-breaks between equally-scored values are stable.
pub type KeywordTable = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse option-set TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("{field} keyword table references '{value}', which is not a canonical {field} option")]
    UnknownKeywordTarget { field: FieldKind, value: String },
}

/// The three dropdown-validated ledger columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Property,
    Category,
    Payment,
}

impl FieldKind {
    /// Soft default used when the input carries no signal at all. Downstream
    /// review is expected to correct it; `"Uncategorized"` doubles as the
    /// needs-human-review sentinel.
    pub fn default_value(self) -> &'static str {
        match self {
            FieldKind::Property => "Sia Moon",
            FieldKind::Category => "Uncategorized",
            FieldKind::Payment => "Cash",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Property => write!(f, "property"),
            FieldKind::Category => write!(f, "category"),
            FieldKind::Payment => write!(f, "payment"),
        }
    }
}

/// The full dropdown configuration: one ordered option list per field plus a
/// keyword table mapping canonical values to their trigger words.
///
/// Loaded once at startup (TOML file or [`CanonicalOptionSet::builtin`]) and
/// passed by reference into every matcher; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalOptionSet {
    pub properties: Vec<String>,
    pub operation_categories: Vec<String>,
    pub payment_methods: Vec<String>,
    #[serde(default)]
    pub property_keywords: KeywordTable,
    #[serde(default)]
    pub category_keywords: KeywordTable,
    #[serde(default)]
    pub payment_keywords: KeywordTable,
}

impl CanonicalOptionSet {
    /// Parse from a TOML document and validate the keyword-table invariant.
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let set: CanonicalOptionSet = toml::from_str(toml_content)?;
        set.validate()?;
        Ok(set)
    }

    /// Every keyword-table key must be a member of its option list; the
    /// persistence layer rejects anything outside the dropdown.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in [FieldKind::Property, FieldKind::Category, FieldKind::Payment] {
            let values = self.values(kind);
            for key in self.keywords(kind).keys() {
                if !values.iter().any(|v| v == key) {
                    return Err(ConfigError::UnknownKeywordTarget {
                        field: kind,
                        value: key.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn values(&self, kind: FieldKind) -> &[String] {
        match kind {
            FieldKind::Property => &self.properties,
            FieldKind::Category => &self.operation_categories,
            FieldKind::Payment => &self.payment_methods,
        }
    }

    pub fn keywords(&self, kind: FieldKind) -> &KeywordTable {
        match kind {
            FieldKind::Property => &self.property_keywords,
            FieldKind::Category => &self.category_keywords,
            FieldKind::Payment => &self.payment_keywords,
        }
    }

    /// The option set shipped with the app: the Sia Moon property-business
    /// ledger columns. Production deployments load their own TOML instead.
    pub fn builtin() -> Self {
        let set = CanonicalOptionSet {
            properties: string_vec(&[
                "Sia Moon",
                "Sia Moon - Land - General",
                "Alesia House",
                "Lanna House",
                "Parents House",
            ]),
            operation_categories: string_vec(&[
                "Rental Income",
                "Sales Income",
                "Salaries & Wages",
                "Utilities",
                "Maintenance & Repairs",
                "Construction",
                "Gardening",
                "Groceries & Supplies",
                "Taxes & Fees",
                "Uncategorized",
            ]),
            payment_methods: string_vec(&[
                "Cash",
                "Bank Transfer",
                "PromptPay",
                "Credit Card",
                "Cheque",
            ]),
            property_keywords: table(&[
                ("Sia Moon", &["sia moon", "siamoon", "office"]),
                ("Sia Moon - Land - General", &["land", "general"]),
                ("Alesia House", &["alesia"]),
                ("Lanna House", &["lanna"]),
                ("Parents House", &["parents", "parent"]),
            ]),
            category_keywords: table(&[
                ("Rental Income", &["rent", "rental", "tenant", "booking", "airbnb"]),
                ("Sales Income", &["sales", "sale", "revenue"]),
                (
                    "Salaries & Wages",
                    &["salary", "salaries", "wage", "wages", "payroll", "staff", "เงินเดือน"],
                ),
                (
                    "Utilities",
                    &["electric", "electricity", "water", "internet", "wifi", "ค่าไฟ", "ค่าน้ำ"],
                ),
                (
                    "Maintenance & Repairs",
                    &["repair", "repairs", "maintenance", "plumber", "aircon", "ซ่อม"],
                ),
                ("Construction", &["construction", "builder", "cement", "concrete"]),
                ("Gardening", &["garden", "gardening", "landscaping", "สวน"]),
                ("Groceries & Supplies", &["grocery", "groceries", "supplies", "makro"]),
                ("Taxes & Fees", &["tax", "taxes", "fee", "fees", "permit"]),
                ("Uncategorized", &[]),
            ]),
            payment_keywords: table(&[
                ("Cash", &["cash", "เงินสด"]),
                (
                    "Bank Transfer",
                    &["bank", "transfer", "scb", "kbank", "kasikorn", "krungsri", "โอน"],
                ),
                ("PromptPay", &["promptpay", "prompt pay", "qr", "พร้อมเพย์"]),
                ("Credit Card", &["card", "visa", "mastercard", "amex", "บัตร"]),
                ("Cheque", &["cheque", "check"]),
            ]),
        };
        debug_assert!(set.validate().is_ok());
        set
    }
}

fn string_vec(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn table(entries: &[(&str, &[&str])]) -> KeywordTable {
    entries
        .iter()
        .map(|(value, keywords)| (value.to_string(), string_vec(keywords)))
        .collect()
}
