// ── Compiled regex cache ─────────────────────────────────────────────────────
// Textually scoped: defined before the modules so both extractors can use it.

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static regex::Regex {
            static R: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            R.get_or_init(|| regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub mod balance;
pub mod command;

pub use balance::{extract_balance, BalanceCandidate, BalanceReport, Tier};
pub use command::{CommandParser, ParsedCommand};
