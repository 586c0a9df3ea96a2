pub mod options;

pub use options::{CanonicalOptionSet, ConfigError, FieldKind, KeywordTable};
