pub mod keywords;
pub mod matcher;
pub mod similarity;

pub use keywords::score_keywords;
pub use matcher::{MatchResult, OptionMatcher, MATCH_THRESHOLD};
pub use similarity::{levenshtein_distance, similarity};
