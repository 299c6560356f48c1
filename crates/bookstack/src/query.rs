//! Search query optimization
//!
//! BookStack's search scores every term, so filler words dilute results.
//! The optimizer strips stopwords and very short tokens before the query
//! hits the API.

/// Dutch and English stopwords that add little value to a search
pub const STOPWORDS: &[&str] = &[
    // Dutch
    "welke", "wat", "is", "zijn", "er", "de", "het", "een", "van", "in", "voor", "op", "aan",
    "met", "te", "hoe", "kan", "moet", "waar",
    // English
    "which", "what", "are", "the", "a", "an", "of", "for", "on", "at", "to", "how", "can",
    "should", "where", "there",
];

/// Minimum token length kept by the optimizer
const MIN_TOKEN_LEN: usize = 3;

/// Optimize a free-text query by dropping stopwords and short tokens
///
/// Lowercases the query, splits on whitespace, drops stopwords and tokens
/// shorter than three characters, and rejoins the survivors with single
/// spaces. If nothing survives, the original query is returned unchanged -
/// we never search on an empty string.
pub fn optimize_query(query: &str) -> String {
    let words: Vec<&str> = query.split_whitespace().collect();
    let important: Vec<String> = words
        .iter()
        .map(|w| w.to_lowercase())
        .filter(|w| !STOPWORDS.contains(&w.as_str()) && w.chars().count() >= MIN_TOKEN_LEN)
        .collect();

    if important.is_empty() {
        return query.to_string();
    }

    important.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_stopwords_and_short_tokens() {
        assert_eq!(optimize_query("welke pagina is dit"), "pagina dit");
    }

    #[test]
    fn test_english_stopwords() {
        assert_eq!(
            optimize_query("how can I configure the backup schedule"),
            "configure backup schedule"
        );
    }

    #[test]
    fn test_all_stopwords_returns_original() {
        assert_eq!(optimize_query("what is the"), "what is the");
        assert_eq!(optimize_query("de het een"), "de het een");
    }

    #[test]
    fn test_never_empty_for_nonempty_input() {
        assert!(!optimize_query("of").is_empty());
        assert!(!optimize_query("ab cd").is_empty());
    }

    #[test]
    fn test_idempotent() {
        let once = optimize_query("how do I reset my password");
        let twice = optimize_query(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_lowercases_and_collapses_whitespace() {
        assert_eq!(optimize_query("Backup   SCHEDULE"), "backup schedule");
    }

    #[test]
    fn test_unchanged_when_already_optimized() {
        assert_eq!(optimize_query("server migration"), "server migration");
    }
}
