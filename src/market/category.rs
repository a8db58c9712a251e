//! Keyword category inference

/// Category used when no keyword matches
pub const OTHER_CATEGORY: &str = "other";

/// Ordered lookup table; the first category with a matching keyword wins
pub const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "politics",
        &[
            "election",
            "president",
            "vote",
            "congress",
            "senate",
            "minister",
            "government",
        ],
    ),
    (
        "sports",
        &[
            "nba",
            "nfl",
            "mlb",
            "soccer",
            "football",
            "basketball",
            "baseball",
            "league",
        ],
    ),
    ("crypto", &["bitcoin", "eth", "crypto", "token", "blockchain"]),
    (
        "entertainment",
        &["movie", "film", "actor", "actress", "award", "song", "album"],
    ),
    ("tech", &["ai", "openai", "technology", "software", "app", "launch"]),
];

/// Infer a market category from its question
///
/// Plain substring matching, so short keywords also hit inside longer words
/// ("eth" in "whether").
pub fn detect_category(question: &str) -> &'static str {
    let question = question.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| question.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(OTHER_CATEGORY)
}
