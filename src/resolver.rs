//! Maps loosely-worded user text to a concrete dataset column.
//!
//! Resolution runs three stages in order, first hit wins: the synonym table
//! (substring match, table order breaks ties), a fuzzy match over normalized
//! column names with a similarity floor, and a token-overlap fallback. A miss
//! is an ordinary `None`, reported to the user as "insufficient data".

use crate::config::BotConfig;
use crate::dataset::Dataset;
use regex::Regex;
use std::sync::OnceLock;

/// Lowercases the text and strips every character that is not a Cyrillic
/// letter, a Latin letter, a digit or a space. Cyrillic and Latin scripts are
/// treated symmetrically so mixed-script questions normalize predictably.
pub fn normalize(text: &str) -> String {
    static KEEP: OnceLock<Regex> = OnceLock::new();
    let re = KEEP.get_or_init(|| Regex::new(r"[^а-яa-z0-9 ]").expect("normalize regex"));
    re.replace_all(&text.to_lowercase(), "").into_owned()
}

/// Normalized Levenshtein similarity in `[0, 1]`: `1 - distance / max_len`.
/// Two empty strings are identical; an empty string matches nothing else.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&a, &b) as f64 / max_len as f64
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(prev[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut prev, &mut current);
    }
    prev[b.len()]
}

/// Resolves free text (or a button label) to a column of the snapshot.
/// Returns the dataset's own column name so the reference lives as long as
/// the snapshot.
pub fn resolve<'a>(text: &str, dataset: &'a Dataset, config: &BotConfig) -> Option<&'a str> {
    let lower = text.to_lowercase();

    // Stage 1: synonym table, in table order. Substring match on purpose: a
    // keyword embedded in a longer word still counts.
    for synonym in &config.synonyms {
        if lower.contains(&synonym.keyword) {
            if let Some(column) = dataset.column_name(&synonym.column) {
                return Some(column);
            }
        }
    }

    let needle = normalize(&lower);
    let normalized: Vec<String> = dataset.columns().iter().map(|c| normalize(c)).collect();

    // Stage 2: closest normalized column name above the similarity floor.
    // Strict comparison keeps the earliest column on exact score ties.
    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in normalized.iter().enumerate() {
        let score = similarity(&needle, candidate);
        if best.map_or(true, |(_, b)| score > b) {
            best = Some((idx, score));
        }
    }
    if let Some((idx, score)) = best {
        if score >= config.resolver.fuzzy_cutoff {
            let fragment = &normalized[idx];
            if let Some(pos) = normalized.iter().position(|c| c.contains(fragment.as_str())) {
                return Some(dataset.columns()[pos].as_str());
            }
        }
    }

    // Stage 3: token overlap on normalized text; short tokens are noise.
    let tokens: Vec<&str> = needle
        .split_whitespace()
        .filter(|t| t.chars().count() >= config.resolver.min_token_len)
        .collect();
    for (idx, candidate) in normalized.iter().enumerate() {
        if tokens.iter().any(|t| candidate.contains(t)) {
            return Some(dataset.columns()[idx].as_str());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Synonym;

    fn dataset(columns: &[&str]) -> Dataset {
        Dataset::new(columns.iter().map(|c| c.to_string()).collect()).unwrap()
    }

    fn config(synonyms: &[(&str, &str)]) -> BotConfig {
        BotConfig {
            synonyms: synonyms
                .iter()
                .map(|(k, c)| Synonym {
                    keyword: k.to_string(),
                    column: c.to_string(),
                })
                .collect(),
            ..BotConfig::default()
        }
    }

    #[test]
    fn normalize_strips_punctuation_both_scripts() {
        assert_eq!(normalize("Укажите ваш пол."), "укажите ваш пол");
        assert_eq!(normalize("Top-3 (banks)!"), "top3 banks");
        assert_eq!(normalize("Вопрос №1?"), "вопрос 1");
    }

    #[test]
    fn synonym_matches_as_substring_anywhere() {
        let ds = dataset(&["Пол", "Возраст"]);
        let cfg = config(&[("гендерный", "Пол"), ("пол", "Пол"), ("возраст", "Возраст")]);
        // Keyword inside running text.
        assert_eq!(resolve("покажи гендерный состав", &ds, &cfg), Some("Пол"));
        // Keyword embedded inside a longer word still matches.
        assert_eq!(resolve("неполадки", &ds, &cfg), Some("Пол"));
    }

    #[test]
    fn synonym_table_order_breaks_ties() {
        let ds = dataset(&["Колонка А", "Колонка Б"]);
        let first = config(&[("ключ", "Колонка А"), ("ключа", "Колонка Б")]);
        assert_eq!(resolve("про ключа speech", &ds, &first), Some("Колонка А"));
        let swapped = config(&[("ключа", "Колонка Б"), ("ключ", "Колонка А")]);
        assert_eq!(resolve("про ключа speech", &ds, &swapped), Some("Колонка Б"));
    }

    #[test]
    fn synonym_skips_columns_absent_from_snapshot() {
        let ds = dataset(&["Возраст"]);
        let cfg = config(&[("пол", "Пол"), ("возраст", "Возраст")]);
        // "пол" matches textually, but its column is not in this snapshot, so
        // the next matching entry wins.
        assert_eq!(resolve("пол и возраст", &ds, &cfg), Some("Возраст"));
    }

    #[test]
    fn fuzzy_match_tolerates_typos() {
        let ds = dataset(&["Укажите ваш возраст."]);
        let cfg = config(&[]);
        assert_eq!(
            resolve("укажите ваш возрост", &ds, &cfg),
            Some("Укажите ваш возраст.")
        );
    }

    #[test]
    fn token_overlap_fallback() {
        let ds = dataset(&["Назовите банк, отделение которого вы посещали недавно."]);
        let cfg = config(&[]);
        // Too short for the fuzzy stage to clear the floor, but the token
        // lands inside the normalized column name.
        assert_eq!(
            resolve("отделение?", &ds, &cfg),
            Some("Назовите банк, отделение которого вы посещали недавно.")
        );
    }

    #[test]
    fn short_tokens_do_not_trigger_fallback() {
        let ds = dataset(&["Оценка по шкале от 1 до 10"]);
        let cfg = config(&[]);
        // Every token has fewer than three characters.
        assert_eq!(resolve("? от 1", &ds, &cfg), None);
    }

    #[test]
    fn no_match_is_none_not_panic() {
        let ds = dataset(&["Пол", "Возраст"]);
        let cfg = config(&[]);
        assert_eq!(resolve("совершенно посторонний запрос", &ds, &cfg), None);
        let empty = dataset(&[]);
        assert_eq!(resolve("что угодно", &empty, &cfg), None);
    }

    #[test]
    fn similarity_is_symmetric_and_bounded() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("abc", ""), 0.0);
        let a = similarity("возраст", "возрост");
        let b = similarity("возрост", "возраст");
        assert_eq!(a, b);
        assert!(a > 0.8 && a < 1.0);
    }
}
