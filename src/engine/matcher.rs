use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::connectors::DeprecationRecord;
use crate::constants::{MAX_FEATURE_HITS, SEARCH_STOP_WORDS};

static PENDING_REMOVAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"pending removal in python\s*(\d+\.\d+)").expect("static regex"));

static NON_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9_.]+").expect("static regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchMode {
    /// Every record removed in one exact version
    RemovalList,
    /// Keyword relevance search
    FeatureSearch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult<'a> {
    pub mode: MatchMode,
    pub target: Option<String>,
    pub hits: Vec<&'a DeprecationRecord>,
}

/// Find the catalog records a question is about
pub fn match_deprecations<'a>(question: &str, catalog: &'a [DeprecationRecord]) -> MatchResult<'a> {
    let q = question.to_lowercase();

    if let Some(caps) = PENDING_REMOVAL_RE.captures(&q) {
        let target = caps[1].to_string();
        let hits = catalog
            .iter()
            .filter(|d| {
                d.version_removed
                    .as_deref()
                    .is_some_and(|v| v.eq_ignore_ascii_case(&target))
            })
            .collect();

        return MatchResult {
            mode: MatchMode::RemovalList,
            target: Some(target),
            hits,
        };
    }

    let tokens = tokenize(&q);
    let mut scored: Vec<(usize, &DeprecationRecord)> = catalog
        .iter()
        .map(|d| (score(d, &tokens), d))
        .filter(|(s, _)| *s > 0)
        .collect();
    // sort_by is stable, ties keep catalog order
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    MatchResult {
        mode: MatchMode::FeatureSearch,
        target: None,
        hits: scored
            .into_iter()
            .take(MAX_FEATURE_HITS)
            .map(|(_, d)| d)
            .collect(),
    }
}

/// Split a lowercased question into search tokens
pub fn tokenize(q: &str) -> Vec<String> {
    NON_TOKEN_RE
        .replace_all(q, " ")
        .split_whitespace()
        .filter(|t| !SEARCH_STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// +2 when a token appears anywhere in the record, +3 more when it is in the feature name
pub fn score(record: &DeprecationRecord, tokens: &[String]) -> usize {
    let feature = record.feature.to_lowercase();
    let haystack = format!(
        "{} {} {}",
        record.feature,
        record.module.as_deref().unwrap_or(""),
        record.description
    )
    .to_lowercase();

    tokens
        .iter()
        .filter(|t| !t.is_empty())
        .map(|t| {
            let mut s = 0;
            if haystack.contains(t.as_str()) {
                s += 2;
            }
            if feature.contains(t.as_str()) {
                s += 3;
            }
            s
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<DeprecationRecord> {
        vec![
            DeprecationRecord::new("ast.Num", "3.8")
                .removed_in("3.14")
                .in_module("ast")
                .described("Use ast.Constant instead."),
            DeprecationRecord::new("ctypes.SetPointerType", "3.13")
                .removed_in("3.15")
                .in_module("ctypes")
                .described("Undocumented function."),
            DeprecationRecord::new("locale.getdefaultlocale", "3.11")
                .removed_in("3.15")
                .in_module("locale")
                .described("Use locale.getlocale() instead."),
            DeprecationRecord::new("http.server.CGIHTTPRequestHandler", "3.13")
                .removed_in("3.15")
                .in_module("http.server"),
        ]
    }

    fn features(result: &MatchResult<'_>) -> Vec<String> {
        result.hits.iter().map(|d| d.feature.clone()).collect()
    }

    #[test]
    fn test_removal_list_keeps_catalog_order() {
        let catalog = catalog();
        let result = match_deprecations("What is pending removal in Python 3.15?", &catalog);

        assert_eq!(result.mode, MatchMode::RemovalList);
        assert_eq!(result.target.as_deref(), Some("3.15"));
        assert_eq!(
            features(&result),
            vec![
                "ctypes.SetPointerType",
                "locale.getdefaultlocale",
                "http.server.CGIHTTPRequestHandler"
            ]
        );
    }

    #[test]
    fn test_removal_list_never_falls_back_to_search() {
        let catalog = catalog();
        let result = match_deprecations("pending removal in python 3.99 for ast", &catalog);
        assert_eq!(result.mode, MatchMode::RemovalList);
        assert_eq!(result.target.as_deref(), Some("3.99"));
        assert!(result.hits.is_empty());
    }

    #[test]
    fn test_removal_list_matches_every_minor_version() {
        let mut catalog = Vec::new();
        for minor in 10..=16 {
            catalog.push(DeprecationRecord::new(format!("feature{}", minor), "3.9").removed_in(format!("3.{}", minor)));
        }

        for minor in 10..=16 {
            let question = format!("pending removal in Python 3.{}", minor);
            let result = match_deprecations(&question, &catalog);
            let expected = format!("3.{}", minor);
            assert_eq!(result.target.as_deref(), Some(expected.as_str()));
            assert_eq!(result.hits.len(), 1);
            assert_eq!(result.hits[0].version_removed.as_deref(), Some(expected.as_str()));
        }
    }

    #[test]
    fn test_tokenize_drops_stop_words_and_punctuation() {
        assert_eq!(
            tokenize("is ast.num deprecated? (removal eol)"),
            vec!["is", "ast.num"]
        );
        assert!(tokenize("deprecated removal!!").is_empty());
    }

    #[test]
    fn test_feature_token_outscores_description_token() {
        let catalog = catalog();
        let result = match_deprecations("Is getlocale deprecated?", &catalog);

        assert_eq!(result.mode, MatchMode::FeatureSearch);
        // "getlocale" hits locale.getdefaultlocale only via its description
        assert_eq!(features(&result), vec!["locale.getdefaultlocale"]);

        let tokens = tokenize("ctypes");
        assert_eq!(score(&catalog[1], &tokens), 5);
        assert_eq!(score(&catalog[0], &tokens), 0);
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let catalog = catalog();
        let result = match_deprecations("deprecated?", &catalog);
        assert_eq!(result.mode, MatchMode::FeatureSearch);
        assert!(result.hits.is_empty());
    }

    #[test]
    fn test_search_is_capped_and_sorted() {
        let catalog: Vec<_> = (0..25)
            .map(|i| {
                let record = DeprecationRecord::new(format!("mod{}.thing", i), "3.12");
                if i % 2 == 0 {
                    record.described("thing helper")
                } else {
                    record
                }
            })
            .collect();

        let tokens = tokenize("thing helper");
        let result = match_deprecations("thing helper", &catalog);
        assert_eq!(result.hits.len(), 10);

        let scores: Vec<_> = result.hits.iter().map(|d| score(d, &tokens)).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert!(scores.iter().all(|s| *s > 0));
        // ties keep catalog order
        assert_eq!(result.hits[0].feature, "mod0.thing");
        assert_eq!(result.hits[1].feature, "mod2.thing");
    }
}
