//! Bag-of-words frequency counting over normalized feedback texts.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::normalizer::normalize;
use crate::stopwords::filter_and_stem;

/// Default size of the per-sentiment top-N list.
pub const DEFAULT_TOP_N: usize = 10;

/// Words of three or more letters. The normalizer has already folded the
/// text to ascii, so a plain letter class is enough.
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-z]{3,}\b").expect("token pattern must compile"));

/// Tokenize an already-normalized text into words of three or more letters.
///
/// Shared by the aggregator and the classifier scoring path so the two sides
/// always see the same token stream.
pub fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    TOKEN.find_iter(normalized).map(|m| m.as_str())
}

/// Most common stemmed words across a set of texts, descending by count.
///
/// Ties break by first occurrence in the concatenated token stream, which
/// makes repeated runs over the same inputs return identical lists.
pub fn most_common_words(texts: &[String], top_n: usize) -> Vec<(String, u64)> {
    if texts.is_empty() {
        return Vec::new();
    }

    let joined = texts
        .iter()
        .map(|t| normalize(t))
        .collect::<Vec<_>>()
        .join(" ");

    let mut counts: HashMap<String, (u64, usize)> = HashMap::new();
    let mut next_rank = 0usize;

    for token in tokens(&joined) {
        let Some(stemmed) = filter_and_stem(token) else {
            continue;
        };
        let entry = counts.entry(stemmed).or_insert_with(|| {
            let rank = next_rank;
            next_rank += 1;
            (0, rank)
        });
        entry.0 += 1;
    }

    let mut ranked: Vec<(String, (u64, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.0.cmp(&a.1.0).then(a.1.1.cmp(&b.1.1)));
    ranked.truncate(top_n);
    ranked.into_iter().map(|(word, (count, _))| (word, count)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_input_yields_empty_list() {
        assert!(most_common_words(&[], DEFAULT_TOP_N).is_empty());
    }

    #[test]
    fn counts_stemmed_words_across_texts() {
        let input = texts(&[
            "Os aparelhos estão ótimos",
            "aparelho novo, adorei",
            "APARELHOS limpos!!!",
        ]);
        let top = most_common_words(&input, DEFAULT_TOP_N);
        assert_eq!(top[0], ("aparelho".to_string(), 3));
    }

    #[test]
    fn stopwords_never_appear() {
        let input = texts(&["muito bom porque sempre tem aula hoje"]);
        let top = most_common_words(&input, DEFAULT_TOP_N);
        assert!(top.iter().all(|(w, _)| w != "porque" && w != "hoje" && w != "muito"));
    }

    #[test]
    fn ties_break_by_first_occurrence() {
        let input = texts(&["esteira bicicleta esteira bicicleta piscina"]);
        let top = most_common_words(&input, DEFAULT_TOP_N);
        assert_eq!(
            top,
            vec![
                ("esteira".to_string(), 2),
                ("bicicleta".to_string(), 2),
                ("piscina".to_string(), 1),
            ]
        );
    }

    #[test]
    fn repeated_runs_are_identical() {
        let input = texts(&[
            "aula de spinning lotada",
            "spinning e esteira lotados",
            "esteira quebrada de novo",
        ]);
        let first = most_common_words(&input, 5);
        for _ in 0..10 {
            assert_eq!(most_common_words(&input, 5), first);
        }
    }

    #[test]
    fn truncates_to_top_n() {
        let input = texts(&["esteira bicicleta piscina natacao musculacao"]);
        assert_eq!(most_common_words(&input, 2).len(), 2);
    }
}
