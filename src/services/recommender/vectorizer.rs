use std::collections::{BTreeMap, HashMap, HashSet};

use super::sparse::SparseVector;

/// English stop words removed before counting terms
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "an",
    "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are",
    "around", "as", "at", "back", "be", "became", "because", "become", "becomes", "becoming",
    "been", "before", "beforehand", "behind", "being", "below", "beside", "besides", "between",
    "beyond", "both", "but", "by", "can", "cannot", "could", "do", "done", "down", "due",
    "during", "each", "eg", "either", "else", "elsewhere", "enough", "etc", "even", "ever",
    "every", "everyone", "everything", "everywhere", "except", "few", "for", "former",
    "formerly", "from", "further", "had", "has", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "ie", "if", "in", "indeed", "into", "is", "it", "its", "itself", "just",
    "last", "latter", "latterly", "least", "less", "ltd", "many", "may", "me", "meanwhile",
    "might", "more", "moreover", "most", "mostly", "much", "must", "my", "myself", "namely",
    "neither", "never", "nevertheless", "next", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
    "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
    "per", "perhaps", "please", "rather", "re", "same", "seem", "seemed", "seeming", "seems",
    "several", "she", "should", "since", "so", "some", "somehow", "someone", "something",
    "sometime", "sometimes", "somewhere", "still", "such", "than", "that", "the", "their",
    "them", "themselves", "then", "thence", "there", "thereafter", "thereby", "therefore",
    "therein", "thereupon", "these", "they", "this", "those", "though", "through",
    "throughout", "thru", "thus", "to", "together", "too", "toward", "towards", "under",
    "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were", "what",
    "whatever", "when", "whence", "whenever", "where", "whereafter", "whereas", "whereby",
    "wherein", "whereupon", "wherever", "whether", "which", "while", "whither", "who",
    "whoever", "whole", "whom", "whose", "why", "will", "with", "within", "without", "would",
    "yet", "you", "your", "yours", "yourself", "yourselves",
];

/// Splits text into lowercase word tokens of at least two characters, minus stop words
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| w.chars().count() >= 2)
        .filter(|w| !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Fitted vocabulary plus smoothed inverse document frequencies.
///
/// Fitting happens once; `transform` never grows the vocabulary and silently
/// drops unknown terms.
#[derive(Debug, Clone)]
pub struct TermVectorSpace {
    vocabulary: HashMap<String, u32>,
    idf: Vec<f64>,
}

impl TermVectorSpace {
    /// Fits the space over a corpus.
    ///
    /// When the corpus has more than `max_features` distinct terms, only the most
    /// frequent ones (by total count, ties alphabetical) are kept. `max_features == 0`
    /// means unbounded.
    pub fn fit<'a, I>(documents: I, max_features: usize) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut doc_count = 0usize;
        // term -> (total count, document frequency); BTreeMap keeps alphabetical order
        let mut stats: BTreeMap<String, (usize, usize)> = BTreeMap::new();

        for document in documents {
            doc_count += 1;
            let tokens = tokenize(document);
            let mut seen: HashSet<&str> = HashSet::new();
            for token in &tokens {
                let entry = stats.entry(token.clone()).or_insert((0, 0));
                entry.0 += 1;
                if seen.insert(token.as_str()) {
                    entry.1 += 1;
                }
            }
        }

        let mut terms: Vec<(String, usize, usize)> = stats
            .into_iter()
            .map(|(term, (total, df))| (term, total, df))
            .collect();

        if max_features > 0 && terms.len() > max_features {
            // Stable sort keeps alphabetical order among equal counts
            terms.sort_by(|a, b| b.1.cmp(&a.1));
            terms.truncate(max_features);
            terms.sort_by(|a, b| a.0.cmp(&b.0));
        }

        let n = doc_count as f64;
        let mut vocabulary = HashMap::with_capacity(terms.len());
        let mut idf = Vec::with_capacity(terms.len());
        for (index, (term, _, df)) in terms.into_iter().enumerate() {
            vocabulary.insert(term, index as u32);
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
        }

        Self { vocabulary, idf }
    }

    pub fn len(&self) -> usize {
        self.idf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idf.is_empty()
    }

    pub fn term_index(&self, term: &str) -> Option<u32> {
        self.vocabulary.get(term).copied()
    }

    /// Projects text into the fitted space as an L2-normalized tf-idf vector
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<u32, f64> = BTreeMap::new();
        for token in tokenize(text) {
            if let Some(index) = self.vocabulary.get(&token) {
                *counts.entry(*index).or_insert(0.0) += 1.0;
            }
        }

        for (index, weight) in counts.iter_mut() {
            *weight *= self.idf[*index as usize];
        }

        let mut vector = SparseVector::from_map(counts);
        vector.normalize();
        vector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_filters() {
        let tokens = tokenize("The Space-Shooter, a 2D game: X!");
        assert_eq!(tokens, vec!["space", "shooter", "2d", "game"]);
    }

    #[test]
    fn test_tokenize_keeps_underscores() {
        assert_eq!(tokenize("open_world RPG"), vec!["open_world", "rpg"]);
    }

    #[test]
    fn test_fit_assigns_alphabetical_indices() {
        let space = TermVectorSpace::fit(["zebra apple", "mango"], 0);
        assert_eq!(space.len(), 3);
        assert_eq!(space.term_index("apple"), Some(0));
        assert_eq!(space.term_index("mango"), Some(1));
        assert_eq!(space.term_index("zebra"), Some(2));
    }

    #[test]
    fn test_fit_limits_to_most_frequent_terms() {
        let space = TermVectorSpace::fit(["rpg rpg action", "rpg action puzzle", "zombie"], 2);
        assert_eq!(space.len(), 2);
        assert!(space.term_index("rpg").is_some());
        assert!(space.term_index("action").is_some());
        assert!(space.term_index("puzzle").is_none());
        assert!(space.term_index("zombie").is_none());
    }

    #[test]
    fn test_max_features_ties_break_alphabetically() {
        let space = TermVectorSpace::fit(["beta alpha gamma"], 2);
        assert!(space.term_index("alpha").is_some());
        assert!(space.term_index("beta").is_some());
        assert!(space.term_index("gamma").is_none());
    }

    #[test]
    fn test_smoothed_idf_weights_rare_terms_higher() {
        let space = TermVectorSpace::fit(["space shooter", "space farming"], 0);
        let v = space.transform("space shooter");
        let space_idx = space.term_index("space").unwrap();
        let shooter_idx = space.term_index("shooter").unwrap();
        let weights: HashMap<u32, f64> = v.iter().collect();
        assert!(weights[&shooter_idx] > weights[&space_idx]);
        assert!((v.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_drops_unknown_terms() {
        let space = TermVectorSpace::fit(["space shooter"], 0);
        let v = space.transform("farming simulator");
        assert!(v.is_empty());
        assert_eq!(space.len(), 2);
    }

    #[test]
    fn test_stop_word_only_corpus_is_empty() {
        let space = TermVectorSpace::fit(["the and of", ""], 0);
        assert!(space.is_empty());
    }
}
