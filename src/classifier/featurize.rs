use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rayon::prelude::*;

use crate::dataset::WeightedRecord;
use crate::errors::{PipelineError, Result};

/// Sparse feature vector as `(index, value)` pairs sorted by index.
pub type SparseVector = Vec<(usize, f64)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeaturizerOptions {
    /// longest character n-gram
    pub ngram_length: usize,
    /// emit every length in `1..=ngram_length` instead of only the longest
    pub use_all_lengths: bool,
}

impl Default for FeaturizerOptions {
    fn default() -> Self {
        Self {
            ngram_length: 2,
            use_all_lengths: true,
        }
    }
}

/// Bag-of-n-grams over `text` and `text2`, plus the weight column and a bias.
///
/// Word unigrams and character n-grams are counted per field, each field is
/// L2-normalized on its own, and the two fields live in separate namespaces.
/// The vocabulary is fixed at fit time; unseen n-grams are dropped.
#[derive(Clone, Debug)]
pub struct NgramFeaturizer {
    options: FeaturizerOptions,
    vocab: HashMap<String, usize>,
}

impl NgramFeaturizer {
    pub fn fit(options: FeaturizerOptions, records: &[WeightedRecord]) -> Result<Self> {
        if options.ngram_length == 0 {
            return Err(PipelineError::Configuration(
                "ngram length must be at least 1".to_string(),
            ));
        }
        let mut terms = BTreeSet::new();
        for record in records {
            terms.extend(field_terms(record.text(), "a", &options));
            terms.extend(field_terms(record.text2(), "b", &options));
        }
        let vocab = terms
            .into_iter()
            .enumerate()
            .map(|(i, term)| (term, i))
            .collect::<HashMap<_, _>>();
        tracing::debug!("featurizer vocabulary holds {} n-grams", vocab.len());
        Ok(Self { options, vocab })
    }

    pub fn vocab(&self) -> &HashMap<String, usize> {
        &self.vocab
    }

    pub fn weight_index(&self) -> usize {
        self.vocab.len()
    }

    pub fn bias_index(&self) -> usize {
        self.vocab.len() + 1
    }

    /// Length of every vector produced by `transform`.
    pub fn dimension(&self) -> usize {
        self.vocab.len() + 2
    }

    pub fn transform(&self, record: &WeightedRecord) -> SparseVector {
        let mut features = self.field_vector(record.text(), "a");
        features.extend(self.field_vector(record.text2(), "b"));
        features.sort_unstable_by_key(|(idx, _)| *idx);
        features.push((self.weight_index(), record.weight));
        features.push((self.bias_index(), 1.0));
        features
    }

    pub fn transform_all(&self, records: &[WeightedRecord]) -> Vec<SparseVector> {
        records.par_iter().map(|record| self.transform(record)).collect()
    }

    fn field_vector(&self, field: &str, namespace: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in field_terms(field, namespace, &self.options) {
            if let Some(&idx) = self.vocab.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }
        let norm = counts.values().map(|v| v * v).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Vec::new();
        }
        counts.into_iter().map(|(idx, v)| (idx, v / norm)).collect()
    }

    /// Write `index<TAB>term` lines.
    pub fn save_vocab(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|err| PipelineError::io(path, err))?;
        let mut writer = BufWriter::new(file);
        let mut entries: Vec<(&String, &usize)> = self.vocab.iter().collect();
        entries.sort_by_key(|(_, idx)| **idx);
        for (term, idx) in entries {
            writeln!(&mut writer, "{}\t{}", idx, term).map_err(|err| PipelineError::io(path, err))?;
        }
        writer.flush().map_err(|err| PipelineError::io(path, err))
    }
}

/// Lowercased word unigrams (`w:`) and character n-grams (`c:`) of one field.
fn field_terms(field: &str, namespace: &str, options: &FeaturizerOptions) -> Vec<String> {
    let field = field.to_lowercase();
    let mut terms: Vec<String> = field
        .split_whitespace()
        .map(|word| format!("{}w:{}", namespace, word))
        .collect();
    let chars: Vec<char> = field.chars().collect();
    let shortest = if options.use_all_lengths { 1 } else { options.ngram_length };
    for n in shortest..=options.ngram_length {
        terms.extend(
            chars
                .windows(n)
                .map(|gram| format!("{}c:{}", namespace, gram.iter().collect::<String>())),
        );
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{LabeledRecord, Record};

    fn record(text: &str, text2: &str, weight: f64) -> WeightedRecord {
        WeightedRecord::new(Record::Labeled(LabeledRecord::new("x", text, text2, true)), weight)
    }

    #[test]
    fn terms_cover_words_and_all_char_lengths() {
        let terms = field_terms("ab c", "a", &FeaturizerOptions::default());
        for expected in ["aw:ab", "aw:c", "ac:a", "ac:b", "ac: ", "ac:ab", "ac:b ", "ac: c"] {
            assert!(terms.contains(&expected.to_string()), "missing {expected}");
        }
    }

    #[test]
    fn exact_length_skips_shorter_grams() {
        let options = FeaturizerOptions {
            ngram_length: 2,
            use_all_lengths: false,
        };
        let terms = field_terms("abc", "b", &options);
        assert!(terms.contains(&"bc:ab".to_string()));
        assert!(!terms.contains(&"bc:a".to_string()));
    }

    #[test]
    fn vector_carries_weight_and_bias() {
        let train = vec![record("acme", "acme inc", 0.5)];
        let featurizer = NgramFeaturizer::fit(FeaturizerOptions::default(), &train).unwrap();
        let vector = featurizer.transform(&train[0]);
        assert_eq!(vector[vector.len() - 2], (featurizer.weight_index(), 0.5));
        assert_eq!(vector[vector.len() - 1], (featurizer.bias_index(), 1.0));
        assert!(vector.iter().all(|(idx, _)| *idx < featurizer.dimension()));
    }

    #[test]
    fn each_field_is_unit_length() {
        let train = vec![record("hello world", "goodbye", 0.0)];
        let featurizer = NgramFeaturizer::fit(FeaturizerOptions::default(), &train).unwrap();
        let vector = featurizer.transform(&train[0]);
        let text_norm: f64 = vector
            .iter()
            .filter(|(idx, _)| *idx < featurizer.weight_index())
            .map(|(_, v)| v * v)
            .sum();
        // two fields, each normalized to 1
        assert!((text_norm - 2.0).abs() < 1e-9);
    }

    #[test]
    fn unseen_terms_are_ignored() {
        let train = vec![record("aaa", "aaa", 0.0)];
        let featurizer = NgramFeaturizer::fit(FeaturizerOptions::default(), &train).unwrap();
        let vector = featurizer.transform(&record("zzz", "zzz", 1.0));
        assert_eq!(vector.len(), 2);
    }

    #[test]
    fn zero_ngram_length_is_rejected() {
        let options = FeaturizerOptions {
            ngram_length: 0,
            use_all_lengths: true,
        };
        assert!(NgramFeaturizer::fit(options, &[]).is_err());
    }
}
