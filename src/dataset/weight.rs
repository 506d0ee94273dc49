use crate::distance::damerau_levenshtein;
use crate::errors::WeightError;

/// Similarity weight of one text pair.
///
/// `weight = len(text2)/len(text) * overlap/len(text) * edit_distance`, where
/// `overlap` counts the space-separated tokens of `text` found anywhere in
/// `text2`. The overlap is divided by the character length of `text`, not
/// its token count; existing weighted files depend on that.
///
/// Inputs are expected to be lowercased and quote-stripped already.
pub fn compute_weight(text: &str, text2: &str) -> Result<f64, WeightError> {
    let text_len = text.chars().count();
    if text_len == 0 {
        return Err(WeightError::EmptyText);
    }
    let text_len = text_len as f64;

    let length_ratio = text2.chars().count() as f64 / text_len;
    let overlap = text
        .split(' ')
        .filter(|word| text2.contains(word))
        .count();
    let overlap_ratio = overlap as f64 / text_len;
    let edit = damerau_levenshtein(text, text2) as f64;

    Ok(length_ratio * overlap_ratio * edit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cat_example_matches_hand_computation() {
        let weight = compute_weight("the cat", "the cat sat").unwrap();
        let expected = (11.0 / 7.0) * (2.0 / 7.0) * 4.0;
        assert_eq!(weight, expected);
        assert!((weight - 1.7959).abs() < 1e-4);
    }

    #[test]
    fn identical_texts_weigh_zero() {
        assert_eq!(compute_weight("acme corp", "acme corp").unwrap(), 0.0);
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let first = compute_weight("international business machines", "ibm corp").unwrap();
        for _ in 0..10 {
            let again = compute_weight("international business machines", "ibm corp").unwrap();
            assert_eq!(first.to_bits(), again.to_bits());
        }
    }

    #[test]
    fn empty_text_is_rejected() {
        assert_eq!(compute_weight("", "anything"), Err(WeightError::EmptyText));
    }

    #[test]
    fn no_shared_tokens_weigh_zero() {
        assert_eq!(compute_weight("foo", "bar").unwrap(), 0.0);
    }

    #[test]
    fn doubled_space_counts_an_empty_token() {
        // "a  b" splits into ["a", "", "b"]; the empty token always matches.
        let weight = compute_weight("a  b", "xyz").unwrap();
        let expected = (3.0 / 4.0) * (1.0 / 4.0) * 4.0;
        assert_eq!(weight, expected);
    }

    #[test]
    fn weight_can_exceed_one() {
        assert!(compute_weight("ab", "ab cd ef gh").unwrap() > 1.0);
    }
}
