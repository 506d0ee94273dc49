use std::fmt;

const PROBABILITY_FLOOR: f64 = 1e-15;

/// Binary classification quality over one evaluated set.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BinaryMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub log_loss: f64,
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl BinaryMetrics {
    /// Build from `(gold label, predicted probability of true)` pairs.
    pub fn from_outcomes(outcomes: &[(bool, f64)]) -> Self {
        let mut metrics = BinaryMetrics::default();
        if outcomes.is_empty() {
            return metrics;
        }
        let mut loss = 0.0;
        for &(gold, probability) in outcomes {
            let predicted = probability >= 0.5;
            match (gold, predicted) {
                (true, true) => metrics.true_positives += 1,
                (false, true) => metrics.false_positives += 1,
                (false, false) => metrics.true_negatives += 1,
                (true, false) => metrics.false_negatives += 1,
            }
            let p = probability.clamp(PROBABILITY_FLOOR, 1.0 - PROBABILITY_FLOOR);
            loss -= if gold { p.ln() } else { (1.0 - p).ln() };
        }
        let total = outcomes.len() as f64;
        let tp = metrics.true_positives as f64;
        metrics.accuracy = (metrics.true_positives + metrics.true_negatives) as f64 / total;
        metrics.precision = ratio(tp, tp + metrics.false_positives as f64);
        metrics.recall = ratio(tp, tp + metrics.false_negatives as f64);
        metrics.f1 = ratio(
            2.0 * metrics.precision * metrics.recall,
            metrics.precision + metrics.recall,
        );
        metrics.log_loss = loss / total;
        metrics
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

impl fmt::Display for BinaryMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Accuracy: {:.2}% (precision {:.4}, recall {:.4}, f1 {:.4}, log-loss {:.4}, n={})",
            self.accuracy * 100.0,
            self.precision,
            self.recall,
            self.f1,
            self.log_loss,
            self.total()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_confusion_matrix() {
        let metrics = BinaryMetrics::from_outcomes(&[
            (true, 0.9),
            (true, 0.2),
            (false, 0.7),
            (false, 0.1),
        ]);
        assert_eq!(metrics.true_positives, 1);
        assert_eq!(metrics.false_negatives, 1);
        assert_eq!(metrics.false_positives, 1);
        assert_eq!(metrics.true_negatives, 1);
        assert_eq!(metrics.accuracy, 0.5);
        assert_eq!(metrics.precision, 0.5);
        assert_eq!(metrics.recall, 0.5);
        assert_eq!(metrics.f1, 0.5);
    }

    #[test]
    fn no_positive_predictions_gives_zero_precision() {
        let metrics = BinaryMetrics::from_outcomes(&[(true, 0.1), (false, 0.2)]);
        assert_eq!(metrics.precision, 0.0);
        assert_eq!(metrics.f1, 0.0);
        assert_eq!(metrics.accuracy, 0.5);
    }

    #[test]
    fn display_reports_percentage() {
        let metrics = BinaryMetrics::from_outcomes(&[(true, 0.9), (false, 0.1), (false, 0.4)]);
        assert!(metrics.to_string().starts_with("Accuracy: 100.00%"));
    }

    #[test]
    fn log_loss_is_finite_for_confident_mistakes() {
        let metrics = BinaryMetrics::from_outcomes(&[(true, 0.0), (false, 1.0)]);
        assert!(metrics.log_loss.is_finite());
        assert!(metrics.log_loss > 30.0);
    }
}
