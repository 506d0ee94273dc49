mod featurize;
mod metrics;
mod sdca;

use std::path::Path;

use crate::dataset::{Prediction, WeightedRecord};
use crate::errors::{PipelineError, Result};

pub use featurize::{FeaturizerOptions, NgramFeaturizer, SparseVector};
pub use metrics::BinaryMetrics;
pub use sdca::{LinearModel, SdcaOptions};

/// Text-pair classifier capability consumed by the pipeline.
pub trait ClassifierTrainer {
    type Model;

    /// Fit a model on labeled records.
    fn fit(&self, records: &[WeightedRecord]) -> Result<Self::Model>;
    /// Score labeled records against their gold labels.
    fn evaluate(&self, model: &Self::Model, records: &[WeightedRecord]) -> Result<BinaryMetrics>;
    /// One prediction per record, in input order.
    fn predict(&self, model: &Self::Model, records: &[WeightedRecord]) -> Result<Vec<Prediction>>;

    /// Persist model-side artifacts next to exported records.
    fn save_artifacts(&self, _model: &Self::Model, _dir: &Path) -> Result<()> {
        Ok(())
    }
}

/// Featurizer and linear weights learned together.
#[derive(Clone, Debug)]
pub struct TrainedModel {
    pub featurizer: NgramFeaturizer,
    pub linear: LinearModel,
}

impl TrainedModel {
    pub fn probability(&self, record: &WeightedRecord) -> f64 {
        self.linear.probability(&self.featurizer.transform(record))
    }
}

/// N-gram features + weight column into an SDCA logistic regression.
#[derive(Clone, Debug, Default)]
pub struct SdcaLogisticTrainer {
    pub featurizer: FeaturizerOptions,
    pub solver: SdcaOptions,
}

impl SdcaLogisticTrainer {
    pub fn new(featurizer: FeaturizerOptions, solver: SdcaOptions) -> Self {
        Self { featurizer, solver }
    }
}

fn gold_label(record: &WeightedRecord) -> Result<bool> {
    record
        .label()
        .ok_or_else(|| PipelineError::MissingLabel(record.id().to_string()))
}

impl ClassifierTrainer for SdcaLogisticTrainer {
    type Model = TrainedModel;

    fn fit(&self, records: &[WeightedRecord]) -> Result<TrainedModel> {
        self.solver.validate()?;
        if records.is_empty() {
            return Err(PipelineError::EmptyDataset("training set".to_string()));
        }
        let labels = records.iter().map(gold_label).collect::<Result<Vec<_>>>()?;
        let featurizer = NgramFeaturizer::fit(self.featurizer, records)?;
        let examples: Vec<(SparseVector, bool)> = featurizer
            .transform_all(records)
            .into_iter()
            .zip(labels)
            .collect();
        tracing::info!(
            "training on {} records with {} features",
            examples.len(),
            featurizer.dimension()
        );
        let linear = sdca::train(&examples, featurizer.dimension(), &self.solver);
        Ok(TrainedModel { featurizer, linear })
    }

    fn evaluate(&self, model: &TrainedModel, records: &[WeightedRecord]) -> Result<BinaryMetrics> {
        if records.is_empty() {
            return Err(PipelineError::EmptyDataset("evaluation set".to_string()));
        }
        let outcomes = records
            .iter()
            .map(|record| -> Result<(bool, f64)> {
                Ok((gold_label(record)?, model.probability(record)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(BinaryMetrics::from_outcomes(&outcomes))
    }

    fn predict(&self, model: &TrainedModel, records: &[WeightedRecord]) -> Result<Vec<Prediction>> {
        Ok(records
            .iter()
            .map(|record| {
                let positive = model.probability(record) >= 0.5;
                Prediction::new(record.record.pair().clone(), positive)
            })
            .collect())
    }

    fn save_artifacts(&self, model: &TrainedModel, dir: &Path) -> Result<()> {
        model.featurizer.save_vocab(&dir.join("vocab.txt"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{LabeledRecord, Record, UnlabeledRecord};

    fn labeled(id: &str, text: &str, text2: &str, label: bool) -> WeightedRecord {
        WeightedRecord::new(Record::Labeled(LabeledRecord::new(id, text, text2, label)), 0.0)
    }

    fn training_set() -> Vec<WeightedRecord> {
        let mut records = Vec::new();
        for i in 0..20 {
            records.push(labeled(&format!("p{i}"), "acme corp", "acme corporation", true));
            records.push(labeled(&format!("n{i}"), "zeta labs", "quux bakery", false));
        }
        records
    }

    #[test]
    fn learns_to_separate_matching_pairs() {
        let trainer = SdcaLogisticTrainer::default();
        let records = training_set();
        let model = trainer.fit(&records).unwrap();
        let metrics = trainer.evaluate(&model, &records).unwrap();
        assert_eq!(metrics.accuracy, 1.0);
    }

    #[test]
    fn predictions_follow_input_order() {
        let trainer = SdcaLogisticTrainer::default();
        let model = trainer.fit(&training_set()).unwrap();
        let query = |id: &str, text: &str, text2: &str| {
            WeightedRecord::new(Record::Unlabeled(UnlabeledRecord::new(id, text, text2)), 0.0)
        };
        let queries = vec![
            query("q1", "zeta labs", "quux bakery"),
            query("q2", "acme corp", "acme corporation"),
        ];
        let predictions = trainer.predict(&model, &queries).unwrap();
        assert_eq!(predictions[0].record.id, "q1");
        assert!(!predictions[0].predicted_label);
        assert_eq!(predictions[1].record.id, "q2");
        assert!(predictions[1].predicted_label);
    }

    #[test]
    fn fit_needs_labels() {
        let trainer = SdcaLogisticTrainer::default();
        let unlabeled = vec![WeightedRecord::new(
            Record::Unlabeled(UnlabeledRecord::new("u", "a", "b")),
            0.0,
        )];
        let err = trainer.fit(&unlabeled).unwrap_err();
        assert!(matches!(err, PipelineError::MissingLabel(id) if id == "u"));
        assert!(matches!(trainer.fit(&[]), Err(PipelineError::EmptyDataset(_))));
    }

    #[test]
    fn zero_l2_is_a_configuration_error() {
        let solver = SdcaOptions {
            l2: 0.0,
            ..SdcaOptions::default()
        };
        let trainer = SdcaLogisticTrainer::new(FeaturizerOptions::default(), solver);
        let err = trainer.fit(&training_set()).unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[test]
    fn evaluating_nothing_is_an_error() {
        let trainer = SdcaLogisticTrainer::default();
        let model = trainer.fit(&training_set()).unwrap();
        assert!(matches!(trainer.evaluate(&model, &[]), Err(PipelineError::EmptyDataset(_))));
    }
}
