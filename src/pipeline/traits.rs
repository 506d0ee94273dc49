use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use crate::classifier::BinaryMetrics;
use crate::dataset::{weighted_path, AugmentReport, Prediction, Schema, Split, WeightedRecord};
use crate::errors::{PipelineError, Result};

/// Where each stage reads and writes; passed explicitly instead of a shared cursor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetPaths {
    pub train: PathBuf,
    pub dev: PathBuf,
    pub test: PathBuf,
    pub predictions: PathBuf,
}

impl DatasetPaths {
    pub fn new(data_dir: &Path, train: &str, dev: &str, test: &str, predictions: &Path) -> Self {
        Self {
            train: data_dir.join(train),
            dev: data_dir.join(dev),
            test: data_dir.join(test),
            predictions: predictions.to_path_buf(),
        }
    }

    /// Fail before any stage runs if an input is missing, unreadable or not a file.
    pub fn verify_inputs(&self) -> Result<()> {
        for path in [&self.train, &self.dev, &self.test] {
            let file = File::open(path).map_err(|err| PipelineError::io(path, err))?;
            let metadata = file.metadata().map_err(|err| PipelineError::io(path, err))?;
            if !metadata.is_file() {
                let err = io::Error::new(io::ErrorKind::InvalidInput, "not a regular file");
                return Err(PipelineError::io(path, err));
            }
        }
        Ok(())
    }
}

/// Test fractions for the three datasets.
///
/// A small train holdout keeps almost every record for fitting, while large
/// dev and test holdouts keep almost every record for scoring. Both come
/// from the same split primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Holdouts {
    pub train: f32,
    pub dev: f32,
    pub test: f32,
}

impl Holdouts {
    /// Every fraction must lie in `(0, 1]`.
    pub fn validate(&self) -> Result<()> {
        for holdout in [self.train, self.dev, self.test] {
            if !(holdout > 0.0 && holdout <= 1.0) {
                return Err(PipelineError::InvalidHoldout(holdout));
            }
        }
        Ok(())
    }
}

/// Outcome of one full run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    pub train_metrics: BinaryMetrics,
    pub dev_metrics: BinaryMetrics,
    pub predictions_written: usize,
}

pub trait IPipeline {
    type Model;

    fn paths(&self) -> &DatasetPaths;
    fn holdouts(&self) -> Holdouts;
    fn augment(&self, raw: &Path, weighted: &Path) -> Result<AugmentReport>;
    fn load_split(
        &self,
        weighted: &Path,
        schema: Schema,
        holdout: f32,
        name: &str,
    ) -> Result<Split<WeightedRecord>>;
    fn train(&self, records: &[WeightedRecord]) -> Result<Self::Model>;
    fn evaluate(&self, model: &Self::Model, records: &[WeightedRecord]) -> Result<BinaryMetrics>;
    fn predict(&self, model: &Self::Model, records: &[WeightedRecord]) -> Result<Vec<Prediction>>;
    fn write_predictions(&self, predictions: &[Prediction], path: &Path) -> Result<()>;

    /// augment train -> split -> fit -> score holdout -> augment dev -> score
    /// -> augment test -> predict -> write. Any failure ends the run.
    fn run(&self) -> Result<RunReport> {
        let paths = self.paths();
        let holdouts = self.holdouts();
        holdouts.validate()?;
        paths.verify_inputs()?;

        tracing::info!("============ TrainingSet ============");
        let weighted_train = weighted_path(&paths.train);
        self.augment(&paths.train, &weighted_train)?;
        let train = self.load_split(&weighted_train, Schema::Labeled, holdouts.train, "train")?;
        let model = self.train(&train.train)?;
        let train_metrics = self.evaluate(&model, &train.test)?;
        tracing::info!("{}", train_metrics);

        tracing::info!("============ DevSet ============");
        let weighted_dev = weighted_path(&paths.dev);
        self.augment(&paths.dev, &weighted_dev)?;
        let dev = self.load_split(&weighted_dev, Schema::Labeled, holdouts.dev, "dev")?;
        let dev_metrics = self.evaluate(&model, &dev.test)?;
        tracing::info!("{}", dev_metrics);

        tracing::info!("============ TestSet ============");
        let weighted_test = weighted_path(&paths.test);
        self.augment(&paths.test, &weighted_test)?;
        let test = self.load_split(&weighted_test, Schema::Unlabeled, holdouts.test, "test")?;
        let predictions = self.predict(&model, &test.test)?;
        self.write_predictions(&predictions, &paths.predictions)?;
        tracing::info!(
            "wrote {} predictions to {}",
            predictions.len(),
            paths.predictions.display()
        );

        Ok(RunReport {
            train_metrics,
            dev_metrics,
            predictions_written: predictions.len(),
        })
    }
}
