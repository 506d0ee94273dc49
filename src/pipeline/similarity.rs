use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Args;

use crate::classifier::{
    BinaryMetrics, ClassifierTrainer, FeaturizerOptions, SdcaLogisticTrainer, SdcaOptions,
};
use crate::dataset::{
    augment, load_records, save_records, split, AugmentReport, MalformedPolicy, Prediction, Schema,
    Split, WeightedRecord,
};
use crate::errors::{PipelineError, Result};
use crate::pipeline::traits::{DatasetPaths, Holdouts, IPipeline};

/// train/evaluate/predict args structure
#[derive(Args, Clone, Debug)]
pub struct PipelineArgs {
    /// directory holding the three raw datasets
    #[clap(long, short, visible_alias = "input", default_value = "Data")]
    pub data_dir: String,
    /// labeled training file inside the data directory
    #[clap(long, default_value = "train_with_label.txt")]
    pub train_file: String,
    /// labeled dev file inside the data directory
    #[clap(long, default_value = "dev_with_label.txt")]
    pub dev_file: String,
    /// unlabeled test file inside the data directory
    #[clap(long, default_value = "test_without_label.txt")]
    pub test_file: String,
    /// prediction output, relative to the working directory
    #[clap(long, short, visible_alias = "output", default_value = "test_result.txt")]
    pub prediction_file: String,
    /// fraction of the training file held out for the first evaluation
    #[clap(long, default_value = "0.01")]
    pub train_holdout: f32,
    /// fraction of the dev file that is evaluated
    #[clap(long, default_value = "0.99")]
    pub dev_holdout: f32,
    /// fraction of the test file that is predicted
    #[clap(long, default_value = "0.99")]
    pub test_holdout: f32,
    /// seed for splits and solver shuffling
    #[clap(long, default_value = "1")]
    pub seed: u64,
    /// longest character n-gram
    #[clap(long, default_value = "2")]
    pub ngram_length: usize,
    /// only emit n-grams of exactly `ngram-length` characters
    #[clap(long)]
    pub exact_ngram_length: bool,
    /// maximum passes of the dual coordinate solver
    #[clap(long, default_value = "30")]
    pub epochs: usize,
    /// L2 regularization strength
    #[clap(long, visible_alias = "lambda", default_value = "0.0001")]
    pub l2: f64,
    /// stop once the largest dual step of an epoch falls below this
    #[clap(long, default_value = "0.0001")]
    pub tolerance: f64,
    /// what to do with lines that cannot be weighted
    #[clap(long, arg_enum, default_value = "fail")]
    pub malformed: MalformedPolicy,
    /// also write weighted records (Arrow IPC) and the vocabulary here
    #[clap(long)]
    pub export_dir: Option<String>,
}

impl PipelineArgs {
    pub fn holdouts(&self) -> Holdouts {
        Holdouts {
            train: self.train_holdout,
            dev: self.dev_holdout,
            test: self.test_holdout,
        }
    }

    pub fn paths(&self) -> DatasetPaths {
        DatasetPaths::new(
            Path::new(&self.data_dir),
            &self.train_file,
            &self.dev_file,
            &self.test_file,
            Path::new(&self.prediction_file),
        )
    }

    pub fn trainer(&self) -> SdcaLogisticTrainer {
        let featurizer = FeaturizerOptions {
            ngram_length: self.ngram_length,
            use_all_lengths: !self.exact_ngram_length,
        };
        let solver = SdcaOptions {
            l2: self.l2,
            max_epochs: self.epochs,
            tolerance: self.tolerance,
            seed: self.seed,
        };
        SdcaLogisticTrainer::new(featurizer, solver)
    }

    fn export_dir(&self) -> Option<&Path> {
        self.export_dir.as_deref().map(Path::new)
    }
}

pub struct SimilarityPipeline<'a, T> {
    args: &'a PipelineArgs,
    paths: DatasetPaths,
    trainer: T,
}

impl<'a> SimilarityPipeline<'a, SdcaLogisticTrainer> {
    pub fn new(args: &'a PipelineArgs) -> Self {
        Self::with_trainer(args, args.trainer())
    }
}

impl<'a, T: ClassifierTrainer> SimilarityPipeline<'a, T> {
    pub fn with_trainer(args: &'a PipelineArgs, trainer: T) -> Self {
        Self {
            args,
            paths: args.paths(),
            trainer,
        }
    }

    fn prepare_export_dir(&self) -> Result<Option<PathBuf>> {
        match self.args.export_dir() {
            None => Ok(None),
            Some(dir) => {
                fs::create_dir_all(dir).map_err(|err| PipelineError::io(dir, err))?;
                Ok(Some(dir.to_path_buf()))
            }
        }
    }
}

impl<'a, T: ClassifierTrainer> IPipeline for SimilarityPipeline<'a, T> {
    type Model = T::Model;

    fn paths(&self) -> &DatasetPaths {
        &self.paths
    }

    fn holdouts(&self) -> Holdouts {
        self.args.holdouts()
    }

    fn augment(&self, raw: &Path, weighted: &Path) -> Result<AugmentReport> {
        tracing::info!("weighting {}", raw.display());
        augment(raw, weighted, self.args.malformed)
    }

    fn load_split(
        &self,
        weighted: &Path,
        schema: Schema,
        holdout: f32,
        name: &str,
    ) -> Result<Split<WeightedRecord>> {
        let records = load_records(weighted, schema)?;
        if let Some(dir) = self.prepare_export_dir()? {
            save_records(&records, &dir.join(format!("{}.records.ipc", name)))?;
        }
        let parts = split(records, holdout, self.args.seed)?;
        tracing::info!(
            "{} split: {} kept aside, {} held out",
            name,
            parts.train.len(),
            parts.test.len()
        );
        Ok(parts)
    }

    fn train(&self, records: &[WeightedRecord]) -> Result<T::Model> {
        let model = self.trainer.fit(records)?;
        if let Some(dir) = self.prepare_export_dir()? {
            self.trainer.save_artifacts(&model, &dir)?;
        }
        Ok(model)
    }

    fn evaluate(&self, model: &T::Model, records: &[WeightedRecord]) -> Result<BinaryMetrics> {
        self.trainer.evaluate(model, records)
    }

    fn predict(&self, model: &T::Model, records: &[WeightedRecord]) -> Result<Vec<Prediction>> {
        self.trainer.predict(model, records)
    }

    fn write_predictions(&self, predictions: &[Prediction], path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|err| PipelineError::io(path, err))?;
        let mut writer = BufWriter::new(file);
        for prediction in predictions {
            writeln!(&mut writer, "{}", prediction).map_err(|err| PipelineError::io(path, err))?;
        }
        writer.flush().map_err(|err| PipelineError::io(path, err))
    }
}
