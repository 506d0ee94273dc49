use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{ArgEnum, Args};
use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::dataset::record::{
    parse_label, LabeledRecord, Record, Schema, UnlabeledRecord, WeightedRecord,
};
use crate::dataset::split::{split, Split};
use crate::dataset::weight::compute_weight;
use crate::errors::{PipelineError, Result};

const WEIGHTED_SUFFIX: &str = "_weighted";

/// What to do with a line that cannot be weighted.
#[derive(ArgEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// abort the whole file on the first bad line
    #[default]
    Fail,
    /// drop the line and log a warning
    Skip,
}

/// augment args structure
#[derive(Args, Debug)]
pub struct AugmentArgs {
    /// raw tab-separated file to weight
    #[clap(long, short, visible_alias = "input")]
    pub path: String,
    /// weighted output file, defaults to the input name with a `_weighted` marker
    #[clap(long, short, visible_alias = "output")]
    pub output_path: Option<String>,
    /// what to do with lines that cannot be weighted
    #[clap(long, arg_enum, default_value = "fail")]
    pub malformed: MalformedPolicy,
}

impl AugmentArgs {
    pub fn output(&self) -> PathBuf {
        match &self.output_path {
            None => weighted_path(Path::new(&self.path)),
            Some(output_path) => PathBuf::from(output_path),
        }
    }
}

/// Line counts of one augmentation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AugmentReport {
    pub written: usize,
    pub skipped: usize,
}

/// `Data/train_with_label.txt` -> `Data/train_with_label_weighted.txt`
pub fn weighted_path(raw: &Path) -> PathBuf {
    let stem = raw
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match raw.extension() {
        Some(ext) => format!("{}{}.{}", stem, WEIGHTED_SUFFIX, ext.to_string_lossy()),
        None => format!("{}{}", stem, WEIGHTED_SUFFIX),
    };
    raw.with_file_name(name)
}

/// Lowercase and unquote one raw line, then append its weight column.
///
/// Returns `Ok(None)` for blank lines.
pub fn augment_line(line: &str) -> std::result::Result<Option<String>, String> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let normalized = line.to_lowercase().replace('"', "");
    let fields: Vec<&str> = normalized.split('\t').collect();
    if fields.len() < Schema::Unlabeled.raw_field_count() {
        return Err(format!(
            "expected at least {} tab-separated fields, found {}",
            Schema::Unlabeled.raw_field_count(),
            fields.len()
        ));
    }
    let weight = compute_weight(fields[1], fields[2]).map_err(|err| err.to_string())?;
    Ok(Some(format!("{}\t{}", normalized, weight)))
}

/// Read `input`, append a weight column to every record and write `output`.
///
/// Every field is lowercased and stripped of `"`, ids included. Output lines
/// keep the input order.
pub fn augment(input: &Path, output: &Path, policy: MalformedPolicy) -> Result<AugmentReport> {
    let content = fs::read_to_string(input).map_err(|err| PipelineError::io(input, err))?;
    let lines: Vec<&str> = content.lines().collect();
    let pb = ProgressBar::new(lines.len() as u64);
    let outcomes = lines
        .into_par_iter()
        .enumerate()
        .map(|(idx, line)| {
            pb.inc(1);
            (idx + 1, augment_line(line))
        })
        .collect::<Vec<_>>();
    pb.finish_with_message("done");

    let mut report = AugmentReport::default();
    let mut weighted = Vec::with_capacity(outcomes.len());
    for (line_no, outcome) in outcomes {
        match outcome {
            Ok(Some(line)) => weighted.push(line),
            Ok(None) => {}
            Err(reason) => match policy {
                MalformedPolicy::Fail => {
                    return Err(PipelineError::malformed(input, line_no, reason));
                }
                MalformedPolicy::Skip => {
                    tracing::warn!("skipping {}:{}: {}", input.display(), line_no, reason);
                    report.skipped += 1;
                }
            },
        }
    }

    let file = File::create(output).map_err(|err| PipelineError::io(output, err))?;
    let mut writer = BufWriter::new(file);
    for line in &weighted {
        writeln!(&mut writer, "{}", line).map_err(|err| PipelineError::io(output, err))?;
    }
    writer.flush().map_err(|err| PipelineError::io(output, err))?;
    report.written = weighted.len();

    tracing::info!(
        "weighted {} records from {} into {} ({} skipped)",
        report.written,
        input.display(),
        output.display(),
        report.skipped
    );
    Ok(report)
}

fn parse_weighted_line(line: &str, schema: Schema) -> std::result::Result<WeightedRecord, String> {
    let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
    let expected = schema.weighted_field_count();
    if fields.len() != expected {
        return Err(format!(
            "{} schema expects {} fields, found {}",
            schema.name(),
            expected,
            fields.len()
        ));
    }
    let raw_weight = fields[expected - 1];
    let weight: f64 = raw_weight
        .parse()
        .map_err(|_| format!("weight '{}' is not a number", raw_weight))?;
    if !weight.is_finite() {
        return Err(format!("weight '{}' is not finite", raw_weight));
    }
    let record = match schema {
        Schema::Labeled => {
            let label = parse_label(fields[3])
                .ok_or_else(|| format!("label '{}' is not boolean", fields[3]))?;
            Record::Labeled(LabeledRecord::new(fields[0], fields[1], fields[2], label))
        }
        Schema::Unlabeled => {
            Record::Unlabeled(UnlabeledRecord::new(fields[0], fields[1], fields[2]))
        }
    };
    Ok(WeightedRecord::new(record, weight))
}

/// Parse a weighted file into typed records.
pub fn load_records(path: &Path, schema: Schema) -> Result<Vec<WeightedRecord>> {
    let file = File::open(path).map_err(|err| PipelineError::io(path, err))?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|err| PipelineError::io(path, err))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = parse_weighted_line(&line, schema)
            .map_err(|reason| PipelineError::malformed(path, idx + 1, reason))?;
        records.push(record);
    }
    tracing::debug!("loaded {} {} records from {}", records.len(), schema.name(), path.display());
    Ok(records)
}

/// Load a weighted file and hold out `holdout` of it as the test side.
pub fn load_and_split(
    path: &Path,
    schema: Schema,
    holdout: f32,
    seed: u64,
) -> Result<Split<WeightedRecord>> {
    let records = load_records(path, schema)?;
    split(records, holdout, seed)
}
