use std::path::Path;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pair_record::dataset::{augment, AugmentArgs};
use pair_record::pipeline::{IPipeline, PipelineArgs, SimilarityPipeline};
use pair_record::{logging, Result};

/// Text-pair match classifier
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct PairRecord {
    #[clap(subcommand)]
    command: Option<Command>,
}

/// All of subcommand
#[derive(Subcommand)]
enum Command {
    /// Weight the train set, fit, score train holdout and dev, predict test
    Run(PipelineArgs),
    /// Append the similarity weight column to a single raw file
    Augment(AugmentArgs),
    /// help for `pair-record'
    Help,
}

fn execute(command: &Command) -> Result<()> {
    match command {
        Command::Run(args) => {
            tracing::debug!("pipeline args: {:?}", args);
            let report = SimilarityPipeline::new(args).run()?;
            tracing::info!(
                "train holdout accuracy {:.2}%, dev accuracy {:.2}%, {} predictions",
                report.train_metrics.accuracy * 100.0,
                report.dev_metrics.accuracy * 100.0,
                report.predictions_written
            );
        }
        Command::Augment(args) => {
            tracing::debug!("augment args: {:?}", args);
            augment(Path::new(&args.path), &args.output(), args.malformed)?;
        }
        Command::Help => (),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = PairRecord::parse();
    if let Err(err) = logging::init() {
        eprintln!("{}", err);
    }
    let command = cli.command.unwrap_or_else(|| {
        println!("pair-record must with subcommand, use `pair-record help` get the usage");
        Command::Help
    });
    match execute(&command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
