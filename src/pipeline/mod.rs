mod similarity;
mod traits;

pub use similarity::{PipelineArgs, SimilarityPipeline};
pub use traits::{DatasetPaths, Holdouts, IPipeline, RunReport};
