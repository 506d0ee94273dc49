mod builder;
mod export;
mod record;
mod split;
mod weight;

pub use builder::{
    augment, augment_line, load_and_split, load_records, weighted_path, AugmentArgs, AugmentReport,
    MalformedPolicy,
};
pub use export::save_records;
pub use record::{
    parse_label, LabeledRecord, Prediction, Record, Schema, UnlabeledRecord, WeightedRecord,
};
pub use split::{split, Split};
pub use weight::compute_weight;
