use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::RecordBatch;

use crate::dataset::record::WeightedRecord;
use crate::errors::{PipelineError, Result};

const BATCH_ROWS: usize = 100;

fn record_schema() -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("text", DataType::Utf8, false),
        Field::new("text2", DataType::Utf8, false),
        Field::new("label", DataType::Boolean, true),
        Field::new("weight", DataType::Float64, false),
    ])
}

/// Write weighted records as an Arrow IPC file. Unlabeled rows get a null label.
pub fn save_records(records: &[WeightedRecord], path: &Path) -> Result<()> {
    let schema = Arc::new(record_schema());
    let file = File::create(path).map_err(|err| PipelineError::io(path, err))?;
    let mut writer = FileWriter::try_new(file, &schema)?;
    for chunk in records.chunks(BATCH_ROWS) {
        let ids = chunk.iter().map(|r| r.id()).collect::<Vec<_>>();
        let texts = chunk.iter().map(|r| r.text()).collect::<Vec<_>>();
        let texts2 = chunk.iter().map(|r| r.text2()).collect::<Vec<_>>();
        let labels = chunk.iter().map(|r| r.label()).collect::<Vec<_>>();
        let weights = chunk.iter().map(|r| r.weight).collect::<Vec<_>>();
        let values = vec![
            Arc::new(StringArray::from(ids)) as ArrayRef,
            Arc::new(StringArray::from(texts)) as ArrayRef,
            Arc::new(StringArray::from(texts2)) as ArrayRef,
            Arc::new(BooleanArray::from(labels)) as ArrayRef,
            Arc::new(Float64Array::from(weights)) as ArrayRef,
        ];
        let batch = RecordBatch::try_new(schema.clone(), values)?;
        writer.write(&batch)?;
    }
    writer.finish()?;
    tracing::debug!("exported {} records to {}", records.len(), path.display());
    Ok(())
}
