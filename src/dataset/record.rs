use std::fmt;

/// Column layout of a raw dataset file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Schema {
    /// `id, text, text2, label`
    Labeled,
    /// `id, text, text2`
    Unlabeled,
}

impl Schema {
    /// Number of tab-separated fields in a raw line.
    pub fn raw_field_count(&self) -> usize {
        match self {
            Schema::Labeled => 4,
            Schema::Unlabeled => 3,
        }
    }

    /// Number of fields once the weight column has been appended.
    pub fn weighted_field_count(&self) -> usize {
        self.raw_field_count() + 1
    }

    pub fn name(&self) -> &'static str {
        match self {
            Schema::Labeled => "labeled",
            Schema::Unlabeled => "unlabeled",
        }
    }
}

/// A text pair without a gold label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnlabeledRecord {
    pub id: String,
    pub text: String,
    pub text2: String,
}

impl UnlabeledRecord {
    pub fn new(id: &str, text: &str, text2: &str) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            text2: text2.to_string(),
        }
    }
}

/// A text pair with its gold match label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabeledRecord {
    pub pair: UnlabeledRecord,
    pub label: bool,
}

impl LabeledRecord {
    pub fn new(id: &str, text: &str, text2: &str, label: bool) -> Self {
        Self {
            pair: UnlabeledRecord::new(id, text, text2),
            label,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Record {
    Labeled(LabeledRecord),
    Unlabeled(UnlabeledRecord),
}

impl Record {
    pub fn pair(&self) -> &UnlabeledRecord {
        match self {
            Record::Labeled(record) => &record.pair,
            Record::Unlabeled(pair) => pair,
        }
    }

    pub fn id(&self) -> &str {
        &self.pair().id
    }

    pub fn label(&self) -> Option<bool> {
        match self {
            Record::Labeled(record) => Some(record.label),
            Record::Unlabeled(_) => None,
        }
    }
}

/// A record plus its precomputed similarity weight.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightedRecord {
    pub record: Record,
    pub weight: f64,
}

impl WeightedRecord {
    pub fn new(record: Record, weight: f64) -> Self {
        Self { record, weight }
    }

    pub fn id(&self) -> &str {
        self.record.id()
    }

    pub fn text(&self) -> &str {
        &self.record.pair().text
    }

    pub fn text2(&self) -> &str {
        &self.record.pair().text2
    }

    pub fn label(&self) -> Option<bool> {
        self.record.label()
    }
}

/// Classifier output for one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prediction {
    pub record: UnlabeledRecord,
    pub predicted_label: bool,
}

impl Prediction {
    pub fn new(record: UnlabeledRecord, predicted_label: bool) -> Self {
        Self {
            record,
            predicted_label,
        }
    }
}

/// Renders the `id<TAB>True|False` line of the prediction file.
impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.predicted_label { "True" } else { "False" };
        write!(f, "{}\t{}", self.record.id, label)
    }
}

/// Parse a gold label written as `0`/`1` or `true`/`false`.
pub fn parse_label(value: &str) -> Option<bool> {
    let value = value.trim();
    match value {
        "1" => Some(true),
        "0" => Some(false),
        _ if value.eq_ignore_ascii_case("true") => Some(true),
        _ if value.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}
