//! Typed filter, update and aggregation instructions.
//!
//! Only the query shapes the registry actually issues are representable.
//! Each instruction renders to the MongoDB document the native backend
//! expects, and the in-memory emulator interprets the same values directly.

use bson::{doc, Bson, Document};

pub const DAYS_PATH: &str = "schedule_details.days";
pub const START_TIME_PATH: &str = "schedule_details.start_time";
pub const END_TIME_PATH: &str = "schedule_details.end_time";

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Exact equality against the value at `field`.
    FieldEquals { field: String, value: Bson },
    /// Any of the given days appears in `schedule_details.days`.
    DaysIn(Vec<String>),
    /// `schedule_details.start_time` is at or after the `"HH:MM"` bound.
    TimeAtLeast(String),
    /// `schedule_details.end_time` is at or before the `"HH:MM"` bound.
    TimeAtMost(String),
}

impl Condition {
    pub fn path(&self) -> &str {
        match self {
            Condition::FieldEquals { field, .. } => field.as_str(),
            Condition::DaysIn(_) => DAYS_PATH,
            Condition::TimeAtLeast(_) => START_TIME_PATH,
            Condition::TimeAtMost(_) => END_TIME_PATH,
        }
    }

    fn to_bson(&self) -> Bson {
        match self {
            Condition::FieldEquals { value, .. } => value.clone(),
            Condition::DaysIn(days) => Bson::Document(doc! { "$in": days.clone() }),
            Condition::TimeAtLeast(time) => Bson::Document(doc! { "$gte": time.clone() }),
            Condition::TimeAtMost(time) => Bson::Document(doc! { "$lte": time.clone() }),
        }
    }

    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        document.insert(self.path(), self.to_bson());
        document
    }
}

/// Conjunction of [`Condition`]s. The empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn all() -> Filter {
        Filter::default()
    }

    pub fn by_id(id: impl Into<Bson>) -> Filter {
        Filter::field_equals("_id", id)
    }

    pub fn field_equals(field: impl ToString, value: impl Into<Bson>) -> Filter {
        Filter::all().and(Condition::FieldEquals {
            field: field.to_string(),
            value: value.into(),
        })
    }

    pub fn and(mut self, condition: Condition) -> Filter {
        self.conditions.push(condition);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        for condition in &self.conditions {
            if document.contains_key(condition.path()) {
                // repeated paths would overwrite each other in a flat document
                let clauses: Vec<Document> =
                    self.conditions.iter().map(Condition::to_document).collect();
                return doc! { "$and": clauses };
            }
            document.insert(condition.path(), condition.to_bson());
        }
        document
    }
}

impl From<Condition> for Filter {
    fn from(condition: Condition) -> Self {
        Filter::all().and(condition)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Append `value` to the list at `field`, creating the list if absent.
    PushTo { field: String, value: Bson },
    /// Remove every occurrence of `value` from the list at `field`.
    PullFrom { field: String, value: Bson },
}

impl Update {
    pub fn push(field: impl ToString, value: impl Into<Bson>) -> Update {
        Update::PushTo {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn pull(field: impl ToString, value: impl Into<Bson>) -> Update {
        Update::PullFrom {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn to_document(&self) -> Document {
        let (operator, field, value) = match self {
            Update::PushTo { field, value } => ("$push", field, value),
            Update::PullFrom { field, value } => ("$pull", field, value),
        };

        let mut target = Document::new();
        target.insert(field.as_str(), value.clone());

        let mut document = Document::new();
        document.insert(operator, target);
        document
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Unwind(String),
    /// Group on the value at the path; each output row is `{ "_id": value }`.
    Group { by: String },
    SortById,
    /// Passed through to MongoDB untouched; never recognised by the emulator.
    Raw(Document),
}

impl Stage {
    pub fn to_document(&self) -> Document {
        match self {
            Stage::Unwind(path) => doc! { "$unwind": format!("${}", path) },
            Stage::Group { by } => doc! { "$group": { "_id": format!("${}", by) } },
            Stage::SortById => doc! { "$sort": { "_id": 1 } },
            Stage::Raw(document) => document.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new(stages: Vec<Stage>) -> Pipeline {
        Pipeline { stages }
    }

    /// Distinct elements of the list at `path` across all documents.
    pub fn distinct_values(path: impl ToString) -> Pipeline {
        let path = path.to_string();
        Pipeline::new(vec![
            Stage::Unwind(path.clone()),
            Stage::Group { by: path },
            Stage::SortById,
        ])
    }

    pub fn distinct_days() -> Pipeline {
        Pipeline::distinct_values(DAYS_PATH)
    }

    /// Path of an unwind + group-by-same-path pipeline, the only shape the
    /// emulator evaluates. A trailing `SortById` is accepted.
    pub fn distinct_path(&self) -> Option<&str> {
        match self.stages.as_slice() {
            [Stage::Unwind(unwound), Stage::Group { by }]
            | [Stage::Unwind(unwound), Stage::Group { by }, Stage::SortById]
                if unwound == by =>
            {
                Some(unwound.as_str())
            }
            _ => None,
        }
    }

    pub fn to_documents(&self) -> Vec<Document> {
        self.stages.iter().map(Stage::to_document).collect()
    }
}
