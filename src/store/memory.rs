//! In-process stand-in for a MongoDB collection.
//!
//! Documents live in insertion order, keyed by `_id`. The identifier is kept
//! outside the stored body and re-attached as the first field on every read.
//! Lookup misses yield empty results and unrecognised instructions match
//! nothing, mirroring what callers observe from the native backend.
//!
//! There is no internal locking. Mutations take `&mut self`, so a concurrent
//! caller has to serialise access itself.

use std::collections::BTreeSet;

use bson::{doc, Bson, Document};

use super::collection::{InsertOneResult, UpdateResult};
use super::query::{Condition, Filter, Pipeline, Update, DAYS_PATH, END_TIME_PATH, START_TIME_PATH};
use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    id: Bson,
    body: Document,
}

impl Entry {
    fn get(&self, path: &str) -> Option<&Bson> {
        match path.split_once('.') {
            None if path == "_id" => Some(&self.id),
            Some(("_id", rest)) => match &self.id {
                Bson::Document(id) => lookup(id, rest),
                _ => None,
            },
            _ => lookup(&self.body, path),
        }
    }

    fn to_document(&self) -> Document {
        let mut document = doc! { "_id": self.id.clone() };
        for (key, value) in &self.body {
            document.insert(key.clone(), value.clone());
        }
        document
    }

    fn matches(&self, filter: &Filter) -> bool {
        filter.conditions().iter().all(|it| self.satisfies(it))
    }

    fn satisfies(&self, condition: &Condition) -> bool {
        match condition {
            Condition::FieldEquals { field, value } => match self.get(field) {
                Some(found) => values_equal(found, value),
                None => *value == Bson::Null,
            },
            Condition::DaysIn(days) => match self.get(DAYS_PATH) {
                Some(Bson::Array(scheduled)) => scheduled
                    .iter()
                    .any(|day| matches!(day, Bson::String(day) if days.contains(day))),
                Some(Bson::String(day)) => days.contains(day),
                _ => false,
            },
            // "HH:MM" is zero padded, so string order is time order
            Condition::TimeAtLeast(bound) => match self.get(START_TIME_PATH) {
                Some(Bson::String(start)) => start.as_str() >= bound.as_str(),
                _ => false,
            },
            Condition::TimeAtMost(bound) => match self.get(END_TIME_PATH) {
                Some(Bson::String(end)) => end.as_str() <= bound.as_str(),
                _ => false,
            },
        }
    }

    fn apply(&mut self, update: &Update) {
        match update {
            Update::PushTo { field, value } => {
                if !self.body.contains_key(field) {
                    self.body.insert(field.as_str(), Bson::Array(vec![]));
                }
                if let Some(Bson::Array(list)) = self.body.get_mut(field) {
                    list.push(value.clone());
                }
            }
            Update::PullFrom { field, value } => {
                if let Some(Bson::Array(list)) = self.body.get_mut(field) {
                    list.retain(|it| !values_equal(it, value));
                }
            }
        }
    }
}

/// Resolves a dotted path through nested documents.
fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Bson::Document(inner) => inner.get(segment)?,
            _ => return None,
        };
    }
    Some(current)
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(it) => Some(*it as f64),
        Bson::Int64(it) => Some(*it as f64),
        Bson::Double(it) => Some(*it),
        _ => None,
    }
}

/// Equality as MongoDB sees it: numbers compare by value across BSON types.
fn values_equal(a: &Bson, b: &Bson) -> bool {
    match (as_number(a), as_number(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a == b,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryCollection {
    name: String,
    entries: Vec<Entry>,
}

impl MemoryCollection {
    pub fn new(name: impl ToString) -> MemoryCollection {
        MemoryCollection {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count_documents(&self, filter: &Filter) -> u64 {
        if filter.is_empty() {
            return self.entries.len() as u64;
        }
        self.entries.iter().filter(|it| it.matches(filter)).count() as u64
    }

    fn contains_id(&self, id: &Bson) -> bool {
        self.entries.iter().any(|it| values_equal(&it.id, id))
    }

    /// First integer id not yet taken, counting up from the current size.
    fn next_free_id(&self) -> Bson {
        let mut candidate = self.entries.len() as i64;
        while self.contains_id(&Bson::Int64(candidate)) {
            candidate += 1;
        }
        Bson::Int64(candidate)
    }

    /// Stores `document` under its `_id`, or under the next free integer id
    /// when it has none. A second insert with an existing `_id` is rejected.
    pub fn insert_one(&mut self, mut document: Document) -> Result<InsertOneResult, StoreError> {
        let id = match document.remove("_id") {
            Some(id) => id,
            None => self.next_free_id(),
        };

        if self.contains_id(&id) {
            return Err(StoreError::DuplicateKey(id));
        }

        tracing::debug!("{}: inserting document {}", self.name, id);
        self.entries.push(Entry {
            id: id.clone(),
            body: document,
        });

        Ok(InsertOneResult { inserted_id: id })
    }

    pub fn find(&self, filter: &Filter) -> Vec<Document> {
        self.entries
            .iter()
            .filter(|it| it.matches(filter))
            .map(Entry::to_document)
            .collect()
    }

    pub fn find_one(&self, filter: &Filter) -> Option<Document> {
        self.entries
            .iter()
            .find(|it| it.matches(filter))
            .map(Entry::to_document)
    }

    /// Applies `update` to the first matching document only.
    ///
    /// A matched document counts as modified even when the update leaves it
    /// unchanged, e.g. pulling a value that was never present.
    pub fn update_one(&mut self, filter: &Filter, update: &Update) -> UpdateResult {
        match self.entries.iter_mut().find(|it| it.matches(filter)) {
            Some(entry) => {
                entry.apply(update);
                UpdateResult {
                    matched_count: 1,
                    modified_count: 1,
                }
            }
            None => UpdateResult::default(),
        }
    }

    /// Evaluates an unwind + group-by-distinct pipeline; any other shape
    /// yields no rows. Rows are sorted by plain string order, so weekday
    /// names do not come out in calendar order.
    pub fn aggregate(&self, pipeline: &Pipeline) -> Vec<Document> {
        let path = match pipeline.distinct_path() {
            Some(path) => path,
            None => return vec![],
        };

        let mut distinct = BTreeSet::new();
        for entry in &self.entries {
            match entry.get(path) {
                Some(Bson::Array(values)) => {
                    distinct.extend(values.iter().filter_map(Bson::as_str));
                }
                Some(Bson::String(value)) => {
                    distinct.insert(value.as_str());
                }
                _ => {}
            }
        }

        distinct
            .into_iter()
            .map(|value| doc! { "_id": value })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::query::Stage;

    fn activity(name: &str, days: &[&str], start: &str, end: &str) -> Document {
        doc! {
            "_id": name,
            "description": format!("{} description", name),
            "schedule_details": {
                "days": days.to_vec(),
                "start_time": start,
                "end_time": end,
            },
            "max_participants": 12,
            "participants": [],
        }
    }

    fn collection(documents: Vec<Document>) -> MemoryCollection {
        let mut collection = MemoryCollection::new("activities");
        for document in documents {
            collection.insert_one(document).unwrap();
        }
        collection
    }

    #[test]
    fn identifier_is_reattached_first() {
        let mut collection = MemoryCollection::new("activities");
        let document = activity("Chess Club", &["Monday", "Friday"], "15:15", "16:45");

        let result = collection.insert_one(document.clone()).unwrap();
        assert_eq!(result.inserted_id, Bson::from("Chess Club"));

        let found = collection.find_one(&Filter::by_id("Chess Club")).unwrap();
        assert_eq!(found, document);
        assert_eq!(found.keys().next().map(String::as_str), Some("_id"));
        assert!(collection.entries[0].body.get("_id").is_none());
    }

    #[test]
    fn missing_identifier_falls_back_to_size() {
        let mut collection = collection(vec![activity("Art Club", &["Thursday"], "15:15", "17:00")]);

        let result = collection.insert_one(doc! { "description": "untitled" }).unwrap();
        assert_eq!(result.inserted_id, Bson::Int64(1));
        assert_eq!(collection.count_documents(&Filter::by_id(1)), 1);
    }

    #[test]
    fn missing_identifier_skips_taken_integer_ids() {
        let mut collection = MemoryCollection::new("activities");
        collection.insert_one(doc! { "_id": 1, "description": "explicit" }).unwrap();

        let result = collection.insert_one(doc! { "description": "untitled" }).unwrap();
        assert_eq!(result.inserted_id, Bson::Int64(2));
        assert_eq!(collection.count_documents(&Filter::all()), 2);

        let next = collection.insert_one(doc! { "description": "another" }).unwrap();
        assert_eq!(next.inserted_id, Bson::Int64(3));
    }

    #[test]
    fn duplicate_identifier_is_rejected() {
        let mut collection = collection(vec![activity("Art Club", &["Thursday"], "15:15", "17:00")]);

        let err = collection
            .insert_one(activity("Art Club", &["Friday"], "08:00", "09:00"))
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(Bson::String(ref id)) if id == "Art Club"));

        let stored = collection.find_one(&Filter::by_id("Art Club")).unwrap();
        assert_eq!(
            stored.get_document("schedule_details").unwrap().get_array("days").unwrap(),
            &vec![Bson::from("Thursday")]
        );
    }

    #[test]
    fn find_without_conditions_keeps_insertion_order() {
        let collection = collection(vec![
            activity("Soccer Team", &["Tuesday"], "15:30", "17:30"),
            activity("Art Club", &["Thursday"], "15:15", "17:00"),
            activity("Math Club", &["Tuesday"], "07:15", "08:00"),
        ]);

        let names: Vec<String> = collection
            .find(&Filter::all())
            .iter()
            .map(|it| it.get_str("_id").unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Soccer Team", "Art Club", "Math Club"]);
    }

    #[test]
    fn days_in_matches_any_shared_day() {
        let collection = collection(vec![
            activity("Chess Club", &["Monday", "Friday"], "15:15", "16:45"),
            activity("Math Club", &["Tuesday"], "07:15", "08:00"),
        ]);

        let friday = collection.find(&Condition::DaysIn(vec!["Friday".into()]).into());
        assert_eq!(friday.len(), 1);
        assert_eq!(friday[0].get_str("_id").unwrap(), "Chess Club");

        let either = collection.count_documents(
            &Condition::DaysIn(vec!["Sunday".into(), "Tuesday".into(), "Monday".into()]).into(),
        );
        assert_eq!(either, 2);

        let none = collection.count_documents(&Condition::DaysIn(vec![]).into());
        assert_eq!(none, 0);
    }

    #[test]
    fn time_bounds_compare_as_strings() {
        let collection = collection(vec![
            activity("Programming Class", &["Tuesday"], "07:00", "08:00"),
            activity("Art Club", &["Thursday"], "09:00", "17:00"),
        ]);

        let late = collection.find(&Condition::TimeAtLeast("08:00".into()).into());
        assert_eq!(late.len(), 1);
        assert_eq!(late[0].get_str("_id").unwrap(), "Art Club");

        let early = collection.find(&Condition::TimeAtMost("08:00".into()).into());
        assert_eq!(early.len(), 1);
        assert_eq!(early[0].get_str("_id").unwrap(), "Programming Class");

        let inclusive = collection.count_documents(
            &Filter::from(Condition::TimeAtLeast("07:00".into()))
                .and(Condition::TimeAtMost("17:00".into())),
        );
        assert_eq!(inclusive, 2);
    }

    #[test]
    fn operators_do_not_match_documents_missing_the_field() {
        let collection = collection(vec![doc! { "_id": "Unscheduled", "participants": [] }]);

        for condition in [
            Condition::DaysIn(vec!["Monday".into()]),
            Condition::TimeAtLeast("00:00".into()),
            Condition::TimeAtMost("23:59".into()),
        ] {
            assert_eq!(collection.count_documents(&condition.into()), 0);
        }
    }

    #[test]
    fn field_equality_is_exact_and_numeric_aware() {
        let collection = collection(vec![
            activity("Chess Club", &["Monday"], "15:15", "16:45"),
            doc! { "_id": "Debate Team", "max_participants": 12_i64 },
        ]);

        assert_eq!(collection.count_documents(&Filter::field_equals("max_participants", 12)), 2);
        assert_eq!(collection.count_documents(&Filter::field_equals("max_participants", 12.0)), 2);
        assert_eq!(collection.count_documents(&Filter::field_equals("max_participants", "12")), 0);
        assert_eq!(
            collection.count_documents(&Filter::field_equals("schedule_details.start_time", "15:15")),
            1
        );
        assert_eq!(collection.count_documents(&Filter::field_equals("missing", Bson::Null)), 2);
        assert_eq!(collection.count_documents(&Filter::field_equals("missing", "value")), 0);
    }

    #[test]
    fn find_one_miss_is_none() {
        let collection = collection(vec![activity("Art Club", &["Thursday"], "15:15", "17:00")]);

        assert_eq!(collection.find_one(&Filter::by_id("Pottery")), None);
        assert_eq!(MemoryCollection::new("teachers").find_one(&Filter::all()), None);
    }

    #[test]
    fn push_then_pull_restores_empty_list() {
        let mut collection = collection(vec![activity("Manga Maniacs", &["Tuesday"], "19:00", "20:00")]);
        let filter = Filter::by_id("Manga Maniacs");

        let pushed = collection.update_one(&filter, &Update::push("participants", "ella@mergington.edu"));
        assert_eq!(pushed.modified_count, 1);
        let pulled = collection.update_one(&filter, &Update::pull("participants", "ella@mergington.edu"));
        assert_eq!(pulled.modified_count, 1);

        let stored = collection.find_one(&filter).unwrap();
        assert!(stored.get_array("participants").unwrap().is_empty());

        let absent = collection.update_one(&filter, &Update::pull("participants", "nobody@mergington.edu"));
        assert_eq!(absent.matched_count, 1);
        assert_eq!(absent.modified_count, 1);
    }

    #[test]
    fn pull_removes_every_occurrence() {
        let mut collection = collection(vec![doc! {
            "_id": "Drama Club",
            "participants": ["ella@mergington.edu", "liam@mergington.edu", "ella@mergington.edu"],
        }]);
        let filter = Filter::by_id("Drama Club");

        collection.update_one(&filter, &Update::pull("participants", "ella@mergington.edu"));

        let stored = collection.find_one(&filter).unwrap();
        assert_eq!(
            stored.get_array("participants").unwrap(),
            &vec![Bson::from("liam@mergington.edu")]
        );
    }

    #[test]
    fn push_creates_missing_list_and_pull_ignores_non_lists() {
        let mut collection = collection(vec![doc! { "_id": "Chess Club", "schedule": "Mondays" }]);
        let filter = Filter::by_id("Chess Club");

        collection.update_one(&filter, &Update::push("participants", "noah@mergington.edu"));
        collection.update_one(&filter, &Update::pull("schedule", "Mondays"));
        collection.update_one(&filter, &Update::pull("waitlist", "noah@mergington.edu"));

        let stored = collection.find_one(&filter).unwrap();
        assert_eq!(
            stored.get_array("participants").unwrap(),
            &vec![Bson::from("noah@mergington.edu")]
        );
        assert_eq!(stored.get_str("schedule").unwrap(), "Mondays");
        assert!(stored.get("waitlist").is_none());
    }

    #[test]
    fn update_touches_only_first_match() {
        let mut collection = collection(vec![
            activity("Soccer Team", &["Tuesday"], "15:30", "17:30"),
            activity("Math Club", &["Tuesday"], "07:15", "08:00"),
        ]);

        let result = collection.update_one(
            &Condition::DaysIn(vec!["Tuesday".into()]).into(),
            &Update::push("participants", "liam@mergington.edu"),
        );
        assert_eq!(result.modified_count, 1);

        let soccer = collection.find_one(&Filter::by_id("Soccer Team")).unwrap();
        let math = collection.find_one(&Filter::by_id("Math Club")).unwrap();
        assert_eq!(soccer.get_array("participants").unwrap().len(), 1);
        assert!(math.get_array("participants").unwrap().is_empty());

        let miss = collection.update_one(&Filter::by_id("Pottery"), &Update::push("participants", "x"));
        assert_eq!(miss, UpdateResult::default());
    }

    #[test]
    fn distinct_days_are_sorted_lexicographically() {
        let collection = collection(vec![
            activity("A", &["Monday"], "08:00", "09:00"),
            activity("B", &["Friday", "Monday"], "08:00", "09:00"),
            activity("C", &["Saturday"], "08:00", "09:00"),
        ]);

        assert_eq!(
            collection.aggregate(&Pipeline::distinct_days()),
            vec![
                doc! { "_id": "Friday" },
                doc! { "_id": "Monday" },
                doc! { "_id": "Saturday" },
            ]
        );
    }

    #[test]
    fn unrecognised_pipeline_yields_nothing() {
        let collection = collection(vec![activity("A", &["Monday"], "08:00", "09:00")]);

        let pipeline = Pipeline::new(vec![
            Stage::Raw(doc! { "$match": { "_id": "A" } }),
            Stage::Unwind(DAYS_PATH.to_string()),
        ]);
        assert!(collection.aggregate(&pipeline).is_empty());
        assert!(collection.aggregate(&Pipeline::default()).is_empty());
    }
}
