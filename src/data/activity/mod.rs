use bson::Document;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub mod db;

pub static ACTIVITY_COLLECTION_NAME: &str = "activities";

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDetails {
    pub days: Vec<String>,
    /// Zero-padded 24-hour `"HH:MM"`.
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "_id")]
    pub name: String,
    pub description: String,
    /// Human readable schedule, e.g. "Mondays and Fridays, 3:15 PM - 4:45 PM".
    pub schedule: String,
    pub schedule_details: ScheduleDetails,
    pub max_participants: u32,

    #[serde(default)]
    pub participants: Vec<String>,
}

impl Activity {
    pub fn to_document(&self) -> Result<Document, StoreError> {
        Ok(bson::to_document(self)?)
    }

    pub fn spots_left(&self) -> u32 {
        self.max_participants
            .saturating_sub(self.participants.len() as u32)
    }

    pub fn is_full(&self) -> bool {
        self.spots_left() == 0
    }
}

impl TryFrom<Document> for Activity {
    type Error = StoreError;

    fn try_from(document: Document) -> Result<Self, Self::Error> {
        Ok(bson::from_document(document)?)
    }
}
