use bson::{doc, Document};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::role::Role;
use crate::security::PasswordHash;

pub mod db;

pub static TEACHER_COLLECTION_NAME: &str = "teachers";

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub username: String,
    pub display_name: String,
    pub password: PasswordHash,
    #[serde(default)]
    pub role: Role,
}

impl Teacher {
    pub fn new(
        username: impl ToString,
        display_name: impl ToString,
        password: PasswordHash,
        role: Role,
    ) -> Teacher {
        Teacher {
            username: username.to_string(),
            display_name: display_name.to_string(),
            password,
            role,
        }
    }

    /// Document keyed by the username.
    pub fn to_document(&self) -> Result<Document, StoreError> {
        let mut document = doc! { "_id": self.username.clone() };
        for (key, value) in bson::to_document(self)? {
            document.insert(key, value);
        }
        Ok(document)
    }
}

impl TryFrom<Document> for Teacher {
    type Error = StoreError;

    fn try_from(document: Document) -> Result<Self, Self::Error> {
        Ok(bson::from_document(document)?)
    }
}
