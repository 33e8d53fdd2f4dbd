//! Backend selection for the registry collections.
//!
//! [`Store::connect`] makes a single bounded attempt to reach MongoDB. When it
//! fails for any reason the store falls back to [`MemoryCollection`]s for the
//! rest of the process. The choice is never revisited.

use bson::doc;
use mongodb::options::ClientOptions;
use mongodb::Client;

use crate::config::Config;
use crate::data::activity::ACTIVITY_COLLECTION_NAME;
use crate::data::teacher::TEACHER_COLLECTION_NAME;

pub mod collection;
pub mod memory;
pub mod query;

pub use collection::{Collection, DocumentCollection, InsertOneResult, UpdateResult};
pub use memory::MemoryCollection;
pub use query::{Condition, Filter, Pipeline, Stage, Update};

static APP_NAME: &str = "mergington-registry";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Backend {
    MongoDb,
    InMemory,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::MongoDb => write!(f, "MongoDB"),
            Backend::InMemory => write!(f, "in-memory"),
        }
    }
}

/// Handles to the registry's two collections. There is one store per
/// process; share it behind a lock rather than copying it.
#[derive(Debug)]
pub struct Store {
    pub activities: Collection,
    pub teachers: Collection,
}

impl Store {
    /// Connects to the configured MongoDB instance, or falls back to
    /// in-memory collections. Emits exactly one log line naming the backend.
    pub async fn connect(config: &Config) -> Store {
        let timeout = config.connect_timeout();

        match tokio::time::timeout(timeout, Store::connect_mongodb(config)).await {
            Ok(Ok(store)) => {
                tracing::info!("Connected to MongoDB database '{}'.", config.mongodb_db);
                store
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    "MongoDB connection failed: {}. Using in-memory storage.",
                    e
                );
                Store::in_memory()
            }
            Err(_) => {
                tracing::warn!(
                    "MongoDB connection failed: no response within {} ms. Using in-memory storage.",
                    timeout.as_millis()
                );
                Store::in_memory()
            }
        }
    }

    async fn connect_mongodb(config: &Config) -> Result<Store, mongodb::error::Error> {
        let mut options = ClientOptions::parse(config.mongodb_uri.as_str()).await?;
        options.server_selection_timeout = Some(config.connect_timeout());
        options.connect_timeout = Some(config.connect_timeout());
        options
            .app_name
            .get_or_insert_with(|| APP_NAME.to_string());

        let client = Client::with_options(options)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;

        let db = client.database(config.mongodb_db.as_str());
        Ok(Store {
            activities: Collection::MongoDb(db.collection(ACTIVITY_COLLECTION_NAME)),
            teachers: Collection::MongoDb(db.collection(TEACHER_COLLECTION_NAME)),
        })
    }

    pub fn in_memory() -> Store {
        Store {
            activities: Collection::InMemory(MemoryCollection::new(ACTIVITY_COLLECTION_NAME)),
            teachers: Collection::InMemory(MemoryCollection::new(TEACHER_COLLECTION_NAME)),
        }
    }

    pub fn backend(&self) -> Backend {
        match self.activities {
            Collection::MongoDb(_) => Backend::MongoDb,
            Collection::InMemory(_) => Backend::InMemory,
        }
    }
}
