use bson::{Bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};

use super::memory::MemoryCollection;
use super::query::{Filter, Pipeline, Update};
use crate::error::StoreError;

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Clone, PartialEq)]
pub struct InsertOneResult {
    pub inserted_id: Bson,
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Query/update surface shared by the MongoDB and in-memory backends.
pub trait DocumentCollection {
    async fn count_documents(&self, filter: &Filter) -> Result<u64, StoreError>;

    async fn insert_one(&mut self, document: Document) -> Result<InsertOneResult, StoreError>;

    async fn find(&self, filter: &Filter) -> Result<Vec<Document>, StoreError>;

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, StoreError>;

    async fn update_one(
        &mut self,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateResult, StoreError>;

    async fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<Document>, StoreError>;
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        e.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY_CODE
    )
}

async fn drain(mut cursor: mongodb::Cursor<Document>) -> Result<Vec<Document>, StoreError> {
    let mut documents = Vec::new();
    while cursor.advance().await? {
        documents.push(cursor.deserialize_current()?);
    }
    Ok(documents)
}

impl DocumentCollection for mongodb::Collection<Document> {
    async fn count_documents(&self, filter: &Filter) -> Result<u64, StoreError> {
        Ok(mongodb::Collection::count_documents(self, filter.to_document(), None).await?)
    }

    async fn insert_one(&mut self, document: Document) -> Result<InsertOneResult, StoreError> {
        let id = document.get("_id").cloned();

        match mongodb::Collection::insert_one(self, document, None).await {
            Ok(result) => Ok(InsertOneResult {
                inserted_id: result.inserted_id,
            }),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::DuplicateKey(id.unwrap_or(Bson::Null))),
            Err(e) => Err(e.into()),
        }
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let cursor = mongodb::Collection::find(self, filter.to_document(), None).await?;
        drain(cursor).await
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, StoreError> {
        Ok(mongodb::Collection::find_one(self, filter.to_document(), None).await?)
    }

    async fn update_one(
        &mut self,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateResult, StoreError> {
        let result =
            mongodb::Collection::update_one(self, filter.to_document(), update.to_document(), None)
                .await?;

        Ok(UpdateResult {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<Document>, StoreError> {
        let cursor = mongodb::Collection::aggregate(self, pipeline.to_documents(), None).await?;
        drain(cursor).await
    }
}

impl DocumentCollection for MemoryCollection {
    async fn count_documents(&self, filter: &Filter) -> Result<u64, StoreError> {
        Ok(MemoryCollection::count_documents(self, filter))
    }

    async fn insert_one(&mut self, document: Document) -> Result<InsertOneResult, StoreError> {
        MemoryCollection::insert_one(self, document)
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        Ok(MemoryCollection::find(self, filter))
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, StoreError> {
        Ok(MemoryCollection::find_one(self, filter))
    }

    async fn update_one(
        &mut self,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateResult, StoreError> {
        Ok(MemoryCollection::update_one(self, filter, update))
    }

    async fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<Document>, StoreError> {
        Ok(MemoryCollection::aggregate(self, pipeline))
    }
}

/// A collection handle bound to whichever backend was chosen at startup.
/// There is exactly one handle per collection, so this is not `Clone`.
#[derive(Debug)]
pub enum Collection {
    MongoDb(mongodb::Collection<Document>),
    InMemory(MemoryCollection),
}

impl Collection {
    pub fn name(&self) -> &str {
        match self {
            Collection::MongoDb(c) => c.name(),
            Collection::InMemory(c) => c.name(),
        }
    }
}

impl DocumentCollection for Collection {
    async fn count_documents(&self, filter: &Filter) -> Result<u64, StoreError> {
        match self {
            Collection::MongoDb(c) => DocumentCollection::count_documents(c, filter).await,
            Collection::InMemory(c) => DocumentCollection::count_documents(c, filter).await,
        }
    }

    async fn insert_one(&mut self, document: Document) -> Result<InsertOneResult, StoreError> {
        match self {
            Collection::MongoDb(c) => DocumentCollection::insert_one(c, document).await,
            Collection::InMemory(c) => DocumentCollection::insert_one(c, document).await,
        }
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        match self {
            Collection::MongoDb(c) => DocumentCollection::find(c, filter).await,
            Collection::InMemory(c) => DocumentCollection::find(c, filter).await,
        }
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, StoreError> {
        match self {
            Collection::MongoDb(c) => DocumentCollection::find_one(c, filter).await,
            Collection::InMemory(c) => DocumentCollection::find_one(c, filter).await,
        }
    }

    async fn update_one(
        &mut self,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateResult, StoreError> {
        match self {
            Collection::MongoDb(c) => DocumentCollection::update_one(c, filter, update).await,
            Collection::InMemory(c) => DocumentCollection::update_one(c, filter, update).await,
        }
    }

    async fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<Document>, StoreError> {
        match self {
            Collection::MongoDb(c) => DocumentCollection::aggregate(c, pipeline).await,
            Collection::InMemory(c) => DocumentCollection::aggregate(c, pipeline).await,
        }
    }
}
