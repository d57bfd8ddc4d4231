use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::{IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{db::Database, errors::AppResult};

/// Storage for opaque catalog records (categories, age ranges, questions...).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Records matching `filter`, newest first.
    async fn list(&self, filter: Document) -> AppResult<Vec<Document>>;
    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<Document>>;
    async fn create(&self, record: Document) -> AppResult<Document>;
    /// `$set`s `changes`; `None` when no record has that id.
    async fn update(&self, id: &ObjectId, changes: Document) -> AppResult<Option<Document>>;
    async fn delete(&self, id: &ObjectId) -> AppResult<Option<Document>>;
    /// Flips a boolean field (a missing field counts as false).
    async fn toggle(&self, id: &ObjectId, field: &str) -> AppResult<Option<Document>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoCatalogRepository {
    collection: Collection<Document>,
    index_field: &'static str,
}

impl MongoCatalogRepository {
    pub fn new(db: &Database, collection_name: &str, index_field: &'static str) -> Self {
        let collection = db.collection(collection_name);
        Self {
            collection,
            index_field,
        }
    }
}

#[async_trait]
impl CatalogRepository for MongoCatalogRepository {
    async fn list(&self, filter: Document) -> AppResult<Vec<Document>> {
        let cursor = self.collection.find(filter).sort(doc! { "_id": -1 }).await?;
        let records: Vec<Document> = cursor.try_collect().await?;
        Ok(records)
    }

    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<Document>> {
        let record = self.collection.find_one(doc! { "_id": *id }).await?;
        Ok(record)
    }

    async fn create(&self, mut record: Document) -> AppResult<Document> {
        let result = self.collection.insert_one(&record).await?;
        record.insert("_id", result.inserted_id);
        Ok(record)
    }

    async fn update(&self, id: &ObjectId, changes: Document) -> AppResult<Option<Document>> {
        let record = self
            .collection
            .find_one_and_update(doc! { "_id": *id }, doc! { "$set": changes })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(record)
    }

    async fn delete(&self, id: &ObjectId) -> AppResult<Option<Document>> {
        let record = self
            .collection
            .find_one_and_delete(doc! { "_id": *id })
            .await?;
        Ok(record)
    }

    async fn toggle(&self, id: &ObjectId, field: &str) -> AppResult<Option<Document>> {
        let current = format!("${}", field);
        let mut flipped = Document::new();
        flipped.insert(field, doc! { "$not": [current] });
        let pipeline = vec![doc! { "$set": flipped }];

        let record = self
            .collection
            .find_one_and_update(doc! { "_id": *id }, pipeline)
            .return_document(ReturnDocument::After)
            .await?;
        Ok(record)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let mut keys = Document::new();
        keys.insert(self.index_field, 1);
        let model = IndexModel::builder()
            .keys(keys)
            .options(
                IndexOptions::builder()
                    .name(format!("{}_idx", self.index_field))
                    .build(),
            )
            .build();

        self.collection.create_index(model).await?;
        Ok(())
    }
}
