// src/store.rs

use futures::stream::TryStreamExt;
use mongodb::bson::Document;
use mongodb::bson::doc;
use mongodb::{options::ClientOptions, Client, Collection, Database};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const EMPLOYEES: &str = "employees";
pub const TASKINGS: &str = "taskings";
pub const MESSAGES: &str = "messages";
pub const POSTS: &str = "posts";
pub const USERS: &str = "users";
pub const EMPLOYEE_IMAGES: &str = "employee_images";

pub struct MongoDB {
    pub client: Client,
    pub db: Database,
}

impl MongoDB {
    pub async fn init(uri: &str, db_name: &str) -> Self {
        let client_options = ClientOptions::parse(uri)
            .await
            .expect("Failed to parse MongoDB connection string");
        let client = Client::with_options(client_options).expect("Failed to initialize client");
        let db = client.database(db_name);
        MongoDB { client, db }
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection::<T>(name)
    }

    /// Fetch every record of a collection. No retries: a failed call surfaces
    /// immediately to the caller.
    pub async fn list<T>(&self, collection: &str) -> mongodb::error::Result<Vec<T>>
    where
        T: DeserializeOwned + Send + Sync + Unpin,
    {
        self.collection::<T>(collection)
            .find(doc! {})
            .await?
            .try_collect()
            .await
    }

    /// Like `list`, with a server-side sort applied.
    pub async fn list_sorted<T>(
        &self,
        collection: &str,
        sort: Document,
    ) -> mongodb::error::Result<Vec<T>>
    where
        T: DeserializeOwned + Send + Sync + Unpin,
    {
        self.collection::<T>(collection)
            .find(doc! {})
            .sort(sort)
            .await?
            .try_collect()
            .await
    }

    /// Fetch a single record by its string `_id`. `Ok(None)` is the NotFound case.
    pub async fn get<T>(&self, collection: &str, id: &str) -> mongodb::error::Result<Option<T>>
    where
        T: DeserializeOwned + Send + Sync + Unpin,
    {
        self.collection::<T>(collection).find_one(doc! { "_id": id }).await
    }

    /// Insert a record and hand back the identifier the store accepted.
    pub async fn create<T>(&self, collection: &str, record: &T) -> mongodb::error::Result<String>
    where
        T: Serialize + Send + Sync,
    {
        let result = self.collection::<T>(collection).insert_one(record).await?;
        Ok(result
            .inserted_id
            .as_str()
            .map(String::from)
            .unwrap_or_else(|| result.inserted_id.to_string()))
    }

    /// Apply a partial `$set` to one record. Returns whether a record matched.
    pub async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> mongodb::error::Result<bool> {
        let result = self
            .collection::<Document>(collection)
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .await?;
        Ok(result.matched_count > 0)
    }
}
