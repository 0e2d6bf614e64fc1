//! Read-only views over a store, for debugging what ingestion wrote.

use anyhow::Result;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase, Select};
use lancedb::Connection;
use serde::Serialize;

use resumedb_core::Metadata;

use crate::store::parse_metadata;
use crate::table::{open_if_exists, string_column};

#[derive(Debug, Clone, Serialize)]
pub struct StoredRecord {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
}

pub async fn list_collections(conn: &Connection) -> Result<Vec<String>> {
    Ok(conn.table_names().execute().await?)
}

/// Id, text and metadata of every record in `collection`, sorted by id.
pub async fn dump_records(conn: &Connection, collection: &str) -> Result<Vec<StoredRecord>> {
    let Some(table) = open_if_exists(conn, collection).await? else {
        return Ok(Vec::new());
    };
    let mut stream = table
        .query()
        .select(Select::columns(&["id", "content", "metadata"]))
        .execute()
        .await?;
    let mut records = Vec::new();
    while let Some(batch) = stream.try_next().await? {
        let ids = string_column(&batch, "id")?;
        let contents = string_column(&batch, "content")?;
        let metas = string_column(&batch, "metadata")?;
        for i in 0..batch.num_rows() {
            records.push(StoredRecord {
                id: ids.value(i).to_string(),
                content: contents.value(i).to_string(),
                metadata: parse_metadata(metas.value(i))?,
            });
        }
    }
    records.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(records)
}
