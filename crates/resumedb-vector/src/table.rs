//! LanceDB connection and table helpers.
use anyhow::{anyhow, Result};
use arrow_array::{RecordBatch, RecordBatchIterator, StringArray};
use lancedb::{connect, Connection, Table};
use std::path::Path;
use std::sync::Arc;

pub async fn open_db(path: &Path) -> Result<Connection> {
    Ok(connect(path.to_string_lossy().as_ref()).execute().await?)
}

pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let names = conn.table_names().execute().await?;
    Ok(names.iter().any(|n| n == name))
}

/// Open `name`, or `None` when the collection has never been written.
pub async fn open_if_exists(conn: &Connection, name: &str) -> Result<Option<Table>> {
    if !table_exists(conn, name).await? {
        return Ok(None);
    }
    Ok(Some(conn.open_table(name).execute().await?))
}

pub async fn ensure_table(conn: &Connection, name: &str, schema: Arc<arrow_schema::Schema>) -> Result<Table> {
    if let Some(table) = open_if_exists(conn, name).await? {
        return Ok(table);
    }
    // create empty table with 0 rows
    let iter = RecordBatchIterator::new(vec![].into_iter(), schema);
    Ok(conn.create_table(name, Box::new(iter)).execute().await?)
}

/// SQL predicate selecting every row of one file.
pub fn file_filter(file_identifier: &str) -> String {
    format!("file_identifier = '{}'", file_identifier.replace('\'', "''"))
}

pub(crate) fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| anyhow!("{name} column missing"))
}

#[cfg(test)]
mod tests {
    use super::file_filter;

    #[test]
    fn filter_escapes_quotes() {
        assert_eq!(file_filter("o'brien/cv.pdf"), "file_identifier = 'o''brien/cv.pdf'");
    }
}
