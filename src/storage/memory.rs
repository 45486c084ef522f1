use crate::prelude::*;
use crate::helper_funcs::build_rec_batch::{batches_to_rows, build_row_batch, table_schema};
use std::sync::Mutex;

struct MemoryTable {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
    next_id: i64,
}

/// In-process store keeping each table as Arrow record batches.
///
/// Projections run through a DataFusion `SessionContext` over a `MemTable`
/// built from the current batches. A single target partition keeps scans in
/// insertion order. Contents live as long as the store.
pub struct MemoryStore {
    ctx: SessionContext,
    tables: Mutex<HashMap<String, MemoryTable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            ctx: SessionContext::new_with_config(SessionConfig::new().with_target_partitions(1)),
            tables: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> FeedResult<std::sync::MutexGuard<'_, HashMap<String, MemoryTable>>> {
        self.tables
            .lock()
            .map_err(|_| FeedError::Custom("memory store lock poisoned".to_string()))
    }

    /// Arrow schema of `table`, identity column included
    pub fn table_schema(&self, table: &str) -> FeedResult<SchemaRef> {
        let tables = self.lock()?;
        tables
            .get(table)
            .map(|t| t.schema.clone())
            .ok_or_else(|| missing_table(table))
    }

    pub fn row_count(&self, table: &str) -> FeedResult<usize> {
        let tables = self.lock()?;
        tables
            .get(table)
            .map(|t| t.batches.iter().map(|b| b.num_rows()).sum())
            .ok_or_else(|| missing_table(table))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn missing_table(table: &str) -> FeedError {
    FeedError::Storage {
        operation: "lookup".to_string(),
        message: format!("table '{}' does not exist", table),
        transient: false,
    }
}

impl TableStore for MemoryStore {
    async fn table_exists(&self, table: &str) -> FeedResult<bool> {
        Ok(self.lock()?.contains_key(table))
    }

    async fn create_table(&self, table: &str, columns: &[String]) -> FeedResult<()> {
        let mut tables = self.lock()?;
        if tables.contains_key(table) {
            return Err(FeedError::TableExists {
                table: table.to_string(),
            });
        }

        let schema = table_schema(columns);
        let mut seen = HashSet::new();
        for field in schema.fields() {
            if !seen.insert(field.name().to_lowercase()) {
                return Err(FeedError::Storage {
                    operation: "create table".to_string(),
                    message: format!("duplicate column name '{}'", field.name()),
                    transient: false,
                });
            }
        }

        tables.insert(
            table.to_string(),
            MemoryTable {
                schema,
                batches: Vec::new(),
                next_id: 1,
            },
        );
        Ok(())
    }

    async fn insert_row(&self, table: &str, row: &Row) -> FeedResult<()> {
        let mut tables = self.lock()?;
        let entry = tables.get_mut(table).ok_or_else(|| missing_table(table))?;

        if let Some(unknown) = row.columns().find(|c| entry.schema.index_of(c).is_err()) {
            return Err(FeedError::InsertFailed {
                table: table.to_string(),
                record: None,
                message: format!("table '{}' has no column named '{}'", table, unknown),
                transient: false,
            });
        }

        let batch = build_row_batch(&entry.schema, entry.next_id, row)?;
        entry.batches.push(batch);
        entry.next_id += 1;
        Ok(())
    }

    async fn select_rows(
        &self,
        table: &str,
        columns: &[String],
        limit: usize,
    ) -> FeedResult<Vec<Vec<Option<String>>>> {
        let (schema, batches) = {
            let tables = self.lock()?;
            let entry = tables.get(table).ok_or_else(|| missing_table(table))?;
            (entry.schema.clone(), entry.batches.clone())
        };

        let mem_table = MemTable::try_new(schema, vec![batches])?;
        let names: Vec<&str> = columns.iter().map(String::as_str).collect();

        let batches = self
            .ctx
            .read_table(Arc::new(mem_table))?
            .select_columns(&names)?
            .limit(0, Some(limit))?
            .collect()
            .await?;

        batches_to_rows(&batches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_create_table_twice_fails() {
        let store = MemoryStore::new();
        store.create_table("products", &names(&["sku"])).await.unwrap();
        assert!(store.table_exists("products").await.unwrap());

        let err = store.create_table("products", &names(&["other"])).await.unwrap_err();
        assert!(matches!(err, FeedError::TableExists { table } if table == "products"));
    }

    #[tokio::test]
    async fn test_duplicate_columns_rejected() {
        let store = MemoryStore::new();
        let err = store.create_table("t", &names(&["sku", "SKU"])).await.unwrap_err();
        assert!(matches!(err, FeedError::Storage { .. }));
        assert!(!store.table_exists("t").await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_and_select_in_order() {
        let store = MemoryStore::new();
        store.create_table("products", &names(&["sku", "price"])).await.unwrap();

        for (sku, price) in [("A1", "1.00"), ("A2", "2.00"), ("A3", "3.00")] {
            let mut row = Row::new();
            row.set("sku", sku);
            row.set("price", price);
            store.insert_row("products", &row).await.unwrap();
        }

        let rows = store
            .select_rows("products", &names(&["id", "sku"]), 2)
            .await
            .unwrap();
        assert_eq!(
            rows,
            vec![
                vec![Some("1".to_string()), Some("A1".to_string())],
                vec![Some("2".to_string()), Some("A2".to_string())],
            ]
        );
        assert_eq!(store.row_count("products").unwrap(), 3);
    }

    #[tokio::test]
    async fn test_insert_unknown_column_fails() {
        let store = MemoryStore::new();
        store.create_table("products", &names(&["sku"])).await.unwrap();

        let mut row = Row::new();
        row.set("colour", "red");
        let err = store.insert_row("products", &row).await.unwrap_err();
        assert!(matches!(err, FeedError::InsertFailed { .. }));
        assert_eq!(store.row_count("products").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_values_are_null() {
        let store = MemoryStore::new();
        store.create_table("products", &names(&["sku", "price"])).await.unwrap();

        let mut row = Row::new();
        row.set("sku", "A1");
        store.insert_row("products", &row).await.unwrap();

        let rows = store
            .select_rows("products", &names(&["price"]), 20)
            .await
            .unwrap();
        assert_eq!(rows, vec![vec![None]]);
    }

    #[tokio::test]
    async fn test_case_sensitive_column_projection() {
        let store = MemoryStore::new();
        store.create_table("feed", &names(&["CategoryName"])).await.unwrap();

        let mut row = Row::new();
        row.set("CategoryName", "Coffee");
        store.insert_row("feed", &row).await.unwrap();

        let rows = store
            .select_rows("feed", &names(&["CategoryName"]), 20)
            .await
            .unwrap();
        assert_eq!(rows, vec![vec![Some("Coffee".to_string())]]);
    }
}
