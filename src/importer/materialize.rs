use crate::prelude::*;
use crate::datatypes::column::storage_names;
use crate::normalizers::normalize::is_storage_identifier;

pub fn validate_table_name(name: &str) -> FeedResult<()> {
    if is_storage_identifier(name) {
        Ok(())
    } else {
        Err(FeedError::InvalidTableName {
            name: name.to_string(),
        })
    }
}

/// Creates `table` with the identity column plus one text column per `Column`.
///
/// An existing table is never reused or altered.
pub async fn create_table<S: TableStore>(store: &S, table: &str, columns: &[Column]) -> FeedResult<()> {
    validate_table_name(table)?;

    if store.table_exists(table).await? {
        error!("Table '{}' already exists, refusing to overwrite it", table);
        return Err(FeedError::TableExists {
            table: table.to_string(),
        });
    }

    let names = storage_names(columns);
    if let Err(e) = store.create_table(table, &names).await {
        error!("Failed to create table '{}': {}", table, e.detail());
        return Err(e);
    }

    info!("Created table '{}' with {} data columns", table, names.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<Column> {
        vec![Column::new("sku", "sku"), Column::new("images.url", "url")]
    }

    #[test]
    fn test_table_name_validation() {
        assert!(validate_table_name("products_2024").is_ok());
        assert!(validate_table_name("Feed").is_ok());
        for bad in ["", "2024_products", "my table", "drop;--", "_x"] {
            assert!(matches!(
                validate_table_name(bad),
                Err(FeedError::InvalidTableName { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_creates_identity_plus_columns() {
        let store = MemoryStore::new();
        create_table(&store, "products", &columns()).await.unwrap();

        let schema = store.table_schema("products").unwrap();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, vec!["id", "sku", "url"]);
    }

    #[tokio::test]
    async fn test_second_create_is_table_exists() {
        let store = MemoryStore::new();
        create_table(&store, "products", &columns()).await.unwrap();

        let err = create_table(&store, "products", &columns()).await.unwrap_err();
        assert!(matches!(err, FeedError::TableExists { .. }));
        assert_eq!(store.row_count("products").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_name_never_reaches_store() {
        let store = MemoryStore::new();
        let err = create_table(&store, "bad name", &columns()).await.unwrap_err();
        assert!(matches!(err, FeedError::InvalidTableName { .. }));
        assert!(!store.table_exists("bad name").await.unwrap());
    }
}
