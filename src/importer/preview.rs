use crate::prelude::*;
use crate::helper_funcs::build_rec_batch::build_text_batch;

pub const DEFAULT_PREVIEW_LIMIT: usize = 20;
pub const DEFAULT_DISPLAY_WIDTH: usize = 20;
pub const DEFAULT_PREVIEW_COLUMNS: usize = 3;
pub const TRUNCATION_MARKER: &str = "...";

/// Rows fetched back from an imported table. Values are exactly as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Preview {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Pretty table with every value cut to `width` characters.
    pub fn render(&self, width: usize) -> FeedResult<String> {
        let display_rows: Vec<Vec<Option<String>>> = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|value| value.as_deref().map(|v| truncate_for_display(v, width)))
                    .collect()
            })
            .collect();

        let batch = build_text_batch(&self.columns, &display_rows)?;
        Ok(pretty_format_batches(&[batch])?.to_string())
    }
}

/// First `width` characters followed by `...` when `value` is longer.
pub fn truncate_for_display(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut shown: String = value.chars().take(width).collect();
    shown.push_str(TRUNCATION_MARKER);
    shown
}

pub fn default_preview_columns(columns: &[Column]) -> Vec<String> {
    columns
        .iter()
        .take(DEFAULT_PREVIEW_COLUMNS)
        .map(|c| c.storage_name.clone())
        .collect()
}

pub async fn fetch_preview<S: TableStore>(
    store: &S,
    table: &str,
    columns: &[String],
    limit: usize,
) -> FeedResult<Preview> {
    if columns.is_empty() {
        return Err(FeedError::Custom(
            "No columns selected for preview".to_string(),
        ));
    }

    let rows = store.select_rows(table, columns, limit).await?;
    debug!("Fetched {} preview rows from '{}'", rows.len(), table);

    Ok(Preview {
        columns: columns.to_vec(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_display() {
        assert_eq!(truncate_for_display("short", 20), "short");
        assert_eq!(truncate_for_display("exactly-twenty-chars", 20), "exactly-twenty-chars");
        assert_eq!(
            truncate_for_display("this description is far too long", 20),
            "this description is ..."
        );
        assert_eq!(truncate_for_display("ünïcödé", 3), "ünï...");
    }

    #[test]
    fn test_default_preview_columns_takes_three() {
        let columns: Vec<Column> = ["a", "b", "c", "d"].iter().map(|n| Column::positional(*n)).collect();
        assert_eq!(default_preview_columns(&columns), vec!["a", "b", "c"]);
        assert_eq!(default_preview_columns(&columns[..1]), vec!["a"]);
    }

    #[test]
    fn test_render_truncates_only_output() {
        let long = "a very long product description".to_string();
        let preview = Preview {
            columns: vec!["sku".to_string(), "description".to_string()],
            rows: vec![vec![Some("A1".to_string()), Some(long.clone())], vec![Some("A2".to_string()), None]],
        };

        let rendered = preview.render(10).unwrap();
        assert!(rendered.contains("a very lon..."));
        assert!(!rendered.contains(&long));
        assert!(rendered.contains("description"));
        assert_eq!(preview.rows[0][1].as_deref(), Some(long.as_str()));
    }

    #[tokio::test]
    async fn test_fetch_preview_respects_limit_and_projection() {
        let store = MemoryStore::new();
        store
            .create_table("products", &["sku".to_string(), "price".to_string()])
            .await
            .unwrap();
        for i in 0..5 {
            let mut row = Row::new();
            row.set("sku", format!("A{}", i));
            row.set("price", format!("{}.00", i));
            store.insert_row("products", &row).await.unwrap();
        }

        let preview = fetch_preview(&store, "products", &["price".to_string()], 3).await.unwrap();
        assert_eq!(preview.columns, vec!["price"]);
        assert_eq!(
            preview.rows,
            vec![
                vec![Some("0.00".to_string())],
                vec![Some("1.00".to_string())],
                vec![Some("2.00".to_string())],
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_preview_needs_columns() {
        let store = MemoryStore::new();
        assert!(fetch_preview(&store, "products", &[], 5).await.is_err());
    }
}
