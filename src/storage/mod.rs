//! Storage boundary of the import pipeline.
//!
//! Backends only need four capabilities: check for a table, create a table of
//! nullable text columns (plus the identity column), insert one row and select
//! a bounded projection back.

pub mod memory;

use crate::prelude::*;

/// Column values of one record, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `column`, overwriting an existing value in place.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.values.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = value,
            None => self.values.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Relational storage used by the importer.
///
/// `create_table` must fail with `FeedError::TableExists` rather than reuse a
/// table. `insert_row` errors are wrapped by the importer into
/// `FeedError::InsertFailed`.
#[allow(async_fn_in_trait)]
pub trait TableStore {
    async fn table_exists(&self, table: &str) -> FeedResult<bool>;

    async fn create_table(&self, table: &str, columns: &[String]) -> FeedResult<()>;

    async fn insert_row(&self, table: &str, row: &Row) -> FeedResult<()>;

    /// At most `limit` rows of `columns`, in table order.
    async fn select_rows(
        &self,
        table: &str,
        columns: &[String],
        limit: usize,
    ) -> FeedResult<Vec<Vec<Option<String>>>>;
}

/// Double-quoted identifier (PostgreSQL)
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Backtick-quoted identifier (MySQL)
pub fn quote_backtick(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_set_overwrites_in_place() {
        let mut row = Row::new();
        row.set("sku", "A1");
        row.set("price", "1.00");
        row.set("sku", "A2");

        assert_eq!(row.len(), 2);
        assert_eq!(row.get("sku"), Some("A2"));
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["sku", "price"]);
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn test_identifier_quoting() {
        assert_eq!(quote_ident("CategoryName"), "\"CategoryName\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(quote_backtick("a`b"), "`a``b`");
    }
}
