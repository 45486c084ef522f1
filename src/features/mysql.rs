use crate::prelude::*;
#[cfg(feature = "mysql")]
use crate::storage::quote_backtick;
#[cfg(feature = "mysql")]
use crate::normalizers::normalize::IDENTITY_COLUMN;
#[cfg(feature = "mysql")]
use mysql_async::{Pool as MySqlPool, OptsBuilder as MySqlOptsBuilder, Conn as MySqlConn, Row as MySqlRow, Value as MySqlValue, Params as MySqlParams, Error as MySqlError};
#[cfg(feature = "mysql")]
use mysql_async::prelude::*;

/// MySQL connection configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MySqlConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for MySqlConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            database: "mysql".to_string(),
        }
    }
}

impl MySqlConfig {
    /// Create a new MySqlConfig with default values
    pub fn new() -> Self {
        Self::default()
    }
}

/// Table store backed by MySQL.
///
/// Tables get a `BIGINT AUTO_INCREMENT` identity and `LONGTEXT NULL` columns.
#[cfg(feature = "mysql")]
pub struct MySqlStore {
    pool: MySqlPool,
}

#[cfg(not(feature = "mysql"))]
pub struct MySqlStore {
}

#[cfg(feature = "mysql")]
impl MySqlStore {
    pub async fn connect(config: MySqlConfig) -> FeedResult<Self> {
        let opts = MySqlOptsBuilder::default()
            .ip_or_hostname(config.host)
            .tcp_port(config.port)
            .user(Some(config.user))
            .pass(Some(config.password))
            .db_name(Some(config.database));

        let store = Self { pool: MySqlPool::new(opts) };
        store.get_conn().await?.ping().await?;
        Ok(store)
    }

    async fn get_conn(&self) -> Result<MySqlConn, MySqlError> {
        self.pool.get_conn().await
    }

    /// Disconnect and close the pool
    pub async fn disconnect(self) -> FeedResult<()> {
        self.pool.disconnect().await?;
        Ok(())
    }
}

#[cfg(not(feature = "mysql"))]
impl MySqlStore {
    /// Connect to MySQL (stub)
    pub async fn connect(_config: MySqlConfig) -> FeedResult<Self> {
        Err(feature_disabled())
    }

    /// Nothing to close (stub)
    pub async fn disconnect(self) -> FeedResult<()> {
        Ok(())
    }
}

#[cfg(not(feature = "mysql"))]
fn feature_disabled() -> FeedError {
    FeedError::Custom("*** Warning ***: MySQL feature not enabled. Add feature = [\"mysql\"] under [dependencies]".to_string())
}

#[cfg(feature = "mysql")]
impl From<MySqlError> for FeedError {
    fn from(err: MySqlError) -> Self {
        let transient = matches!(err, MySqlError::Io(_) | MySqlError::Driver(_));
        FeedError::Storage {
            operation: "MySQL".to_string(),
            message: err.to_string(),
            transient,
        }
    }
}

#[cfg(feature = "mysql")]
fn text_value(value: &str) -> MySqlValue {
    MySqlValue::Bytes(value.as_bytes().to_vec())
}

#[cfg(feature = "mysql")]
pub(crate) fn create_table_sql(table: &str, columns: &[String]) -> String {
    let mut definitions = vec![format!(
        "{} BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY",
        quote_backtick(IDENTITY_COLUMN)
    )];
    definitions.extend(columns.iter().map(|c| format!("{} LONGTEXT NULL", quote_backtick(c))));
    format!("CREATE TABLE {} ({})", quote_backtick(table), definitions.join(", "))
}

#[cfg(feature = "mysql")]
pub(crate) fn insert_sql(table: &str, row: &Row) -> String {
    let columns: Vec<String> = row.columns().map(quote_backtick).collect();
    let placeholders = vec!["?"; row.len()];
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_backtick(table),
        columns.join(", "),
        placeholders.join(", ")
    )
}

#[cfg(feature = "mysql")]
impl TableStore for MySqlStore {
    async fn table_exists(&self, table: &str) -> FeedResult<bool> {
        let mut conn = self.get_conn().await?;
        let count: Option<(i64,)> = conn
            .exec_first(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema = DATABASE() AND table_name = ?",
                MySqlParams::Positional(vec![text_value(table)]),
            )
            .await?;
        Ok(count.map(|(n,)| n > 0).unwrap_or(false))
    }

    async fn create_table(&self, table: &str, columns: &[String]) -> FeedResult<()> {
        if self.table_exists(table).await? {
            return Err(FeedError::TableExists { table: table.to_string() });
        }

        let ddl = create_table_sql(table, columns);
        debug!("{}", ddl);

        let mut conn = self.get_conn().await?;
        match conn.query_drop(ddl).await {
            Ok(()) => Ok(()),
            // ER_TABLE_EXISTS_ERROR
            Err(MySqlError::Server(ref e)) if e.code == 1050 => {
                Err(FeedError::TableExists { table: table.to_string() })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn insert_row(&self, table: &str, row: &Row) -> FeedResult<()> {
        let sql = insert_sql(table, row);
        let params: Vec<MySqlValue> = row.iter().map(|(_, v)| text_value(v)).collect();

        let mut conn = self.get_conn().await?;
        if params.is_empty() {
            conn.query_drop(sql).await?;
        } else {
            conn.exec_drop(sql, MySqlParams::Positional(params)).await?;
        }
        Ok(())
    }

    async fn select_rows(
        &self,
        table: &str,
        columns: &[String],
        limit: usize,
    ) -> FeedResult<Vec<Vec<Option<String>>>> {
        let projection: Vec<String> = columns.iter().map(|c| quote_backtick(c)).collect();
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {} LIMIT {}",
            projection.join(", "),
            quote_backtick(table),
            quote_backtick(IDENTITY_COLUMN),
            limit
        );

        let mut conn = self.get_conn().await?;
        let rows: Vec<MySqlRow> = conn.query(sql).await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut values = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                let value = match row.get_opt::<Option<String>, usize>(idx) {
                    Some(Ok(value)) => value,
                    _ => None,
                };
                values.push(value);
            }
            result.push(values);
        }
        Ok(result)
    }
}

#[cfg(not(feature = "mysql"))]
impl TableStore for MySqlStore {
    async fn table_exists(&self, _table: &str) -> FeedResult<bool> {
        Err(feature_disabled())
    }

    async fn create_table(&self, _table: &str, _columns: &[String]) -> FeedResult<()> {
        Err(feature_disabled())
    }

    async fn insert_row(&self, _table: &str, _row: &Row) -> FeedResult<()> {
        Err(feature_disabled())
    }

    async fn select_rows(
        &self,
        _table: &str,
        _columns: &[String],
        _limit: usize,
    ) -> FeedResult<Vec<Vec<Option<String>>>> {
        Err(feature_disabled())
    }
}
