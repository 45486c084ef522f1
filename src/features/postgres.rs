use crate::prelude::*;
#[cfg(feature = "postgres")]
use crate::storage::quote_ident;
#[cfg(feature = "postgres")]
use crate::normalizers::normalize::IDENTITY_COLUMN;
#[cfg(feature = "postgres")]
use tokio_postgres::{Client as PostgresClient, NoTls, Error as PgError};
#[cfg(feature = "postgres")]
use tokio_postgres::error::SqlState;
#[cfg(feature = "postgres")]
use tokio_postgres::types::ToSql;
#[cfg(feature = "postgres")]
use tokio::sync::Mutex as PostgresMutex;

/// PostgreSQL connection configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub pool_size: Option<usize>,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            database: "postgres".to_string(),
            pool_size: Some(2),
        }
    }
}

impl PostgresConfig {
    /// Create a new PostgresConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a connection string from the configuration
    pub fn connection_string(&self) -> String {
        let mut params = Vec::new();

        params.push(format!("host={}", self.host));
        params.push(format!("port={}", self.port));
        params.push(format!("user={}", self.user));
        params.push(format!("dbname={}", self.database));

        if !self.password.is_empty() {
            params.push(format!("password={}", self.password));
        }

        params.join(" ")
    }
}

/// PostgreSQL connection manager with a small client pool
#[cfg(feature = "postgres")]
pub struct PostgresConnection {
    config: PostgresConfig,
    client_pool: Arc<PostgresMutex<Vec<PostgresClient>>>,
}

#[cfg(feature = "postgres")]
impl PostgresConnection {
    pub async fn new(config: PostgresConfig) -> Result<Self, PgError> {
        let pool_size = config.pool_size.unwrap_or(2).max(1);
        let mut clients = Vec::with_capacity(pool_size);

        for _ in 0..pool_size {
            clients.push(Self::connect(&config).await?);
        }

        Ok(Self {
            config,
            client_pool: Arc::new(PostgresMutex::new(clients)),
        })
    }

    async fn connect(config: &PostgresConfig) -> Result<PostgresClient, PgError> {
        let (client, connection) = tokio_postgres::connect(&config.connection_string(), NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("PostgreSQL connection error: {}", e);
            }
        });

        Ok(client)
    }

    /// Get a client from the pool
    async fn get_client(&self) -> Result<PostgresClient, PgError> {
        let mut pool = self.client_pool.lock().await;

        match pool.pop() {
            Some(client) if !client.is_closed() => Ok(client),
            _ => Self::connect(&self.config).await,
        }
    }

    /// Return a client to the pool
    async fn return_client(&self, client: PostgresClient) {
        let mut pool = self.client_pool.lock().await;

        if pool.len() < self.config.pool_size.unwrap_or(2) {
            pool.push(client);
        }
    }

    pub async fn query(&self, query: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<tokio_postgres::Row>, PgError> {
        let client = self.get_client().await?;
        let result = client.query(query, params).await;
        self.return_client(client).await;
        result
    }

    pub async fn execute(&self, query: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64, PgError> {
        let client = self.get_client().await?;
        let result = client.execute(query, params).await;
        self.return_client(client).await;
        result
    }

    /// Check if the connection is valid
    pub async fn ping(&self) -> Result<(), PgError> {
        self.execute("SELECT 1", &[]).await.map(|_| ())
    }
}

/// Table store backed by PostgreSQL.
///
/// Tables get a `BIGSERIAL` identity and `TEXT NULL` columns; identifiers are
/// always quoted so mixed-case feed names survive.
#[cfg(feature = "postgres")]
pub struct PostgresStore {
    conn: PostgresConnection,
}

#[cfg(not(feature = "postgres"))]
pub struct PostgresStore {
}

#[cfg(feature = "postgres")]
impl PostgresStore {
    pub async fn connect(config: PostgresConfig) -> FeedResult<Self> {
        let conn = PostgresConnection::new(config).await?;
        conn.ping().await?;
        Ok(Self { conn })
    }
}

#[cfg(not(feature = "postgres"))]
impl PostgresStore {
    /// Connect to PostgreSQL (stub)
    pub async fn connect(_config: PostgresConfig) -> FeedResult<Self> {
        Err(feature_disabled())
    }
}

#[cfg(not(feature = "postgres"))]
fn feature_disabled() -> FeedError {
    FeedError::Custom("*** Warning ***: Postgres feature not enabled. Add feature = [\"postgres\"] under [dependencies]".to_string())
}

#[cfg(feature = "postgres")]
impl From<PgError> for FeedError {
    fn from(err: PgError) -> Self {
        FeedError::Storage {
            operation: "PostgreSQL".to_string(),
            message: err.to_string(),
            transient: err.is_closed() || err.as_db_error().is_none(),
        }
    }
}

#[cfg(feature = "postgres")]
pub(crate) fn create_table_sql(table: &str, columns: &[String]) -> String {
    let mut definitions = vec![format!("{} BIGSERIAL PRIMARY KEY", quote_ident(IDENTITY_COLUMN))];
    definitions.extend(columns.iter().map(|c| format!("{} TEXT NULL", quote_ident(c))));
    format!("CREATE TABLE {} ({})", quote_ident(table), definitions.join(", "))
}

#[cfg(feature = "postgres")]
pub(crate) fn insert_sql(table: &str, row: &Row) -> String {
    if row.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES", quote_ident(table));
    }
    let columns: Vec<String> = row.columns().map(quote_ident).collect();
    let placeholders: Vec<String> = (1..=row.len()).map(|i| format!("${}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        columns.join(", "),
        placeholders.join(", ")
    )
}

#[cfg(feature = "postgres")]
impl TableStore for PostgresStore {
    async fn table_exists(&self, table: &str) -> FeedResult<bool> {
        let rows = self
            .conn
            .query(
                "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
                 WHERE table_schema = current_schema() AND table_name = $1)",
                &[&table],
            )
            .await?;
        Ok(rows.first().map(|r| r.get::<_, bool>(0)).unwrap_or(false))
    }

    async fn create_table(&self, table: &str, columns: &[String]) -> FeedResult<()> {
        if self.table_exists(table).await? {
            return Err(FeedError::TableExists { table: table.to_string() });
        }

        let ddl = create_table_sql(table, columns);
        debug!("{}", ddl);

        match self.conn.execute(&ddl, &[]).await {
            Ok(_) => Ok(()),
            Err(e) if e.code() == Some(&SqlState::DUPLICATE_TABLE) => {
                Err(FeedError::TableExists { table: table.to_string() })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn insert_row(&self, table: &str, row: &Row) -> FeedResult<()> {
        let sql = insert_sql(table, row);
        let values: Vec<String> = row.iter().map(|(_, v)| v.to_string()).collect();
        let params: Vec<&(dyn ToSql + Sync)> = values.iter().map(|v| v as &(dyn ToSql + Sync)).collect();

        self.conn.execute(&sql, &params).await?;
        Ok(())
    }

    async fn select_rows(
        &self,
        table: &str,
        columns: &[String],
        limit: usize,
    ) -> FeedResult<Vec<Vec<Option<String>>>> {
        let projection: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {} LIMIT $1",
            projection.join(", "),
            quote_ident(table),
            quote_ident(IDENTITY_COLUMN)
        );
        let limit = limit as i64;

        let rows = self.conn.query(&sql, &[&limit]).await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut values = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                let value = match row.try_get::<_, Option<String>>(idx) {
                    Ok(value) => value,
                    // identity column is BIGINT
                    Err(_) => row.try_get::<_, Option<i64>>(idx)?.map(|v| v.to_string()),
                };
                values.push(value);
            }
            result.push(values);
        }
        Ok(result)
    }
}

#[cfg(not(feature = "postgres"))]
impl TableStore for PostgresStore {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_string() {
        let config = PostgresConfig {
            password: "secret".to_string(),
            ..PostgresConfig::default()
        };
        assert_eq!(
            config.connection_string(),
            "host=localhost port=5432 user=postgres dbname=postgres password=secret"
        );
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn test_create_table_sql_quotes_identifiers() {
        let sql = create_table_sql("Feed", &["CategoryName".to_string(), "sku".to_string()]);
        assert_eq!(
            sql,
            "CREATE TABLE \"Feed\" (\"id\" BIGSERIAL PRIMARY KEY, \"CategoryName\" TEXT NULL, \"sku\" TEXT NULL)"
        );
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn test_insert_sql_placeholders() {
        let mut row = Row::new();
        row.set("sku", "A1");
        row.set("price", "1.00");
        assert_eq!(
            insert_sql("feed", &row),
            "INSERT INTO \"feed\" (\"sku\", \"price\") VALUES ($1, $2)"
        );
        assert_eq!(insert_sql("feed", &Row::new()), "INSERT INTO \"feed\" DEFAULT VALUES");
    }

    #[cfg(not(feature = "postgres"))]
    #[tokio::test]
    async fn test_stub_reports_disabled_feature() {
        let err = PostgresStore::connect(PostgresConfig::new()).await.err().unwrap();
        assert!(err.to_string().contains("Postgres feature not enabled"));
    }
}
