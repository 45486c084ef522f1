//! Import pipeline: load -> discover -> create table -> import -> preview.

pub mod discover;
pub mod import;
pub mod materialize;
pub mod preview;

use crate::prelude::*;
use crate::loaders::feed_loader::FeedLoader;
use crate::loaders::xml_loader::XmlParseConfig;
use std::sync::atomic::{AtomicBool, Ordering};

/// What to do when the store rejects a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Stop at the first rejected row; earlier rows stay in the table
    #[default]
    Abort,
    /// Record the failure in the report and keep going
    SkipAndContinue,
}

/// Shared stop request, checked before each record is inserted.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Settings for one import run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Header mode (sanitized element names) instead of `col_N`
    pub use_original_names: bool,
    pub failure_policy: FailurePolicy,
    pub fetch_timeout_secs: u64,
    pub preview_limit: usize,
    pub display_width: usize,
    pub max_depth: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            use_original_names: true,
            failure_policy: FailurePolicy::Abort,
            fetch_timeout_secs: 30,
            preview_limit: preview::DEFAULT_PREVIEW_LIMIT,
            display_width: preview::DEFAULT_DISPLAY_WIDTH,
            max_depth: XmlParseConfig::default().max_depth,
        }
    }
}

impl ImportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    fn loader(&self) -> FeedLoader {
        FeedLoader::new(
            XmlParseConfig {
                max_depth: self.max_depth,
            },
            self.fetch_timeout(),
        )
    }
}

/// Result of `FeedImporter::run`
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub table: String,
    pub columns: Vec<Column>,
    /// Records in the loaded document
    pub records: usize,
    pub report: ImportReport,
}

/// Runs the import stages against one storage backend.
pub struct FeedImporter<S: TableStore> {
    store: S,
    config: ImportConfig,
    cancel: CancelFlag,
}

impl<S: TableStore> FeedImporter<S> {
    pub fn new(store: S, config: ImportConfig) -> Self {
        Self {
            store,
            config,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub async fn load(&self, location: &str) -> FeedResult<Document> {
        self.config.loader().load(location).await
    }

    pub fn discover(&self, doc: &Document) -> FeedResult<Vec<Column>> {
        discover::discover_columns(doc, self.config.use_original_names)
    }

    pub async fn create_table(&self, table: &str, columns: &[Column]) -> FeedResult<()> {
        materialize::create_table(&self.store, table, columns).await
    }

    /// Inserts every record of `doc` into `table`, whose layout is `columns`.
    pub async fn import(&self, doc: &Document, table: &str, columns: &[Column]) -> FeedResult<ImportReport> {
        import::import_records(
            &self.store,
            doc,
            table,
            columns,
            self.config.use_original_names,
            self.config.failure_policy,
            &self.cancel,
        )
        .await
    }

    /// At most `preview_limit` rows of `columns`
    pub async fn preview(&self, table: &str, columns: &[String]) -> FeedResult<Preview> {
        preview::fetch_preview(&self.store, table, columns, self.config.preview_limit).await
    }

    /// Load, discover, create and import in one go.
    pub async fn run(&self, location: &str, table: &str) -> FeedResult<ImportSummary> {
        materialize::validate_table_name(table)?;

        if let Ok(json) = serde_json::to_string(&self.config) {
            debug!("Import configuration: {}", json);
        }

        let doc = self.load(location).await?;
        let columns = self.discover(&doc)?;
        self.create_table(table, &columns).await?;
        let report = self.import(&doc, table, &columns).await?;

        Ok(ImportSummary {
            table: table.to_string(),
            columns,
            records: doc.len(),
            report,
        })
    }
}
