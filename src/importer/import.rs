use crate::prelude::*;
use crate::helper_funcs::flatten::flatten_record;
use crate::importer::{CancelFlag, FailurePolicy};

/// A record the store did not accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    /// 0-based record index in document order
    pub record: usize,
    pub message: String,
}

/// Outcome of importing a document into a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub attempted: usize,
    pub inserted: usize,
    pub failures: Vec<RowFailure>,
    /// Set when the run stopped on a `CancelFlag` before the last record
    pub cancelled: bool,
}

impl ImportReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Row for one record, mapped onto the discovered `columns`.
///
/// Header mode looks each leaf up by its dotted path; the n-th repeat of a
/// path takes the n-th column discovered for that path. Positional mode takes
/// leaves in order. Leaf values are trimmed and a leaf without a column fails
/// the record.
pub fn build_row(record: &Record, columns: &[Column], use_original_names: bool) -> FeedResult<Row> {
    let leaves = flatten_record(record);
    let mut occurrences: HashMap<&str, usize> = HashMap::new();

    let mut row = Row::new();
    for (idx, leaf) in leaves.iter().enumerate() {
        let column = if use_original_names {
            let seen = occurrences.entry(leaf.path.as_str()).or_insert(0);
            let column = columns
                .iter()
                .filter(|c| c.discovered_name == leaf.path)
                .nth(*seen);
            *seen += 1;
            column
        } else {
            columns.get(idx)
        };

        match column {
            Some(column) => row.set(column.storage_name.clone(), leaf.value.trim()),
            None => {
                return Err(FeedError::InsertFailed {
                    table: String::new(),
                    record: None,
                    message: format!("field '{}' has no column in the table", leaf.path),
                    transient: false,
                })
            }
        }
    }
    Ok(row)
}

fn as_insert_failed(table: &str, record: usize, err: FeedError) -> FeedError {
    match err {
        FeedError::InsertFailed { message, transient, .. } => FeedError::InsertFailed {
            table: table.to_string(),
            record: Some(record),
            message,
            transient,
        },
        other => FeedError::InsertFailed {
            table: table.to_string(),
            record: Some(record),
            transient: other.is_retryable(),
            message: other.detail(),
        },
    }
}

/// Inserts every record of `doc` into `table`, one row at a time.
///
/// Under `FailurePolicy::Abort` the first rejected row ends the import with
/// `FeedError::InsertFailed`; rows inserted before it stay in the table.
pub async fn import_records<S: TableStore>(
    store: &S,
    doc: &Document,
    table: &str,
    columns: &[Column],
    use_original_names: bool,
    policy: FailurePolicy,
    cancel: &CancelFlag,
) -> FeedResult<ImportReport> {
    let mut report = ImportReport::default();

    for (index, record) in doc.records().iter().enumerate() {
        if cancel.is_cancelled() {
            warn!(
                "Import into '{}' cancelled after {} of {} records",
                table,
                report.attempted,
                doc.len()
            );
            report.cancelled = true;
            break;
        }

        report.attempted += 1;
        let outcome = match build_row(record, columns, use_original_names) {
            Ok(row) => store.insert_row(table, &row).await,
            Err(e) => Err(e),
        };

        if let Err(e) = outcome {
            let failure = as_insert_failed(table, index, e);
            error!(
                "Failed to insert record {} into '{}': {}",
                index + 1,
                table,
                failure.detail()
            );

            match policy {
                FailurePolicy::Abort => return Err(failure),
                FailurePolicy::SkipAndContinue => report.failures.push(RowFailure {
                    record: index,
                    message: failure.detail(),
                }),
            }
        } else {
            report.inserted += 1;
        }
    }

    info!(
        "Import into '{}' finished: {} attempted, {} inserted, {} failed",
        table,
        report.attempted,
        report.inserted,
        report.failed()
    );

    Ok(report)
}
