use crate::prelude::*;
use crate::datatypes::document::ParseDiagnostic;

#[derive(Debug)]
pub enum FeedError {
    NotFound {
        location: String,
        reason: String,
    },
    InvalidFormat {
        path: String,
        diagnostics: Vec<ParseDiagnostic>,
    },
    EmptyDocument {
        reason: String,
    },
    InvalidColumnName {
        path: String,
    },
    InvalidTableName {
        name: String,
    },
    TableExists {
        table: String,
    },
    InsertFailed {
        table: String,
        record: Option<usize>,
        message: String,
        transient: bool,
    },
    Storage {
        operation: String,
        message: String,
        transient: bool,
    },
    DataFusion(DataFusionError),
    Io(std::io::Error),
    Custom(String),
}

impl FeedError {
    /// Plain message without the decorated layout, used for log lines
    /// and for wrapping backend errors into `InsertFailed`.
    pub fn detail(&self) -> String {
        match self {
            FeedError::NotFound { location, reason } => format!("{} ({})", reason, location),
            FeedError::InvalidFormat { path, diagnostics } => {
                let joined = diagnostics
                    .iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                format!("invalid XML in {}: {}", path, joined)
            }
            FeedError::EmptyDocument { reason } => reason.clone(),
            FeedError::InvalidColumnName { path } => format!("invalid column name: {}", path),
            FeedError::InvalidTableName { name } => format!("invalid table name: {}", name),
            FeedError::TableExists { table } => format!("table '{}' already exists", table),
            FeedError::InsertFailed { message, .. } => message.clone(),
            FeedError::Storage { message, .. } => message.clone(),
            FeedError::DataFusion(err) => err.to_string(),
            FeedError::Io(err) => err.to_string(),
            FeedError::Custom(msg) => msg.clone(),
        }
    }

    /// True for connection-level storage failures that may succeed on a new attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FeedError::Storage { transient: true, .. } | FeedError::InsertFailed { transient: true, .. }
        )
    }
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::NotFound { location, reason } => write!(
                f,
                "📁 Feed Not Found: {}\n\
                 ❌ Problem: {}\n\
                 💡 Suggestion: Check the path or URL and make sure it is reachable",
                location, reason
            ),
            FeedError::InvalidFormat { path, diagnostics } => {
                let details = if diagnostics.is_empty() {
                    "no diagnostics reported".to_string()
                } else {
                    diagnostics
                        .iter()
                        .map(|d| format!("   • {}", d))
                        .collect::<Vec<_>>()
                        .join("\n")
                };
                write!(
                    f,
                    "📄 Invalid File: {}\n\
                     ❌ Parser diagnostics:\n{}\n\
                     💡 Suggestion: Check that the feed is well-formed XML with a single root element",
                    path, details
                )
            }
            FeedError::EmptyDocument { reason } => write!(
                f,
                "🕳️ Empty Document: {}\n\
                 💡 Suggestion: The root element needs at least one record element with child fields",
                reason
            ),
            FeedError::InvalidColumnName { path } => write!(
                f,
                "🏷️ Invalid column name: {}\n\
                 ❌ Problem: Nothing usable is left after sanitizing the field name\n\
                 💡 Suggestion: Import with positional column names (col_1, col_2, ...)",
                path
            ),
            FeedError::InvalidTableName { name } => write!(
                f,
                "🏷️ Invalid table name: '{}'\n\
                 💡 Suggestion: Use letters, digits and underscores, starting with a letter",
                name
            ),
            FeedError::TableExists { table } => write!(
                f,
                "🛑 Table '{}' already exists.\n\
                 💡 Suggestion: Choose a new table name, existing tables are never altered",
                table
            ),
            FeedError::InsertFailed { table, record, message, .. } => {
                let position = record
                    .map(|r| format!(" (record {})", r + 1))
                    .unwrap_or_default();
                write!(
                    f,
                    "💾 Error inserting data into '{}'{}\n\
                     ❌ Problem: {}\n\
                     💡 Suggestion: Rows inserted before this one stay in the table",
                    table, position, message
                )
            }
            FeedError::Storage { operation, message, .. } => write!(
                f,
                "🗄️ Storage Error during {}\n\
                 ❌ Problem: {}\n\
                 💡 Suggestion: Check the database connection and permissions",
                operation, message
            ),
            FeedError::DataFusion(err) => write!(
                f,
                "⚡ DataFusion Error: {}\n\
                 💡 Suggestion: Check the selected column names",
                err
            ),
            FeedError::Io(err) => write!(
                f,
                "📁 I/O Error: {}\n\
                 💡 Quick fixes to try:\n\
                 1. Check if the file/directory exists\n\
                 2. Verify your permissions\n\
                 3. Ensure the path is correct",
                err
            ),
            FeedError::Custom(err) => write!(f, "💫 {}", err),
        }
    }
}

impl Error for FeedError {}

impl From<DataFusionError> for FeedError {
    fn from(err: DataFusionError) -> Self {
        FeedError::DataFusion(err)
    }
}

impl From<ArrowError> for FeedError {
    fn from(err: ArrowError) -> Self {
        FeedError::Storage {
            operation: "Arrow conversion".to_string(),
            message: err.to_string(),
            transient: false,
        }
    }
}

impl From<std::io::Error> for FeedError {
    fn from(err: std::io::Error) -> Self {
        FeedError::Io(err)
    }
}

pub type FeedResult<T> = Result<T, FeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_strips_decoration() {
        let err = FeedError::TableExists { table: "products".to_string() };
        assert_eq!(err.detail(), "table 'products' already exists");
        assert!(err.to_string().contains("🛑"));
    }

    #[test]
    fn test_insert_failed_reports_one_based_record() {
        let err = FeedError::InsertFailed {
            table: "products".to_string(),
            record: Some(4),
            message: "value too long".to_string(),
            transient: false,
        };
        let shown = err.to_string();
        assert!(shown.contains("(record 5)"));
        assert!(shown.contains("value too long"));
    }

    #[test]
    fn test_retryable_only_for_transient_storage_errors() {
        let transient = FeedError::Storage {
            operation: "insert".to_string(),
            message: "connection reset".to_string(),
            transient: true,
        };
        let structural = FeedError::InsertFailed {
            table: "t".to_string(),
            record: None,
            message: "no such column".to_string(),
            transient: false,
        };
        assert!(transient.is_retryable());
        assert!(!structural.is_retryable());
        assert!(!FeedError::Custom("x".to_string()).is_retryable());
    }

    #[test]
    fn test_invalid_format_lists_diagnostics() {
        let err = FeedError::InvalidFormat {
            path: "feed.xml".to_string(),
            diagnostics: vec![ParseDiagnostic {
                line: 3,
                column: 7,
                message: "Unexpected end of stream".to_string(),
            }],
        };
        assert!(err.to_string().contains("3:7 Unexpected end of stream"));
        assert!(err.detail().starts_with("invalid XML in feed.xml"));
    }
}
