pub use datafusion::prelude::{SessionConfig, SessionContext};
pub use datafusion::error::DataFusionError;
pub use datafusion::datasource::MemTable;

pub use datafusion::arrow::datatypes::{DataType as ArrowDataType, Schema, SchemaRef};
pub use datafusion::arrow::error::ArrowError;
pub use datafusion::arrow::record_batch::RecordBatch;
pub use datafusion::arrow::util::display::array_value_to_string;
pub use datafusion::arrow::util::pretty::pretty_format_batches;
pub use arrow::array::{Array, ArrayRef, Int64Array, StringArray};

pub use regex::Regex;
pub use lazy_static::lazy_static;
pub use log::{debug, error, info, warn};

// JSON and Serialization Imports
pub use serde::{Deserialize, Serialize};

// Standard Library Imports
pub use std::collections::{HashMap, HashSet};
pub use std::sync::Arc;
pub use std::fmt;
pub use std::error::Error;
pub use std::path::{Path, PathBuf};
pub use std::time::Duration;
pub use std::fs::File;
pub use std::io::{BufReader, Write};

pub use crate::{FeedError, FeedResult};
pub use crate::datatypes::column::Column;
pub use crate::datatypes::document::{Document, Record};
pub use crate::storage::{Row, TableStore};
pub use crate::storage::memory::MemoryStore;
pub use crate::features::postgres::{PostgresConfig, PostgresStore};
pub use crate::features::mysql::{MySqlConfig, MySqlStore};
pub use crate::importer::{CancelFlag, FailurePolicy, FeedImporter, ImportConfig, ImportSummary};
pub use crate::importer::import::ImportReport;
pub use crate::importer::preview::Preview;
