//! Imports XML feeds of repeated records into relational tables.
//!
//! The first record of a feed decides the table layout: every leaf element
//! becomes a nullable text column, named after the element (header mode) or
//! numbered `col_1..col_n` (positional mode). The table is created next to an
//! `id` identity column and every record is inserted as one row.
//!
//! ```no_run
//! use feedtable::prelude::*;
//!
//! # async fn demo() -> FeedResult<()> {
//! let importer = FeedImporter::new(MemoryStore::new(), ImportConfig::default());
//! let summary = importer.run("products.xml", "products").await?;
//!
//! let columns = feedtable::importer::preview::default_preview_columns(&summary.columns);
//! let preview = importer.preview("products", &columns).await?;
//! println!("{}", preview.render(importer.config().display_width)?);
//! # Ok(())
//! # }
//! ```

pub mod prelude;
pub mod datatypes;
pub mod features;
pub mod importer;
pub mod loaders;
pub mod normalizers;
pub mod storage;
mod custom_error;
mod helper_funcs;

#[cfg(test)]
mod testing;

pub use custom_error::cust_error::{FeedError, FeedResult};
