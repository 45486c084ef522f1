use crate::prelude::*;
use datafusion::arrow::datatypes::Field;
use crate::normalizers::normalize::IDENTITY_COLUMN;
use crate::storage::Row;

/// Arrow schema of an imported table: non-null identity plus nullable text columns.
pub fn table_schema(columns: &[String]) -> SchemaRef {
    let mut fields = Vec::with_capacity(columns.len() + 1);
    fields.push(Field::new(IDENTITY_COLUMN, ArrowDataType::Int64, false));
    for column in columns {
        fields.push(Field::new(column.as_str(), ArrowDataType::Utf8, true));
    }
    Arc::new(Schema::new(fields))
}

/// Single-row batch for `row`; columns missing from the row are NULL.
pub fn build_row_batch(schema: &SchemaRef, id: i64, row: &Row) -> FeedResult<RecordBatch> {
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());
    columns.push(Arc::new(Int64Array::from(vec![id])));

    for field in schema.fields().iter().skip(1) {
        let value = row.get(field.name());
        columns.push(Arc::new(StringArray::from(vec![value])));
    }

    RecordBatch::try_new(schema.clone(), columns).map_err(|e| FeedError::Storage {
        operation: "insert".to_string(),
        message: format!("Failed to create RecordBatch: {}", e),
        transient: false,
    })
}

/// Text-only batch with the given headers, used for display.
pub fn build_text_batch(headers: &[String], rows: &[Vec<Option<String>>]) -> FeedResult<RecordBatch> {
    let fields: Vec<Field> = headers
        .iter()
        .map(|h| Field::new(h.as_str(), ArrowDataType::Utf8, true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let columns: Vec<ArrayRef> = (0..headers.len())
        .map(|idx| {
            let values: Vec<Option<&str>> = rows
                .iter()
                .map(|row| row.get(idx).and_then(|v| v.as_deref()))
                .collect();
            Arc::new(StringArray::from(values)) as ArrayRef
        })
        .collect();

    Ok(RecordBatch::try_new(schema, columns)?)
}

/// Flattens batches into rows of optional strings, NULL kept as `None`.
pub fn batches_to_rows(batches: &[RecordBatch]) -> FeedResult<Vec<Vec<Option<String>>>> {
    let mut rows = Vec::new();
    for batch in batches {
        for row_idx in 0..batch.num_rows() {
            let mut row = Vec::with_capacity(batch.num_columns());
            for column in batch.columns() {
                if column.is_null(row_idx) {
                    row.push(None);
                } else {
                    row.push(Some(array_value_to_string(column, row_idx)?));
                }
            }
            rows.push(row);
        }
    }
    Ok(rows)
}
