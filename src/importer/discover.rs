use crate::prelude::*;
use crate::helper_funcs::flatten::{flatten_record, FlatLeaf};
use crate::normalizers::normalize::{positional_name, sanitize_storage_name, ColumnNameResolver};

/// Names flattened leaves the way they become table columns.
///
/// Positional mode numbers them `col_1..col_n`. Header mode sanitizes each
/// path and runs the result through a fresh `ColumnNameResolver`, so the
/// same leaf sequence always yields the same names.
pub fn name_leaves(leaves: &[FlatLeaf<'_>], use_original_names: bool) -> FeedResult<Vec<Column>> {
    if !use_original_names {
        return Ok((0..leaves.len())
            .map(|idx| Column::positional(positional_name(idx)))
            .collect());
    }

    let mut resolver = ColumnNameResolver::new();
    leaves
        .iter()
        .map(|leaf| {
            let base = sanitize_storage_name(&leaf.path)?;
            Ok(Column::new(leaf.path.clone(), resolver.resolve(&base)))
        })
        .collect()
}

/// Derives the table schema from the first record of `doc`.
pub fn discover_columns(doc: &Document, use_original_names: bool) -> FeedResult<Vec<Column>> {
    let template = doc.first_record().ok_or_else(|| FeedError::EmptyDocument {
        reason: format!("<{}> contains no records", doc.root_name()),
    })?;

    let leaves = flatten_record(template);
    if leaves.is_empty() {
        return Err(FeedError::EmptyDocument {
            reason: format!("first record <{}> has no fields", template.name),
        });
    }

    let columns = name_leaves(&leaves, use_original_names)?;

    info!(
        "Discovered {} columns from <{}>: {}",
        columns.len(),
        template.name,
        columns
            .iter()
            .map(|c| c.storage_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    for column in columns.iter().filter(|c| c.discovered_name != c.storage_name) {
        debug!("Column {}", column);
    }

    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::document::Field;
    use crate::normalizers::normalize::is_storage_identifier;

    fn doc_with(records: Vec<Record>) -> Document {
        Document::new("feed", records, Vec::new())
    }

    fn nested_record() -> Record {
        Record::new(
            "item",
            vec![
                Field::leaf("sku", "A1"),
                Field::branch(
                    "images",
                    vec![Field::leaf("url", "a.png"), Field::leaf("alt", "front")],
                ),
                Field::leaf("@lang", "en"),
                Field::leaf("price", "1.00"),
            ],
        )
    }

    #[test]
    fn test_header_mode_depth_first() {
        let columns = discover_columns(&doc_with(vec![nested_record()]), true).unwrap();
        assert_eq!(
            columns,
            vec![
                Column::new("sku", "sku"),
                Column::new("images.url", "url"),
                Column::new("images.alt", "alt"),
                Column::new("price", "price"),
            ]
        );
        assert!(columns.iter().all(|c| is_storage_identifier(&c.storage_name)));
    }

    #[test]
    fn test_positional_mode() {
        let columns = discover_columns(&doc_with(vec![nested_record()]), false).unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.storage_name.as_str()).collect();
        assert_eq!(names, vec!["col_1", "col_2", "col_3", "col_4"]);
        assert!(columns.iter().all(|c| c.discovered_name == c.storage_name));
    }

    #[test]
    fn test_only_first_record_is_inspected() {
        let second = Record::new("item", vec![Field::leaf("other", "x")]);
        let columns = discover_columns(&doc_with(vec![nested_record(), second]), true).unwrap();
        assert_eq!(columns.len(), 4);
    }

    #[test]
    fn test_collisions_get_suffixes() {
        let record = Record::new(
            "item",
            vec![
                Field::branch("brand", vec![Field::leaf("id", "7"), Field::leaf("name", "Acme")]),
                Field::branch("category", vec![Field::leaf("id", "3"), Field::leaf("Name", "Mugs")]),
                Field::leaf("name", "Mug"),
            ],
        );
        let columns = discover_columns(&doc_with(vec![record]), true).unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.storage_name.as_str()).collect();
        assert_eq!(names, vec!["id_2", "name", "id_3", "Name_2", "name_3"]);
    }

    #[test]
    fn test_repeated_siblings_collide_too() {
        let record = Record::new(
            "item",
            vec![Field::leaf("tag", "a"), Field::leaf("tag", "b"), Field::leaf("tag", "c")],
        );
        let columns = discover_columns(&doc_with(vec![record]), true).unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.storage_name.as_str()).collect();
        assert_eq!(names, vec!["tag", "tag_2", "tag_3"]);
    }

    #[test]
    fn test_empty_documents() {
        assert!(matches!(
            discover_columns(&doc_with(Vec::new()), true),
            Err(FeedError::EmptyDocument { .. })
        ));

        let bare = Record::new("item", vec![Field::leaf("@only", "attr")]);
        assert!(matches!(
            discover_columns(&doc_with(vec![bare]), true),
            Err(FeedError::EmptyDocument { .. })
        ));
    }

    #[test]
    fn test_unusable_name_fails_header_mode_only() {
        let record = Record::new("item", vec![Field::leaf("123", "x")]);
        let doc = doc_with(vec![record]);

        match discover_columns(&doc, true) {
            Err(FeedError::InvalidColumnName { path }) => assert_eq!(path, "123"),
            other => panic!("expected InvalidColumnName, got {:?}", other),
        }
        assert_eq!(discover_columns(&doc, false).unwrap().len(), 1);
    }
}
