use crate::prelude::*;
use crate::importer::preview::default_preview_columns;
use crate::datatypes::column::storage_names;

const FEED_COLUMNS: [&str; 18] = [
    "entity_id",
    "CategoryName",
    "sku",
    "name",
    "description",
    "shortdesc",
    "price",
    "link",
    "image",
    "Brand",
    "Rating",
    "CaffeineType",
    "Count",
    "Flavored",
    "Seasonal",
    "Instock",
    "Facebook",
    "IsKCup",
];

fn fixture(name: &str) -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("files")
        .join(name)
        .display()
        .to_string()
}

fn importer(config: ImportConfig) -> FeedImporter<MemoryStore> {
    FeedImporter::new(MemoryStore::new(), config)
}

fn positional_config() -> ImportConfig {
    ImportConfig {
        use_original_names: false,
        ..ImportConfig::default()
    }
}

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let importer = importer(ImportConfig::default());
    let err = importer.load("invalid/path").await.unwrap_err();
    assert!(matches!(err, FeedError::NotFound { .. }));
}

#[tokio::test]
async fn test_invalid_file_is_invalid_format() {
    let importer = importer(ImportConfig::default());
    match importer.load(&fixture("invalid.xml")).await.unwrap_err() {
        FeedError::InvalidFormat { diagnostics, .. } => {
            assert!(!diagnostics.is_empty());
            assert_eq!(diagnostics[0].line, 9);
        }
        other => panic!("expected InvalidFormat, got {:?}", other),
    }
}

#[tokio::test]
async fn test_discovers_header_columns() {
    let importer = importer(ImportConfig::default());
    let doc = importer.load(&fixture("feed.xml")).await.unwrap();
    let columns = importer.discover(&doc).unwrap();

    assert_eq!(storage_names(&columns), FEED_COLUMNS);
    assert!(columns.iter().all(|c| c.discovered_name == c.storage_name));
}

#[tokio::test]
async fn test_discovers_positional_columns() {
    let importer = importer(positional_config());
    let doc = importer.load(&fixture("feed.xml")).await.unwrap();
    let columns = importer.discover(&doc).unwrap();

    let expected: Vec<String> = (1..=18).map(|i| format!("col_{}", i)).collect();
    assert_eq!(storage_names(&columns), expected);
}

#[tokio::test]
async fn test_creates_table_with_header_columns() {
    let importer = importer(ImportConfig::default());
    let doc = importer.load(&fixture("feed.xml")).await.unwrap();
    let columns = importer.discover(&doc).unwrap();
    importer.create_table("test_xml_data", &columns).await.unwrap();

    let schema = importer.store().table_schema("test_xml_data").unwrap();
    assert_eq!(schema.fields().len(), 19);
    assert_eq!(schema.field(0).name(), "id");
    assert_eq!(schema.field(0).data_type(), &ArrowDataType::Int64);
    for (field, expected) in schema.fields().iter().skip(1).zip(FEED_COLUMNS) {
        assert_eq!(field.name(), expected);
        assert_eq!(field.data_type(), &ArrowDataType::Utf8);
        assert!(field.is_nullable());
    }
}

#[tokio::test]
async fn test_creates_table_with_positional_columns() {
    let importer = importer(positional_config());
    let doc = importer.load(&fixture("feed.xml")).await.unwrap();
    let columns = importer.discover(&doc).unwrap();
    importer.create_table("test_xml_data", &columns).await.unwrap();

    let schema = importer.store().table_schema("test_xml_data").unwrap();
    let names: Vec<String> = schema.fields().iter().map(|f| f.name().to_string()).collect();
    let mut expected = vec!["id".to_string()];
    expected.extend((1..=18).map(|i| format!("col_{}", i)));
    assert_eq!(names, expected);
}

#[tokio::test]
async fn test_imports_all_records() {
    let importer = importer(ImportConfig::default());
    let summary = importer.run(&fixture("feed.xml"), "test_xml_data").await.unwrap();

    assert_eq!(summary.records, 3);
    assert_eq!(summary.report.inserted, 3);
    assert_eq!(summary.report.failed(), 0);
    assert_eq!(importer.store().row_count("test_xml_data").unwrap(), 3);

    let preview = importer
        .preview("test_xml_data", &["sku".to_string(), "name".to_string(), "image".to_string()])
        .await
        .unwrap();
    assert_eq!(
        preview.rows,
        vec![
            vec![
                Some("20".to_string()),
                Some("Jet Fuel".to_string()),
                Some("http://mcdn.coffeeforless.com/media/catalog/product/images/uploads/intro/frac_box.jpg".to_string()),
            ],
            vec![
                Some("21".to_string()),
                Some("Breakfast Blend".to_string()),
                Some("http://mcdn.coffeeforless.com/media/catalog/product/images/uploads/intro/breakfast.jpg".to_string()),
            ],
            vec![Some("22".to_string()), Some("Chai Latte".to_string()), Some(String::new())],
        ]
    );
}

#[tokio::test]
async fn test_imports_all_records_positionally() {
    let importer = importer(positional_config());
    let summary = importer.run(&fixture("feed.xml"), "positional_data").await.unwrap();
    assert_eq!(summary.report.inserted, 3);

    let preview = importer
        .preview("positional_data", &["col_1".to_string(), "col_18".to_string()])
        .await
        .unwrap();
    assert_eq!(preview.rows[2], vec![Some("342".to_string()), Some("1".to_string())]);
}

#[tokio::test]
async fn test_existing_table_is_never_reused() {
    let importer = importer(ImportConfig::default());
    let first = vec![Column::new("random_col_1", "random_col_1"), Column::new("random_col_2", "random_col_2")];
    let second = vec![Column::new("random_col_3", "random_col_3")];

    importer.create_table("test_table", &first).await.unwrap();
    let err = importer.create_table("test_table", &second).await.unwrap_err();
    assert!(matches!(err, FeedError::TableExists { .. }));

    let err = importer.run(&fixture("feed.xml"), "test_table").await.unwrap_err();
    assert!(matches!(err, FeedError::TableExists { .. }));
    assert_eq!(importer.store().row_count("test_table").unwrap(), 0);
}

#[tokio::test]
async fn test_nested_feed_resolves_collisions() {
    let importer = importer(ImportConfig::default());
    let summary = importer.run(&fixture("nested.xml"), "products").await.unwrap();

    let discovered: Vec<&str> = summary.columns.iter().map(|c| c.discovered_name.as_str()).collect();
    assert_eq!(
        discovered,
        vec!["id", "title", "brand.id", "brand.name", "category.id", "category.Name", "images.image.url"]
    );
    assert_eq!(
        storage_names(&summary.columns),
        vec!["id_2", "title", "id_3", "name", "id_4", "Name_2", "url"]
    );
    assert_eq!(summary.report.inserted, 2);

    let preview = importer
        .preview("products", &["id".to_string(), "id_2".to_string(), "title".to_string(), "url".to_string()])
        .await
        .unwrap();
    assert_eq!(
        preview.rows[0],
        vec![
            Some("1".to_string()),
            Some("1001".to_string()),
            Some("Ceramic Mug".to_string()),
            Some("https://cdn.example.com/a1-front.png".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_optional_and_reordered_leaves_stay_in_their_columns() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("optional.xml");
    std::fs::write(
        &path,
        "<catalog>\
           <item><name>Mug</name><brand><name>Acme</name></brand></item>\
           <item><brand><name>Globex</name></brand></item>\
           <item><brand><name>Initech</name></brand><name>Hose</name></item>\
         </catalog>",
    )
    .unwrap();

    let importer = importer(ImportConfig::default());
    let summary = importer.run(&path.display().to_string(), "optional").await.unwrap();
    assert_eq!(storage_names(&summary.columns), vec!["name", "name_2"]);
    assert_eq!(summary.report.inserted, 3);

    let preview = importer
        .preview("optional", &["name".to_string(), "name_2".to_string()])
        .await
        .unwrap();
    assert_eq!(
        preview.rows,
        vec![
            vec![Some("Mug".to_string()), Some("Acme".to_string())],
            vec![None, Some("Globex".to_string())],
            vec![Some("Hose".to_string()), Some("Initech".to_string())],
        ]
    );
}

#[tokio::test]
async fn test_skip_failed_rows_keeps_importing() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("ragged.xml");
    std::fs::write(
        &path,
        "<feed>\
           <item><sku>A1</sku><price>1</price></item>\
           <item><sku>A2</sku><colour>red</colour></item>\
           <item><sku>A3</sku><price>3</price></item>\
         </feed>",
    )
    .unwrap();
    let location = path.display().to_string();

    let skipping = importer(ImportConfig {
        failure_policy: FailurePolicy::SkipAndContinue,
        ..ImportConfig::default()
    });
    let summary = skipping.run(&location, "ragged").await.unwrap();
    assert_eq!(summary.report.inserted, 2);
    assert_eq!(summary.report.failures.len(), 1);
    assert_eq!(summary.report.failures[0].record, 1);

    let aborting = importer(ImportConfig::default());
    let err = aborting.run(&location, "ragged").await.unwrap_err();
    assert!(matches!(err, FeedError::InsertFailed { record: Some(1), .. }));
    assert_eq!(aborting.store().row_count("ragged").unwrap(), 1);
}

#[tokio::test]
async fn test_empty_feed_creates_nothing() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("empty.xml");
    std::fs::write(&path, "<catalog>\n</catalog>\n").unwrap();

    let importer = importer(ImportConfig::default());
    let err = importer.run(&path.display().to_string(), "empty").await.unwrap_err();
    assert!(matches!(err, FeedError::EmptyDocument { .. }));
    assert!(!importer.store().table_exists("empty").await.unwrap());
}

#[tokio::test]
async fn test_invalid_table_name_fails_before_loading() {
    let importer = importer(ImportConfig::default());
    let err = importer.run("invalid/path", "1st table").await.unwrap_err();
    assert!(matches!(err, FeedError::InvalidTableName { .. }));
}

#[tokio::test]
async fn test_default_preview_renders_truncated() {
    let importer = importer(ImportConfig::default());
    let summary = importer.run(&fixture("feed.xml"), "test_xml_data").await.unwrap();

    let columns = default_preview_columns(&summary.columns);
    assert_eq!(columns, vec!["entity_id", "CategoryName", "sku"]);

    let preview = importer.preview("test_xml_data", &columns).await.unwrap();
    let rendered = preview.render(importer.config().display_width).unwrap();

    assert!(rendered.contains("Green Mountain Groun..."));
    assert!(!rendered.contains("Green Mountain Ground Coffee"));
    assert_eq!(preview.rows[0][1].as_deref(), Some("Green Mountain Ground Coffee"));
}

#[tokio::test]
async fn test_preview_limit_applies() {
    let importer = importer(ImportConfig {
        preview_limit: 2,
        ..ImportConfig::default()
    });
    importer.run(&fixture("feed.xml"), "limited").await.unwrap();

    let preview = importer.preview("limited", &["sku".to_string()]).await.unwrap();
    assert_eq!(preview.len(), 2);
}
