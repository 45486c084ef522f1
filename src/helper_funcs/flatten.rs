use crate::datatypes::document::{Field, FieldValue, Record};
use crate::normalizers::normalize::join_path;

/// A leaf reached while walking a record depth-first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatLeaf<'a> {
    /// Dotted path from the record root
    pub path: String,
    /// Raw text, untrimmed
    pub value: &'a str,
}

/// Every leaf of the record in document order; attributes are skipped.
pub fn flatten_record(record: &Record) -> Vec<FlatLeaf<'_>> {
    let mut leaves = Vec::new();
    flatten_fields(&record.fields, None, &mut leaves);
    leaves
}

fn flatten_fields<'a>(fields: &'a [Field], prefix: Option<&str>, out: &mut Vec<FlatLeaf<'a>>) {
    for field in fields.iter().filter(|f| !f.is_attribute()) {
        let path = join_path(prefix, &field.name);
        match &field.value {
            FieldValue::Leaf(text) => out.push(FlatLeaf {
                path,
                value: text,
            }),
            FieldValue::Branch(children) => flatten_fields(children, Some(&path), out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Record {
        Record::new(
            "product",
            vec![
                Field::leaf("sku", "A1"),
                Field::branch(
                    "images",
                    vec![Field::branch(
                        "image",
                        vec![Field::leaf("url", " a.png "), Field::leaf("alt", "front")],
                    )],
                ),
                Field::leaf("@lang", "en"),
                Field::leaf("price", "9.99"),
            ],
        )
    }

    #[test]
    fn test_flatten_depth_first_paths() {
        let record = product();
        let leaves = flatten_record(&record);
        let paths: Vec<&str> = leaves.iter().map(|l| l.path.as_str()).collect();
        assert_eq!(paths, vec!["sku", "images.image.url", "images.image.alt", "price"]);
    }

    #[test]
    fn test_flatten_keeps_raw_values() {
        let record = product();
        let leaves = flatten_record(&record);
        assert_eq!(leaves[1].path, "images.image.url");
        assert_eq!(leaves[1].value, " a.png ");
    }

    #[test]
    fn test_flatten_empty_branch_yields_nothing() {
        let record = Record::new("r", vec![Field::branch("empty", Vec::new())]);
        assert!(flatten_record(&record).is_empty());
    }
}
