use crate::prelude::*;
use crate::normalizers::normalize::ATTRIBUTE_MARKER;

/// Value carried by a field: text for elements without child elements,
/// ordered children otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Leaf(String),
    Branch(Vec<Field>),
}

/// One named element inside a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub value: FieldValue,
}

impl Field {
    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            value: FieldValue::Leaf(text.into()),
        }
    }

    pub fn branch(name: impl Into<String>, children: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            value: FieldValue::Branch(children),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.value, FieldValue::Leaf(_))
    }

    /// Attribute-style names never become columns
    pub fn is_attribute(&self) -> bool {
        self.name.starts_with(ATTRIBUTE_MARKER)
    }
}

/// One repeated element under the document root; becomes one table row.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub fields: Vec<Field>,
}

impl Record {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self { name: name.into(), fields }
    }
}

/// Parser message with its 1-based position in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostic {
    pub line: u64,
    pub column: u64,
    pub message: String,
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.line, self.column, self.message)
    }
}

/// Parsed feed. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: String,
    records: Vec<Record>,
    diagnostics: Vec<ParseDiagnostic>,
}

impl Document {
    pub fn new(root: impl Into<String>, records: Vec<Record>, diagnostics: Vec<ParseDiagnostic>) -> Self {
        Self {
            root: root.into(),
            records,
            diagnostics,
        }
    }

    pub fn root_name(&self) -> &str {
        &self.root
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn first_record(&self) -> Option<&Record> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Non-fatal messages collected while parsing
    pub fn diagnostics(&self) -> &[ParseDiagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_kinds() {
        let leaf = Field::leaf("price", "9.99");
        let branch = Field::branch("images", vec![Field::leaf("url", "a.png")]);
        assert!(leaf.is_leaf());
        assert!(!branch.is_leaf());
        assert!(Field::leaf("@id", "7").is_attribute());
        assert!(!leaf.is_attribute());
    }

    #[test]
    fn test_document_accessors() {
        let doc = Document::new(
            "products",
            vec![
                Record::new("product", vec![Field::leaf("sku", "A1")]),
                Record::new("product", vec![Field::leaf("sku", "A2")]),
            ],
            Vec::new(),
        );
        assert_eq!(doc.root_name(), "products");
        assert_eq!(doc.len(), 2);
        assert!(!doc.is_empty());
        assert_eq!(doc.first_record().unwrap().fields[0], Field::leaf("sku", "A1"));
        assert!(doc.diagnostics().is_empty());
    }
}
