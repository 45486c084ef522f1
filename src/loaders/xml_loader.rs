use crate::prelude::*;
use crate::datatypes::document::{Field, FieldValue, ParseDiagnostic};
use std::io::Read;
use xml::common::{Position, TextPosition};
use xml::reader::{ParserConfig, XmlEvent};

/// Configuration for XML parsing behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XmlParseConfig {
    /// Deepest element nesting accepted, root included
    pub max_depth: usize,
}

impl Default for XmlParseConfig {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

/// Element still open while parsing
struct PendingNode {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Field>,
}

impl PendingNode {
    fn into_field(self) -> Field {
        let value = if self.children.is_empty() {
            FieldValue::Leaf(self.text)
        } else {
            FieldValue::Branch(self.children)
        };
        Field {
            name: self.name,
            attributes: self.attributes,
            value,
        }
    }
}

fn diagnostic_at(position: TextPosition, message: impl Into<String>) -> ParseDiagnostic {
    ParseDiagnostic {
        line: position.row + 1,
        column: position.column + 1,
        message: message.into(),
    }
}

fn invalid(source: &str, diagnostics: Vec<ParseDiagnostic>) -> FeedError {
    FeedError::InvalidFormat {
        path: source.to_string(),
        diagnostics,
    }
}

pub fn parse_xml_file(path: &Path, config: &XmlParseConfig) -> FeedResult<Document> {
    let file = File::open(path)?;
    parse_xml_reader(BufReader::new(file), &path.display().to_string(), config)
}

pub fn parse_xml_str(xml: &str, config: &XmlParseConfig) -> FeedResult<Document> {
    parse_xml_reader(xml.as_bytes(), "<memory>", config)
}

/// Builds a `Document` from XML: the root's child elements are the records.
///
/// Element names are local names (namespace prefixes dropped). Non-fatal
/// oddities end up in `Document::diagnostics`; the first parser error ends the
/// parse with `FeedError::InvalidFormat` carrying everything collected so far.
pub fn parse_xml_reader<R: Read>(reader: R, source: &str, config: &XmlParseConfig) -> FeedResult<Document> {
    let mut parser = ParserConfig::new()
        .trim_whitespace(false)
        .whitespace_to_characters(true)
        .cdata_to_characters(true)
        .ignore_comments(true)
        .coalesce_characters(true)
        .create_reader(reader);

    let mut stack: Vec<PendingNode> = Vec::new();
    let mut records: Vec<Record> = Vec::new();
    let mut root: Option<String> = None;
    let mut diagnostics: Vec<ParseDiagnostic> = Vec::new();

    loop {
        let event = match parser.next() {
            Ok(event) => event,
            Err(e) => {
                diagnostics.push(diagnostic_at(e.position(), e.msg()));
                return Err(invalid(source, diagnostics));
            }
        };

        match event {
            XmlEvent::StartElement { name, attributes, .. } => {
                if stack.len() >= config.max_depth {
                    diagnostics.push(diagnostic_at(
                        parser.position(),
                        format!(
                            "element <{}> is nested deeper than {} levels",
                            name.local_name, config.max_depth
                        ),
                    ));
                    return Err(invalid(source, diagnostics));
                }

                stack.push(PendingNode {
                    name: name.local_name,
                    attributes: attributes
                        .into_iter()
                        .map(|a| (a.name.local_name, a.value))
                        .collect(),
                    text: String::new(),
                    children: Vec::new(),
                });
            }
            XmlEvent::EndElement { .. } => {
                let Some(node) = stack.pop() else { continue };
                match stack.len() {
                    0 => root = Some(node.name),
                    1 => {
                        if node.children.is_empty() && !node.text.trim().is_empty() {
                            diagnostics.push(diagnostic_at(
                                parser.position(),
                                format!("record <{}> has text but no child fields", node.name),
                            ));
                        }
                        records.push(Record::new(node.name, node.children));
                    }
                    _ => {
                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(node.into_field());
                        }
                    }
                }
            }
            XmlEvent::Characters(text) | XmlEvent::CData(text) | XmlEvent::Whitespace(text) => {
                if stack.len() == 1 {
                    if !text.trim().is_empty() {
                        diagnostics.push(diagnostic_at(
                            parser.position(),
                            "text directly inside the root element is ignored",
                        ));
                    }
                } else if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text);
                }
            }
            XmlEvent::EndDocument => break,
            _ => {}
        }
    }

    let Some(root) = root else {
        diagnostics.push(diagnostic_at(parser.position(), "no root element found"));
        return Err(invalid(source, diagnostics));
    };

    for diagnostic in &diagnostics {
        warn!("{}: {}", source, diagnostic);
    }

    Ok(Document::new(root, records, diagnostics))
}
