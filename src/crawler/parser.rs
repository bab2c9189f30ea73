//! Sitemap XML parsing
//!
//! Builds a small namespace-stripped element tree from a sitemap document and
//! flattens individual entries into ordered field maps.

use crate::model::{FieldMap, FieldValue};
use crate::HarvestError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One element of a parsed sitemap document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    /// Local tag name, without namespace prefix
    pub name: String,

    /// Trimmed text content, if any
    pub text: Option<String>,

    /// Child elements in document order
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    fn open(start: &BytesStart<'_>) -> Self {
        Self {
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            text: None,
            children: Vec::new(),
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match &mut self.text {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Parses a sitemap document into its root element
///
/// # Arguments
///
/// * `url` - URL the document was fetched from, used in error messages
/// * `content` - Raw XML text
///
/// # Returns
///
/// * `Ok(XmlElement)` - The document's root element
/// * `Err(HarvestError::Xml)` - Malformed markup, or no single root element
pub fn parse_document(url: &str, content: &str) -> Result<XmlElement, HarvestError> {
    let xml_error = |message: String| HarvestError::Xml {
        url: url.to_string(),
        message,
    };

    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            xml_error(format!(
                "{} at position {}",
                e,
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(ref e) => {
                if stack.is_empty() && root.is_some() {
                    return Err(xml_error("multiple root elements".to_string()));
                }
                stack.push(XmlElement::open(e));
            }
            Event::Empty(ref e) => {
                let element = XmlElement::open(e);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None if root.is_none() => root = Some(element),
                    None => return Err(xml_error("multiple root elements".to_string())),
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| xml_error("unexpected closing tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Text(ref e) => {
                let text = e.unescape().map_err(|e| xml_error(e.to_string()))?;
                if let Some(current) = stack.last_mut() {
                    current.push_text(text.trim());
                }
            }
            Event::CData(e) => {
                let raw = e.into_inner();
                if let Some(current) = stack.last_mut() {
                    current.push_text(String::from_utf8_lossy(&raw).trim());
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctypes
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(xml_error(format!("unclosed element <{}>", open.name)));
    }

    root.ok_or_else(|| xml_error("document has no root element".to_string()))
}

/// Flattens the descendants of an entry into an ordered field map
///
/// Non-leaf children become nested maps, leaf children with text become
/// strings, empty leaves are dropped. A repeated tag keeps its first position
/// and its last value.
pub fn flatten_fields(element: &XmlElement) -> FieldMap {
    let mut fields = FieldMap::new();

    for child in &element.children {
        if !child.is_leaf() {
            fields.insert(child.name.clone(), FieldValue::Map(flatten_fields(child)));
        } else if let Some(text) = &child.text {
            fields.insert(child.name.clone(), FieldValue::Text(text.clone()));
        }
    }

    fields
}
