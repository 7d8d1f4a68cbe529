//! Parser for XMI documents.
//!
//! The document is streamed with [`quick_xml`] into an arena of [`Element`]s
//! that can then be queried by tag name and attribute filters,
//! the way the builder needs to walk a UML model.

mod vocabulary;

pub use self::vocabulary::*;
use anyhow::{Context, bail};
use indexmap::IndexMap;
use log::{error, info, trace, warn};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::io::{BufRead, Seek};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("unknown or unexpected end tag `{0}`")]
    UnexpectedEndTag(String),
    #[error("open tag `{0}` has not been closed")]
    UnclosedTag(String),
    #[error("document has no root element")]
    Empty,
}

/// Index of an [`Element`] in its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(usize);

/// A node of the XML tree.
#[derive(Debug, Clone)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    fn new(name: String, attributes: Vec<(String, String)>, parent: Option<ElementId>) -> Self {
        Self {
            name,
            attributes,
            parent,
            children: Vec::new(),
        }
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn matches(&self, tag: &str, filters: &[(&str, &str)]) -> bool {
        self.name == tag
            && filters
                .iter()
                .all(|(key, value)| self.attr(key).is_some_and(|v| v == *value))
    }
}

/// An XML document held in memory.
///
/// Element `0` is a virtual root holding the document element,
/// so that the document element itself can be found by [`Document::find_all`].
#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    const ROOT: ElementId = ElementId(0);

    /// Parses the XMI file at the given path.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        info!(target: "parser", "parsing model file '{}'", path.display());
        let mut reader = Reader::from_file(path)
            .with_context(|| format!("failed to create reader from file '{}'", path.display()))?;
        Document::parse(&mut reader).with_context(|| {
            format!(
                "failed to parse model at line {} in '{}'",
                count_lines(reader),
                path.display(),
            )
        })
    }

    /// Builds the element tree from the events of the given reader.
    pub fn parse<R: BufRead>(reader: &mut Reader<R>) -> anyhow::Result<Self> {
        let mut doc = Document {
            elements: vec![Element::new(String::new(), Vec::new(), None)],
        };
        // End tags are matched against the element stack below.
        reader.config_mut().check_end_names = false;
        let mut buf = Vec::new();
        let mut stack = vec![Self::ROOT];
        loop {
            match reader
                .read_event_into(&mut buf)
                .context("failed reading event")?
            {
                Event::Start(tag) => {
                    let tag_name = reader.decoder().decode(tag.name().into_inner())?.into_owned();
                    trace!(target: "parser", "start tag '{tag_name}'");
                    let parent = stack.last().copied().unwrap_or(Self::ROOT);
                    let attributes = attributes(&tag)
                        .with_context(|| format!("failed to parse '{tag_name}' tag attributes"))?;
                    let id = doc.push(tag_name, attributes, parent);
                    stack.push(id);
                }
                Event::End(tag) => {
                    let tag_name = &*reader.decoder().decode(tag.name().into_inner())?;
                    match stack.pop() {
                        Some(id) if id != Self::ROOT && doc.name(id) == tag_name => {
                            trace!(target: "parser", "end tag '{tag_name}'");
                        }
                        _ => {
                            error!(target: "parser", "unknown or unexpected end tag '{tag_name}'");
                            bail!(ParserError::UnexpectedEndTag(tag_name.to_string()));
                        }
                    }
                }
                Event::Empty(tag) => {
                    let tag_name = reader.decoder().decode(tag.name().into_inner())?.into_owned();
                    trace!(target: "parser", "empty tag '{tag_name}'");
                    let parent = stack.last().copied().unwrap_or(Self::ROOT);
                    let attributes = attributes(&tag)
                        .with_context(|| format!("failed to parse '{tag_name}' tag attributes"))?;
                    doc.push(tag_name, attributes, parent);
                }
                // Text content (e.g. documentation) is not part of the model.
                Event::Text(_) | Event::CData(_) => continue,
                // Ignore comments
                Event::Comment(_)
                // Ignore XML declaration
                | Event::Decl(_)
                | Event::PI(_)
                | Event::DocType(_) => continue,
                // exits the loop when reaching end of file
                Event::Eof => {
                    info!(target: "parser", "parsing completed");
                    break;
                }
            }
            // if we don't keep a borrow elsewhere, we can clear the buffer to keep memory usage low
            buf.clear();
        }
        if let Some(id) = stack.pop().filter(|id| *id != Self::ROOT) {
            error!(target: "parser", "unclosed tag '{}'", doc.name(id));
            bail!(ParserError::UnclosedTag(doc.name(id).to_string()));
        }
        if doc.children(Self::ROOT).is_empty() {
            bail!(ParserError::Empty);
        }
        Ok(doc)
    }

    fn push(
        &mut self,
        name: String,
        attributes: Vec<(String, String)>,
        parent: ElementId,
    ) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element::new(name, attributes, Some(parent)));
        self.elements[parent.0].children.push(id);
        id
    }

    fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    /// The virtual root, parent of the document element.
    pub fn root(&self) -> ElementId {
        Self::ROOT
    }

    /// Tag name of an element, e.g. `packagedElement`.
    pub fn name(&self, id: ElementId) -> &str {
        &self.element(id).name
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.element(id).parent
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self.element(id).children
    }

    /// Value of an attribute of the element, if present.
    pub fn attr(&self, id: ElementId, key: &str) -> Option<&str> {
        self.element(id).attr(key)
    }

    /// Like [`Document::attr`], but warns if the attribute is missing.
    pub fn attr_or_warn(&self, id: ElementId, key: &str) -> Option<&str> {
        let value = self.attr(id, key);
        if value.is_none() {
            warn!(target: "parser", "missing '{key}' attribute to '{}'", self.label(id));
        }
        value
    }

    /// Whether the attribute is set to `true`.
    pub fn flag(&self, id: ElementId, key: &str) -> bool {
        self.attr(id, key) == Some(VALUE_TRUE)
    }

    /// Human-readable reference to an element for messages:
    /// its name, or else its id, or else its tag.
    pub fn label(&self, id: ElementId) -> &str {
        self.attr(id, ATTR_NAME)
            .or_else(|| self.attr(id, ATTR_ID))
            .unwrap_or_else(|| self.name(id))
    }

    /// Iterates over the descendants of an element (itself excluded) in document order.
    pub fn descendants(&self, id: ElementId) -> Descendants<'_> {
        let stack = self.children(id).iter().rev().copied().collect();
        Descendants { doc: self, stack }
    }

    /// All descendants with the given tag whose attributes match all the filters.
    pub fn find_all(
        &self,
        scope: ElementId,
        tag: &str,
        filters: &[(&str, &str)],
    ) -> Vec<ElementId> {
        self.descendants(scope)
            .filter(|id| self.element(*id).matches(tag, filters))
            .collect()
    }

    /// First descendant with the given tag whose attributes match all the filters.
    pub fn find_one(
        &self,
        scope: ElementId,
        tag: &str,
        filters: &[(&str, &str)],
    ) -> Option<ElementId> {
        self.descendants(scope)
            .find(|id| self.element(*id).matches(tag, filters))
    }

    /// Like [`Document::find_all`], restricted to direct children.
    pub fn find_children(
        &self,
        scope: ElementId,
        tag: &str,
        filters: &[(&str, &str)],
    ) -> Vec<ElementId> {
        self.children(scope)
            .iter()
            .copied()
            .filter(|id| self.element(*id).matches(tag, filters))
            .collect()
    }

    /// Like [`Document::find_one`], restricted to direct children.
    pub fn find_child(
        &self,
        scope: ElementId,
        tag: &str,
        filters: &[(&str, &str)],
    ) -> Option<ElementId> {
        self.children(scope)
            .iter()
            .copied()
            .find(|id| self.element(*id).matches(tag, filters))
    }

    /// Key/value properties from the `xmi:Extension` blocks attached to the element.
    ///
    /// Properties keep their declaration order; the `uuid` key is dropped.
    pub fn extension_properties(&self, id: ElementId) -> IndexMap<String, String> {
        let mut properties = IndexMap::new();
        for extension in self.find_children(id, TAG_EXTENSION, &[]) {
            for details in self.find_all(extension, TAG_DETAILS, &[]) {
                let Some(key) = self.attr_or_warn(details, ATTR_KEY) else {
                    continue;
                };
                if key == PROP_UUID {
                    continue;
                }
                let value = self.attr(details, ATTR_VALUE).unwrap_or_default();
                properties.insert(key.to_string(), value.to_string());
            }
        }
        properties
    }
}

impl FromStr for Document {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut reader = Reader::from_reader(s.as_bytes());
        Document::parse(&mut reader).with_context(|| {
            format!(
                "failed to parse model at position {}",
                reader.buffer_position()
            )
        })
    }
}

/// Iterator over the descendants of an element, see [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<ElementId>,
}

impl Iterator for Descendants<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}

fn attributes(tag: &BytesStart<'_>) -> anyhow::Result<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    for attr in tag.attributes() {
        let attr = attr?;
        let key = String::from_utf8(attr.key.into_inner().to_vec())?;
        let val = attr
            .unescape_value()
            .with_context(|| format!("failed to unescape value of attribute '{key}'"))?
            .into_owned();
        attrs.push((key, val));
    }
    Ok(attrs)
}

fn count_lines<R: BufRead + Seek>(mut reader: Reader<R>) -> usize {
    let end_pos = reader.buffer_position();
    if reader.get_mut().rewind().is_err() {
        return 0;
    }
    reader.into_inner().take(end_pos).lines().count()
}
