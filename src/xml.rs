//! In-memory XML tree, pretty serializer, and a re-reading checker.
//!
//! Documents are assembled as plain [`Element`] values and only turned into
//! bytes once complete, so structural checks can run on the tree first.
use anyhow::{Context, Result};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(Element),
    Text(String),
    CData(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.push_text(text);
        self
    }

    pub fn with_cdata(mut self, text: &str) -> Self {
        self.push_cdata(text);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    /// Replace an existing attribute or append a new one.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(XmlNode::Element(child));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !text.is_empty() {
            self.children.push(XmlNode::Text(text));
        }
    }

    /// Append character data; `]]>` inside the body is split across sections.
    pub fn push_cdata(&mut self, text: &str) {
        let mut rest = text;
        while let Some(at) = rest.find("]]>") {
            self.children.push(XmlNode::CData(rest[..at + 2].to_string()));
            rest = &rest[at + 2..];
        }
        self.children.push(XmlNode::CData(rest.to_string()));
    }

    pub fn extend(&mut self, children: impl IntoIterator<Item = Element>) {
        self.children.extend(children.into_iter().map(XmlNode::Element));
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |element| element.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    /// All elements below this one named `name`, in document order.
    pub fn descendants_named(&self, name: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        let mut stack: Vec<&Element> = self.elements().collect();
        stack.reverse();
        while let Some(element) = stack.pop() {
            if element.name == name {
                found.push(element);
            }
            let mut nested: Vec<&Element> = element.elements().collect();
            nested.reverse();
            stack.extend(nested);
        }
        found
    }

    /// Direct text and CDATA content, concatenated.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                XmlNode::Text(text) | XmlNode::CData(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }
}

/// Element holding a single text value.
pub fn text_element(name: &str, text: impl Into<String>) -> Element {
    Element::new(name).with_text(text)
}

/// Serialize as UTF-8 with an XML declaration and two-space indentation.
pub fn to_pretty_bytes(root: &Element) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .context("write XML declaration")?;
    write_element(&mut writer, root).with_context(|| format!("write <{}>", root.name))?;
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> quick_xml::Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if element.children.is_empty() {
        return writer.write_event(Event::Empty(start));
    }
    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            XmlNode::Element(nested) => write_element(writer, nested)?,
            XmlNode::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            XmlNode::CData(text) => {
                writer.write_event(Event::CData(BytesCData::new(text.as_str())))?
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))
}

#[derive(Debug, Clone, Error)]
#[error("byte {position}: {message}")]
pub struct XmlError {
    pub position: usize,
    pub message: String,
}

/// A well-formedness problem found after serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XmlDiagnostic {
    pub document: String,
    pub position: usize,
    pub message: String,
}

impl fmt::Display for XmlDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (byte {}): {}", self.document, self.position, self.message)
    }
}

/// Re-read serialized bytes and report the first fatal problem, if any.
pub fn check_well_formed(bytes: &[u8], document: &str) -> Vec<XmlDiagnostic> {
    match parse(bytes) {
        Ok(_) => Vec::new(),
        Err(err) => vec![XmlDiagnostic {
            document: document.to_string(),
            position: err.position,
            message: err.message,
        }],
    }
}

/// Parse a document into a tree. Whitespace-only text is dropped.
pub fn parse(bytes: &[u8]) -> Result<Element, XmlError> {
    let source = std::str::from_utf8(bytes).map_err(|err| XmlError {
        position: err.valid_up_to(),
        message: "document is not valid UTF-8".to_string(),
    })?;
    if let Some((position, ch)) = source.char_indices().find(|(_, ch)| !is_xml_char(*ch)) {
        return Err(XmlError {
            position,
            message: format!("character U+{:04X} is not allowed in XML", u32::from(ch)),
        });
    }
    let mut reader = Reader::from_str(source);
    reader.trim_text(true);
    reader.check_end_names(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    loop {
        let position = reader.buffer_position();
        let fail = |message: String| XmlError { position, message };
        let event = reader.read_event().map_err(|err| fail(err.to_string()))?;
        match event {
            Event::Start(start) => {
                if root.is_some() {
                    return Err(fail("content after the root element".to_string()));
                }
                stack.push(open_element(&start).map_err(|err| fail(err.to_string()))?);
            }
            Event::Empty(start) => {
                let element = open_element(&start).map_err(|err| fail(err.to_string()))?;
                attach(&mut stack, &mut root, element).map_err(fail)?;
            }
            Event::End(_) => {
                let Some(element) = stack.pop() else {
                    return Err(fail("unexpected closing tag".to_string()));
                };
                attach(&mut stack, &mut root, element).map_err(fail)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|err| fail(err.to_string()))?;
                push_content(&mut stack, XmlNode::Text(text.into_owned())).map_err(fail)?;
            }
            Event::CData(data) => {
                let text = lossy(&data.into_inner());
                push_content(&mut stack, XmlNode::CData(text)).map_err(fail)?;
            }
            Event::Eof => {
                if let Some(open) = stack.last() {
                    return Err(fail(format!("unclosed element <{}>", open.name)));
                }
                return root.ok_or_else(|| fail("document has no root element".to_string()));
            }
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) | Event::Comment(_) => {}
        }
    }
}

/// The XML 1.0 `Char` production; the reader does not enforce it.
fn is_xml_char(ch: char) -> bool {
    matches!(
        ch,
        '\u{9}'
            | '\u{A}'
            | '\u{D}'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

fn open_element(start: &BytesStart<'_>) -> quick_xml::Result<Element> {
    let mut element = Element::new(lossy(start.name().as_ref()));
    for attribute in start.attributes() {
        let attribute = attribute?;
        let value = attribute.unescape_value()?;
        element
            .attributes
            .push((lossy(attribute.key.as_ref()), value.into_owned()));
    }
    Ok(element)
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), String> {
    if let Some(parent) = stack.last_mut() {
        parent.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err("multiple root elements".to_string());
    }
    *root = Some(element);
    Ok(())
}

fn push_content(stack: &mut [Element], node: XmlNode) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            Ok(())
        }
        None => Err("text outside the root element".to_string()),
    }
}

#[cfg(test)]
#[path = "xml_tests.rs"]
mod tests;
