use std::str;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::XmlError;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    fn from_start(start: &BytesStart) -> Result<Element, XmlError> {
        let name = str::from_utf8(start.name().as_ref())?.to_owned();
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = str::from_utf8(attribute.key.as_ref())?.to_owned();
            attributes.push((key, attribute.unescape_value()?.into_owned()));
        }

        Ok(Element {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Immediate child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First immediate child element with the given tag.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    /// All descendant elements with the given tag, in document order.
    pub fn descendants_named<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for element in self.elements() {
            if element.name == name {
                found.push(element);
            }
            element.collect_named(name, found);
        }
    }

    /// Concatenated text of every descendant text node.
    pub fn inner_text(&self) -> String {
        let mut text = String::new();
        self.push_text(&mut text);
        text
    }

    fn push_text(&self, text: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(value) => text.push_str(value),
                Node::Element(element) => element.push_text(text),
            }
        }
    }
}

/// A parsed response document with exactly one document element. It hangs
/// off an unnamed root so that `descendants_named` also finds it.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Element,
}

impl Document {
    pub fn parse(xml: &str) -> Result<Document, XmlError> {
        let mut reader = Reader::from_str(xml);
        let mut stack = vec![Element::default()];

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(Element::from_start(&start)?),
                Event::Empty(start) => push_node(&mut stack, Node::Element(Element::from_start(&start)?)),
                Event::End(_) => {
                    if stack.len() < 2 {
                        return Err(XmlError::UnexpectedEnd);
                    }
                    if let Some(element) = stack.pop() {
                        push_node(&mut stack, Node::Element(element));
                    }
                },
                Event::Text(text) => {
                    let value = text.unescape()?;
                    // whitespace between elements is not content
                    if value.trim().is_empty() {
                        continue;
                    }
                    if stack.len() < 2 {
                        return Err(XmlError::TextOutsideRoot);
                    }
                    push_node(&mut stack, Node::Text(value.into_owned()));
                },
                Event::CData(data) => {
                    if stack.len() < 2 {
                        return Err(XmlError::TextOutsideRoot);
                    }
                    let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    push_node(&mut stack, Node::Text(value));
                },
                Event::Eof => break,
                _ => {},
            }
        }

        if stack.len() > 1 {
            let name = stack.pop().map(|element| element.name).unwrap_or_default();
            return Err(XmlError::UnclosedElement(name));
        }

        let root = stack.pop().unwrap_or_default();
        let count = root.elements().count();
        if count != 1 {
            return Err(XmlError::NoRootElement(count));
        }

        Ok(Document { root })
    }

    pub fn elements_named(&self, name: &str) -> Vec<&Element> {
        self.root.descendants_named(name)
    }

    pub fn root_element(&self) -> Option<&Element> {
        self.root.elements().next()
    }
}

fn push_node(stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}
