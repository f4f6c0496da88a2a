//! Owned element tree built from XML text with `quick-xml`.
//!
//! Text and CDATA sections are kept as separate child kinds: an HTML
//! description is recognised by its CDATA child.

use crate::error::{ConvertError, Result};
use crate::tree::{Child, XmlElement};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(ElementNode),
    Text(String),
    CData(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl ElementNode {
    pub fn new(name: &str) -> Self {
        ElementNode {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let mut node = ElementNode::new(&String::from_utf8_lossy(start.name().as_ref()));
        for attr in start.attributes() {
            let attr = attr.map_err(|e| ConvertError::Xml(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| ConvertError::Xml(e.to_string()))?
                .into_owned();
            node.attributes.push((key, value));
        }
        Ok(node)
    }
}

impl XmlElement for ElementNode {
    fn tag_name(&self) -> &str {
        &self.name
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn attributes(&self) -> Vec<(&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect()
    }

    fn child_nodes(&self) -> Vec<Child<'_, Self>> {
        self.children
            .iter()
            .map(|child| match child {
                Node::Element(element) => Child::Element(element),
                Node::Text(text) => Child::Text(text),
                Node::CData(text) => Child::CData(text),
            })
            .collect()
    }
}

/// A parsed XML document. Owns its root element.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: ElementNode,
}

impl Document {
    pub fn parse(content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        let mut stack: Vec<ElementNode> = Vec::new();
        let mut root: Option<ElementNode> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => stack.push(ElementNode::from_start(&e)?),
                Ok(Event::Empty(e)) => {
                    let node = ElementNode::from_start(&e)?;
                    attach(&mut stack, &mut root, node)?;
                }
                Ok(Event::End(_)) => {
                    // end names are checked by the reader
                    if let Some(node) = stack.pop() {
                        attach(&mut stack, &mut root, node)?;
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = match e.unescape() {
                            Ok(text) => text.into_owned(),
                            Err(err) => {
                                log::warn!("keeping raw text after unescape failure: {err}");
                                String::from_utf8_lossy(&e).into_owned()
                            }
                        };
                        parent.children.push(Node::Text(text));
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                        parent.children.push(Node::CData(text));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(ConvertError::Xml(format!(
                        "at position {}: {e}",
                        reader.buffer_position()
                    )));
                }
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(ConvertError::Xml(format!("unclosed element <{}>", open.name)));
        }
        let root = root.ok_or(ConvertError::NoRootElement)?;
        log::trace!("parsed document with root <{}>", root.name);
        Ok(Document { root })
    }

    pub fn root(&self) -> &ElementNode {
        &self.root
    }

    pub fn into_root(self) -> ElementNode {
        self.root
    }
}

fn attach(
    stack: &mut [ElementNode],
    root: &mut Option<ElementNode>,
    node: ElementNode,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(node)),
        None if root.is_none() => *root = Some(node),
        None => {
            return Err(ConvertError::Xml(format!(
                "second root element <{}>",
                node.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_cdata_apart_from_text() {
        let doc = Document::parse(
            "<description>plain <![CDATA[<b>bold</b>]]></description>",
        )
        .unwrap();
        let root = doc.root();
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0], Node::Text("plain ".to_string()));
        assert_eq!(root.children[1], Node::CData("<b>bold</b>".to_string()));
        assert_eq!(root.text_content(), "plain <b>bold</b>");
    }

    #[test]
    fn unescapes_text_and_attributes() {
        let doc = Document::parse(r#"<a href="x&amp;y">1 &lt; 2</a>"#).unwrap();
        assert_eq!(doc.root().attribute("href"), Some("x&y"));
        assert_eq!(doc.root().text_content(), "1 < 2");
    }

    #[test]
    fn empty_elements_become_children() {
        let doc = Document::parse(r#"<IconStyle><hotSpot x="1" y="2"/></IconStyle>"#).unwrap();
        let hotspot = doc.root().first_by_tag("hotSpot").unwrap();
        assert_eq!(hotspot.attribute("y"), Some("2"));
        assert!(hotspot.children.is_empty());
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            Document::parse("<a><b></a>"),
            Err(ConvertError::Xml(_))
        ));
        assert!(matches!(Document::parse("<a>"), Err(ConvertError::Xml(_))));
        assert!(matches!(
            Document::parse("<?xml version=\"1.0\"?>"),
            Err(ConvertError::NoRootElement)
        ));
    }
}
