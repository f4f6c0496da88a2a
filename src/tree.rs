//! Read-only accessors over an element tree.
//!
//! Everything that turns KML into features goes through [`XmlElement`], so
//! any parser that can hand out tag names, attributes and ordered child
//! nodes can drive the conversion. [`crate::document::ElementNode`] is the
//! implementation shipped with the crate.

/// One child of an element, in document order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Child<'a, E> {
    Element(&'a E),
    Text(&'a str),
    CData(&'a str),
}

/// Capability set the converter needs from an element node.
///
/// Implementors provide the four primitives; lookups by tag are derived.
/// Tag names are compared as written in the source, prefix included
/// (`gx:Track` and `Track` are different names). The `*_ns` lookups retry
/// with "any namespace" semantics, matching on the local part only.
pub trait XmlElement: Sized {
    /// Qualified tag name, e.g. `Placemark` or `gx:Track`.
    fn tag_name(&self) -> &str;

    fn attribute(&self, name: &str) -> Option<&str>;

    /// All attributes as written, in document order.
    fn attributes(&self) -> Vec<(&str, &str)>;

    fn child_nodes(&self) -> Vec<Child<'_, Self>>;

    /// Tag name without its namespace prefix.
    fn local_name(&self) -> &str {
        let tag = self.tag_name();
        match tag.split_once(':') {
            Some((_, local)) => local,
            None => tag,
        }
    }

    fn child_elements(&self) -> Vec<&Self> {
        self.child_nodes()
            .into_iter()
            .filter_map(|child| match child {
                Child::Element(element) => Some(element),
                _ => None,
            })
            .collect()
    }

    /// All descendant elements in document order, not including `self`.
    fn descendants(&self) -> Descendants<'_, Self> {
        let mut stack = self.child_elements();
        stack.reverse();
        Descendants { stack }
    }

    /// `self` followed by its descendants, in document order.
    fn descendants_and_self(&self) -> Descendants<'_, Self> {
        Descendants { stack: vec![self] }
    }

    /// First descendant element named `tag`.
    fn first_by_tag(&self, tag: &str) -> Option<&Self> {
        self.descendants().find(|element| element.tag_name() == tag)
    }

    /// Elements named `tag`; direct children only unless `recurse` is set.
    fn all_by_tag(&self, tag: &str, recurse: bool) -> Vec<&Self> {
        if recurse {
            self.descendants()
                .filter(|element| element.tag_name() == tag)
                .collect()
        } else {
            self.child_elements()
                .into_iter()
                .filter(|element| element.tag_name() == tag)
                .collect()
        }
    }

    /// Descendants named `tag`, falling back to any-namespace matching on
    /// the local name when the exact name finds nothing.
    fn all_by_tag_ns(&self, tag: &str) -> Vec<&Self> {
        let exact = self.all_by_tag(tag, true);
        if !exact.is_empty() {
            return exact;
        }
        self.descendants()
            .filter(|element| element.local_name() == tag)
            .collect()
    }

    /// Like [`XmlElement::first_by_tag`], with the any-namespace fallback.
    fn first_by_tag_ns(&self, tag: &str) -> Option<&Self> {
        self.first_by_tag(tag).or_else(|| {
            let local = tag.rsplit(':').next().unwrap_or(tag);
            self.descendants()
                .find(|element| element.local_name() == local)
        })
    }

    /// Concatenated text and CDATA of all descendants. Never trimmed.
    fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text<E: XmlElement>(element: &E, out: &mut String) {
    for child in element.child_nodes() {
        match child {
            Child::Element(inner) => collect_text(inner, out),
            Child::Text(text) | Child::CData(text) => out.push_str(text),
        }
    }
}

/// Text content of an optional node; empty when the node is absent.
pub fn node_val<E: XmlElement>(node: Option<&E>) -> String {
    node.map(E::text_content).unwrap_or_default()
}

/// Pre-order walk over an element subtree.
pub struct Descendants<'a, E> {
    stack: Vec<&'a E>,
}

impl<'a, E: XmlElement> Iterator for Descendants<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        let mut children = next.child_elements();
        children.reverse();
        self.stack.extend(children);
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    const SAMPLE: &str = r#"<kml xmlns:gx="http://www.google.com/kml/ext/2.2">
  <Document>
    <name>outer</name>
    <Placemark id="p1"><name>one</name></Placemark>
    <Folder><Placemark><name>two</name></Placemark></Folder>
    <gx:Track><gx:coord>1 2 3</gx:coord></gx:Track>
  </Document>
</kml>"#;

    #[test]
    fn descendants_are_in_document_order() {
        let doc = Document::parse(SAMPLE).unwrap();
        let names: Vec<String> = doc
            .root()
            .all_by_tag("name", true)
            .into_iter()
            .map(|n| n.text_content())
            .collect();
        assert_eq!(names, vec!["outer", "one", "two"]);
    }

    #[test]
    fn non_recursive_lookup_sees_direct_children_only() {
        let doc = Document::parse(SAMPLE).unwrap();
        let document = doc.root().first_by_tag("Document").unwrap();
        assert_eq!(document.all_by_tag("Placemark", false).len(), 1);
        assert_eq!(document.all_by_tag("Placemark", true).len(), 2);
    }

    #[test]
    fn namespace_fallback_matches_local_name() {
        let doc = Document::parse(SAMPLE).unwrap();
        let root = doc.root();
        assert!(root.first_by_tag("coord").is_none());
        let coords = root.all_by_tag_ns("coord");
        assert_eq!(coords.len(), 1);
        assert_eq!(coords[0].tag_name(), "gx:coord");
        assert_eq!(root.first_by_tag_ns("Track").unwrap().local_name(), "Track");
    }

    #[test]
    fn attributes_and_missing_text() {
        let doc = Document::parse(SAMPLE).unwrap();
        let placemark = doc.root().first_by_tag("Placemark").unwrap();
        assert_eq!(placemark.attribute("id"), Some("p1"));
        assert_eq!(placemark.attribute("name"), None);
        assert_eq!(node_val(placemark.first_by_tag("address")), "");
    }
}
