//! Shared styles: indexing `Style`/`StyleMap` once per document and
//! resolving a feature's `styleUrl` against that index.
//!
//! Styles are identified by a short content hash as well as by id. The hash
//! is a 31-multiplier rolling hash over UTF-16 code units, wrapped to a
//! signed 32-bit integer and rendered in base 16 with a leading `-` for
//! negative values. Other tools key cached styles on this exact value, so
//! it must not change.

use crate::extract_style::{StyleOptions, extract_style};
use crate::properties::merge;
use crate::tree::{Child, XmlElement, node_val};
use geojson::{JsonObject, JsonValue};
use std::collections::HashMap;

/// Rolling hash of a string; 0 for the empty string.
pub fn okhash(value: &str) -> i32 {
    value
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Base-16 rendering of a hash, signed.
pub fn hash_hex(hash: i32) -> String {
    if hash < 0 {
        format!("-{:x}", hash.unsigned_abs())
    } else {
        format!("{hash:x}")
    }
}

/// Canonical string of an element: tag name, attribute names and values,
/// then children. Text is trimmed, CDATA is kept as written.
pub fn xml2str<E: XmlElement>(node: &E) -> String {
    let mut out = String::new();
    write_canonical(node, &mut out);
    out
}

fn write_canonical<E: XmlElement>(node: &E, out: &mut String) {
    out.push_str(node.tag_name());
    for (name, value) in node.attributes() {
        out.push_str(name);
        out.push_str(value);
    }
    for child in node.child_nodes() {
        match child {
            Child::Element(element) => write_canonical(element, out),
            Child::Text(text) => out.push_str(text.trim()),
            Child::CData(text) => out.push_str(text),
        }
    }
}

/// Content hash of a style element, as used for `styleHash`.
pub fn style_hash<E: XmlElement>(node: &E) -> String {
    hash_hex(okhash(&xml2str(node)))
}

/// `#`-prefixed form of a style reference.
pub fn normalize_id(id: &str) -> String {
    let id = id.trim();
    if id.starts_with('#') {
        id.to_string()
    } else {
        format!("#{id}")
    }
}

/// `key -> styleUrl` pairs of a StyleMap, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleMapPairs(pub Vec<(String, String)>);

impl StyleMapPairs {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, url)| url.as_str())
    }

    pub fn normal(&self) -> Option<&str> {
        self.get("normal")
    }

    fn to_json(&self) -> JsonValue {
        let mut object = JsonObject::new();
        for (key, url) in &self.0 {
            object.insert(key.clone(), url.clone().into());
        }
        JsonValue::Object(object)
    }
}

/// Lookup tables built in one pass over the document. Read-only afterwards.
#[derive(Debug)]
pub struct StyleIndexes<'a, E> {
    /// `#id` of a Style or StyleMap to its content hash.
    pub style_index: HashMap<String, String>,
    /// `#id` of a StyleMap to its pairs.
    pub style_map_index: HashMap<String, StyleMapPairs>,
    /// Content hash to the Style element.
    pub style_by_hash: HashMap<String, &'a E>,
}

impl<'a, E: XmlElement> StyleIndexes<'a, E> {
    pub fn len(&self) -> usize {
        self.style_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.style_index.is_empty()
    }

    /// Properties contributed by the feature's `styleUrl`.
    ///
    /// The reference is always echoed as `styleUrl`. When it names a
    /// StyleMap, its pairs are exposed as `styleMapHash` and the `normal`
    /// style is followed. A resolved style contributes `styleHash` and its
    /// converted sub-styles.
    pub fn resolve_cascaded_style(&self, node: &E, options: &StyleOptions) -> JsonObject {
        let mut properties = JsonObject::new();
        let Some(url_node) = node.first_by_tag("styleUrl") else {
            return properties;
        };
        let text = url_node.text_content();
        if text.trim().is_empty() {
            return properties;
        }
        let style_url = normalize_id(&text);
        properties.insert("styleUrl".to_string(), style_url.clone().into());

        let mut style_hash = self.style_index.get(&style_url).cloned();
        if let Some(pairs) = self.style_map_index.get(&style_url) {
            properties.insert("styleMapHash".to_string(), pairs.to_json());
            style_hash = pairs
                .normal()
                .and_then(|normal| self.style_index.get(&normalize_id(normal)))
                .cloned();
        }

        let Some(hash) = style_hash else {
            log::warn!("styleUrl {style_url} does not resolve to a style");
            return properties;
        };
        if let Some(style) = self.style_by_hash.get(&hash) {
            merge(&mut properties, extract_style(*style, options));
        }
        properties.insert("styleHash".to_string(), hash.into());
        properties
    }
}

/// Index every Style and StyleMap under `root` (itself included).
pub fn build_style_indexes<E: XmlElement>(root: &E) -> StyleIndexes<'_, E> {
    let mut indexes = StyleIndexes {
        style_index: HashMap::new(),
        style_map_index: HashMap::new(),
        style_by_hash: HashMap::new(),
    };

    for element in root.descendants_and_self() {
        match element.tag_name() {
            "Style" => {
                let hash = style_hash(element);
                if let Some(id) = element.attribute("id") {
                    indexes.style_index.insert(format!("#{id}"), hash.clone());
                }
                indexes.style_by_hash.insert(hash, element);
            }
            "StyleMap" => {
                let Some(id) = element.attribute("id") else {
                    log::debug!("skipping StyleMap without id");
                    continue;
                };
                let key = format!("#{id}");
                indexes.style_index.insert(key.clone(), style_hash(element));
                let pairs = element
                    .all_by_tag("Pair", true)
                    .into_iter()
                    .map(|pair| {
                        (
                            node_val(pair.first_by_tag("key")).trim().to_string(),
                            node_val(pair.first_by_tag("styleUrl")).trim().to_string(),
                        )
                    })
                    .collect();
                indexes.style_map_index.insert(key, StyleMapPairs(pairs));
            }
            _ => {}
        }
    }

    log::debug!(
        "indexed {} style ids, {} style maps, {} distinct styles",
        indexes.style_index.len(),
        indexes.style_map_index.len(),
        indexes.style_by_hash.len()
    );
    indexes
}
