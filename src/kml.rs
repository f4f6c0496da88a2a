//! Document driver: index styles and schema once, then turn every Placemark
//! and GroundOverlay into a Feature, lazily and in document order.

use crate::bbox::collection_bbox;
use crate::extract_style::StyleOptions;
use crate::ground_overlay::get_ground_overlay;
use crate::placemark::get_placemark;
use crate::schema::Schema;
use crate::style::{StyleIndexes, build_style_indexes};
use crate::tree::{Descendants, XmlElement};
use geojson::{Feature, FeatureCollection};

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    pub style: StyleOptions,
    /// SimpleData typing; entries override `<SimpleField>` declarations.
    pub schema: Schema,
    pub ground_overlays: bool,
    /// Attach a `bbox` member to the collection.
    pub bbox: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            style: StyleOptions::default(),
            schema: Schema::new(),
            ground_overlays: true,
            bbox: false,
        }
    }
}

/// Everything a single feature needs from the rest of the document.
pub struct DocumentIndex<'a, E> {
    pub styles: StyleIndexes<'a, E>,
    pub schema: Schema,
    pub style: StyleOptions,
}

impl<'a, E: XmlElement> DocumentIndex<'a, E> {
    pub fn build(root: &'a E, options: &ConvertOptions) -> Self {
        let styles = build_style_indexes(root);
        let mut schema = Schema::from_document(root);
        schema.extend(&options.schema);
        DocumentIndex {
            styles,
            schema,
            style: options.style,
        }
    }
}

/// Features of one document. Finite and forward-only; converting again
/// means calling [`kml_features`] again.
pub struct Features<'a, E> {
    index: DocumentIndex<'a, E>,
    cursor: Descendants<'a, E>,
    ground_overlays: bool,
}

impl<'a, E: XmlElement> Features<'a, E> {
    pub fn index(&self) -> &DocumentIndex<'a, E> {
        &self.index
    }
}

impl<'a, E: XmlElement> Iterator for Features<'a, E> {
    type Item = Feature;

    fn next(&mut self) -> Option<Feature> {
        for node in self.cursor.by_ref() {
            match node.tag_name() {
                "Placemark" => {
                    log::trace!("placemark {:?}", node.attribute("id"));
                    return Some(get_placemark(node, &self.index));
                }
                "GroundOverlay" if self.ground_overlays => {
                    log::trace!("ground overlay {:?}", node.attribute("id"));
                    return Some(get_ground_overlay(node, &self.index));
                }
                _ => {}
            }
        }
        None
    }
}

/// Index the document under `root`, then yield its features on demand.
pub fn kml_features<'a, E: XmlElement>(root: &'a E, options: &ConvertOptions) -> Features<'a, E> {
    Features {
        index: DocumentIndex::build(root, options),
        cursor: root.descendants_and_self(),
        ground_overlays: options.ground_overlays,
    }
}

/// All features of the document as a FeatureCollection.
pub fn kml<E: XmlElement>(root: &E, options: &ConvertOptions) -> FeatureCollection {
    let features: Vec<Feature> = kml_features(root, options).collect();
    let bbox = if options.bbox {
        collection_bbox(&features)
    } else {
        None
    };
    log::debug!("converted {} feature(s)", features.len());
    FeatureCollection {
        bbox,
        features,
        foreign_members: None,
    }
}
