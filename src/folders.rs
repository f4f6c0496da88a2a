//! Folder-preserving conversion. Instead of one flat FeatureCollection the
//! document becomes a tree: a `root` whose children are features and
//! `folder` nodes, each folder holding its own children in document order.
//! `Document` elements are transparent; only `Folder` opens a level.

use crate::ground_overlay::get_ground_overlay;
use crate::kml::{ConvertOptions, DocumentIndex};
use crate::placemark::get_placemark;
use crate::tree::XmlElement;
use geojson::{Feature, JsonObject};
use serde::Serialize;

/// Folder children copied into `meta` as raw text.
pub const FOLDER_FIELDS: [&str; 6] = [
    "name",
    "visibility",
    "open",
    "address",
    "description",
    "phoneNumber",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TreeNode {
    Folder(Folder),
    Feature(Feature),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "type", rename = "folder")]
pub struct Folder {
    pub meta: JsonObject,
    pub children: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "type", rename = "root")]
pub struct FolderTree {
    pub children: Vec<TreeNode>,
}

impl FolderTree {
    /// Features at every depth, in document order.
    pub fn features(&self) -> Vec<&Feature> {
        let mut out = Vec::new();
        collect_features(&self.children, &mut out);
        out
    }
}

fn collect_features<'a>(nodes: &'a [TreeNode], out: &mut Vec<&'a Feature>) {
    for node in nodes {
        match node {
            TreeNode::Feature(feature) => out.push(feature),
            TreeNode::Folder(folder) => collect_features(&folder.children, out),
        }
    }
}

/// `meta` of a folder: the direct children named in [`FOLDER_FIELDS`].
pub fn folder_meta<E: XmlElement>(node: &E) -> JsonObject {
    let mut meta = JsonObject::new();
    for child in node.child_elements() {
        if FOLDER_FIELDS.contains(&child.tag_name()) {
            meta.insert(child.tag_name().to_string(), child.text_content().into());
        }
    }
    meta
}

pub fn kml_with_folders<E: XmlElement>(root: &E, options: &ConvertOptions) -> FolderTree {
    let index = DocumentIndex::build(root, options);
    let mut tree = FolderTree::default();
    traverse(root, &index, options.ground_overlays, &mut tree.children);
    log::debug!("converted {} feature(s) into a folder tree", tree.features().len());
    tree
}

fn traverse<E: XmlElement>(
    node: &E,
    index: &DocumentIndex<'_, E>,
    ground_overlays: bool,
    children: &mut Vec<TreeNode>,
) {
    match node.tag_name() {
        "Placemark" => children.push(TreeNode::Feature(get_placemark(node, index))),
        "GroundOverlay" if ground_overlays => {
            children.push(TreeNode::Feature(get_ground_overlay(node, index)));
        }
        "Folder" => {
            let mut folder = Folder {
                meta: folder_meta(node),
                children: Vec::new(),
            };
            for child in node.child_elements() {
                traverse(child, index, ground_overlays, &mut folder.children);
            }
            children.push(TreeNode::Folder(folder));
            return;
        }
        _ => {}
    }
    for child in node.child_elements() {
        traverse(child, index, ground_overlays, children);
    }
}
