//! Convert KML documents into GeoJSON FeatureCollections.
//!
//! ```
//! use kml_geojson::{ConvertOptions, convert_str};
//!
//! let kml = "<kml><Placemark><name>A</name>\
//!            <Point><coordinates>1,2</coordinates></Point></Placemark></kml>";
//! let collection = convert_str(kml, &ConvertOptions::default())?;
//! assert_eq!(collection.features.len(), 1);
//! # Ok::<(), kml_geojson::ConvertError>(())
//! ```
//!
//! The conversion itself works on any tree implementing
//! [`tree::XmlElement`]; [`document::Document`] is the bundled parser.

pub mod bbox;
pub mod coords;
pub mod document;
pub mod error;
pub mod extract_style;
pub mod folders;
pub mod geometry;
pub mod ground_overlay;
pub mod kml;
pub mod placemark;
pub mod properties;
pub mod read_kml;
pub mod schema;
pub mod style;
pub mod tree;

pub use error::{ConvertError, Result};
pub use extract_style::{StyleNaming, StyleOptions};
pub use folders::{Folder, FolderTree, TreeNode, kml_with_folders};
pub use kml::{ConvertOptions, Features, kml, kml_features};
pub use read_kml::{
    convert_dir, convert_dir_with_folders, convert_file, convert_file_with_folders, convert_path,
    convert_path_with_folders, convert_str, convert_str_with_folders,
};
pub use schema::{FieldType, Schema};
pub use tree::XmlElement;
