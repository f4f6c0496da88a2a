use core::fmt;
use geo::{BoundingRect, Coord, Rect};
use geojson::{Bbox, Feature};

/// Lon/lat extent of a set of geometries.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Coord<f64>,
    pub max: Coord<f64>,
}

impl BoundingBox {
    pub fn from_rect(rect: &Rect<f64>) -> Self {
        BoundingBox {
            min: rect.min(),
            max: rect.max(),
        }
    }

    pub fn union(&self, other: &Self) -> Self {
        BoundingBox {
            min: Coord {
                x: self.min.x.min(other.min.x),
                y: self.min.y.min(other.min.y),
            },
            max: Coord {
                x: self.max.x.max(other.max.x),
                y: self.max.y.max(other.max.y),
            },
        }
    }

    /// GeoJSON order: west, south, east, north.
    pub fn to_bbox(&self) -> Bbox {
        vec![self.min.x, self.min.y, self.max.x, self.max.y]
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bbox(min: ({:.5}, {:.5}), max: ({:.5}, {:.5}))",
            self.min.x, self.min.y, self.max.x, self.max.y
        )
    }
}

/// Extent of every feature geometry, ignoring elevation. `None` when no
/// feature has a geometry.
pub fn bounding_box(features: &[Feature]) -> Option<BoundingBox> {
    features
        .iter()
        .filter_map(|feature| feature.geometry.as_ref())
        .filter_map(|geometry| {
            match geo::Geometry::<f64>::try_from(geometry.value.clone()) {
                Ok(geometry) => geometry.bounding_rect(),
                Err(e) => {
                    log::warn!("no extent for geometry: {e}");
                    None
                }
            }
        })
        .map(|rect| BoundingBox::from_rect(&rect))
        .reduce(|acc, next| acc.union(&next))
}

pub fn collection_bbox(features: &[Feature]) -> Option<Bbox> {
    bounding_box(features).map(|bbox| bbox.to_bbox())
}
