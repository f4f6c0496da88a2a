use crate::coords::{Position, coord, fix_ring, num1};
use crate::extract_style::{extract_icon_href, extract_style};
use crate::geometry::coordinates_text;
use crate::kml::DocumentIndex;
use crate::placemark::feature_id;
use crate::properties::{
    coerce_visibility, extended_data, flat_fields, html_description, merge, time_span, time_stamp,
};
use crate::tree::XmlElement;
use geojson::{Feature, Geometry, JsonObject, Value};

/// Footprint of the overlay: a `gx:LatLonQuad` ring when present,
/// otherwise the (optionally rotated) `LatLonBox`.
pub fn ground_overlay_box<E: XmlElement>(node: &E) -> Option<Geometry> {
    if node.first_by_tag_ns("gx:LatLonQuad").is_some() {
        let ring = fix_ring(coord(&coordinates_text(node)));
        if ring.len() < 4 {
            log::warn!("dropping LatLonQuad with {} position(s)", ring.len());
            return None;
        }
        return Some(Geometry::new(Value::Polygon(vec![ring])));
    }
    lat_lon_box(node)
}

fn lat_lon_box<E: XmlElement>(node: &E) -> Option<Geometry> {
    let latlon = node.first_by_tag("LatLonBox")?;
    let north = num1(latlon, "north")?;
    let south = num1(latlon, "south")?;
    let east = num1(latlon, "east")?;
    let west = num1(latlon, "west")?;

    let mut ring = vec![
        vec![west, north],
        vec![east, north],
        vec![east, south],
        vec![west, south],
        vec![west, north],
    ];
    if let Some(rotation) = num1(latlon, "rotation") {
        ring = rotate_ring(&ring, [west, south, east, north], rotation);
    }
    Some(Geometry::new(Value::Polygon(vec![ring])))
}

/// Rotate every position around the centre of `bbox` by `-rotation` degrees.
fn rotate_ring(ring: &[Position], bbox: [f64; 4], rotation: f64) -> Vec<Position> {
    let center = [(bbox[0] + bbox[2]) / 2.0, (bbox[1] + bbox[3]) / 2.0];
    ring.iter()
        .map(|position| {
            let dx = position[0] - center[0];
            let dy = position[1] - center[1];
            let distance = dx.hypot(dy);
            let angle = dy.atan2(dx) - rotation.to_radians();
            vec![
                center[0] + angle.cos() * distance,
                center[1] + angle.sin() * distance,
            ]
        })
        .collect()
}

pub fn get_ground_overlay<E: XmlElement>(node: &E, index: &DocumentIndex<'_, E>) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("@geometry-type".to_string(), "groundoverlay".into());
    merge(&mut properties, flat_fields(node));
    merge(&mut properties, html_description(node));
    merge(
        &mut properties,
        index.styles.resolve_cascaded_style(node, &index.style),
    );
    merge(&mut properties, extract_style(node, &index.style));
    merge(&mut properties, extract_icon_href(node));
    merge(&mut properties, extended_data(node, &index.schema));
    merge(&mut properties, time_span(node));
    merge(&mut properties, time_stamp(node));
    coerce_visibility(&mut properties);

    Feature {
        bbox: None,
        geometry: ground_overlay_box(node),
        id: feature_id(node),
        properties: Some(properties),
        foreign_members: None,
    }
}
