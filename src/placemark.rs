use crate::extract_style::extract_style;
use crate::geometry::{GeometriesAndTimes, extract_geometry};
use crate::kml::DocumentIndex;
use crate::properties::{
    coerce_visibility, extended_data, flat_fields, html_description, merge, time_span, time_stamp,
};
use crate::tree::XmlElement;
use geojson::feature::Id;
use geojson::{Feature, Geometry, JsonObject, JsonValue, Value};

/// No geometry is `None`, one is used as is, several are wrapped in a
/// GeometryCollection in the order found.
pub fn geometry_list_to_geometry(mut geometries: Vec<Geometry>) -> Option<Geometry> {
    match geometries.len() {
        0 => None,
        1 => geometries.pop(),
        _ => Some(Geometry::new(Value::GeometryCollection(geometries))),
    }
}

/// `coordinateProperties.times`: the single list when one geometry had
/// times, the list of lists otherwise.
fn coordinate_properties(coord_times: Vec<Vec<String>>) -> JsonObject {
    let mut properties = JsonObject::new();
    if coord_times.is_empty() {
        return properties;
    }
    let times = if coord_times.len() == 1 {
        JsonValue::from(coord_times.into_iter().flatten().collect::<Vec<_>>())
    } else {
        JsonValue::Array(coord_times.into_iter().map(JsonValue::from).collect())
    };
    let mut coordinate_properties = JsonObject::new();
    coordinate_properties.insert("times".to_string(), times);
    properties.insert(
        "coordinateProperties".to_string(),
        JsonValue::Object(coordinate_properties),
    );
    properties
}

/// Non-empty `id` attribute as the feature id.
pub fn feature_id<E: XmlElement>(node: &E) -> Option<Id> {
    node.attribute("id")
        .filter(|id| !id.is_empty())
        .map(|id| Id::String(id.to_string()))
}

pub fn get_placemark<E: XmlElement>(node: &E, index: &DocumentIndex<'_, E>) -> Feature {
    let GeometriesAndTimes {
        geometries,
        coord_times,
    } = extract_geometry(node);

    // later stages win on key collisions
    let mut properties = flat_fields(node);
    merge(&mut properties, html_description(node));
    merge(
        &mut properties,
        index.styles.resolve_cascaded_style(node, &index.style),
    );
    merge(&mut properties, extract_style(node, &index.style));
    merge(&mut properties, extended_data(node, &index.schema));
    merge(&mut properties, time_span(node));
    merge(&mut properties, time_stamp(node));
    merge(&mut properties, coordinate_properties(coord_times));
    coerce_visibility(&mut properties);

    Feature {
        bbox: None,
        geometry: geometry_list_to_geometry(geometries),
        id: feature_id(node),
        properties: Some(properties),
        foreign_members: None,
    }
}
