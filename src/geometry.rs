//! Geometry extraction from the children of a Placemark.

use crate::coords::{Position, coord, coord1, fix_ring, parse_float};
use crate::tree::{XmlElement, node_val};
use geojson::{Geometry, Value};

/// Geometry-bearing tags. Anything else is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryTag {
    Point,
    LineString,
    Polygon,
    /// `Track`, `gx:Track`
    Track,
    /// `MultiGeometry`, `MultiTrack`, `gx:MultiTrack`
    Multi,
}

impl GeometryTag {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Point" => Some(GeometryTag::Point),
            "LineString" => Some(GeometryTag::LineString),
            "Polygon" => Some(GeometryTag::Polygon),
            "MultiGeometry" => Some(GeometryTag::Multi),
            _ => match tag.rsplit(':').next() {
                Some("Track") => Some(GeometryTag::Track),
                Some("MultiTrack") => Some(GeometryTag::Multi),
                _ => None,
            },
        }
    }
}

/// Geometries found under a node, plus one timestamp list for every track
/// that carried `when` values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometriesAndTimes {
    pub geometries: Vec<Geometry>,
    pub coord_times: Vec<Vec<String>>,
}

impl GeometriesAndTimes {
    fn append(&mut self, mut other: GeometriesAndTimes) {
        self.geometries.append(&mut other.geometries);
        self.coord_times.append(&mut other.coord_times);
    }
}

/// Walk the direct children of `node`, descending only into Multi*
/// containers.
pub fn extract_geometry<E: XmlElement>(node: &E) -> GeometriesAndTimes {
    let mut out = GeometriesAndTimes::default();

    for child in node.child_elements() {
        let Some(tag) = GeometryTag::from_tag(child.tag_name()) else {
            continue;
        };
        match tag {
            GeometryTag::Multi => out.append(extract_geometry(child)),
            GeometryTag::Point => {
                if let Some(geometry) = point(child) {
                    out.geometries.push(geometry);
                }
            }
            GeometryTag::LineString => {
                if let Some(geometry) = line_string(child) {
                    out.geometries.push(geometry);
                }
            }
            GeometryTag::Polygon => {
                if let Some(geometry) = polygon(child) {
                    out.geometries.push(geometry);
                }
            }
            GeometryTag::Track => {
                if let Some((geometry, times)) = track(child) {
                    out.geometries.push(geometry);
                    if !times.is_empty() {
                        out.coord_times.push(times);
                    }
                }
            }
        }
    }

    out
}

pub fn coordinates_text<E: XmlElement>(node: &E) -> String {
    node_val(node.first_by_tag("coordinates"))
}

fn point<E: XmlElement>(node: &E) -> Option<Geometry> {
    let position = coord1(&coordinates_text(node));
    if position.len() < 2 {
        log::debug!("dropping Point without two numeric components");
        return None;
    }
    Some(Geometry::new(Value::Point(position)))
}

fn line_string<E: XmlElement>(node: &E) -> Option<Geometry> {
    let positions = coord(&coordinates_text(node));
    if positions.len() < 2 {
        log::debug!("dropping LineString with {} position(s)", positions.len());
        return None;
    }
    Some(Geometry::new(Value::LineString(positions)))
}

fn polygon<E: XmlElement>(node: &E) -> Option<Geometry> {
    let rings: Vec<Vec<Position>> = node
        .all_by_tag("LinearRing", true)
        .into_iter()
        .map(|ring| fix_ring(coord(&coordinates_text(ring))))
        .filter(|ring| {
            let keep = ring.len() >= 4;
            if !keep {
                log::debug!("dropping ring with {} position(s)", ring.len());
            }
            keep
        })
        .collect();
    if rings.is_empty() {
        log::warn!("dropping Polygon without a usable ring");
        return None;
    }
    Some(Geometry::new(Value::Polygon(rings)))
}

/// `coord`/`when` pairs of a track. The number of `coord` elements picks
/// the shape: more than two is a LineString, otherwise a Point at the first
/// position. A `coord` without two numeric components is dropped together
/// with the `when` at the same index.
fn track<E: XmlElement>(node: &E) -> Option<(Geometry, Vec<String>)> {
    let coords = node.all_by_tag_ns("coord");
    let mut times: Vec<Option<String>> = node
        .all_by_tag_ns("when")
        .into_iter()
        .map(|elem| Some(elem.text_content()))
        .collect();

    let mut positions = Vec::with_capacity(coords.len());
    for (i, elem) in coords.iter().enumerate() {
        let position: Position = elem
            .text_content()
            .split(' ')
            .filter_map(parse_float)
            .collect();
        if position.len() >= 2 {
            positions.push(position);
        } else {
            log::debug!("dropping track position {i} without two numeric components");
            if let Some(time) = times.get_mut(i) {
                *time = None;
            }
        }
    }
    let times: Vec<String> = times.into_iter().flatten().collect();

    let value = if coords.len() > 2 && positions.len() >= 2 {
        Value::LineString(positions)
    } else {
        Value::Point(positions.into_iter().next()?)
    };
    Some((Geometry::new(value), times))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn extract(xml: &str) -> GeometriesAndTimes {
        let doc = Document::parse(xml).unwrap();
        extract_geometry(doc.root())
    }

    #[test]
    fn dispatch_table() {
        assert_eq!(GeometryTag::from_tag("gx:Track"), Some(GeometryTag::Track));
        assert_eq!(GeometryTag::from_tag("Track"), Some(GeometryTag::Track));
        assert_eq!(GeometryTag::from_tag("gx:MultiTrack"), Some(GeometryTag::Multi));
        assert_eq!(GeometryTag::from_tag("Model"), None);
    }

    #[test]
    fn point_and_line() {
        let out = extract(
            "<Placemark>
               <Point><coordinates>1,2,3</coordinates></Point>
               <LineString><coordinates>0,0 1,1 2,2</coordinates></LineString>
             </Placemark>",
        );
        assert_eq!(out.geometries.len(), 2);
        assert_eq!(out.geometries[0].value, Value::Point(vec![1.0, 2.0, 3.0]));
        assert_eq!(
            out.geometries[1].value,
            Value::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![2.0, 2.0]])
        );
        assert!(out.coord_times.is_empty());
    }

    #[test]
    fn invalid_point_and_short_line_are_dropped() {
        let out = extract(
            "<Placemark>
               <Point><coordinates>abc</coordinates></Point>
               <LineString><coordinates>0,0 bad</coordinates></LineString>
             </Placemark>",
        );
        assert!(out.geometries.is_empty());
    }

    #[test]
    fn polygon_rings_are_closed_and_short_rings_dropped() {
        let out = extract(
            "<Placemark><Polygon>
               <outerBoundaryIs><LinearRing><coordinates>0,0 1,0 1,1</coordinates></LinearRing></outerBoundaryIs>
               <innerBoundaryIs><LinearRing><coordinates>0,0 1,0</coordinates></LinearRing></innerBoundaryIs>
             </Polygon></Placemark>",
        );
        assert_eq!(
            out.geometries[0].value,
            Value::Polygon(vec![vec![
                vec![0.0, 0.0],
                vec![1.0, 0.0],
                vec![1.0, 1.0],
                vec![0.0, 0.0]
            ]])
        );
    }

    #[test]
    fn polygon_with_only_short_rings_yields_nothing() {
        let out = extract(
            "<Placemark><Polygon><outerBoundaryIs><LinearRing>
               <coordinates>0,0 1,0 0,0</coordinates>
             </LinearRing></outerBoundaryIs></Polygon></Placemark>",
        );
        assert!(out.geometries.is_empty());
    }

    #[test]
    fn track_with_two_positions_is_a_point() {
        let out = extract(
            "<Placemark><gx:Track>
               <when>2020-01-01T00:00:00Z</when><when>2020-01-01T00:01:00Z</when>
               <gx:coord>1 2 3</gx:coord><gx:coord>4 5 6</gx:coord>
             </gx:Track></Placemark>",
        );
        assert_eq!(out.geometries.len(), 1);
        assert_eq!(out.geometries[0].value, Value::Point(vec![1.0, 2.0, 3.0]));
        assert_eq!(
            out.coord_times,
            vec![vec!["2020-01-01T00:00:00Z", "2020-01-01T00:01:00Z"]]
        );
    }

    #[test]
    fn track_with_three_positions_is_a_line() {
        let out = extract(
            "<Placemark><Track>
               <coord>1 2</coord><coord>3 4</coord><coord>5 6</coord>
             </Track></Placemark>",
        );
        assert_eq!(
            out.geometries[0].value,
            Value::LineString(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]])
        );
        assert!(out.coord_times.is_empty());
    }

    #[test]
    fn bad_track_position_drops_its_time() {
        let out = extract(
            "<Placemark><gx:Track>
               <when>t1</when><when>t2</when><when>t3</when>
               <gx:coord>1 1</gx:coord><gx:coord>bad</gx:coord><gx:coord>3 3</gx:coord>
             </gx:Track></Placemark>",
        );
        assert_eq!(
            out.geometries[0].value,
            Value::LineString(vec![vec![1.0, 1.0], vec![3.0, 3.0]])
        );
        assert_eq!(out.coord_times, vec![vec!["t1", "t3"]]);
    }

    #[test]
    fn track_left_with_one_position_is_a_point() {
        let out = extract(
            "<Placemark><gx:Track>
               <when>t1</when><when>t2</when><when>t3</when>
               <gx:coord>x</gx:coord><gx:coord>2 2</gx:coord><gx:coord>y</gx:coord>
             </gx:Track></Placemark>",
        );
        assert_eq!(out.geometries[0].value, Value::Point(vec![2.0, 2.0]));
        assert_eq!(out.coord_times, vec![vec!["t2"]]);
    }

    #[test]
    fn empty_track_yields_nothing() {
        let out = extract("<Placemark><gx:Track><when>2020</when></gx:Track></Placemark>");
        assert!(out.geometries.is_empty());
        assert!(out.coord_times.is_empty());
    }

    #[test]
    fn multi_containers_flatten_in_order() {
        let out = extract(
            "<Placemark><MultiGeometry>
               <Point><coordinates>0,0</coordinates></Point>
               <MultiGeometry><Point><coordinates>1,1</coordinates></Point></MultiGeometry>
               <gx:MultiTrack>
                 <gx:Track><when>a</when><gx:coord>2 2</gx:coord></gx:Track>
                 <gx:Track><when>b</when><gx:coord>3 3</gx:coord></gx:Track>
               </gx:MultiTrack>
               <Model><Location/></Model>
             </MultiGeometry></Placemark>",
        );
        let points: Vec<Value> = out.geometries.into_iter().map(|g| g.value).collect();
        assert_eq!(
            points,
            vec![
                Value::Point(vec![0.0, 0.0]),
                Value::Point(vec![1.0, 1.0]),
                Value::Point(vec![2.0, 2.0]),
                Value::Point(vec![3.0, 3.0]),
            ]
        );
        assert_eq!(out.coord_times, vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn only_direct_children_are_considered() {
        let out = extract(
            "<Placemark><ExtendedData><Point><coordinates>1,1</coordinates></Point></ExtendedData></Placemark>",
        );
        assert!(out.geometries.is_empty());
    }
}
