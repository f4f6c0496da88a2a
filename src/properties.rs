//! Flat feature properties, descriptions, times and ExtendedData.

use crate::schema::Schema;
use crate::tree::{Child, XmlElement, node_val};
use geojson::{JsonObject, JsonValue};
use serde_json::Number;

/// Elements copied verbatim as text when present.
pub const FLAT_FIELDS: [&str; 6] = [
    "name",
    "address",
    "visibility",
    "open",
    "phoneNumber",
    "description",
];

/// Overwrite-merge `source` into `target`. A key already present keeps its
/// position and takes the new value.
pub fn merge(target: &mut JsonObject, source: JsonObject) {
    for (key, value) in source {
        target.insert(key, value);
    }
}

/// JSON number for `value`: integral values become integers, non-finite
/// values become `null`.
pub fn number_value(value: f64) -> JsonValue {
    if !value.is_finite() {
        return JsonValue::Null;
    }
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        return JsonValue::from(value as i64);
    }
    Number::from_f64(value).map_or(JsonValue::Null, JsonValue::Number)
}

pub fn flat_fields<E: XmlElement>(node: &E) -> JsonObject {
    let mut properties = JsonObject::new();
    for field in FLAT_FIELDS {
        if let Some(elem) = node.first_by_tag(field) {
            properties.insert(field.to_string(), elem.text_content().into());
        }
    }
    properties
}

/// `description` as `{"@type": "html", "value": ...}` when it holds a CDATA
/// section. Plain descriptions are left to [`flat_fields`].
pub fn html_description<E: XmlElement>(node: &E) -> JsonObject {
    let mut properties = JsonObject::new();
    let Some(description) = node.first_by_tag("description") else {
        return properties;
    };
    let cdata = description.child_nodes().into_iter().find_map(|child| match child {
        Child::CData(text) => Some(text.to_string()),
        _ => None,
    });
    if let Some(html) = cdata {
        let mut value = JsonObject::new();
        value.insert("@type".to_string(), "html".into());
        value.insert("value".to_string(), html.into());
        properties.insert("description".to_string(), JsonValue::Object(value));
    }
    properties
}

pub fn time_span<E: XmlElement>(node: &E) -> JsonObject {
    let mut properties = JsonObject::new();
    if let Some(span) = node.first_by_tag("TimeSpan") {
        let mut value = JsonObject::new();
        value.insert("begin".to_string(), node_val(span.first_by_tag("begin")).into());
        value.insert("end".to_string(), node_val(span.first_by_tag("end")).into());
        properties.insert("timespan".to_string(), JsonValue::Object(value));
    }
    properties
}

pub fn time_stamp<E: XmlElement>(node: &E) -> JsonObject {
    let mut properties = JsonObject::new();
    if let Some(stamp) = node.first_by_tag("TimeStamp") {
        properties.insert(
            "timestamp".to_string(),
            node_val(stamp.first_by_tag("when")).into(),
        );
    }
    properties
}

/// `Data` values as strings, then `SimpleData` values converted through
/// `schema`.
pub fn extended_data<E: XmlElement>(node: &E, schema: &Schema) -> JsonObject {
    let mut properties = JsonObject::new();
    let Some(extended) = node.first_by_tag("ExtendedData") else {
        return properties;
    };
    for data in extended.all_by_tag("Data", true) {
        let name = data.attribute("name").unwrap_or_default();
        properties.insert(name.to_string(), node_val(data.first_by_tag("value")).into());
    }
    for simple in extended.all_by_tag("SimpleData", true) {
        let name = simple.attribute("name").unwrap_or_default();
        let value = schema.field_type(name).convert(&simple.text_content());
        properties.insert(name.to_string(), value);
    }
    properties
}

/// Replace a raw `visibility` text with a boolean: `"0"` is false.
pub fn coerce_visibility(properties: &mut JsonObject) {
    if let Some(visibility) = properties.get_mut("visibility") {
        let visible = visibility.as_str() != Some("0");
        *visibility = JsonValue::Bool(visible);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::schema::FieldType;
    use serde_json::json;

    fn parse(xml: &str) -> Document {
        Document::parse(xml).unwrap()
    }

    #[test]
    fn number_value_prefers_integers() {
        assert_eq!(number_value(3.0), json!(3));
        assert_eq!(number_value(-0.0), json!(0));
        assert_eq!(number_value(0.5), json!(0.5));
        assert_eq!(number_value(f64::NAN), JsonValue::Null);
        assert_eq!(number_value(f64::INFINITY), JsonValue::Null);
    }

    #[test]
    fn flat_fields_only_for_present_elements() {
        let doc = parse(
            "<Placemark><name>A</name><open>1</open><phoneNumber>+1 555</phoneNumber></Placemark>",
        );
        let out = flat_fields(doc.root());
        assert_eq!(
            JsonValue::Object(out),
            json!({"name": "A", "open": "1", "phoneNumber": "+1 555"})
        );
    }

    #[test]
    fn html_description_needs_cdata() {
        let doc = parse("<Placemark><description><![CDATA[<p>hi</p>]]></description></Placemark>");
        let out = html_description(doc.root());
        assert_eq!(out["description"], json!({"@type": "html", "value": "<p>hi</p>"}));

        let doc = parse("<Placemark><description>plain</description></Placemark>");
        assert!(html_description(doc.root()).is_empty());
        assert_eq!(flat_fields(doc.root())["description"], json!("plain"));
    }

    #[test]
    fn times() {
        let doc = parse(
            "<Placemark><TimeSpan><begin>2000</begin></TimeSpan><TimeStamp><when>2001</when></TimeStamp></Placemark>",
        );
        assert_eq!(time_span(doc.root())["timespan"], json!({"begin": "2000", "end": ""}));
        assert_eq!(time_stamp(doc.root())["timestamp"], json!("2001"));

        let doc = parse("<Placemark/>");
        assert!(time_span(doc.root()).is_empty());
        assert!(time_stamp(doc.root()).is_empty());
    }

    #[test]
    fn extended_data_uses_schema_types() {
        let doc = parse(
            r##"<Placemark><ExtendedData>
                 <Data name="holeNumber"><value>1</value></Data>
                 <Data name="empty"/>
                 <SchemaData schemaUrl="#s">
                   <SimpleData name="count">12</SimpleData>
                   <SimpleData name="ratio">abc</SimpleData>
                   <SimpleData name="flag">false</SimpleData>
                   <SimpleData name="label">7</SimpleData>
                 </SchemaData>
               </ExtendedData></Placemark>"##,
        );
        let mut schema = Schema::new();
        schema.insert("count", FieldType::Int);
        schema.insert("ratio", FieldType::Double);
        schema.insert("flag", FieldType::Bool);

        let out = extended_data(doc.root(), &schema);
        assert_eq!(
            JsonValue::Object(out),
            json!({
                "holeNumber": "1",
                "empty": "",
                "count": 12,
                "ratio": null,
                "flag": true,
                "label": "7",
            })
        );
    }

    #[test]
    fn visibility_coercion() {
        let mut properties = JsonObject::new();
        properties.insert("visibility".to_string(), json!("0"));
        coerce_visibility(&mut properties);
        assert_eq!(properties["visibility"], json!(false));

        properties.insert("visibility".to_string(), json!("false"));
        coerce_visibility(&mut properties);
        assert_eq!(properties["visibility"], json!(true));

        let mut properties = JsonObject::new();
        coerce_visibility(&mut properties);
        assert!(!properties.contains_key("visibility"));
    }
}
