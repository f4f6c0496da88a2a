//! Conversion of KML `IconStyle`, `LabelStyle`, `LineStyle` and `PolyStyle`
//! into flat feature properties.

use crate::coords::{num1, num_attr};
use crate::properties::{merge, number_value};
use crate::tree::XmlElement;
use geojson::{JsonObject, JsonValue};

/// Property names used for line and polygon styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StyleNaming {
    /// `stroke`, `stroke-opacity`, `stroke-width`, `fill`, `fill-opacity`
    #[default]
    Simplestyle,
    /// `line-stroke-color`, `line-stroke-width`, `poly-fill-color`, ...
    Prefixed,
}

impl StyleNaming {
    fn line(self) -> &'static str {
        match self {
            StyleNaming::Simplestyle => "stroke",
            StyleNaming::Prefixed => "line-stroke",
        }
    }

    fn fill(self) -> &'static str {
        match self {
            StyleNaming::Simplestyle => "fill",
            StyleNaming::Prefixed => "poly-fill",
        }
    }

    fn outline(self) -> &'static str {
        match self {
            StyleNaming::Simplestyle => "stroke",
            StyleNaming::Prefixed => "poly-stroke",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleOptions {
    pub naming: StyleNaming,
    /// Also emit `icon-offset-units` from the hotSpot `xunits`/`yunits`.
    pub offset_units: bool,
}

/// Convert a KML color into `<prefix>-color` and `<prefix>-opacity`.
///
/// `stroke` and `fill` use the bare prefix as the color key. KML writes
/// colors as `AABBGGRR`; 3 and 6 digit values are taken as plain hex
/// colors. Anything else produces nothing.
pub fn kml_color(value: &str, prefix: &str) -> JsonObject {
    let mut properties = JsonObject::new();
    let color_key = if prefix == "stroke" || prefix == "fill" {
        prefix.to_string()
    } else {
        format!("{prefix}-color")
    };

    let v = value.trim();
    let v = v.strip_prefix('#').unwrap_or(v);
    if !v.chars().all(|c| c.is_ascii_hexdigit()) {
        return properties;
    }
    match v.len() {
        3 | 6 => {
            properties.insert(color_key, JsonValue::from(format!("#{v}")));
        }
        8 => {
            if let Ok(alpha) = u8::from_str_radix(&v[0..2], 16) {
                properties.insert(
                    format!("{prefix}-opacity"),
                    number_value(f64::from(alpha) / 255.0),
                );
            }
            let rgb = format!("#{}{}{}", &v[6..8], &v[4..6], &v[2..4]);
            properties.insert(color_key, JsonValue::from(rgb));
        }
        _ => {}
    }
    properties
}

fn color<E: XmlElement>(node: &E, prefix: &str) -> JsonObject {
    match node.first_by_tag("color") {
        Some(elem) => kml_color(&elem.text_content(), prefix),
        None => JsonObject::new(),
    }
}

fn numeric_property<E: XmlElement>(
    properties: &mut JsonObject,
    node: &E,
    source: &str,
    target: &str,
) {
    if let Some(value) = num1(node, source) {
        properties.insert(target.to_string(), number_value(value));
    }
}

pub fn extract_icon<E: XmlElement>(node: &E, options: &StyleOptions) -> JsonObject {
    let Some(icon_style) = node.first_by_tag("IconStyle") else {
        return JsonObject::new();
    };
    let mut properties = color(icon_style, "icon");
    numeric_property(&mut properties, icon_style, "scale", "icon-scale");
    numeric_property(&mut properties, icon_style, "heading", "icon-heading");

    if let Some(hotspot) = icon_style.first_by_tag("hotSpot") {
        if let (Some(left), Some(top)) = (num_attr(hotspot, "x"), num_attr(hotspot, "y")) {
            properties.insert(
                "icon-offset".to_string(),
                JsonValue::Array(vec![number_value(left), number_value(top)]),
            );
            if options.offset_units {
                if let (Some(xunits), Some(yunits)) =
                    (hotspot.attribute("xunits"), hotspot.attribute("yunits"))
                {
                    properties.insert(
                        "icon-offset-units".to_string(),
                        JsonValue::Array(vec![xunits.into(), yunits.into()]),
                    );
                }
            }
        }
    }

    merge(&mut properties, extract_icon_href(icon_style));
    properties
}

/// `Icon/href` as the `icon` property.
pub fn extract_icon_href<E: XmlElement>(node: &E) -> JsonObject {
    let mut properties = JsonObject::new();
    if let Some(href) = node
        .first_by_tag("Icon")
        .and_then(|icon| icon.first_by_tag("href"))
    {
        let href = href.text_content();
        let href = href.trim();
        if !href.is_empty() {
            properties.insert("icon".to_string(), href.into());
        }
    }
    properties
}

pub fn extract_label<E: XmlElement>(node: &E) -> JsonObject {
    let Some(label_style) = node.first_by_tag("LabelStyle") else {
        return JsonObject::new();
    };
    let mut properties = color(label_style, "label");
    numeric_property(&mut properties, label_style, "scale", "label-scale");
    properties
}

pub fn extract_line<E: XmlElement>(node: &E, options: &StyleOptions) -> JsonObject {
    let Some(line_style) = node.first_by_tag("LineStyle") else {
        return JsonObject::new();
    };
    let prefix = options.naming.line();
    let mut properties = color(line_style, prefix);
    numeric_property(&mut properties, line_style, "width", &format!("{prefix}-width"));
    properties
}

/// `fill` and `outline` of `0` force the matching opacity to zero; other
/// values leave the color's opacity alone.
pub fn extract_poly<E: XmlElement>(node: &E, options: &StyleOptions) -> JsonObject {
    let Some(poly_style) = node.first_by_tag("PolyStyle") else {
        return JsonObject::new();
    };
    let fill = options.naming.fill();
    let mut properties = color(poly_style, fill);
    if is_zero(poly_style, "fill") {
        properties.insert(format!("{fill}-opacity"), number_value(0.0));
    }
    if is_zero(poly_style, "outline") {
        properties.insert(format!("{}-opacity", options.naming.outline()), number_value(0.0));
    }
    properties
}

fn is_zero<E: XmlElement>(node: &E, tag: &str) -> bool {
    node.first_by_tag(tag)
        .is_some_and(|elem| elem.text_content().trim() == "0")
}

/// All sub-styles found under `node`, merged poly, line, label, icon: a
/// later sub-style wins on a shared key.
pub fn extract_style<E: XmlElement>(node: &E, options: &StyleOptions) -> JsonObject {
    let mut properties = JsonObject::new();
    merge(&mut properties, extract_poly(node, options));
    merge(&mut properties, extract_line(node, options));
    merge(&mut properties, extract_label(node));
    merge(&mut properties, extract_icon(node, options));
    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use serde_json::json;

    const STYLE: &str = r#"<Style>
<IconStyle>
<Icon>
<href>https://earth.google.com/earth/rpc/cc/icon?color=1976d2&amp;id=2000&amp;scale=4</href>
</Icon>
<hotSpot x="64" y="128" xunits="pixels" yunits="insetPixels"/>
</IconStyle>
<LabelStyle>
</LabelStyle>
<LineStyle>
<color>ff9f3f30</color>
<width>2.13333</width>
</LineStyle>
<PolyStyle>
<color>4058eeff</color>
</PolyStyle>
<BalloonStyle>
<displayMode>hide</displayMode>
</BalloonStyle>
</Style>"#;

    #[test]
    fn kml_color_reorders_and_extracts_alpha() {
        let out = kml_color("ff9f3f30", "line-stroke");
        assert_eq!(out["line-stroke-color"], json!("#303f9f"));
        assert_eq!(out["line-stroke-opacity"], json!(1));

        let out = kml_color("4058eeff", "fill");
        assert_eq!(out["fill"], json!("#ffee58"));
        assert_eq!(out["fill-opacity"], json!(0.25098039215686274));
    }

    #[test]
    fn kml_color_short_forms_and_garbage() {
        assert_eq!(kml_color("#abc", "icon")["icon-color"], json!("#abc"));
        assert_eq!(kml_color("a0b0c0", "stroke")["stroke"], json!("#a0b0c0"));
        assert!(kml_color("12345", "icon").is_empty());
        assert!(kml_color("zzzzzzzz", "icon").is_empty());
        assert!(kml_color("", "icon").is_empty());
    }

    #[test]
    fn prefixed_naming_matches_google_earth_export() {
        let doc = Document::parse(STYLE).unwrap();
        let options = StyleOptions {
            naming: StyleNaming::Prefixed,
            offset_units: false,
        };
        let out = extract_style(doc.root(), &options);
        assert_eq!(
            JsonValue::Object(out),
            json!({
                "poly-fill-color": "#ffee58",
                "poly-fill-opacity": 0.25098039215686274,
                "line-stroke-color": "#303f9f",
                "line-stroke-opacity": 1,
                "line-stroke-width": 2.13333,
                "icon-offset": [64, 128],
                "icon": "https://earth.google.com/earth/rpc/cc/icon?color=1976d2&id=2000&scale=4",
            })
        );
    }

    #[test]
    fn simplestyle_naming_and_offset_units() {
        let doc = Document::parse(STYLE).unwrap();
        let options = StyleOptions {
            naming: StyleNaming::Simplestyle,
            offset_units: true,
        };
        let out = extract_style(doc.root(), &options);
        assert_eq!(out["stroke"], json!("#303f9f"));
        assert_eq!(out["stroke-width"], json!(2.13333));
        assert_eq!(out["fill"], json!("#ffee58"));
        assert_eq!(out["icon-offset-units"], json!(["pixels", "insetPixels"]));
    }

    #[test]
    fn hotspot_needs_both_coordinates() {
        let doc =
            Document::parse(r#"<Style><IconStyle><hotSpot x="1" y="top"/></IconStyle></Style>"#)
                .unwrap();
        let out = extract_icon(doc.root(), &StyleOptions::default());
        assert!(!out.contains_key("icon-offset"));
    }

    #[test]
    fn poly_fill_and_outline_switches() {
        let doc = Document::parse(
            "<Style><PolyStyle><color>80ffffff</color><fill>0</fill><outline>1</outline></PolyStyle></Style>",
        )
        .unwrap();
        let out = extract_poly(doc.root(), &StyleOptions::default());
        assert_eq!(out["fill-opacity"], json!(0));
        assert!(!out.contains_key("stroke-opacity"));

        let doc = Document::parse(
            "<Style><PolyStyle><fill>1</fill><outline>0</outline></PolyStyle></Style>",
        )
        .unwrap();
        let out = extract_poly(doc.root(), &StyleOptions::default());
        assert!(!out.contains_key("fill-opacity"));
        assert_eq!(out["stroke-opacity"], json!(0));
    }

    #[test]
    fn label_scale_and_icon_heading() {
        let doc = Document::parse(
            "<Style><LabelStyle><color>ff0000ff</color><scale>1.5</scale></LabelStyle>
             <IconStyle><heading>90</heading><scale>x</scale></IconStyle></Style>",
        )
        .unwrap();
        let out = extract_style(doc.root(), &StyleOptions::default());
        assert_eq!(out["label-color"], json!("#ff0000"));
        assert_eq!(out["label-scale"], json!(1.5));
        assert_eq!(out["icon-heading"], json!(90));
        assert!(!out.contains_key("icon-scale"));
    }
}
