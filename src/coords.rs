//! Coordinate and number parsing for loosely formatted KML text.

use crate::tree::{XmlElement, node_val};

/// A position: longitude, latitude and optional elevation.
pub type Position = Vec<f64>;

/// Lenient float parsing: leading whitespace is skipped and the longest
/// numeric prefix is used, so `"12.5m"` gives `12.5`. Returns `None` where
/// nothing numeric is found.
pub fn parse_float(value: &str) -> Option<f64> {
    let s = value.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let digits = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let int_digits = digits(end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits(end + 1);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = digits(exp_end);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }
    s[..end].parse().ok()
}

/// One position from a `lon,lat[,ele]` string. Whitespace anywhere is
/// ignored, unparseable components are dropped and at most three are kept.
/// The result may be shorter than two; callers decide whether that is
/// usable.
pub fn coord1(value: &str) -> Position {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    compact
        .split(',')
        .filter_map(parse_float)
        .take(3)
        .collect()
}

/// All positions from a whitespace separated list of tuples. Tuples with
/// fewer than two valid components are dropped.
pub fn coord(value: &str) -> Vec<Position> {
    value
        .split_whitespace()
        .map(coord1)
        .filter(|position| position.len() >= 2)
        .collect()
}

/// Close a ring by repeating its first position when the last one differs.
/// Empty rings are returned as they are.
pub fn fix_ring(mut ring: Vec<Position>) -> Vec<Position> {
    if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
        if first != last {
            let first = first.clone();
            ring.push(first);
        }
    }
    ring
}

/// Numeric text of the first descendant named `tag`.
pub fn num1<E: XmlElement>(node: &E, tag: &str) -> Option<f64> {
    parse_float(&node_val(node.first_by_tag(tag)))
}

/// Numeric value of an attribute.
pub fn num_attr<E: XmlElement>(node: &E, name: &str) -> Option<f64> {
    node.attribute(name).and_then(parse_float)
}
