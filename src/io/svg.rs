//! SVG serialization of traced vector documents
//!
//! The viewBox matches the frame in pixels while width and height carry the
//! physical size in millimetres. Each ink layer becomes one `<g>` named after
//! its channel; absence of ink is absence of geometry, so there is no
//! background element.

use crate::io::configuration::VECTOR_PRECISION;
use crate::math::geometry::Point;
use crate::render::vector::{PathGroup, Primitive, VectorDocument};

// Fixed precision with trailing zeros removed
fn number(value: f64) -> String {
    let text = format!("{value:.precision$}", precision = VECTOR_PRECISION);
    let trimmed = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text.as_str()
    };
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn point_list(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", number(p.x), number(p.y)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn primitive_element(primitive: &Primitive) -> String {
    match primitive {
        Primitive::Polygon(points) => format!(r#"<polygon points="{}"/>"#, point_list(points)),
        Primitive::Circle { center, radius } => format!(
            r#"<circle cx="{}" cy="{}" r="{}"/>"#,
            number(center.x),
            number(center.y),
            number(*radius)
        ),
        Primitive::Rect {
            x,
            y,
            width,
            height,
        } => format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}"/>"#,
            number(*x),
            number(*y),
            number(*width),
            number(*height)
        ),
        Primitive::Line { start, end, width } => format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke-width="{}"/>"#,
            number(start.x),
            number(start.y),
            number(end.x),
            number(end.y),
            number(*width)
        ),
    }
}

fn group_element(group: &PathGroup) -> String {
    let color = group.layer.color();
    let stroked = group
        .primitives
        .iter()
        .any(|p| matches!(p, Primitive::Line { .. }));
    let paint = if stroked {
        format!(r#"fill="none" stroke="{color}" stroke-linecap="round""#)
    } else {
        format!(r#"fill="{color}""#)
    };
    let mut out = format!("  <g id=\"{}\" {paint}>\n", group.layer.name());
    for primitive in &group.primitives {
        out.push_str("    ");
        out.push_str(&primitive_element(primitive));
        out.push('\n');
    }
    out.push_str("  </g>\n");
    out
}

/// Serialize a document as a standalone SVG file
pub fn encode_svg(document: &VectorDocument) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{}mm\" height=\"{}mm\" viewBox=\"0 0 {} {}\">\n",
        number(document.physical_width_mm),
        number(document.physical_height_mm),
        document.width,
        document.height
    ));
    for group in &document.groups {
        out.push_str(&group_element(group));
    }
    out.push_str("</svg>\n");
    out
}
