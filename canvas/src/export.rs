//! Markdown and SVG serialization of a scene.
//!
//! Both are pure functions of scene state. SVG export arranges a copy of the
//! notes first so the picture is readable even when the live board is
//! cluttered; the live scene is never touched.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use std::collections::BTreeSet;

use rand::Rng;

use crate::consts::{EXPORT_ROW_BAND, FIT_PADDING, PLACEMENT_GAP, SVG_LINE_HEIGHT};
use crate::doc::{Note, NoteId, Scene};
use crate::geometry::{Rect, bounding_box, resolve_overlaps};

/// Selected notes as a Markdown list, in reading order.
///
/// Notes are grouped into horizontal bands [`EXPORT_ROW_BAND`] units tall by
/// their top edge, then sorted by x within a band. An empty selection exports
/// every note. Continuation lines of multi-line content are indented under
/// their bullet.
#[must_use]
pub fn to_markdown(scene: &Scene, selection: &BTreeSet<NoteId>) -> String {
    let mut notes: Vec<&Note> = scene
        .notes()
        .iter()
        .filter(|n| selection.is_empty() || selection.contains(&n.id))
        .collect();
    notes.sort_by(|a, b| row_band(a).total_cmp(&row_band(b)).then(a.x.total_cmp(&b.x)));

    let mut out = String::new();
    for note in notes {
        let mut lines = note.content.trim().lines();
        let first = lines.next().unwrap_or_default();
        out.push_str("- ");
        out.push_str(first);
        out.push('\n');
        for line in lines {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

fn row_band(note: &Note) -> f64 {
    (note.y / EXPORT_ROW_BAND).floor()
}

/// Every note and connection as a standalone SVG document.
///
/// Notes are de-overlapped on a copy before drawing. Connections are drawn
/// beneath notes as straight lines between centers.
pub fn to_svg<R>(scene: &Scene, rng: &mut R) -> String
where
    R: Rng,
{
    let notes: Vec<&Note> = scene.sorted_notes();
    let mut rects: Vec<Rect> = notes.iter().map(|n| n.rect()).collect();
    resolve_overlaps(&mut rects, PLACEMENT_GAP, rng);

    let bounds = bounding_box(rects.iter().copied()).unwrap_or_default();
    let (min_x, min_y) = (bounds.x - FIT_PADDING, bounds.y - FIT_PADDING);
    let (width, height) = (bounds.width + FIT_PADDING * 2.0, bounds.height + FIT_PADDING * 2.0);

    let mut out = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"{min_x} {min_y} {width} {height}\" width=\"{width}\" height=\"{height}\">\n"
    );

    let placed = |id: &NoteId| notes.iter().position(|n| n.id == *id).map(|i| rects[i]);
    for connection in scene.connections() {
        let (Some(from), Some(to)) = (placed(&connection.from_id), placed(&connection.to_id)) else {
            continue;
        };
        let (a, b) = (from.center(), to.center());
        out.push_str(&format!(
            "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#888888\" stroke-width=\"2\"/>\n",
            a.x, a.y, b.x, b.y
        ));
    }

    for (note, rect) in notes.iter().zip(&rects) {
        let center = rect.center();
        out.push_str(&format!(
            "  <g transform=\"rotate({} {} {})\">\n",
            note.rotation, center.x, center.y
        ));
        out.push_str(&format!(
            "    <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            note.color.hex()
        ));
        out.push_str(&format!(
            "    <text x=\"{}\" y=\"{}\" font-family=\"sans-serif\" font-size=\"14\">",
            rect.x + 12.0,
            rect.y + 12.0
        ));
        for line in note.content.lines() {
            out.push_str(&format!(
                "<tspan x=\"{}\" dy=\"{SVG_LINE_HEIGHT}\">{}</tspan>",
                rect.x + 12.0,
                escape_xml(line)
            ));
        }
        out.push_str("</text>\n  </g>\n");
    }

    out.push_str("</svg>\n");
    out
}

/// Escape the five XML special characters.
#[must_use]
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
