//! Single-page PDF writer for a [`Scene`].
//!
//! Text is set in the standard Helvetica font, so no font program is embedded.

use std::fmt::Write as _;
use std::io::Write;

use chrono::Local;

use super::scene::{Anchor, Rgb, Scene, Shape, text_width};

const PRODUCER: &str = concat!("evac_plot ", env!("CARGO_PKG_VERSION"));

/// Escapes a PDF literal string; non-ASCII characters become '?'
fn pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out.push(')');
    out
}

/// Opacity values other than 1.0 used by the scene, each mapped to /GS<i>
fn opacity_states(scene: &Scene) -> Vec<f32> {
    let mut states: Vec<f32> = Vec::new();
    for shape in &scene.shapes {
        if let Shape::Line { opacity, .. } = shape
            && *opacity < 1.0
            && !states.contains(opacity)
        {
            states.push(*opacity);
        }
    }
    states
}

fn set_fill(ops: &mut String, color: Rgb) {
    let (r, g, b) = color.unit();
    let _ = writeln!(ops, "{:.3} {:.3} {:.3} rg", r, g, b);
}

fn set_stroke(ops: &mut String, color: Rgb) {
    let (r, g, b) = color.unit();
    let _ = writeln!(ops, "{:.3} {:.3} {:.3} RG", r, g, b);
}

/// Builds the page content stream. PDF space has its origin bottom-left.
fn content_stream(scene: &Scene, states: &[f32]) -> String {
    let h = scene.height;
    let mut ops = String::new();

    for shape in &scene.shapes {
        match *shape {
            Shape::Rect {
                x,
                y,
                w,
                h: rh,
                fill,
                stroke,
                stroke_width,
            } => {
                let _ = writeln!(ops, "q");
                if let Some(c) = fill {
                    set_fill(&mut ops, c);
                }
                if let Some(c) = stroke {
                    set_stroke(&mut ops, c);
                    let _ = writeln!(ops, "{:.2} w", stroke_width);
                }
                let paint = match (fill, stroke) {
                    (Some(_), Some(_)) => "B",
                    (Some(_), None) => "f",
                    (None, Some(_)) => "S",
                    (None, None) => "n",
                };
                let _ = writeln!(
                    ops,
                    "{:.2} {:.2} {:.2} {:.2} re {}",
                    x,
                    h - y - rh,
                    w,
                    rh,
                    paint
                );
                let _ = writeln!(ops, "Q");
            }
            Shape::Line {
                x1,
                y1,
                x2,
                y2,
                color,
                width,
                dash,
                opacity,
            } => {
                let _ = writeln!(ops, "q");
                if let Some(i) = states.iter().position(|&a| a == opacity) {
                    let _ = writeln!(ops, "/GS{} gs", i);
                }
                if let Some((on, off)) = dash {
                    let _ = writeln!(ops, "[{:.2} {:.2}] 0 d", on, off);
                }
                set_stroke(&mut ops, color);
                let _ = writeln!(
                    ops,
                    "{:.2} w {:.2} {:.2} m {:.2} {:.2} l S",
                    width,
                    x1,
                    h - y1,
                    x2,
                    h - y2
                );
                let _ = writeln!(ops, "Q");
            }
            Shape::Text {
                x,
                y,
                size,
                anchor,
                vertical,
                color,
                ref content,
            } => {
                let shift = match anchor {
                    Anchor::Start => 0.0,
                    Anchor::Middle => text_width(content, size) / 2.0,
                    Anchor::End => text_width(content, size),
                };
                // move the origin back along the reading direction
                let (matrix, tx, ty) = if vertical {
                    ("0 1 -1 0", x, h - y - shift)
                } else {
                    ("1 0 0 1", x - shift, h - y)
                };
                let _ = writeln!(ops, "BT");
                set_fill(&mut ops, color);
                let _ = writeln!(ops, "/F1 {:.1} Tf", size);
                let _ = writeln!(ops, "{} {:.2} {:.2} Tm", matrix, tx, ty);
                let _ = writeln!(ops, "{} Tj", pdf_string(content));
                let _ = writeln!(ops, "ET");
            }
        }
    }
    ops
}

/// Collects objects and their byte offsets for the cross-reference table
struct PdfBuffer {
    bytes: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfBuffer {
    fn new() -> Self {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            bytes,
            offsets: Vec::new(),
        }
    }

    /// Appends object `offsets.len() + 1`
    fn object(&mut self, body: &str) {
        self.offsets.push(self.bytes.len());
        let id = self.offsets.len();
        self.bytes
            .extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", id, body).as_bytes());
    }

    fn finish(mut self, root: usize, info: usize) -> Vec<u8> {
        let xref_at = self.bytes.len();
        let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", self.offsets.len() + 1);
        for offset in &self.offsets {
            let _ = write!(tail, "{:010} 00000 n \n", offset);
        }
        let _ = write!(
            tail,
            "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            self.offsets.len() + 1,
            root,
            info,
            xref_at
        );
        self.bytes.extend_from_slice(tail.as_bytes());
        self.bytes
    }
}

pub fn write_pdf<W: Write>(scene: &Scene, w: &mut W) -> std::io::Result<()> {
    let states = opacity_states(scene);
    let content = content_stream(scene, &states);

    let ext_g_state: String = states
        .iter()
        .enumerate()
        .map(|(i, a)| format!("/GS{} << /Type /ExtGState /CA {:.3} /ca {:.3} >> ", i, a, a))
        .collect();

    let mut pdf = PdfBuffer::new();
    pdf.object("<< /Type /Catalog /Pages 2 0 R >>");
    pdf.object("<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
    pdf.object(&format!(
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
         /Resources << /Font << /F1 5 0 R >> /ExtGState << {}>> >> /Contents 4 0 R >>",
        scene.width, scene.height, ext_g_state
    ));
    pdf.object(&format!(
        "<< /Length {} >>\nstream\n{}endstream",
        content.len(),
        content
    ));
    pdf.object("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>");
    pdf.object(&format!(
        "<< /Producer {} /CreationDate {} >>",
        pdf_string(PRODUCER),
        pdf_string(&Local::now().format("D:%Y%m%d%H%M%S").to_string())
    ));

    w.write_all(&pdf.finish(1, 6))?;
    w.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartOptions, build_bar_chart};
    use crate::dataset::Dataset;

    fn render(scene: &Scene) -> String {
        let mut out = Vec::new();
        write_pdf(scene, &mut out).unwrap();
        String::from_utf8_lossy(&out).into_owned()
    }

    #[test]
    fn test_pdf_string_escaping() {
        assert_eq!(pdf_string("Time (s)"), r"(Time \(s\))");
        assert_eq!(pdf_string(r"a\b"), r"(a\\b)");
        assert_eq!(pdf_string("µs"), "(?s)");
    }

    #[test]
    fn test_text_flips_y_and_anchors() {
        let mut scene = Scene::new(100.0, 50.0);
        scene.text(50.0, 10.0, 10.0, Anchor::End, "00");
        let ops = content_stream(&scene, &[]);

        // "00" is 11.12pt wide at 10pt
        assert!(ops.contains("1 0 0 1 38.88 40.00 Tm"));
        assert!(ops.contains("(00) Tj"));
    }

    #[test]
    fn test_vertical_text_matrix() {
        let mut scene = Scene::new(100.0, 100.0);
        scene.push(Shape::Text {
            x: 20.0,
            y: 50.0,
            size: 10.0,
            anchor: Anchor::Middle,
            vertical: true,
            color: Rgb::BLACK,
            content: "00".to_string(),
        });
        let ops = content_stream(&scene, &[]);
        assert!(ops.contains("0 1 -1 0 20.00 44.44 Tm"));
    }

    #[test]
    fn test_document_structure() {
        let ds = Dataset::embedded(1).unwrap();
        let scene = build_bar_chart(&ds, &ChartOptions::default()).unwrap();
        let pdf = render(&scene);

        assert!(pdf.starts_with("%PDF-1.4\n"));
        assert!(pdf.trim_end().ends_with("%%EOF"));
        assert!(pdf.contains("/MediaBox [0 0 648.00 360.00]"));
        assert!(pdf.contains("/BaseFont /Helvetica"));
        assert!(pdf.contains("/GS0 << /Type /ExtGState /CA 0.400 /ca 0.400 >>"));
        assert!(pdf.contains("(Number of Vehicles) Tj"));
        assert!(pdf.contains("(Evacuation Time \\(seconds\\)) Tj"));
        assert!(pdf.contains("xref\n0 7\n0000000000 65535 f \n"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let scene = Scene::new(10.0, 10.0);
        let mut out = Vec::new();
        write_pdf(&scene, &mut out).unwrap();
        let text = String::from_utf8_lossy(&out).into_owned();

        let startxref = text.rfind("startxref\n").unwrap();
        let xref_at: usize = text[startxref + 10..]
            .lines()
            .next()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(&out[xref_at..xref_at + 4], b"xref");

        // the binary header comment makes the lossy text longer than the bytes
        let table = String::from_utf8_lossy(&out[xref_at..]).into_owned();
        for (i, line) in table.lines().skip(3).take(6).enumerate() {
            let offset: usize = line[..10].parse().unwrap();
            let header = format!("{} 0 obj", i + 1);
            assert_eq!(&out[offset..offset + header.len()], header.as_bytes());
        }
    }

    #[test]
    fn test_no_opacity_states_without_grid() {
        let scene = Scene::new(10.0, 10.0);
        assert!(opacity_states(&scene).is_empty());
        assert!(render(&scene).contains("/ExtGState << >>"));
    }
}
