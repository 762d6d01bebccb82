use std::io::Write;

use super::scene::{Anchor, Scene, Shape};

/// HTML encoding for SVG text
pub fn html_encode(text: &str) -> String {
    text.replace("&", "&amp;")
        .replace("<", "&lt;")
        .replace(">", "&gt;")
        .replace("\"", "&quot;")
        .replace("'", "&#x27;")
}

fn anchor_attr(anchor: Anchor) -> &'static str {
    match anchor {
        Anchor::Start => "start",
        Anchor::Middle => "middle",
        Anchor::End => "end",
    }
}

pub fn write_svg<W: Write>(scene: &Scene, w: &mut W) -> std::io::Result<()> {
    writeln!(
        w,
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{0}pt" height="{1}pt" viewBox="0 0 {0} {1}">"##,
        scene.width, scene.height
    )?;

    for shape in &scene.shapes {
        match shape {
            Shape::Rect {
                x,
                y,
                w: width,
                h,
                fill,
                stroke,
                stroke_width,
            } => {
                let fill = fill.map_or_else(|| "none".to_string(), |c| c.to_hex());
                let stroke = match stroke {
                    Some(c) => format!(
                        r##" stroke="{}" stroke-width="{}""##,
                        c.to_hex(),
                        stroke_width
                    ),
                    None => String::new(),
                };
                writeln!(
                    w,
                    r##"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"{}/>"##,
                    x, y, width, h, fill, stroke
                )?;
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
                let dash = dash
                    .map(|(on, off)| format!(r##" stroke-dasharray="{},{}""##, on, off))
                    .unwrap_or_default();
                let opacity = if *opacity < 1.0 {
                    format!(r##" stroke-opacity="{}""##, opacity)
                } else {
                    String::new()
                };
                writeln!(
                    w,
                    r##"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{}"{}{}/>"##,
                    x1,
                    y1,
                    x2,
                    y2,
                    color.to_hex(),
                    width,
                    dash,
                    opacity
                )?;
            }
            Shape::Text {
                x,
                y,
                size,
                anchor,
                vertical,
                color,
                content,
            } => {
                let transform = if *vertical {
                    format!(r##" transform="rotate(-90 {:.2} {:.2})""##, x, y)
                } else {
                    String::new()
                };
                writeln!(
                    w,
                    r##"<text x="{:.2}" y="{:.2}" font-family="Helvetica,Arial,sans-serif" font-size="{}px" text-anchor="{}" fill="{}"{}>{}</text>"##,
                    x,
                    y,
                    size,
                    anchor_attr(*anchor),
                    color.to_hex(),
                    transform,
                    html_encode(content)
                )?;
            }
        }
    }

    writeln!(w, "</svg>")?;
    Ok(())
}
