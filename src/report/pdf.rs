//! Chart pages rendered to PDF with `printpdf`.
//!
//! Chart code draws onto a [`Page`] in PostScript points with the origin at
//! the bottom left. A page only records drawing operations; [`PdfDocument`]
//! replays them onto `printpdf` layers when the file is written.

use anyhow::{anyhow, Context, Result};
use printpdf::utils::calculate_points_for_circle;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, LineDashPattern, Mm, PdfLayerReference,
    Point, Polygon, Pt, TextMatrix,
};
use std::path::Path;

/// RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f64, pub f64, pub f64);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const GRID: Rgb = Rgb(0.8, 0.8, 0.8);

    fn to_color(self) -> Color {
        Color::Rgb(printpdf::Rgb::new(
            self.0 as f32,
            self.1 as f32,
            self.2 as f32,
            None,
        ))
    }
}

/// Horizontal text alignment relative to the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    StrokeColor(Rgb),
    FillColor(Rgb),
    LineWidth(f64),
    /// `(on, off)` dash lengths, `None` for solid strokes.
    Dash(Option<(f64, f64)>),
    /// Stroked path through `points`.
    Stroke { points: Vec<(f64, f64)>, closed: bool },
    /// Filled polygon, optionally outlined in the stroke color.
    Fill {
        points: Vec<(f64, f64)>,
        outlined: bool,
    },
    Circle { cx: f64, cy: f64, r: f64 },
    /// Text starting at `(x, y)`, rotated 90 degrees counter-clockwise
    /// when `vertical` is set.
    Text {
        x: f64,
        y: f64,
        size: f64,
        vertical: bool,
        text: String,
    },
}

/// One page and its drawing operations.
#[derive(Debug, Clone)]
pub struct Page {
    width: f64,
    height: f64,
    ops: Vec<Op>,
}

impl Page {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// All text drawn on the page, in drawing order.
    #[cfg(test)]
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn stroke_color(&mut self, color: Rgb) {
        self.ops.push(Op::StrokeColor(color));
    }

    pub fn fill_color(&mut self, color: Rgb) {
        self.ops.push(Op::FillColor(color));
    }

    pub fn line_width(&mut self, width: f64) {
        self.ops.push(Op::LineWidth(width));
    }

    /// Dashed strokes; `None` switches back to solid lines.
    pub fn dash(&mut self, pattern: Option<(f64, f64)>) {
        self.ops.push(Op::Dash(pattern));
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.ops.push(Op::Stroke {
            points: vec![(x1, y1), (x2, y2)],
            closed: false,
        });
    }

    /// Open path through `points`, stroked.
    pub fn polyline(&mut self, points: &[(f64, f64)]) {
        if points.len() < 2 {
            return;
        }
        self.ops.push(Op::Stroke {
            points: points.to_vec(),
            closed: false,
        });
    }

    /// Closed filled polygon.
    pub fn polygon(&mut self, points: &[(f64, f64)]) {
        if points.len() < 3 {
            return;
        }
        self.ops.push(Op::Fill {
            points: points.to_vec(),
            outlined: false,
        });
    }

    pub fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ops.push(Op::Stroke {
            points: rect_points(x, y, w, h),
            closed: true,
        });
    }

    /// Filled rectangle with an outline in the current stroke color.
    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ops.push(Op::Fill {
            points: rect_points(x, y, w, h),
            outlined: true,
        });
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64) {
        self.ops.push(Op::Circle { cx, cy, r });
    }

    /// Horizontal Helvetica text with its baseline at `y`.
    pub fn text(&mut self, x: f64, y: f64, size: f64, align: Align, text: &str) {
        let width = text_width(text, size);
        let x = match align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };
        self.ops.push(Op::Text {
            x,
            y,
            size,
            vertical: false,
            text: text.to_string(),
        });
    }

    /// Text rotated 90 degrees counter-clockwise, centered on `y`.
    pub fn vertical_text(&mut self, x: f64, y: f64, size: f64, text: &str) {
        self.ops.push(Op::Text {
            x,
            y: y - text_width(text, size) / 2.0,
            size,
            vertical: true,
            text: text.to_string(),
        });
    }
}

fn rect_points(x: f64, y: f64, w: f64, h: f64) -> Vec<(f64, f64)> {
    vec![(x, y), (x + w, y), (x + w, y + h), (x, y + h)]
}

/// Advance width of `text` in Helvetica at `size` points.
///
/// Characters outside printable ASCII count as wide as a digit.
pub fn text_width(text: &str, size: f64) -> f64 {
    let units: u32 = text
        .chars()
        .map(|c| match c {
            ' '..='~' => u32::from(HELVETICA_WIDTHS[(c as u8 - b' ') as usize]),
            _ => 556,
        })
        .sum();
    f64::from(units) * size / 1000.0
}

/// Helvetica AFM widths for `' '..='~'`, in thousandths of the font size.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

fn pt(value: f64) -> Pt {
    Pt(value as f32)
}

fn mm(value: f64) -> Mm {
    Mm::from(pt(value))
}

fn path(points: &[(f64, f64)]) -> Vec<(Point, bool)> {
    points
        .iter()
        .map(|&(x, y)| (Point::new(mm(x), mm(y)), false))
        .collect()
}

/// Replay the recorded operations of `page` onto a `printpdf` layer.
fn render_page(layer: &PdfLayerReference, page: &Page, font: &IndirectFontRef) {
    for op in &page.ops {
        match op {
            Op::StrokeColor(color) => layer.set_outline_color(color.to_color()),
            Op::FillColor(color) => layer.set_fill_color(color.to_color()),
            Op::LineWidth(width) => layer.set_outline_thickness(*width as f32),
            Op::Dash(pattern) => {
                let dash = match pattern {
                    Some((on, off)) => LineDashPattern {
                        dash_1: Some(on.round() as i64),
                        gap_1: Some(off.round() as i64),
                        ..LineDashPattern::default()
                    },
                    None => LineDashPattern::default(),
                };
                layer.set_line_dash_pattern(dash);
            }
            Op::Stroke { points, closed } => layer.add_line(Line {
                points: path(points),
                is_closed: *closed,
            }),
            Op::Fill { points, outlined } => layer.add_polygon(Polygon {
                rings: vec![path(points)],
                mode: if *outlined {
                    PaintMode::FillStroke
                } else {
                    PaintMode::Fill
                },
                winding_order: WindingOrder::NonZero,
            }),
            Op::Circle { cx, cy, r } => layer.add_line(Line {
                points: calculate_points_for_circle(pt(*r), pt(*cx), pt(*cy)),
                is_closed: true,
            }),
            Op::Text {
                x,
                y,
                size,
                vertical: false,
                text,
            } => layer.use_text(text.as_str(), *size as f32, mm(*x), mm(*y), font),
            Op::Text {
                x,
                y,
                size,
                vertical: true,
                text,
            } => {
                layer.begin_text_section();
                layer.set_font(font, *size as f32);
                layer.set_text_matrix(TextMatrix::TranslateRotate(pt(*x), pt(*y), 90.0));
                layer.write_text(text.as_str(), font);
                layer.end_text_section();
            }
        }
    }
}

/// A document made of chart pages.
#[derive(Debug, Clone, Default)]
pub struct PdfDocument {
    title: String,
    pages: Vec<Page>,
}

impl PdfDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            pages: Vec::new(),
        }
    }

    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    #[cfg(test)]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serialize the document.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let (first, rest) = self
            .pages
            .split_first()
            .context("PDF document has no pages")?;

        let (document, page, layer) = printpdf::PdfDocument::new(
            self.title.as_str(),
            mm(first.width),
            mm(first.height),
            "Chart",
        );
        let font = document
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("Failed to load Helvetica: {}", e))?;

        render_page(&document.get_page(page).get_layer(layer), first, &font);
        for chart in rest {
            let (page, layer) = document.add_page(mm(chart.width), mm(chart.height), "Chart");
            render_page(&document.get_page(page).get_layer(layer), chart, &font);
        }

        document
            .save_to_bytes()
            .map_err(|e| anyhow!("Failed to serialize PDF: {}", e))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
    }
}
