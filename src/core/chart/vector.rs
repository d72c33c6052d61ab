//! Vector drawing backends.
//!
//! [`VectorBackend`] records the primitives plotters emits on the same pixel
//! grid as the raster export and converts them to points when the page is
//! encoded. Text is set in one of the PostScript base-14 fonts and measured
//! with a fixed advance, so the same chart always produces the same bytes.

use std::collections::BTreeSet;
use std::io;

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};
use plotters_backend::text_anchor::{HPos, VPos};
use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind,
    FontStyle, FontTransform,
};

/// Average glyph advance relative to the font size.
const GLYPH_ADVANCE: f64 = 0.5;
const CIRCLE_SEGMENTS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BaseFont {
    TimesRoman,
    TimesBold,
    Helvetica,
    HelveticaBold,
    Courier,
    CourierBold,
}

impl BaseFont {
    pub fn select(family: &str, bold: bool) -> Self {
        let family = family.to_ascii_lowercase();
        match (family.as_str(), bold) {
            ("monospace", false) => BaseFont::Courier,
            ("monospace", true) => BaseFont::CourierBold,
            (f, false) if f == "serif" || f.contains("times") => BaseFont::TimesRoman,
            (f, true) if f == "serif" || f.contains("times") => BaseFont::TimesBold,
            (_, false) => BaseFont::Helvetica,
            (_, true) => BaseFont::HelveticaBold,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BaseFont::TimesRoman => "Times-Roman",
            BaseFont::TimesBold => "Times-Bold",
            BaseFont::Helvetica => "Helvetica",
            BaseFont::HelveticaBold => "Helvetica-Bold",
            BaseFont::Courier => "Courier",
            BaseFont::CourierBold => "Courier-Bold",
        }
    }

    fn resource(&self) -> &'static str {
        match self {
            BaseFont::TimesRoman => "F1",
            BaseFont::TimesBold => "F2",
            BaseFont::Helvetica => "F3",
            BaseFont::HelveticaBold => "F4",
            BaseFont::Courier => "F5",
            BaseFont::CourierBold => "F6",
        }
    }
}

type Rgb = (u8, u8, u8);

/// A drawing primitive in page points, origin at the bottom left.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Stroke {
        points: Vec<(f64, f64)>,
        closed: bool,
        color: Rgb,
        width: f64,
    },
    Fill {
        points: Vec<(f64, f64)>,
        color: Rgb,
    },
    Text {
        text: String,
        at: (f64, f64),
        size: f64,
        /// Counter-clockwise, in degrees.
        angle: i32,
        font: BaseFont,
        color: Rgb,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub width: f64,
    pub height: f64,
    pub ops: Vec<Op>,
}

impl Page {
    fn fonts(&self) -> Vec<BaseFont> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { font, .. } => Some(*font),
                _ => None,
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Serializes a recorded page into a document format.
pub trait PageEncoder {
    fn encode(&self, page: &Page) -> Vec<u8>;
}

/// Fixed-precision number for document output.
fn num(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn unit(c: u8) -> f32 {
    c as f32 / 255.0
}

/// Restricts text to printable ASCII, which every base-14 font covers.
fn printable(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
        .collect()
}

pub struct EpsEncoder;

impl EpsEncoder {
    fn path(out: &mut String, points: &[(f64, f64)]) {
        out.push_str("newpath");
        for (i, (x, y)) in points.iter().enumerate() {
            let cmd = if i == 0 { "moveto" } else { "lineto" };
            out.push_str(&format!(" {} {} {}", num(*x), num(*y), cmd));
        }
    }

    fn color(out: &mut String, (r, g, b): Rgb) {
        out.push_str(&format!(
            "{} {} {} setrgbcolor\n",
            num(unit(r) as f64),
            num(unit(g) as f64),
            num(unit(b) as f64)
        ));
    }

    fn escape(text: &str) -> String {
        let mut s = String::with_capacity(text.len());
        for c in printable(text).chars() {
            if matches!(c, '(' | ')' | '\\') {
                s.push('\\');
            }
            s.push(c);
        }
        s
    }
}

impl PageEncoder for EpsEncoder {
    fn encode(&self, page: &Page) -> Vec<u8> {
        let mut out = String::new();
        out.push_str("%!PS-Adobe-3.0 EPSF-3.0\n");
        out.push_str(&format!(
            "%%BoundingBox: 0 0 {} {}\n",
            page.width.ceil() as i64,
            page.height.ceil() as i64
        ));
        out.push_str(&format!(
            "%%HiResBoundingBox: 0 0 {} {}\n",
            num(page.width),
            num(page.height)
        ));
        out.push_str("%%Creator: acplot\n%%Pages: 1\n%%EndComments\n");

        for op in &page.ops {
            match op {
                Op::Stroke {
                    points,
                    closed,
                    color,
                    width,
                } => {
                    Self::color(&mut out, *color);
                    out.push_str(&format!("{} setlinewidth\n", num(*width)));
                    Self::path(&mut out, points);
                    if *closed {
                        out.push_str(" closepath");
                    }
                    out.push_str(" stroke\n");
                }
                Op::Fill { points, color } => {
                    Self::color(&mut out, *color);
                    Self::path(&mut out, points);
                    out.push_str(" closepath fill\n");
                }
                Op::Text {
                    text,
                    at,
                    size,
                    angle,
                    font,
                    color,
                } => {
                    Self::color(&mut out, *color);
                    out.push_str(&format!(
                        "/{} findfont {} scalefont setfont\n",
                        font.name(),
                        num(*size)
                    ));
                    out.push_str(&format!(
                        "gsave {} {} translate {} rotate 0 0 moveto ({}) show grestore\n",
                        num(at.0),
                        num(at.1),
                        angle,
                        Self::escape(text)
                    ));
                }
            }
        }

        out.push_str("showpage\n%%EOF\n");
        out.into_bytes()
    }
}

pub struct PdfEncoder;

impl PdfEncoder {
    fn path(content: &mut Content, points: &[(f64, f64)]) {
        for (i, (x, y)) in points.iter().enumerate() {
            if i == 0 {
                content.move_to(*x as f32, *y as f32);
            } else {
                content.line_to(*x as f32, *y as f32);
            }
        }
    }
}

impl PageEncoder for PdfEncoder {
    fn encode(&self, page: &Page) -> Vec<u8> {
        let catalog_id = Ref::new(1);
        let tree_id = Ref::new(2);
        let page_id = Ref::new(3);
        let content_id = Ref::new(4);
        let fonts = page.fonts();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(tree_id);
        pdf.pages(tree_id).kids([page_id]).count(1);

        let mut pdf_page = pdf.page(page_id);
        pdf_page
            .media_box(Rect::new(0.0, 0.0, page.width as f32, page.height as f32))
            .parent(tree_id)
            .contents(content_id);
        let mut resources = pdf_page.resources();
        let mut font_dict = resources.fonts();
        for (i, font) in fonts.iter().enumerate() {
            font_dict.pair(Name(font.resource().as_bytes()), Ref::new(5 + i as i32));
        }
        font_dict.finish();
        resources.finish();
        pdf_page.finish();

        for (i, font) in fonts.iter().enumerate() {
            pdf.type1_font(Ref::new(5 + i as i32))
                .base_font(Name(font.name().as_bytes()));
        }

        let mut content = Content::new();
        for op in &page.ops {
            match op {
                Op::Stroke {
                    points,
                    closed,
                    color: (r, g, b),
                    width,
                } => {
                    content.set_stroke_rgb(unit(*r), unit(*g), unit(*b));
                    content.set_line_width(*width as f32);
                    Self::path(&mut content, points);
                    if *closed {
                        content.close_path();
                    }
                    content.stroke();
                }
                Op::Fill {
                    points,
                    color: (r, g, b),
                } => {
                    content.set_fill_rgb(unit(*r), unit(*g), unit(*b));
                    Self::path(&mut content, points);
                    content.close_path();
                    content.fill_nonzero();
                }
                Op::Text {
                    text,
                    at,
                    size,
                    angle,
                    font,
                    color: (r, g, b),
                } => {
                    let (sin, cos) = (*angle as f32).to_radians().sin_cos();
                    let text = printable(text);
                    content.set_fill_rgb(unit(*r), unit(*g), unit(*b));
                    content.begin_text();
                    content.set_font(Name(font.resource().as_bytes()), *size as f32);
                    content.set_text_matrix([cos, sin, -sin, cos, at.0 as f32, at.1 as f32]);
                    content.show(Str(text.as_bytes()));
                    content.end_text();
                }
            }
        }
        pdf.stream(content_id, &content.finish());
        pdf.finish()
    }
}

/// Records plotters primitives and encodes them into `out` on present.
pub struct VectorBackend<'a, E: PageEncoder> {
    size: (u32, u32),
    /// Points per pixel.
    scale: f64,
    page: Page,
    encoder: E,
    out: &'a mut Vec<u8>,
    saved: bool,
}

impl<'a> VectorBackend<'a, PdfEncoder> {
    pub fn pdf(out: &'a mut Vec<u8>, size: (u32, u32), dpi: u32) -> Self {
        Self::new(out, size, dpi, PdfEncoder)
    }
}

impl<'a> VectorBackend<'a, EpsEncoder> {
    pub fn eps(out: &'a mut Vec<u8>, size: (u32, u32), dpi: u32) -> Self {
        Self::new(out, size, dpi, EpsEncoder)
    }
}

impl<'a, E: PageEncoder> VectorBackend<'a, E> {
    pub fn new(out: &'a mut Vec<u8>, size: (u32, u32), dpi: u32, encoder: E) -> Self {
        let scale = 72.0 / dpi.max(1) as f64;
        Self {
            size,
            scale,
            page: Page {
                width: size.0 as f64 * scale,
                height: size.1 as f64 * scale,
                ops: Vec::new(),
            },
            encoder,
            out,
            saved: false,
        }
    }

    fn point(&self, (x, y): BackendCoord) -> (f64, f64) {
        (x as f64 * self.scale, (self.size.1 as f64 - y as f64) * self.scale)
    }

    fn push(&mut self, op: Op) {
        self.saved = false;
        self.page.ops.push(op);
    }

    fn stroke(&mut self, points: Vec<(f64, f64)>, closed: bool, color: BackendColor, width: u32) {
        if color.alpha == 0.0 || points.len() < 2 {
            return;
        }
        let width = width.max(1) as f64 * self.scale;
        self.push(Op::Stroke {
            points,
            closed,
            color: color.rgb,
            width,
        });
    }

    fn fill(&mut self, points: Vec<(f64, f64)>, color: BackendColor) {
        if color.alpha == 0.0 || points.len() < 3 {
            return;
        }
        self.push(Op::Fill {
            points,
            color: color.rgb,
        });
    }
}

fn text_extent(text: &str, size: f64) -> (f64, f64) {
    (text.chars().count() as f64 * size * GLYPH_ADVANCE, size)
}

impl<E: PageEncoder> DrawingBackend for VectorBackend<'_, E> {
    type ErrorType = io::Error;

    fn get_size(&self) -> (u32, u32) {
        self.size
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<io::Error>> {
        Ok(())
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<io::Error>> {
        if !self.saved {
            self.out.clear();
            self.out.extend(self.encoder.encode(&self.page));
            self.saved = true;
        }
        Ok(())
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<io::Error>> {
        let (x, y) = point;
        let corners = [(x, y), (x + 1, y), (x + 1, y + 1), (x, y + 1)];
        let points = corners.iter().map(|p| self.point(*p)).collect();
        self.fill(points, color);
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<io::Error>> {
        let points = vec![self.point(from), self.point(to)];
        self.stroke(points, false, style.color(), style.stroke_width());
        Ok(())
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<io::Error>> {
        let (x0, y0) = upper_left;
        let (x1, y1) = bottom_right;
        let corners = [(x0, y0), (x1, y0), (x1, y1), (x0, y1)];
        let points = corners.iter().map(|p| self.point(*p)).collect();
        if fill {
            self.fill(points, style.color());
        } else {
            self.stroke(points, true, style.color(), style.stroke_width());
        }
        Ok(())
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<io::Error>> {
        let points = path.into_iter().map(|p| self.point(p)).collect();
        self.stroke(points, false, style.color(), style.stroke_width());
        Ok(())
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<io::Error>> {
        let (cx, cy) = self.point(center);
        let r = radius as f64 * self.scale;
        let points = (0..CIRCLE_SEGMENTS)
            .map(|i| {
                let t = i as f64 * std::f64::consts::TAU / CIRCLE_SEGMENTS as f64;
                (cx + r * t.cos(), cy + r * t.sin())
            })
            .collect();
        if fill {
            self.fill(points, style.color());
        } else {
            self.stroke(points, true, style.color(), style.stroke_width());
        }
        Ok(())
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<io::Error>> {
        let points = vert.into_iter().map(|p| self.point(p)).collect();
        self.fill(points, style.color());
        Ok(())
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<io::Error>> {
        let color = style.color();
        if color.alpha == 0.0 || text.is_empty() {
            return Ok(());
        }
        let size = style.size();
        let (w, _) = text_extent(text, size);
        let anchor = style.anchor();

        // Offset from the anchor to the baseline start, before rotation
        let dx = match anchor.h_pos {
            HPos::Left => 0.0,
            HPos::Center => -w / 2.0,
            HPos::Right => -w,
        };
        let dy = match anchor.v_pos {
            VPos::Top => size * 0.8,
            VPos::Center => size * 0.3,
            VPos::Bottom => 0.0,
        };
        let ((dx, dy), angle) = match style.transform() {
            FontTransform::None => ((dx, dy), 0),
            FontTransform::Rotate90 => ((-dy, dx), -90),
            FontTransform::Rotate180 => ((-dx, -dy), 180),
            FontTransform::Rotate270 => ((dy, -dx), 90),
        };

        let x = pos.0 as f64 + dx;
        let y = pos.1 as f64 + dy;
        let font = BaseFont::select(
            style.family().as_str(),
            matches!(style.style(), FontStyle::Bold),
        );
        self.push(Op::Text {
            text: text.to_string(),
            at: (x * self.scale, (self.size.1 as f64 - y) * self.scale),
            size: size * self.scale,
            angle,
            font,
            color: color.rgb,
        });
        Ok(())
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<io::Error>> {
        let (w, h) = text_extent(text, style.size());
        Ok((w.ceil() as u32, h.ceil() as u32))
    }
}

impl<E: PageEncoder> Drop for VectorBackend<'_, E> {
    fn drop(&mut self) {
        if !self.saved {
            let _ = self.present();
        }
    }
}
