use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ab_glyph::FontVec;
use anyhow::{anyhow, ensure, Context, Result};
use oddex_core::{Scene, Visual};
use tiny_skia::{
    Color, FilterQuality, IntSize, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke,
    Transform,
};

use crate::text::render_text_pixmap;
use crate::units::Units;

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
struct TextKey {
    content: String,
    size_px: u32,
    wrap_px: Option<u32>,
}

/// Software renderer: draws a `Scene` onto an offscreen pixmap and copies
/// it into the pixels frame buffer. Image stimuli are decoded once per
/// path; rendered text blocks are cached per content + size.
pub struct SceneRenderer {
    width: u32,
    height: u32,
    units: Units,
    font: FontVec,
    canvas: Pixmap,
    images: HashMap<PathBuf, Pixmap>,
    text_cache: HashMap<TextKey, Pixmap>,
}

impl SceneRenderer {
    pub fn new(width: u32, height: u32, font: FontVec) -> Result<Self> {
        let mut canvas =
            Pixmap::new(width, height).ok_or_else(|| anyhow!("zero-sized surface"))?;
        canvas.fill(Color::BLACK);
        Ok(Self {
            width,
            height,
            units: Units::new(width, height),
            font,
            canvas,
            images: HashMap::new(),
            text_cache: HashMap::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.width = width;
        self.height = height;
        self.units = Units::new(width, height);
        self.canvas = Pixmap::new(width, height).ok_or_else(|| anyhow!("zero-sized surface"))?;
        self.canvas.fill(Color::BLACK);
        // Text pixel sizes derive from the window height.
        self.text_cache.clear();
        Ok(())
    }

    pub fn units(&self) -> Units {
        self.units
    }

    /// Decode and cache an image stimulus ahead of its first onset.
    pub fn preload_image(&mut self, path: &Path) -> Result<()> {
        if self.images.contains_key(path) {
            return Ok(());
        }
        let decoded = image::open(path)
            .with_context(|| format!("loading stimulus image {}", path.display()))?
            .into_rgba8();
        let (w, h) = decoded.dimensions();
        let mut data = decoded.into_raw();
        premultiply_rgba(&mut data);
        let size = IntSize::from_wh(w, h).ok_or_else(|| anyhow!("empty image"))?;
        let pixmap = Pixmap::from_vec(data, size)
            .ok_or_else(|| anyhow!("image buffer size mismatch"))?;
        log::debug!("cached stimulus {} ({}x{})", path.display(), w, h);
        self.images.insert(path.to_path_buf(), pixmap);
        Ok(())
    }

    pub fn render(&mut self, scene: &Scene, frame_buffer: &mut [u8]) -> Result<()> {
        ensure!(
            frame_buffer.len() == (self.width * self.height * 4) as usize,
            "frame buffer does not match the surface size"
        );
        self.canvas.fill(Color::BLACK);

        for visual in scene.visuals() {
            match visual {
                Visual::Text {
                    content,
                    pos,
                    height,
                    wrap_width,
                } => self.draw_text(content, *pos, *height, *wrap_width),
                Visual::Image { path, pos, size } => self.draw_image(path, *pos, *size)?,
                Visual::Frame { pos, size, opacity } => {
                    let center = self.units.to_px(*pos);
                    let size_px = (self.units.len_px(size.0), self.units.len_px(size.1));
                    draw_frame(&mut self.canvas, center, size_px, *opacity);
                }
                Visual::Fixation { pos, size } => {
                    let center = self.units.to_px(*pos);
                    let extent = self.units.len_px(*size);
                    draw_fixation(&mut self.canvas, center, extent);
                }
            }
        }

        frame_buffer.copy_from_slice(self.canvas.data());
        Ok(())
    }

    fn draw_text(&mut self, content: &str, pos: (f32, f32), height: f32, wrap: Option<f32>) {
        let size_px = self.units.len_px(height);
        let wrap_px = wrap.map(|w| self.units.len_px(w));
        let key = TextKey {
            content: content.to_string(),
            size_px: size_px.round() as u32,
            wrap_px: wrap_px.map(|w| w.round() as u32),
        };
        let pm = self.text_cache.entry(key).or_insert_with(|| {
            render_text_pixmap(content, &self.font, size_px, wrap_px, Color::WHITE)
        });
        let center = self.units.to_px(pos);
        let x = center.0 - pm.width() as f32 * 0.5;
        let y = center.1 - pm.height() as f32 * 0.5;
        self.canvas.draw_pixmap(
            x.round() as i32,
            y.round() as i32,
            pm.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    fn draw_image(&mut self, path: &Path, pos: (f32, f32), size: (f32, f32)) -> Result<()> {
        self.preload_image(path)?;
        let pm = &self.images[path];
        let center = self.units.to_px(pos);
        let dw = self.units.len_px(size.0);
        let dh = self.units.len_px(size.1);
        let sx = dw / pm.width() as f32;
        let sy = dh / pm.height() as f32;
        let tx = center.0 - dw * 0.5;
        let ty = center.1 - dh * 0.5;
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        self.canvas.draw_pixmap(
            0,
            0,
            pm.as_ref(),
            &paint,
            Transform::from_row(sx, 0.0, 0.0, sy, tx, ty),
            None,
        );
        Ok(())
    }
}

/// Outline frame behind a stimulus: black fill, white 2 px border. An
/// opacity of zero hides the frame entirely (hover highlight off).
fn draw_frame(canvas: &mut Pixmap, center_px: (f32, f32), size_px: (f32, f32), opacity: f32) {
    if opacity <= 0.0 {
        return;
    }
    let Some(rect) = Rect::from_xywh(
        center_px.0 - size_px.0 * 0.5,
        center_px.1 - size_px.1 * 0.5,
        size_px.0,
        size_px.1,
    ) else {
        return;
    };

    let mut fill = Paint::default();
    fill.set_color(Color::from_rgba(0.0, 0.0, 0.0, opacity.clamp(0.0, 1.0)).unwrap_or(Color::BLACK));
    canvas.fill_rect(rect, &fill, Transform::identity(), None);

    let mut line = Paint::default();
    line.set_color(Color::from_rgba(1.0, 1.0, 1.0, opacity.clamp(0.0, 1.0)).unwrap_or(Color::WHITE));
    line.anti_alias = false;
    let path = PathBuilder::from_rect(rect);
    let stroke = Stroke {
        width: 2.0,
        ..Stroke::default()
    };
    canvas.stroke_path(&path, &line, &stroke, Transform::identity(), None);
}

/// White cross, 2 px bars spanning `extent_px` in both directions.
fn draw_fixation(canvas: &mut Pixmap, center_px: (f32, f32), extent_px: f32) {
    let mut paint = Paint::default();
    paint.anti_alias = false;
    paint.set_color(Color::WHITE);

    let half = extent_px * 0.5;
    if let Some(h) = Rect::from_xywh(center_px.0 - half, center_px.1 - 1.0, extent_px, 2.0) {
        canvas.fill_rect(h, &paint, Transform::identity(), None);
    }
    if let Some(v) = Rect::from_xywh(center_px.0 - 1.0, center_px.1 - half, 2.0, extent_px) {
        canvas.fill_rect(v, &paint, Transform::identity(), None);
    }
}

/// tiny-skia pixmaps are premultiplied; image decodes are straight RGBA.
fn premultiply_rgba(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        px[0] = ((px[0] as u16 * a) / 255) as u8;
        px[1] = ((px[1] as u16 * a) / 255) as u8;
        px[2] = ((px[2] as u16 * a) / 255) as u8;
    }
}
