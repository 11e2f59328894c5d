use ab_glyph::{point, Font, FontVec, Glyph, PxScale, ScaleFont};
use tiny_skia::{Color, Pixmap, PremultipliedColorU8};

/// Rasterize a block of instruction text into a transparent pixmap.
/// Paragraphs split on '\n'; within a paragraph, words wrap greedily at
/// `wrap_width_px`. Lines are centered, matching the original text stimuli.
pub fn render_text_pixmap(
    text: &str,
    font: &FontVec,
    px_size: f32,
    wrap_width_px: Option<f32>,
    color: Color,
) -> Pixmap {
    let scale = PxScale::from(px_size);
    let sf = font.as_scaled(scale);
    let line_height = sf.ascent() - sf.descent() + sf.line_gap();

    let lines = wrap_lines(text, |l| line_width(l, &sf), wrap_width_px);
    let widths: Vec<f32> = lines.iter().map(|l| line_width(l, &sf)).collect();
    let block_width = widths.iter().cloned().fold(0.0_f32, f32::max);

    if lines.is_empty() || block_width <= 0.0 {
        return Pixmap::new(1, 1).expect("pixmap");
    }

    let w = block_width.ceil().max(1.0) as u32;
    let h = (lines.len() as f32 * line_height).ceil().max(1.0) as u32;
    let mut pm = Pixmap::new(w, h).expect("pixmap");

    // Lay out every glyph with its baseline inside the block.
    let mut glyphs = Vec::<Glyph>::new();
    for (i, line) in lines.iter().enumerate() {
        let mut pen_x = (block_width - widths[i]) * 0.5;
        let baseline = sf.ascent() + i as f32 * line_height;
        let mut prev = None;
        for ch in line.chars() {
            let id = font.glyph_id(ch);
            if let Some(p) = prev {
                pen_x += sf.kern(p, id);
            }
            glyphs.push(Glyph {
                id,
                scale,
                position: point(pen_x, baseline),
            });
            pen_x += sf.h_advance(id);
            prev = Some(id);
        }
    }

    // Rasterize with premultiplied alpha, coverage-weighted.
    let cu = [
        (color.red() * 255.0) as u8,
        (color.green() * 255.0) as u8,
        (color.blue() * 255.0) as u8,
        (color.alpha() * 255.0) as u8,
    ];
    let stride = pm.width() as usize;
    let dst = pm.pixels_mut();
    for g in glyphs {
        if let Some(out) = font.outline_glyph(g) {
            let b = out.px_bounds();
            out.draw(|x, y, cov| {
                if cov <= f32::EPSILON {
                    return;
                }
                let ix = x as i32 + b.min.x as i32;
                let iy = y as i32 + b.min.y as i32;
                if ix < 0 || iy < 0 || ix >= w as i32 || iy >= h as i32 {
                    return;
                }
                let i = iy as usize * stride + ix as usize;
                let a = (cov * cu[3] as f32 / 255.0).clamp(0.0, 1.0);
                let px = PremultipliedColorU8::from_rgba(
                    (cu[0] as f32 * a) as u8,
                    (cu[1] as f32 * a) as u8,
                    (cu[2] as f32 * a) as u8,
                    (a * 255.0) as u8,
                );
                if let Some(px) = px {
                    // Overlaps only occur at hinted glyph edges; keep the
                    // denser coverage.
                    if px.alpha() > dst[i].alpha() {
                        dst[i] = px;
                    }
                }
            });
        }
    }

    pm
}

fn line_width<SF: ScaleFont<F>, F: Font>(line: &str, sf: &SF) -> f32 {
    let mut width = 0.0;
    let mut prev = None;
    for ch in line.chars() {
        let id = sf.font().glyph_id(ch);
        if let Some(p) = prev {
            width += sf.kern(p, id);
        }
        width += sf.h_advance(id);
        prev = Some(id);
    }
    width
}

/// Greedy word wrap over an arbitrary width metric. '\n' always breaks;
/// blank source lines survive as blank output lines.
fn wrap_lines(
    text: &str,
    measure: impl Fn(&str) -> f32,
    wrap_width_px: Option<f32>,
) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        let Some(limit) = wrap_width_px else {
            lines.push(paragraph.to_string());
            continue;
        };
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if !current.is_empty() && measure(&candidate) > limit {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            } else {
                current = candidate;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}
