//! CPU rasterization of the displayed prefix onto a fixed code canvas.

use std::borrow::Cow;
use std::ops::Range;
use std::path::PathBuf;

use kurbo::{Affine, Rect};

use crate::capture::frame::FrameRGBA;
use crate::capture::theme::{Palette, Theme};
use crate::capture::tokenize::classify_line;
use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{PlaybackError, PlaybackResult};

/// Common monospace font locations probed by [`FontChoice::Auto`].
pub const SYSTEM_MONOSPACE_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/firacode/FiraCode-Regular.ttf",
    "/usr/share/fonts/truetype/jetbrains-mono/JetBrainsMono-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
    "/System/Library/Fonts/Menlo.ttc",
    "/System/Library/Fonts/Monaco.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
    "C:\\Windows\\Fonts\\cour.ttf",
];

/// Width of the block cursor in logical pixels.
const CURSOR_WIDTH: f64 = 3.0;
/// Nominal advance used to place the cursor when no font is loaded.
const FALLBACK_ADVANCE_EM: f64 = 0.6;

/// Where glyph outlines come from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FontChoice {
    /// First existing entry of [`SYSTEM_MONOSPACE_FONTS`].
    #[default]
    Auto,
    /// A specific font file.
    Path(PathBuf),
    /// Render without glyphs.
    Disabled,
}

impl FontChoice {
    fn load(&self) -> PlaybackResult<Option<Vec<u8>>> {
        match self {
            FontChoice::Disabled => Ok(None),
            FontChoice::Path(p) => std::fs::read(p).map(Some).map_err(|e| {
                PlaybackError::input(format!("read font '{}': {e}", p.display()))
            }),
            FontChoice::Auto => Ok(SYSTEM_MONOSPACE_FONTS
                .iter()
                .find_map(|p| std::fs::read(p).ok())),
        }
    }
}

/// Canvas geometry for captured frames, in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptureConfig {
    pub canvas: Canvas,
    /// Integer pixel-density multiplier applied to the whole canvas.
    pub scale: u32,
    pub font_size: f32,
    pub line_height: f32,
    pub padding: f32,
    pub gutter_width: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 1920,
                height: 1080,
            },
            scale: 3,
            font_size: 24.0,
            line_height: 36.0,
            padding: 30.0,
            gutter_width: 90.0,
        }
    }
}

impl CaptureConfig {
    pub fn validate(&self) -> PlaybackResult<()> {
        if self.scale == 0 {
            return Err(PlaybackError::input("capture scale must be >= 1"));
        }
        self.canvas.scaled(self.scale)?;
        for (name, v) in [
            ("font_size", self.font_size),
            ("line_height", self.line_height),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(PlaybackError::input(format!("{name} must be finite and > 0")));
            }
        }
        for (name, v) in [("padding", self.padding), ("gutter_width", self.gutter_width)] {
            if !v.is_finite() || v < 0.0 {
                return Err(PlaybackError::input(format!("{name} must be finite and >= 0")));
            }
        }
        if self.visible_capacity() == 0 {
            return Err(PlaybackError::input(
                "canvas height leaves no room for a single line",
            ));
        }
        Ok(())
    }

    /// Number of whole lines that fit between the top and bottom padding.
    pub fn visible_capacity(&self) -> usize {
        let usable = self.canvas.height as f32 - 2.0 * self.padding;
        if usable <= 0.0 {
            return 0;
        }
        (usable / self.line_height).floor() as usize
    }
}

/// Lines shown for a text of `total` lines on a canvas holding `capacity` lines.
///
/// Short texts start at the top. Longer ones anchor at 80% of the text and keep 70% of the
/// capacity above the anchor.
pub fn visible_window(total: usize, capacity: usize) -> Range<usize> {
    let start = if total > capacity {
        let anchor = (total - 1).min(total * 4 / 5);
        anchor.saturating_sub(capacity * 7 / 10)
    } else {
        0
    };
    start..total.min(start + capacity)
}

/// Parley layout engine with a single registered monospace family.
struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
    family: String,
    font: vello_cpu::peniko::FontData,
}

impl TextLayoutEngine {
    fn new(font_bytes: Vec<u8>) -> PlaybackResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| PlaybackError::input("no font families registered from font bytes"))?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| PlaybackError::input("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0),
        })
    }

    /// Lays out one line, coloring each byte range with its own brush.
    fn layout_runs(
        &mut self,
        text: &str,
        size_px: f32,
        default_brush: Rgba8,
        runs: &[(Range<usize>, Rgba8)],
    ) -> parley::Layout<Rgba8> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(default_brush));
        for (range, brush) in runs {
            builder.push(parley::style::StyleProperty::Brush(*brush), range.clone());
        }

        let mut layout: parley::Layout<Rgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

/// Draws code frames with a fixed theme, font and geometry.
pub struct Rasterizer {
    config: CaptureConfig,
    theme: Theme,
    text: Option<TextLayoutEngine>,
    width: u16,
    height: u16,
    ctx: Option<vello_cpu::RenderContext>,
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("config", &self.config)
            .field("theme", &self.theme)
            .field("font", &self.text.as_ref().map(|t| t.family.as_str()))
            .finish()
    }
}

impl Rasterizer {
    pub fn new(config: CaptureConfig, theme: Theme, font: &FontChoice) -> PlaybackResult<Self> {
        config.validate()?;
        let (width, height) = config.canvas.scaled(config.scale)?;

        let text = match font.load()? {
            Some(bytes) => Some(TextLayoutEngine::new(bytes)?),
            None => {
                if *font != FontChoice::Disabled {
                    tracing::warn!("no monospace font found; frames will be rendered without text");
                }
                None
            }
        };

        Ok(Self {
            config,
            theme,
            text,
            width,
            height,
            ctx: None,
        })
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn has_font(&self) -> bool {
        self.text.is_some()
    }

    /// Physical output size in pixels.
    pub fn output_size(&self) -> (u32, u32) {
        (u32::from(self.width), u32::from(self.height))
    }

    /// Rasterizes `displayed`; `complete` adds the end-of-text cursor.
    #[tracing::instrument(skip(self, displayed), fields(chars = displayed.len()))]
    pub fn render(
        &mut self,
        displayed: &str,
        complete: bool,
        language: &str,
    ) -> PlaybackResult<FrameRGBA> {
        let palette = *self.theme.palette();
        let cfg = self.config;
        let scale = Affine::scale(f64::from(cfg.scale));

        let mut ctx = match self.ctx.take() {
            Some(ctx) => ctx,
            None => vello_cpu::RenderContext::new(self.width, self.height),
        };
        ctx.reset();

        ctx.set_transform(affine_to_cpu(scale));
        set_color(&mut ctx, palette.background);
        ctx.fill_rect(&rect_to_cpu(Rect::new(
            0.0,
            0.0,
            f64::from(cfg.canvas.width),
            f64::from(cfg.canvas.height),
        )));

        let lines: Vec<&str> = displayed.split('\n').collect();
        let window = visible_window(lines.len(), cfg.visible_capacity());
        let lh = f64::from(cfg.line_height);
        let pad = f64::from(cfg.padding);
        let gutter = f64::from(cfg.gutter_width);

        for (row, i) in window.clone().enumerate() {
            let y = pad + row as f64 * lh;

            set_color(&mut ctx, palette.gutter);
            ctx.fill_rect(&rect_to_cpu(Rect::new(0.0, y - 2.0, gutter, y - 2.0 + lh)));

            let number = format!("{:>3}", i + 1);
            self.draw_line(&mut ctx, &number, &[], palette.line_number, (pad, y), scale);

            let line = lines[i];
            if line.trim().is_empty() {
                continue;
            }
            let runs = token_runs(line, language, &palette);
            self.draw_line(&mut ctx, line, &runs, palette.text, (gutter, y), scale);
        }

        if complete
            && let Some(last) = lines.len().checked_sub(1)
            && window.contains(&last)
        {
            let row = (last - window.start) as f64;
            let x = gutter + self.advance(lines[last]) + 2.0;
            let y = pad + row * lh;
            ctx.set_transform(affine_to_cpu(scale));
            set_color(&mut ctx, palette.cursor);
            ctx.fill_rect(&rect_to_cpu(Rect::new(x, y, x + CURSOR_WIDTH, y + lh - 6.0)));
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);

        Ok(FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn draw_line(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        runs: &[(Range<usize>, Rgba8)],
        default_brush: Rgba8,
        origin: (f64, f64),
        scale: Affine,
    ) {
        let Some(engine) = self.text.as_mut() else {
            return;
        };
        let layout = engine.layout_runs(text, self.config.font_size, default_brush, runs);
        ctx.set_transform(affine_to_cpu(scale * Affine::translate(origin)));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&engine.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }

    /// Horizontal advance of `text` in logical pixels.
    fn advance(&mut self, text: &str) -> f64 {
        match self.text.as_mut() {
            Some(engine) => {
                let size = self.config.font_size;
                f64::from(engine.layout_runs(text, size, Rgba8::default(), &[]).full_width())
            }
            None => {
                text.chars().count() as f64 * f64::from(self.config.font_size) * FALLBACK_ADVANCE_EM
            }
        }
    }
}

/// Byte ranges of `line` paired with the palette color of their token class.
fn token_runs(line: &str, language: &str, palette: &Palette) -> Vec<(Range<usize>, Rgba8)> {
    let mut at = 0usize;
    classify_line(line, language)
        .into_iter()
        .map(|(tok, kind)| {
            let range = at..at + tok.len();
            at = range.end;
            (range, palette.color_for(kind))
        })
        .collect()
}

fn set_color(ctx: &mut vello_cpu::RenderContext, c: Rgba8) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

#[cfg(test)]
#[path = "../../tests/unit/capture/raster.rs"]
mod tests;
