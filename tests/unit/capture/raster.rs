use super::*;

fn small_config() -> CaptureConfig {
    CaptureConfig {
        canvas: Canvas {
            width: 200,
            height: 120,
        },
        scale: 1,
        font_size: 12.0,
        line_height: 20.0,
        padding: 10.0,
        gutter_width: 30.0,
    }
}

fn pixel(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

#[test]
fn default_config_is_full_hd_at_triple_density() {
    let cfg = CaptureConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.canvas.scaled(cfg.scale).unwrap(), (5760, 3240));
    assert_eq!(cfg.visible_capacity(), 28);
}

#[test]
fn validate_rejects_degenerate_geometry() {
    let mut cfg = small_config();
    cfg.scale = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = small_config();
    cfg.padding = 60.0;
    assert!(cfg.validate().is_err());

    let mut cfg = small_config();
    cfg.line_height = f32::NAN;
    assert!(cfg.validate().is_err());
}

#[test]
fn window_follows_the_tail_of_long_text() {
    assert_eq!(visible_window(10, 27), 0..10);
    assert_eq!(visible_window(27, 27), 0..27);
    assert_eq!(visible_window(28, 27), 4..28);
    assert_eq!(visible_window(100, 27), 62..89);
    assert_eq!(visible_window(1, 1), 0..1);
    assert_eq!(visible_window(0, 5), 0..0);
}

#[test]
fn frame_paints_background_and_gutter() {
    let mut r = Rasterizer::new(small_config(), Theme::VsCodeDark, &FontChoice::Disabled).unwrap();
    assert!(!r.has_font());
    let frame = r.render("let a = 1;", false, "javascript").unwrap();

    assert_eq!(r.output_size(), (200, 120));
    assert_eq!(frame.data.len(), 200 * 120 * 4);
    assert_eq!(pixel(&frame, 199, 119), Rgba8::hex(0x1e1e1e).to_array());
    assert_eq!(pixel(&frame, 5, 12), Rgba8::hex(0x252526).to_array());
    // Second line does not exist, so its gutter band is not drawn.
    assert_eq!(pixel(&frame, 5, 40), Rgba8::hex(0x1e1e1e).to_array());
}

#[test]
fn cursor_only_when_complete() {
    let mut r = Rasterizer::new(small_config(), Theme::VsCodeDark, &FontChoice::Disabled).unwrap();
    let cursor = Rgba8::hex(0xabb2bf).to_array();

    let partial = r.render("ab", false, "javascript").unwrap();
    assert_eq!(pixel(&partial, 47, 15), Rgba8::hex(0x1e1e1e).to_array());

    let done = r.render("ab", true, "javascript").unwrap();
    assert_eq!(pixel(&done, 47, 15), cursor);
}

#[test]
fn theme_switch_changes_background() {
    let mut r = Rasterizer::new(small_config(), Theme::VsCodeDark, &FontChoice::Disabled).unwrap();
    r.set_theme(Theme::SolarizedLight);
    let frame = r.render("x", false, "plaintext").unwrap();
    assert_eq!(pixel(&frame, 150, 100), Rgba8::hex(0xfdf6e3).to_array());
}

#[test]
fn scale_multiplies_output() {
    let mut cfg = small_config();
    cfg.scale = 2;
    let mut r = Rasterizer::new(cfg, Theme::Nord, &FontChoice::Disabled).unwrap();
    let frame = r.render("x", true, "plaintext").unwrap();
    assert_eq!((frame.width, frame.height), (400, 240));
    assert_eq!(pixel(&frame, 10, 24), Rgba8::hex(0x3b4252).to_array());
}

#[test]
fn missing_font_path_is_an_input_error() {
    let choice = FontChoice::Path("/definitely/not/here.ttf".into());
    assert!(matches!(
        Rasterizer::new(small_config(), Theme::default(), &choice),
        Err(PlaybackError::Input(_))
    ));
}

#[test]
fn token_runs_cover_the_line() {
    let palette = Theme::VsCodeDark.palette();
    let line = "const x = foo(1);";
    let runs = token_runs(line, "javascript", palette);
    assert_eq!(runs.first().unwrap().0.start, 0);
    assert_eq!(runs.last().unwrap().0.end, line.len());
    assert!(runs.windows(2).all(|w| w[0].0.end == w[1].0.start));
    assert_eq!(runs[0].1, palette.keyword);
}
