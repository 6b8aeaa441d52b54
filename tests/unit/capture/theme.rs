use super::*;

#[test]
fn names_parse_back() {
    for theme in Theme::ALL {
        assert_eq!(theme.name().parse::<Theme>().unwrap(), theme);
        assert_eq!(theme.slug().parse::<Theme>().unwrap(), theme);
    }
}

#[test]
fn parse_is_case_insensitive() {
    assert_eq!("vs code dark".parse::<Theme>().unwrap(), Theme::VsCodeDark);
    assert_eq!("SYNTHWAVE-84".parse::<Theme>().unwrap(), Theme::Synthwave84);
    assert_eq!("gruvbox_light".parse::<Theme>().unwrap(), Theme::GruvboxLight);
    assert!(matches!(
        "Monokai Pro".parse::<Theme>(),
        Err(PlaybackError::Input(_))
    ));
}

#[test]
fn default_palette_matches_capture_colors() {
    let p = Theme::default().palette();
    assert_eq!(p.background, Rgba8::hex(0x1e1e1e));
    assert_eq!(p.gutter, Rgba8::hex(0x252526));
    assert_eq!(p.line_number, Rgba8::hex(0x858585));
    assert_eq!(p.color_for(TokenKind::Keyword), Rgba8::hex(0xc678dd));
    assert_eq!(p.color_for(TokenKind::Whitespace), p.text);
}

#[test]
fn every_theme_has_a_distinct_background_from_its_text() {
    for theme in Theme::ALL {
        let p = theme.palette();
        assert_ne!(p.background, p.text, "{theme}");
    }
}
