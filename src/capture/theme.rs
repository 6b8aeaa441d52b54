use crate::capture::tokenize::TokenKind;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{PlaybackError, PlaybackResult};

/// Static color table for one theme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Canvas background.
    pub background: Rgba8,
    /// Line-number gutter band.
    pub gutter: Rgba8,
    /// Line numbers.
    pub line_number: Rgba8,
    /// Default token color, also used for whitespace.
    pub text: Rgba8,
    /// Keywords.
    pub keyword: Rgba8,
    /// String literals.
    pub string: Rgba8,
    /// Comments.
    pub comment: Rgba8,
    /// Numeric literals.
    pub number: Rgba8,
    /// Call-like tokens (`name(`).
    pub function: Rgba8,
    /// HTML attributes.
    pub attribute: Rgba8,
    /// CSS properties.
    pub property: Rgba8,
    /// Operators.
    pub operator: Rgba8,
    /// Brackets and separators.
    pub punctuation: Rgba8,
    /// Block cursor drawn once the reveal is complete.
    pub cursor: Rgba8,
}

impl Palette {
    /// Color for a classified token.
    pub fn color_for(&self, kind: TokenKind) -> Rgba8 {
        match kind {
            TokenKind::Keyword => self.keyword,
            TokenKind::String => self.string,
            TokenKind::Comment => self.comment,
            TokenKind::Number => self.number,
            TokenKind::Function => self.function,
            TokenKind::Attribute => self.attribute,
            TokenKind::Property => self.property,
            TokenKind::Operator => self.operator,
            TokenKind::Punctuation => self.punctuation,
            TokenKind::Whitespace | TokenKind::Plain => self.text,
        }
    }
}

macro_rules! palette {
    (
        $bg:literal, $gutter:literal, $ln:literal, $text:literal, $kw:literal, $str:literal,
        $cm:literal, $num:literal, $func:literal, $attr:literal, $prop:literal, $op:literal,
        $punct:literal, $cursor:literal
    ) => {
        Palette {
            background: Rgba8::hex($bg),
            gutter: Rgba8::hex($gutter),
            line_number: Rgba8::hex($ln),
            text: Rgba8::hex($text),
            keyword: Rgba8::hex($kw),
            string: Rgba8::hex($str),
            comment: Rgba8::hex($cm),
            number: Rgba8::hex($num),
            function: Rgba8::hex($func),
            attribute: Rgba8::hex($attr),
            property: Rgba8::hex($prop),
            operator: Rgba8::hex($op),
            punctuation: Rgba8::hex($punct),
            cursor: Rgba8::hex($cursor),
        }
    };
}

// bg, gutter, line no, text, keyword, string, comment, number, function, attribute, property,
// operator, punctuation, cursor
const VS_CODE_DARK: Palette = palette!(
    0x1e1e1e, 0x252526, 0x858585, 0xabb2bf, 0xc678dd, 0x98c379, 0x5c6370, 0xd19a66, 0x61afef,
    0xe06c75, 0x56b6c2, 0x56b6c2, 0xabb2bf, 0xabb2bf
);
const ONE_DARK: Palette = palette!(
    0x282c34, 0x21252b, 0x636d83, 0xabb2bf, 0xc678dd, 0x98c379, 0x5c6370, 0xd19a66, 0x61afef,
    0xd19a66, 0xe06c75, 0x56b6c2, 0xabb2bf, 0x528bff
);
const MATERIAL_DARK: Palette = palette!(
    0x2f2f2f, 0x262626, 0x616161, 0xeeffff, 0xc792ea, 0xc3e88d, 0x616161, 0xfd9170, 0x82aaff,
    0xffcb6b, 0x80cbc4, 0x89ddff, 0x89ddff, 0xffcc00
);
const MATERIAL_LIGHT: Palette = palette!(
    0xfafafa, 0xf0f0f0, 0x90a4ae, 0x546e7a, 0x7c4dff, 0x91b859, 0xaabfc9, 0xf76d47, 0x6182b8,
    0xffb62c, 0x39adb5, 0x39adb5, 0x39adb5, 0x272727
);
const DRACULA: Palette = palette!(
    0x282a36, 0x21222c, 0x6272a4, 0xf8f8f2, 0xff79c6, 0xf1fa8c, 0x6272a4, 0xbd93f9, 0x50fa7b,
    0x50fa7b, 0x8be9fd, 0xff79c6, 0xf8f8f2, 0xf8f8f2
);
const ATOM_DARK: Palette = palette!(
    0x1d1f21, 0x171819, 0x7c7c7c, 0xc5c8c6, 0x96cbfe, 0xa8ff60, 0x7c7c7c, 0xff73fd, 0xdad085,
    0x99cc99, 0xffffb6, 0xededed, 0xc5c8c6, 0xc5c8c6
);
const TOMORROW: Palette = palette!(
    0x2d2d2d, 0x262626, 0x999999, 0xcccccc, 0xcc99cd, 0x7ec699, 0x999999, 0xf08d49, 0xf08d49,
    0xe2777a, 0xf8c555, 0x67cdcc, 0xcccccc, 0xcccccc
);
const TWILIGHT: Palette = palette!(
    0x141414, 0x0f0f0f, 0x777777, 0xf8f8f8, 0xcda869, 0x8f9d6a, 0x5f5a60, 0xcf6a4c, 0x9b703f,
    0xf9ee98, 0x7587a6, 0xcda869, 0xf8f8f8, 0xa7a7a7
);
const SOLARIZED_LIGHT: Palette = palette!(
    0xfdf6e3, 0xeee8d5, 0x93a1a1, 0x657b83, 0x859900, 0x2aa198, 0x93a1a1, 0xd33682, 0xb58900,
    0x268bd2, 0xcb4b16, 0x6c71c4, 0x586e75, 0x657b83
);
const SOLARIZED_DARK: Palette = palette!(
    0x002b36, 0x073642, 0x586e75, 0x839496, 0x859900, 0x2aa198, 0x586e75, 0xd33682, 0xb58900,
    0x268bd2, 0xcb4b16, 0x6c71c4, 0x93a1a1, 0x839496
);
const OKAIDIA: Palette = palette!(
    0x272822, 0x1e1f1c, 0x75715e, 0xf8f8f2, 0x66d9ef, 0xa6e22e, 0x8292a2, 0xae81ff, 0xe6db74,
    0xa6e22e, 0xf92672, 0xf92672, 0xf8f8f2, 0xf8f8f0
);
const NORD: Palette = palette!(
    0x2e3440, 0x3b4252, 0x4c566a, 0xd8dee9, 0x81a1c1, 0xa3be8c, 0x636f88, 0xb48ead, 0x88c0d0,
    0xa3be8c, 0x81a1c1, 0x81a1c1, 0x81a1c1, 0xd8dee9
);
const COLDARK_DARK: Palette = palette!(
    0x111b27, 0x0b121b, 0x8da1b9, 0xe3eaf2, 0xe9ae7e, 0x91d076, 0x8da1b9, 0xe6d37a, 0xc699e3,
    0xe6d37a, 0x66cccc, 0xe9ae7e, 0xe3eaf2, 0xe3eaf2
);
const COLDARK_COLD: Palette = palette!(
    0xe3eaf2, 0xd6dde6, 0x3c526d, 0x111b27, 0xa04900, 0x116b00, 0x3c526d, 0x755f00, 0x7c00aa,
    0x755f00, 0x006d6d, 0xa04900, 0x111b27, 0x111b27
);
const GRUVBOX_DARK: Palette = palette!(
    0x1d2021, 0x282828, 0xa89984, 0xebdbb2, 0xfa5c4b, 0xb8bb26, 0xa89984, 0xd3869b, 0xfabd2f,
    0xfabd2f, 0x83a598, 0xa89984, 0xa89984, 0xebdbb2
);
const GRUVBOX_LIGHT: Palette = palette!(
    0xf9f5d7, 0xf2e5bc, 0x7c6f64, 0x3c3836, 0x9d0006, 0x797403, 0x7c6f64, 0x8f3f71, 0xb57614,
    0xb57614, 0x076678, 0x7c6f64, 0x7c6f64, 0x3c3836
);
const HOPSCOTCH: Palette = palette!(
    0x322931, 0x433b42, 0x797379, 0xffffff, 0xc85e7c, 0x8fc13e, 0x797379, 0xfd8b19, 0x1290bf,
    0xfdcc59, 0x149b93, 0x149b93, 0xffffff, 0xffffff
);
const POJOAQUE: Palette = palette!(
    0x181914, 0x12130f, 0x586e75, 0xdccf8f, 0xb64926, 0x468966, 0x586e75, 0xb89859, 0xffb03b,
    0xb89859, 0xb0813a, 0xdccf8f, 0xdccf8f, 0xdccf8f
);
const SYNTHWAVE_84: Palette = palette!(
    0x262335, 0x241b2f, 0x848bbd, 0xfdfdfd, 0xfede5d, 0xff8b39, 0x8e8e8e, 0xf97e72, 0x36f9f6,
    0xfede5d, 0x72f1b8, 0x36f9f6, 0xcccccc, 0xf92aad
);
const VS: Palette = palette!(
    0xffffff, 0xf3f3f3, 0x2b91af, 0x393a34, 0x0000ff, 0xa31515, 0x008000, 0x36acaa, 0x795e26,
    0xff0000, 0xff0000, 0x393a34, 0x393a34, 0x000000
);
const XONOKAI: Palette = palette!(
    0x2a2a2a, 0x232323, 0x6f705e, 0x76d9e6, 0xef3b7d, 0xe6d06c, 0x6f705e, 0xa77afe, 0xa6e22e,
    0xe6d06c, 0x76d9e6, 0xf8f8f2, 0xbebec5, 0xf8f8f2
);

/// Supported color themes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    /// VS Code Dark+.
    #[default]
    VsCodeDark,
    /// Atom One Dark.
    OneDark,
    /// Material Dark.
    MaterialDark,
    /// Material Light.
    MaterialLight,
    /// Dracula.
    Dracula,
    /// Atom Dark.
    AtomDark,
    /// Tomorrow Night.
    Tomorrow,
    /// Twilight.
    Twilight,
    /// Solarized Light.
    SolarizedLight,
    /// Solarized Dark.
    SolarizedDark,
    /// Okaidia.
    Okaidia,
    /// Nord.
    Nord,
    /// Coldark Dark.
    ColdarkDark,
    /// Coldark Cold.
    ColdarkCold,
    /// Gruvbox Dark.
    GruvboxDark,
    /// Gruvbox Light.
    GruvboxLight,
    /// Hopscotch.
    Hopscotch,
    /// Pojoaque.
    Pojoaque,
    /// Synthwave '84.
    Synthwave84,
    /// Visual Studio light.
    Vs,
    /// Xonokai.
    Xonokai,
}

impl Theme {
    /// Every theme, in menu order.
    pub const ALL: [Theme; 21] = [
        Theme::VsCodeDark,
        Theme::OneDark,
        Theme::MaterialDark,
        Theme::MaterialLight,
        Theme::Dracula,
        Theme::AtomDark,
        Theme::Tomorrow,
        Theme::Twilight,
        Theme::SolarizedLight,
        Theme::SolarizedDark,
        Theme::Okaidia,
        Theme::Nord,
        Theme::ColdarkDark,
        Theme::ColdarkCold,
        Theme::GruvboxDark,
        Theme::GruvboxLight,
        Theme::Hopscotch,
        Theme::Pojoaque,
        Theme::Synthwave84,
        Theme::Vs,
        Theme::Xonokai,
    ];

    /// Human-readable name, also the persisted form.
    pub fn name(self) -> &'static str {
        match self {
            Theme::VsCodeDark => "VS Code Dark",
            Theme::OneDark => "One Dark",
            Theme::MaterialDark => "Material Dark",
            Theme::MaterialLight => "Material Light",
            Theme::Dracula => "Dracula",
            Theme::AtomDark => "Atom Dark",
            Theme::Tomorrow => "Tomorrow",
            Theme::Twilight => "Twilight",
            Theme::SolarizedLight => "Solarized Light",
            Theme::SolarizedDark => "Solarized Dark",
            Theme::Okaidia => "Okaidia",
            Theme::Nord => "Nord",
            Theme::ColdarkDark => "Coldark Dark",
            Theme::ColdarkCold => "Coldark Cold",
            Theme::GruvboxDark => "Gruvbox Dark",
            Theme::GruvboxLight => "Gruvbox Light",
            Theme::Hopscotch => "Hopscotch",
            Theme::Pojoaque => "Pojoaque",
            Theme::Synthwave84 => "Synthwave 84",
            Theme::Vs => "VS",
            Theme::Xonokai => "Xonokai",
        }
    }

    /// Command-line friendly name, e.g. `vs-code-dark`.
    pub fn slug(self) -> String {
        self.name().to_ascii_lowercase().replace(' ', "-")
    }

    /// Static color table.
    pub fn palette(self) -> &'static Palette {
        match self {
            Theme::VsCodeDark => &VS_CODE_DARK,
            Theme::OneDark => &ONE_DARK,
            Theme::MaterialDark => &MATERIAL_DARK,
            Theme::MaterialLight => &MATERIAL_LIGHT,
            Theme::Dracula => &DRACULA,
            Theme::AtomDark => &ATOM_DARK,
            Theme::Tomorrow => &TOMORROW,
            Theme::Twilight => &TWILIGHT,
            Theme::SolarizedLight => &SOLARIZED_LIGHT,
            Theme::SolarizedDark => &SOLARIZED_DARK,
            Theme::Okaidia => &OKAIDIA,
            Theme::Nord => &NORD,
            Theme::ColdarkDark => &COLDARK_DARK,
            Theme::ColdarkCold => &COLDARK_COLD,
            Theme::GruvboxDark => &GRUVBOX_DARK,
            Theme::GruvboxLight => &GRUVBOX_LIGHT,
            Theme::Hopscotch => &HOPSCOTCH,
            Theme::Pojoaque => &POJOAQUE,
            Theme::Synthwave84 => &SYNTHWAVE_84,
            Theme::Vs => &VS,
            Theme::Xonokai => &XONOKAI,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Theme {
    type Err = PlaybackError;

    /// Accepts the display name or the slug, case-insensitively.
    fn from_str(s: &str) -> PlaybackResult<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        Theme::ALL
            .into_iter()
            .find(|t| t.name().to_ascii_lowercase() == wanted)
            .ok_or_else(|| PlaybackError::input(format!("unknown theme '{}'", s.trim())))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/theme.rs"]
mod tests;
