//! Line tokenizer and lexical classifier used to color captured frames.
//!
//! Lines are split on whitespace runs and on the single-character separators `(){}[];,.`, keeping
//! the separators as their own tokens. Each token is then classified on its own; no state carries
//! between tokens, so a comment marker colors only the token it starts.

/// Single-character separators that always form their own token.
pub const SEPARATORS: &[char] = &['(', ')', '{', '}', '[', ']', ';', ',', '.'];

const JS_KEYWORDS: &[&str] = &[
    "function",
    "const",
    "let",
    "var",
    "if",
    "else",
    "for",
    "while",
    "return",
    "import",
    "export",
    "class",
    "interface",
    "type",
    "async",
    "await",
    "try",
    "catch",
    "new",
    "this",
    "super",
    "extends",
    "implements",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "def", "class", "if", "else", "elif", "for", "while", "return", "import", "from", "as", "with",
    "try", "except", "finally", "lambda", "yield",
];

const HTML_TAGS: &[&str] = &[
    "html", "head", "body", "div", "span", "p", "a", "img", "script", "style", "link",
];

const OPERATORS: &[&str] = &[
    "===", "==", "!=", "!==", "<=", ">=", "<", ">", "&&", "||", "!", "+", "-", "*", "/", "%", "=",
    "+=", "-=",
];

/// Lexical class of a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    String,
    Comment,
    Number,
    Function,
    Attribute,
    Property,
    Operator,
    Punctuation,
    Whitespace,
    Plain,
}

/// Keyword list for a language tag. Anything that is not Python or HTML uses the JavaScript set.
pub fn keywords_for(language: &str) -> &'static [&'static str] {
    match language {
        "python" => PYTHON_KEYWORDS,
        "html" => HTML_TAGS,
        _ => JS_KEYWORDS,
    }
}

/// Splits `line` into tokens, keeping whitespace runs and separators.
///
/// Concatenating the result always yields `line` again.
pub fn split_tokens(line: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut in_space = false;

    for (i, ch) in line.char_indices() {
        if SEPARATORS.contains(&ch) {
            if start < i {
                out.push(&line[start..i]);
            }
            out.push(&line[i..i + ch.len_utf8()]);
            start = i + ch.len_utf8();
            in_space = false;
            continue;
        }
        let space = ch.is_whitespace();
        if space != in_space && start < i {
            out.push(&line[start..i]);
            start = i;
        }
        in_space = space;
    }
    if start < line.len() {
        out.push(&line[start..]);
    }
    out
}

fn is_number(token: &str) -> bool {
    let (int, frac) = match token.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (token, None),
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    digits(int) && frac.is_none_or(digits)
}

fn is_comment_start(token: &str) -> bool {
    token.starts_with("//") || token.starts_with("/*") || token.starts_with('#')
}

/// Classifies a single token for `language`.
///
/// Rules are tried in order and the first match wins. The keyword rule runs first and matches any
/// token that contains a keyword, so `constant`, `returnValue` and even `'if'` color as keywords.
pub fn classify(token: &str, language: &str) -> TokenKind {
    let t = token.trim();
    if t.is_empty() {
        return TokenKind::Whitespace;
    }
    if keywords_for(language).iter().any(|k| t.contains(k)) {
        return TokenKind::Keyword;
    }
    if t.starts_with(['"', '\'', '`']) {
        return TokenKind::String;
    }
    if is_comment_start(t) {
        return TokenKind::Comment;
    }
    if is_number(t) {
        return TokenKind::Number;
    }
    if t.ends_with("()") {
        return TokenKind::Function;
    }
    if language == "html" && t.contains('=') {
        return TokenKind::Attribute;
    }
    if language == "css" && t.contains(':') {
        return TokenKind::Property;
    }
    if OPERATORS.contains(&t) {
        return TokenKind::Operator;
    }
    if t.len() == 1 && t.chars().all(|c| SEPARATORS.contains(&c)) {
        return TokenKind::Punctuation;
    }
    TokenKind::Plain
}

/// Tokenizes and classifies a whole line.
pub fn classify_line<'a>(line: &'a str, language: &str) -> Vec<(&'a str, TokenKind)> {
    split_tokens(line)
        .into_iter()
        .map(|token| (token, classify(token, language)))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/capture/tokenize.rs"]
mod tests;
