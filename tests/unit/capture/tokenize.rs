use super::*;

#[test]
fn split_keeps_separators_and_whitespace() {
    assert_eq!(
        split_tokens("foo(a, b);"),
        vec!["foo", "(", "a", ",", " ", "b", ")", ";"]
    );
    assert_eq!(split_tokens("  x\t= 1"), vec!["  ", "x", "\t", "=", " ", "1"]);
    assert!(split_tokens("").is_empty());
}

#[test]
fn split_is_lossless() {
    for line in [
        "const s = \"héllo, wörld\";",
        "   ",
        "a.b.c()",
        "if (x) { return [1, 2]; }",
    ] {
        assert_eq!(split_tokens(line).concat(), line);
    }
}

#[test]
fn const_declaration_classifies_in_any_order() {
    let expected = [
        ("const", TokenKind::Keyword),
        ("x", TokenKind::Plain),
        ("=", TokenKind::Operator),
        ("1", TokenKind::Number),
        (";", TokenKind::Punctuation),
    ];
    for (tok, kind) in expected.iter().rev() {
        assert_eq!(classify(tok, "javascript"), *kind, "{tok}");
    }
    for (tok, kind) in expected {
        assert_eq!(classify(tok, "javascript"), kind, "{tok}");
    }

    let line: Vec<_> = classify_line("const x = 1;", "javascript")
        .into_iter()
        .filter(|(_, k)| *k != TokenKind::Whitespace)
        .collect();
    assert_eq!(line, expected.to_vec());
}

#[test]
fn keywords_match_inside_longer_tokens() {
    for tok in ["constant", "letter", "returnValue", "newline", "'if'"] {
        assert_eq!(classify(tok, "javascript"), TokenKind::Keyword, "{tok}");
    }
    assert_eq!(classify("def", "python"), TokenKind::Keyword);
    assert_eq!(classify("undefined", "python"), TokenKind::Keyword);
    assert_eq!(classify("def", "javascript"), TokenKind::Plain);
    assert_eq!(classify("map", "html"), TokenKind::Keyword);
    assert_eq!(classify("const", "rust"), TokenKind::Keyword);
    assert_eq!(classify("x", "javascript"), TokenKind::Plain);
}

#[test]
fn literal_and_comment_rules() {
    assert_eq!(classify("'a'", "javascript"), TokenKind::String);
    assert_eq!(classify("`tpl", "typescript"), TokenKind::String);
    assert_eq!(classify("//", "javascript"), TokenKind::Comment);
    assert_eq!(classify("#include", "c"), TokenKind::Comment);
    assert_eq!(classify("42", "javascript"), TokenKind::Number);
    assert_eq!(classify("4.2", "javascript"), TokenKind::Number);
    assert_eq!(classify("4.", "javascript"), TokenKind::Plain);
    assert_eq!(classify("run()", "javascript"), TokenKind::Function);
    assert_eq!(classify("class=\"x\"", "html"), TokenKind::Keyword);
    assert_eq!(classify("id=\"x\"", "html"), TokenKind::Attribute);
    assert_eq!(classify("=", "html"), TokenKind::Attribute);
    assert_eq!(classify("color:", "css"), TokenKind::Property);
    assert_eq!(classify("color:", "javascript"), TokenKind::Plain);
    assert_eq!(classify("  ", "javascript"), TokenKind::Whitespace);
}

#[test]
fn line_classification_is_per_token() {
    let kinds = classify_line("print(x) # done now", "python");
    assert_eq!(kinds[0], ("print", TokenKind::Plain));
    assert_eq!(kinds[1], ("(", TokenKind::Punctuation));
    assert!(kinds.contains(&("#", TokenKind::Comment)));
    assert!(kinds.contains(&("done", TokenKind::Plain)));
    assert!(kinds.contains(&("now", TokenKind::Plain)));

    // A comment marker glued to a word still only colors that token.
    let kinds = classify_line("x //note y", "javascript");
    assert!(kinds.contains(&("//note", TokenKind::Comment)));
    assert!(kinds.contains(&("y", TokenKind::Plain)));
}
