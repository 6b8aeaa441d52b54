use super::*;

#[test]
fn parses_owner_repo() {
    let r = RepoRef::parse("facebook/react").unwrap();
    assert_eq!(r.owner, "facebook");
    assert_eq!(r.repo, "react");
    assert_eq!(r.to_string(), "facebook/react");
}

#[test]
fn parses_github_urls() {
    let r = RepoRef::parse("https://github.com/cellis/code-playback.git").unwrap();
    assert_eq!(r.to_string(), "cellis/code-playback");

    let r = RepoRef::parse("github.com/rust-lang/rust/tree/master/src").unwrap();
    assert_eq!(r.to_string(), "rust-lang/rust");
}

#[test]
fn rejects_malformed_identifiers() {
    for bad in ["react", "", "   ", "https://gitlab.com/a/b", "owner/", "https://github.com/only"] {
        assert!(
            matches!(RepoRef::parse(bad), Err(PlaybackError::Input(_))),
            "{bad:?} should be rejected"
        );
    }
}

#[test]
fn decode_content_strips_line_breaks() {
    // "fn main() {}\n" split across lines the way the API returns it.
    let encoded = "Zm4gbWFp\nbigpIHt9\nCg==\n";
    assert_eq!(decode_content(encoded).unwrap(), "fn main() {}\n");
}

#[test]
fn decode_content_rejects_garbage() {
    assert!(matches!(
        decode_content("!!not base64!!"),
        Err(PlaybackError::Serde(_))
    ));
}

#[test]
fn base_url_trailing_slash_is_trimmed() {
    let c = GitHubClient::with_base_url(
        RepoRef::parse("a/b").unwrap(),
        "http://localhost:1234/",
        None,
    )
    .unwrap();
    assert_eq!(c.base_url(), "http://localhost:1234");
    assert_eq!(
        c.contents_url("src/lib.rs"),
        "http://localhost:1234/repos/a/b/contents/src/lib.rs"
    );
}
