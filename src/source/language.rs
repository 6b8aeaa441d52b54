//! File name → display-language tag.

/// Tag used when no mapping matches.
pub const PLAINTEXT: &str = "plaintext";

const EXTENSIONS: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("jsx", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("py", "python"),
    ("java", "java"),
    ("c", "c"),
    ("cpp", "cpp"),
    ("cs", "csharp"),
    ("php", "php"),
    ("rb", "ruby"),
    ("go", "go"),
    ("rs", "rust"),
    ("kt", "kotlin"),
    ("swift", "swift"),
    ("html", "html"),
    ("css", "css"),
    ("scss", "scss"),
    ("sass", "sass"),
    ("less", "less"),
    ("json", "json"),
    ("xml", "xml"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("md", "markdown"),
    ("sql", "sql"),
    ("sh", "bash"),
    ("bash", "bash"),
    ("zsh", "bash"),
    ("ps1", "powershell"),
    ("bat", "batch"),
    ("dockerfile", "dockerfile"),
    ("makefile", "makefile"),
];

/// Map a bare extension (without the dot, any case) to a language tag.
pub fn language_for_extension(ext: &str) -> &'static str {
    let ext = ext.to_ascii_lowercase();
    EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, lang)| *lang)
        .unwrap_or(PLAINTEXT)
}

/// Map a file name or path to a language tag.
///
/// The last `.`-separated segment is treated as the extension; a name without a dot is looked up
/// as a whole, which is what makes `Dockerfile` and `Makefile` resolve.
pub fn language_for_filename(name: &str) -> &'static str {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let ext = base.rsplit('.').next().unwrap_or(base);
    language_for_extension(ext)
}

#[cfg(test)]
#[path = "../../tests/unit/source/language.rs"]
mod tests;
