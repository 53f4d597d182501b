//! Minimal markup helpers used by the registries' render functions.

/// Escape text content and attribute values.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Make raw text safe to embed inside `<style>`.
///
/// Entities are not decoded there, so only closing-tag sequences are broken up.
pub fn raw_text(input: &str) -> String {
    input.replace("</", "<\\/")
}

/// Make generated statements safe to embed inside `<script>`.
///
/// `<` only occurs inside JSON string literals there, so every occurrence is
/// replaced by its `\u003c` escape. This covers `</script>` as well as
/// `<!--` and `<script`, which would otherwise switch the HTML parser into
/// the escaped script states.
pub fn script_text(input: &str) -> String {
    input.replace('<', "\\u003c")
}

/// Render a void element such as `<link ...>` or `<meta ...>`.
pub fn void_element<'a>(name: &str, attrs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut out = format!("<{name}");
    for (key, value) in attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value));
        out.push('"');
    }
    out.push('>');
    out
}

/// `<script src="...">` reference.
pub fn script_src(url: &str) -> String {
    format!("<script src=\"{}\"></script>", escape(url))
}

/// Loader reference; the loader installs itself under `data-global`.
pub fn loader_src(url: &str, global: &str) -> String {
    format!(
        "<script src=\"{}\" data-global=\"{}\"></script>",
        escape(url),
        escape(global)
    )
}

/// Whether `name` is usable as a plain JavaScript identifier.
pub fn is_js_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
