//! Outbound post text derivation
//!
//! Articles are reduced to post text by a length policy: short bodies go out
//! verbatim, long bodies are replaced by the excerpt plus a permalink. The
//! body is never truncated; the excerpt+link form is substituted as a unit,
//! with no guarantee it fits the platform cap itself.

/// Bluesky's post character limit; also the trigger threshold for the
/// excerpt+link substitution.
pub const POST_CHAR_LIMIT: usize = 300;

/// Derive the outbound post text for an article.
///
/// Markup is stripped from body and excerpt first. If the stripped body is at
/// most [`POST_CHAR_LIMIT`] characters (character count, not bytes), it is
/// the post text verbatim. Otherwise the post text is the stripped excerpt,
/// a blank line, and the permalink.
pub fn format_post(body: &str, excerpt: &str, permalink: &str) -> String {
    let body = strip_markup(body);

    if body.chars().count() <= POST_CHAR_LIMIT {
        body
    } else {
        format!("{}\n\n{}", strip_markup(excerpt), permalink)
    }
}

/// Strip HTML markup from article text.
///
/// Removes script and style elements with their contents, drops all other
/// tags, and decodes the entities WordPress-flavored content commonly
/// carries. Plain text passes through unchanged apart from trimming.
pub fn strip_markup(input: &str) -> String {
    let without_blocks = remove_element(&remove_element(input, "script"), "style");

    let mut out = String::with_capacity(without_blocks.len());
    let mut in_tag = false;
    for ch in without_blocks.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }

    decode_entities(&out).trim().to_string()
}

/// Remove `<name ...>...</name>` blocks, contents included.
fn remove_element(input: &str, name: &str) -> String {
    let open = format!("<{}", name);
    let close = format!("</{}>", name);
    // ASCII lowering keeps byte offsets aligned with the original input
    let lower = input.to_ascii_lowercase();

    let mut out = String::with_capacity(input.len());
    let mut pos = 0;
    while let Some(start) = lower[pos..].find(&open) {
        let start = pos + start;
        out.push_str(&input[pos..start]);
        match lower[start..].find(&close) {
            Some(end) => pos = start + end + close.len(),
            None => return out, // unterminated block, drop the rest
        }
    }
    out.push_str(&input[pos..]);
    out
}

fn decode_entities(input: &str) -> String {
    input
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
