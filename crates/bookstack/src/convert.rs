//! HTML conversion utilities
//!
//! BookStack page bodies arrive as HTML when no native markdown is stored.
//! Both converters are pure and total: they never fail and may return an
//! empty string for empty or tag-only input.

/// Convert HTML to lightly formatted, markdown-like text
///
/// Decodes entities, turns `<br>` and opening `<p>` tags into newlines,
/// strips every other tag, and collapses blank runs so at most one empty
/// line separates paragraphs.
pub fn html_to_markdownish(html: &str) -> String {
    let mut output = String::new();
    let mut chars = html.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '<' {
            let tag = read_tag(&mut chars);
            let (name, is_closing) = tag_name(&tag);
            // Line and paragraph breaks survive as newlines
            if !is_closing && (name == "br" || name == "p") {
                output.push('\n');
            }
        } else {
            output.push(decode_entity(c, &mut chars));
        }
    }

    collapse_blank_runs(&output).trim().to_string()
}

/// Convert HTML to plain text
///
/// Decodes entities, replaces every tag with a single space, and collapses
/// all whitespace runs to one space.
pub fn html_to_plain(html: &str) -> String {
    let mut output = String::new();
    let mut chars = html.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '<' {
            read_tag(&mut chars);
            output.push(' ');
        } else {
            output.push(decode_entity(c, &mut chars));
        }
    }

    collapse_whitespace(&output)
}

/// Consume a tag body up to and including the closing `>`
fn read_tag(chars: &mut std::iter::Peekable<std::str::Chars>) -> String {
    let mut tag = String::new();
    for next in chars.by_ref() {
        if next == '>' {
            break;
        }
        tag.push(next);
    }
    tag
}

/// Extract the lowercased tag name and whether it is a closing tag
fn tag_name(tag: &str) -> (String, bool) {
    let tag_lower = tag.to_lowercase();
    let is_closing = tag_lower.starts_with('/');
    let body = if is_closing { &tag_lower[1..] } else { &tag_lower };
    let name = body
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or("")
        .to_string();
    (name, is_closing)
}

/// Decode an HTML entity starting from an ampersand
fn decode_entity(c: char, chars: &mut std::iter::Peekable<std::str::Chars>) -> char {
    if c != '&' {
        return c;
    }

    let mut entity = String::new();
    while let Some(&next) = chars.peek() {
        if next == ';' {
            chars.next();
            break;
        }
        if next.is_whitespace() || entity.len() > 10 {
            // Not a valid entity
            return '&';
        }
        entity.push(chars.next().unwrap());
    }

    match entity.as_str() {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "#39" => '\'',
        "nbsp" => ' ',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "copy" => '©',
        "reg" => '®',
        _ => {
            if let Some(num_str) = entity.strip_prefix('#') {
                if let Some(stripped) = num_str.strip_prefix('x') {
                    if let Ok(code) = u32::from_str_radix(stripped, 16) {
                        if let Some(ch) = char::from_u32(code) {
                            return ch;
                        }
                    }
                } else if let Ok(code) = num_str.parse::<u32>() {
                    if let Some(ch) = char::from_u32(code) {
                        return ch;
                    }
                }
            }
            // Unknown entity - return original
            '&'
        }
    }
}

/// Collapse any whitespace run containing two or more newlines to exactly
/// one blank line
///
/// Runs with a single newline (or no newline) pass through unchanged.
fn collapse_blank_runs(s: &str) -> String {
    let mut result = String::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            let mut run = String::from(c);
            let mut newlines = 1;
            while let Some(&next) = chars.peek() {
                if !next.is_whitespace() {
                    break;
                }
                if next == '\n' {
                    newlines += 1;
                }
                run.push(chars.next().unwrap());
            }
            if newlines >= 2 {
                result.push_str("\n\n");
            } else {
                result.push_str(&run);
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Collapse all whitespace runs to single spaces and trim
fn collapse_whitespace(s: &str) -> String {
    let mut result = String::new();
    let mut last_was_space = false;

    for c in s.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                result.push(' ');
                last_was_space = true;
            }
        } else {
            result.push(c);
            last_was_space = false;
        }
    }

    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdownish_breaks() {
        assert_eq!(html_to_markdownish("<p>Hello</p><br>World"), "Hello\nWorld");
    }

    #[test]
    fn test_markdownish_self_closing_br() {
        assert_eq!(html_to_markdownish("one<br/>two<br />three"), "one\ntwo\nthree");
    }

    #[test]
    fn test_markdownish_strips_tags() {
        let html = "<div><h1>Title</h1><p>Body with <strong>bold</strong> text.</p></div>";
        let out = html_to_markdownish(html);
        assert!(!out.contains('<'));
        assert!(out.contains("Title"));
        assert!(out.contains("Body with bold text."));
    }

    #[test]
    fn test_markdownish_collapses_blank_runs() {
        let html = "<p>one</p>\n\n\n\n<p>two</p>";
        assert_eq!(html_to_markdownish(html), "one\n\ntwo");
    }

    #[test]
    fn test_markdownish_blank_run_with_inner_spaces() {
        let out = collapse_blank_runs("a\n   \n\nb");
        assert_eq!(out, "a\n\nb");
    }

    #[test]
    fn test_single_newline_preserved() {
        assert_eq!(collapse_blank_runs("a\nb"), "a\nb");
        assert_eq!(collapse_blank_runs("a\n  b"), "a\n  b");
    }

    #[test]
    fn test_markdownish_empty_input() {
        assert_eq!(html_to_markdownish(""), "");
        assert_eq!(html_to_markdownish("<div></div>"), "");
    }

    #[test]
    fn test_plain_single_spaces() {
        assert_eq!(html_to_plain("<p>Hello</p><br>World"), "Hello World");
    }

    #[test]
    fn test_plain_no_multi_space_runs() {
        let out = html_to_plain("<div>  a  </div><div>b</div>");
        assert_eq!(out, "a b");
        assert!(!out.contains("  "));
    }

    #[test]
    fn test_entity_decoding() {
        let out = html_to_plain("<p>Tom &amp; Jerry &lt;3 &quot;quoted&quot; &nbsp;&#39;s</p>");
        assert!(out.contains("Tom & Jerry"));
        assert!(out.contains("<3"));
        assert!(out.contains("\"quoted\""));
        assert!(out.contains("'s"));
    }

    #[test]
    fn test_numeric_entities() {
        assert_eq!(html_to_plain("&#65;&#x42;"), "AB");
    }

    #[test]
    fn test_unknown_entity_kept_as_ampersand() {
        assert_eq!(html_to_plain("a &bogus; b"), "a & b");
    }

    #[test]
    fn test_tag_name_parsing() {
        assert_eq!(tag_name("p class=\"x\""), ("p".to_string(), false));
        assert_eq!(tag_name("/p"), ("p".to_string(), true));
        assert_eq!(tag_name("br/"), ("br".to_string(), false));
        assert_eq!(tag_name("BR "), ("br".to_string(), false));
    }
}
