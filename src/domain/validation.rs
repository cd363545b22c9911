use html5ever::{LocalName, Namespace, QualName};
use kuchiki::traits::*;
use kuchiki::NodeRef;

use super::error::{ValidationError, ValidationResult};

/// Plain-text length must be strictly greater than this.
pub const MIN_COMMENT_LENGTH: usize = 10;
/// Plain-text length must be strictly less than this.
pub const MAX_COMMENT_LENGTH: usize = 3000;

const ALLOWED_TAGS: &[&str] = &[
    "h3", "h4", "h5", "h6", "blockquote", "p", "a", "ul", "ol", "nl", "li", "b", "i", "strong",
    "em", "strike", "code", "hr", "br", "div", "table", "thead", "caption", "tbody", "tr", "th",
    "td", "pre",
];

// Elements whose text is dropped along with the tag.
const DROPPED_CONTENT_TAGS: &[&str] = &["script", "style", "textarea", "option", "noscript"];

const VOID_TAGS: &[&str] = &["br", "hr"];

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "ftp", "mailto"];

/// Length of `markup` once every tag is stripped, counted in characters.
pub fn plain_length(markup: &str) -> usize {
    // Parse as body content so leading whitespace is kept as text. The
    // tokenizer folds CR and CRLF into LF, so carriage returns go in as
    // character references.
    let body = QualName::new(
        None,
        Namespace::from("http://www.w3.org/1999/xhtml"),
        LocalName::from("body"),
    );
    kuchiki::parse_fragment(body, Vec::new())
        .one(markup.replace('\r', "&#13;"))
        .text_contents()
        .chars()
        .count()
}

pub fn validate_submission(name: &str, raw_text: &str) -> ValidationResult<()> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if raw_text.is_empty() {
        return Err(ValidationError::EmptyText);
    }

    let length = plain_length(raw_text);
    if length <= MIN_COMMENT_LENGTH {
        return Err(ValidationError::TooShort {
            length,
            min: MIN_COMMENT_LENGTH,
        });
    }
    if length >= MAX_COMMENT_LENGTH {
        return Err(ValidationError::TooLong {
            length,
            max: MAX_COMMENT_LENGTH,
        });
    }

    Ok(())
}

pub fn is_submission_ready(name: &str, raw_text: &str) -> bool {
    validate_submission(name, raw_text).is_ok()
}

/// Reduce submitted HTML to the safe subset.
///
/// Disallowed elements are unwrapped so their text survives, except the
/// ones in `DROPPED_CONTENT_TAGS`. Attributes are only kept on links, and a
/// link target with a non-web scheme loses its `href`.
pub fn sanitize(raw_text: &str) -> String {
    let document = kuchiki::parse_html().one(raw_text);
    let mut out = String::with_capacity(raw_text.len());

    if let Ok(body) = document.select_first("body") {
        for child in body.as_node().children() {
            write_node(&child, &mut out);
        }
    }

    out
}

fn write_node(node: &NodeRef, out: &mut String) {
    if let Some(text) = node.as_text() {
        escape_text(&text.borrow(), out);
        return;
    }

    // Comments, doctypes and processing instructions are dropped.
    let Some(element) = node.as_element() else {
        return;
    };

    let tag: &str = &element.name.local;
    if DROPPED_CONTENT_TAGS.contains(&tag) {
        return;
    }

    if !ALLOWED_TAGS.contains(&tag) {
        for child in node.children() {
            write_node(&child, out);
        }
        return;
    }

    out.push('<');
    out.push_str(tag);
    let attributes = element.attributes.borrow();
    for (name, attribute) in attributes.map.iter() {
        let attr_name: &str = &name.local;
        if !is_allowed_attribute(tag, attr_name, &attribute.value) {
            continue;
        }
        out.push(' ');
        out.push_str(attr_name);
        out.push_str("=\"");
        escape_attribute(&attribute.value, out);
        out.push('"');
    }
    out.push('>');

    if VOID_TAGS.contains(&tag) {
        return;
    }

    for child in node.children() {
        write_node(&child, out);
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn is_allowed_attribute(tag: &str, attr: &str, value: &str) -> bool {
    match (tag, attr) {
        ("a", "name") | ("a", "target") => true,
        ("a", "href") => has_allowed_scheme(value),
        _ => false,
    }
}

fn has_allowed_scheme(href: &str) -> bool {
    // Browsers ignore whitespace and control characters inside a scheme.
    let compact: String = href
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect::<String>()
        .to_ascii_lowercase();

    match compact.find(|c| matches!(c, ':' | '/' | '?' | '#')) {
        Some(idx) if compact[idx..].starts_with(':') => {
            ALLOWED_SCHEMES.contains(&&compact[..idx])
        }
        _ => true,
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
