//! @acp:module "XML Scanning"
//! @acp:summary "Balanced-tag scanning over OOXML part text"
//! @acp:domain documents
//! @acp:layer parsing
//!
//! Parts are edited as text: locate an element by exact tag name, balance
//! same-name nesting, splice the replacement back in. Everything outside the
//! edited span is preserved byte for byte.

use std::ops::Range;

/// Escape text for element content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Resolve the predefined and numeric character references
pub fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        let entity = &tail[1..semi];
        let resolved = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        match resolved {
            Some(ch) => {
                out.push(ch);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Offset of the next `<name` start tag at or after `from`, matching the name exactly
pub fn find_start(xml: &str, name: &str, from: usize) -> Option<usize> {
    let needle = format!("<{}", name);
    let mut pos = from;
    while pos <= xml.len() {
        let found = pos + xml.get(pos..)?.find(&needle)?;
        let after = found + needle.len();
        match xml[after..].chars().next() {
            Some(c) if c == '>' || c == '/' || c.is_whitespace() => return Some(found),
            _ => pos = after,
        }
    }
    None
}

/// Offset just past the `>` closing the tag that starts at `start`
pub fn tag_end(xml: &str, start: usize) -> Option<usize> {
    let mut quote = None;
    for (i, ch) in xml.get(start..)?.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '>') => return Some(start + i + 1),
            _ => {}
        }
    }
    None
}

/// True when the tag starting at `start` is `<name .../>`
pub fn is_self_closing(xml: &str, start: usize) -> bool {
    tag_end(xml, start)
        .map(|end| xml[..end].ends_with("/>"))
        .unwrap_or(false)
}

/// Offset just past the end of the element starting at `start`
pub fn element_end(xml: &str, name: &str, start: usize) -> Option<usize> {
    let open_end = tag_end(xml, start)?;
    if xml[..open_end].ends_with("/>") {
        return Some(open_end);
    }

    let close = format!("</{}>", name);
    let mut depth = 1usize;
    let mut pos = open_end;
    loop {
        let next_close = pos + xml[pos..].find(&close)?;
        match find_start(xml, name, pos) {
            Some(next_open) if next_open < next_close => {
                let end = tag_end(xml, next_open)?;
                if !xml[..end].ends_with("/>") {
                    depth += 1;
                }
                pos = end;
            }
            _ => {
                depth -= 1;
                pos = next_close + close.len();
                if depth == 0 {
                    return Some(pos);
                }
            }
        }
    }
}

/// Sibling-level `name` elements inside `range`; nested occurrences are skipped
pub fn elements(xml: &str, name: &str, range: Range<usize>) -> Vec<Range<usize>> {
    let mut found = Vec::new();
    let mut pos = range.start;
    while let Some(start) = find_start(xml, name, pos) {
        if start >= range.end {
            break;
        }
        let Some(end) = element_end(xml, name, start) else {
            break;
        };
        if end > range.end {
            break;
        }
        found.push(start..end);
        pos = end;
    }
    found
}

/// Span between the start and end tags of a non-empty element
pub fn content_range(xml: &str, name: &str, element: &Range<usize>) -> Option<Range<usize>> {
    let open_end = tag_end(xml, element.start)?;
    if xml[..open_end].ends_with("/>") {
        return None;
    }
    let close = format!("</{}>", name);
    Some(open_end..element.end - close.len())
}

/// Attribute value from a start tag, unescaped
pub fn attr(tag: &str, name: &str) -> Option<String> {
    let mut pos = 0;
    while let Some(found) = tag[pos..].find(name) {
        let at = pos + found;
        pos = at + name.len();
        let preceded = tag[..at].chars().last().map(char::is_whitespace).unwrap_or(false);
        let rest = tag[pos..].trim_start();
        if !preceded || !rest.starts_with('=') {
            continue;
        }
        let value = rest[1..].trim_start();
        let quote = value.chars().next()?;
        if quote != '"' && quote != '\'' {
            return None;
        }
        let end = value[1..].find(quote)?;
        return Some(unescape(&value[1..1 + end]));
    }
    None
}
