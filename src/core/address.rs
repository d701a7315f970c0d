//! Tag address parsing
//!
//! ctags stores a tag's location either as a line number (`--excmd=number`) or
//! as a search command (`/^text$/`, `?^text$?` for backward search). Patterns are
//! never evaluated; the literal text inside is shown as-is.

use crate::core::model::{TagAddress, TagError};

/// Marker separating the address from the kind/comment fields
const EXTENSION_MARKER: &str = ";\"";

/// Split the third field of a tag line into `(address, trailing)`
///
/// Pattern addresses may themselves contain `;"`, so the address is cut at the
/// closing delimiter rather than at the first marker.
pub fn split_address_field(rest: &str) -> (&str, &str) {
    if let Some(end) = pattern_end(rest) {
        let (address, remainder) = rest.split_at(end);
        let trailing = remainder.strip_prefix(EXTENSION_MARKER).unwrap_or(remainder);
        return (address, trailing);
    }

    rest.split_once(EXTENSION_MARKER).unwrap_or((rest, ""))
}

/// Byte offset just past the closing delimiter of a pattern address
fn pattern_end(field: &str) -> Option<usize> {
    let delimiter = field.chars().next().filter(|c| *c == '/' || *c == '?')?;

    let mut escaped = false;
    for (idx, c) in field.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == delimiter {
            return Some(idx + c.len_utf8());
        }
    }

    None
}

/// Classify a raw address field
pub fn parse_address(field: &str) -> Result<TagAddress, TagError> {
    let (address, _) = split_address_field(field);
    let malformed = || TagError::MalformedAddress {
        address: field.to_string(),
    };

    if address.is_empty() {
        return Err(malformed());
    }

    if address.bytes().all(|b| b.is_ascii_digit()) {
        return match address.parse::<u32>() {
            Ok(n) if n > 0 => Ok(TagAddress::LineNumber(n)),
            _ => Err(malformed()),
        };
    }

    match pattern_end(address) {
        Some(end) if end == address.len() && address.len() >= 2 => {
            let inner = &address[1..address.len() - 1];
            let inner = inner.strip_prefix('^').unwrap_or(inner);
            let inner = inner.strip_suffix('$').unwrap_or(inner);
            Ok(TagAddress::Pattern(inner.to_string()))
        }
        _ => Err(malformed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_number() {
        assert_eq!(parse_address("42").unwrap(), TagAddress::LineNumber(42));
        assert_eq!(parse_address("42;\"").unwrap(), TagAddress::LineNumber(42));
    }

    #[test]
    fn test_forward_pattern() {
        assert_eq!(
            parse_address("/^int foo() {$/").unwrap(),
            TagAddress::Pattern("int foo() {".to_string())
        );
    }

    #[test]
    fn test_backward_pattern() {
        assert_eq!(
            parse_address("?^static int bar;$?").unwrap(),
            TagAddress::Pattern("static int bar;".to_string())
        );
    }

    #[test]
    fn test_pattern_without_anchors() {
        assert_eq!(
            parse_address("/struct point/").unwrap(),
            TagAddress::Pattern("struct point".to_string())
        );
    }

    #[test]
    fn test_pattern_with_extension_marker_inside() {
        let (address, trailing) = split_address_field("/^  s = \";\";$/;\"\tv\tlocal");
        assert_eq!(address, "/^  s = \";\";$/");
        assert_eq!(trailing, "\tv\tlocal");
        assert_eq!(
            parse_address(address).unwrap(),
            TagAddress::Pattern("  s = \";\";".to_string())
        );
    }

    #[test]
    fn test_pattern_with_escaped_delimiter() {
        let (address, _) = split_address_field("/^a \\/ b$/;\"\tm");
        assert_eq!(address, "/^a \\/ b$/");
        assert_eq!(
            parse_address(address).unwrap(),
            TagAddress::Pattern("a \\/ b".to_string())
        );
    }

    #[test]
    fn test_split_numeric() {
        assert_eq!(
            split_address_field("42;\"\tf\tsome comment"),
            ("42", "\tf\tsome comment")
        );
        assert_eq!(split_address_field("42"), ("42", ""));
    }

    #[test]
    fn test_malformed() {
        assert!(parse_address("").is_err());
        assert!(parse_address(";\"").is_err());
        assert!(parse_address("0").is_err());
        assert!(parse_address("/^unterminated").is_err());
        assert!(parse_address("/").is_err());
        assert!(parse_address("12abc").is_err());
        assert!(parse_address("99999999999").is_err());
    }

    #[test]
    fn test_malformed_reports_field() {
        match parse_address("/^oops") {
            Err(TagError::MalformedAddress { address }) => assert_eq!(address, "/^oops"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
