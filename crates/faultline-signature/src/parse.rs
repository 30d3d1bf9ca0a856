use crate::signature::MethodSignature;

#[derive(Debug, thiserror::Error)]
pub enum SignatureParseError {
    #[error("Method signature is empty")]
    Empty,

    #[error("Missing parameter list in method signature '{text}'")]
    MissingParameterList { text: String },

    #[error("Unterminated parameter list in method signature '{text}'")]
    UnterminatedParameterList { text: String },

    #[error("Unexpected text '{trailing}' after parameter list")]
    TrailingText { trailing: String },

    #[error("Missing declaring type in method signature '{text}'")]
    MissingDeclaringType { text: String },

    #[error("Empty type segment in method signature '{text}'")]
    EmptyTypeSegment { text: String },

    #[error("Empty method name in method signature '{text}'")]
    EmptyMethodName { text: String },

    #[error("Empty parameter at position {index} in method signature '{text}'")]
    EmptyParameter { index: usize, text: String },

    #[error("Unbalanced brackets in method signature '{text}'")]
    UnbalancedBrackets { text: String },

    #[error("Malformed generic arity suffix '{suffix}' in method signature '{text}'")]
    BadAritySuffix { suffix: String, text: String },
}

/// Parse a textual method signature into its canonical form.
///
/// Grammar: `TypeName.MethodName(ParamType1, ParamType2, ...)` where the
/// method name may carry a generic suffix, either by parameter list
/// (`Bar<T,E>`) or by arity (`` Bar`2 ``). Whitespace is normalized away;
/// the parameter list splits on top-level commas only, so nested generics
/// and arrays (`Dictionary<string,int>`, `int[,]`) stay intact.
pub fn parse_signature(text: &str) -> Result<MethodSignature, SignatureParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(SignatureParseError::Empty);
    }

    let open = trimmed
        .find('(')
        .ok_or_else(|| SignatureParseError::MissingParameterList {
            text: trimmed.to_string(),
        })?;
    let close = trimmed
        .rfind(')')
        .ok_or_else(|| SignatureParseError::UnterminatedParameterList {
            text: trimmed.to_string(),
        })?;
    if close < open {
        return Err(SignatureParseError::UnterminatedParameterList {
            text: trimmed.to_string(),
        });
    }
    let trailing = trimmed[close + 1..].trim();
    if !trailing.is_empty() {
        return Err(SignatureParseError::TrailingText {
            trailing: trailing.to_string(),
        });
    }

    let path = &trimmed[..open];
    let body = &trimmed[open + 1..close];
    if body.contains('(') || body.contains(')') {
        return Err(SignatureParseError::UnbalancedBrackets {
            text: trimmed.to_string(),
        });
    }

    let segments = split_top_level(path, '.', trimmed)?;
    if segments.len() < 2 {
        return Err(SignatureParseError::MissingDeclaringType {
            text: trimmed.to_string(),
        });
    }

    let mut type_segments = Vec::with_capacity(segments.len() - 1);
    for segment in &segments[..segments.len() - 1] {
        let normalized = normalize_type(segment);
        if normalized.is_empty() {
            return Err(SignatureParseError::EmptyTypeSegment {
                text: trimmed.to_string(),
            });
        }
        type_segments.push(normalized);
    }
    let declaring_type = type_segments.join(".");

    let method_segment = normalize_type(segments[segments.len() - 1]);
    let (method_name, generic_arity) = split_generic_suffix(&method_segment, trimmed)?;
    if method_name.is_empty() {
        return Err(SignatureParseError::EmptyMethodName {
            text: trimmed.to_string(),
        });
    }

    let parameters = parse_parameters(body, trimmed)?;

    Ok(MethodSignature::new(
        declaring_type,
        method_name,
        parameters,
        generic_arity,
    ))
}

impl std::str::FromStr for MethodSignature {
    type Err = SignatureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_signature(s)
    }
}

/// Split on a separator at bracket depth zero. `<>` and `[]` both nest.
fn split_top_level<'a>(
    text: &'a str,
    separator: char,
    full: &str,
) -> Result<Vec<&'a str>, SignatureParseError> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, ch) in text.char_indices() {
        match ch {
            '<' | '[' => depth += 1,
            '>' | ']' => {
                depth -= 1;
                if depth < 0 {
                    return Err(SignatureParseError::UnbalancedBrackets {
                        text: full.to_string(),
                    });
                }
            }
            c if c == separator && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + separator.len_utf8();
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(SignatureParseError::UnbalancedBrackets {
            text: full.to_string(),
        });
    }
    parts.push(&text[start..]);
    Ok(parts)
}

fn parse_parameters(body: &str, full: &str) -> Result<Vec<String>, SignatureParseError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let pieces = split_top_level(body, ',', full)?;
    let mut parameters = Vec::with_capacity(pieces.len());
    for (index, piece) in pieces.iter().enumerate() {
        let normalized = normalize_type(piece);
        if normalized.is_empty() {
            return Err(SignatureParseError::EmptyParameter {
                index,
                text: full.to_string(),
            });
        }
        parameters.push(normalized);
    }
    Ok(parameters)
}

/// Strip a generic suffix off a method segment, returning the bare name and
/// the arity. Accepts both the authored form (`Bar<T,E>`) and the canonical
/// backtick form (`` Bar`2 ``).
fn split_generic_suffix(
    segment: &str,
    full: &str,
) -> Result<(String, u32), SignatureParseError> {
    if segment.ends_with('>') {
        let mut depth = 0i32;
        let mut open = None;
        for (i, ch) in segment.char_indices().rev() {
            match ch {
                '>' | ']' => depth += 1,
                '<' | '[' => {
                    depth -= 1;
                    if depth == 0 {
                        open = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let open = open.ok_or_else(|| SignatureParseError::UnbalancedBrackets {
            text: full.to_string(),
        })?;
        let inner = &segment[open + 1..segment.len() - 1];
        if inner.trim().is_empty() {
            return Err(SignatureParseError::BadAritySuffix {
                suffix: segment[open..].to_string(),
                text: full.to_string(),
            });
        }
        let arity = split_top_level(inner, ',', full)?.len() as u32;
        return Ok((segment[..open].to_string(), arity));
    }

    if let Some(tick) = segment.find('`') {
        let digits = &segment[tick + 1..];
        let arity: u32 = digits
            .parse()
            .map_err(|_| SignatureParseError::BadAritySuffix {
                suffix: segment[tick..].to_string(),
                text: full.to_string(),
            })?;
        if arity == 0 {
            return Err(SignatureParseError::BadAritySuffix {
                suffix: segment[tick..].to_string(),
                text: full.to_string(),
            });
        }
        return Ok((segment[..tick].to_string(), arity));
    }

    Ok((segment.to_string(), 0))
}

/// Collapse whitespace runs to a single space and drop spaces adjacent to
/// punctuation, so `List < int >` and `List<int>` canonicalize identically
/// while `out int` keeps its separating space.
fn normalize_type(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            if !out.is_empty() {
                pending_space = true;
            }
            continue;
        }
        if pending_space {
            let prev = out.chars().last();
            if let Some(prev) = prev {
                if !is_type_punctuation(prev) && !is_type_punctuation(ch) {
                    out.push(' ');
                }
            }
            pending_space = false;
        }
        out.push(ch);
    }
    out
}

fn is_type_punctuation(c: char) -> bool {
    matches!(c, '.' | ',' | '<' | '>' | '[' | ']' | '`')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_signature() {
        let sig = parse_signature("Foo.Bar(int)").unwrap();
        assert_eq!(sig.declaring_type(), "Foo");
        assert_eq!(sig.method_name(), "Bar");
        assert_eq!(sig.parameters(), ["int"]);
        assert_eq!(sig.generic_arity(), 0);
    }

    #[test]
    fn test_no_parameters() {
        let sig = parse_signature("Foo.Bar()").unwrap();
        assert!(sig.parameters().is_empty());
    }

    #[test]
    fn test_whitespace_normalization() {
        let a = parse_signature("Foo.Bar( List< int > , string )").unwrap();
        let b = parse_signature("Foo.Bar(List<int>,string)").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_ref_out_modifiers_keep_separating_space() {
        let sig = parse_signature("Foo.Bar(out int, ref  string)").unwrap();
        assert_eq!(sig.parameters(), ["out int", "ref string"]);
    }

    #[test]
    fn test_generic_suffix_forms_agree() {
        let named = parse_signature("Foo.Bar<T,E>(T, E)").unwrap();
        let arity = parse_signature("Foo.Bar`2(T, E)").unwrap();
        assert_eq!(named.generic_arity(), 2);
        assert_eq!(named, arity);
    }

    #[test]
    fn test_dots_inside_generics_do_not_split_type() {
        let sig = parse_signature("System.Collections.Generic.List<System.Int32>.Add(System.Int32)")
            .unwrap();
        assert_eq!(
            sig.declaring_type(),
            "System.Collections.Generic.List<System.Int32>"
        );
        assert_eq!(sig.method_name(), "Add");
    }

    #[test]
    fn test_missing_parameter_list() {
        assert!(matches!(
            parse_signature("Foo.Bar"),
            Err(SignatureParseError::MissingParameterList { .. })
        ));
    }

    #[test]
    fn test_trailing_text_rejected() {
        assert!(matches!(
            parse_signature("Foo.Bar(int) junk"),
            Err(SignatureParseError::TrailingText { .. })
        ));
    }

    #[test]
    fn test_empty_parameter_slot() {
        assert!(matches!(
            parse_signature("Foo.Bar(int,,string)"),
            Err(SignatureParseError::EmptyParameter { index: 1, .. })
        ));
    }

    #[test]
    fn test_zero_arity_suffix_rejected() {
        assert!(matches!(
            parse_signature("Foo.Bar`0(int)"),
            Err(SignatureParseError::BadAritySuffix { .. })
        ));
    }
}
