use crate::error::{MissingCapture, TemplateError};

/// Highest placeholder index a template may reference.
const MAX_PLACEHOLDER: usize = u16::MAX as usize;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Numbering {
    Automatic,
    Manual,
}

/// A response template split into literal text and positional placeholders.
///
/// Accepts `{}` for the next capture, `{N}` for the N-th capture and `{{` / `}}`
/// for literal braces. Automatic and manual numbering cannot be mixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut next_auto = 0usize;
        let mut numbering: Option<Numbering> = None;
        let mut chars = source.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' => {
                    if matches!(chars.peek(), Some(&(_, '{'))) {
                        chars.next();
                        literal.push('{');
                        continue;
                    }

                    let mut field = String::new();
                    let mut closed = false;
                    for (_, n) in chars.by_ref() {
                        if n == '}' {
                            closed = true;
                            break;
                        }
                        field.push(n);
                    }
                    if !closed {
                        return Err(TemplateError::UnclosedBrace(pos));
                    }

                    let index = if field.is_empty() {
                        if numbering == Some(Numbering::Manual) {
                            return Err(TemplateError::MixedNumbering);
                        }
                        numbering = Some(Numbering::Automatic);
                        next_auto += 1;
                        next_auto - 1
                    } else if field.bytes().all(|b| b.is_ascii_digit()) {
                        if numbering == Some(Numbering::Automatic) {
                            return Err(TemplateError::MixedNumbering);
                        }
                        numbering = Some(Numbering::Manual);
                        match field.parse::<usize>() {
                            Ok(index) if index <= MAX_PLACEHOLDER => index,
                            _ => return Err(TemplateError::UnsupportedField(field)),
                        }
                    } else {
                        return Err(TemplateError::UnsupportedField(field));
                    };

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(index));
                }
                '}' => {
                    if matches!(chars.peek(), Some(&(_, '}'))) {
                        chars.next();
                        literal.push('}');
                    } else {
                        return Err(TemplateError::StrayClosingBrace(pos));
                    }
                }
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The template text exactly as it was authored.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of captures needed to fill every placeholder.
    pub fn arity(&self) -> usize {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Placeholder(index) => Some(index + 1),
                Segment::Literal(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Fills the placeholders from `captures` by position. Surplus captures are ignored.
    pub fn render<S: AsRef<str>>(&self, captures: &[S]) -> Result<String, MissingCapture> {
        let missing = MissingCapture {
            required: self.arity(),
            available: captures.len(),
        };
        if missing.required > missing.available {
            return Err(missing);
        }

        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(index) => {
                    out.push_str(captures.get(*index).ok_or(missing)?.as_ref())
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_placeholder() {
        let template = Template::parse("Why do you need {}?").unwrap();
        assert_eq!(template.arity(), 1);
        assert_eq!(template.render(&["coffee"]).unwrap(), "Why do you need coffee?");
    }

    #[test]
    fn test_render_explicit_indices_reorder_and_repeat() {
        let template = Template::parse("{1} before {0}, then {1} again").unwrap();
        assert_eq!(template.arity(), 2);
        assert_eq!(
            template.render(&["tea", "coffee"]).unwrap(),
            "coffee before tea, then coffee again"
        );
    }

    #[test]
    fn test_escaped_braces_are_literal() {
        let template = Template::parse("{{literal}} and {}").unwrap();
        assert_eq!(template.arity(), 1);
        assert_eq!(template.render(&["x"]).unwrap(), "{literal} and x");
    }

    #[test]
    fn test_no_placeholders_ignores_captures() {
        let template = Template::parse("Hello there!").unwrap();
        assert_eq!(template.arity(), 0);
        assert_eq!(template.render(&["unused"]).unwrap(), "Hello there!");
        assert_eq!(template.render::<&str>(&[]).unwrap(), "Hello there!");
    }

    #[test]
    fn test_missing_capture_is_an_error() {
        let template = Template::parse("{} and {}").unwrap();
        assert_eq!(
            template.render(&["one"]),
            Err(MissingCapture {
                required: 2,
                available: 1
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Template::parse("oops {"),
            Err(TemplateError::UnclosedBrace(5))
        );
        assert_eq!(
            Template::parse("oops }"),
            Err(TemplateError::StrayClosingBrace(5))
        );
        assert_eq!(
            Template::parse("hi {name}"),
            Err(TemplateError::UnsupportedField("name".to_string()))
        );
        assert_eq!(
            Template::parse("{} and {0}"),
            Err(TemplateError::MixedNumbering)
        );
    }

    #[test]
    fn test_source_is_preserved() {
        let template = Template::parse("Is it {{really}} {}?").unwrap();
        assert_eq!(template.source(), "Is it {{really}} {}?");
    }

    #[test]
    fn test_huge_placeholder_index_is_rejected() {
        assert_eq!(
            Template::parse("Why {18446744073709551615}?"),
            Err(TemplateError::UnsupportedField(
                "18446744073709551615".to_string()
            ))
        );
        assert_eq!(
            Template::parse("Why {99999999999999999999999}?"),
            Err(TemplateError::UnsupportedField(
                "99999999999999999999999".to_string()
            ))
        );
        assert_eq!(
            Template::parse("{65536}"),
            Err(TemplateError::UnsupportedField("65536".to_string()))
        );
    }

    #[test]
    fn test_largest_allowed_index_reports_missing_capture() {
        let template = Template::parse("{65535}").unwrap();
        assert_eq!(template.arity(), 65536);
        assert_eq!(
            template.render(&["coffee"]),
            Err(MissingCapture {
                required: 65536,
                available: 1
            })
        );
    }
}
