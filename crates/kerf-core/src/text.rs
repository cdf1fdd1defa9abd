//! Template text helpers

use crate::{Error, Result};

/// Remove the common indentation from a multi-line template.
///
/// Leading blank lines are dropped and the indentation of the first
/// remaining line is stripped from every line. Lines that are shorter than
/// the indentation must be blank.
pub fn untab(text: &str) -> Result<String> {
    let text = text.trim_start_matches('\n');
    let indent = text
        .chars()
        .take_while(|c| *c == '\t' || *c == ' ')
        .count();

    let mut out = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        let cut = line
            .char_indices()
            .nth(indent)
            .map_or(line.len(), |(at, _)| at);
        let (head, tail) = line.split_at(cut);
        if !head.trim().is_empty() {
            return Err(Error::Untab { line: i });
        }
        out.push(tail);
    }
    Ok(out.join("\n"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_untab_tabs() {
        let src = "\n\tfloat f()\n\t{\n\t\treturn 1.0;\n\t}\n\t";
        assert_eq!(untab(src).unwrap(), "float f()\n{\n\treturn 1.0;\n}\n");
    }

    #[test]
    fn test_untab_spaces() {
        let src = r#"
            vec2 f(vec2 p)
            {
                return p;
            }
        "#;
        assert_eq!(untab(src).unwrap(), "vec2 f(vec2 p)\n{\n    return p;\n}\n");
    }

    #[test]
    fn test_untab_blank_lines_kept() {
        assert_eq!(untab("  a\n\n  b").unwrap(), "a\n\nb");
    }

    #[test]
    fn test_untab_rejects_outdented_text() {
        let err = untab("\n    a\n  b\n").unwrap_err();
        assert_eq!(err, Error::Untab { line: 1 });
    }
}
