//! Offset-preserving lexical masking.
//!
//! Every function here returns text with exactly the same byte length as its
//! input: masked characters become spaces (one per UTF-8 byte) and line breaks
//! are kept, so offsets, lines and columns computed on masked text are valid
//! against the original.
//!
//! This is a bounded regex heuristic, not a lexer. Raw string literals and
//! template argument lists nested more than one level deep can be mis-masked.

use std::sync::LazyLock;

use regex::Regex;

static COMMENT_OR_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)/\*.*?(?:\*/|\z)|//[^\n]*|"(?:\\.|[^"\\\n])*"|'(?:\\.|[^'\\\n])*'"#)
        .expect("valid comment/literal regex")
});

static TEMPLATE_ARGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?:[^<>;{}]|<[^<>;{}]*>)*>").expect("valid template argument regex")
});

#[derive(Debug, Clone, Copy)]
struct MaskOptions {
    comments: bool,
    literals: bool,
}

/// Mask block and line comments, delimiters included.
pub fn mask_comments(text: &str) -> String {
    mask_lexical(
        text,
        MaskOptions {
            comments: true,
            literals: false,
        },
    )
}

/// Mask the contents of string and character literals, keeping the quotes.
pub fn mask_strings(text: &str) -> String {
    mask_lexical(
        text,
        MaskOptions {
            comments: false,
            literals: true,
        },
    )
}

/// Mask comments and literal contents.
pub fn mask_comments_and_literals(text: &str) -> String {
    mask_lexical(
        text,
        MaskOptions {
            comments: true,
            literals: true,
        },
    )
}

/// Mask comments, literal contents and the interior of first-level template
/// argument lists (`std::map<int, int>` -> `std::map<        >`).
pub fn mask_all(text: &str) -> String {
    mask_templates(&mask_comments_and_literals(text))
}

fn mask_lexical(text: &str, options: MaskOptions) -> String {
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;

    // A single alternation scanned left to right, so a `//` inside a string
    // or a quote inside a comment never starts a token of the other kind.
    for m in COMMENT_OR_LITERAL.find_iter(text) {
        let token = m.as_str();
        let is_comment = token.starts_with("/*") || token.starts_with("//");
        if is_comment && options.comments {
            out.push_str(&text[copied..m.start()]);
            fill(&mut out, token);
            copied = m.end();
        } else if !is_comment && options.literals && token.len() >= 2 {
            out.push_str(&text[copied..m.start() + 1]);
            fill(&mut out, &token[1..token.len() - 1]);
            copied = m.end() - 1;
        }
    }
    out.push_str(&text[copied..]);
    out
}

/// Mask the interior of `<…>` lists that directly follow an identifier.
pub fn mask_templates(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut at = 0;

    while let Some(m) = TEMPLATE_ARGS.find_at(text, at) {
        let follows_identifier = text[..m.start()]
            .chars()
            .next_back()
            .is_some_and(is_identifier_char);
        if follows_identifier {
            out.push_str(&text[copied..m.start() + 1]);
            fill(&mut out, &text[m.start() + 1..m.end() - 1]);
            copied = m.end() - 1;
            at = m.end();
        } else {
            at = m.start() + 1;
        }
    }
    out.push_str(&text[copied..]);
    out
}

fn fill(out: &mut String, masked: &str) {
    for ch in masked.chars() {
        match ch {
            '\n' | '\r' => out.push(ch),
            _ => out.extend(std::iter::repeat_n(' ', ch.len_utf8())),
        }
    }
}

pub(crate) fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Remove default arguments from a parameter list.
///
/// A top-level `=` starts a default value that runs to the next top-level
/// comma. An all-whitespace list collapses to the empty string.
pub fn strip_default_values(params: &str) -> String {
    if params.trim().is_empty() {
        return String::new();
    }

    let masked = mask_all(params);
    let mut out = String::with_capacity(params.len());
    let mut depth = 0usize;
    let mut copied = 0;
    let mut default_start: Option<usize> = None;

    for (i, b) in masked.bytes().enumerate() {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b'=' if depth == 0 && default_start.is_none() => default_start = Some(i),
            b',' if depth == 0 => {
                if let Some(start) = default_start.take() {
                    out.push_str(params[copied..start].trim_end());
                    copied = i;
                }
            }
            _ => {}
        }
    }

    match default_start {
        Some(start) => out.push_str(params[copied..start].trim_end()),
        None => out.push_str(&params[copied..]),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_is_preserved() {
        let samples = [
            "",
            "int a; // trailing é comment\n",
            "/* banner\n * ünïcode\n */\nclass A {};",
            r#"const char* s = "a // not a comment", c = '\'';"#,
            "std::map<std::string, std::vector<int>> m;",
            "/* unterminated",
            "\"unterminated string\nint x;",
        ];
        for s in samples {
            assert_eq!(mask_comments(s).len(), s.len(), "mask_comments({s:?})");
            assert_eq!(mask_strings(s).len(), s.len(), "mask_strings({s:?})");
            assert_eq!(mask_all(s).len(), s.len(), "mask_all({s:?})");
        }
    }

    #[test]
    fn test_mask_comments_keeps_lines() {
        let text = "/* a\n b */int x; // y\nint z;";
        let masked = mask_comments(text);
        assert_eq!(masked, "    \n     int x;     \nint z;");
    }

    #[test]
    fn test_comment_marker_inside_string_is_not_a_comment() {
        let text = r#"auto url = "http://x"; // real"#;
        let masked = mask_comments(text);
        assert_eq!(masked, r#"auto url = "http://x";        "#);
    }

    #[test]
    fn test_mask_strings_keeps_quotes() {
        let text = r#"f("a, b", ',', "esc\"aped")"#;
        assert_eq!(mask_strings(text), r#"f("    ", ' ', "         ")"#);
    }

    #[test]
    fn test_unterminated_block_comment_masks_to_end() {
        let masked = mask_comments("int a; /* open\nint b;");
        assert_eq!(masked, "int a;        \n      ");
    }

    #[test]
    fn test_mask_templates() {
        assert_eq!(
            mask_templates("std::map<int, int> m"),
            "std::map<        > m"
        );
        assert_eq!(
            mask_templates("Foo<Bar<int, char>, bool> x"),
            "Foo<                    > x"
        );
        // Comparison operators are left alone.
        assert_eq!(mask_templates("a < b; c > d"), "a < b; c > d");
        assert_eq!(mask_templates("x = (1 < 2)"), "x = (1 < 2)");
    }

    #[test]
    fn test_strip_default_values() {
        assert_eq!(strip_default_values("int a = 1, int b"), "int a, int b");
        assert_eq!(strip_default_values("Widget w = Widget()"), "Widget w");
        assert_eq!(
            strip_default_values("int a, Point p = Point(1, 2), int c = 3"),
            "int a, Point p, int c"
        );
        assert_eq!(
            strip_default_values("std::map<int, int> m = {}, const char* s = \"a,b\""),
            "std::map<int, int> m, const char* s"
        );
        assert_eq!(strip_default_values("  "), "");
        assert_eq!(strip_default_values("int a"), "int a");
    }

    #[test]
    fn test_strip_default_values_multiline() {
        let params = "int a = 1,\n             int b = 2";
        assert_eq!(strip_default_values(params), "int a,\n             int b");
    }
}
