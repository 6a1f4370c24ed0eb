//! Comma splitting for argument lists.
//!
//! Splits on commas that sit outside any quote or bracket pair, so default
//! values like `fwip = "hey, hi"` or `bar(baz, quux)` stay in one token.

/// Characters that open a nested section, paired by index with [`CLOSERS`].
const OPENERS: &[char] = &['"', '\'', '<', '(', '{'];
const CLOSERS: &[char] = &['"', '\'', '>', ')', '}'];

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

/// Split `text` by unenclosed commas, trimming each token.
///
/// ```text
/// split_by_commas(r#"foo, bar(baz, quux), fwip = "hey, hi""#)
///   => ["foo", "bar(baz, quux)", r#"fwip = "hey, hi""#]
/// ```
///
/// A backslash copies itself and the next character verbatim, inside quotes
/// as well as outside, so tokens keep their source text. The escaped
/// character never opens or closes a section. Unbalanced input swallows the
/// rest of the text into the current token.
pub fn split_by_commas(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    if text.is_empty() {
        return out;
    }

    let mut current = String::new();
    // Expected closing characters, innermost last
    let mut expected: Vec<char> = Vec::new();
    let mut escaped = false;

    for ch in text.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        if ch == '\\' {
            current.push(ch);
            escaped = true;
            continue;
        }

        match expected.last().copied() {
            // Inside quotes only the matching quote means anything
            Some(close) if is_quote(close) => {
                current.push(ch);
                if ch == close {
                    expected.pop();
                }
            }
            Some(close) if ch == close => {
                current.push(ch);
                expected.pop();
            }
            None if ch == ',' => {
                out.push(current.trim().to_string());
                current.clear();
            }
            _ => {
                current.push(ch);
                if let Some(idx) = OPENERS.iter().position(|&o| o == ch) {
                    expected.push(CLOSERS[idx]);
                }
            }
        }
    }

    out.push(current.trim().to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_plain_list() {
        assert_eq!(split_by_commas("a, b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn keeps_nested_commas() {
        assert_eq!(
            split_by_commas(r#"foo, bar(baz, quux), fwip = "hey, hi""#),
            vec!["foo", "bar(baz, quux)", r#"fwip = "hey, hi""#]
        );
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(split_by_commas("").is_empty());
    }

    #[test]
    fn edge_commas_yield_empty_tokens() {
        assert_eq!(split_by_commas(",a,"), vec!["", "a", ""]);
        assert_eq!(split_by_commas("   "), vec![""]);
    }

    #[test]
    fn brackets_nest() {
        assert_eq!(
            split_by_commas("f(g(a, b), c), d"),
            vec!["f(g(a, b), c)", "d"]
        );
        assert_eq!(
            split_by_commas("{a, b = [1, 2]}, c"),
            vec!["{a, b = [1, 2]}", "c"]
        );
    }

    #[test]
    fn generics_stay_together() {
        assert_eq!(
            split_by_commas("m: Map<K, V>, n"),
            vec!["m: Map<K, V>", "n"]
        );
    }

    #[test]
    fn brackets_inside_quotes_are_literal() {
        assert_eq!(
            split_by_commas(r#"a = "(", b"#),
            vec![r#"a = "(""#, "b"]
        );
    }

    #[test]
    fn escaped_quote_does_not_close() {
        assert_eq!(
            split_by_commas(r#"a = "x\", y", b"#),
            vec![r#"a = "x\", y""#, "b"]
        );
    }

    #[test]
    fn escaped_opener_outside_quotes_is_literal() {
        assert_eq!(split_by_commas(r"a\(, b"), vec![r"a\(", "b"]);
    }

    #[test]
    fn unmatched_quote_consumes_rest() {
        assert_eq!(split_by_commas("a, 'b, c"), vec!["a", "'b, c"]);
    }

    #[test]
    fn rejoining_reconstructs_balanced_input() {
        for input in [
            "foo, bar(baz, quux), fwip = \"hey, hi\"",
            "a, {b, c}, d = 'e, f'",
            "x",
        ] {
            assert_eq!(split_by_commas(input).join(", "), input);
        }
    }
}
