//! Data model shared by the parsers, the formatter and the snippet assembler.

use regex::Regex;
use std::ops::Range;

/// A declaration recognized on the logical line below the doc block opener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Function {
        name: String,
        /// Raw text between the parentheses, if the grammar captured any.
        args: Option<String>,
        is_generator: bool,
    },
    Variable {
        name: String,
        value: String,
    },
}

impl Declaration {
    /// Name as it appears in generated text. Generators keep their `*` marker.
    pub fn display_name(&self) -> String {
        match self {
            Declaration::Function {
                name,
                is_generator: true,
                ..
            } => format!("*{}", name),
            Declaration::Function { name, .. } | Declaration::Variable { name, .. } => {
                name.clone()
            }
        }
    }
}

/// One documented parameter: best-guess type and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub type_name: Option<String>,
    pub name: String,
}

impl Argument {
    pub fn new(type_name: Option<String>, name: impl Into<String>) -> Self {
        Self {
            type_name,
            name: name.into(),
        }
    }
}

/// How a notation rule recognizes a name.
#[derive(Debug, Clone)]
pub enum NotationMatcher {
    /// Literal prefix, e.g. `$` for jQuery elements or `str` for strings.
    Prefix(String),
    /// Free-form pattern searched anywhere in the name.
    Regex(Regex),
}

/// Configured name-pattern to implied-type mapping.
#[derive(Debug, Clone)]
pub struct NotationRule {
    pub matcher: NotationMatcher,
    pub type_name: Option<String>,
    /// Extra tag lines appended to function blocks whose name matches.
    pub tags: Vec<String>,
}

impl NotationRule {
    pub fn matches(&self, name: &str) -> bool {
        match &self.matcher {
            NotationMatcher::Prefix(prefix) => {
                let Some(rest) = name.strip_prefix(prefix.as_str()) else {
                    return false;
                };
                if prefix.ends_with(|c: char| c.is_ascii_lowercase()) {
                    // `str` must not match `string`, only `str` or `strName`
                    rest.is_empty() || rest.starts_with(|c: char| c.is_ascii_uppercase() || c == '_')
                } else {
                    true
                }
            }
            NotationMatcher::Regex(re) => re.is_match(name),
        }
    }
}

/// A single buffer mutation: optionally erase a range, then insert text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub erase: Option<Range<usize>>,
    pub insert_at: usize,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(p: &str) -> NotationRule {
        NotationRule {
            matcher: NotationMatcher::Prefix(p.to_string()),
            type_name: Some("String".to_string()),
            tags: Vec::new(),
        }
    }

    #[test]
    fn lowercase_prefix_needs_word_boundary() {
        let rule = prefix("str");
        assert!(rule.matches("str"));
        assert!(rule.matches("strName"));
        assert!(rule.matches("str_name"));
        assert!(!rule.matches("string"));
        assert!(!rule.matches("name"));
    }

    #[test]
    fn symbol_prefix_matches_anything_after() {
        let rule = prefix("$");
        assert!(rule.matches("$el"));
        assert!(rule.matches("$"));
        assert!(!rule.matches("el"));
    }

    #[test]
    fn regex_rule_searches_anywhere() {
        let rule = NotationRule {
            matcher: NotationMatcher::Regex(Regex::new("Count$").unwrap()),
            type_name: Some("Number".to_string()),
            tags: Vec::new(),
        };
        assert!(rule.matches("itemCount"));
        assert!(!rule.matches("countItems"));
    }

    #[test]
    fn generator_display_name_is_starred() {
        let decl = Declaration::Function {
            name: "items".to_string(),
            args: None,
            is_generator: true,
        };
        assert_eq!(decl.display_name(), "*items");
    }
}
