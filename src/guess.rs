//! Type guessing from identifier names.
//!
//! Value-based guessing differs per dialect and lives on each parser; the
//! name rules here are shared.

use crate::model::NotationRule;
use regex::Regex;
use std::sync::LazyLock;

static RE_BOOL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:is|has)[A-Z_]").unwrap());

static RE_CALLBACK_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:cb|callback|done|next|fn)$").unwrap());

/// Base type names that notation rules may refer to by alias.
const BASE_TYPES: &[(&str, &str)] = &[("bool", "Boolean"), ("function", "Function")];

/// Resolve a notation rule's type through the base type table.
pub fn resolve_type(name: &str) -> String {
    BASE_TYPES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, full)| full.to_string())
        .unwrap_or_else(|| name.to_string())
}

/// All notation rules matching `name`, in configuration order.
pub fn matching_notations<'a>(
    name: &'a str,
    rules: &'a [NotationRule],
) -> impl Iterator<Item = &'a NotationRule> + 'a {
    rules.iter().filter(move |rule| rule.matches(name))
}

/// Guess a type from an identifier name alone.
///
/// The first matching notation rule wins. Only if no rule matches do the
/// built-in `isFoo`/`hasFoo` and callback-name rules apply.
pub fn guess_from_name(name: &str, rules: &[NotationRule]) -> Option<String> {
    if let Some(rule) = matching_notations(name, rules).next() {
        if let Some(ty) = &rule.type_name {
            return Some(resolve_type(ty));
        }
    }

    if RE_BOOL_NAME.is_match(name) {
        return Some("Boolean".to_string());
    }

    if RE_CALLBACK_NAME.is_match(name) {
        return Some("Function".to_string());
    }

    None
}

/// True if the literal parses as a floating point number.
pub fn is_numeric(value: &str) -> bool {
    value.trim().parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NotationMatcher;

    fn rule(prefix: &str, ty: Option<&str>) -> NotationRule {
        NotationRule {
            matcher: NotationMatcher::Prefix(prefix.to_string()),
            type_name: ty.map(str::to_string),
            tags: Vec::new(),
        }
    }

    #[test]
    fn boolean_names() {
        assert_eq!(guess_from_name("isOpen", &[]).as_deref(), Some("Boolean"));
        assert_eq!(guess_from_name("has_items", &[]).as_deref(), Some("Boolean"));
        assert_eq!(guess_from_name("island", &[]), None);
    }

    #[test]
    fn callback_names() {
        for name in ["cb", "callback", "done", "next", "fn"] {
            assert_eq!(guess_from_name(name, &[]).as_deref(), Some("Function"));
        }
        assert_eq!(guess_from_name("nextItem", &[]), None);
    }

    #[test]
    fn first_matching_rule_wins() {
        let rules = vec![rule("$", Some("HTMLElement")), rule("$", Some("jQuery"))];
        assert_eq!(
            guess_from_name("$el", &rules).as_deref(),
            Some("HTMLElement")
        );
    }

    #[test]
    fn rule_types_resolve_aliases() {
        let rules = vec![rule("b", Some("bool"))];
        assert_eq!(guess_from_name("bVisible", &rules).as_deref(), Some("Boolean"));
    }

    #[test]
    fn typeless_rule_falls_through_to_builtins() {
        let rules = vec![rule("is", None)];
        assert_eq!(guess_from_name("isOpen", &rules).as_deref(), Some("Boolean"));
    }

    #[test]
    fn numeric_literals() {
        assert!(is_numeric("1"));
        assert!(is_numeric("-2.5"));
        assert!(is_numeric("1e3"));
        assert!(!is_numeric("0x"));
        assert!(!is_numeric("foo"));
    }
}
