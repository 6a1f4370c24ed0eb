//! JavaScript (curly-brace dialect) declaration grammar.
//!
//! Recognizes, in priority order:
//! - `name = function* name2(args)` and `function name(args)`
//! - ES6 arrow functions: `x => y`, `(x, y) => y`, `(x = 4) => y`
//! - method shorthand: `getName() { ... }`

use super::{DialectSettings, Parser, IDENTIFIER};
use crate::config::Options;
use crate::guess::is_numeric;
use crate::model::Declaration;
use regex::Regex;
use std::sync::LazyLock;

static SETTINGS: DialectSettings = DialectSettings {
    comment_closer: " */",
    curly_types: true,
    type_info: true,
};

static RE_FN_OPENER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?:function[\s*]*(?:{id})?\s*\(|(?:{id}|\(.*\)\s*=>)|(?:{id}\s*\(.*\)\s*\{{))",
        id = IDENTIFIER
    ))
    .unwrap()
});

// fnName = function, fnName : function, function* fnName(arg1, arg2)
static RE_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?:(?P<name1>{id})\s*[:=]\s*)?function(?P<generator>[\s*]+)?(?P<name2>{id})?\s*\(\s*(?P<args>.*)\)",
        id = IDENTIFIER
    ))
    .unwrap()
});

static RE_ARROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?:(?P<args>{id})|\(\s*(?P<args2>.*)\))\s*=>",
        id = IDENTIFIER
    ))
    .unwrap()
});

// var person = { getName() { return this.name; } }
static RE_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?P<name1>{id})\s*\((?P<args>.*)\)\s*\{{",
        id = IDENTIFIER
    ))
    .unwrap()
});

static RE_REGEXP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:RegExp\b|/[^/])").unwrap());

static RE_NEW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"new ({})", IDENTIFIER)).unwrap());

pub struct JavaScriptParser;

impl Parser for JavaScriptParser {
    fn settings(&self) -> &DialectSettings {
        &SETTINGS
    }

    fn function_opener(&self) -> Option<&Regex> {
        Some(&RE_FN_OPENER)
    }

    fn supports_destructuring(&self) -> bool {
        true
    }

    fn parse_function(&self, line: &str) -> Option<Declaration> {
        let caps = RE_FUNCTION
            .captures(line)
            .or_else(|| RE_ARROW.captures(line))
            .or_else(|| RE_METHOD.captures(line))?;

        let group = |name: &str| {
            caps.name(name)
                .map(|m| m.as_str())
                .filter(|s| !s.is_empty())
        };

        // "name1 = function name2(foo)" prefers name1
        let name = group("name1").or_else(|| group("name2")).unwrap_or_default();
        let is_generator = group("generator").is_some_and(|g| g.contains('*'));
        let args = group("args").or_else(|| group("args2"));

        Some(Declaration::Function {
            name: name.to_string(),
            args: args.map(str::to_string),
            is_generator,
        })
    }

    fn guess_from_value(&self, value: &str, opts: &Options) -> Option<String> {
        let lower = opts.lower_case_primitives;
        let first = value.chars().next()?;

        if is_numeric(value) {
            return Some(primitive("Number", lower));
        }
        if first == '"' || first == '\'' {
            return Some(primitive("String", lower));
        }
        // Array and Object keep their case even with lowered primitives
        if first == '[' {
            return Some("Array".to_string());
        }
        if first == '{' {
            return Some("Object".to_string());
        }
        if value == "true" || value == "false" {
            let name = if opts.short_primitives { "Bool" } else { "Boolean" };
            return Some(primitive(name, lower));
        }
        if RE_REGEXP.is_match(value) {
            return Some("RegExp".to_string());
        }
        if value.contains("=>") {
            return Some(primitive("Function", lower));
        }
        if value.starts_with("new ") {
            return RE_NEW.captures(value).map(|caps| caps[1].to_string());
        }
        None
    }
}

/// Primitive type name, lowercased when configured.
pub(crate) fn primitive(name: &str, lower: bool) -> String {
    if lower {
        name.to_lowercase()
    } else {
        name.to_string()
    }
}
