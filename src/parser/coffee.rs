//! CoffeeScript (indentation dialect) declaration grammar.
//!
//! Functions look like `name = (args) ->` or `name: =>`. Multi-line
//! parameter lists are not supported, so there is no function opener.

use super::javascript::primitive;
use super::{DialectSettings, Parser, IDENTIFIER};
use crate::config::Options;
use crate::guess::is_numeric;
use crate::model::Declaration;
use regex::Regex;
use std::sync::LazyLock;

static SETTINGS: DialectSettings = DialectSettings {
    comment_closer: "###",
    curly_types: true,
    type_info: true,
};

static RE_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?:(?P<name>{})\s*[:=]\s*)?(?:\((?P<args>[^()]*?)\))?\s*[=-]>",
        IDENTIFIER
    ))
    .unwrap()
});

static RE_REGEXP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:RegExp\b|/[^/])").unwrap());

static RE_NEW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"new ({})", IDENTIFIER)).unwrap());

pub struct CoffeeParser;

impl Parser for CoffeeParser {
    fn settings(&self) -> &DialectSettings {
        &SETTINGS
    }

    fn function_opener(&self) -> Option<&Regex> {
        None
    }

    fn parse_function(&self, line: &str) -> Option<Declaration> {
        let caps = RE_FUNCTION.captures(line)?;
        let name = caps.name("name").map_or("", |m| m.as_str());
        let args = caps
            .name("args")
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty());

        Some(Declaration::Function {
            name: name.to_string(),
            args: args.map(str::to_string),
            is_generator: false,
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
        if first == '[' {
            return Some("Array".to_string());
        }
        if first == '{' {
            return Some("Object".to_string());
        }
        if value == "true" || value == "false" {
            return Some(primitive("Boolean", lower));
        }
        if RE_REGEXP.is_match(value) {
            return Some("RegExp".to_string());
        }
        if value.starts_with("new ") {
            return RE_NEW.captures(value).map(|caps| caps[1].to_string());
        }
        None
    }
}
