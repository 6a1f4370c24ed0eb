//! Declaration parsing, with the dialect chosen by lexical scope.
//!
//! Each dialect recognizes function and variable declarations on one logical
//! line and guesses types from literal values. Matching is heuristic: every
//! matcher returns `Option` and an unrecognized line simply yields `None`.

pub mod coffee;
pub mod javascript;

use crate::buffer::TextBuffer;
use crate::config::Options;
use crate::model::{Argument, Declaration};
use crate::split::split_by_commas;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Identifier pattern shared by both dialects. Technically identifiers can
/// contain all sorts of unicode, but this covers real code.
pub(crate) const IDENTIFIER: &str = r"[a-zA-Z_$][a-zA-Z_$0-9]*";

/// Lines read past the cursor while balancing parentheses.
pub const MAX_DEFINITION_LINES: usize = 25;

static RE_SOURCE_SCOPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bsource\.([a-z+\-]+)").unwrap());

static RE_LINE_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"//.*").unwrap());

static RE_BLOCK_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/\*.*\*/").unwrap());

static RE_ARG_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/\*.*?\*/").unwrap());

static RE_DEFAULT_VALUE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*=\s*").unwrap());

static RE_EXISTING_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\*").unwrap());

static RE_VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?P<name>{})\s*[=:]\s*(?P<val>.*?)(?:[;,]|$)",
        IDENTIFIER
    ))
    .unwrap()
});

/// Fixed per-dialect rendering settings.
#[derive(Debug, Clone, Copy)]
pub struct DialectSettings {
    /// Appended on its own line after the comment body.
    pub comment_closer: &'static str,
    /// Wrap types in `{...}`.
    pub curly_types: bool,
    /// Emit type annotations at all.
    pub type_info: bool,
}

/// Source dialects, selected from the scope at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    JavaScript,
    CoffeeScript,
}

impl Dialect {
    /// Detect the dialect from a scope name such as `source.coffee`.
    pub fn from_scope(scope: &str) -> Self {
        match RE_SOURCE_SCOPE
            .captures(scope)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
        {
            Some("coffee") => Dialect::CoffeeScript,
            _ => Dialect::JavaScript,
        }
    }
}

/// Declaration grammar and type heuristics for one dialect.
pub trait Parser {
    fn settings(&self) -> &DialectSettings;

    /// Pattern marking where a function declaration starts on its first line.
    /// Parentheses before it are not counted when balancing.
    fn function_opener(&self) -> Option<&Regex>;

    fn parse_function(&self, line: &str) -> Option<Declaration>;

    fn guess_from_value(&self, value: &str, opts: &Options) -> Option<String>;

    /// Whether `{a, b}` parameters expand into `options.a`, `options.b`.
    fn supports_destructuring(&self) -> bool {
        false
    }

    fn parse_var(&self, line: &str) -> Option<Declaration> {
        let caps = RE_VARIABLE.captures(line)?;
        Some(Declaration::Variable {
            name: caps["name"].to_string(),
            value: caps["val"].trim().to_string(),
        })
    }

    /// Recognize a declaration: functions first, then variables.
    fn parse(&self, line: &str, opts: &Options) -> Option<Declaration> {
        if opts.simple_mode {
            return None;
        }
        if let Some(decl) = self.parse_function(line) {
            debug!(?decl, "matched function declaration");
            return Some(decl);
        }
        let decl = self.parse_var(line);
        match &decl {
            Some(decl) => debug!(?decl, "matched variable declaration"),
            None => debug!(line, "no declaration recognized"),
        }
        decl
    }

    /// Turn a raw argument string into `(type, name)` pairs.
    fn parse_args(&self, args: &str, opts: &Options) -> Vec<Argument> {
        let args = RE_ARG_COMMENT.replace_all(args, "");
        split_by_commas(&args)
            .iter()
            .flat_map(|token| self.arg_info(token, opts))
            .collect()
    }

    /// Arguments derived from one top-level token.
    fn arg_info(&self, token: &str, opts: &Options) -> Vec<Argument> {
        let destructured = self.supports_destructuring()
            && token.len() >= 2
            && token.starts_with('{')
            && token.ends_with('}');
        if destructured {
            return split_by_commas(&token[1..token.len() - 1])
                .iter()
                .map(|item| {
                    let (type_name, name) = self.name_and_type(item, opts);
                    Argument::new(type_name, format!("options.{}", name))
                })
                .collect();
        }
        let (type_name, name) = self.name_and_type(token, opts);
        vec![Argument::new(type_name, name)]
    }

    /// Split `name = default` and guess the type from the default value.
    /// Rest parameters (`...rest`) are typed `...[type]`.
    fn name_and_type(&self, arg: &str, opts: &Options) -> (Option<String>, String) {
        let mut parts = RE_DEFAULT_VALUE.splitn(arg, 2);
        let name = parts.next().unwrap_or_default();
        if let Some(rest) = name.strip_prefix("...") {
            return (Some("...[type]".to_string()), rest.to_string());
        }
        let type_name = parts
            .next()
            .and_then(|value| self.guess_from_value(value, opts));
        (type_name, name.to_string())
    }
}

/// Create the parser for the scope at the cursor.
pub fn create_parser(scope: &str) -> Box<dyn Parser> {
    match Dialect::from_scope(scope) {
        Dialect::CoffeeScript => Box::new(coffee::CoffeeParser),
        Dialect::JavaScript => Box::new(javascript::JavaScriptParser),
    }
}

/// True if the line continues an existing doc comment (` * ...`).
pub fn is_existing_comment(line: &str) -> bool {
    RE_EXISTING_COMMENT.is_match(line)
}

/// Read the logical declaration line starting at `point`.
///
/// Lines are stripped of comments and concatenated until parentheses
/// balance or [`MAX_DEFINITION_LINES`] lines have been read. Returns `None`
/// if there is no line at `point`.
pub fn read_definition(
    buffer: &dyn TextBuffer,
    mut point: usize,
    parser: &dyn Parser,
) -> Option<String> {
    let mut definition = String::new();
    let mut open_brackets: i64 = 0;
    let mut lines_read = 0;

    while lines_read < MAX_DEFINITION_LINES {
        let Some(raw) = buffer.read_line(point) else {
            break;
        };
        lines_read += 1;
        point += raw.len() + 1;

        let line = RE_LINE_COMMENT.replace_all(&raw, "");
        let line = RE_BLOCK_COMMENT.replace_all(&line, "").into_owned();

        // On the first line, only count from where the function starts:
        // `(function (foo, bar) { ... })`
        let mut search = line.as_str();
        if definition.is_empty() {
            if let Some(m) = parser.function_opener().and_then(|re| re.find(&line)) {
                search = &line[m.start()..];
            }
        }
        open_brackets += count_parens(search);

        definition.push_str(&line);
        if open_brackets == 0 {
            return Some(definition);
        }
    }

    if lines_read == 0 {
        return None;
    }
    if lines_read == MAX_DEFINITION_LINES {
        warn!(
            lines = MAX_DEFINITION_LINES,
            "parentheses never balanced, using partial declaration"
        );
    }
    Some(definition)
}

/// Net parenthesis depth change over `text`.
fn count_parens(text: &str) -> i64 {
    text.chars()
        .map(|c| match c {
            '(' => 1,
            ')' => -1,
            _ => 0,
        })
        .sum()
}
