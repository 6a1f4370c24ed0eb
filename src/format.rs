//! Tag line generation for a recognized declaration.
//!
//! Output lines may contain `${1:...}` tab-stops; indices are provisional and
//! renumbered later by [`crate::snippet::fix_tab_stops`].

use crate::config::{AlignTags, Options};
use crate::guess::{guess_from_name, matching_notations};
use crate::model::Declaration;
use crate::parser::Parser;
use crate::snippet::{escape, tab_stop};
use regex::Regex;
use std::sync::LazyLock;

static RE_CONSTRUCTOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]").unwrap());

static RE_MUTATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[$_]?(?:set|add)(?:$|[A-Z_])").unwrap());

static RE_PREDICATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[$_]?(?:is|has)(?:$|[A-Z_])").unwrap());

/// Outcome of return-type resolution for a function name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    /// No return line: constructors, setters, generators.
    Suppressed,
    Known(String),
    Unknown,
}

/// Builds the ordered tag lines for one declaration.
pub struct TagFormatter<'a> {
    parser: &'a dyn Parser,
    opts: &'a Options,
    inline: bool,
    name_override: Option<&'a str>,
}

impl<'a> TagFormatter<'a> {
    pub fn new(parser: &'a dyn Parser, opts: &'a Options) -> Self {
        Self {
            parser,
            opts,
            inline: false,
            name_override: None,
        }
    }

    /// Single-line `/** ... */` output.
    pub fn inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    /// Literal description used instead of `[name description]`.
    pub fn name_override(mut self, text: Option<&'a str>) -> Self {
        self.name_override = text.filter(|t| !t.is_empty());
        self
    }

    pub fn format(&self, decl: &Declaration) -> Vec<String> {
        match decl {
            Declaration::Function {
                name,
                args,
                is_generator,
            } => self.format_function(
                name,
                &decl.display_name(),
                args.as_deref().filter(|a| !a.is_empty()),
                *is_generator,
            ),
            Declaration::Variable { name, value } => self.format_variable(name, value),
        }
    }

    fn format_function(
        &self,
        name: &str,
        display_name: &str,
        args: Option<&str>,
        is_generator: bool,
    ) -> Vec<String> {
        let opts = self.opts;
        let mut out = Vec::new();

        if opts.as_setter {
            out.push("@private".to_string());
            return out;
        }

        if opts.function_description {
            let description = match self.name_override {
                Some(text) => text.to_string(),
                None if display_name.is_empty() => "[description]".to_string(),
                None => format!("[{} description]", escape(display_name)),
            };
            out.push(tab_stop(&description));
        }

        if opts.autoadd_method_tag {
            out.push(format!("@method {}", escape(display_name)));
        }

        if !opts.extra_tags_go_after {
            out.extend(opts.extra_tags.iter().cloned());
        }

        if let Some(args) = args {
            let tag = if opts.prefer_param { "@param" } else { "@arg" };
            for arg in self.parser.parse_args(args, opts) {
                let type_name = arg
                    .type_name
                    .clone()
                    .or_else(|| guess_from_name(&arg.name, &opts.notation_map))
                    .unwrap_or_else(|| "[type]".to_string());
                let mut line = format!("{} {}", tag, self.type_info(&escape(&type_name), true));
                if opts.param_name {
                    line.push_str(&escape(&arg.name));
                }
                if opts.param_description {
                    line.push(' ');
                    line.push_str(&tab_stop("[description]"));
                }
                out.push(line);
            }
        }

        match self.return_type(name, is_generator) {
            ReturnType::Suppressed => {}
            resolved => {
                let type_name = match resolved {
                    ReturnType::Known(t) => t,
                    _ => "[type]".to_string(),
                };
                let mut line = opts.return_tag().to_string();
                if self.parser.settings().type_info {
                    line.push(' ');
                    line.push_str(self.type_info(&type_name, false).as_str());
                }
                if opts.return_description {
                    line.push(' ');
                    // Empty column so the description lines up with parameter descriptions
                    if args.is_some()
                        && opts.align_tags == AlignTags::Deep
                        && !opts.per_section_indent
                    {
                        line.push(' ');
                    }
                    line.push_str(&tab_stop("[description]"));
                }
                out.push(line);
            }
        }

        for rule in matching_notations(display_name, &opts.notation_map) {
            out.extend(rule.tags.iter().cloned());
        }

        if is_generator {
            // `@returns` pairs with `@yields`, `@return` with `@yield`
            let plural = if opts.return_tag().ends_with('s') { "s" } else { "" };
            let mut line = format!("@yield{} {{{}}}", plural, tab_stop("[type]"));
            if opts.return_description {
                line.push(' ');
                line.push_str(&tab_stop("[description]"));
            }
            out.push(line);
        }

        if opts.extra_tags_go_after {
            out.extend(opts.extra_tags.iter().cloned());
        }

        out
    }

    fn format_variable(&self, name: &str, value: &str) -> Vec<String> {
        let opts = self.opts;
        let type_name = if value.is_empty() {
            "[type]".to_string()
        } else {
            self.parser
                .guess_from_value(value, opts)
                .or_else(|| guess_from_name(name, &opts.notation_map))
                .unwrap_or_else(|| "[type]".to_string())
        };
        let type_tag = opts.override_js_var.as_deref().unwrap_or("type");
        let type_line = format!("@{} {}", type_tag, self.type_info(&type_name, false));

        if self.inline {
            return vec![format!(
                "{} {}",
                type_line,
                tab_stop("[description]")
            )];
        }

        let description = match self.name_override {
            Some(text) => text.to_string(),
            None => format!("[{} description]", escape(name)),
        };
        vec![tab_stop(&description), type_line]
    }

    /// `{${1:type}}`, with a trailing space when it precedes a name.
    fn type_info(&self, type_name: &str, trailing_space: bool) -> String {
        let settings = self.parser.settings();
        if !settings.type_info {
            return String::new();
        }
        let (open, close) = if settings.curly_types { ("{", "}") } else { ("", "") };
        format!(
            "{}{}{}{}",
            open,
            tab_stop(type_name),
            close,
            if trailing_space { " " } else { "" }
        )
    }

    /// Resolve what a function returns from its name alone.
    pub fn return_type(&self, name: &str, is_generator: bool) -> ReturnType {
        if is_generator || RE_CONSTRUCTOR.is_match(name) || RE_MUTATOR.is_match(name) {
            return ReturnType::Suppressed;
        }
        if RE_PREDICATE.is_match(name) {
            return ReturnType::Known("Boolean".to_string());
        }
        match guess_from_name(name, &self.opts.notation_map) {
            Some(t) => ReturnType::Known(t),
            None => ReturnType::Unknown,
        }
    }
}
