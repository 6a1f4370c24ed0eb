//! The doc block command: runs after a `/**` opener and produces one edit.

use crate::buffer::TextBuffer;
use crate::config::Options;
use crate::format::TagFormatter;
use crate::model::Edit;
use crate::parser::{create_parser, is_existing_comment, read_definition, Parser};
use crate::snippet::{escape, SnippetAssembler};
use anyhow::{bail, Result};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static RE_TRAILING_CLOSER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\*/\s*$").unwrap());

/// Text after the cursor, used as the description. A trailing `*/` is dropped.
pub fn trailing_description(text: &str) -> String {
    escape(&RE_TRAILING_CLOSER.replace(text.trim(), ""))
}

pub struct DocBlockCommand<'a> {
    opts: &'a Options,
}

impl<'a> DocBlockCommand<'a> {
    pub fn new(opts: &'a Options) -> Self {
        Self { opts }
    }

    /// Generate the comment for the declaration below `point` and apply it.
    pub fn run(&self, buffer: &mut dyn TextBuffer, point: usize, inline: bool) -> Result<Edit> {
        if point > buffer.size() {
            bail!(
                "cursor at byte {} is past the end of the buffer ({} bytes)",
                point,
                buffer.size()
            );
        }
        if !buffer.is_char_boundary(point) {
            bail!("cursor at byte {} is not on a character boundary", point);
        }

        let line_end = buffer.line_region(point).end;
        let trailing = point..line_end;
        let description = trailing_description(&buffer.substr(trailing.clone()));

        let scope = buffer.scope_name(point);
        let parser = create_parser(&scope);
        let definition =
            read_definition(&*buffer, line_end + 1, parser.as_ref()).unwrap_or_default();

        let edit = if is_existing_comment(&definition) {
            debug!("continuing an existing comment");
            Edit {
                erase: None,
                insert_at: point,
                text: format!("\n *{}", self.opts.indent()),
            }
        } else {
            Edit {
                erase: Some(trailing),
                insert_at: point,
                text: self.render(parser.as_ref(), &definition, inline, &description),
            }
        };

        buffer.apply(&edit);
        Ok(edit)
    }

    /// The text inserted after the opener for a logical line in `scope`.
    pub fn snippet_for(&self, line: &str, scope: &str, inline: bool, name_override: &str) -> String {
        let parser = create_parser(scope);
        self.render(parser.as_ref(), line, inline, name_override)
    }

    fn render(&self, parser: &dyn Parser, line: &str, inline: bool, name_override: &str) -> String {
        let lines = parser
            .parse(line, self.opts)
            .map(|decl| {
                TagFormatter::new(parser, self.opts)
                    .inline(inline)
                    .name_override(Some(name_override))
                    .format(&decl)
            })
            .unwrap_or_default();

        SnippetAssembler::new(self.opts, parser.settings(), name_override).assemble(&lines, inline)
    }
}
