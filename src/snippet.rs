//! Snippet assembly: variable substitution, column alignment, tab-stop
//! renumbering, section spacing and the final comment text.
//!
//! Tab-stops use the `${N:text}` placeholder syntax. Literal `$`, `{` and `}`
//! in user-derived text are escaped with a backslash.

use crate::config::{AlignTags, Options, SpacerMode};
use crate::parser::DialectSettings;
use chrono::{DateTime, FixedOffset, Local};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static RE_TEMPLATE_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").unwrap());

static RE_TAB_STOP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\$\{)\d+(:[^}]+\})").unwrap());

static RE_TAB_STOP_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{\d+:([^}]+)\}").unwrap());

// `${1:x}` or `$0`, not preceded by an escaping backslash
static RE_ANY_TAB_STOP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\\])\$(?:\{\d+:|\d)").unwrap());

static RE_TAG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*@([a-zA-Z]+)").unwrap());

/// Escape snippet metacharacters in literal text.
pub fn escape(text: &str) -> String {
    text.replace('$', "\\$")
        .replace('{', "\\{")
        .replace('}', "\\}")
}

/// A provisional tab-stop around `text`.
pub fn tab_stop(text: &str) -> String {
    format!("${{1:{}}}", text)
}

/// Width of `text` once the editor expands it: `${1:foo}` counts as `foo`.
fn output_width(text: &str) -> usize {
    RE_TAB_STOP_TEXT
        .replace_all(text, "$1")
        .replace("\\$", "$")
        .chars()
        .count()
}

/// Replace `{{date}}` and `{{datetime}}` with the current local time.
pub fn substitute_variables(lines: &[String]) -> Vec<String> {
    substitute_variables_at(lines, Local::now().fixed_offset())
}

/// Replace template variables using a fixed timestamp. Unknown variables are
/// left untouched.
pub fn substitute_variables_at(lines: &[String], now: DateTime<FixedOffset>) -> Vec<String> {
    lines
        .iter()
        .map(|line| {
            RE_TEMPLATE_VAR
                .replace_all(line, |caps: &Captures| match &caps[1] {
                    "date" => now.format("%Y-%m-%d").to_string(),
                    "datetime" => now.format("%Y-%m-%dT%H:%M:%S%z").to_string(),
                    _ => caps[0].to_string(),
                })
                .into_owned()
        })
        .collect()
}

/// Give a block with no tab-stops a final `$0` stop after its last line.
pub fn ensure_final_stop(lines: &mut [String]) {
    if lines.iter().any(|line| RE_ANY_TAB_STOP.is_match(line)) {
        return;
    }
    if let Some(last) = lines.last_mut() {
        last.push_str("$0");
    }
}

/// Renumber tab-stops 1, 2, 3... in top-to-bottom, left-to-right order.
pub fn fix_tab_stops(lines: &[String]) -> Vec<String> {
    let mut next = 0;
    lines
        .iter()
        .map(|line| {
            RE_TAB_STOP
                .replace_all(line, |caps: &Captures| {
                    next += 1;
                    format!("{}{}{}", &caps[1], next, &caps[2])
                })
                .into_owned()
        })
        .collect()
}

// -- Column alignment ---------------------------------------------------------

#[derive(Debug, Clone)]
enum Row {
    Text(String),
    /// Only `@author` counts toward column 0; the rest is never re-spaced.
    Author(String),
    Tag(TagRow),
}

#[derive(Debug, Clone)]
struct TagRow {
    cells: Vec<String>,
    /// Spaces after each cell; empty until aligned.
    gaps: Vec<usize>,
}

impl TagRow {
    fn render(&self) -> String {
        if self.gaps.is_empty() {
            return self.cells.join(" ");
        }
        let mut out = String::new();
        for (cell, gap) in self.cells.iter().zip(&self.gaps) {
            out.push_str(cell);
            out.push_str(&" ".repeat(*gap));
        }
        out.trim().to_string()
    }
}

/// Comment lines split into columns for alignment.
///
/// Tag lines (starting with `@`) are split on single spaces, so a double
/// space marks an intentionally empty column. The split is kept, which makes
/// [`TagBlock::align`] idempotent. Rendered lines are not re-parsed: once
/// padded, an empty column cannot be told apart from padding.
#[derive(Debug, Clone)]
pub struct TagBlock {
    rows: Vec<Row>,
}

impl TagBlock {
    pub fn parse(lines: &[String]) -> Self {
        let rows = lines
            .iter()
            .map(|line| {
                if line.starts_with("@author") {
                    Row::Author(line.clone())
                } else if line.starts_with('@') {
                    Row::Tag(TagRow {
                        cells: line.split(' ').map(str::to_string).collect(),
                        gaps: Vec::new(),
                    })
                } else {
                    Row::Text(line.clone())
                }
            })
            .collect();
        Self { rows }
    }

    /// Pad tag columns to shared widths.
    pub fn align(&mut self, opts: &Options) {
        // With per-section indenting the return and yield lines keep their own spacing
        let return_tag = opts.per_section_indent.then(|| opts.return_tag());

        let widths: Vec<Vec<usize>> = self
            .rows
            .iter()
            .filter_map(|row| match row {
                Row::Author(_) => Some(vec![output_width("@author")]),
                Row::Tag(tag) => {
                    if let Some(rt) = return_tag {
                        let line = tag.cells.join(" ");
                        if line.starts_with(rt) || line.starts_with("@yield") {
                            return None;
                        }
                    }
                    Some(tag.cells.iter().map(|c| output_width(c)).collect())
                }
                Row::Text(_) => None,
            })
            .collect();

        let max_cols = widths.iter().map(Vec::len).max().unwrap_or(0);
        let counted = match opts.align_tags {
            AlignTags::Shallow => max_cols.min(1),
            _ => max_cols,
        };
        let mut max_widths = vec![0; max_cols];
        for (i, max) in max_widths.iter_mut().enumerate().take(counted) {
            *max = widths.iter().filter_map(|w| w.get(i)).copied().max().unwrap_or(0);
        }

        for row in &mut self.rows {
            if let Row::Tag(tag) = row {
                tag.gaps = tag
                    .cells
                    .iter()
                    .enumerate()
                    .map(|(i, cell)| {
                        let target = max_widths.get(i).copied().unwrap_or(0);
                        opts.min_spaces_between_columns + target.saturating_sub(output_width(cell))
                    })
                    .collect();
            }
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| match row {
                Row::Text(text) | Row::Author(text) => text.clone(),
                Row::Tag(tag) => tag.render(),
            })
            .collect()
    }
}

// -- Spacing and assembly -----------------------------------------------------

fn tag_name(line: &str) -> Option<&str> {
    RE_TAG_NAME
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Insert blank comment lines between sections.
pub fn insert_spacers(lines: Vec<String>, opts: &Options) -> Vec<String> {
    match opts.spacer_between_sections {
        SpacerMode::All => {
            let mut out = Vec::with_capacity(lines.len() * 2);
            let mut last_tag: Option<String> = None;
            for line in lines {
                if let Some(tag) = tag_name(&line) {
                    if last_tag.as_deref() != Some(tag) {
                        // No blank above the first group when there is no description
                        if opts.function_description || last_tag.is_some() {
                            out.push(String::new());
                        }
                        last_tag = Some(tag.to_string());
                    }
                }
                out.push(line);
            }
            out
        }
        SpacerMode::AfterDescription if opts.function_description => {
            let mut out = Vec::with_capacity(lines.len() + 1);
            let mut seen_tag = false;
            for line in lines {
                if !seen_tag && tag_name(&line).is_some() {
                    out.push(String::new());
                    seen_tag = true;
                }
                out.push(line);
            }
            out
        }
        _ => lines,
    }
}

/// Build the comment body and closer from the final lines.
pub fn create_snippet(
    lines: &[String],
    opts: &Options,
    settings: &DialectSettings,
    placeholder: &str,
) -> String {
    let indent = opts.indent();
    let mut snippet = String::new();
    if lines.is_empty() {
        snippet.push_str(&format!("\n *{}${{0:{}}}", indent, placeholder));
    } else {
        for line in lines {
            snippet.push_str("\n *");
            if !line.is_empty() {
                snippet.push_str(&indent);
                snippet.push_str(line);
            }
        }
    }
    snippet.push('\n');
    snippet.push_str(settings.comment_closer);
    snippet
}

/// Post-processes formatted tag lines into the text inserted after the opener.
pub struct SnippetAssembler<'a> {
    opts: &'a Options,
    settings: &'a DialectSettings,
    /// Body of the lone `${0:...}` stop when nothing was recognized.
    placeholder: &'a str,
}

impl<'a> SnippetAssembler<'a> {
    pub fn new(opts: &'a Options, settings: &'a DialectSettings, placeholder: &'a str) -> Self {
        Self {
            opts,
            settings,
            placeholder,
        }
    }

    pub fn assemble(&self, lines: &[String], inline: bool) -> String {
        let mut lines = substitute_variables(lines);

        if !inline && self.opts.align_tags != AlignTags::None && !lines.is_empty() {
            let mut block = TagBlock::parse(&lines);
            block.align(self.opts);
            lines = block.lines();
        }

        let mut lines = fix_tab_stops(&lines);

        if inline {
            // Only the first line is shown
            lines.truncate(1);
            ensure_final_stop(&mut lines);
            return match lines.first() {
                Some(first) => format!(" {} */", first),
                None => " $0 */".to_string(),
            };
        }

        ensure_final_stop(&mut lines);
        let lines = insert_spacers(lines, self.opts);
        let mut snippet = create_snippet(&lines, self.opts, self.settings, self.placeholder);
        if self.opts.newline_after_block {
            snippet.push('\n');
        }
        snippet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn strings(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    const JS: DialectSettings = DialectSettings {
        comment_closer: " */",
        curly_types: true,
        type_info: true,
    };

    fn function_lines() -> Vec<String> {
        strings(&[
            "${1:[foo description]}",
            "@param {${1:[type]}} bar ${1:[description]}",
            "@param {${1:[type]}} baz ${1:[description]}",
            "@return {${1:[type]}}  ${1:[description]}",
        ])
    }

    fn aligned(lines: &[String], opts: &Options) -> Vec<String> {
        let mut block = TagBlock::parse(lines);
        block.align(opts);
        block.lines()
    }

    #[test]
    fn escapes_snippet_characters() {
        assert_eq!(escape("$a{b}"), "\\$a\\{b\\}");
    }

    #[test]
    fn width_ignores_tab_stop_syntax() {
        assert_eq!(output_width("{${1:[type]}}"), 8);
        assert_eq!(output_width("\\$el"), 3);
        assert_eq!(output_width(""), 0);
    }

    #[test]
    fn substitutes_known_variables() {
        let now = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
            .unwrap();
        let lines = substitute_variables_at(
            &strings(&["@since {{date}}", "@at {{datetime}}", "@x {{other}}"]),
            now,
        );
        assert_eq!(
            lines,
            strings(&["@since 2024-03-09", "@at 2024-03-09T14:05:07+0200", "@x {{other}}"])
        );
    }

    #[test]
    fn renumbers_tab_stops_in_order() {
        let lines = fix_tab_stops(&function_lines());
        assert_eq!(
            lines,
            strings(&[
                "${1:[foo description]}",
                "@param {${2:[type]}} bar ${3:[description]}",
                "@param {${4:[type]}} baz ${5:[description]}",
                "@return {${6:[type]}}  ${7:[description]}",
            ])
        );
    }

    #[test]
    fn empty_tab_stops_are_not_renumbered() {
        assert_eq!(fix_tab_stops(&strings(&["${0:}"])), strings(&["${0:}"]));
    }

    #[test]
    fn deep_alignment() {
        let lines = aligned(&function_lines(), &Options::default());
        assert_eq!(
            lines,
            strings(&[
                "${1:[foo description]}",
                "@param  {${1:[type]}} bar ${1:[description]}",
                "@param  {${1:[type]}} baz ${1:[description]}",
                "@return {${1:[type]}}     ${1:[description]}",
            ])
        );
    }

    #[test]
    fn shallow_alignment_pads_only_tag_names() {
        let opts = Options {
            align_tags: AlignTags::Shallow,
            ..Options::default()
        };
        let lines = aligned(
            &strings(&["@param {${1:[type]}} longName x", "@return {${1:[type]}} y"]),
            &opts,
        );
        assert_eq!(
            lines,
            strings(&["@param  {${1:[type]}} longName x", "@return {${1:[type]}} y"])
        );
    }

    #[test]
    fn alignment_is_idempotent() {
        let variants = [
            Options::default(),
            Options {
                align_tags: AlignTags::Shallow,
                ..Options::default()
            },
            Options {
                per_section_indent: true,
                min_spaces_between_columns: 3,
                ..Options::default()
            },
        ];
        for opts in &variants {
            let mut block = TagBlock::parse(&function_lines());
            block.align(opts);
            let once = block.lines();
            block.align(opts);
            assert_eq!(block.lines(), once);
            block.align(opts);
            assert_eq!(block.lines(), once);
        }
    }

    #[test]
    fn per_section_indent_skips_yield_width() {
        let opts = Options {
            per_section_indent: true,
            ..Options::default()
        };
        let lines = aligned(
            &strings(&[
                "@param {${1:[type]}} a ${1:[description]}",
                "@yields {${1:[type]}} ${1:[description]}",
            ]),
            &opts,
        );
        assert_eq!(
            lines,
            strings(&[
                "@param {${1:[type]}} a ${1:[description]}",
                "@yields {${1:[type]}} ${1:[description]}",
            ])
        );
    }

    #[test]
    fn block_without_stops_gets_final_stop() {
        let mut lines = strings(&["@private"]);
        ensure_final_stop(&mut lines);
        assert_eq!(lines, strings(&["@private$0"]));

        let mut lines = strings(&["${1:a}", "@b"]);
        ensure_final_stop(&mut lines);
        assert_eq!(lines, strings(&["${1:a}", "@b"]));

        // Escaped dollars are not stops
        let mut lines = strings(&["@x \\$1"]);
        ensure_final_stop(&mut lines);
        assert_eq!(lines, strings(&["@x \\$1$0"]));
    }

    #[test]
    fn setter_block_ends_on_final_stop() {
        let opts = Options::default();
        let assembler = SnippetAssembler::new(&opts, &JS, "");
        assert_eq!(
            assembler.assemble(&strings(&["@private"]), false),
            "\n * @private$0\n */"
        );
        assert_eq!(assembler.assemble(&strings(&["@private"]), true), " @private$0 */");
    }

    #[test]
    fn author_lines_are_kept_verbatim() {
        let lines = aligned(
            &strings(&["@author Jane  Doe", "@param {${1:[type]}} a"]),
            &Options::default(),
        );
        assert_eq!(lines[0], "@author Jane  Doe");
        assert_eq!(lines[1], "@param  {${1:[type]}} a");
    }

    #[test]
    fn per_section_indent_skips_return_width() {
        let opts = Options {
            per_section_indent: true,
            ..Options::default()
        };
        let lines = aligned(
            &strings(&["@param {${1:[type]}} a", "@return {${1:[type]}}"]),
            &opts,
        );
        assert_eq!(
            lines,
            strings(&["@param {${1:[type]}} a", "@return {${1:[type]}}"])
        );
    }

    #[test]
    fn wider_gap_setting() {
        let opts = Options {
            min_spaces_between_columns: 2,
            ..Options::default()
        };
        let lines = aligned(&strings(&["@param {${1:T}} a"]), &opts);
        assert_eq!(lines, strings(&["@param  {${1:T}}  a"]));
    }

    #[test]
    fn spacers_between_all_sections() {
        let opts = Options {
            spacer_between_sections: SpacerMode::All,
            ..Options::default()
        };
        let lines = insert_spacers(function_lines(), &opts);
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1], "");
        assert!(lines[2].starts_with("@param"));
        assert!(lines[3].starts_with("@param"));
        assert_eq!(lines[4], "");
        assert!(lines[5].starts_with("@return"));
    }

    #[test]
    fn spacers_skip_first_group_without_description() {
        let opts = Options {
            spacer_between_sections: SpacerMode::All,
            function_description: false,
            ..Options::default()
        };
        let lines = insert_spacers(function_lines()[1..].to_vec(), &opts);
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("@param"));
        assert_eq!(lines[2], "");
    }

    #[test]
    fn spacer_after_description_only_once() {
        let opts = Options {
            spacer_between_sections: SpacerMode::AfterDescription,
            ..Options::default()
        };
        let lines = insert_spacers(function_lines(), &opts);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "");
        assert_eq!(lines.iter().filter(|l| l.is_empty()).count(), 1);

        let opts = Options {
            function_description: false,
            ..opts
        };
        assert_eq!(insert_spacers(function_lines(), &opts).len(), 4);
    }

    #[test]
    fn empty_snippet_gets_zero_stop() {
        let snippet = create_snippet(&[], &Options::default(), &JS, "note");
        assert_eq!(snippet, "\n * ${0:note}\n */");
    }

    #[test]
    fn blank_lines_have_no_indent() {
        let snippet = create_snippet(&strings(&["a", "", "@b"]), &Options::default(), &JS, "");
        assert_eq!(snippet, "\n * a\n *\n * @b\n */");
    }

    #[test]
    fn assembles_full_block() {
        let opts = Options::default();
        let snippet = SnippetAssembler::new(&opts, &JS, "").assemble(&function_lines(), false);
        assert_eq!(
            snippet,
            "\n * ${1:[foo description]}\
             \n * @param  {${2:[type]}} bar ${3:[description]}\
             \n * @param  {${4:[type]}} baz ${5:[description]}\
             \n * @return {${6:[type]}}     ${7:[description]}\
             \n */"
        );
    }

    #[test]
    fn inline_uses_first_line_only() {
        let opts = Options::default();
        let assembler = SnippetAssembler::new(&opts, &JS, "");
        assert_eq!(
            assembler.assemble(&strings(&["@type {${1:Number}} ${1:[description]}"]), true),
            " @type {${1:Number}} ${2:[description]} */"
        );
        assert_eq!(assembler.assemble(&[], true), " $0 */");
    }

    #[test]
    fn newline_after_block() {
        let opts = Options {
            newline_after_block: true,
            ..Options::default()
        };
        let snippet = SnippetAssembler::new(&opts, &JS, "").assemble(&[], false);
        assert_eq!(snippet, "\n * ${0:}\n */\n");
    }
}
