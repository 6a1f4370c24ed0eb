//! Operations on an existing doc block: reparse, join and wrap.
//!
//! Each returns an [`Edit`] or `None` when there is nothing to change.

use crate::buffer::TextBuffer;
use crate::config::{Options, SpacerMode};
use crate::model::Edit;
use crate::snippet::escape;
use regex::{Captures, Regex};
use std::ops::Range;
use std::sync::LazyLock;

static RE_LEADING_STARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s+\*").unwrap());

static RE_BRACKETED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\[.+?\])").unwrap());

static RE_LINE_JOIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]*\n[ \t]*((?:\*|//[!/]?|#)[ \t]*)?").unwrap());

static RE_FIRST_BODY_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\* ").unwrap());

static RE_CLOSING_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\n\s*\*/").unwrap());

static RE_LEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n(\s*\*)").unwrap());

static RE_EMPTY_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(\s*\*\s*\n)+").unwrap());

// The `@` is not consumed; it starts the next paragraph.
static RE_PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}|\n\s*\*\s*@").unwrap());

static RE_LINE_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:\n|^)\s*\*\s*").unwrap());

/// Region of the `/** ... */` block around `point`, closer included.
pub fn docblock_region(buffer: &dyn TextBuffer, point: usize) -> Option<Range<usize>> {
    let text = buffer.substr(0..buffer.size());
    let point = point.min(text.len());
    // Let a point inside the opener find it
    let search_end = (point + 3).min(text.len());
    let start = text.get(..search_end)?.rfind("/**")?;
    let end = text[start + 3..].find("*/").map(|idx| start + 3 + idx + 2)?;
    (point <= end).then_some(start..end)
}

/// Turn every `[bracketed]` span in the block into a numbered tab-stop.
pub fn reparse(buffer: &dyn TextBuffer, point: usize) -> Option<Edit> {
    let region = docblock_region(buffer, point)?;
    let text = escape(&buffer.substr(region.clone()));
    let text = RE_LEADING_STARS.replace_all(&text, "\n *");

    let mut next = 0;
    let text = RE_BRACKETED.replace_all(&text, |caps: &Captures| {
        next += 1;
        format!("${{{}:{}}}", next, &caps[1])
    });

    Some(Edit {
        erase: Some(region.clone()),
        insert_at: region.start,
        text: text.into_owned(),
    })
}

/// Join the line at `point` with the next one, dropping the comment leader.
pub fn join_lines(buffer: &dyn TextBuffer, point: usize) -> Option<Edit> {
    let start = buffer.line_region(point).start;
    let rest = buffer.substr(start..buffer.size());
    let m = RE_LINE_JOIN.find(&rest)?;
    Some(Edit {
        erase: Some(start + m.start()..start + m.end()),
        insert_at: start + m.start(),
        text: " ".to_string(),
    })
}

#[derive(Debug)]
struct WrappedPara {
    text: String,
    /// The last line starts with a tag.
    line_tagged: bool,
    tagged: bool,
    tag: String,
}

/// Re-wrap the description text of the block around `point`.
pub fn wrap_lines(
    buffer: &dyn TextBuffer,
    point: usize,
    opts: &Options,
    width: usize,
    tab_size: usize,
) -> Option<Edit> {
    let region = docblock_region(buffer, point)?;
    let block = buffer.substr(region.clone());

    let start = RE_FIRST_BODY_LINE.find(&block)?.start();
    let end = RE_CLOSING_LINE.find(&block)?.start();
    if end <= start {
        return None;
    }
    let text = &block[start..end];

    let leader = RE_LEADER.captures(text)?;
    let indentation = leader[1].replace('\t', &" ".repeat(tab_size)).chars().count();
    let wrap_length = width as i64 - (indentation as i64 - tab_size as i64);

    let text = RE_EMPTY_LINES.replace_all(text, "\n\n");

    let paragraphs: Vec<WrappedPara> = split_paragraphs(&text)
        .into_iter()
        .map(|para| wrap_paragraph(para, opts, wrap_length))
        .collect();

    let spacer_all = opts.spacer_between_sections == SpacerMode::All;
    let spacer_after_description = opts.spacer_between_sections == SpacerMode::AfterDescription;

    let mut out = String::new();
    for (i, para) in paragraphs.iter().enumerate() {
        out.push_str(&para.text);
        let Some(next) = paragraphs.get(i + 1) else {
            break;
        };
        let next_is_same_tag = next.tagged && para.tag == next.tag;
        let joined = (para.line_tagged || next.tagged)
            && !(spacer_all && !next_is_same_tag)
            && !(!para.line_tagged && next.tagged && spacer_after_description);
        if !joined {
            out.push_str("\n *");
        }
    }

    Some(Edit {
        erase: Some(region.start + start..region.start + end),
        insert_at: region.start + start,
        text: out,
    })
}

fn split_paragraphs(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut last = 0;
    for m in RE_PARAGRAPH_BREAK.find_iter(text) {
        out.push(&text[last..m.start()]);
        last = if m.as_str().ends_with('@') {
            m.end() - 1
        } else {
            m.end()
        };
    }
    out.push(&text[last..]);
    out
}

fn wrap_paragraph(para: &str, opts: &Options, wrap_length: i64) -> WrappedPara {
    let para = RE_LINE_PREFIX.replace_all(para, " ");
    let first_indent = opts.indent();
    let next_indent = opts.indent_same_para();

    let mut text = String::from("\n");
    let mut line = format!(" *{}", first_indent);
    let mut line_tagged = false;
    let mut tagged = false;
    let mut line_is_new = true;
    let mut tag = String::new();

    for word in para.trim().split(' ') {
        if word.is_empty() && !line_tagged {
            continue;
        }
        if line_is_new && word.starts_with('@') {
            line_tagged = true;
            tagged = true;
            tag = word.to_string();
        }

        let length = (line.chars().count() + word.chars().count()) as i64;
        if length >= wrap_length - 1 {
            text.push_str(line.trim_end());
            text.push('\n');
            line = format!(" *{}{} ", next_indent, word);
            line_tagged = false;
            line_is_new = true;
        } else {
            line.push_str(word);
            line.push(' ');
        }
        line_is_new = false;
    }

    text.push_str(line.trim_end());
    WrappedPara {
        text,
        line_tagged,
        tagged,
        tag,
    }
}
