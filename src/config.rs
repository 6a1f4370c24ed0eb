//! Settings record consumed by every stage of the pipeline.
//!
//! Keys follow the plugin settings file (`BespokeDocs.sublime-settings`), so an
//! existing settings file can be passed to `--settings` unchanged. Every key is
//! optional; missing keys take the defaults from [`Options::default`].

use crate::model::{NotationMatcher, NotationRule};
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::Path;

/// Column alignment of tag lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "FlagOrName")]
pub enum AlignTags {
    None,
    /// Only the tag-name column is padded.
    Shallow,
    /// Every column is padded independently.
    #[default]
    Deep,
}

/// Blank comment lines between tag groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "FlagOrName")]
pub enum SpacerMode {
    #[default]
    Off,
    /// A blank line before every new tag group.
    All,
    /// A single blank line between the description and the first tag.
    AfterDescription,
}

/// Settings values that accept either a boolean or a mode name.
#[derive(Deserialize)]
#[serde(untagged)]
enum FlagOrName {
    Flag(bool),
    Name(String),
}

impl TryFrom<FlagOrName> for AlignTags {
    type Error = String;

    fn try_from(value: FlagOrName) -> Result<Self, Self::Error> {
        match value {
            FlagOrName::Flag(false) => Ok(AlignTags::None),
            FlagOrName::Flag(true) => Ok(AlignTags::Shallow),
            FlagOrName::Name(name) => match name.as_str() {
                "none" => Ok(AlignTags::None),
                "shallow" => Ok(AlignTags::Shallow),
                "deep" => Ok(AlignTags::Deep),
                other => Err(format!(
                    "unknown align_tags mode: {}. Use none, shallow, or deep",
                    other
                )),
            },
        }
    }
}

impl TryFrom<FlagOrName> for SpacerMode {
    type Error = String;

    fn try_from(value: FlagOrName) -> Result<Self, Self::Error> {
        match value {
            FlagOrName::Flag(false) => Ok(SpacerMode::Off),
            FlagOrName::Flag(true) => Ok(SpacerMode::All),
            FlagOrName::Name(name) => match name.as_str() {
                "after_description" => Ok(SpacerMode::AfterDescription),
                other => Err(format!(
                    "unknown spacer_between_sections mode: {}. Use true, false, or \"after_description\"",
                    other
                )),
            },
        }
    }
}

/// Immutable configuration threaded through one run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Options {
    pub indentation_spaces: usize,
    /// Indentation of wrapped continuation lines; falls back to `indentation_spaces`.
    pub indentation_spaces_same_para: Option<usize>,
    pub align_tags: AlignTags,
    pub min_spaces_between_columns: usize,
    pub function_description: bool,
    pub param_description: bool,
    pub param_name: bool,
    pub prefer_param: bool,
    pub return_description: bool,
    pub return_tag: String,
    pub autoadd_method_tag: bool,
    #[serde(deserialize_with = "deserialize_notations")]
    pub notation_map: Vec<NotationRule>,
    pub extra_tags: Vec<String>,
    pub extra_tags_go_after: bool,
    pub spacer_between_sections: SpacerMode,
    pub lower_case_primitives: bool,
    pub short_primitives: bool,
    pub newline_after_block: bool,
    pub per_section_indent: bool,
    pub simple_mode: bool,
    /// Replaces `type` in the `@type` tag of variable blocks.
    pub override_js_var: Option<String>,
    /// Document the function as a property setter: a lone `@private`.
    pub as_setter: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            indentation_spaces: 1,
            indentation_spaces_same_para: None,
            align_tags: AlignTags::Deep,
            min_spaces_between_columns: 1,
            function_description: true,
            param_description: true,
            param_name: true,
            prefer_param: true,
            return_description: true,
            return_tag: "@return".to_string(),
            autoadd_method_tag: false,
            notation_map: Vec::new(),
            extra_tags: Vec::new(),
            extra_tags_go_after: false,
            spacer_between_sections: SpacerMode::Off,
            lower_case_primitives: false,
            short_primitives: false,
            newline_after_block: false,
            per_section_indent: false,
            simple_mode: false,
            override_js_var: None,
            as_setter: false,
        }
    }
}

impl Options {
    /// Parse a JSON settings document.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid settings")
    }

    /// Read and parse a JSON settings file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings: {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Indentation after the comment leader, as a string of spaces.
    pub fn indent(&self) -> String {
        " ".repeat(self.indentation_spaces)
    }

    pub fn indent_same_para(&self) -> String {
        " ".repeat(
            self.indentation_spaces_same_para
                .unwrap_or(self.indentation_spaces),
        )
    }

    /// Return tag spelling, e.g. `@return` or `@returns`.
    pub fn return_tag(&self) -> &str {
        if self.return_tag.is_empty() {
            "@return"
        } else {
            &self.return_tag
        }
    }
}

#[derive(Deserialize)]
struct RawNotation {
    prefix: Option<String>,
    regex: Option<String>,
    #[serde(rename = "type")]
    type_name: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

fn deserialize_notations<'de, D>(deserializer: D) -> Result<Vec<NotationRule>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<RawNotation> = Vec::deserialize(deserializer)?;
    let mut rules = Vec::with_capacity(raw.len());
    for entry in raw {
        let matcher = if let Some(prefix) = entry.prefix {
            NotationMatcher::Prefix(prefix)
        } else if let Some(pattern) = entry.regex {
            let re = Regex::new(&pattern).map_err(|e| {
                serde::de::Error::custom(format!("invalid notation regex {:?}: {}", pattern, e))
            })?;
            NotationMatcher::Regex(re)
        } else {
            tracing::warn!("notation rule without prefix or regex never matches, skipping");
            continue;
        };
        rules.push(NotationRule {
            matcher,
            type_name: entry.type_name,
            tags: entry.tags,
        });
    }
    Ok(rules)
}
