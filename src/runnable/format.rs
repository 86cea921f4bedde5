//! Rendering for the two template dialects prompts are stored in.
//!
//! `f-string` templates use `{name}` placeholders with `{{` / `}}` as literal
//! braces. `mustache` templates are rendered by a handlebars registry in
//! non-strict mode, so `{{name}}`, `{{{name}}}`, `{{&name}}`, dotted lookups,
//! comments and `{{#section}}` blocks behave as in mustache, and missing names
//! render empty. Output is not HTML-escaped.

use std::sync::LazyLock;

use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("missing value for template variable '{name}'")]
    MissingVariable { name: String },

    #[error("unbalanced '{brace}' at byte {position} in template")]
    UnbalancedBrace { brace: char, position: usize },

    #[error("invalid mustache template: {reason}")]
    InvalidTemplate { reason: String },

    #[error("value for messages placeholder '{name}' must be a list of messages")]
    InvalidPlaceholder { name: String },

    #[error("unsupported template format '{0}'")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TemplateFormat {
    #[default]
    #[serde(rename = "f-string")]
    FString,
    #[serde(rename = "mustache")]
    Mustache,
}

impl TemplateFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FString => "f-string",
            Self::Mustache => "mustache",
        }
    }

    pub fn parse(s: &str) -> Result<Self, FormatError> {
        match s {
            "f-string" => Ok(Self::FString),
            "mustache" => Ok(Self::Mustache),
            other => Err(FormatError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for TemplateFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render `template` with `values`.
pub fn render(
    template: &str,
    format: TemplateFormat,
    values: &Map<String, Value>,
) -> Result<String, FormatError> {
    match format {
        TemplateFormat::FString => render_fstring(template, values),
        TemplateFormat::Mustache => render_mustache(template, values),
    }
}

/// Top-level variable names a template reads, in order of first use.
///
/// For mustache only the first segment of a dotted name counts, and names used
/// inside sections are resolved against the section's context instead.
pub fn input_variables(template: &str, format: TemplateFormat) -> Result<Vec<String>, FormatError> {
    let mut vars = Vec::new();
    let mut push = |name: &str| {
        if !vars.iter().any(|v| v == name) {
            vars.push(name.to_string());
        }
    };

    match format {
        TemplateFormat::FString => {
            for segment in parse_fstring(template)? {
                if let Segment::Var(name) = segment {
                    push(name);
                }
            }
        }
        TemplateFormat::Mustache => {
            for name in mustache_variables(template)? {
                push(name);
            }
        }
    }
    Ok(vars)
}

// --- f-string ---

enum Segment<'a> {
    Text(&'a str),
    Brace(char),
    Var(&'a str),
}

fn parse_fstring(template: &str) -> Result<Vec<Segment<'_>>, FormatError> {
    let bytes = template.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' if bytes.get(i + 1) == Some(&b'{') => {
                segments.push(Segment::Text(&template[start..i]));
                segments.push(Segment::Brace('{'));
                i += 2;
                start = i;
            }
            b'{' => {
                let close = template[i + 1..]
                    .find('}')
                    .ok_or(FormatError::UnbalancedBrace { brace: '{', position: i })?;
                segments.push(Segment::Text(&template[start..i]));
                segments.push(Segment::Var(template[i + 1..i + 1 + close].trim()));
                i += close + 2;
                start = i;
            }
            b'}' if bytes.get(i + 1) == Some(&b'}') => {
                segments.push(Segment::Text(&template[start..i]));
                segments.push(Segment::Brace('}'));
                i += 2;
                start = i;
            }
            b'}' => return Err(FormatError::UnbalancedBrace { brace: '}', position: i }),
            _ => i += 1,
        }
    }
    segments.push(Segment::Text(&template[start..]));
    Ok(segments)
}

fn render_fstring(template: &str, values: &Map<String, Value>) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len());
    for segment in parse_fstring(template)? {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Brace(c) => out.push(c),
            Segment::Var(name) => {
                let value = values.get(name).ok_or_else(|| FormatError::MissingVariable {
                    name: name.to_string(),
                })?;
                push_value(&mut out, value);
            }
        }
    }
    Ok(out)
}

// --- mustache ---

static MUSTACHE: LazyLock<Handlebars<'static>> = LazyLock::new(|| {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(false);
    registry.register_escape_fn(handlebars::no_escape);
    registry
});

fn render_mustache(template: &str, values: &Map<String, Value>) -> Result<String, FormatError> {
    MUSTACHE
        .render_template(&to_handlebars(template), values)
        .map_err(|e| FormatError::InvalidTemplate {
            reason: e.to_string(),
        })
}

/// Rewrite the mustache-only tag spellings (`{{.}}`, `{{&name}}`) into their
/// handlebars forms.
fn to_handlebars(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open + 2]);
        rest = &rest[open + 2..];
        let Some(close) = rest.find("}}") else {
            break;
        };
        let tag = &rest[..close];
        match tag.trim() {
            "." => out.push_str("this"),
            "{." => out.push_str("{this"),
            t if t.starts_with('&') => {
                let name = t[1..].trim();
                out.push_str(if name == "." { "this" } else { name });
            }
            _ => out.push_str(tag),
        }
        rest = &rest[close..];
    }
    out.push_str(rest);
    out
}

/// Names read at the top level of a mustache template. Sections count by
/// their own name; tags inside them resolve against the section context.
fn mustache_variables(template: &str) -> Result<Vec<&str>, FormatError> {
    let mut names = Vec::new();
    let mut depth = 0usize;
    let mut rest = template;
    let mut offset = 0;

    while let Some(open) = rest.find("{{") {
        let after = &rest[open + 2..];
        let close = after.find("}}").ok_or_else(|| FormatError::InvalidTemplate {
            reason: format!("unclosed tag at byte {}", offset + open),
        })?;
        let tag = after[..close].trim_start_matches('{').trim();
        let consumed = open + 2 + close + 2;
        rest = &rest[consumed..];
        offset += consumed;

        let (sigil, body) = match tag.chars().next() {
            Some(c @ ('!' | '#' | '^' | '/' | '>' | '&')) => (Some(c), tag[1..].trim()),
            _ => (None, tag),
        };
        match sigil {
            Some('!') | Some('>') => continue,
            Some('/') => {
                depth = depth.saturating_sub(1);
                continue;
            }
            _ => {}
        }
        // `#each items` style blocks name their value last.
        let name = body.split_whitespace().last().unwrap_or(body);
        if depth == 0 && !matches!(name, "" | "." | "this" | "else") {
            names.push(name.split('.').next().unwrap_or(name));
        }
        if matches!(sigil, Some('#') | Some('^')) && !body.is_empty() {
            depth += 1;
        }
    }
    Ok(names)
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => out.push_str(s),
        Value::Null => {}
        other => out.push_str(&other.to_string()),
    }
}
