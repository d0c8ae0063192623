//! Placeholder Renderer
//!
//! Substitutes user input into `{{NAME}}` tokens. The vocabulary is a closed
//! table: adding a token means adding a `Placeholder` variant and an
//! `InputValues` field, and the compiler points at every match to update.

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

/// Any upper-case `{{NAME}}` token, known or not
const TOKEN_PATTERN: &str = r"\{\{([A-Z_]+)\}\}";

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("token pattern is a valid regex"))
}

/// The five recognized placeholder tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    Lhost,
    Rhost,
    Port,
    Url,
    WordlistPath,
}

impl Placeholder {
    pub const ALL: [Placeholder; 5] = [
        Placeholder::Lhost,
        Placeholder::Rhost,
        Placeholder::Port,
        Placeholder::Url,
        Placeholder::WordlistPath,
    ];

    /// Token name as written between the braces
    pub fn name(&self) -> &'static str {
        match self {
            Placeholder::Lhost => "LHOST",
            Placeholder::Rhost => "RHOST",
            Placeholder::Port => "PORT",
            Placeholder::Url => "URL",
            Placeholder::WordlistPath => "WORDLIST_PATH",
        }
    }

    /// Full token including braces, e.g. `{{PORT}}`
    pub fn token(&self) -> &'static str {
        match self {
            Placeholder::Lhost => "{{LHOST}}",
            Placeholder::Rhost => "{{RHOST}}",
            Placeholder::Port => "{{PORT}}",
            Placeholder::Url => "{{URL}}",
            Placeholder::WordlistPath => "{{WORDLIST_PATH}}",
        }
    }

    /// Input field name used by config files and the interactive `set`
    pub fn field(&self) -> &'static str {
        match self {
            Placeholder::Lhost => "lhost",
            Placeholder::Rhost => "rhost",
            Placeholder::Port => "port",
            Placeholder::Url => "url",
            Placeholder::WordlistPath => "wordlist_path",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Accepts the field name or the token name, any case. `wordlist` is
    /// accepted as a short form of `wordlist_path`.
    pub fn from_field(field: &str) -> Option<Self> {
        let field = field.to_ascii_lowercase();
        if field == "wordlist" {
            return Some(Placeholder::WordlistPath);
        }
        Self::ALL
            .into_iter()
            .find(|p| p.field() == field || p.name().eq_ignore_ascii_case(&field))
    }
}

impl std::fmt::Display for Placeholder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Values the user typed into the input panel; any may be empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InputValues {
    pub lhost: String,
    pub rhost: String,
    pub port: String,
    pub url: String,
    pub wordlist_path: String,
}

impl InputValues {
    pub fn get(&self, placeholder: Placeholder) -> &str {
        match placeholder {
            Placeholder::Lhost => &self.lhost,
            Placeholder::Rhost => &self.rhost,
            Placeholder::Port => &self.port,
            Placeholder::Url => &self.url,
            Placeholder::WordlistPath => &self.wordlist_path,
        }
    }

    pub fn set(&mut self, placeholder: Placeholder, value: impl Into<String>) {
        let slot = match placeholder {
            Placeholder::Lhost => &mut self.lhost,
            Placeholder::Rhost => &mut self.rhost,
            Placeholder::Port => &mut self.port,
            Placeholder::Url => &mut self.url,
            Placeholder::WordlistPath => &mut self.wordlist_path,
        };
        *slot = value.into();
    }

    /// Non-empty fields of `overrides` replace the corresponding fields here
    pub fn overlay(mut self, overrides: &InputValues) -> Self {
        for placeholder in Placeholder::ALL {
            let value = overrides.get(placeholder);
            if !value.is_empty() {
                self.set(placeholder, value);
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        Placeholder::ALL.iter().all(|p| self.get(*p).is_empty())
    }

    /// Empty every field
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Substitute every known token whose value is non-empty.
///
/// Empty values leave the literal token in place. Unknown or malformed
/// brace sequences are copied through. Inserted values are never rescanned,
/// so a value that itself looks like a token stays as typed: this differs
/// from chained per-token string replacement, where `lhost = "{{PORT}}"`
/// would go on to be replaced by the port.
pub fn render(template: &str, values: &InputValues) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        match Placeholder::ALL
            .into_iter()
            .find(|p| tail.starts_with(p.token()))
        {
            Some(placeholder) => {
                let value = values.get(placeholder);
                if value.is_empty() {
                    out.push_str(placeholder.token());
                } else {
                    out.push_str(value);
                }
                rest = &tail[placeholder.token().len()..];
            }
            None => {
                // Advance one brace so "{{{PORT}}}" still finds "{{PORT}}"
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Piece of rendered text, for highlighting unfilled placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}

/// Split text into literal runs and `{{NAME}}` tokens (any upper-case name)
pub fn placeholder_segments(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;
    for m in token_regex().find_iter(text) {
        if m.start() > last {
            segments.push(Segment::Text(&text[last..m.start()]));
        }
        segments.push(Segment::Placeholder(m.as_str()));
        last = m.end();
    }
    if last < text.len() {
        segments.push(Segment::Text(&text[last..]));
    }
    segments
}

/// Names inside every `{{NAME}}` token in `text`, in order of appearance
pub fn token_names(text: &str) -> impl Iterator<Item = &str> {
    token_regex()
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
}

/// Known placeholders still present in `text`, each listed once
pub fn unfilled_placeholders(text: &str) -> Vec<Placeholder> {
    Placeholder::ALL
        .into_iter()
        .filter(|p| text.contains(p.token()))
        .collect()
}
