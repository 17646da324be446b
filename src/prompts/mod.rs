//! Prompt templates.
//!
//! The built-in set is compiled in from `prompts/*.txt`. A directory given via
//! `ADHIKAAR_PROMPTS_DIR` may replace any subset of the files.
//!
//! Placeholders are `{name}` where `name` is `[a-z_][a-z0-9_]*`; every other
//! brace (JSON examples in the templates) is literal.

mod error;

#[cfg(test)]
mod tests;

pub use error::PromptError;

use std::path::Path;
use tracing::info;

/// Bumped whenever a built-in template changes meaning.
pub const PROMPT_SET_VERSION: &str = "2025.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    Classify,
    ClassifyRepair,
    Answer,
    AnswerRepair,
    WebSearch,
}

impl PromptKind {
    pub const ALL: [PromptKind; 5] = [
        PromptKind::Classify,
        PromptKind::ClassifyRepair,
        PromptKind::Answer,
        PromptKind::AnswerRepair,
        PromptKind::WebSearch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PromptKind::Classify => "classify",
            PromptKind::ClassifyRepair => "classify_repair",
            PromptKind::Answer => "answer",
            PromptKind::AnswerRepair => "answer_repair",
            PromptKind::WebSearch => "web_search",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.txt", self.name())
    }

    fn builtin(self) -> &'static str {
        match self {
            PromptKind::Classify => include_str!("../../prompts/classify.txt"),
            PromptKind::ClassifyRepair => include_str!("../../prompts/classify_repair.txt"),
            PromptKind::Answer => include_str!("../../prompts/answer.txt"),
            PromptKind::AnswerRepair => include_str!("../../prompts/answer_repair.txt"),
            PromptKind::WebSearch => include_str!("../../prompts/web_search.txt"),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone)]
pub struct PromptSet {
    templates: [String; 5],
    overridden: Vec<PromptKind>,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptSet {
    pub fn builtin() -> Self {
        Self {
            templates: PromptKind::ALL.map(|kind| kind.builtin().to_string()),
            overridden: Vec::new(),
        }
    }

    /// Built-in templates, with any `<name>.txt` found in `dir` taking precedence.
    pub fn load(dir: Option<&Path>) -> Result<Self, PromptError> {
        let mut set = Self::builtin();
        let Some(dir) = dir else {
            return Ok(set);
        };

        for kind in PromptKind::ALL {
            let path = dir.join(kind.file_name());
            if !path.is_file() {
                continue;
            }

            let content = std::fs::read_to_string(&path).map_err(|source| PromptError::Io {
                path: path.clone(),
                source,
            })?;
            if content.trim().is_empty() {
                return Err(PromptError::EmptyOverride { path });
            }

            set.templates[kind.index()] = content;
            set.overridden.push(kind);
        }

        info!(
            version = PROMPT_SET_VERSION,
            overrides = set.overridden.len(),
            dir = %dir.display(),
            "Prompt templates loaded"
        );

        Ok(set)
    }

    pub fn template(&self, kind: PromptKind) -> &str {
        &self.templates[kind.index()]
    }

    pub fn is_overridden(&self, kind: PromptKind) -> bool {
        self.overridden.contains(&kind)
    }

    /// Substitutes `vars` into the template. Values are inserted verbatim and
    /// never rescanned for placeholders.
    pub fn render(&self, kind: PromptKind, vars: &[(&str, &str)]) -> Result<String, PromptError> {
        render_template(kind.name(), self.template(kind), vars)
    }
}

fn is_placeholder_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn render_template(
    template_name: &'static str,
    template: &str,
    vars: &[(&str, &str)],
) -> Result<String, PromptError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let candidate = after.find('}').map(|close| (&after[..close], close));
        match candidate {
            Some((name, close)) if is_placeholder_name(name) => {
                let value = vars
                    .iter()
                    .find(|(k, _)| *k == name)
                    .map(|(_, v)| *v)
                    .ok_or_else(|| PromptError::MissingVariable {
                        template: template_name,
                        name: name.to_string(),
                    })?;
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None if is_placeholder_name(after.split_whitespace().next().unwrap_or("")) => {
                return Err(PromptError::Unterminated {
                    template: template_name,
                });
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    Ok(out)
}
