use crate::error::{DispatchError, LoadError};
use crate::rules::MatchResult;
use crate::template::Template;
use rand::seq::SliceRandom;
use rand::RngCore;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::read_to_string;
use std::path::Path;

/// Returned whenever no usable intent/response mapping is found.
pub const FALLBACK_RESPONSE: &str = "Could not figure out a proper response. Please try again.";

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct ResponseEntry {
    messages: Vec<String>,
}

/// Response templates keyed by intent label.
#[derive(Debug, Clone, Default)]
pub struct ResponseSet {
    entries: HashMap<String, Vec<Template>>,
}

impl ResponseSet {
    /// Builds a set from raw template strings, parsing each one.
    pub fn from_pairs<I, K, V, S>(pairs: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = HashMap::new();
        for (intent, messages) in pairs {
            let intent = intent.into();
            let templates = messages
                .into_iter()
                .map(|message| parse_template(&intent, message.as_ref()))
                .collect::<Result<Vec<_>, _>>()?;
            entries.insert(intent, templates);
        }
        Ok(Self { entries })
    }

    /// Parses `{ "<intent>": { "messages": [...] } }`.
    pub fn from_json_str(content: &str, path: &Path) -> Result<Self, LoadError> {
        let raw: HashMap<String, ResponseEntry> =
            serde_json::from_str(content).map_err(|e| LoadError::json(path, e))?;
        Self::from_pairs(raw.into_iter().map(|(intent, entry)| (intent, entry.messages)))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        let responses = Self::from_json_str(&content, path)?;
        log::info!(
            "Loaded responses for {} intents from '{}'",
            responses.len(),
            path.display()
        );
        Ok(responses)
    }

    /// Candidate templates for `intent`; `None` when the intent is unknown or has no templates.
    pub fn templates(&self, intent: &str) -> Option<&[Template]> {
        self.entries
            .get(intent)
            .map(Vec::as_slice)
            .filter(|templates| !templates.is_empty())
    }

    pub fn contains(&self, intent: &str) -> bool {
        self.entries.contains_key(intent)
    }

    pub fn intents(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Turns a classification into the outgoing message.
    ///
    /// No match, an unknown intent and an empty template list all produce
    /// [`FALLBACK_RESPONSE`]. Otherwise one template is drawn uniformly from `rng`.
    /// Without captures the template text is returned as authored.
    pub fn render(
        &self,
        result: &MatchResult,
        rng: &mut dyn RngCore,
    ) -> Result<String, DispatchError> {
        let (intent, captures) = match result {
            MatchResult::Matched { intent, captures } => (intent, captures),
            MatchResult::NoMatch => {
                log::debug!("No rule matched, using fallback");
                return Ok(FALLBACK_RESPONSE.to_string());
            }
        };

        let template = match self.templates(intent).and_then(|t| t.choose(rng)) {
            Some(template) => template,
            None => {
                log::debug!("No responses for intent '{}', using fallback", intent);
                return Ok(FALLBACK_RESPONSE.to_string());
            }
        };

        if captures.is_empty() {
            return Ok(template.source().to_string());
        }

        template
            .render(captures)
            .map_err(|missing| DispatchError::TemplateMismatch {
                intent: intent.clone(),
                required: missing.required,
                available: missing.available,
            })
    }
}

fn parse_template(intent: &str, message: &str) -> Result<Template, LoadError> {
    Template::parse(message).map_err(|source| LoadError::Template {
        intent: intent.to_string(),
        template: message.to_string(),
        source,
    })
}
