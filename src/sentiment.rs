use crate::bot::Bot;
use crate::error::LoadError;
use crate::responses::ResponseSet;
use crate::rules::MatchResult;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::read_to_string;
use std::path::Path;

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\w']+").expect("token regex is a valid literal"));

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LexiconData {
    labels: HashMap<String, Vec<String>>,
}

/// Word-to-label lexicon, e.g. `"great" -> "positive"`.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    words: HashMap<String, String>,
}

impl Lexicon {
    pub fn from_labels<I, L, W, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = (L, W)>,
        L: Into<String>,
        W: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words = HashMap::new();
        for (label, label_words) in labels {
            let label = label.into();
            for word in label_words {
                words.insert(word.as_ref().to_lowercase(), label.clone());
            }
        }
        Self { words }
    }

    /// Reads `{ "labels": { "<label>": ["word", ...] } }`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        let data: LexiconData =
            serde_json::from_str(&content).map_err(|e| LoadError::json(path, e))?;
        let lexicon = Self::from_labels(data.labels);
        log::info!(
            "Loaded {} lexicon words from '{}'",
            lexicon.words.len(),
            path.display()
        );
        Ok(lexicon)
    }

    pub fn label_of(&self, word: &str) -> Option<&str> {
        self.words.get(word).map(String::as_str)
    }
}

/// Sentiment bot: votes each known word towards its label and answers with
/// the label's responses. Ties and inputs without known words get the fallback.
#[derive(Debug, Clone)]
pub struct SentimentBot {
    lexicon: Lexicon,
    responses: ResponseSet,
}

impl SentimentBot {
    pub fn new(lexicon: Lexicon, responses: ResponseSet) -> Self {
        Self { lexicon, responses }
    }
}

impl Bot for SentimentBot {
    fn name(&self) -> &str {
        "sentiment"
    }

    fn preprocess(&self, text: &str) -> String {
        text.to_lowercase()
    }

    fn classify(&self, text: &str) -> MatchResult {
        let mut votes: BTreeMap<&str, usize> = BTreeMap::new();
        for token in TOKEN_RE.find_iter(text) {
            if let Some(label) = self.lexicon.label_of(token.as_str()) {
                *votes.entry(label).or_insert(0) += 1;
            }
        }

        let Some(top) = votes.values().copied().max() else {
            return MatchResult::NoMatch;
        };
        let mut leaders = votes.iter().filter(|(_, &count)| count == top);
        match (leaders.next(), leaders.next()) {
            (Some((label, _)), None) => {
                log::debug!("Sentiment '{}' with {} votes", label, top);
                MatchResult::Matched {
                    intent: label.to_string(),
                    captures: Vec::new(),
                }
            }
            _ => {
                log::debug!("Sentiment tie at {} votes: {:?}", top, votes);
                MatchResult::NoMatch
            }
        }
    }

    fn responses(&self) -> &ResponseSet {
        &self.responses
    }
}
