use crate::bot::Bot;
use crate::responses::ResponseSet;
use crate::rules::{MatchResult, RuleSet};

/// Regex intent dispatcher: first matching rule picks the intent, its
/// captures fill a randomly chosen response template.
///
/// Immutable after construction, so one instance can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct IntentDispatcher {
    rules: RuleSet,
    responses: ResponseSet,
}

impl IntentDispatcher {
    pub fn new(rules: RuleSet, responses: ResponseSet) -> Self {
        Self { rules, responses }
    }
}

impl Bot for IntentDispatcher {
    fn name(&self) -> &str {
        "pattern"
    }

    fn classify(&self, text: &str) -> MatchResult {
        self.rules.classify(text)
    }

    fn responses(&self) -> &ResponseSet {
        &self.responses
    }
}
