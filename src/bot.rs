use crate::error::DispatchError;
use crate::responses::ResponseSet;
use crate::rules::MatchResult;
use rand::RngCore;

/// A bot answers one message at a time: normalise the text, classify it,
/// then turn the classification into a response.
///
/// Implementors only decide how text is classified; response selection and
/// the fallback message are shared through [`ResponseSet::render`].
pub trait Bot: Send + Sync {
    /// Short name used in logs and the health endpoint.
    fn name(&self) -> &str;

    fn preprocess(&self, text: &str) -> String {
        text.to_string()
    }

    fn classify(&self, text: &str) -> MatchResult;

    fn responses(&self) -> &ResponseSet;

    /// Runs the full pipeline with an explicit random source.
    fn respond_with(&self, text: &str, rng: &mut dyn RngCore) -> Result<String, DispatchError> {
        let text = self.preprocess(text);
        let result = self.classify(&text);
        log::debug!(
            "{} bot classified input as {:?} ({} captures)",
            self.name(),
            result.intent(),
            result.captures().map_or(0, <[String]>::len)
        );
        self.responses().render(&result, rng)
    }

    fn respond(&self, text: &str) -> Result<String, DispatchError> {
        self.respond_with(text, &mut rand::thread_rng())
    }
}
