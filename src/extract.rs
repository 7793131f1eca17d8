//! Fact extraction strategies run after each exchange
//!
//! An ordered strategy chain produces at most one fact per request: the
//! rule-based name extractor runs first, and only when it does not fire is
//! the exchange summarized by the generation service. Nothing in this module
//! ever fails the caller; persistence and summarization errors are logged
//! and swallowed.

use crate::Result;
use crate::db::{Fact, FactRepo};
use crate::genai::Generator;

/// Trigger phrase for rule-based name extraction (matched case-insensitively)
const NAME_TRIGGER: &str = "my name is";

/// Instruction for the summarization fallback
const SUMMARY_INSTRUCTION: &str = "Compress the following exchange into exactly one short \
declarative sentence describing something persistent about the user, written from the user's \
perspective in the third person (e.g. \"The user enjoys hiking.\"). If the exchange reveals \
nothing persistent about the user, respond with an empty string. Output only the sentence, \
nothing else.";

/// Rule-based name extraction
///
/// Fires when the message contains the trigger phrase. Takes the first
/// whitespace-delimited token after the trigger, trims surrounding
/// punctuation, and case-folds it. Returns the synthesized fact content.
#[must_use]
pub fn extract_name_fact(message: &str) -> Option<String> {
    let lower = message.to_lowercase();
    let idx = lower.find(NAME_TRIGGER)?;
    let rest = &lower[idx + NAME_TRIGGER.len()..];

    let token = rest.split_whitespace().next()?;
    let name = token.trim_matches(|c: char| !c.is_alphanumeric());
    if name.is_empty() {
        return None;
    }

    Some(format!("The user's name is {name}."))
}

/// Post-turn fact extractor: name rule first, summarization fallback
#[derive(Debug, Clone)]
pub struct FactExtractor<G> {
    generator: G,
    repo: FactRepo,
}

impl<G: Generator> FactExtractor<G> {
    /// Create a new extractor
    pub const fn new(generator: G, repo: FactRepo) -> Self {
        Self { generator, repo }
    }

    /// Run the strategy chain over a completed exchange
    ///
    /// Persists and returns at most one fact. A name-rule hit
    /// short-circuits summarization. Never fails the caller.
    pub async fn run(
        &self,
        subject_id: Option<&str>,
        message: &str,
        reply: &str,
    ) -> Option<Fact> {
        if let Some(content) = extract_name_fact(message) {
            return self.persist(subject_id, content, "name-rule");
        }

        match self.summarize(message, reply).await {
            Ok(Some(content)) => self.persist(subject_id, content, "summary"),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "fact summarization failed");
                None
            }
        }
    }

    /// Ask the generation service for a one-sentence summary of the exchange
    async fn summarize(&self, message: &str, reply: &str) -> Result<Option<String>> {
        let prompt =
            format!("{SUMMARY_INSTRUCTION}\n\nUser: {message}\nAssistant: {reply}");
        let sentence = self.generator.generate(&prompt).await?;

        let sentence = sentence.trim();
        if sentence.is_empty() {
            Ok(None)
        } else {
            Ok(Some(sentence.to_string()))
        }
    }

    fn persist(&self, subject_id: Option<&str>, content: String, strategy: &str) -> Option<Fact> {
        let fact = Fact::new(subject_id.map(ToString::to_string), content);
        match self.repo.insert(&fact) {
            Ok(()) => {
                tracing::debug!(strategy, fact_id = %fact.id, "persisted fact");
                Some(fact)
            }
            Err(e) => {
                tracing::warn!(error = %e, strategy, "failed to persist fact");
                None
            }
        }
    }
}
