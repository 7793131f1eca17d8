//! Prompt composition for the generation service

/// Format the retrieved-fact context section
///
/// Empty when no fact cleared the relevance threshold; the prompt keeps an
/// empty context section in that case rather than reflowing.
#[must_use]
pub fn format_context(fact: Option<&str>) -> String {
    fact.map_or_else(String::new, |f| {
        format!("The user has previously mentioned: {f}")
    })
}

/// Compose the chat prompt sent to the generation service
#[must_use]
pub fn compose(message: &str, context: &str) -> String {
    format!("User message: \"{message}\"\n\n{context}\n\nRespond to the user's message.")
}
