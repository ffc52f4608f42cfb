//! System prompt and fixed texts for feedback sessions
//!
//! The system instruction is prepended to every completion request and is
//! never stored in the visible conversation.

use crate::config::FeedbackConfig;

/// Built-in instruction for the feedback mentor
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are an experienced project mentor reviewing proposals written by students.
The first user message is a form describing a project: its name, context, the
problem it addresses, the expected impact, the proposed solution, the project
type and the profile of the person submitting it.

Give constructive, specific feedback:
1. Summarize the project in two sentences to show you understood it.
2. Point out the strongest aspects of the proposal.
3. Identify gaps or risks in the problem statement, the solution and the impact.
4. Suggest concrete next steps the student can take this week.

Keep a supportive tone and adapt the depth of your answer to the profile of the
person. Answer follow-up questions in the same spirit. Do not invent
bibliographic references, DOIs or statistics; if you mention a source, say that
it must be verified.";

/// Sentence prepended to replies that look like they cite sources
pub const DEFAULT_CITATION_DISCLAIMER: &str = "\
Note: this reply mentions references or citations that may have been generated \
by the model and could be inaccurate. Verify every source before relying on it.";

/// Returns the system instruction for a session
///
/// A configured, non-blank override wins over the built-in prompt.
///
/// # Examples
///
/// ```
/// use feedloop::config::FeedbackConfig;
/// use feedloop::prompts::{build_system_prompt, DEFAULT_SYSTEM_PROMPT};
///
/// assert_eq!(build_system_prompt(&FeedbackConfig::default()), DEFAULT_SYSTEM_PROMPT);
/// ```
pub fn build_system_prompt(config: &FeedbackConfig) -> String {
    non_blank(config.system_prompt.as_deref())
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string())
}

/// Returns the citation disclaimer for a session
pub fn citation_disclaimer(config: &FeedbackConfig) -> String {
    non_blank(config.citation_disclaimer.as_deref())
        .unwrap_or_else(|| DEFAULT_CITATION_DISCLAIMER.to_string())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
