use crate::error::Result;

/// Source of interactive answers.
///
/// Production reads stdin; tests supply scripted answers.
pub trait Prompt {
    /// Show `question` and return the operator's answer, without its line ending
    fn ask(&mut self, question: &str) -> Result<String>;
}
