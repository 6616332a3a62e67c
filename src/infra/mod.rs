pub mod line_prompt;

pub use line_prompt::{stdin_prompt, LinePrompt};
