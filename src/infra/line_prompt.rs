use std::io::{self, BufRead, Write};

use crate::app::ports::Prompt;
use crate::error::{GuildOverlapError, Result};

/// Line-oriented prompt over any reader/writer pair
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

/// Prompt wired to the process's stdin and stdout
pub fn stdin_prompt() -> LinePrompt<io::StdinLock<'static>, io::Stdout> {
    LinePrompt::new(io::stdin().lock(), io::stdout())
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Err(GuildOverlapError::Prompt(
                "input closed before an answer was given".to_string(),
            ));
        }
        let trimmed_len = answer.trim_end_matches(['\r', '\n']).len();
        answer.truncate(trimmed_len);
        Ok(answer)
    }
}
