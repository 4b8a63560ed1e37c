//! Operator I/O: the blocking request/response channel to a human
use std::collections::VecDeque;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

/// A human (or a stand-in) that can be shown text and asked for a line.
pub trait Operator {
    fn show(&mut self, text: &str) -> io::Result<()>;

    /// Blocks until a line is available; `Ok(None)` once input is closed.
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Line-based console over any reader/writer pair.
pub struct ConsoleOperator<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl ConsoleOperator<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Operator for ConsoleOperator<R, W> {
    fn show(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{}", text)?;
        self.output.flush()
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Operator answering from a fixed list; keeps a transcript of what it saw.
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    answers: VecDeque<String>,
    transcript: Vec<String>,
    prompts: usize,
}

impl ScriptedOperator {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Number of times the operator was asked for input
    pub fn prompts(&self) -> usize {
        self.prompts
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Operator for ScriptedOperator {
    fn show(&mut self, text: &str) -> io::Result<()> {
        self.transcript.push(text.to_string());
        Ok(())
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts += 1;
        self.transcript.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_console_reads_lines_until_eof() {
        let mut console = ConsoleOperator::new(Cursor::new("2\r\nreject\n"), Vec::new());

        assert_eq!(console.ask("> ").unwrap(), Some("2".to_string()));
        assert_eq!(console.ask("> ").unwrap(), Some("reject".to_string()));
        assert_eq!(console.ask("> ").unwrap(), None);

        console.show("bye").unwrap();
        let written = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(written, "> > > bye\n");
    }

    #[test]
    fn test_scripted_operator_records_prompts() {
        let mut operator = ScriptedOperator::new(["1"]);
        operator.show("options").unwrap();

        assert_eq!(operator.ask("choose: ").unwrap(), Some("1".to_string()));
        assert_eq!(operator.ask("choose: ").unwrap(), None);
        assert_eq!(operator.prompts(), 2);
        assert_eq!(operator.transcript()[0], "options");
    }
}
