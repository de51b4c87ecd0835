use crate::style::Style;
use crossterm::{
    cursor::MoveUp,
    queue,
    terminal::{Clear, ClearType},
};
use std::io::{Result, Write};

/// Owns the terminal sink and remembers how many lines the last drawn block
/// occupies, so the next pass erases exactly that block and nothing above it.
pub struct Renderer<W: Write> {
    output: W,
    line_count: usize,
}

impl<W: Write> Renderer<W> {
    pub fn new(output: W) -> Self {
        Self {
            output,
            line_count: 0,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Erases the last drawn block, one line at a time from the bottom up.
    pub fn clear(&mut self) -> Result<()> {
        if self.line_count == 0 {
            return Ok(());
        }
        while self.line_count > 0 {
            queue!(self.output, MoveUp(1), Clear(ClearType::CurrentLine))?;
            self.line_count -= 1;
        }
        self.output.flush()
    }

    /// Replaces the drawn block with `messages`, one painted message per line.
    /// Messages spanning several lines count every one of them.
    pub fn draw<S: AsRef<str>>(&mut self, messages: &[S], style: &Style) -> Result<()> {
        self.clear()?;
        for message in messages {
            let message = message.as_ref();
            writeln!(self.output, "{}", style.paint(message))?;
            self.line_count += message.matches('\n').count() + 1;
        }
        self.output.flush()
    }
}
