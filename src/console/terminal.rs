use crate::error::AppError;
use crate::records::{parse_id, Field, Form};
use std::fmt::Display;
use std::io::{self, BufRead, Write};

pub const RULE_WIDTH: usize = 60;

/// Line-oriented prompt/response over any reader and writer. End of input
/// surfaces as `io::ErrorKind::UnexpectedEof` so a closed stdin unwinds the
/// whole session.
pub struct Terminal<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    pub fn say(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    /// Write `text` exactly, for pre-rendered blocks that end in a newline.
    pub fn write_block(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())
    }

    pub fn heading(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(self.out, "{title}")?;
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))
    }

    /// Print `label`, read one line and return it trimmed.
    pub fn ask(&mut self, label: &str) -> io::Result<String> {
        write!(self.out, "{label}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "end of input"));
        }
        Ok(line.trim().to_string())
    }

    /// Only `y` or `Y` confirms.
    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let answer = self.ask(&format!("{question} (y/n): "))?;
        Ok(answer.eq_ignore_ascii_case("y"))
    }

    /// Show a numbered menu and return the 1-based choice, re-prompting until
    /// a listed number is entered.
    pub fn menu(&mut self, title: &str, items: &[&str]) -> io::Result<usize> {
        loop {
            self.heading(title)?;
            for (i, item) in items.iter().enumerate() {
                writeln!(self.out, "{}. {item}", i + 1)?;
            }
            writeln!(self.out, "{}", "-".repeat(RULE_WIDTH))?;
            let raw = self.ask(&format!("Enter your choice (1-{}): ", items.len()))?;
            match raw.parse::<usize>() {
                Ok(n) if (1..=items.len()).contains(&n) => return Ok(n),
                _ => self.say("Invalid choice. Please try again.")?,
            }
        }
    }

    /// Read an id; prints the problem and returns `None` when it does not parse.
    pub fn ask_id(&mut self, label: &str) -> io::Result<Option<i64>> {
        let raw = self.ask(label)?;
        match parse_id("id", &raw) {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                self.error(&e)?;
                Ok(None)
            }
        }
    }

    /// Prompt for each of `fields` in order.
    pub fn form<F: Field>(&mut self, fields: &[F]) -> io::Result<Form<F>> {
        let mut form = Form::new();
        for field in fields {
            let value = self.ask(&format!("{}: ", field.label()))?;
            form.set(*field, value);
        }
        Ok(form)
    }

    pub fn error(&mut self, e: &AppError) -> io::Result<()> {
        writeln!(self.out, "Error: {}", e.user_message())
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }
}

pub fn is_eof(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::UnexpectedEof
}
