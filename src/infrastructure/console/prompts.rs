//! Interactive console prompts

use chrono::NaiveDate;
use std::io::{self, BufRead, Write};

use crate::shared::errors::AppError;
use crate::shared::utils::parse_date;

/// Blank or invalid input falls back to `default`; zero is invalid
pub fn parse_positive_or(input: &str, default: u64) -> u64 {
    match input.trim().parse::<u64>() {
        Ok(value) if value > 0 => value,
        _ => default,
    }
}

/// `y`/`yes` accept, blank takes `default`, anything else declines
pub fn parse_yes_no(input: &str, default: bool) -> bool {
    match input.trim().to_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    }
}

/// Prompts over any line reader, stdin/stdout in production
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `prompt` and read one trimmed line; `None` on end of input
    fn ask(&mut self, prompt: &str) -> Result<Option<String>, AppError> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn say(&mut self, message: &str) -> Result<(), AppError> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }

    /// Reprompt until a valid `YYYY-MM-DD` date is entered
    pub fn read_date(&mut self) -> Result<NaiveDate, AppError> {
        loop {
            let answer = self
                .ask("\nDate to watch (YYYY-MM-DD): ")?
                .ok_or_else(|| AppError::InvalidInput("no date entered".into()))?;
            match parse_date(&answer) {
                Some(date) => return Ok(date),
                None => self.say("Invalid date format, please try again.")?,
            }
        }
    }

    /// Pick a departure by 1-based index; `Ok(None)` when the operator enters 0
    pub fn choose_departure(&mut self, count: usize) -> Result<Option<usize>, AppError> {
        self.say(&format!(
            "\nChoose a sold-out departure to watch (1 to {}), or 0 to exit",
            count
        ))?;

        loop {
            let answer = self
                .ask(&format!("Departure number (1-{}): ", count))?
                .ok_or_else(|| AppError::InvalidInput("no departure chosen".into()))?;
            match answer.parse::<usize>() {
                Ok(0) => return Ok(None),
                Ok(n) if n <= count => return Ok(Some(n - 1)),
                Ok(_) => self.say(&format!("Invalid number, enter 1 to {}.", count))?,
                Err(_) => self.say("Please enter a number.")?,
            }
        }
    }

    pub fn read_interval(&mut self, default: u64) -> Result<u64, AppError> {
        let answer = self.ask(&format!("Check interval in seconds (default {}): ", default))?;
        Ok(parse_positive_or(answer.as_deref().unwrap_or(""), default))
    }

    pub fn read_threshold(&mut self, default: u32) -> Result<u32, AppError> {
        let answer = self.ask(&format!(
            "Alert threshold, alert when seats >= this (default {}): ",
            default
        ))?;
        let value = parse_positive_or(answer.as_deref().unwrap_or(""), default as u64);
        Ok(u32::try_from(value).unwrap_or(default))
    }

    /// Yes/no question; end of input counts as no
    pub fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, AppError> {
        let hint = if default { "(Y/n)" } else { "(y/N)" };
        match self.ask(&format!("{} {}: ", prompt, hint))? {
            Some(answer) => Ok(parse_yes_no(&answer, default)),
            None => Ok(false),
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
