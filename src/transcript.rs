//! Transcript
//!
//! Capabilities produce output by saying lines, a [Transcript] decides where they go.
//! Diagnostics go through `tracing`, transcripts only ever carry what a capability says

/// A sink for the lines capabilities say, in the order they are said
pub trait Transcript {
    fn line(&mut self, line: String);
}

/// Prints every line to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct Stdout;

impl Transcript for Stdout {
    fn line(&mut self, line: String) {
        println!("{}", line);
    }
}

/// Keeps every line in memory
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Recorded(Vec<String>);

impl Recorded {
    pub fn lines(&self) -> &[String] {
        &self.0
    }

    pub fn into_lines(self) -> Vec<String> {
        self.0
    }

    /// How many times exactly `line` was said
    pub fn count(&self, line: &str) -> usize {
        self.0.iter().filter(|said| *said == line).count()
    }
}

impl Transcript for Recorded {
    fn line(&mut self, line: String) {
        self.0.push(line);
    }
}
