//! Types for standardized reports to the user about frequency data
//! operations.
//!
//! ⚠️: This is still under development.
//!
//! The goal of this is to surface information about potentially fragile
//! operations on frequency data, e.g. how many loci had frequencies that
//! did not sum to one before normalization, or how many table cells were
//! treated as missing.
//!

/// The [`CommandOutput<U>`] type output is generic over some data output
/// from a command, and a [`Report`] that reports information to the user.
#[allow(unused)]
pub struct CommandOutput<U> {
    value: U,
    report: Report,
}

impl<U> CommandOutput<U> {
    pub fn new(value: U, report: Report) -> Self {
        Self { value, report }
    }
}

/// A type to (semi) standardize reporting to the user.
#[derive(Default)]
pub struct Report {
    entries: Vec<String>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_issue(&mut self, message: String) {
        self.entries.push(message)
    }
}
