//! Product output sink for the sync workflow.
//!
//! Each major step emits a `--> <description>` status line followed by the
//! raw output of the underlying operation, in workflow order. The sink is a
//! trait so tests can capture and assert the sequence.

/// Ordered sink for the workflow's human-readable output.
pub trait Reporter {
    /// Emit a `--> <description>` status line.
    fn step(&mut self, description: &str);

    /// Emit raw output from the underlying operation. Empty output is
    /// dropped so skipped tools do not produce blank lines.
    fn detail(&mut self, text: &str);
}

/// Reporter that writes to stdout.
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn step(&mut self, description: &str) {
        println!("--> {description}");
    }

    fn detail(&mut self, text: &str) {
        let trimmed = text.trim_end();
        if !trimmed.is_empty() {
            println!("{trimmed}");
        }
    }
}
