//! Submission sink printing to stdout

use async_trait::async_trait;
use chatform_core::{SinkError, Submission, SubmissionSink};

/// Prints each submission as pretty JSON
#[derive(Debug, Default)]
pub(crate) struct StdoutSink;

#[async_trait]
impl SubmissionSink for StdoutSink {
    async fn deliver(&self, submission: &Submission) -> Result<(), SinkError> {
        let json = submission.to_json()?;
        println!("{json}");
        Ok(())
    }
}
