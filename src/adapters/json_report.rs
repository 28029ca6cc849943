//! JSON report adapter.

use crate::domain::error::SignalbenchError;
use crate::ports::report_port::{Report, ReportPort};

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonReport;

impl ReportPort for JsonReport {
    fn render(&self, report: &Report<'_>) -> Result<String, SignalbenchError> {
        let mut text = serde_json::to_string_pretty(report)
            .map_err(|e| SignalbenchError::computation(format!("JSON encoding failed: {e}")))?;
        text.push('\n');
        Ok(text)
    }
}
