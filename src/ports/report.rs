//! Report renderer port: turns an assessment into a downloadable document.

use crate::domain::ClinicalRecord;

/// Errors that can occur while producing or writing a report.
///
/// Kept separate from prediction errors: a failed report never invalidates
/// an assessment that was already computed.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Report layout failed: {0}")]
    Layout(String),

    #[error("Report I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for document renderers.
///
/// Rendering must be deterministic: the same inputs produce the same bytes.
pub trait ReportRenderer: Send + Sync {
    /// Render a self-contained document.
    ///
    /// # Arguments
    /// * `record` - Raw values as entered
    /// * `logistic_label` - Logistic model label ("Low Risk", ...)
    /// * `svm_label` - SVM label ("Heart Disease" / "No Heart Disease")
    /// * `advice` - Recommendation text
    ///
    /// # Errors
    /// Returns `ReportError::Layout` if the content cannot be laid out.
    fn render(
        &self,
        record: &ClinicalRecord,
        logistic_label: &str,
        svm_label: &str,
        advice: &str,
    ) -> Result<Vec<u8>, ReportError>;

    /// Download file name, e.g. `Heart_Health_Report.pdf`.
    fn file_name(&self) -> &str;

    /// MIME type of the rendered bytes.
    fn mime_type(&self) -> &str;
}
