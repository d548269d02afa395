//! Prediction service: encode, score and classify one clinical record, then
//! optionally turn the assessment into a report document.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    encode, score, ClinicalRecord, ParameterStore, PredictionResult, UntrackedDefaults,
};
use crate::ports::{ParameterSource, ReportError, ReportRenderer};
use crate::CardioformError;

/// One completed assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    /// Values exactly as entered
    pub record: ClinicalRecord,
    pub result: PredictionResult,
    /// Shown on screen only; reports stay timestamp-free
    pub assessed_at: DateTime<Utc>,
}

/// A rendered report, ready to be saved or offered for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Service that runs the prediction pipeline over shared parameters.
///
/// Parameters are immutable after startup, so the service holds them behind
/// an `Arc` and every call is a pure function of its input.
pub struct PredictionService<R>
where
    R: ReportRenderer,
{
    params: Arc<ParameterStore>,
    defaults: UntrackedDefaults,
    renderer: R,
}

impl<R> PredictionService<R>
where
    R: ReportRenderer,
{
    /// Create a service using the standard fixed values for untracked features.
    pub fn new(params: Arc<ParameterStore>, renderer: R) -> Self {
        Self::with_defaults(params, renderer, UntrackedDefaults::STANDARD)
    }

    pub fn with_defaults(
        params: Arc<ParameterStore>,
        renderer: R,
        defaults: UntrackedDefaults,
    ) -> Self {
        Self {
            params,
            defaults,
            renderer,
        }
    }

    /// Load parameters from `source` and build a service around them.
    ///
    /// # Errors
    /// Returns the source's load error; no service exists without parameters.
    pub fn from_source<S>(source: &S, renderer: R) -> crate::Result<Self>
    where
        S: ParameterSource,
        CardioformError: From<S::Error>,
    {
        let params = source.load()?;
        tracing::info!("Model parameters loaded");
        Ok(Self::new(Arc::new(params), renderer))
    }

    #[must_use]
    pub fn parameters(&self) -> &ParameterStore {
        &self.params
    }

    /// Run the pipeline for one record.
    ///
    /// The record is expected to be within the capture bounds; the scorer
    /// itself accepts any values that keep both decision values finite.
    ///
    /// # Errors
    /// Returns `CardioformError::Parameters` if a decision value is NaN or
    /// infinite. No tier is produced in that case.
    pub fn assess(&self, record: &ClinicalRecord) -> crate::Result<Assessment> {
        let features = encode(record, &self.defaults);
        let scores = score(&features, &self.params.model, &self.params.scaler)
            .inspect_err(|e| tracing::error!("Scoring failed: {e}"))?;
        let result = PredictionResult::from_scores(scores);

        // Outcome only; raw measurements stay out of the logs.
        tracing::info!(
            tier = %result.risk_tier,
            logistic = result.logistic_label(),
            svm = result.svm_label(),
            probability = result.logistic_probability,
            "assessment complete"
        );

        Ok(Assessment {
            record: *record,
            result,
            assessed_at: Utc::now(),
        })
    }

    /// Validate the record against the capture bounds, then assess it.
    ///
    /// # Errors
    /// Returns `CardioformError::Validation` listing every out-of-range field,
    /// or the scoring error from [`Self::assess`].
    pub fn assess_checked(&self, record: &ClinicalRecord) -> crate::Result<Assessment> {
        record.validate().map_err(CardioformError::Validation)?;
        self.assess(record)
    }

    /// Render the report for an assessment.
    ///
    /// # Errors
    /// Returns the renderer's error; the assessment itself is unaffected.
    pub fn render_report(&self, assessment: &Assessment) -> Result<Report, ReportError> {
        let bytes = self
            .renderer
            .render(
                &assessment.record,
                assessment.result.logistic_label(),
                assessment.result.svm_label(),
                assessment.result.advice,
            )
            .inspect_err(|e| tracing::warn!("Report rendering failed: {e}"))?;

        Ok(Report {
            file_name: self.renderer.file_name().to_string(),
            mime_type: self.renderer.mime_type().to_string(),
            bytes,
        })
    }

    /// Write a report into `dir`, creating the directory if needed.
    ///
    /// # Errors
    /// Returns `ReportError::Io` if the directory or file cannot be written.
    pub fn save_report(&self, report: &Report, dir: &Path) -> Result<PathBuf, ReportError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&report.file_name);
        std::fs::write(&path, &report.bytes)?;
        tracing::info!("Report saved ({} bytes)", report.bytes.len());
        Ok(path)
    }
}
