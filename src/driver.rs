use crate::{
    config::Conversion,
    engine::{ConvertRequest, Engine},
    error::ConvertError,
    util::now_rfc3339,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// The conversion driver: one linear sequence per run,
/// open → convert → close → summarize.
///
/// The handle acquired from the engine is closed on every exit path before
/// this returns, success or failure. No retries; a failure aborts the run
/// and propagates unchanged.
pub struct Driver<E: Engine> {
    engine: E,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertSummary {
    pub input: String,
    pub output: String,
    pub pages_converted: u32,
    pub warnings: Vec<String>,
    pub duration_ms: u64,
    pub finished: String,
}

impl<E: Engine> Driver<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn run_conversion(
        &self,
        input: &Path,
        output: &Path,
        options: &Conversion,
    ) -> Result<ConvertSummary, ConvertError> {
        options.validate()?;
        let started = Instant::now();

        let req = ConvertRequest {
            input_pdf: input.display().to_string(),
            output_docx: output.display().to_string(),
            start_page: options.start_page,
            end_page: options.end_page,
            multi_processing: options.multi_processing,
            debug: options.debug,
            keep_format: options.keep_format,
            min_vertical_gap: options.min_vertical_gap,
            min_horizontal_gap: options.min_horizontal_gap,
        };
        debug!(?req, "conversion request");

        let mut handle = self.engine.open(input)?;
        let result = handle.convert(&req);
        // Release the binding before surfacing the outcome, on both paths.
        handle.close();
        let outcome = result?;

        let duration_ms = started.elapsed().as_millis() as u64;
        info!(
            "converted {} -> {} pages={} in {}ms",
            input.display(),
            output.display(),
            outcome.pages_converted,
            duration_ms
        );
        for w in &outcome.warnings {
            tracing::warn!("pdf2docx: {w}");
        }

        Ok(ConvertSummary {
            input: input.display().to_string(),
            output: output.display().to_string(),
            pages_converted: outcome.pages_converted,
            warnings: outcome.warnings,
            duration_ms,
            finished: now_rfc3339(),
        })
    }
}
