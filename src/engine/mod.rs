pub mod python;
pub mod types;

use crate::error::ConvertError;
use std::path::Path;

pub use types::{ConvertOutcome, ConvertRequest, DocDiag, ProbeOut};

/// The external pdf2docx collaborator, treated as an opaque capability
/// provider: it can report its own health, describe a PDF, and hand out
/// conversion handles. No document logic lives on the Rust side.
pub trait Engine {
    fn doctor(&self) -> Result<DocDiag, ConvertError>;
    fn probe(&self, input: &Path) -> Result<ProbeOut, ConvertError>;
    fn open(&self, input: &Path) -> Result<Box<dyn ConverterHandle>, ConvertError>;
}

/// A scoped binding between the driver and one source PDF.
///
/// Held for the duration of a single conversion. `close` is idempotent:
/// a second call is a no-op and never errors.
pub trait ConverterHandle: std::fmt::Debug {
    fn convert(&mut self, req: &ConvertRequest) -> Result<ConvertOutcome, ConvertError>;
    fn close(&mut self);
}
