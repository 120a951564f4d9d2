use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocDiag {
    pub python_exe: String,
    pub python_version: String,
    pub pdf2docx_version: Option<String>,
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeOut {
    pub page_count: u32,
    #[serde(default)]
    pub pdf_version: Option<String>,
    #[serde(default)]
    pub encrypted: bool,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One conversion request, serialized onto the runner's stdin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertRequest {
    pub input_pdf: String,
    pub output_docx: String,
    pub start_page: u32,
    pub end_page: Option<u32>,
    pub multi_processing: bool,
    pub debug: bool,
    pub keep_format: bool,
    pub min_vertical_gap: f32,
    pub min_horizontal_gap: f32,
}

/// Runner reply for a conversion request.
///
/// `kind` carries the failure classification when `ok` is false; see
/// [`crate::error::ConvertError::from_kind`] for the mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertOutcome {
    pub ok: bool,
    #[serde(default)]
    pub pages_converted: u32,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
