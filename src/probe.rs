use crate::{config::Config, engine::Engine};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeReport {
    pub path: String,
    pub file_bytes: u64,
    pub page_count: u32,
    pub pdf_version: Option<String>,
    pub encrypted: bool,
}

pub fn probe_pdf(cfg: &Config, engine: &dyn Engine, input: &Path) -> Result<ProbeReport> {
    let meta = std::fs::metadata(input).with_context(|| "stat input")?;
    let file_bytes = meta.len();
    if file_bytes > cfg.limits.max_input_file_bytes {
        anyhow::bail!("input exceeds max_input_file_bytes: {}", file_bytes);
    }

    let probe = engine
        .probe(input)
        .with_context(|| "engine probe failed")?;

    if probe.page_count > cfg.limits.max_input_pages {
        anyhow::bail!("input exceeds max_input_pages: {}", probe.page_count);
    }
    if probe.page_count == 0 {
        anyhow::bail!("input has zero pages");
    }

    Ok(ProbeReport {
        path: input.display().to_string(),
        file_bytes,
        page_count: probe.page_count,
        pdf_version: probe.pdf_version,
        encrypted: probe.encrypted,
    })
}
