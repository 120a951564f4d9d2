use crate::{
    config::{Config, Conversion},
    driver::Driver,
    engine::{python::PythonEngine, Engine},
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "docx-bridge")]
#[command(about = "Single-shot PDF to DOCX conversion driver (pdf2docx orchestration)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./docx-bridge.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the python interpreter and pdf2docx are usable.
    Doctor {},
    /// Report page count and PDF metadata without converting.
    Inspect {
        #[arg(long)]
        input: PathBuf,
    },
    /// Convert one PDF into one DOCX.
    Convert {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// First page to convert, 0-based inclusive.
        #[arg(long)]
        start: Option<u32>,
        /// Page to stop before (exclusive). Omit to convert to the end.
        #[arg(long)]
        end: Option<u32>,
        /// Disable best-effort preservation of the original layout.
        #[arg(long)]
        no_keep_format: bool,
        /// Let pdf2docx emit its diagnostic artifacts.
        #[arg(long)]
        debug_artifacts: bool,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref());
    let cfg = Config::load(&cfg_path)?;
    let _guard = init_logging(&args, &cfg)?;

    match &args.cmd {
        Command::Doctor {} => doctor(&cfg),
        Command::Inspect { input } => inspect(&cfg, input),
        Command::Convert {
            input,
            output,
            start,
            end,
            no_keep_format,
            debug_artifacts,
        } => convert(
            &cfg,
            input,
            output,
            *start,
            *end,
            *no_keep_format,
            *debug_artifacts,
        ),
    }
}

fn resolve_config_path(user: Option<&Path>) -> PathBuf {
    if let Some(p) = user {
        return p.to_path_buf();
    }
    let default = PathBuf::from("docx-bridge.toml");
    if default.exists() {
        default
    } else {
        PathBuf::from("docx-bridge.example.toml")
    }
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr: stdout is reserved for command output (the
    // completion line, doctor/inspect JSON).
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = resolve_log_path(cfg) {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        crate::util::ensure_dir(parent)?;
        let file = std::fs::File::create(&path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from("docx-bridge.log"))
}

fn doctor(cfg: &Config) -> Result<()> {
    let engine = PythonEngine::new(cfg)?;
    let diag = engine.doctor()?;
    println!("{}", serde_json::to_string_pretty(&diag)?);
    Ok(())
}

fn inspect(cfg: &Config, input: &Path) -> Result<()> {
    validate_input(cfg, input)?;
    let engine = PythonEngine::new(cfg)?;
    let report = crate::probe::probe_pdf(cfg, &engine, input)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn convert(
    cfg: &Config,
    input: &Path,
    output: &Path,
    start: Option<u32>,
    end: Option<u32>,
    no_keep_format: bool,
    debug_artifacts: bool,
) -> Result<()> {
    validate_input(cfg, input)?;

    let mut options: Conversion = cfg.conversion.clone();
    if let Some(s) = start {
        options.start_page = s;
    }
    if end.is_some() {
        options.end_page = end;
    }
    if no_keep_format {
        options.keep_format = false;
    }
    if debug_artifacts {
        options.debug = true;
    }

    let engine = PythonEngine::new(cfg)?;
    let driver = Driver::new(engine);
    let summary = driver.run_conversion(input, output, &options)?;

    info!(
        "summary pages={} warnings={} duration_ms={} finished={}",
        summary.pages_converted,
        summary.warnings.len(),
        summary.duration_ms,
        summary.finished
    );

    // The one user-visible line of a successful run.
    println!("转换完成! -> {}", summary.output);
    Ok(())
}

fn validate_input(cfg: &Config, input: &Path) -> Result<()> {
    let input_str = input.display().to_string();

    if cfg.security.reject_url_inputs && looks_like_url(&input_str) {
        return Err(anyhow!("URL inputs are disabled: {input_str}"));
    }

    if let Some(ext) = input.extension().and_then(|s| s.to_str()) {
        if ext.to_ascii_lowercase() != "pdf" {
            return Err(anyhow!("input is not a PDF: {}", input.display()));
        }
    } else {
        warn!("input has no extension; assuming PDF: {}", input.display());
    }

    Ok(())
}

fn looks_like_url(s: &str) -> bool {
    let s = s.to_ascii_lowercase();
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with("file://")
}
