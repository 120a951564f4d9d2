use super::{types::*, ConverterHandle, Engine};
use crate::config::Config;
use crate::error::ConvertError;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const RUNNER_SCRIPT: &str = "pdf2docx_runner.py";
const PROBE_SCRIPT: &str = "pdf_probe.py";

pub struct PythonEngine {
    cfg: Config,
    scripts_dir: PathBuf,
    python_exe: PathBuf,
}

impl PythonEngine {
    pub fn new(cfg: &Config) -> Result<Self, ConvertError> {
        let scripts_dir = PathBuf::from(&cfg.engine.scripts_dir);
        if cfg.security.pin_scripts_dir {
            let cwd = std::env::current_dir()
                .map_err(|e| ConvertError::engine(format!("current_dir: {e}")))?;
            let canon = scripts_dir.canonicalize().map_err(|e| {
                ConvertError::engine(format!(
                    "canonicalize scripts_dir {}: {e}",
                    scripts_dir.display()
                ))
            })?;
            if !canon.starts_with(&cwd) {
                return Err(ConvertError::engine(format!(
                    "scripts_dir is outside cwd while pin_scripts_dir=true: {}",
                    canon.display()
                )));
            }
        }
        for script in [RUNNER_SCRIPT, PROBE_SCRIPT] {
            let path = scripts_dir.join(script);
            if !path.exists() {
                return Err(ConvertError::engine(format!(
                    "missing script: {}",
                    path.display()
                )));
            }
        }
        let python_exe = resolve_python_exe(&cfg.engine.python_exe);
        Ok(Self {
            cfg: cfg.clone(),
            scripts_dir,
            python_exe,
        })
    }

    fn script(&self, name: &str) -> PathBuf {
        self.scripts_dir.join(name)
    }
}

fn resolve_python_exe(raw: &str) -> PathBuf {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("auto") {
        if let Ok(env_val) = std::env::var("PDF2DOCX_PYTHON") {
            let p = expand_tilde(&env_val);
            if p.exists() {
                return p;
            }
        }
        return PathBuf::from("python3");
    }
    expand_tilde(raw)
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

/// Run a runner script with a JSON request on stdin, parse a JSON reply
/// from stdout. Any failure here is an engine-protocol error, not one of
/// the conversion failure kinds.
fn run_json<I: serde::Serialize, O: for<'de> serde::Deserialize<'de>>(
    cfg: &Config,
    python_exe: &Path,
    script: &Path,
    input: &I,
    timeout_seconds: Option<u64>,
) -> Result<O, ConvertError> {
    debug!(
        "python run {} timeout={:?}",
        script.display(),
        timeout_seconds
    );
    let mut cmd = Command::new(python_exe);
    cmd.arg(script);
    cmd.stdin(Stdio::piped());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    for (k, v) in &cfg.engine.env {
        cmd.env(k, v);
    }

    let mut child = cmd
        .spawn()
        .map_err(|e| ConvertError::engine(format!("spawning python {}: {e}", script.display())))?;

    {
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ConvertError::engine("no stdin on python child"))?;
        let bytes = serde_json::to_vec(input)
            .map_err(|e| ConvertError::engine(format!("encoding request: {e}")))?;
        use std::io::Write;
        stdin
            .write_all(&bytes)
            .map_err(|e| ConvertError::engine(format!("writing request: {e}")))?;
        stdin.flush().ok();
    }

    let output = if let Some(secs) = timeout_seconds {
        wait_with_timeout(&mut child, Duration::from_secs(secs))?
    } else {
        child
            .wait_with_output()
            .map_err(|e| ConvertError::engine(format!("waiting for python: {e}")))?
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ConvertError::engine(format!(
            "python script failed: {}\n{}",
            script.display(),
            stderr
        )));
    }

    if cfg.engine.keep_python_stderr && !output.stderr.is_empty() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("python stderr {}: {}", script.display(), stderr.trim());
    }

    serde_json::from_slice(&output.stdout).map_err(|e| {
        ConvertError::engine(format!(
            "parsing python JSON output from {}: {e}",
            script.display()
        ))
    })
}

impl Engine for PythonEngine {
    fn doctor(&self) -> Result<DocDiag, ConvertError> {
        let script = self.script(RUNNER_SCRIPT);
        run_json::<serde_json::Value, DocDiag>(
            &self.cfg,
            &self.python_exe,
            &script,
            &serde_json::json!({"cmd": "doctor"}),
            Some(self.cfg.engine.doctor_timeout_seconds),
        )
    }

    fn probe(&self, input: &Path) -> Result<ProbeOut, ConvertError> {
        let script = self.script(PROBE_SCRIPT);
        let req = serde_json::json!({ "input_pdf": input });
        let out: ProbeOut = run_json(
            &self.cfg,
            &self.python_exe,
            &script,
            &req,
            Some(self.cfg.engine.probe_timeout_seconds),
        )?;
        if let Some(err) = out.error.as_deref() {
            let kind = out.kind.as_deref().unwrap_or("invalid_format");
            return Err(ConvertError::from_kind(
                kind,
                input,
                Path::new(""),
                err.to_string(),
            ));
        }
        Ok(out)
    }

    /// Bind a handle to the input PDF. Only cheap local checks happen
    /// here; structural validity stays with pdf2docx.
    fn open(&self, input: &Path) -> Result<Box<dyn ConverterHandle>, ConvertError> {
        let meta = std::fs::metadata(input).map_err(|e| ConvertError::SourceUnavailable {
            path: input.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !meta.is_file() {
            return Err(ConvertError::SourceUnavailable {
                path: input.to_path_buf(),
                reason: "not a regular file".into(),
            });
        }

        let mut f = std::fs::File::open(input).map_err(|e| ConvertError::SourceUnavailable {
            path: input.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut magic = [0u8; 5];
        let n = f
            .read(&mut magic)
            .map_err(|e| ConvertError::SourceUnavailable {
                path: input.to_path_buf(),
                reason: e.to_string(),
            })?;
        if n < magic.len() || &magic != b"%PDF-" {
            return Err(ConvertError::InvalidFormat {
                path: input.to_path_buf(),
                detail: format!("missing %PDF header (first bytes: {:?})", &magic[..n]),
            });
        }

        debug!("opened converter handle for {}", input.display());
        Ok(Box::new(PythonHandle {
            cfg: self.cfg.clone(),
            python_exe: self.python_exe.clone(),
            script: self.script(RUNNER_SCRIPT),
            input: input.to_path_buf(),
            released: false,
        }))
    }
}

#[derive(Debug)]
pub struct PythonHandle {
    cfg: Config,
    python_exe: PathBuf,
    script: PathBuf,
    input: PathBuf,
    released: bool,
}

impl ConverterHandle for PythonHandle {
    fn convert(&mut self, req: &ConvertRequest) -> Result<ConvertOutcome, ConvertError> {
        if self.released {
            return Err(ConvertError::engine("converter handle already closed"));
        }

        let output = Path::new(&req.output_docx);
        let parent = match output.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !parent.is_dir() {
            return Err(ConvertError::DestinationUnavailable {
                path: output.to_path_buf(),
                reason: format!("parent directory does not exist: {}", parent.display()),
            });
        }

        let timeout = if self.cfg.engine.convert_timeout_seconds > 0 {
            Some(self.cfg.engine.convert_timeout_seconds)
        } else {
            None
        };
        let out: ConvertOutcome = run_json(
            &self.cfg,
            &self.python_exe,
            &self.script,
            &serde_json::json!({"cmd": "convert", "req": req}),
            timeout,
        )?;

        if !out.ok {
            let kind = out.kind.as_deref().unwrap_or("conversion_failure");
            let message = out
                .error
                .unwrap_or_else(|| "pdf2docx reported failure without detail".to_string());
            return Err(ConvertError::from_kind(kind, &self.input, output, message));
        }
        Ok(out)
    }

    fn close(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        debug!("closed converter handle for {}", self.input.display());
    }
}

impl Drop for PythonHandle {
    fn drop(&mut self) {
        self.close();
    }
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<Output, ConvertError> {
    // Drain pipes while waiting so verbose python logging can't deadlock the child
    // on a full stdout/stderr buffer.
    let stdout_reader = child.stdout.take();
    let stderr_reader = child.stderr.take();

    let stdout_thread = std::thread::spawn(move || -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut out) = stdout_reader {
            out.read_to_end(&mut buf)?;
        }
        Ok(buf)
    });

    let stderr_thread = std::thread::spawn(move || -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut err) = stderr_reader {
            err.read_to_end(&mut buf)?;
        }
        Ok(buf)
    });

    let join = |t: std::thread::JoinHandle<std::io::Result<Vec<u8>>>, name: &str| {
        t.join()
            .map_err(|_| ConvertError::engine(format!("{name} reader thread panicked")))?
            .map_err(|e| ConvertError::engine(format!("read {name}: {e}")))
    };

    let start = Instant::now();
    loop {
        if let Some(status) = child
            .try_wait()
            .map_err(|e| ConvertError::engine(format!("try_wait: {e}")))?
        {
            let stdout = join(stdout_thread, "stdout")?;
            let stderr = join(stderr_thread, "stderr")?;
            return Ok(Output {
                status,
                stdout,
                stderr,
            });
        }

        if start.elapsed() > timeout {
            warn!("python process timed out after {:?}", timeout);
            let _ = child.kill();
            let _ = child
                .wait()
                .map_err(|e| ConvertError::engine(format!("wait after kill: {e}")))?;
            let stderr = join(stderr_thread, "stderr")?;
            let _ = join(stdout_thread, "stdout");
            return Err(ConvertError::engine(format!(
                "python process exceeded timeout ({:?}); stderr: {}",
                timeout,
                String::from_utf8_lossy(&stderr)
            )));
        }

        std::thread::sleep(Duration::from_millis(50));
    }
}
