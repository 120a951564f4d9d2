//! Local pre-flight behavior of the python engine: everything here runs
//! without a python interpreter, since the checks fire before any child
//! process is spawned.

use docx_bridge::config::{Config, Conversion};
use docx_bridge::engine::{python::PythonEngine, ConvertRequest, Engine};
use docx_bridge::error::ConvertError;
use std::io::Write;
use std::path::Path;

fn request(input: &Path, output: &Path) -> ConvertRequest {
    let o = Conversion::default();
    ConvertRequest {
        input_pdf: input.display().to_string(),
        output_docx: output.display().to_string(),
        start_page: o.start_page,
        end_page: o.end_page,
        multi_processing: o.multi_processing,
        debug: o.debug,
        keep_format: o.keep_format,
        min_vertical_gap: o.min_vertical_gap,
        min_horizontal_gap: o.min_horizontal_gap,
    }
}

fn write_fake_pdf(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("in.pdf");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(b"%PDF-1.4\n1 0 obj\nendobj\n%%EOF\n").unwrap();
    path
}

#[test]
fn missing_input_is_source_unavailable() {
    let engine = PythonEngine::new(&Config::default()).unwrap();
    let err = engine.open(Path::new("/nonexistent/in.pdf")).unwrap_err();
    assert!(matches!(err, ConvertError::SourceUnavailable { .. }));
}

#[test]
fn non_pdf_magic_is_invalid_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("not_really.pdf");
    std::fs::write(&path, b"hello world").unwrap();

    let engine = PythonEngine::new(&Config::default()).unwrap();
    let err = engine.open(&path).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidFormat { .. }));
}

#[test]
fn missing_output_parent_is_destination_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fake_pdf(dir.path());
    let output = dir.path().join("no_such_dir").join("out.docx");

    let engine = PythonEngine::new(&Config::default()).unwrap();
    let mut handle = engine.open(&input).unwrap();
    let err = handle.convert(&request(&input, &output)).unwrap_err();
    assert!(matches!(err, ConvertError::DestinationUnavailable { .. }));
    handle.close();
}

#[test]
fn double_close_does_not_panic() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fake_pdf(dir.path());

    let engine = PythonEngine::new(&Config::default()).unwrap();
    let mut handle = engine.open(&input).unwrap();
    handle.close();
    handle.close();
}

#[test]
fn convert_after_close_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fake_pdf(dir.path());
    let output = dir.path().join("out.docx");

    let engine = PythonEngine::new(&Config::default()).unwrap();
    let mut handle = engine.open(&input).unwrap();
    handle.close();
    let err = handle.convert(&request(&input, &output)).unwrap_err();
    assert!(matches!(err, ConvertError::Engine { .. }));
}

#[test]
fn engine_requires_runner_scripts() {
    let mut cfg = Config::default();
    cfg.engine.scripts_dir = "no-such-scripts-dir".into();
    assert!(PythonEngine::new(&cfg).is_err());
}
