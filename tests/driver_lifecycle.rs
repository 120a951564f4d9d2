use docx_bridge::config::Conversion;
use docx_bridge::driver::Driver;
use docx_bridge::engine::{ConvertOutcome, ConvertRequest, ConverterHandle, DocDiag, Engine, ProbeOut};
use docx_bridge::error::ConvertError;
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Calls {
    opens: usize,
    converts: usize,
    closes: usize,
}

struct MockEngine {
    calls: Arc<Mutex<Calls>>,
    fail_open: bool,
    fail_convert_kind: Option<&'static str>,
}

impl MockEngine {
    fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Calls::default())),
            fail_open: false,
            fail_convert_kind: None,
        }
    }
}

impl Engine for MockEngine {
    fn doctor(&self) -> Result<DocDiag, ConvertError> {
        Ok(DocDiag {
            python_exe: "python3".into(),
            python_version: "3.12.0".into(),
            pdf2docx_version: Some("0.5.8".into()),
            ok: true,
            error: None,
        })
    }

    fn probe(&self, _input: &Path) -> Result<ProbeOut, ConvertError> {
        Ok(ProbeOut {
            page_count: 3,
            pdf_version: Some("PDF 1.4".into()),
            encrypted: false,
            kind: None,
            error: None,
        })
    }

    fn open(&self, input: &Path) -> Result<Box<dyn ConverterHandle>, ConvertError> {
        self.calls.lock().unwrap().opens += 1;
        if self.fail_open {
            return Err(ConvertError::SourceUnavailable {
                path: input.to_path_buf(),
                reason: "no such file".into(),
            });
        }
        Ok(Box::new(MockHandle {
            calls: self.calls.clone(),
            fail_kind: self.fail_convert_kind,
            released: false,
        }))
    }
}

#[derive(Debug)]
struct MockHandle {
    calls: Arc<Mutex<Calls>>,
    fail_kind: Option<&'static str>,
    released: bool,
}

impl ConverterHandle for MockHandle {
    fn convert(&mut self, req: &ConvertRequest) -> Result<ConvertOutcome, ConvertError> {
        self.calls.lock().unwrap().converts += 1;
        if let Some(kind) = self.fail_kind {
            return Err(ConvertError::from_kind(
                kind,
                Path::new(&req.input_pdf),
                Path::new(&req.output_docx),
                "mock failure".into(),
            ));
        }
        Ok(ConvertOutcome {
            ok: true,
            pages_converted: 3,
            warnings: vec![],
            kind: None,
            error: None,
        })
    }

    fn close(&mut self) {
        if !self.released {
            self.released = true;
            self.calls.lock().unwrap().closes += 1;
        }
    }
}

fn run(engine: MockEngine, options: &Conversion) -> (Result<u32, ConvertError>, Arc<Mutex<Calls>>) {
    let calls = engine.calls.clone();
    let driver = Driver::new(engine);
    let res = driver
        .run_conversion(Path::new("/tmp/in.pdf"), Path::new("/tmp/out.docx"), options)
        .map(|s| s.pages_converted);
    (res, calls)
}

#[test]
fn success_closes_exactly_once() {
    let (res, calls) = run(MockEngine::new(), &Conversion::default());
    assert_eq!(res.unwrap(), 3);
    let c = calls.lock().unwrap();
    assert_eq!(c.opens, 1);
    assert_eq!(c.converts, 1);
    assert_eq!(c.closes, 1);
}

#[test]
fn convert_failure_still_closes_once() {
    let mut engine = MockEngine::new();
    engine.fail_convert_kind = Some("conversion_failure");
    let (res, calls) = run(engine, &Conversion::default());
    assert!(matches!(res, Err(ConvertError::ConversionFailure { .. })));
    let c = calls.lock().unwrap();
    assert_eq!(c.converts, 1);
    assert_eq!(c.closes, 1);
}

#[test]
fn destination_failure_kind_propagates_unchanged() {
    let mut engine = MockEngine::new();
    engine.fail_convert_kind = Some("destination_unavailable");
    let (res, _calls) = run(engine, &Conversion::default());
    match res {
        Err(ConvertError::DestinationUnavailable { path, .. }) => {
            assert_eq!(path, Path::new("/tmp/out.docx"));
        }
        other => panic!("expected DestinationUnavailable, got {other:?}"),
    }
}

#[test]
fn open_failure_acquires_nothing() {
    let mut engine = MockEngine::new();
    engine.fail_open = true;
    let (res, calls) = run(engine, &Conversion::default());
    assert!(matches!(res, Err(ConvertError::SourceUnavailable { .. })));
    let c = calls.lock().unwrap();
    assert_eq!(c.converts, 0);
    assert_eq!(c.closes, 0);
}

#[test]
fn invalid_range_rejected_before_open() {
    let options = Conversion {
        start_page: 4,
        end_page: Some(4),
        ..Default::default()
    };
    let (res, calls) = run(MockEngine::new(), &options);
    assert!(matches!(res, Err(ConvertError::InvalidOptions(_))));
    assert_eq!(calls.lock().unwrap().opens, 0);
}

#[test]
fn rerun_holds_no_state() {
    let engine = MockEngine::new();
    let calls = engine.calls.clone();
    let driver = Driver::new(engine);
    for _ in 0..2 {
        driver
            .run_conversion(
                Path::new("/tmp/in.pdf"),
                Path::new("/tmp/out.docx"),
                &Conversion::default(),
            )
            .expect("rerun succeeds");
    }
    let c = calls.lock().unwrap();
    assert_eq!(c.converts, 2);
    assert_eq!(c.closes, 2);
}

#[test]
fn close_is_idempotent() {
    let engine = MockEngine::new();
    let calls = engine.calls.clone();
    let mut handle = engine.open(Path::new("/tmp/in.pdf")).unwrap();
    handle.close();
    handle.close();
    assert_eq!(calls.lock().unwrap().closes, 1);
}
