use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

use javastub::driver::{CompileFn, CompileOutput};
use javastub::Result;

/// A [`CompileFn`] that plays back a fixed sequence of canned responses,
/// one per call, so the repair loop can be driven without a real compiler.
pub struct ScriptedCompileFn {
    responses: RefCell<VecDeque<CompileOutput>>,
    pub calls: RefCell<u32>,
}

impl ScriptedCompileFn {
    pub fn new(responses: Vec<CompileOutput>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            calls: RefCell::new(0),
        }
    }
}

impl CompileFn for ScriptedCompileFn {
    fn compile(&self, _source_roots: &[PathBuf], _extra_classpath: &[PathBuf], _out_dir: &Path, _timeout: Duration) -> Result<CompileOutput> {
        *self.calls.borrow_mut() += 1;
        let next = self.responses.borrow_mut().pop_front();
        Ok(next.unwrap_or(CompileOutput {
            success: true,
            raw_output: String::new(),
            emitted_classes: Vec::new(),
            timed_out: false,
        }))
    }
}

pub fn failing_output(raw: &str) -> CompileOutput {
    CompileOutput {
        success: false,
        raw_output: raw.to_string(),
        emitted_classes: Vec::new(),
        timed_out: false,
    }
}

pub fn success_output() -> CompileOutput {
    CompileOutput {
        success: true,
        raw_output: String::new(),
        emitted_classes: Vec::new(),
        timed_out: false,
    }
}

pub fn timed_out_output() -> CompileOutput {
    CompileOutput {
        success: false,
        raw_output: String::new(),
        emitted_classes: Vec::new(),
        timed_out: true,
    }
}

/// Writes a single-file slice under `dir/slice` declaring `class B` in
/// package `a`, whose body is exactly `body`.
pub fn write_slice_class(root: &Path, body: &str) {
    let dir = root.join("slice/a");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("B.java"), format!("package a;\n\nclass B {{\n{body}\n}}\n")).unwrap();
}
