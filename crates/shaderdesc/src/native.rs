//! Seam between generated source and the platform's shading-language compiler.
//!
//! The compiler itself never invokes native tooling; a graphics backend hands a
//! [`CompiledShader`] to [`build_stages`] together with its own
//! [`NativeCompiler`], and failures come back annotated by `diagnostics`.
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use thiserror::Error;
use tracing::{debug, warn};

use crate::ast::Stage;
use crate::diagnostics::report_native_failure;
use crate::CompiledShader;

/// Entry function name used by both generated stages.
pub const ENTRY_POINT: &str = "main";

pub trait NativeCompiler {
    /// Compiles one stage, returning the binary artifact or the raw error text.
    fn compile(&self, stage: Stage, source: &str) -> Result<Vec<u8>, String>;
}

impl<F> NativeCompiler for F
where
    F: Fn(Stage, &str) -> Result<Vec<u8>, String>,
{
    fn compile(&self, stage: Stage, source: &str) -> Result<Vec<u8>, String> {
        self(stage, source)
    }
}

#[derive(Debug, Error)]
#[error("shader '{shader}' {stage}: native compilation failed")]
pub struct NativeError {
    pub shader: String,
    pub stage: Stage,
    /// Annotated source plus the compiler's error text.
    pub report: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageBinaries {
    pub vertex: Vec<u8>,
    pub fragment: Vec<u8>,
}

/// Compiles the vertex stage, then the fragment stage, stopping at the first failure.
pub fn build_stages(
    compiler: &dyn NativeCompiler,
    shader: &CompiledShader,
) -> Result<StageBinaries, NativeError> {
    let vertex = compile_stage(compiler, shader, Stage::Vertex)?;
    let fragment = compile_stage(compiler, shader, Stage::Fragment)?;
    Ok(StageBinaries { vertex, fragment })
}

fn compile_stage(
    compiler: &dyn NativeCompiler,
    shader: &CompiledShader,
    stage: Stage,
) -> Result<Vec<u8>, NativeError> {
    let source = shader.source(stage);
    match compiler.compile(stage, source) {
        Ok(binary) => {
            if binary.is_empty() {
                warn!(shader = %shader.name, %stage, "native compiler produced an empty binary");
            }
            debug!(shader = %shader.name, %stage, bytes = binary.len(), "native stage compiled");
            Ok(binary)
        }
        Err(raw) => Err(NativeError {
            shader: shader.name.clone(),
            stage,
            report: report_native_failure(&shader.name, stage, source, &raw),
        }),
    }
}

/// Runs an external compiler process per stage.
///
/// Source is written to the child's stdin and stdout is taken as the binary.
/// Arguments may contain `{stage}`, `{profile}` and `{entry}` placeholders.
#[derive(Debug, Clone)]
pub struct ExternalCompiler {
    program: PathBuf,
    args: Vec<String>,
}

impl ExternalCompiler {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn expand_args(&self, stage: Stage) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{stage}", stage.keyword())
                    .replace("{profile}", stage.profile())
                    .replace("{entry}", ENTRY_POINT)
            })
            .collect()
    }
}

impl NativeCompiler for ExternalCompiler {
    fn compile(&self, stage: Stage, source: &str) -> Result<Vec<u8>, String> {
        let mut child = Command::new(&self.program)
            .args(self.expand_args(stage))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| format!("failed to launch {}: {err}", self.program.display()))?;

        let writer = child.stdin.take().map(|mut stdin| {
            let source = source.to_owned();
            // A writer thread keeps a chatty child from blocking on a full stdout pipe.
            thread::spawn(move || stdin.write_all(source.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .map_err(|err| format!("failed to wait for {}: {err}", self.program.display()))?;

        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => {}
                // The child exited without reading all of its input.
                Ok(Err(err)) if err.kind() == io::ErrorKind::BrokenPipe => {}
                Ok(Err(err)) => {
                    return Err(format!(
                        "failed to write {stage} source to {}: {err}",
                        self.program.display()
                    ));
                }
                Err(_) => {
                    return Err(format!(
                        "{stage}: source writer for {} panicked",
                        self.program.display()
                    ));
                }
            }
        }

        if output.status.success() {
            Ok(output.stdout)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            if stderr.trim().is_empty() {
                Err(format!(
                    "{stage}: {} exited with {}",
                    self.program.display(),
                    output.status
                ))
            } else {
                Err(stderr)
            }
        }
    }
}
