//! Failure reporting for the two places a shader can be rejected: the block
//! parser, and the native compiler that receives the generated source.
use tracing::error;

use crate::ast::Stage;
use crate::error::CompileError;

/// Logs a grammar violation through the error sink.
pub fn report_compile_error(err: &CompileError) {
    error!(
        shader = %err.shader,
        block = %err.block,
        line = err.location.map(|at| at.line),
        column = err.location.map(|at| at.col),
        "{err}"
    );
}

/// Prefixes every line with its 1-based number, right-aligned to three columns.
pub fn annotate_source(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + source.lines().count() * 6);
    for (index, line) in source.lines().enumerate() {
        out.push_str(&format!("{:>3}  {}\n", index + 1, line));
    }
    out
}

/// Drops whatever precedes the stage label on each line of native compiler
/// output, typically a temporary file path. Lines without the label are kept.
pub fn strip_filename_prefix(raw: &str, stage: Stage) -> String {
    let label = stage.keyword();
    raw.lines()
        .map(|line| match line.find(label) {
            Some(at) => &line[at..],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Annotated source followed by the cleaned-up native error text.
pub fn render_native_failure(source: &str, stage: Stage, raw_error: &str) -> String {
    let mut out = String::from("Shader compilation errors\n\n");
    out.push_str(&annotate_source(source));
    out.push('\n');
    out.push_str(strip_filename_prefix(raw_error, stage).trim_end());
    out.push('\n');
    out
}

/// Renders a native failure, logs it at error severity, and returns the text.
pub fn report_native_failure(shader: &str, stage: Stage, source: &str, raw_error: &str) -> String {
    let report = render_native_failure(source, stage, raw_error);
    error!(shader, stage = %stage, "native shader compilation failed\n{report}");
    report
}
