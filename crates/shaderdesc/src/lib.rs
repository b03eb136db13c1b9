//! Shader description compiler.
//!
//! A shader is authored once in a compact block grammar and compiled into the
//! HLSL source of both pipeline stages plus the metadata a graphics backend
//! needs to bind it:
//!
//! ```text
//!   grammar text ──▶ Scanner ──▶ Parser ──▶ ShaderDescription
//!                                                │
//!   vertex fields ──▶ build_vertex_layout ───────┤
//!                                                ▼
//!                                   codegen::generate ──▶ CompiledShader
//!                                                                │
//!                                 (optional) native::build_stages ◀┘
//! ```
//!
//! The compiler never touches a GPU. Backends take the returned
//! [`CompiledShader`] by value and hand its sources to their own toolchain,
//! optionally through [`native::build_stages`] so that failures are rendered
//! with numbered source lines.

pub mod ast;
pub mod codegen;
pub mod diagnostics;
pub mod error;
pub mod layout;
pub mod manifest;
pub mod native;
pub mod parser;
pub mod scanner;
pub mod types;

use serde::Serialize;
use tracing::debug;

pub use ast::{BlockKind, ConstantBlock, ConstantField, InterpolatedField, Stage};
pub use error::{CompileError, Violation};
pub use layout::{InputError, InputRate, VertexAttribute, VertexFieldDecl, VertexLayout};
pub use manifest::{ManifestError, ShaderManifest};
pub use native::{build_stages, ExternalCompiler, NativeCompiler, NativeError, StageBinaries};
pub use types::{NativeFormat, ShaderType, VertexFormat};

/// Everything produced for one shader description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledShader {
    pub name: String,
    pub vertex_source: String,
    pub fragment_source: String,
    pub layout: VertexLayout,
    /// Byte size of each user constant block, in declaration order.
    pub constant_block_sizes: Vec<usize>,
    pub interpolants: Vec<InterpolatedField>,
}

impl CompiledShader {
    pub fn source(&self, stage: Stage) -> &str {
        match stage {
            Stage::Vertex => &self.vertex_source,
            Stage::Fragment => &self.fragment_source,
        }
    }
}

/// Compiles a shader description against the caller's vertex fields.
///
/// `name` only labels diagnostics. The vertex fields are checked before the
/// grammar is parsed. On failure the error is logged before it is returned
/// and nothing else is produced.
pub fn compile(
    inputs: &[VertexFieldDecl],
    source: &str,
    name: &str,
) -> Result<CompiledShader, CompileError> {
    layout::validate_inputs(inputs)
        .map_err(|err| CompileError {
            shader: name.to_string(),
            block: BlockKind::Inputs,
            violation: Violation::InvalidInput(err),
            location: None,
        })
        .inspect_err(diagnostics::report_compile_error)?;

    let desc = parser::Parser::new(source, name)
        .parse()
        .inspect_err(diagnostics::report_compile_error)?;

    let layout = layout::build_vertex_layout(inputs);
    let constant_block_sizes = layout::constant_block_sizes(&desc.constant_blocks);
    let sources = codegen::generate(inputs, &layout, &desc);

    debug!(
        shader = name,
        constant_blocks = constant_block_sizes.len(),
        interpolants = desc.interpolants.len(),
        attributes = layout.len(),
        "shader description compiled"
    );

    Ok(CompiledShader {
        name: name.to_string(),
        vertex_source: sources.vertex,
        fragment_source: sources.fragment,
        layout,
        constant_block_sizes,
        interpolants: desc.interpolants,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_selects_stage() {
        let shader = compile(&[], "vssrc { a; } fssrc { b; }", "select").unwrap();
        assert!(shader.source(Stage::Vertex).contains("a;\nreturn output;"));
        assert!(shader.source(Stage::Fragment).contains("b;\nreturn output;"));
    }

    #[test]
    fn failure_carries_shader_name() {
        let err = compile(&[], "vssrc { }", "lonely").unwrap_err();
        assert_eq!(err.shader, "lonely");
        assert!(err.to_string().starts_with("shader 'lonely'"));
    }
}
