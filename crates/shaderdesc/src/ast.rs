use std::fmt;

use serde::Serialize;

use crate::types::ShaderType;

/// Hardware ceiling on constant buffers a shader may declare besides the frame block.
pub const MAX_CONST_BLOCKS: usize = 8;

/// Hardware ceiling on interpolated varyings (`TEXCOORD0`..`TEXCOORD7`).
pub const MAX_INTERPOLANTS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstantField {
    pub name: String,
    /// Element count when declared as `name[N]`.
    pub array_len: Option<u32>,
    pub ty: ShaderType,
}

impl ConstantField {
    pub fn byte_size(&self) -> usize {
        self.ty.byte_size() * self.array_len.unwrap_or(1) as usize
    }

    /// HLSL member declaration, without indentation.
    pub fn declaration(&self) -> String {
        match self.array_len {
            Some(len) => format!("{} {}[{}];", self.ty, self.name, len),
            None => format!("{} {};", self.ty, self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstantBlock {
    /// Position among the shader's `const` blocks; binds to register `b{index + 1}`.
    pub index: usize,
    pub fields: Vec<ConstantField>,
    pub byte_size: usize,
}

impl ConstantBlock {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            fields: Vec::new(),
            byte_size: 0,
        }
    }

    pub(crate) fn push(&mut self, field: ConstantField) {
        self.byte_size += field.byte_size();
        self.fields.push(field);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterpolatedField {
    pub name: String,
    pub ty: ShaderType,
    /// Varying slot; emitted as `TEXCOORD{slot}`.
    pub slot: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    /// Grammar keyword introducing the stage body; also used as the label
    /// handed to the native compiler.
    pub fn keyword(self) -> &'static str {
        match self {
            Stage::Vertex => "vssrc",
            Stage::Fragment => "fssrc",
        }
    }

    /// Shader-model 4 compile profile.
    pub fn profile(self) -> &'static str {
        match self {
            Stage::Vertex => "vs_4_0",
            Stage::Fragment => "ps_4_0",
        }
    }

    pub fn block_kind(self) -> BlockKind {
        match self {
            Stage::Vertex => BlockKind::VsSrc,
            Stage::Fragment => BlockKind::FsSrc,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.keyword())
    }
}

/// Block a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// A block keyword that is none of the known ones.
    Undefined,
    /// The caller's vertex field list rather than the grammar text.
    Inputs,
    Const,
    Inter,
    VsSrc,
    FsSrc,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BlockKind::Undefined => "undefined block",
            BlockKind::Inputs => "vertex inputs",
            BlockKind::Const => "constant block",
            BlockKind::Inter => "inter",
            BlockKind::VsSrc => "vssrc",
            BlockKind::FsSrc => "fssrc",
        })
    }
}

/// Verbatim statements of one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageBody {
    pub stage: Stage,
    pub text: String,
}

impl StageBody {
    /// Drops leading blank lines and trailing whitespace, then terminates the
    /// text with a single newline. An all-whitespace body becomes empty.
    pub fn new(stage: Stage, raw: &str) -> Self {
        let text = match raw.find(|c: char| !c.is_whitespace()) {
            None => String::new(),
            Some(first) => {
                let start = raw[..first].rfind('\n').map_or(0, |nl| nl + 1);
                let mut text = raw[start..].trim_end().to_string();
                text.push('\n');
                text
            }
        };
        Self { stage, text }
    }
}

/// Everything the block parser extracts from one shader description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderDescription {
    pub constant_blocks: Vec<ConstantBlock>,
    pub interpolants: Vec<InterpolatedField>,
    pub vertex_body: StageBody,
    pub fragment_body: StageBody,
}
