//! Turns caller-declared vertex fields and parsed constant blocks into the
//! descriptive data a graphics backend needs to build an input layout and
//! allocate constant buffers. Nothing here touches a GPU.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ast::ConstantBlock;
use crate::parser::is_identifier;
use crate::types::{NativeFormat, VertexFormat};

/// Semantic name shared by every bound vertex attribute (`VTX0`, `VTX1`, ...).
pub const VERTEX_SEMANTIC: &str = "VTX";

/// Input-assembler slot holding per-vertex data.
pub const VERTEX_SLOT: u32 = 0;

/// Input-assembler slot holding per-instance data.
pub const INSTANCE_SLOT: u32 = 1;

/// One vertex input field as declared by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexFieldDecl {
    pub name: String,
    pub format: VertexFormat,
    #[serde(default)]
    pub per_instance: bool,
}

impl VertexFieldDecl {
    pub fn new(name: impl Into<String>, format: VertexFormat) -> Self {
        Self {
            name: name.into(),
            format,
            per_instance: false,
        }
    }

    /// Declares the hardware vertex counter under `name`.
    pub fn vertex_id(name: impl Into<String>) -> Self {
        Self::new(name, VertexFormat::VertexId)
    }

    pub fn per_instance(mut self) -> Self {
        self.per_instance = true;
        self
    }
}

/// A vertex field list the generator cannot turn into a valid input struct.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("input '{0}' is not a valid identifier")]
    NotIdentifier(String),
    #[error("input '{0}' is declared more than once")]
    Duplicate(String),
    #[error("vertex_id input '{0}' cannot be per-instance")]
    InstancedVertexId(String),
    #[error("at most one vertex_id input may be declared, found '{first}' and '{second}'")]
    MultipleVertexIds { first: String, second: String },
}

/// Checks that every field can be emitted as a `VSInput` member.
pub fn validate_inputs(fields: &[VertexFieldDecl]) -> Result<(), InputError> {
    let mut seen = BTreeSet::new();
    let mut vertex_id: Option<&str> = None;
    for field in fields {
        if !is_identifier(&field.name) {
            return Err(InputError::NotIdentifier(field.name.clone()));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(InputError::Duplicate(field.name.clone()));
        }
        if field.format.is_vertex_id() {
            if field.per_instance {
                return Err(InputError::InstancedVertexId(field.name.clone()));
            }
            if let Some(first) = vertex_id {
                return Err(InputError::MultipleVertexIds {
                    first: first.to_string(),
                    second: field.name.clone(),
                });
            }
            vertex_id = Some(&field.name);
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputRate {
    PerVertex,
    PerInstance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VertexAttribute {
    pub name: String,
    pub semantic: &'static str,
    pub semantic_index: u32,
    pub format: NativeFormat,
    pub input_slot: u32,
    pub byte_offset: u32,
    pub rate: InputRate,
    /// Instances drawn per element advance; zero for per-vertex data.
    pub instance_step_rate: u32,
}

/// Ordered vertex-attribute description for one shader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Packed size of one element in the given input slot.
    pub fn stride(&self, input_slot: u32) -> u32 {
        self.attributes
            .iter()
            .filter(|attr| attr.input_slot == input_slot)
            .map(|attr| attr.byte_offset + attr.format.byte_size())
            .max()
            .unwrap_or(0)
    }
}

/// Builds the attribute list in declaration order, skipping vertex-id fields.
///
/// Per-vertex fields pack into [`VERTEX_SLOT`] and per-instance fields into
/// [`INSTANCE_SLOT`]; inside each slot a field starts right after the previous
/// one, the first at offset 0. Semantic indices run across both slots.
pub fn build_vertex_layout(fields: &[VertexFieldDecl]) -> VertexLayout {
    let mut attributes = Vec::with_capacity(fields.len());
    let mut vertex_offset = 0;
    let mut instance_offset = 0;

    for field in fields.iter().filter(|field| !field.format.is_vertex_id()) {
        let format = field.format.native_format();
        let (input_slot, offset, rate, instance_step_rate) = if field.per_instance {
            (INSTANCE_SLOT, &mut instance_offset, InputRate::PerInstance, 1)
        } else {
            (VERTEX_SLOT, &mut vertex_offset, InputRate::PerVertex, 0)
        };

        attributes.push(VertexAttribute {
            name: field.name.clone(),
            semantic: VERTEX_SEMANTIC,
            semantic_index: attributes.len() as u32,
            format,
            input_slot,
            byte_offset: *offset,
            rate,
            instance_step_rate,
        });
        *offset += format.byte_size();
    }

    VertexLayout { attributes }
}

/// Byte sizes of the constant buffers backing each `const` block, in block order.
pub fn constant_block_sizes(blocks: &[ConstantBlock]) -> Vec<usize> {
    blocks.iter().map(|block| block.byte_size).collect()
}
