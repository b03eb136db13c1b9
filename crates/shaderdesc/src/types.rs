//! Static type data shared by the parser, layout builder, and code generator.
//!
//! Types:
//!
//! - `ShaderType` names the scalar/vector/matrix types accepted in `const` and
//!   `inter` blocks and knows their constant-buffer byte size.
//! - `VertexFormat` tags a caller-declared vertex input field; it resolves to
//!   the HLSL type used in the vertex input struct and to a `NativeFormat`.
//! - `NativeFormat` mirrors the DXGI element formats the graphics backend feeds
//!   into its input-layout description.
//!
//! All lookups are `match` tables; nothing here is built at runtime.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

/// Type names accepted after the `:` of a `const` or `inter` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderType {
    Float1,
    Float2,
    Float3,
    Float4,
    Int1,
    Int2,
    Int3,
    Int4,
    Matrix,
}

impl ShaderType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "float1" => Some(Self::Float1),
            "float2" => Some(Self::Float2),
            "float3" => Some(Self::Float3),
            "float4" => Some(Self::Float4),
            "int1" => Some(Self::Int1),
            "int2" => Some(Self::Int2),
            "int3" => Some(Self::Int3),
            "int4" => Some(Self::Int4),
            "matrix" => Some(Self::Matrix),
            _ => None,
        }
    }

    /// Name as written in the grammar, which is also the HLSL spelling.
    pub fn name(self) -> &'static str {
        match self {
            Self::Float1 => "float1",
            Self::Float2 => "float2",
            Self::Float3 => "float3",
            Self::Float4 => "float4",
            Self::Int1 => "int1",
            Self::Int2 => "int2",
            Self::Int3 => "int3",
            Self::Int4 => "int4",
            Self::Matrix => "matrix",
        }
    }

    /// Bytes occupied in a constant buffer.
    pub fn byte_size(self) -> usize {
        match self {
            Self::Float1 | Self::Int1 => 4,
            Self::Float2 | Self::Int2 => 8,
            Self::Float3 | Self::Int3 => 12,
            Self::Float4 | Self::Int4 => 16,
            Self::Matrix => 64,
        }
    }
}

impl fmt::Display for ShaderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Format tag attached to every caller-declared vertex input field.
///
/// `VertexId` is a pseudo-format: the field is bound to the hardware vertex
/// counter instead of a buffer attribute. Manifests spell tags in snake case;
/// parsing ignores case and surrounding whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum VertexFormat {
    VertexId,
    Half2,
    Half4,
    Float1,
    Float2,
    Float3,
    Float4,
    Short2,
    Short4,
    Short2Nrm,
    Short4Nrm,
    Byte4,
    Byte4Nrm,
    Integer1,
    Integer2,
    Integer3,
    Integer4,
}

impl VertexFormat {
    pub fn is_vertex_id(self) -> bool {
        matches!(self, Self::VertexId)
    }

    /// HLSL type of the field inside the generated `VSInput` struct.
    pub fn hlsl_type(self) -> &'static str {
        match self {
            Self::VertexId => "uint",
            Self::Half2 | Self::Float2 | Self::Short2Nrm => "float2",
            Self::Half4 | Self::Float4 | Self::Short4Nrm | Self::Byte4Nrm => "float4",
            Self::Float1 => "float1",
            Self::Float3 => "float3",
            Self::Short2 => "int2",
            Self::Short4 => "int4",
            Self::Byte4 => "uint4",
            Self::Integer1 => "int1",
            Self::Integer2 => "int2",
            Self::Integer3 => "int3",
            Self::Integer4 => "int4",
        }
    }

    pub fn native_format(self) -> NativeFormat {
        match self {
            Self::VertexId => NativeFormat::Unknown,
            Self::Half2 => NativeFormat::R16G16Float,
            Self::Half4 => NativeFormat::R16G16B16A16Float,
            Self::Float1 => NativeFormat::R32Float,
            Self::Float2 => NativeFormat::R32G32Float,
            Self::Float3 => NativeFormat::R32G32B32Float,
            Self::Float4 => NativeFormat::R32G32B32A32Float,
            Self::Short2 => NativeFormat::R16G16Sint,
            Self::Short4 => NativeFormat::R16G16B16A16Sint,
            Self::Short2Nrm => NativeFormat::R16G16Snorm,
            Self::Short4Nrm => NativeFormat::R16G16B16A16Snorm,
            Self::Byte4 => NativeFormat::R8G8B8A8Uint,
            Self::Byte4Nrm => NativeFormat::R8G8B8A8Unorm,
            Self::Integer1 => NativeFormat::R32Uint,
            Self::Integer2 => NativeFormat::R32G32Uint,
            Self::Integer3 => NativeFormat::R32G32B32Uint,
            Self::Integer4 => NativeFormat::R32G32B32A32Uint,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown vertex format '{0}'")]
pub struct UnknownVertexFormat(pub String);

impl FromStr for VertexFormat {
    type Err = UnknownVertexFormat;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let format = match raw.trim().to_ascii_lowercase().as_str() {
            "vertex_id" => Self::VertexId,
            "half2" => Self::Half2,
            "half4" => Self::Half4,
            "float1" => Self::Float1,
            "float2" => Self::Float2,
            "float3" => Self::Float3,
            "float4" => Self::Float4,
            "short2" => Self::Short2,
            "short4" => Self::Short4,
            "short2_nrm" => Self::Short2Nrm,
            "short4_nrm" => Self::Short4Nrm,
            "byte4" => Self::Byte4,
            "byte4_nrm" => Self::Byte4Nrm,
            "integer1" => Self::Integer1,
            "integer2" => Self::Integer2,
            "integer3" => Self::Integer3,
            "integer4" => Self::Integer4,
            _ => return Err(UnknownVertexFormat(raw.to_string())),
        };
        Ok(format)
    }
}

impl TryFrom<String> for VertexFormat {
    type Error = UnknownVertexFormat;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

/// Element formats understood by the backend's input-assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeFormat {
    Unknown,
    R16G16Float,
    R16G16B16A16Float,
    R32Float,
    R32G32Float,
    R32G32B32Float,
    R32G32B32A32Float,
    R16G16Sint,
    R16G16B16A16Sint,
    R16G16Snorm,
    R16G16B16A16Snorm,
    R8G8B8A8Uint,
    R8G8B8A8Unorm,
    R32Uint,
    R32G32Uint,
    R32G32B32Uint,
    R32G32B32A32Uint,
}

impl NativeFormat {
    /// DXGI spelling without the `DXGI_FORMAT_` prefix.
    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::R16G16Float => "R16G16_FLOAT",
            Self::R16G16B16A16Float => "R16G16B16A16_FLOAT",
            Self::R32Float => "R32_FLOAT",
            Self::R32G32Float => "R32G32_FLOAT",
            Self::R32G32B32Float => "R32G32B32_FLOAT",
            Self::R32G32B32A32Float => "R32G32B32A32_FLOAT",
            Self::R16G16Sint => "R16G16_SINT",
            Self::R16G16B16A16Sint => "R16G16B16A16_SINT",
            Self::R16G16Snorm => "R16G16_SNORM",
            Self::R16G16B16A16Snorm => "R16G16B16A16_SNORM",
            Self::R8G8B8A8Uint => "R8G8B8A8_UINT",
            Self::R8G8B8A8Unorm => "R8G8B8A8_UNORM",
            Self::R32Uint => "R32_UINT",
            Self::R32G32Uint => "R32G32_UINT",
            Self::R32G32B32Uint => "R32G32B32_UINT",
            Self::R32G32B32A32Uint => "R32G32B32A32_UINT",
        }
    }

    /// Bytes one element of this format occupies in a vertex buffer.
    pub fn byte_size(self) -> u32 {
        match self {
            Self::Unknown => 0,
            Self::R8G8B8A8Uint | Self::R8G8B8A8Unorm => 4,
            Self::R16G16Float | Self::R16G16Sint | Self::R16G16Snorm => 4,
            Self::R16G16B16A16Float | Self::R16G16B16A16Sint | Self::R16G16B16A16Snorm => 8,
            Self::R32Float | Self::R32Uint => 4,
            Self::R32G32Float | Self::R32G32Uint => 8,
            Self::R32G32B32Float | Self::R32G32B32Uint => 12,
            Self::R32G32B32A32Float | Self::R32G32B32A32Uint => 16,
        }
    }
}

impl fmt::Display for NativeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl Serialize for NativeFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_type_names_round_trip() {
        for ty in [
            ShaderType::Float1,
            ShaderType::Float2,
            ShaderType::Float3,
            ShaderType::Float4,
            ShaderType::Int1,
            ShaderType::Int2,
            ShaderType::Int3,
            ShaderType::Int4,
            ShaderType::Matrix,
        ] {
            assert_eq!(ShaderType::from_name(ty.name()), Some(ty));
        }
        assert_eq!(ShaderType::from_name("float5"), None);
        assert_eq!(ShaderType::from_name("Float4"), None);
    }

    #[test]
    fn constant_sizes_match_hlsl_packing() {
        assert_eq!(ShaderType::Float1.byte_size(), 4);
        assert_eq!(ShaderType::Int3.byte_size(), 12);
        assert_eq!(ShaderType::Float4.byte_size(), 16);
        assert_eq!(ShaderType::Matrix.byte_size(), 64);
    }

    #[test]
    fn vertex_id_has_no_native_format() {
        assert_eq!(VertexFormat::VertexId.native_format(), NativeFormat::Unknown);
        assert_eq!(NativeFormat::Unknown.byte_size(), 0);
        assert_eq!(VertexFormat::VertexId.hlsl_type(), "uint");
    }

    #[test]
    fn parses_vertex_format_tags() {
        assert_eq!("float3".parse::<VertexFormat>().unwrap(), VertexFormat::Float3);
        assert_eq!(
            " Byte4_Nrm ".parse::<VertexFormat>().unwrap(),
            VertexFormat::Byte4Nrm
        );
        assert!("float5".parse::<VertexFormat>().is_err());
    }

    #[test]
    fn packed_formats_report_element_size() {
        assert_eq!(VertexFormat::Half4.native_format().byte_size(), 8);
        assert_eq!(VertexFormat::Byte4Nrm.native_format().byte_size(), 4);
        assert_eq!(VertexFormat::Float3.native_format().byte_size(), 12);
    }

    #[test]
    fn native_formats_use_dxgi_spelling() {
        assert_eq!(VertexFormat::Short4Nrm.native_format().name(), "R16G16B16A16_SNORM");
        assert_eq!(NativeFormat::R32G32B32Float.to_string(), "R32G32B32_FLOAT");
    }
}
