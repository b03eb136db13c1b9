//! HLSL emission for both stages.
//!
//! Output is a pure function of the parsed description, the vertex fields, and
//! the layout built from them: everything is walked in declaration order.
use crate::ast::{ConstantBlock, InterpolatedField, ShaderDescription, StageBody};
use crate::layout::{VertexFieldDecl, VertexLayout};
use crate::parser::POSITION_VARYING;

/// Helper aliases every shader body can rely on.
pub const STD_FUNCTIONS: &str = "\
#define _sign(a) sign(a)
#define _mul(a, b) mul(a, b)
#define _dot(a, b) dot(a, b)
#define _norm(a) normalize(a)
#define _lerp(a, b, k) lerp(a, b, k)
#define _tex2D(a) __t0.Sample(__s0, a)
";

/// Per-frame camera constants, bound at `b0` in both stages.
///
/// The layout must match the 96-byte frame buffer the backend uploads:
/// view-projection matrix, then camera position and direction each padded to
/// a full float4.
pub const FRAME_CONSTANTS: &str = "\
cbuffer FrameData : register(b0) {
    matrix _VP;
    float3 _CamPos;
    float _R0;
    float3 _CamDir;
    float _R1;
};
";

/// Texture and sampler backing `_tex2D`, declared in the fragment stage.
pub const FRAGMENT_RESOURCES: &str = "\
Texture2D __t0 : register(t0);
SamplerState __s0 : register(s0);
";

const FRAGMENT_OUTPUT: &str = "\
struct PSOutput {
    float4 color : SV_Target;
};
";

/// Generated source for both pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSources {
    pub vertex: String,
    pub fragment: String,
}

pub fn generate(
    inputs: &[VertexFieldDecl],
    layout: &VertexLayout,
    desc: &ShaderDescription,
) -> StageSources {
    let shared = shared_declarations(&desc.constant_blocks);
    let varyings = varyings_struct(&desc.interpolants);

    let mut vertex = shared.clone();
    vertex.push_str(&vertex_input_struct(inputs, layout));
    vertex.push('\n');
    vertex.push_str(&varyings);
    vertex.push('\n');
    vertex.push_str(&entry_point("Varyings", "VSInput", &desc.vertex_body));

    let mut fragment = shared;
    fragment.push_str(FRAGMENT_RESOURCES);
    fragment.push('\n');
    fragment.push_str(&varyings);
    fragment.push('\n');
    fragment.push_str(FRAGMENT_OUTPUT);
    fragment.push('\n');
    fragment.push_str(&entry_point("PSOutput", "Varyings", &desc.fragment_body));

    StageSources { vertex, fragment }
}

/// Helper macros, frame constants, and user constant blocks; identical in both stages.
fn shared_declarations(blocks: &[ConstantBlock]) -> String {
    let mut out = String::new();
    out.push_str(STD_FUNCTIONS);
    out.push('\n');
    out.push_str(FRAME_CONSTANTS);
    out.push('\n');
    for block in blocks {
        out.push_str(&constant_block(block));
        out.push('\n');
    }
    out
}

fn constant_block(block: &ConstantBlock) -> String {
    let mut out = format!(
        "cbuffer ConstData{index} : register(b{register}) {{\n",
        index = block.index,
        register = block.index + 1
    );
    for field in &block.fields {
        out.push_str(&format!("    {}\n", field.declaration()));
    }
    out.push_str("};\n");
    out
}

fn vertex_input_struct(inputs: &[VertexFieldDecl], layout: &VertexLayout) -> String {
    let mut out = String::from("struct VSInput {\n");
    let mut attributes = layout.attributes().iter();
    for input in inputs {
        if input.format.is_vertex_id() {
            out.push_str(&format!("    uint {} : SV_VertexID;\n", input.name));
        } else if let Some(attr) = attributes.next() {
            out.push_str(&format!(
                "    {} {} : {}{};\n",
                input.format.hlsl_type(),
                input.name,
                attr.semantic,
                attr.semantic_index
            ));
        }
    }
    out.push_str("};\n");
    out
}

fn varyings_struct(fields: &[InterpolatedField]) -> String {
    let mut out = String::from("struct Varyings {\n");
    out.push_str(&format!("    float4 {POSITION_VARYING} : SV_Position;\n"));
    for field in fields {
        out.push_str(&format!(
            "    {} {} : TEXCOORD{};\n",
            field.ty, field.name, field.slot
        ));
    }
    out.push_str("};\n");
    out
}

fn entry_point(output: &str, input: &str, body: &StageBody) -> String {
    format!(
        "{output} main({input} input) {{\n{output} output;\n{body}return output;\n}}\n",
        body = body.text
    )
}
