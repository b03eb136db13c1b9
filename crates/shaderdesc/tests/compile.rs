use shaderdesc::{
    compile, BlockKind, InputError, InputRate, NativeFormat, ShaderType, VertexFieldDecl,
    VertexFormat, Violation,
};

const SPRITE: &str = r#"
const {
    world : matrix
    tint : float4
}
const {
    bones[4] : float4
    frame : int1
}
inter {
    uv : float2
    color : float4
    depth : float1
}
vssrc {
    float4 pos = _mul(world, float4(input.position, 1.0));
    output.position = _mul(_VP, pos);
    output.uv = input.uv;
    output.color = tint;
    output.depth = pos.z;
}
fssrc {
    output.color = _tex2D(input.uv) * input.color;
}
"#;

fn sprite_inputs() -> Vec<VertexFieldDecl> {
    vec![
        VertexFieldDecl::new("position", VertexFormat::Float3),
        VertexFieldDecl::new("uv", VertexFormat::Half2),
        VertexFieldDecl::new("offset", VertexFormat::Float2).per_instance(),
    ]
}

fn const_blocks(count: usize) -> String {
    let mut src = String::new();
    for index in 0..count {
        src.push_str(&format!("const {{ c{index} : float{} }}\n", index % 4 + 1));
    }
    src
}

fn inter_block(count: usize) -> String {
    let fields: Vec<String> = (0..count).map(|i| format!("v{i} : float4")).collect();
    format!("inter {{ {} }}\n", fields.join("\n"))
}

#[test]
fn sprite_compiles_with_expected_metadata() {
    let shader = compile(&sprite_inputs(), SPRITE, "sprite").expect("sprite compiles");

    assert_eq!(shader.name, "sprite");
    assert_eq!(shader.constant_block_sizes, vec![64 + 16, 4 * 16 + 4]);

    let names: Vec<_> = shader.interpolants.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["uv", "color", "depth"]);
    assert_eq!(shader.interpolants[2].ty, ShaderType::Float1);

    let attrs = shader.layout.attributes();
    assert_eq!(attrs.len(), 3);
    assert_eq!(attrs[0].format, NativeFormat::R32G32B32Float);
    assert_eq!(attrs[1].format, NativeFormat::R16G16Float);
    assert_eq!(attrs[1].byte_offset, 12);
    assert_eq!(attrs[2].rate, InputRate::PerInstance);
    assert_eq!(attrs[2].byte_offset, 0);
    assert_eq!(shader.layout.stride(0), 16);
    assert_eq!(shader.layout.stride(1), 8);
}

#[test]
fn constant_block_count_matches_declarations() {
    for count in 0..=8 {
        let src = format!("{}vssrc {{ }}\nfssrc {{ }}\n", const_blocks(count));
        let shader = compile(&[], &src, "blocks").unwrap();
        let expected: Vec<usize> = (0..count).map(|i| (i % 4 + 1) * 4).collect();
        assert_eq!(shader.constant_block_sizes, expected, "{count} blocks");
    }
}

#[test]
fn ninth_constant_block_is_rejected() {
    let src = format!("{}vssrc {{ }}\nfssrc {{ }}\n", const_blocks(9));
    let err = compile(&[], &src, "blocks").unwrap_err();
    assert_eq!(err.block, BlockKind::Const);
    assert_eq!(err.violation, Violation::TooManyConstBlocks);
    assert_eq!(err.location.map(|at| at.line), Some(9));
}

#[test]
fn interpolants_get_sequential_slots() {
    for count in 0..=8 {
        let src = format!("{}vssrc {{ }}\nfssrc {{ }}\n", inter_block(count));
        let shader = compile(&[], &src, "inter").unwrap();
        assert_eq!(shader.interpolants.len(), count);
        for (index, field) in shader.interpolants.iter().enumerate() {
            assert_eq!(field.slot, index as u32);
            assert_eq!(field.name, format!("v{index}"));
            assert!(shader
                .vertex_source
                .contains(&format!("float4 v{index} : TEXCOORD{index};")));
        }
    }
}

#[test]
fn ninth_interpolant_is_rejected() {
    let src = format!("{}vssrc {{ }}\nfssrc {{ }}\n", inter_block(9));
    let err = compile(&[], &src, "inter").unwrap_err();
    assert_eq!(err.block, BlockKind::Inter);
    assert_eq!(err.violation, Violation::TooManyInterpolants);
}

#[test]
fn array_field_multiplies_element_size() {
    let shader = compile(
        &[],
        "const { foo[4] : float4 }\nvssrc { }\nfssrc { }",
        "array",
    )
    .unwrap();
    assert_eq!(shader.constant_block_sizes, vec![4 * 16]);
    assert!(shader.vertex_source.contains("    float4 foo[4];\n"));
}

#[test]
fn vertex_id_only_yields_empty_layout() {
    let inputs = [VertexFieldDecl::vertex_id("id")];
    let shader = compile(
        &inputs,
        "inter {}\nvssrc { output.position = float4(0, 0, 0, 1); }\nfssrc { output.color = 1; }",
        "fullscreen",
    )
    .unwrap();
    assert!(shader.layout.is_empty());
    assert!(shader.vertex_source.contains("uint id : SV_VertexID;"));
}

#[test]
fn missing_fragment_block_fails() {
    let err = compile(&[], "const { a : float1 }\nvssrc { }\n", "half").unwrap_err();
    assert_eq!(err.block, BlockKind::FsSrc);
    assert!(matches!(err.violation, Violation::Missing(_)));
}

#[test]
fn compilation_is_deterministic() {
    let first = compile(&sprite_inputs(), SPRITE, "sprite").unwrap();
    let second = compile(&sprite_inputs(), SPRITE, "sprite").unwrap();
    assert_eq!(first.vertex_source, second.vertex_source);
    assert_eq!(first.fragment_source, second.fragment_source);
    assert_eq!(first, second);
}

#[test]
fn missing_colon_names_the_block() {
    let err = compile(&[], "const { foo float4 }\nvssrc { }\nfssrc { }", "colon").unwrap_err();
    assert_eq!(err.block, BlockKind::Const);
    assert!(matches!(
        err.violation,
        Violation::MalformedField { ref field, .. } if field == "foo"
    ));
    assert!(err.to_string().contains("constant block"));
}

#[test]
fn crlf_sources_compile_like_lf() {
    let unix = compile(&sprite_inputs(), SPRITE, "sprite").unwrap();
    let windows = compile(&sprite_inputs(), &SPRITE.replace('\n', "\r\n"), "sprite").unwrap();
    assert_eq!(unix.vertex_source, windows.vertex_source);
    assert_eq!(unix.fragment_source, windows.fragment_source);
}

#[test]
fn metadata_serializes_to_json() {
    let shader = compile(&sprite_inputs(), SPRITE, "sprite").unwrap();
    let json = serde_json::to_value(&shader).unwrap();
    assert_eq!(json["name"], "sprite");
    assert_eq!(json["layout"][0]["semantic"], "VTX");
    assert_eq!(json["layout"][1]["format"], "R16G16_FLOAT");
    assert_eq!(json["layout"][2]["rate"], "per_instance");
    assert_eq!(json["interpolants"][0]["ty"], "float2");
    assert_eq!(json["constant_block_sizes"][1], 68);
}

#[test]
fn field_names_that_would_break_the_input_struct_are_rejected() {
    let inputs = [VertexFieldDecl::new("pos; } float4 evil", VertexFormat::Float3)];
    let err = compile(&inputs, "vssrc { } fssrc { }", "inputs").unwrap_err();
    assert_eq!(err.block, BlockKind::Inputs);
    assert_eq!(
        err.violation,
        Violation::InvalidInput(InputError::NotIdentifier("pos; } float4 evil".into()))
    );
    assert_eq!(err.location, None);
    assert_eq!(
        err.to_string(),
        "shader 'inputs' vertex inputs: invalid vertex input: input 'pos; } float4 evil' is not a valid identifier"
    );
}

#[test]
fn conflicting_vertex_ids_are_rejected() {
    let repeated = [VertexFieldDecl::vertex_id("a"), VertexFieldDecl::vertex_id("a")];
    let err = compile(&repeated, "vssrc { } fssrc { }", "ids").unwrap_err();
    assert_eq!(
        err.violation,
        Violation::InvalidInput(InputError::Duplicate("a".into()))
    );

    let two = [VertexFieldDecl::vertex_id("a"), VertexFieldDecl::vertex_id("b")];
    let err = compile(&two, "vssrc { } fssrc { }", "ids").unwrap_err();
    assert!(matches!(
        err.violation,
        Violation::InvalidInput(InputError::MultipleVertexIds { .. })
    ));

    let instanced = [VertexFieldDecl::vertex_id("id").per_instance()];
    let err = compile(&instanced, "vssrc { } fssrc { }", "ids").unwrap_err();
    assert_eq!(
        err.violation,
        Violation::InvalidInput(InputError::InstancedVertexId("id".into()))
    );
}

#[test]
fn input_errors_win_over_grammar_errors() {
    let inputs = [
        VertexFieldDecl::new("uv", VertexFormat::Half2),
        VertexFieldDecl::new("uv", VertexFormat::Float2),
    ];
    let err = compile(&inputs, "vssrc {", "both").unwrap_err();
    assert_eq!(err.block, BlockKind::Inputs);
}

#[test]
fn lone_carriage_returns_count_as_line_breaks() {
    let err = compile(&[], "const { a : float1 }\rvssrc { }\rfssrc { }\rextra", "cr").unwrap_err();
    assert!(matches!(err.violation, Violation::TrailingInput(_)));
    assert_eq!(err.location.map(|at| at.line), Some(4));
}

#[test]
fn repeated_inter_block_is_named_as_such() {
    let err = compile(&[], "inter { }\ninter { }\nvssrc { }\nfssrc { }", "twice").unwrap_err();
    assert_eq!(err.block, BlockKind::Inter);
    assert_eq!(err.violation, Violation::RepeatedBlock("inter".into()));
}
