use std::cell::RefCell;

use shaderdesc::{build_stages, compile, CompiledShader, Stage};

fn triangle() -> CompiledShader {
    compile(
        &[],
        "vssrc {\n    output.position = float4(0, 0, 0, 1);\n}\nfssrc {\n    output.color = float4(1, 0, 0, 1);\n}\n",
        "triangle",
    )
    .unwrap()
}

#[test]
fn stages_compile_in_pipeline_order() {
    let shader = triangle();
    let seen = RefCell::new(Vec::new());
    let compiler = |stage: Stage, source: &str| -> Result<Vec<u8>, String> {
        seen.borrow_mut().push(stage);
        Ok(source.as_bytes()[..4].to_vec())
    };

    let binaries = build_stages(&compiler, &shader).unwrap();
    assert_eq!(*seen.borrow(), [Stage::Vertex, Stage::Fragment]);
    assert_eq!(binaries.vertex, &shader.vertex_source.as_bytes()[..4]);
    assert_eq!(binaries.fragment, &shader.fragment_source.as_bytes()[..4]);
}

#[test]
fn fragment_failure_reports_annotated_source() {
    let shader = triangle();
    let compiler = |stage: Stage, _source: &str| -> Result<Vec<u8>, String> {
        match stage {
            Stage::Vertex => Ok(vec![0xde, 0xad]),
            Stage::Fragment => {
                Err("C:\\Temp\\sdc-1234\\fssrc(31,5): error X3018: invalid subscript 'colour'".into())
            }
        }
    };

    let err = build_stages(&compiler, &shader).unwrap_err();
    assert_eq!(err.shader, "triangle");
    assert_eq!(err.stage, Stage::Fragment);
    assert!(err.report.starts_with("Shader compilation errors\n\n  1  #define _sign(a) sign(a)\n"));
    assert!(err
        .report
        .ends_with("\nfssrc(31,5): error X3018: invalid subscript 'colour'\n"));
    assert!(!err.report.contains("sdc-1234"));
    assert_eq!(err.to_string(), "shader 'triangle' fssrc: native compilation failed");
}

#[test]
fn vertex_failure_skips_fragment_stage() {
    let shader = triangle();
    let calls = RefCell::new(0);
    let compiler = |_stage: Stage, _source: &str| -> Result<Vec<u8>, String> {
        *calls.borrow_mut() += 1;
        Err("vssrc(1,1): error".into())
    };

    let err = build_stages(&compiler, &shader).unwrap_err();
    assert_eq!(err.stage, Stage::Vertex);
    assert_eq!(*calls.borrow(), 1);
}
