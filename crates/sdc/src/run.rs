use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use shaderdesc::diagnostics::{annotate_source, render_native_failure};
use shaderdesc::layout::{INSTANCE_SLOT, VERTEX_SLOT};
use shaderdesc::{
    build_stages, CompiledShader, ExternalCompiler, InterpolatedField, ShaderManifest,
    VertexLayout,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{AnnotateArgs, CheckArgs, CompileArgs};

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Metadata written next to the generated sources.
#[derive(Debug, Serialize)]
struct LayoutReport<'a> {
    name: &'a str,
    vertex_stride: u32,
    instance_stride: u32,
    attributes: &'a VertexLayout,
    constant_block_sizes: &'a [usize],
    interpolants: &'a [InterpolatedField],
}

impl<'a> LayoutReport<'a> {
    fn new(shader: &'a CompiledShader) -> Self {
        Self {
            name: &shader.name,
            vertex_stride: shader.layout.stride(VERTEX_SLOT),
            instance_stride: shader.layout.stride(INSTANCE_SLOT),
            attributes: &shader.layout,
            constant_block_sizes: &shader.constant_block_sizes,
            interpolants: &shader.interpolants,
        }
    }
}

fn load_and_compile(manifest_path: &Path) -> Result<CompiledShader> {
    let manifest = ShaderManifest::load(manifest_path)
        .with_context(|| format!("failed to load manifest {}", manifest_path.display()))?;
    let source = manifest.read_source()?;
    let shader = shaderdesc::compile(&manifest.inputs, &source, &manifest.name)
        .with_context(|| format!("failed to compile {}", manifest.source.display()))?;
    Ok(shader)
}

pub fn compile(args: CompileArgs) -> Result<()> {
    let shader = load_and_compile(&args.manifest)?;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    let mut written = vec![
        write_artifact(&args.out_dir, &shader.name, "vs.hlsl", shader.vertex_source.as_bytes())?,
        write_artifact(&args.out_dir, &shader.name, "fs.hlsl", shader.fragment_source.as_bytes())?,
    ];

    let report = serde_json::to_string_pretty(&LayoutReport::new(&shader))
        .context("failed to serialise layout metadata")?;
    written.push(write_artifact(
        &args.out_dir,
        &shader.name,
        "layout.json",
        report.as_bytes(),
    )?);

    if let Some(program) = &args.native {
        let compiler = ExternalCompiler::new(program, args.native_args.clone());
        // The annotated report has already been logged by `build_stages`.
        let binaries = build_stages(&compiler, &shader)?;
        written.push(write_artifact(&args.out_dir, &shader.name, "vs.bin", &binaries.vertex)?);
        written.push(write_artifact(&args.out_dir, &shader.name, "fs.bin", &binaries.fragment)?);
    }

    info!(shader = %shader.name, files = written.len(), "compiled shader description");
    for path in &written {
        println!("{}", path.display());
    }
    Ok(())
}

fn write_artifact(dir: &Path, name: &str, suffix: &str, contents: &[u8]) -> Result<PathBuf> {
    let path = dir.join(format!("{name}.{suffix}"));
    fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

pub fn check(args: CheckArgs) -> Result<()> {
    let shader = load_and_compile(&args.manifest)?;

    println!("Shader: {}", shader.name);

    if shader.constant_block_sizes.is_empty() {
        println!("Constant blocks: none");
    } else {
        println!("Constant blocks:");
        for (index, size) in shader.constant_block_sizes.iter().enumerate() {
            println!("  ConstData{index:<3} b{:<3} {size} bytes", index + 1);
        }
    }

    if shader.interpolants.is_empty() {
        println!("Varyings: none");
    } else {
        println!("Varyings:");
        for field in &shader.interpolants {
            println!("  TEXCOORD{:<3} {:<8} {}", field.slot, field.ty, field.name);
        }
    }

    if shader.layout.is_empty() {
        println!("Vertex attributes: none");
    } else {
        println!(
            "Vertex attributes (stride {} per vertex, {} per instance):",
            shader.layout.stride(VERTEX_SLOT),
            shader.layout.stride(INSTANCE_SLOT)
        );
        for attr in shader.layout.attributes() {
            println!(
                "  {}{:<3} slot={} offset={:<4} {:<20} {}",
                attr.semantic,
                attr.semantic_index,
                attr.input_slot,
                attr.byte_offset,
                attr.format,
                attr.name
            );
        }
    }

    Ok(())
}

pub fn annotate(args: AnnotateArgs) -> Result<()> {
    let source = fs::read_to_string(&args.source)
        .with_context(|| format!("failed to read {}", args.source.display()))?;

    let rendered = match &args.errors {
        Some(errors_path) => {
            let errors = fs::read_to_string(errors_path)
                .with_context(|| format!("failed to read {}", errors_path.display()))?;
            render_native_failure(&source, args.stage, &errors)
        }
        None => annotate_source(&source),
    };

    print!("{rendered}");
    Ok(())
}
