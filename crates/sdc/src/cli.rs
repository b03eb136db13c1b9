use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shaderdesc::Stage;

#[derive(Parser, Debug)]
#[command(
    name = "sdc",
    author,
    version,
    about = "Shader description compiler",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate stage sources and layout metadata for a shader manifest.
    Compile(CompileArgs),
    /// Parse a shader manifest and print what it declares without writing anything.
    Check(CheckArgs),
    /// Print a source file with numbered lines, optionally followed by native compiler errors.
    Annotate(AnnotateArgs),
}

#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// Shader manifest (TOML) naming the grammar file and vertex inputs.
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Directory receiving the generated files (created if missing).
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Native compiler run once per stage; source arrives on stdin, the binary is read from stdout.
    #[arg(long, value_name = "PROGRAM", env = "SDC_NATIVE_COMPILER")]
    pub native: Option<PathBuf>,

    /// Argument passed to the native compiler; `{stage}`, `{profile}` and `{entry}` are substituted.
    #[arg(
        long = "native-arg",
        value_name = "ARG",
        requires = "native",
        allow_hyphen_values = true
    )]
    pub native_args: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,
}

#[derive(Parser, Debug)]
pub struct AnnotateArgs {
    /// Generated stage source to number.
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Raw native compiler output to append after the numbered source.
    #[arg(long, value_name = "FILE")]
    pub errors: Option<PathBuf>,

    /// Stage label used to strip file paths from the error text (`vssrc` or `fssrc`).
    #[arg(
        long,
        value_name = "STAGE",
        value_parser = parse_stage,
        default_value = "vssrc"
    )]
    pub stage: Stage,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_stage(value: &str) -> Result<Stage, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "vssrc" | "vs" | "vertex" => Ok(Stage::Vertex),
        "fssrc" | "fs" | "ps" | "fragment" => Ok(Stage::Fragment),
        other => Err(format!(
            "unknown stage '{other}' (expected `vssrc` or `fssrc`)"
        )),
    }
}
