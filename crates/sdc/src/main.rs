mod cli;
mod run;

use anyhow::Result;
use cli::Command;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Command::Compile(args) => run::compile(args),
        Command::Check(args) => run::check(args),
        Command::Annotate(args) => run::annotate(args),
    }
}
