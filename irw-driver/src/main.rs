//! IR Writer Driver
//!
//! Command-line front end over the built-in fixture modules: list them,
//! verify them, or emit them as LLVM assembly or as a JSON dump of the
//! in-memory module.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use irw_core::Module;
use irw_fixtures::Fixture;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "irw")]
#[command(about = "LLVM IR module writer")]
#[command(version = "0.1.0")]
struct Cli {
    /// Enable logging (filtered by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in fixtures
    List,

    /// Build a fixture and write it out
    Emit {
        /// Fixture name, see `irw list`
        fixture: String,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Format::Ll)]
        format: Format,
    },

    /// Build a fixture and run the module verifier
    Verify {
        fixture: String,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Textual LLVM assembly
    Ll,
    /// serde_json dump of the module arenas
    Json,
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::init();
    }

    match cli.command {
        Commands::List => list_fixtures(),
        Commands::Emit { fixture, output, format } => {
            if let Err(e) = emit(&fixture, output.as_deref(), format) {
                eprintln!("Error emitting {fixture}: {e:#}");
                std::process::exit(1);
            }
        }
        Commands::Verify { fixture } => {
            if let Err(e) = verify(&fixture) {
                eprintln!("Error verifying {fixture}: {e:#}");
                std::process::exit(1);
            }
        }
    }
}

fn list_fixtures() {
    for fixture in Fixture::ALL {
        println!("{:<12} {}", fixture.name(), fixture.description());
    }
}

fn build_fixture(name: &str) -> Result<Module> {
    let fixture = Fixture::from_name(name).ok_or_else(|| {
        let known: Vec<_> = Fixture::ALL.iter().map(|f| f.name()).collect();
        anyhow!("unknown fixture '{name}' (expected one of: {})", known.join(", "))
    })?;
    let module = fixture
        .build()
        .with_context(|| format!("failed to build {fixture}"))?;
    Ok(module)
}

fn emit(name: &str, output: Option<&Path>, format: Format) -> Result<()> {
    let module = build_fixture(name)?;
    let text = match format {
        Format::Ll => module.render()?,
        Format::Json => {
            module.verify()?;
            let mut json = serde_json::to_string_pretty(&module)?;
            json.push('\n');
            json
        }
    };

    match output {
        Some(path) => {
            fs::write(path, &text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("wrote {} bytes to {}", text.len(), path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn verify(name: &str) -> Result<()> {
    let module = build_fixture(name)?;
    module.verify()?;
    println!(
        "{name}: ok ({} functions, {} globals, {} metadata nodes)",
        module.functions().len(),
        module.globals().len(),
        module.metadata_defs().len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fixture() {
        let err = build_fixture("nope").unwrap_err();
        assert!(err.to_string().contains("foo_debug, wasm_hello, arith"));
    }

    #[test]
    fn test_parse_emit_json() {
        let cli = Cli::try_parse_from(["irw", "-v", "emit", "arith", "--format", "json"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Emit { fixture, output, format } => {
                assert_eq!(fixture, "arith");
                assert_eq!(output, None);
                assert!(format == Format::Json);
            }
            _ => panic!("expected emit"),
        }
    }

    #[test]
    fn test_json_dump_names_functions() {
        let module = build_fixture("arith").unwrap();
        let json = serde_json::to_string(&module).unwrap();
        assert!(json.contains("\"name\":\"foo\""));
        assert!(json.contains("\"name\":\"main\""));
    }
}
