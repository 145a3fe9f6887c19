use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use classindex::{BuildPolicy, IndexBuilder};
use clap::Parser;

/// Scan one or more loose `.class` files and print their annotation index.
///
/// This is a demonstration driver, not a build-tool integration: it does
/// not walk jars or directories, it only proves that handing class-file
/// bytes to `classindex` produces a usable index.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(value_name = "CLASSES", required = true)]
    class_files: Vec<PathBuf>,

    /// Abort the whole scan on the first malformed or duplicate class
    /// (default: skip it and keep going)
    #[arg(long)]
    strict: bool,

    /// Print the superclass/subclass table in addition to annotations
    #[arg(long)]
    subclasses: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let policy = if args.strict {
        BuildPolicy::Strict
    } else {
        BuildPolicy::LenientSkip
    };
    let mut builder = IndexBuilder::new(policy);

    for path in &args.class_files {
        let bytes = read_class_file_bytes(path)?;
        if let Err(err) = builder.append(&bytes) {
            log::warn!("{}: {err}", path.display());
            if args.strict {
                return Err(err.into());
            }
        }
    }

    let index = builder.build();

    let stdout = io::stdout();
    let mut sink = stdout.lock();
    index.print_annotations(&mut sink)?;
    if args.subclasses {
        index.print_subclasses(&mut sink)?;
    }

    Ok(())
}

fn read_class_file_bytes(path: &PathBuf) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut contents = Vec::with_capacity(file.metadata().map(|m| m.len() as usize).unwrap_or(0));
    file.read_to_end(&mut contents)?;
    Ok(contents)
}
