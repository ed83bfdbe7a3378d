use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing::info;
use tracing_subscriber::EnvFilter;

use pomeloc::{compile_files, read_source, schema_to_json, GeneratorOptions, PomelocError};

const SERVER_PROTOS: &str = "serverProtos.json";
const CLIENT_PROTOS: &str = "clientProtos.json";

#[derive(Parser)]
#[command(name = "pomeloc", version)]
#[command(about = "Generate Pomelo client proxies from JSON protocol documents", long_about = None)]
struct Cli {
    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a client proxy from `serverProtos.json` and `clientProtos.json`
    Generate {
        /// Generate C# classes
        #[arg(short = 'n', long)]
        csharp: bool,

        /// Directory the generated file is written to
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Namespace wrapped around all generated code
        #[arg(long, default_value = "")]
        ns: String,

        /// Protocol documents; a lone file is treated as the client document
        files: Vec<PathBuf>,
    },

    /// Parse one protocol document and print its schema model as JSON
    Dump {
        /// Input `.json` protocol document
        file: PathBuf,
    },
}

/// Picks the (server, client) pair out of the positional inputs by file name. Two
/// inputs without recognisable names are taken in `server client` order.
fn classify_inputs(files: &[PathBuf]) -> Result<(Option<&Path>, &Path), PomelocError> {
    let named = |path: &Path, pattern: &str| path.to_string_lossy().contains(pattern);
    match files {
        [] => Err(PomelocError::NoInput),
        [client] => Ok((None, client.as_path())),
        [first, second] => {
            if named(first, CLIENT_PROTOS) || named(second, SERVER_PROTOS) {
                Ok((Some(second.as_path()), first.as_path()))
            } else {
                Ok((Some(first.as_path()), second.as_path()))
            }
        }
        _ => Err(PomelocError::TooManyInputs),
    }
}

fn run(cli: Cli) -> Result<(), PomelocError> {
    match cli.command {
        Commands::Generate {
            csharp,
            output,
            ns,
            files,
        } => {
            let (server, client) = classify_inputs(&files)?;
            if !csharp {
                return Err(PomelocError::NoTarget);
            }

            let options = GeneratorOptions::default().with_custom_ns(ns).with_target("csharp");
            let generated = compile_files(server, client, &options)?;

            fs::create_dir_all(&output)?;
            let out_path = output.join(&generated.file_name);
            fs::write(&out_path, &generated.contents)?;
            info!(path = %out_path.display(), "wrote proxy");
            println!("Generated {}", out_path.display());
            Ok(())
        }

        Commands::Dump { file } => {
            let source = read_source(&file)?;
            println!("{}", schema_to_json(&source)?);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(PomelocError::Parse { file, log, .. }) => {
            eprint!("{}", log);
            eprintln!("pomeloc: failed to parse {}", file);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("pomeloc: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_classify_by_name() {
        let files = paths(&["out/clientProtos.json", "out/serverProtos.json"]);
        let (server, client) = classify_inputs(&files).unwrap();
        assert_eq!(server, Some(Path::new("out/serverProtos.json")));
        assert_eq!(client, Path::new("out/clientProtos.json"));

        let files = paths(&["serverProtos.json", "clientProtos.json"]);
        let (server, client) = classify_inputs(&files).unwrap();
        assert_eq!(server, Some(Path::new("serverProtos.json")));
        assert_eq!(client, Path::new("clientProtos.json"));
    }

    #[test]
    fn test_classify_single_is_client() {
        let files = paths(&["serverProtos.json"]);
        let (server, client) = classify_inputs(&files).unwrap();
        assert_eq!(server, None);
        assert_eq!(client, Path::new("serverProtos.json"));
    }

    #[test]
    fn test_classify_counts() {
        assert!(matches!(classify_inputs(&[]), Err(PomelocError::NoInput)));
        let files = paths(&["a.json", "b.json", "c.json"]);
        assert!(matches!(classify_inputs(&files), Err(PomelocError::TooManyInputs)));
    }
}
