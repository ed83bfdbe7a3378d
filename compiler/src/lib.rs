//! pomeloc-compiler
//!
//! This crate implements:
//!  1) A parser for the JSON protocol documents (`serverProtos.json` / `clientProtos.json`),
//!  2) Linking of the server document into the client one and rpc grouping,
//!  3) A renderer registry with a C# target (`gen_csharp`),
//!  4) A brace-depth formatter for the generated text,
//!  5) Error types (`PomelocError`, `ParseError`) and the `compile_protos` pipeline.

pub mod error;
pub mod types;
pub mod utils;
pub mod parser;
pub mod organizer;
pub mod renderer;
pub mod gen_csharp;
pub mod generator;
pub mod formatter;
pub mod options;
pub mod compiler;

pub use compiler::{compile_protos, GeneratedFile, Source};
pub use error::{ParseError, PomelocError};
pub use options::GeneratorOptions;
pub use parser::parse_schema;
pub use renderer::{Renderer, TargetDescriptor, TargetRegistry};
