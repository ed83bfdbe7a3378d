//! pomeloc
//!
//! Front door to the protocol compiler.
//!
//! - `compile_files`: read a server/client document pair from disk and render the proxy
//! - `schema_to_json`: pretty JSON view of a parsed schema, for debugging documents

use std::{fs, path::Path};

use tracing::debug;

pub use pomeloc_compiler::{
    compile_protos,
    parse_schema,
    GeneratedFile,
    GeneratorOptions,
    ParseError,
    PomelocError,
    Source,
    TargetRegistry,
};

/// Read `path` into a `Source` named by its file name. Files containing NUL bytes are
/// rejected as binary.
pub fn read_source(path: &Path) -> Result<Source, PomelocError> {
    let text = fs::read_to_string(path)?;
    if text.contains('\0') {
        return Err(PomelocError::BinaryInput(path.display().to_string()));
    }
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    debug!(path = %path.display(), bytes = text.len(), "read protocol document");
    Ok(Source::new(name, text))
}

/// Compile the documents at `server` (optional) and `client` with the default targets.
pub fn compile_files(
    server: Option<&Path>,
    client: &Path,
    options: &GeneratorOptions,
) -> Result<GeneratedFile, PomelocError> {
    let server = server.map(read_source).transpose()?;
    let client = read_source(client)?;
    compile_protos(server.as_ref(), &client, options, &TargetRegistry::default())
}

/// Parse one document and pretty-print the resulting schema model.
pub fn schema_to_json(source: &Source) -> Result<String, PomelocError> {
    let schema = parse_schema(&source.text, &source.name)?;
    Ok(serde_json::to_string_pretty(&schema)?)
}

pub mod error {
    pub use pomeloc_compiler::error::{ParseError, PomelocError};
}

pub mod types {
    pub use pomeloc_compiler::types::{FieldType, Qualifier, RootEntry, ScalarType, Schema, Struct, Variable};
}
