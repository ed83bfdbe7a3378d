use tracing::info;

use crate::{
    error::PomelocError,
    formatter::Formatter,
    generator::Generator,
    options::GeneratorOptions,
    organizer::link_server_schema,
    parser::parse_schema,
    renderer::TargetRegistry,
    utils::file_stem,
};

/// A protocol document and the file name it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub name: String,
    pub text: String,
}

impl Source {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Source {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Generated proxy ready to be written out.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFile {
    /// Client document stem plus the target's extension, e.g. `clientProtos.cs`.
    pub file_name: String,
    pub contents:  String,
}

/// Parse both documents, link the server one into the client one, and render the
/// client proxy for `options.target`.
/// Returns `Err(PomelocError)` on the first failing stage; nothing is produced then.
pub fn compile_protos(
    server: Option<&Source>,
    client: &Source,
    options: &GeneratorOptions,
    registry: &TargetRegistry,
) -> Result<GeneratedFile, PomelocError> {
    let server = server
        .map(|source| parse_schema(&source.text, &source.name))
        .transpose()?;
    let mut schema = parse_schema(&client.text, &client.name)?;
    if let Some(server) = &server {
        link_server_schema(server, &mut schema);
    }

    let generator = Generator::new(&schema, options, registry)?;
    let code = generator.generate()?;
    let descriptor = generator.renderer().descriptor();

    let mut contents = descriptor.header();
    contents.push_str(&Formatter::new(options.indent_width).format(&code));

    let file_name = format!("{}{}", file_stem(&client.name), descriptor.file_extension);
    info!(file = %file_name, bytes = contents.len(), "compiled protocol documents");
    Ok(GeneratedFile {
        file_name,
        contents,
    })
}
