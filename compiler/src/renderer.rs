//! The seam between the schema walk and a concrete output language.
//!
//! A target contributes a `TargetDescriptor` (pure data: type spellings, default
//! literals, comment and namespace syntax, imports) and a `Renderer` that turns one
//! schema construct at a time into unformatted source text. Targets are looked up by
//! identifier in a `TargetRegistry`.

use std::collections::BTreeMap;

use crate::{
    error::PomelocError,
    gen_csharp::CSharpRenderer,
    types::{FieldType, RootEntry, Struct, Variable},
};

#[derive(Debug, Clone, PartialEq)]
pub struct TargetDescriptor {
    pub id:              &'static str,
    pub lang_name:       &'static str,
    pub file_extension:  &'static str,
    /// Indexed by `ScalarType as usize`.
    pub scalar_types:    [&'static str; 6],
    pub scalar_defaults: [&'static str; 6],
    pub message_default: &'static str,
    pub comment_prefix:  &'static str,
    pub namespace_begin: &'static str,
    pub includes:        &'static str,
}

impl TargetDescriptor {
    pub fn type_name<'a>(&'a self, ty: &'a FieldType) -> &'a str {
        match ty {
            FieldType::Scalar(scalar) => self.scalar_types[*scalar as usize],
            FieldType::Message(name) => name,
        }
    }

    pub fn default_value(&self, ty: &FieldType) -> &'static str {
        match ty {
            FieldType::Scalar(scalar) => self.scalar_defaults[*scalar as usize],
            FieldType::Message(_) => self.message_default,
        }
    }

    /// Generated-file banner followed by the import block.
    pub fn header(&self) -> String {
        format!(
            "{} automatically generated by pomeloc, do not modify\n{}",
            self.comment_prefix, self.includes
        )
    }
}

/// Name of the synthetic struct carrying an event's payload.
pub fn event_struct_name(entry: &RootEntry) -> String {
    format!("{}_event", entry.method)
}

/// Renders individual schema constructs. Output is a single unindented line of code;
/// layout is left to the formatter.
pub trait Renderer {
    fn descriptor(&self) -> &TargetDescriptor;

    /// Declaration of one field.
    fn field(&self, var: &Variable) -> String;

    /// Statements copying `vars` into a JSON object named `data`.
    fn to_json_body(&self, vars: &[Variable]) -> String;

    /// Statements filling `target.<field>` from a JSON object named `ret`.
    fn from_json_body(&self, vars: &[Variable], target: &str) -> String;

    /// A complete message type: nested types, fields, and both JSON methods.
    fn message(&self, message: &Struct) -> String;

    /// The client call for an rpc entry, with a completion callback when `response` is set.
    fn call_stub(&self, entry: &RootEntry, response: Option<&Struct>) -> String;

    /// The subscription method for a server-pushed event.
    fn event_stub(&self, entry: &RootEntry) -> String;

    fn class(&self, name: &str, body: &str) -> String;

    /// The single class gathering every event subscription.
    fn events_class(&self, body: &str) -> String;

    fn namespace(&self, name: &str, body: &str) -> String;
}

/// Maps target identifiers to their renderers.
pub struct TargetRegistry {
    renderers: BTreeMap<&'static str, Box<dyn Renderer>>,
}

impl TargetRegistry {
    pub fn empty() -> Self {
        TargetRegistry {
            renderers: BTreeMap::new(),
        }
    }

    /// Registers `renderer` under its descriptor id, replacing any previous one.
    pub fn register(&mut self, renderer: Box<dyn Renderer>) {
        self.renderers.insert(renderer.descriptor().id, renderer);
    }

    pub fn get(&self, id: &str) -> Result<&dyn Renderer, PomelocError> {
        self.renderers
            .get(id)
            .map(|renderer| renderer.as_ref())
            .ok_or_else(|| PomelocError::UnknownTarget(id.to_string()))
    }
}

impl Default for TargetRegistry {
    fn default() -> Self {
        let mut registry = TargetRegistry::empty();
        registry.register(Box::new(CSharpRenderer::new()));
        registry
    }
}
