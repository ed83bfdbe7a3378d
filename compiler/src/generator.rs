use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::{
    error::PomelocError,
    options::GeneratorOptions,
    organizer::{group_entries, NamespaceGroup},
    parser::is_dotted_identifier,
    renderer::{event_struct_name, Renderer, TargetRegistry},
    types::{RootEntry, Schema},
};

/// Everything one generation run needs: the linked client schema, the caller's
/// options and the renderer they selected.
pub struct Generator<'a> {
    schema:   &'a Schema,
    options:  &'a GeneratorOptions,
    renderer: &'a dyn Renderer,
}

impl<'a> Generator<'a> {
    pub fn new(
        schema: &'a Schema,
        options: &'a GeneratorOptions,
        registry: &'a TargetRegistry,
    ) -> Result<Self, PomelocError> {
        let renderer = registry.get(&options.target)?;
        if !options.custom_ns.is_empty() && !is_dotted_identifier(&options.custom_ns) {
            return Err(PomelocError::InvalidNamespace(options.custom_ns.clone()));
        }
        Ok(Generator {
            schema,
            options,
            renderer,
        })
    }

    pub fn renderer(&self) -> &'a dyn Renderer {
        self.renderer
    }

    /// Renders the whole proxy as unformatted text.
    pub fn generate(&self) -> Result<String, PomelocError> {
        let groups = group_entries(&self.schema.entries)?;
        let mut code = self.rpc_namespaces(&groups)?;
        code.push_str(&self.events());

        if !self.options.custom_ns.is_empty() {
            code = self.renderer.namespace(&self.options.custom_ns, &code);
        }

        info!(
            target_lang = self.renderer.descriptor().lang_name,
            namespaces = groups.len(),
            events = self.schema.events.len(),
            "generated proxy"
        );
        Ok(code)
    }

    fn rpc_namespaces(&self, groups: &NamespaceGroup) -> Result<String, PomelocError> {
        let mut code = String::new();
        for (namespace, classes) in groups {
            let mut namespace_body = String::new();
            for (class, methods) in classes {
                let mut declared = BTreeSet::new();
                let mut class_body = String::new();
                for entry in methods.values() {
                    class_body.push_str(&self.rpc(entry, &mut declared)?);
                }
                namespace_body.push_str(&self.renderer.class(class, &class_body));
            }
            code.push_str(&self.renderer.namespace(namespace, &namespace_body));
        }
        Ok(code)
    }

    /// Nested types hoisted to class scope, the reply type if any, then the call stub.
    /// `declared` collects the type names already emitted into the enclosing class.
    pub fn rpc(&self, entry: &RootEntry, declared: &mut BTreeSet<String>) -> Result<String, PomelocError> {
        debug!(router = %entry.router, "generating rpc");
        let response = self.schema.response_for(&entry.router);

        let mut code = String::new();
        for nested in entry.structs.values().chain(response) {
            if !declared.insert(nested.name.clone()) {
                return Err(PomelocError::DuplicateType {
                    router: entry.router.clone(),
                    name:   nested.name.clone(),
                });
            }
            code.push_str(&self.renderer.message(nested));
        }
        code.push_str(&self.renderer.call_stub(entry, response));
        Ok(code)
    }

    pub fn event(&self, entry: &RootEntry) -> String {
        debug!(router = %entry.router, "generating event");
        let payload = entry.to_struct(event_struct_name(entry));
        let mut code = self.renderer.message(&payload);
        code.push_str(&self.renderer.event_stub(entry));
        code
    }

    fn events(&self) -> String {
        let body: String = self.schema.events.iter().map(|entry| self.event(entry)).collect();
        self.renderer.events_class(&body)
    }
}
