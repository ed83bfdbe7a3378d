use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::{
    error::PomelocError,
    types::{FieldType, RootEntry, Schema, Struct, Variable},
    utils::last_segment,
};

pub type MethodGroup    = BTreeMap<String, RootEntry>;
pub type ClassGroup     = BTreeMap<String, MethodGroup>;
pub type NamespaceGroup = BTreeMap<String, ClassGroup>;

/// Builds the reply struct for a server-declared method: `<last router segment>_result`.
pub fn response_struct(entry: &RootEntry) -> Struct {
    entry.to_struct(format!("{}_result", last_segment(&entry.router)))
}

/// Folds the server document into the client schema: server events become client
/// events, every other server entry registers the reply type of its router.
pub fn link_server_schema(server: &Schema, client: &mut Schema) {
    for entry in &server.entries {
        if entry.is_event {
            debug!(router = %entry.router, "linked server event");
            client.events.push(entry.clone());
        } else {
            debug!(router = %entry.router, "linked response type");
            client.responses.insert(entry.router.clone(), response_struct(entry));
        }
    }
}

/// Groups client RPC declarations by namespace, class and method, qualifying the
/// nested structs of each entry with its method name.
pub fn group_entries(entries: &[RootEntry]) -> Result<NamespaceGroup, PomelocError> {
    let mut groups = NamespaceGroup::new();

    for entry in entries {
        if entry.is_event {
            warn!(router = %entry.router, "client document declares an event; it has no rpc stub");
            continue;
        }

        let methods = groups
            .entry(entry.namespace.clone())
            .or_default()
            .entry(entry.class.clone())
            .or_default();
        if methods.contains_key(&entry.method) {
            return Err(PomelocError::DuplicateRpc(entry.router.clone()));
        }

        let mut entry = entry.clone();
        qualify_nested_structs(&mut entry);
        methods.insert(entry.method.clone(), entry);
    }

    Ok(groups)
}

/// Renames every struct declared directly under `entry` to `<method>_<name>` and
/// rewrites the references that resolve to it.
pub fn qualify_nested_structs(entry: &mut RootEntry) {
    if entry.structs.is_empty() {
        return;
    }

    let renames: BTreeMap<String, String> = entry
        .structs
        .keys()
        .map(|name| (name.clone(), format!("{}_{}", entry.method, name)))
        .collect();

    let structs = std::mem::take(&mut entry.structs);
    entry.structs = structs
        .into_iter()
        .map(|(old, mut nested)| {
            rewrite_struct(&mut nested, &renames);
            nested.name = renames[&old].clone();
            (nested.name.clone(), nested)
        })
        .collect();
    rename_references(&mut entry.vars, &renames);
}

fn rewrite_struct(nested: &mut Struct, renames: &BTreeMap<String, String>) {
    // A child with the same name shadows the entry-level struct below this point.
    let visible: BTreeMap<String, String> = renames
        .iter()
        .filter(|(old, _)| !nested.structs.contains_key(*old))
        .map(|(old, new)| (old.clone(), new.clone()))
        .collect();
    if visible.is_empty() {
        return;
    }

    rename_references(&mut nested.vars, &visible);
    for child in nested.structs.values_mut() {
        rewrite_struct(child, &visible);
    }
}

fn rename_references(vars: &mut [Variable], renames: &BTreeMap<String, String>) {
    for var in vars {
        if let FieldType::Message(name) = &mut var.type_ {
            if let Some(new_name) = renames.get(name.as_str()) {
                *name = new_name.clone();
            }
        }
    }
}
