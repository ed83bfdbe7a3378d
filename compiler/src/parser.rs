use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::{
    error::{ParseError, PomelocError},
    types::{FieldType, Qualifier, RootEntry, ScalarType, Schema, Struct, Variable},
    utils::split_key,
};

lazy_static! {
    static ref METHOD_ROUTE:    Regex = Regex::new(r"^([^.]*)\.([^.]*)\.([^.]*)$").unwrap();
    static ref MESSAGE_KEYWORD: Regex = Regex::new(r"^message$").unwrap();
    static ref IDENTIFIER:      Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// True when every `.`-separated segment of `name` is an identifier.
pub fn is_dotted_identifier(name: &str) -> bool {
    name.split('.').all(|segment| IDENTIFIER.is_match(segment))
}

/// Struct names visible while parsing one body: the body's own structs declared so
/// far, then every enclosing body up to the root entry.
struct Scope<'a> {
    structs: &'a BTreeMap<String, Struct>,
    parent:  Option<&'a Scope<'a>>,
}

impl Scope<'_> {
    fn resolve(&self, name: &str) -> bool {
        self.structs.contains_key(name) || self.parent.is_some_and(|parent| parent.resolve(name))
    }
}

/// Parses a single protocol document. The first grammar violation aborts the parse;
/// every level it unwinds through appends to the error log.
pub struct Parser {
    file: String,
    log:  String,
}

impl Parser {
    pub fn new(file: impl Into<String>) -> Self {
        Parser {
            file: file.into(),
            log:  String::new(),
        }
    }

    pub fn parse(mut self, source: &str) -> Result<Schema, PomelocError> {
        match self.parse_document(source) {
            Ok(schema) => Ok(schema),
            Err(cause) => Err(PomelocError::Parse {
                file: self.file,
                log:  self.log,
                cause,
            }),
        }
    }

    fn error(&mut self, err: ParseError) -> ParseError {
        self.log.push_str(&format!("error: {}\n", err));
        err
    }

    fn parse_document(&mut self, source: &str) -> Result<Schema, ParseError> {
        let document: Value = match serde_json::from_str(source) {
            Ok(document) => document,
            Err(e) => {
                let file = format!("{} ({})", self.file, e);
                return Err(self.error(ParseError::UnparsableDocument(file)));
            }
        };
        let Some(roots) = document.as_object() else {
            return Err(self.error(ParseError::RootNotObject(self.file.clone())));
        };

        let mut schema = Schema::default();
        for (key, value) in roots {
            if !value.is_object() {
                return Err(self.error(ParseError::MalformedContainer(self.file.clone())));
            }
            match self.parse_root(key, value) {
                Ok(entry) => schema.entries.push(entry),
                Err(err) => {
                    self.log.push_str(&format!("error: parse failed. {}\n", key));
                    return Err(err);
                }
            }
        }

        debug!(file = %self.file, entries = schema.entries.len(), "parsed protocol document");
        Ok(schema)
    }

    fn parse_root(&mut self, key: &str, value: &Value) -> Result<RootEntry, ParseError> {
        let mut entry = RootEntry::default();
        match METHOD_ROUTE.captures(key) {
            Some(caps) => {
                entry.namespace = caps[1].to_string();
                entry.class     = caps[2].to_string();
                entry.method    = caps[3].to_string();
            }
            None => {
                entry.method   = key.to_string();
                entry.is_event = true;
            }
        }
        entry.router = key.to_string();
        if !is_dotted_identifier(key) {
            return Err(self.error(ParseError::Grammar(key.to_string())));
        }

        let Some(body) = value.as_object() else {
            return Err(self.error(ParseError::MalformedContainer(self.file.clone())));
        };
        let (vars, structs) = self.parse_body(None, body)?;
        entry.vars    = vars;
        entry.structs = structs;

        debug!(router = %entry.router, is_event = entry.is_event, "parsed root entry");
        Ok(entry)
    }

    fn parse_body(
        &mut self,
        parent: Option<&Scope<'_>>,
        body: &Map<String, Value>,
    ) -> Result<(Vec<Variable>, BTreeMap<String, Struct>), ParseError> {
        let mut vars    = Vec::new();
        let mut structs = BTreeMap::new();

        for (key, value) in body {
            let tokens = split_key(key);
            match tokens.len() {
                2 => {
                    let child = {
                        let scope = Scope { structs: &structs, parent };
                        self.parse_struct(&scope, key, &tokens, value)?
                    };
                    structs.insert(child.name.clone(), child);
                }
                3 => {
                    let scope = Scope { structs: &structs, parent };
                    vars.push(self.parse_variable(&scope, key, &tokens, value)?);
                }
                _ => return Err(self.error(ParseError::UnknownKeyShape(key.clone()))),
            }
        }

        // Stable: equal indices keep iteration order.
        vars.sort_by_key(|var| var.index);
        Ok((vars, structs))
    }

    fn parse_struct(
        &mut self,
        scope: &Scope<'_>,
        key: &str,
        tokens: &[&str],
        value: &Value,
    ) -> Result<Struct, ParseError> {
        let Some(body) = value.as_object() else {
            return Err(self.error(ParseError::Grammar(key.to_string())));
        };
        if !MESSAGE_KEYWORD.is_match(tokens[0]) {
            return Err(self.error(ParseError::UnknownDeclare(tokens[0].to_string())));
        }
        if !IDENTIFIER.is_match(tokens[1]) {
            return Err(self.error(ParseError::Grammar(key.to_string())));
        }
        let name = tokens[1].to_string();
        if scope.structs.contains_key(&name) {
            return Err(self.error(ParseError::DuplicateStruct(name)));
        }

        let (vars, structs) = self.parse_body(Some(scope), body)?;
        debug!(name = %name, fields = vars.len(), nested = structs.len(), "parsed message");
        Ok(Struct {
            name,
            vars,
            structs,
        })
    }

    fn parse_variable(
        &mut self,
        scope: &Scope<'_>,
        key: &str,
        tokens: &[&str],
        value: &Value,
    ) -> Result<Variable, ParseError> {
        let Some(index) = value.as_i64() else {
            return Err(self.error(ParseError::NonIntegerIndex(key.to_string())));
        };
        let Ok(qualifier) = tokens[0].parse::<Qualifier>() else {
            return Err(self.error(ParseError::UnknownQualifier(tokens[0].to_string())));
        };
        let type_ = match tokens[1].parse::<ScalarType>() {
            Ok(scalar) => FieldType::Scalar(scalar),
            Err(()) if scope.resolve(tokens[1]) => FieldType::Message(tokens[1].to_string()),
            Err(()) => return Err(self.error(ParseError::UnknownType(tokens[1].to_string()))),
        };
        if !IDENTIFIER.is_match(tokens[2]) {
            return Err(self.error(ParseError::Grammar(key.to_string())));
        }

        trace!(key, index, "parsed field");
        Ok(Variable {
            index,
            qualifier,
            type_,
            name: tokens[2].to_string(),
        })
    }
}

/// Parses `source` (named `file` in error messages) into a `Schema`.
pub fn parse_schema(source: &str, file: &str) -> Result<Schema, PomelocError> {
    Parser::new(file).parse(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn parse_err(source: &str) -> (ParseError, String) {
        match parse_schema(source, "test.json") {
            Err(PomelocError::Parse { cause, log, .. }) => (cause, log),
            other => panic!("expected a parse failure, got {:?}", other),
        }
    }

    #[test_case("area.playerHandler.move", false, "area", "playerHandler", "move" ; "two dots is a method")]
    #[test_case("onChat", true, "", "", "onChat" ; "no dots is an event")]
    #[test_case("chat.onChat", true, "", "", "chat.onChat" ; "one dot is an event")]
    #[test_case("a.b.c.d", true, "", "", "a.b.c.d" ; "three dots is an event")]
    fn test_root_key_classification(key: &str, is_event: bool, ns: &str, class: &str, method: &str) {
        let source = format!(r#"{{"{}": {{}}}}"#, key);
        let schema = parse_schema(&source, "test.json").unwrap();
        let entry = &schema.entries[0];
        assert_eq!(entry.is_event, is_event);
        assert_eq!(entry.namespace, ns);
        assert_eq!(entry.class, class);
        assert_eq!(entry.method, method);
        assert_eq!(entry.router, key);
    }

    #[test]
    fn test_variables_sorted_by_index() {
        let schema = parse_schema(
            r#"{"a.b.c": {"required int32 zeta": 0, "optional string alpha": 2, "repeated double mid": 1}}"#,
            "test.json",
        )
        .unwrap();
        let names: Vec<_> = schema.entries[0].vars.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "mid", "alpha"]);
        assert_eq!(schema.entries[0].vars[1].qualifier, Qualifier::Repeated);
        assert_eq!(schema.entries[0].vars[1].type_, FieldType::Scalar(ScalarType::Double));
    }

    #[test]
    fn test_message_fields_sorted_by_index() {
        let schema = parse_schema(
            r#"{"a.b.c": {"message Pos": {"required int32 z": 3, "required int32 x": 1, "optional int32 y": 2}}}"#,
            "test.json",
        )
        .unwrap();
        let pos = &schema.entries[0].structs["Pos"];
        let names: Vec<_> = pos.vars.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
        let indices: Vec<_> = pos.vars.iter().map(|v| v.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_duplicate_indices_keep_iteration_order() {
        let schema = parse_schema(
            r#"{"a.b.c": {"required int32 b": 1, "required int32 a": 1}}"#,
            "test.json",
        )
        .unwrap();
        let names: Vec<_> = schema.entries[0].vars.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_nested_message_resolution() {
        let schema = parse_schema(
            r#"{"a.b.c": {
                "message Item": {"required int32 id": 0, "message Tag": {"required string v": 0}, "optional Tag tag": 1},
                "message Pack": {"repeated Item items": 0},
                "required Pack pack": 0
            }}"#,
            "test.json",
        )
        .unwrap();
        let entry = &schema.entries[0];
        assert_eq!(entry.vars[0].type_, FieldType::Message("Pack".into()));
        let pack = &entry.structs["Pack"];
        assert_eq!(pack.vars[0].type_, FieldType::Message("Item".into()));
        let item = &entry.structs["Item"];
        assert_eq!(item.vars.len(), 2);
        assert!(item.structs.contains_key("Tag"));
    }

    #[test]
    fn test_unknown_type() {
        let (cause, log) = parse_err(r#"{"a.b.c": {"required Missing m": 0}}"#);
        assert_eq!(cause, ParseError::UnknownType("Missing".into()));
        assert_eq!(log, "error: error type Missing\nerror: parse failed. a.b.c\n");
    }

    #[test]
    fn test_child_scope_is_not_visible_to_parent() {
        let (cause, _) = parse_err(
            r#"{"a.b.c": {"message Outer": {"message Inner": {}}, "required Inner i": 0}}"#,
        );
        assert_eq!(cause, ParseError::UnknownType("Inner".into()));
    }

    #[test]
    fn test_unknown_qualifier() {
        let (cause, _) = parse_err(r#"{"a.b.c": {"mandatory int32 x": 0}}"#);
        assert_eq!(cause, ParseError::UnknownQualifier("mandatory".into()));
    }

    #[test_case(r#""0""# ; "string")]
    #[test_case("1.5" ; "float")]
    #[test_case("{}" ; "object")]
    #[test_case("null" ; "null")]
    fn test_non_integer_index(value: &str) {
        let source = format!(r#"{{"a.b.c": {{"required int32 x": {}}}}}"#, value);
        let (cause, _) = parse_err(&source);
        assert_eq!(cause, ParseError::NonIntegerIndex("required int32 x".into()));
    }

    #[test]
    fn test_struct_value_must_be_object() {
        let (cause, _) = parse_err(r#"{"a.b.c": {"message Foo": 3}}"#);
        assert_eq!(cause, ParseError::Grammar("message Foo".into()));
    }

    #[test_case(r#"{"on{Chat": {}}"#, "on{Chat" ; "brace in event")]
    #[test_case(r#"{"chat.on;Chat": {}}"#, "chat.on;Chat" ; "semicolon in dotted event")]
    #[test_case(r#"{"a.b.c}": {}}"#, "a.b.c}" ; "brace in method")]
    #[test_case(r#"{"a..c": {}}"#, "a..c" ; "empty class segment")]
    #[test_case(r#"{"1a.b.c": {}}"#, "1a.b.c" ; "namespace starts with digit")]
    #[test_case(r#"{"a.b.c": {"required int32 x}": 0}}"#, "required int32 x}" ; "brace in field name")]
    #[test_case(r#"{"a.b.c": {"optional string a-b": 0}}"#, "optional string a-b" ; "dash in field name")]
    #[test_case(r#"{"a.b.c": {"message F{oo": {}}}"#, "message F{oo" ; "brace in struct name")]
    fn test_non_identifier_names(source: &str, key: &str) {
        let (cause, log) = parse_err(source);
        assert_eq!(cause, ParseError::Grammar(key.into()));
        assert!(log.starts_with(&format!("error: error grammar {}\n", key)));
    }

    #[test]
    fn test_struct_keyword() {
        let (cause, _) = parse_err(r#"{"a.b.c": {"struct Foo": {}}}"#);
        assert_eq!(cause, ParseError::UnknownDeclare("struct".into()));
    }

    #[test_case("lonely" ; "one token")]
    #[test_case("a b c d" ; "four tokens")]
    fn test_unknown_key_shape(key: &str) {
        let source = format!(r#"{{"a.b.c": {{"{}": 0}}}}"#, key);
        let (cause, _) = parse_err(&source);
        assert_eq!(cause, ParseError::UnknownKeyShape(key.into()));
    }

    #[test]
    fn test_duplicate_struct_in_nested_scope() {
        // Sibling names are unique per JSON object, so collide through extra spaces.
        let (cause, log) = parse_err(r#"{"a.b.c": {"message Foo": {}, "message  Foo": {}}}"#);
        assert_eq!(cause, ParseError::DuplicateStruct("Foo".into()));
        assert!(log.starts_with("error: duplicate message name at same namespace Foo\n"));
    }

    #[test]
    fn test_same_struct_name_in_different_scopes() {
        let schema = parse_schema(
            r#"{"a.b.c": {"message Foo": {"message Foo": {}}}}"#,
            "test.json",
        )
        .unwrap();
        assert!(schema.entries[0].structs["Foo"].structs.contains_key("Foo"));
    }

    #[test]
    fn test_document_errors() {
        let (cause, _) = parse_err("not json");
        assert!(matches!(cause, ParseError::UnparsableDocument(_)));

        let (cause, _) = parse_err("[1, 2]");
        assert_eq!(cause, ParseError::RootNotObject("test.json".into()));

        let (cause, log) = parse_err(r#"{"a.b.c": 1}"#);
        assert_eq!(cause, ParseError::MalformedContainer("test.json".into()));
        assert_eq!(log, "error: message data should be object type. test.json\n");
    }

    #[test]
    fn test_empty_document() {
        let schema = parse_schema("{}", "test.json").unwrap();
        assert!(schema.entries.is_empty());
    }
}
