use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

pub const QUALIFIER_NAMES: [&str; 3] = ["required", "optional", "repeated"];
pub const NATIVE_TYPES: [&str; 6] = ["int32", "uInt32", "sInt32", "float", "double", "string"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Qualifier {
    Required = 0,
    Optional = 1,
    Repeated = 2,
}

impl FromStr for Qualifier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "required" => Ok(Qualifier::Required),
            "optional" => Ok(Qualifier::Optional),
            "repeated" => Ok(Qualifier::Repeated),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(QUALIFIER_NAMES[*self as usize])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScalarType {
    Int32  = 0,
    UInt32 = 1,
    SInt32 = 2,
    Float  = 3,
    Double = 4,
    String = 5,
}

impl FromStr for ScalarType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int32"  => Ok(ScalarType::Int32),
            "uInt32" => Ok(ScalarType::UInt32),
            "sInt32" => Ok(ScalarType::SInt32),
            "float"  => Ok(ScalarType::Float),
            "double" => Ok(ScalarType::Double),
            "string" => Ok(ScalarType::String),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(NATIVE_TYPES[*self as usize])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FieldType {
    Scalar(ScalarType),
    /// Name of a struct visible from the declaring scope.
    Message(String),
}

impl FieldType {
    pub fn is_message(&self) -> bool {
        matches!(self, FieldType::Message(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub index:     i64,
    pub qualifier: Qualifier,
    pub type_:     FieldType,
    pub name:      String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Struct {
    pub name:      String,
    pub vars:      Vec<Variable>,
    pub structs:   BTreeMap<String, Struct>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RootEntry {
    pub namespace: String,
    pub class:     String,
    pub method:    String,
    pub router:    String,
    pub vars:      Vec<Variable>,
    pub structs:   BTreeMap<String, Struct>,
    pub is_event:  bool,
}

impl RootEntry {
    /// Views the entry's payload as a free-standing struct called `name`.
    pub fn to_struct(&self, name: String) -> Struct {
        Struct {
            name,
            vars:      self.vars.clone(),
            structs:   self.structs.clone(),
        }
    }
}

/// Result of parsing one document, later enriched with the paired server document.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Schema {
    pub entries:   Vec<RootEntry>,
    pub responses: BTreeMap<String, Struct>,
    pub events:    Vec<RootEntry>,
}

impl Schema {
    pub fn response_for(&self, router: &str) -> Option<&Struct> {
        self.responses.get(router)
    }
}
