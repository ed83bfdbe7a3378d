use thiserror::Error;

/// A single grammar violation found while turning a JSON document into a `Schema`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("parse error. {0}")]
    UnparsableDocument(String),

    #[error("the root data must be object type. {0}")]
    RootNotObject(String),

    #[error("message data should be object type. {0}")]
    MalformedContainer(String),

    #[error("error grammar {0}")]
    Grammar(String),

    #[error("error key {0}")]
    UnknownKeyShape(String),

    #[error("unknown declare key type, struct declare must be [message] key word {0}")]
    UnknownDeclare(String),

    #[error("error type opt {0}")]
    UnknownQualifier(String),

    #[error("error type {0}")]
    UnknownType(String),

    #[error("error grammar {0}, field index must be an integer")]
    NonIntegerIndex(String),

    #[error("duplicate message name at same namespace {0}")]
    DuplicateStruct(String),
}

#[derive(Debug, Error)]
pub enum PomelocError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `log` holds every `error: ...` line accumulated while unwinding the failed parse.
    #[error("{log}")]
    Parse {
        file:  String,
        log:   String,
        #[source]
        cause: ParseError,
    },

    #[error("duplicate rpc declaration \"{0}\"")]
    DuplicateRpc(String),

    #[error("type \"{name}\" is declared twice in the class of \"{router}\"")]
    DuplicateType { router: String, name: String },

    #[error("invalid namespace \"{0}\"")]
    InvalidNamespace(String),

    #[error("unknown generation target \"{0}\"")]
    UnknownTarget(String),

    #[error("no options: specify at least one generator.")]
    NoTarget,

    #[error("input file appears to be binary: {0}")]
    BinaryInput(String),

    #[error("missing input files")]
    NoInput,

    #[error("too many input files")]
    TooManyInputs,
}

impl PomelocError {
    /// The grammar violation behind a failed parse, if this is one.
    pub fn parse_cause(&self) -> Option<&ParseError> {
        match self {
            PomelocError::Parse { cause, .. } => Some(cause),
            _ => None,
        }
    }
}
