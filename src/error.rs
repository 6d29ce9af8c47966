use thiserror::Error;
use crate::object::{Object, ObjectType};

/// Everything that can go wrong while evaluating a script.
///
/// The `Display` text is the message carried by the resulting
/// [`Object::Error`]; evaluation never raises these, it converts them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("type mismatch: {left} {operation} {right}")]
    TypeMismatch {
        left: ObjectType,
        operation: String,
        right: ObjectType,
    },
    #[error("unknown operator: {left} {operation} {right}")]
    UnknownInfixOperator {
        left: ObjectType,
        operation: String,
        right: String,
    },
    #[error("unknown operator: {operation}{right}")]
    UnknownPrefixOperator {
        operation: String,
        right: ObjectType,
    },
    #[error("unknown operator: {left}{operation}")]
    UnknownPostfixOperator {
        left: ObjectType,
        operation: String,
    },
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),
    #[error("'{0}' was already declared in this scope")]
    AlreadyDeclared(String),
    #[error("'{0}' was not declared in this scope")]
    NotDeclared(String),
    #[error("invalid conversion from '{from}' to '{to}'")]
    InvalidConversion {
        from: ObjectType,
        to: ObjectType,
    },
    #[error("invalid return type: function returns '{got}', expected '{expected}'")]
    InvalidReturnType {
        got: String,
        expected: String,
    },
    #[error("wrong number of arguments. got={got}, want={want}")]
    WrongArgumentCount {
        got: usize,
        want: usize,
    },
    #[error("argument to `{function}` not supported, got {got}")]
    UnsupportedArgument {
        function: String,
        got: ObjectType,
    },
    #[error("index operator not supported: {0}")]
    IndexNotSupported(ObjectType),
    #[error("unusable as hash key: {0}")]
    UnusableHashKey(ObjectType),
    #[error("not a function: {0}")]
    NotAFunction(ObjectType),
    #[error("stack overflow: iteration limit of {0} exceeded")]
    IterationLimit(usize),
    #[error("stack overflow: call depth limit of {0} exceeded")]
    CallDepthLimit(usize),
}

impl From<EvalError> for Object {
    fn from(err: EvalError) -> Self {
        Object::Error(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinkError {
    #[error("library not found: {0}")]
    UnknownLibrary(String),
}

/// Failures outside script evaluation: reading sources and configuration.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}
