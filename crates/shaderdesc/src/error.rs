use thiserror::Error;

use crate::ast::{BlockKind, MAX_CONST_BLOCKS, MAX_INTERPOLANTS};
use crate::layout::InputError;
use crate::scanner::Location;

/// A grammar or input violation. Compilation stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("shader '{shader}' {block}: {violation}{}", location_suffix(.location))]
pub struct CompileError {
    pub shader: String,
    pub block: BlockKind,
    pub violation: Violation,
    /// Position in the grammar text; `None` when the caller's vertex fields are at fault.
    pub location: Option<Location>,
}

fn location_suffix(location: &Option<Location>) -> String {
    match location {
        Some(location) => format!(" ({location})"),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("'const' or 'inter' expected, found {0}")]
    UnrecognizedBlock(String),

    #[error("too many constant blocks (at most {} are supported)", MAX_CONST_BLOCKS)]
    TooManyConstBlocks,

    #[error("too many elements (at most {} are supported)", MAX_INTERPOLANTS)]
    TooManyInterpolants,

    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("syntax error in field '{field}': {reason}")]
    MalformedField { field: String, reason: String },

    #[error("unknown type '{ty}' for field '{field}'")]
    UnknownType { field: String, ty: String },

    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),

    #[error("field name '{0}' is reserved")]
    ReservedField(String),

    #[error("block not found, found {0}")]
    Missing(String),

    #[error("block is missing its closing '}}'")]
    Unterminated,

    #[error("unexpected {0} after the fssrc block")]
    TrailingInput(String),

    #[error("'{0}' block declared more than once")]
    RepeatedBlock(String),

    #[error("invalid vertex input: {0}")]
    InvalidInput(InputError),
}
