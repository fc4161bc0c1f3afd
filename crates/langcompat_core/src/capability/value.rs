//! Dynamic values, operations, and instances.
//!
//! # Responsibility
//! - Carry arguments and results of dynamically dispatched operations.
//! - Bind per-instance state to a sealed type's dispatch table.
//!
//! # Invariants
//! - Dispatch resolves by exact signature (name plus argument kinds).
//! - Instances never mutate their type's table.

use crate::capability::dispatch::SealedType;
use crate::capability::signature::{Signature, ValueKind};
use crate::capability::stream::CodeStream;
use std::any::Any;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

type OperationFn = dyn Fn(&Instance, &[Value]) -> Result<Value, InvokeError> + Send + Sync;

/// Type-level operation body, shared by every instance of the type.
#[derive(Clone)]
pub struct Operation(Arc<OperationFn>);

impl Operation {
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        Self(Arc::new(body))
    }

    pub fn call(&self, this: &Instance, args: &[Value]) -> Result<Value, InvokeError> {
        (self.0)(this, args)
    }
}

impl Debug for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Operation(..)")
    }
}

/// Argument and result currency for dynamic operations.
#[derive(Debug)]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    Char(u16),
    Text(String),
    Object(Instance),
    Stream(CodeStream),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Unit => ValueKind::Unit,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Char(_) => ValueKind::Char,
            Self::Text(_) => ValueKind::Text,
            Self::Object(_) => ValueKind::Object,
            Self::Stream(_) => ValueKind::Stream,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<u16> {
        match self {
            Self::Char(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Instance> {
        match self {
            Self::Object(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn into_stream(self) -> Option<CodeStream> {
        match self {
            Self::Stream(stream) => Some(stream),
            _ => None,
        }
    }
}

/// Reads an `int` argument.
pub fn int_arg(args: &[Value], position: usize) -> Result<i64, InvokeError> {
    args.get(position)
        .and_then(Value::as_int)
        .ok_or(InvokeError::ArgumentMismatch {
            position,
            expected: ValueKind::Int,
        })
}

/// Reads a `char` argument.
pub fn char_arg(args: &[Value], position: usize) -> Result<u16, InvokeError> {
    args.get(position)
        .and_then(Value::as_char)
        .ok_or(InvokeError::ArgumentMismatch {
            position,
            expected: ValueKind::Char,
        })
}

/// Reads an `object` argument.
pub fn object_arg(args: &[Value], position: usize) -> Result<&Instance, InvokeError> {
    args.get(position)
        .and_then(Value::as_object)
        .ok_or(InvokeError::ArgumentMismatch {
            position,
            expected: ValueKind::Object,
        })
}

/// One object of a sealed type.
///
/// Cloning shares both the type and the state.
#[derive(Clone)]
pub struct Instance {
    sealed: Arc<SealedType>,
    state: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    pub fn new<S>(sealed: Arc<SealedType>, state: S) -> Self
    where
        S: Any + Send + Sync,
    {
        Self {
            sealed,
            state: Arc::new(state),
        }
    }

    pub fn type_name(&self) -> &str {
        self.sealed.name()
    }

    pub fn sealed_type(&self) -> &Arc<SealedType> {
        &self.sealed
    }

    /// Borrows the instance state as `S`.
    pub fn state<S: Any>(&self) -> Result<&S, InvokeError> {
        self.state
            .downcast_ref::<S>()
            .ok_or_else(|| InvokeError::StateMismatch {
                type_name: self.type_name().to_string(),
                expected: std::any::type_name::<S>(),
            })
    }

    pub fn conforms_to(&self, capability: &str) -> bool {
        self.sealed.conforms_to(capability)
    }

    pub fn responds_to(&self, signature: &Signature) -> bool {
        self.sealed.table().contains(signature)
    }

    /// Dispatches `name` with the signature formed by the argument kinds.
    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, InvokeError> {
        let kinds: Vec<ValueKind> = args.iter().map(Value::kind).collect();
        let signature = Signature::new(name, &kinds);
        let operation = self.sealed.table().lookup(&signature).ok_or_else(|| {
            InvokeError::UnknownOperation {
                type_name: self.type_name().to_string(),
                operation: signature.clone(),
            }
        })?;
        operation.call(self, args)
    }

    /// Returns whether both handles share the same state.
    pub fn same_object(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name())
            .finish_non_exhaustive()
    }
}

/// Dynamic dispatch failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    UnknownOperation {
        type_name: String,
        operation: Signature,
    },
    ArgumentMismatch {
        position: usize,
        expected: ValueKind,
    },
    UnexpectedResult {
        operation: Signature,
        detail: String,
    },
    StateMismatch {
        type_name: String,
        expected: &'static str,
    },
    IndexOutOfRange {
        index: i64,
        length: usize,
    },
    Failed {
        operation: String,
        message: String,
    },
}

impl Display for InvokeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownOperation {
                type_name,
                operation,
            } => write!(f, "type `{type_name}` has no operation `{operation}`"),
            Self::ArgumentMismatch { position, expected } => {
                write!(f, "argument {position} must be of kind `{expected}`")
            }
            Self::UnexpectedResult { operation, detail } => {
                write!(f, "operation `{operation}` returned an unexpected result: {detail}")
            }
            Self::StateMismatch {
                type_name,
                expected,
            } => write!(f, "instance of `{type_name}` does not hold `{expected}` state"),
            Self::IndexOutOfRange { index, length } => {
                write!(f, "index {index} is out of range for length {length}")
            }
            Self::Failed { operation, message } => {
                write!(f, "operation `{operation}` failed: {message}")
            }
        }
    }
}

impl Error for InvokeError {}
