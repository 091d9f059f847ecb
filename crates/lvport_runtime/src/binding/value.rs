//! Values crossing the script boundary

use std::fmt;

use super::handle::ObjHandle;
use super::ptr::PtrObject;

/// A value as seen by the scripting runtime
///
/// Widgets travel as [`ObjHandle`]s and driver callbacks as [`PtrObject`]
/// tokens. Nothing in here points into native memory.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    /// No value (void return, omitted optional argument)
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Widget object
    Handle(ObjHandle),
    /// Native driver callback
    Ptr(PtrObject),
}

impl ScriptValue {
    pub fn is_none(&self) -> bool {
        matches!(self, ScriptValue::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScriptValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract as integer (booleans count as 0/1)
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ScriptValue::Int(v) => Some(*v),
            ScriptValue::Bool(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Extract as float (integers are widened)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ScriptValue::Float(v) => Some(*v),
            ScriptValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScriptValue::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_handle(&self) -> Option<ObjHandle> {
        match self {
            ScriptValue::Handle(h) => Some(*h),
            _ => None,
        }
    }

    pub fn as_ptr(&self) -> Option<PtrObject> {
        match self {
            ScriptValue::Ptr(p) => Some(*p),
            _ => None,
        }
    }

    /// Get type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ScriptValue::None => "None",
            ScriptValue::Bool(_) => "bool",
            ScriptValue::Int(_) => "int",
            ScriptValue::Float(_) => "float",
            ScriptValue::Str(_) => "str",
            ScriptValue::Handle(h) => h.class().name(),
            ScriptValue::Ptr(_) => "Blob",
        }
    }
}

impl fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptValue::None => write!(f, "None"),
            ScriptValue::Bool(v) => write!(f, "{}", if *v { "True" } else { "False" }),
            ScriptValue::Int(v) => write!(f, "{}", v),
            ScriptValue::Float(v) => write!(f, "{}", v),
            ScriptValue::Str(v) => write!(f, "{:?}", v),
            ScriptValue::Handle(h) => write!(f, "<lv.{} object>", h.class().name()),
            ScriptValue::Ptr(p) => write!(f, "<Blob {}.{}>", p.namespace(), p.name()),
        }
    }
}
