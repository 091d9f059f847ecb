//! Script value ↔ native type conversion
//!
//! Integer conversions are checked: a value that does not fit the native
//! parameter type is an error, never a silent truncation.

use std::ops::RangeInclusive;

use super::handle::ObjHandle;
use super::ptr::PtrObject;
use super::value::ScriptValue;
use crate::error::{BindingError, BindingResult};

/// Trait for converting script arguments into native parameters
pub trait FromScript: Sized {
    fn from_script(value: &ScriptValue) -> BindingResult<Self>;
}

/// Trait for converting native return values into script values
pub trait IntoScript {
    fn into_script(self) -> ScriptValue;
}

fn mismatch(expected: &'static str, value: &ScriptValue) -> BindingError {
    BindingError::TypeMismatch {
        expected,
        actual: value.type_name(),
    }
}

macro_rules! impl_int {
    ($($ty:ty),*) => {$(
        impl FromScript for $ty {
            fn from_script(value: &ScriptValue) -> BindingResult<Self> {
                let v = value.as_int().ok_or_else(|| mismatch("int", value))?;
                <$ty>::try_from(v).map_err(|_| BindingError::OutOfRange {
                    value: v,
                    target: stringify!($ty),
                })
            }
        }

        impl IntoScript for $ty {
            fn into_script(self) -> ScriptValue {
                ScriptValue::Int(self as i64)
            }
        }
    )*};
}

impl_int!(i8, u8, i16, u16, i32, u32);

impl FromScript for i64 {
    fn from_script(value: &ScriptValue) -> BindingResult<Self> {
        value.as_int().ok_or_else(|| mismatch("int", value))
    }
}

impl IntoScript for i64 {
    fn into_script(self) -> ScriptValue {
        ScriptValue::Int(self)
    }
}

impl FromScript for bool {
    fn from_script(value: &ScriptValue) -> BindingResult<Self> {
        match value {
            ScriptValue::Bool(v) => Ok(*v),
            ScriptValue::Int(v) => Ok(*v != 0),
            _ => Err(mismatch("bool", value)),
        }
    }
}

impl IntoScript for bool {
    fn into_script(self) -> ScriptValue {
        ScriptValue::Bool(self)
    }
}

impl FromScript for f32 {
    fn from_script(value: &ScriptValue) -> BindingResult<Self> {
        value
            .as_float()
            .map(|v| v as f32)
            .ok_or_else(|| mismatch("float", value))
    }
}

impl IntoScript for f32 {
    fn into_script(self) -> ScriptValue {
        ScriptValue::Float(self as f64)
    }
}

impl FromScript for String {
    fn from_script(value: &ScriptValue) -> BindingResult<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch("str", value))
    }
}

impl IntoScript for String {
    fn into_script(self) -> ScriptValue {
        ScriptValue::Str(self)
    }
}

impl IntoScript for &str {
    fn into_script(self) -> ScriptValue {
        ScriptValue::Str(self.to_string())
    }
}

impl FromScript for ObjHandle {
    fn from_script(value: &ScriptValue) -> BindingResult<Self> {
        value.as_handle().ok_or_else(|| mismatch("lv.obj", value))
    }
}

impl IntoScript for ObjHandle {
    fn into_script(self) -> ScriptValue {
        ScriptValue::Handle(self)
    }
}

impl FromScript for PtrObject {
    fn from_script(value: &ScriptValue) -> BindingResult<Self> {
        value.as_ptr().ok_or_else(|| mismatch("Blob", value))
    }
}

impl IntoScript for PtrObject {
    fn into_script(self) -> ScriptValue {
        ScriptValue::Ptr(self)
    }
}

/// `None` maps to `Option::None`, anything else must convert
impl<T: FromScript> FromScript for Option<T> {
    fn from_script(value: &ScriptValue) -> BindingResult<Self> {
        match value {
            ScriptValue::None => Ok(None),
            other => T::from_script(other).map(Some),
        }
    }
}

impl IntoScript for () {
    fn into_script(self) -> ScriptValue {
        ScriptValue::None
    }
}

impl IntoScript for ScriptValue {
    fn into_script(self) -> ScriptValue {
        self
    }
}

/// Check the argument count of a call
pub fn check_arity(
    function: &str,
    args: &[ScriptValue],
    expected: RangeInclusive<usize>,
) -> BindingResult<()> {
    if expected.contains(&args.len()) {
        return Ok(());
    }
    let expected = if expected.start() == expected.end() {
        expected.start().to_string()
    } else {
        format!("{} to {}", expected.start(), expected.end())
    };
    Err(BindingError::Arity {
        function: function.to_string(),
        expected,
        actual: args.len(),
    })
}

/// Convert the argument at `index`
///
/// A missing trailing argument reads as `None`, so optional parameters can
/// be declared as `Option<T>`.
pub fn arg<T: FromScript>(args: &[ScriptValue], index: usize) -> BindingResult<T> {
    T::from_script(args.get(index).unwrap_or(&ScriptValue::None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_range_checks() {
        assert_eq!(i16::from_script(&ScriptValue::Int(-32768)), Ok(-32768));
        assert_eq!(
            i16::from_script(&ScriptValue::Int(40000)),
            Err(BindingError::OutOfRange {
                value: 40000,
                target: "i16"
            })
        );
        assert_eq!(
            u8::from_script(&ScriptValue::Int(-1)),
            Err(BindingError::OutOfRange {
                value: -1,
                target: "u8"
            })
        );
        assert_eq!(u32::from_script(&ScriptValue::Bool(true)), Ok(1));
    }

    #[test]
    fn test_type_mismatch() {
        assert_eq!(
            i32::from_script(&ScriptValue::Str("5".into())),
            Err(BindingError::TypeMismatch {
                expected: "int",
                actual: "str"
            })
        );
        assert!(String::from_script(&ScriptValue::Int(5)).is_err());
        assert!(ObjHandle::from_script(&ScriptValue::None).is_err());
    }

    #[test]
    fn test_optional_arguments() {
        let args = [ScriptValue::Int(1)];
        assert_eq!(arg::<Option<i32>>(&args, 0), Ok(Some(1)));
        assert_eq!(arg::<Option<i32>>(&args, 1), Ok(None));
        assert!(arg::<i32>(&args, 1).is_err());
    }

    #[test]
    fn test_arity() {
        let args = [ScriptValue::Int(1), ScriptValue::Int(2)];
        assert!(check_arity("set_pos", &args, 3..=3).is_err());
        assert!(check_arity("align", &args, 2..=4).is_ok());
        assert_eq!(
            check_arity("center", &args, 1..=1),
            Err(BindingError::Arity {
                function: "center".to_string(),
                expected: "1".to_string(),
                actual: 2,
            })
        );
    }
}
