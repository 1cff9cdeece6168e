// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use crate::LangError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Type {
    Int,
    String,
    Boolean,
    Real,
    Void,
}

impl Type {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Real => "real",
            Self::Void => "void",
        }
    }
}

/// A runtime value. Accessors are typed and fail when the tag does not
/// match.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Real(f64),
    String(String),
    Boolean(bool),
    Void,
}

impl Value {
    #[must_use]
    pub fn value_type(&self) -> Type {
        match self {
            Self::Int(_) => Type::Int,
            Self::Real(_) => Type::Real,
            Self::String(_) => Type::String,
            Self::Boolean(_) => Type::Boolean,
            Self::Void => Type::Void,
        }
    }

    pub fn as_int(&self) -> Result<i64, LangError> {
        match self {
            Self::Int(value) => Ok(*value),
            other => Err(LangError::runtime(format!(
                "value of type {} is not an integer", other.value_type().name()))),
        }
    }

    pub fn as_real(&self) -> Result<f64, LangError> {
        match self {
            Self::Real(value) => Ok(*value),
            other => Err(LangError::runtime(format!(
                "value of type {} is not a real number", other.value_type().name()))),
        }
    }

    pub fn as_string(&self) -> Result<&str, LangError> {
        match self {
            Self::String(value) => Ok(value),
            other => Err(LangError::runtime(format!(
                "value of type {} is not a string", other.value_type().name()))),
        }
    }

    pub fn as_boolean(&self) -> Result<bool, LangError> {
        match self {
            Self::Boolean(value) => Ok(*value),
            other => Err(LangError::runtime(format!(
                "value of type {} is not a boolean", other.value_type().name()))),
        }
    }

    /// The value a variable of the given type starts with when it is
    /// declared without an initializer.
    #[must_use]
    pub fn zero_of(ty: Type) -> Value {
        match ty {
            Type::Int => Value::Int(0),
            Type::Real => Value::Real(0.0),
            Type::String => Value::String(String::new()),
            Type::Boolean => Value::Boolean(false),
            Type::Void => Value::Void,
        }
    }

    /// Parse text into a value of the given type. Integers and reals go
    /// through their usual grammars, booleans accept `true`/`false`, strings
    /// pass through verbatim.
    pub fn from_text(ty: Type, text: &str) -> Result<Value, LangError> {
        match ty {
            Type::Int => text.parse::<i64>().map(Value::Int)
                .map_err(|_| LangError::runtime(format!("cannot parse '{text}' as int"))),
            Type::Real => text.parse::<f64>().map(Value::Real)
                .map_err(|_| LangError::runtime(format!("cannot parse '{text}' as real"))),
            Type::String => Ok(Value::String(text.to_string())),
            Type::Boolean => match text {
                "true" => Ok(Value::Boolean(true)),
                "false" => Ok(Value::Boolean(false)),
                _ => Err(LangError::runtime(format!("cannot parse '{text}' as boolean"))),
            },
            Type::Void => Err(LangError::runtime("cannot convert text to void")),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Real(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
            Self::Boolean(value) => f.write_str(if *value { "true" } else { "false" }),
            Self::Void => f.write_str("void"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use super::*;

    #[rstest]
    #[case(Value::Int(42), "42")]
    #[case(Value::Int(-7), "-7")]
    #[case(Value::Real(5.0), "5")]
    #[case(Value::Real(2.5), "2.5")]
    #[case(Value::String("hi".into()), "hi")]
    #[case(Value::Boolean(true), "true")]
    #[case(Value::Boolean(false), "false")]
    #[case(Value::Void, "void")]
    fn test_display(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(value.to_string(), expected);
    }

    #[test]
    fn test_typed_accessors() {
        assert_eq!(Value::Int(3).as_int(), Ok(3));
        assert_eq!(Value::Real(1.5).as_real(), Ok(1.5));
        assert_eq!(Value::Boolean(true).as_boolean(), Ok(true));
        assert_eq!(Value::String("x".into()).as_string(), Ok("x"));

        assert!(Value::Real(1.5).as_int().is_err());
        assert!(Value::Int(1).as_boolean().is_err());
        assert!(Value::Void.as_string().is_err());
    }

    #[rstest]
    #[case(Type::Int, Value::Int(0))]
    #[case(Type::Real, Value::Real(0.0))]
    #[case(Type::String, Value::String(String::new()))]
    #[case(Type::Boolean, Value::Boolean(false))]
    fn test_zero_values(#[case] ty: Type, #[case] expected: Value) {
        assert_eq!(Value::zero_of(ty), expected);
    }

    #[rstest]
    #[case(Type::Int, "17", Ok(Value::Int(17)))]
    #[case(Type::Int, "-4", Ok(Value::Int(-4)))]
    #[case(Type::Real, "2.5", Ok(Value::Real(2.5)))]
    #[case(Type::String, "true", Ok(Value::String("true".into())))]
    #[case(Type::Boolean, "true", Ok(Value::Boolean(true)))]
    #[case(Type::Boolean, "false", Ok(Value::Boolean(false)))]
    #[case(Type::Int, "seventeen", Err(()))]
    #[case(Type::Real, "many", Err(()))]
    #[case(Type::Boolean, "yes", Err(()))]
    fn test_from_text(#[case] ty: Type, #[case] text: &str, #[case] expected: Result<Value, ()>) {
        match expected {
            Ok(value) => assert_eq!(Value::from_text(ty, text), Ok(value)),
            Err(()) => assert!(Value::from_text(ty, text).is_err()),
        }
    }
}
