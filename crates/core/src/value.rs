use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VliwError};

/// A register value. Integers stay integers through ADD/SUB/MUL; any float
/// operand promotes the result to float.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
}

impl Value {
    pub fn as_f64(self) -> f64 {
        match self {
            Value::Int(i) => i as f64,
            Value::Float(f) => f,
        }
    }

    pub fn as_int(self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(i),
            Value::Float(_) => None,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, Value::Float(_))
    }

    pub fn add(self, rhs: Value) -> Result<Value> {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_add(b)
                .map(Value::Int)
                .ok_or_else(|| VliwError::Overflow(format!("{} + {}", a, b))),
            (a, b) => Ok(Value::Float(a.as_f64() + b.as_f64())),
        }
    }

    pub fn sub(self, rhs: Value) -> Result<Value> {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_sub(b)
                .map(Value::Int)
                .ok_or_else(|| VliwError::Overflow(format!("{} - {}", a, b))),
            (a, b) => Ok(Value::Float(a.as_f64() - b.as_f64())),
        }
    }

    pub fn mul(self, rhs: Value) -> Result<Value> {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_mul(b)
                .map(Value::Int)
                .ok_or_else(|| VliwError::Overflow(format!("{} * {}", a, b))),
            (a, b) => Ok(Value::Float(a.as_f64() * b.as_f64())),
        }
    }

    /// True division: the result is always a float.
    pub fn div(self, rhs: Value) -> Result<Value> {
        let divisor = rhs.as_f64();
        if divisor == 0.0 {
            return Err(VliwError::DivisionByZero(format!("{} / {}", self, rhs)));
        }
        Ok(Value::Float(self.as_f64() / divisor))
    }

    /// Arithmetic shift right by one. Integers only.
    pub fn shr1(self) -> Result<Value> {
        match self {
            Value::Int(i) => Ok(Value::Int(i >> 1)),
            Value::Float(f) => Err(VliwError::TypeMismatch {
                op: "SHR".to_string(),
                detail: format!("cannot shift float {}", f),
            }),
        }
    }

    /// Reinterpret as an IEEE-754 binary32 bit pattern.
    ///
    /// The operand is narrowed to `f32` first; the pattern is returned as a
    /// signed 32-bit integer widened to `i64`.
    pub fn f32_bits(self) -> Value {
        let bits = (self.as_f64() as f32).to_bits() as i32;
        Value::Int(bits as i64)
    }

    /// Inverse of [`Value::f32_bits`]: read the integer as a binary32 bit
    /// pattern. Integers outside the `i32` range are rejected.
    pub fn from_f32_bits(self) -> Result<Value> {
        match self {
            Value::Int(i) => {
                let bits = i32::try_from(i).map_err(|_| {
                    VliwError::InvalidArgument(format!("{} does not fit a 32-bit pattern", i))
                })?;
                Ok(Value::Float(f32::from_bits(bits as u32) as f64))
            }
            Value::Float(f) => Err(VliwError::TypeMismatch {
                op: "ITOF".to_string(),
                detail: format!("expected an integer bit pattern, got float {}", f),
            }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}
