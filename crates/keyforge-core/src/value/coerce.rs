use crate::{
    types::{Date, DateTime, Decimal, RecordId, TemporalError},
    value::Value,
};
use keyforge_primitives::PropertyType;
use std::str::FromStr;
use thiserror::Error as ThisError;

///
/// CoercionError
///
/// A value could not be converted into a declared property type.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CoercionError {
    #[error("cannot convert {kind} value '{value}' to {expected}")]
    Incompatible {
        expected: PropertyType,
        kind: &'static str,
        value: String,
    },

    #[error("{kind} value '{value}' is out of range for {expected}")]
    OutOfRange {
        expected: PropertyType,
        kind: &'static str,
        value: String,
    },

    #[error("{kind} values cannot be used as a key component")]
    NotIndexable { kind: &'static str },
}

impl CoercionError {
    fn incompatible(value: &Value, expected: PropertyType) -> Self {
        Self::Incompatible {
            expected,
            kind: value.kind_label(),
            value: value.to_string(),
        }
    }

    fn out_of_range(value: &Value, expected: PropertyType) -> Self {
        Self::OutOfRange {
            expected,
            kind: value.kind_label(),
            value: value.to_string(),
        }
    }

    fn from_temporal(err: &TemporalError, value: &Value, expected: PropertyType) -> Self {
        match err {
            TemporalError::OutOfRange(_) => Self::out_of_range(value, expected),
            TemporalError::InvalidFormat(_) => Self::incompatible(value, expected),
        }
    }
}

// Null passes through untouched; the caller decides what a null key means.
pub(super) fn coerce(value: &Value, ty: PropertyType) -> Result<Value, CoercionError> {
    match value {
        Value::Null => return Ok(Value::Null),
        Value::Composite(_) => {
            return Err(CoercionError::NotIndexable {
                kind: value.kind_label(),
            });
        }
        _ if value.property_type() == Some(ty) => return Ok(value.clone()),
        _ => {}
    }

    match ty {
        PropertyType::Boolean => to_bool(value).map(Value::Boolean),
        PropertyType::Byte => to_i64(value, ty).and_then(|n| narrow(n, value, ty)).map(Value::Byte),
        PropertyType::Short => to_i64(value, ty)
            .and_then(|n| narrow(n, value, ty))
            .map(Value::Short),
        PropertyType::Integer => to_i64(value, ty)
            .and_then(|n| narrow(n, value, ty))
            .map(Value::Integer),
        PropertyType::Long => to_i64(value, ty).map(Value::Long),
        PropertyType::Float => to_f64(value, ty).and_then(|n| to_f32(n, value)).map(Value::Float),
        PropertyType::Double => to_f64(value, ty).map(Value::Double),
        PropertyType::Decimal => to_decimal(value).map(Value::Decimal),
        PropertyType::String => match value {
            Value::Binary(_) => Err(CoercionError::incompatible(value, ty)),
            other => Ok(Value::String(other.to_string())),
        },
        PropertyType::Binary => Err(CoercionError::incompatible(value, ty)),
        PropertyType::Date => to_date(value).map(Value::Date),
        PropertyType::DateTime => to_datetime(value).map(Value::DateTime),
        PropertyType::Link => to_link(value).map(Value::Link),
    }
}

fn to_bool(value: &Value) -> Result<bool, CoercionError> {
    let ty = PropertyType::Boolean;

    match value {
        Value::Byte(_) | Value::Short(_) | Value::Integer(_) | Value::Long(_) => {
            to_i64(value, ty).map(|n| n != 0)
        }
        Value::String(text) => {
            let text = text.trim();
            if text.eq_ignore_ascii_case("true") {
                Ok(true)
            } else if text.eq_ignore_ascii_case("false") {
                Ok(false)
            } else {
                Err(CoercionError::incompatible(value, ty))
            }
        }
        _ => Err(CoercionError::incompatible(value, ty)),
    }
}

fn to_i64(value: &Value, ty: PropertyType) -> Result<i64, CoercionError> {
    match value {
        Value::Boolean(v) => Ok(i64::from(*v)),
        Value::Byte(v) => Ok(i64::from(*v)),
        Value::Short(v) => Ok(i64::from(*v)),
        Value::Integer(v) => Ok(i64::from(*v)),
        Value::Long(v) => Ok(*v),
        Value::Float(v) => float_to_i64(f64::from(*v)).ok_or_else(|| CoercionError::out_of_range(value, ty)),
        Value::Double(v) => float_to_i64(*v).ok_or_else(|| CoercionError::out_of_range(value, ty)),
        Value::Decimal(v) => {
            i64::try_from(v.trunc()).map_err(|_| CoercionError::out_of_range(value, ty))
        }
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| CoercionError::incompatible(value, ty)),
        Value::Date(date) => Ok(date.to_millis()),
        Value::DateTime(instant) => Ok(instant.millis()),
        _ => Err(CoercionError::incompatible(value, ty)),
    }
}

fn narrow<T: TryFrom<i64>>(n: i64, value: &Value, ty: PropertyType) -> Result<T, CoercionError> {
    T::try_from(n).map_err(|_| CoercionError::out_of_range(value, ty))
}

// Truncates toward zero; non-finite and out-of-range inputs are rejected.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn float_to_i64(v: f64) -> Option<i64> {
    let truncated = v.trunc();
    let in_range = truncated >= i64::MIN as f64 && truncated < i64::MAX as f64;

    (v.is_finite() && in_range).then_some(truncated as i64)
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(value: &Value, ty: PropertyType) -> Result<f64, CoercionError> {
    match value {
        Value::Byte(v) => Ok(f64::from(*v)),
        Value::Short(v) => Ok(f64::from(*v)),
        Value::Integer(v) => Ok(f64::from(*v)),
        Value::Long(v) => Ok(*v as f64),
        Value::Float(v) => Ok(f64::from(*v)),
        Value::Double(v) => Ok(*v),
        Value::Decimal(v) => f64::try_from(*v).map_err(|_| CoercionError::out_of_range(value, ty)),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| CoercionError::incompatible(value, ty)),
        _ => Err(CoercionError::incompatible(value, ty)),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn to_f32(n: f64, value: &Value) -> Result<f32, CoercionError> {
    if n.is_finite() && n.abs() > f64::from(f32::MAX) {
        return Err(CoercionError::out_of_range(value, PropertyType::Float));
    }

    Ok(n as f32)
}

fn to_decimal(value: &Value) -> Result<Decimal, CoercionError> {
    let ty = PropertyType::Decimal;

    match value {
        Value::Byte(_) | Value::Short(_) | Value::Integer(_) | Value::Long(_) => {
            to_i64(value, ty).map(Decimal::from)
        }
        Value::Float(v) => {
            Decimal::try_from(f64::from(*v)).map_err(|_| CoercionError::out_of_range(value, ty))
        }
        Value::Double(v) => {
            Decimal::try_from(*v).map_err(|_| CoercionError::out_of_range(value, ty))
        }
        Value::String(text) => {
            let text = text.trim();
            Decimal::from_str(text)
                .or_else(|_| Decimal::from_scientific(text))
                .map_err(|_| CoercionError::incompatible(value, ty))
        }
        _ => Err(CoercionError::incompatible(value, ty)),
    }
}

fn to_date(value: &Value) -> Result<Date, CoercionError> {
    let ty = PropertyType::Date;
    let temporal = |err: TemporalError| CoercionError::from_temporal(&err, value, ty);

    match value {
        Value::DateTime(instant) => instant.date().map_err(temporal),
        Value::Byte(_) | Value::Short(_) | Value::Integer(_) | Value::Long(_) => {
            Date::from_millis(to_i64(value, ty)?).map_err(temporal)
        }
        Value::String(text) => Date::parse(text)
            .or_else(|_| DateTime::parse(text).and_then(DateTime::date))
            .map_err(temporal),
        _ => Err(CoercionError::incompatible(value, ty)),
    }
}

fn to_datetime(value: &Value) -> Result<DateTime, CoercionError> {
    let ty = PropertyType::DateTime;

    match value {
        Value::Date(date) => Ok(DateTime::from_millis(date.to_millis())),
        Value::Byte(_) | Value::Short(_) | Value::Integer(_) | Value::Long(_) => {
            to_i64(value, ty).map(DateTime::from_millis)
        }
        Value::String(text) => DateTime::parse(text)
            .or_else(|_| Date::parse(text).map(|date| DateTime::from_millis(date.to_millis())))
            .map_err(|err| CoercionError::from_temporal(&err, value, ty)),
        _ => Err(CoercionError::incompatible(value, ty)),
    }
}

fn to_link(value: &Value) -> Result<RecordId, CoercionError> {
    match value {
        Value::String(text) => {
            RecordId::from_str(text).map_err(|_| CoercionError::incompatible(value, PropertyType::Link))
        }
        _ => Err(CoercionError::incompatible(value, PropertyType::Link)),
    }
}
