use crate::value::Value;
use std::cmp::Ordering;

/// Total canonical comparator for key components.
///
/// Ordering rules:
/// 1. Null before every non-null value
/// 2. Canonical tag rank for mixed kinds
/// 3. Natural order within one kind (floats by `total_cmp`)
///
/// Nested composites compare by component prefix, so a key that is a prefix of
/// another compares equal to it.
#[must_use]
pub fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    let rank = left.tag().rank().cmp(&right.tag().rank());
    if rank != Ordering::Equal {
        return rank;
    }

    canonical_cmp_same_rank(left, right)
}

fn canonical_cmp_same_rank(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
        (Value::Byte(a), Value::Byte(b)) => a.cmp(b),
        (Value::Short(a), Value::Short(b)) => a.cmp(b),
        (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
        (Value::Long(a), Value::Long(b)) => a.cmp(b),
        (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
        (Value::Double(a), Value::Double(b)) => a.total_cmp(b),
        (Value::Decimal(a), Value::Decimal(b)) => a.cmp(b),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Binary(a), Value::Binary(b)) => a.cmp(b),
        (Value::Date(a), Value::Date(b)) => a.cmp(b),
        (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
        (Value::Link(a), Value::Link(b)) => a.cmp(b),
        (Value::Composite(a), Value::Composite(b)) => a.compare_to(b),
        _ => Ordering::Equal,
    }
}
