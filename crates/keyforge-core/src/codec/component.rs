//! Module: codec::component
//! Responsibility: the typed-component visitor shared by every key codec.
//! Does not own: destination buffers or stream handling.
//! Boundary: adapters implement `KeySink`/`KeySource`; this module owns the layout.
//!
//! Disk layout (big-endian):
//!
//! ```text
//! [u32 total size][u32 component count] ( [u8 type code][payload] )*
//! ```

use crate::{
    MAX_KEY_BYTES, MAX_KEY_COMPONENTS,
    codec::{
        CodecError, CodecKind,
        bounds::{
            DECIMAL_MAX_SCALE, DECIMAL_MAX_UNSCALED_LEN, DECIMAL_SCALE_LEN, HEADER_LEN,
            LEN_PREFIX_LEN, LINK_CLUSTER_LEN, LINK_MAX_POSITION_LEN, LINK_WIDTH_LEN,
            TYPE_CODE_LEN,
        },
        error::{
            ERR_INVALID_BOOLEAN, ERR_INVALID_DATE, ERR_INVALID_DECIMAL, ERR_INVALID_LINK,
            ERR_INVALID_SIZE, ERR_INVALID_UTF8, ERR_NESTED_COMPOSITE, ERR_OVERLONG_SEGMENT,
            ERR_SIZE_MISMATCH, ERR_TOO_MANY_COMPONENTS, ERR_TRUNCATED_KEY, ERR_UNKNOWN_TYPE_CODE,
        },
    },
    key::CompositeKey,
    types::{Date, DateTime, Decimal, RecordId},
    value::{Value, ValueTag},
};
use keyforge_primitives::PropertyType;

///
/// KeySink
///
/// Byte destination of one encode pass.
///

pub(super) trait KeySink {
    fn put(&mut self, bytes: &[u8]) -> Result<(), CodecError>;
}

///
/// KeySource
///
/// Byte origin of one decode pass. `position` counts bytes consumed.
///

pub(super) trait KeySource {
    fn codec(&self) -> CodecKind;

    fn position(&self) -> usize;

    fn take(&mut self, out: &mut [u8]) -> Result<(), CodecError>;

    fn corrupt(&self, reason: &'static str) -> CodecError {
        CodecError::Corrupt {
            codec: self.codec(),
            offset: self.position(),
            reason,
        }
    }

    fn truncated(&self) -> CodecError {
        self.corrupt(ERR_TRUNCATED_KEY)
    }
}

// ---- sizing ------------------------------------------------------------

/// Encoded size of a full disk key, header included.
pub(super) fn key_size(key: &CompositeKey, codec: CodecKind) -> Result<usize, CodecError> {
    check_component_count(key, codec)?;

    let mut size = HEADER_LEN;
    for component in key {
        size += TYPE_CODE_LEN + payload_size(component, codec)?;
    }

    if size > MAX_KEY_BYTES {
        return Err(CodecError::LimitExceeded {
            codec,
            what: "encoded key bytes",
            actual: size,
            max: MAX_KEY_BYTES,
        });
    }

    Ok(size)
}

/// Payload bytes of one scalar component, without its type code.
pub(super) fn payload_size(value: &Value, codec: CodecKind) -> Result<usize, CodecError> {
    let size = match value {
        Value::Null => 0,
        Value::String(text) => LEN_PREFIX_LEN + text.len(),
        Value::Binary(bytes) => LEN_PREFIX_LEN + bytes.len(),
        Value::Decimal(decimal) => {
            DECIMAL_SCALE_LEN + LEN_PREFIX_LEN + unscaled_bytes(decimal.mantissa()).len()
        }
        Value::Link(rid) => {
            LINK_CLUSTER_LEN + LINK_WIDTH_LEN + position_bytes(rid.position()).len()
        }
        Value::Composite(_) => return Err(unsupported(value, codec)),
        fixed => fixed
            .property_type()
            .and_then(PropertyType::fixed_size)
            .ok_or_else(|| unsupported(fixed, codec))?,
    };

    Ok(size)
}

fn check_component_count(key: &CompositeKey, codec: CodecKind) -> Result<(), CodecError> {
    if key.len() > MAX_KEY_COMPONENTS {
        return Err(CodecError::LimitExceeded {
            codec,
            what: "key components",
            actual: key.len(),
            max: MAX_KEY_COMPONENTS,
        });
    }

    Ok(())
}

const fn unsupported(value: &Value, codec: CodecKind) -> CodecError {
    CodecError::UnsupportedType {
        codec,
        kind: value.kind_label(),
    }
}

// ---- encode ------------------------------------------------------------

/// Write one full disk key. `size` must come from `key_size` for the same key.
pub(super) fn encode_key(
    key: &CompositeKey,
    size: usize,
    sink: &mut impl KeySink,
    codec: CodecKind,
) -> Result<(), CodecError> {
    sink.put(&len_u32(size, codec)?.to_be_bytes())?;
    sink.put(&len_u32(key.len(), codec)?.to_be_bytes())?;

    for component in key {
        sink.put(&[component.tag().to_u8()])?;
        encode_payload(component, sink, codec)?;
    }

    Ok(())
}

/// Write one scalar payload (no type code).
pub(super) fn encode_payload(
    value: &Value,
    sink: &mut impl KeySink,
    codec: CodecKind,
) -> Result<(), CodecError> {
    match value {
        Value::Null => Ok(()),
        Value::Boolean(v) => sink.put(&[u8::from(*v)]),
        Value::Byte(v) => sink.put(&v.to_be_bytes()),
        Value::Short(v) => sink.put(&v.to_be_bytes()),
        Value::Integer(v) => sink.put(&v.to_be_bytes()),
        Value::Long(v) => sink.put(&v.to_be_bytes()),
        Value::Float(v) => sink.put(&v.to_bits().to_be_bytes()),
        Value::Double(v) => sink.put(&v.to_bits().to_be_bytes()),
        Value::Date(v) => sink.put(&v.to_millis().to_be_bytes()),
        Value::DateTime(v) => sink.put(&v.millis().to_be_bytes()),
        Value::String(text) => put_segment(sink, text.as_bytes(), codec),
        Value::Binary(bytes) => put_segment(sink, bytes, codec),
        Value::Decimal(decimal) => {
            sink.put(&decimal.scale().to_be_bytes())?;
            put_segment(sink, &unscaled_bytes(decimal.mantissa()), codec)
        }
        Value::Link(rid) => {
            let position = position_bytes(rid.position());
            sink.put(&rid.cluster().to_be_bytes())?;
            sink.put(&[len_u8(position.len())])?;
            sink.put(&position)
        }
        Value::Composite(_) => Err(unsupported(value, codec)),
    }
}

fn put_segment(sink: &mut impl KeySink, bytes: &[u8], codec: CodecKind) -> Result<(), CodecError> {
    sink.put(&len_u32(bytes.len(), codec)?.to_be_bytes())?;
    sink.put(bytes)
}

fn len_u32(len: usize, codec: CodecKind) -> Result<u32, CodecError> {
    u32::try_from(len).map_err(|_| CodecError::LimitExceeded {
        codec,
        what: "length prefix",
        actual: len,
        max: u32::MAX as usize,
    })
}

// Callers only pass slices of at most eight bytes.
#[expect(clippy::cast_possible_truncation)]
const fn len_u8(len: usize) -> u8 {
    len as u8
}

// Minimal big-endian two's-complement form of the unscaled decimal value.
fn unscaled_bytes(mantissa: i128) -> Vec<u8> {
    let bytes = mantissa.to_be_bytes();
    let mut start = 0;

    while start + 1 < bytes.len() {
        let redundant = match bytes[start] {
            0x00 => bytes[start + 1] & 0x80 == 0,
            0xFF => bytes[start + 1] & 0x80 != 0,
            _ => false,
        };
        if !redundant {
            break;
        }
        start += 1;
    }

    bytes[start..].to_vec()
}

// Link positions are written with leading zero bytes stripped.
fn position_bytes(position: i64) -> Vec<u8> {
    let raw = position.cast_unsigned();
    let skip = (raw.leading_zeros() / 8) as usize;

    raw.to_be_bytes()[skip..].to_vec()
}

// ---- decode ------------------------------------------------------------

/// Read one full disk key and check its declared size against what was consumed.
pub(super) fn decode_key(source: &mut impl KeySource) -> Result<CompositeKey, CodecError> {
    let start = source.position();

    let declared = read_declared_size(source)?;

    let count = read_u32(source)? as usize;
    if count > MAX_KEY_COMPONENTS {
        return Err(source.corrupt(ERR_TOO_MANY_COMPONENTS));
    }

    let mut key = CompositeKey::with_capacity(count);
    for _ in 0..count {
        let tag = read_tag(source)?;
        if tag == ValueTag::Composite {
            return Err(source.corrupt(ERR_NESTED_COMPOSITE));
        }
        key.append(decode_payload(tag, source)?);
    }

    if source.position() - start != declared {
        return Err(source.corrupt(ERR_SIZE_MISMATCH));
    }

    Ok(key)
}

/// Read and resolve one type code.
pub(super) fn read_tag(source: &mut impl KeySource) -> Result<ValueTag, CodecError> {
    let code = read_array::<1>(source)?[0];

    ValueTag::from_u8(code).ok_or_else(|| source.corrupt(ERR_UNKNOWN_TYPE_CODE))
}

/// Read one scalar payload for an already-resolved tag.
pub(super) fn decode_payload(
    tag: ValueTag,
    source: &mut impl KeySource,
) -> Result<Value, CodecError> {
    let value = match tag {
        ValueTag::Null => Value::Null,
        ValueTag::Boolean => match read_array::<1>(source)?[0] {
            0 => Value::Boolean(false),
            1 => Value::Boolean(true),
            _ => return Err(source.corrupt(ERR_INVALID_BOOLEAN)),
        },
        ValueTag::Byte => Value::Byte(i8::from_be_bytes(read_array(source)?)),
        ValueTag::Short => Value::Short(i16::from_be_bytes(read_array(source)?)),
        ValueTag::Integer => Value::Integer(i32::from_be_bytes(read_array(source)?)),
        ValueTag::Long => Value::Long(i64::from_be_bytes(read_array(source)?)),
        ValueTag::Float => Value::Float(f32::from_bits(u32::from_be_bytes(read_array(source)?))),
        ValueTag::Double => {
            Value::Double(f64::from_bits(u64::from_be_bytes(read_array(source)?)))
        }
        ValueTag::Date => {
            let millis = i64::from_be_bytes(read_array(source)?);
            let date = Date::from_millis(millis).map_err(|_| source.corrupt(ERR_INVALID_DATE))?;
            Value::Date(date)
        }
        ValueTag::DateTime => {
            Value::DateTime(DateTime::from_millis(i64::from_be_bytes(read_array(source)?)))
        }
        ValueTag::String => {
            let bytes = read_segment(source)?;
            let text = String::from_utf8(bytes).map_err(|_| source.corrupt(ERR_INVALID_UTF8))?;
            Value::String(text)
        }
        ValueTag::Binary => Value::Binary(read_segment(source)?),
        ValueTag::Decimal => Value::Decimal(read_decimal(source)?),
        ValueTag::Link => Value::Link(read_link(source)?),
        ValueTag::Composite => return Err(source.corrupt(ERR_NESTED_COMPOSITE)),
    };

    Ok(value)
}

fn read_decimal(source: &mut impl KeySource) -> Result<Decimal, CodecError> {
    let scale = read_u32(source)?;
    let unscaled = read_segment(source)?;

    if scale > DECIMAL_MAX_SCALE
        || unscaled.is_empty()
        || unscaled.len() > DECIMAL_MAX_UNSCALED_LEN
    {
        return Err(source.corrupt(ERR_INVALID_DECIMAL));
    }

    let fill = if unscaled[0] & 0x80 == 0 { 0x00 } else { 0xFF };
    let mut buf = [fill; DECIMAL_MAX_UNSCALED_LEN];
    buf[DECIMAL_MAX_UNSCALED_LEN - unscaled.len()..].copy_from_slice(&unscaled);

    Decimal::try_from_i128_with_scale(i128::from_be_bytes(buf), scale)
        .map_err(|_| source.corrupt(ERR_INVALID_DECIMAL))
}

fn read_link(source: &mut impl KeySource) -> Result<RecordId, CodecError> {
    let cluster = i16::from_be_bytes(read_array(source)?);
    let width = usize::from(read_array::<1>(source)?[0]);
    if width > LINK_MAX_POSITION_LEN {
        return Err(source.corrupt(ERR_INVALID_LINK));
    }

    let mut buf = [0u8; LINK_MAX_POSITION_LEN];
    source.take(&mut buf[LINK_MAX_POSITION_LEN - width..])?;

    Ok(RecordId::new(cluster, u64::from_be_bytes(buf).cast_signed()))
}

/// Read the total-size header, rejecting lengths no valid key can carry.
pub(super) fn read_declared_size(source: &mut impl KeySource) -> Result<usize, CodecError> {
    let declared = read_u32(source)? as usize;
    if !(HEADER_LEN..=MAX_KEY_BYTES).contains(&declared) {
        return Err(source.corrupt(ERR_INVALID_SIZE));
    }

    Ok(declared)
}

pub(super) fn read_u32(source: &mut impl KeySource) -> Result<u32, CodecError> {
    read_array(source).map(u32::from_be_bytes)
}

fn read_array<const N: usize>(source: &mut impl KeySource) -> Result<[u8; N], CodecError> {
    let mut buf = [0u8; N];
    source.take(&mut buf)?;

    Ok(buf)
}

fn read_segment(source: &mut impl KeySource) -> Result<Vec<u8>, CodecError> {
    let len = read_u32(source)? as usize;
    if len > MAX_KEY_BYTES {
        return Err(source.corrupt(ERR_OVERLONG_SEGMENT));
    }

    let mut buf = vec![0u8; len];
    source.take(&mut buf)?;

    Ok(buf)
}
