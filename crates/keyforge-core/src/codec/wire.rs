use crate::{
    MAX_KEY_COMPONENTS,
    codec::{
        CodecError, CodecKind,
        bounds::MAX_WIRE_DEPTH,
        component::{self, KeySink, KeySource},
        error::{ERR_TOO_MANY_COMPONENTS, ERR_WIRE_DEPTH},
    },
    error::InternalError,
    key::CompositeKey,
    obs::sink::{self, MetricsEvent},
    value::{Value, ValueTag},
};
use std::io::{self, Read, Write};

const CODEC: CodecKind = CodecKind::Wire;

///
/// ValueSerializer
///
/// Pluggable per-component encoding used by the wire codec. The network layer
/// may swap in its own record serializer; `BinaryValueSerializer` is the
/// built-in one.
///

pub trait ValueSerializer {
    fn write_value(&self, value: &Value, out: &mut dyn Write) -> Result<(), CodecError>;

    fn read_value(&self, input: &mut dyn Read) -> Result<Value, CodecError>;
}

///
/// BinaryValueSerializer
///
/// Type code plus the shared scalar payload. A nested composite is written as
/// its own type code, a `u32` component count and each component in turn.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct BinaryValueSerializer;

impl BinaryValueSerializer {
    fn write_nested(
        value: &Value,
        sink: &mut WriteSink<'_>,
        depth: usize,
    ) -> Result<(), CodecError> {
        if depth > MAX_WIRE_DEPTH {
            return Err(CodecError::LimitExceeded {
                codec: CODEC,
                what: "wire nesting depth",
                actual: depth,
                max: MAX_WIRE_DEPTH,
            });
        }

        sink.put(&[value.tag().to_u8()])?;

        match value {
            Value::Composite(key) => {
                write_count(sink, key.len())?;
                for component in key {
                    Self::write_nested(component, sink, depth + 1)?;
                }
                Ok(())
            }
            scalar => component::encode_payload(scalar, sink, CODEC),
        }
    }

    fn read_nested(source: &mut ReadSource<'_>, depth: usize) -> Result<Value, CodecError> {
        if depth > MAX_WIRE_DEPTH {
            return Err(source.corrupt(ERR_WIRE_DEPTH));
        }

        let tag = component::read_tag(source)?;
        if tag != ValueTag::Composite {
            return component::decode_payload(tag, source);
        }

        let count = read_count(source)?;
        let mut key = CompositeKey::with_capacity(count);
        for _ in 0..count {
            key.append(Self::read_nested(source, depth + 1)?);
        }

        Ok(Value::Composite(key))
    }
}

impl ValueSerializer for BinaryValueSerializer {
    fn write_value(&self, value: &Value, out: &mut dyn Write) -> Result<(), CodecError> {
        Self::write_nested(value, &mut WriteSink { out }, 0)
    }

    fn read_value(&self, input: &mut dyn Read) -> Result<Value, CodecError> {
        Self::read_nested(&mut ReadSource::new(input), 0)
    }
}

///
/// WireCodec
///
/// Stream encoding for keys crossing the network:
/// `[u32 component count]` followed by each component through the serializer.
///

#[derive(Clone, Debug, Default)]
pub struct WireCodec<S = BinaryValueSerializer> {
    serializer: S,
}

impl WireCodec {
    #[must_use]
    pub const fn binary() -> Self {
        Self {
            serializer: BinaryValueSerializer,
        }
    }
}

impl<S: ValueSerializer> WireCodec<S> {
    #[must_use]
    pub const fn new(serializer: S) -> Self {
        Self { serializer }
    }

    #[must_use]
    pub const fn serializer(&self) -> &S {
        &self.serializer
    }

    /// Bytes `write` produces for `key`, measured with a counting writer.
    pub fn size(&self, key: &CompositeKey) -> Result<usize, InternalError> {
        let mut counter = CountingWriter::new(io::sink());
        self.encode_into(key, &mut counter)?;

        Ok(counter.count)
    }

    /// Stream `key` into `out`; returns bytes written.
    pub fn write<W: Write>(&self, key: &CompositeKey, out: &mut W) -> Result<usize, InternalError> {
        let mut counter = CountingWriter::new(out);
        self.encode_into(key, &mut counter)?;

        sink::record(MetricsEvent::KeyEncoded {
            codec: CODEC,
            bytes: counter.count as u64,
        });

        Ok(counter.count)
    }

    /// Read one key from `input`; returns the key and bytes consumed.
    ///
    /// Nested composite components are flattened into the returned key.
    pub fn read<R: Read>(&self, input: &mut R) -> Result<(CompositeKey, usize), InternalError> {
        let mut counter = CountingReader::new(input);
        let result = self
            .decode_from(&mut counter)
            .map(|key| (key, counter.count))
            .map_err(InternalError::from);

        sink::record_decode(CODEC, &result);
        result
    }

    /// Stream one standalone value, which may itself be a nested composite.
    pub fn write_value<W: Write>(&self, value: &Value, out: &mut W) -> Result<usize, InternalError> {
        let mut counter = CountingWriter::new(out);
        self.serializer.write_value(value, &mut counter)?;

        Ok(counter.count)
    }

    /// Read one standalone value; nested composites are kept as values.
    pub fn read_value<R: Read>(&self, input: &mut R) -> Result<(Value, usize), InternalError> {
        let mut counter = CountingReader::new(input);
        let value = self.serializer.read_value(&mut counter)?;

        Ok((value, counter.count))
    }

    fn encode_into<W: Write>(
        &self,
        key: &CompositeKey,
        out: &mut CountingWriter<W>,
    ) -> Result<(), CodecError> {
        if key.len() > MAX_KEY_COMPONENTS {
            return Err(CodecError::LimitExceeded {
                codec: CODEC,
                what: "key components",
                actual: key.len(),
                max: MAX_KEY_COMPONENTS,
            });
        }

        write_count(&mut WriteSink { out: &mut *out }, key.len())?;
        for component in key {
            self.serializer.write_value(component, &mut *out)?;
        }

        Ok(())
    }

    fn decode_from<R: Read>(&self, input: &mut CountingReader<R>) -> Result<CompositeKey, CodecError> {
        let count = read_count(&mut ReadSource::new(&mut *input))?;

        let mut key = CompositeKey::with_capacity(count);
        for _ in 0..count {
            key.append(self.serializer.read_value(&mut *input)?);
        }

        Ok(key)
    }
}

fn write_count(sink: &mut impl KeySink, count: usize) -> Result<(), CodecError> {
    let count = u32::try_from(count).map_err(|_| CodecError::LimitExceeded {
        codec: CODEC,
        what: "key components",
        actual: count,
        max: MAX_KEY_COMPONENTS,
    })?;

    sink.put(&count.to_be_bytes())
}

fn read_count(source: &mut impl KeySource) -> Result<usize, CodecError> {
    let count = component::read_u32(source)? as usize;
    if count > MAX_KEY_COMPONENTS {
        return Err(source.corrupt(ERR_TOO_MANY_COMPONENTS));
    }

    Ok(count)
}

fn io_error(err: &io::Error) -> CodecError {
    CodecError::Io {
        codec: CODEC,
        message: err.to_string(),
    }
}

///
/// WriteSink / ReadSource
/// Adapters from `std::io` streams to the component core.
///

struct WriteSink<'a> {
    out: &'a mut dyn Write,
}

impl KeySink for WriteSink<'_> {
    fn put(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        self.out.write_all(bytes).map_err(|err| io_error(&err))
    }
}

struct ReadSource<'a> {
    input: &'a mut dyn Read,
    consumed: usize,
}

impl<'a> ReadSource<'a> {
    fn new(input: &'a mut dyn Read) -> Self {
        Self { input, consumed: 0 }
    }
}

impl KeySource for ReadSource<'_> {
    fn codec(&self) -> CodecKind {
        CODEC
    }

    fn position(&self) -> usize {
        self.consumed
    }

    fn take(&mut self, out: &mut [u8]) -> Result<(), CodecError> {
        match self.input.read_exact(out) {
            Ok(()) => {
                self.consumed += out.len();
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Err(self.truncated()),
            Err(err) => Err(io_error(&err)),
        }
    }
}

///
/// CountingWriter / CountingReader
///

struct CountingWriter<W> {
    inner: W,
    count: usize,
}

impl<W> CountingWriter<W> {
    const fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.count += written;

        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct CountingReader<R> {
    inner: R,
    count: usize,
}

impl<R> CountingReader<R> {
    const fn new(inner: R) -> Self {
        Self { inner, count: 0 }
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.count += read;

        Ok(read)
    }
}
