use crate::{
    codec::{
        CodecError, CodecKind,
        component::{self, KeySink, KeySource},
    },
    error::InternalError,
    key::CompositeKey,
    obs::sink::{self, MetricsEvent},
};

const CODEC: CodecKind = CodecKind::Compact;

///
/// CompactCodec
///
/// Fixed byte-slice encoding used for keys stored on index pages.
/// Offsets are absolute positions inside the caller's buffer.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct CompactCodec;

impl CompactCodec {
    /// Exact number of bytes `write` will produce for `key`.
    pub fn size(key: &CompositeKey) -> Result<usize, InternalError> {
        Ok(component::key_size(key, CODEC)?)
    }

    /// Declared size of the key stored at `offset`, read from its header only.
    ///
    /// A header outside the range any encoded key can occupy is corruption.
    pub fn size_at(buffer: &[u8], offset: usize) -> Result<usize, InternalError> {
        let mut source = SliceSource::new(buffer, offset);
        Ok(component::read_declared_size(&mut source)?)
    }

    /// Encode `key` into `buffer` starting at `offset`; returns bytes written.
    pub fn write(
        key: &CompositeKey,
        buffer: &mut [u8],
        offset: usize,
    ) -> Result<usize, InternalError> {
        let size = component::key_size(key, CODEC)?;

        let available = buffer.len().saturating_sub(offset);
        if available < size {
            return Err(CodecError::BufferTooSmall {
                codec: CODEC,
                needed: size,
                available,
            }
            .into());
        }

        let mut sink = SliceSink {
            buffer: &mut buffer[offset..offset + size],
            position: 0,
        };
        component::encode_key(key, size, &mut sink, CODEC)?;
        debug_assert_eq!(sink.position, size);

        sink::record(MetricsEvent::KeyEncoded {
            codec: CODEC,
            bytes: size as u64,
        });

        Ok(size)
    }

    /// Encode `key` into a fresh vector.
    pub fn to_vec(key: &CompositeKey) -> Result<Vec<u8>, InternalError> {
        let mut buffer = vec![0u8; Self::size(key)?];
        Self::write(key, &mut buffer, 0)?;

        Ok(buffer)
    }

    /// Decode the key stored at `offset`; returns the key and bytes consumed.
    pub fn read(buffer: &[u8], offset: usize) -> Result<(CompositeKey, usize), InternalError> {
        let mut source = SliceSource::new(buffer, offset);
        let result = component::decode_key(&mut source)
            .map(|key| (key, source.position()))
            .map_err(InternalError::from);

        sink::record_decode(CODEC, &result);
        result
    }
}

///
/// SliceSink
///

struct SliceSink<'a> {
    buffer: &'a mut [u8],
    position: usize,
}

impl KeySink for SliceSink<'_> {
    fn put(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        let end = self.position + bytes.len();
        let available = self.buffer.len();
        let target = self
            .buffer
            .get_mut(self.position..end)
            .ok_or(CodecError::BufferTooSmall {
                codec: CODEC,
                needed: end,
                available,
            })?;

        target.copy_from_slice(bytes);
        self.position = end;

        Ok(())
    }
}

///
/// SliceSource
///

struct SliceSource<'a> {
    buffer: &'a [u8],
    start: usize,
    cursor: usize,
}

impl<'a> SliceSource<'a> {
    const fn new(buffer: &'a [u8], offset: usize) -> Self {
        Self {
            buffer,
            start: offset,
            cursor: offset,
        }
    }
}

impl KeySource for SliceSource<'_> {
    fn codec(&self) -> CodecKind {
        CODEC
    }

    fn position(&self) -> usize {
        self.cursor - self.start
    }

    fn take(&mut self, out: &mut [u8]) -> Result<(), CodecError> {
        let end = self
            .cursor
            .checked_add(out.len())
            .ok_or_else(|| self.truncated())?;
        let bytes = self.buffer.get(self.cursor..end).ok_or_else(|| self.truncated())?;

        out.copy_from_slice(bytes);
        self.cursor = end;

        Ok(())
    }
}
