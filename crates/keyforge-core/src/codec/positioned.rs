use crate::{
    codec::{
        CodecError, CodecKind,
        component::{self, KeySink, KeySource},
    },
    error::InternalError,
    key::CompositeKey,
    obs::sink::{self, MetricsEvent},
};
use bytes::{Buf, BufMut};

const CODEC: CodecKind = CodecKind::Positioned;

///
/// PositionedCodec
///
/// Cursor encoding over `bytes` buffers. Reads and writes start at the
/// buffer's current position and advance it; the byte layout is identical to
/// `CompactCodec`.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct PositionedCodec;

impl PositionedCodec {
    pub fn size(key: &CompositeKey) -> Result<usize, InternalError> {
        Ok(component::key_size(key, CODEC)?)
    }

    /// Encode `key` at the cursor; returns bytes written.
    ///
    /// Nothing is written when the buffer cannot hold the whole key.
    pub fn write<B: BufMut>(key: &CompositeKey, buf: &mut B) -> Result<usize, InternalError> {
        let size = component::key_size(key, CODEC)?;

        let available = buf.remaining_mut();
        if available < size {
            return Err(CodecError::BufferTooSmall {
                codec: CODEC,
                needed: size,
                available,
            }
            .into());
        }

        component::encode_key(key, size, &mut BufSink(buf), CODEC)?;

        sink::record(MetricsEvent::KeyEncoded {
            codec: CODEC,
            bytes: size as u64,
        });

        Ok(size)
    }

    /// Decode one key at the cursor; returns the key and bytes consumed.
    pub fn read<B: Buf>(buf: &mut B) -> Result<(CompositeKey, usize), InternalError> {
        let mut source = BufSource {
            buf,
            consumed: 0,
        };
        let result = component::decode_key(&mut source)
            .map(|key| (key, source.consumed))
            .map_err(InternalError::from);

        sink::record_decode(CODEC, &result);
        result
    }
}

struct BufSink<'a, B: BufMut>(&'a mut B);

impl<B: BufMut> KeySink for BufSink<'_, B> {
    fn put(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        let available = self.0.remaining_mut();
        if available < bytes.len() {
            return Err(CodecError::BufferTooSmall {
                codec: CODEC,
                needed: bytes.len(),
                available,
            });
        }

        self.0.put_slice(bytes);
        Ok(())
    }
}

struct BufSource<'a, B: Buf> {
    buf: &'a mut B,
    consumed: usize,
}

impl<B: Buf> KeySource for BufSource<'_, B> {
    fn codec(&self) -> CodecKind {
        CODEC
    }

    fn position(&self) -> usize {
        self.consumed
    }

    // `copy_to_slice` panics on short input, so the length is checked first.
    fn take(&mut self, out: &mut [u8]) -> Result<(), CodecError> {
        if self.buf.remaining() < out.len() {
            return Err(self.truncated());
        }

        self.buf.copy_to_slice(out);
        self.consumed += out.len();

        Ok(())
    }
}
