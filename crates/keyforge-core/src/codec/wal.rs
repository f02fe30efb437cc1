use crate::{
    codec::{
        CodecError, CodecKind,
        component::{self, KeySink, KeySource},
    },
    error::InternalError,
    key::CompositeKey,
    obs::sink::{self, MetricsEvent},
};

const CODEC: CodecKind = CodecKind::LogDelta;

///
/// WalChanges
///
/// Page-change tracker of a write-ahead-logged page.
///
/// Writes are recorded as byte ranges over an unmodified base page; reads
/// return the base page with every recorded range laid over it.
///

pub trait WalChanges {
    /// Record `bytes` as the new content of `page[offset..offset + bytes.len()]`.
    fn set_binary_value(&mut self, page: &[u8], bytes: &[u8], offset: usize);

    /// Current content of `page[offset..offset + len]`, or `None` when the
    /// range falls outside the page.
    fn binary_value(&self, page: &[u8], offset: usize, len: usize) -> Option<Vec<u8>>;
}

///
/// PageChange
///
/// One recorded byte range.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageChange {
    offset: usize,
    bytes: Vec<u8>,
}

impl PageChange {
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    const fn end(&self) -> usize {
        self.offset + self.bytes.len()
    }
}

///
/// PageChanges
///
/// In-memory `WalChanges` implementation. Contiguous writes are coalesced into
/// one range; later ranges win where they overlap earlier ones.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PageChanges {
    changes: Vec<PageChange>,
}

impl PageChanges {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            changes: Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    #[must_use]
    pub fn changes(&self) -> &[PageChange] {
        &self.changes
    }

    /// Total bytes carried by the recorded ranges.
    #[must_use]
    pub fn changed_bytes(&self) -> usize {
        self.changes.iter().map(|change| change.bytes.len()).sum()
    }

    /// Replay every recorded range onto `page`. Ranges outside it are skipped.
    pub fn apply_to(&self, page: &mut [u8]) {
        for change in &self.changes {
            if let Some(target) = page.get_mut(change.offset..change.end()) {
                target.copy_from_slice(&change.bytes);
            }
        }
    }
}

impl WalChanges for PageChanges {
    fn set_binary_value(&mut self, _page: &[u8], bytes: &[u8], offset: usize) {
        if let Some(last) = self.changes.last_mut()
            && last.end() == offset
        {
            last.bytes.extend_from_slice(bytes);
            return;
        }

        self.changes.push(PageChange {
            offset,
            bytes: bytes.to_vec(),
        });
    }

    fn binary_value(&self, page: &[u8], offset: usize, len: usize) -> Option<Vec<u8>> {
        let end = offset.checked_add(len)?;
        let mut out = page.get(offset..end)?.to_vec();

        for change in &self.changes {
            let lo = change.offset.max(offset);
            let hi = change.end().min(end);
            if lo < hi {
                out[lo - offset..hi - offset]
                    .copy_from_slice(&change.bytes[lo - change.offset..hi - change.offset]);
            }
        }

        Some(out)
    }
}

///
/// LogDeltaCodec
///
/// Positioned encoding whose writes go through a `WalChanges` tracker instead
/// of the page itself, so only the delta is logged. Reads see the page through
/// the same tracker.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct LogDeltaCodec;

impl LogDeltaCodec {
    pub fn size(key: &CompositeKey) -> Result<usize, InternalError> {
        Ok(component::key_size(key, CODEC)?)
    }

    /// Record the encoding of `key` at `offset`; returns bytes written.
    pub fn write<W: WalChanges>(
        key: &CompositeKey,
        page: &[u8],
        changes: &mut W,
        offset: usize,
    ) -> Result<usize, InternalError> {
        let size = component::key_size(key, CODEC)?;

        let available = page.len().saturating_sub(offset);
        if available < size {
            return Err(CodecError::BufferTooSmall {
                codec: CODEC,
                needed: size,
                available,
            }
            .into());
        }

        let mut sink = WalSink {
            page,
            changes,
            offset,
        };
        component::encode_key(key, size, &mut sink, CODEC)?;

        sink::record(MetricsEvent::KeyEncoded {
            codec: CODEC,
            bytes: size as u64,
        });

        Ok(size)
    }

    /// Decode the key at `offset` as seen through `changes`.
    pub fn read<W: WalChanges>(
        page: &[u8],
        changes: &W,
        offset: usize,
    ) -> Result<(CompositeKey, usize), InternalError> {
        let mut source = WalSource {
            page,
            changes,
            start: offset,
            cursor: offset,
        };
        let result = component::decode_key(&mut source)
            .map(|key| (key, source.position()))
            .map_err(InternalError::from);

        sink::record_decode(CODEC, &result);
        result
    }
}

struct WalSink<'a, W: WalChanges> {
    page: &'a [u8],
    changes: &'a mut W,
    offset: usize,
}

impl<W: WalChanges> KeySink for WalSink<'_, W> {
    fn put(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        let end = self.offset + bytes.len();
        if end > self.page.len() {
            return Err(CodecError::BufferTooSmall {
                codec: CODEC,
                needed: end,
                available: self.page.len(),
            });
        }

        self.changes.set_binary_value(self.page, bytes, self.offset);
        self.offset = end;

        Ok(())
    }
}

struct WalSource<'a, W: WalChanges> {
    page: &'a [u8],
    changes: &'a W,
    start: usize,
    cursor: usize,
}

impl<W: WalChanges> KeySource for WalSource<'_, W> {
    fn codec(&self) -> CodecKind {
        CODEC
    }

    fn position(&self) -> usize {
        self.cursor - self.start
    }

    fn take(&mut self, out: &mut [u8]) -> Result<(), CodecError> {
        let bytes = self
            .changes
            .binary_value(self.page, self.cursor, out.len())
            .filter(|bytes| bytes.len() == out.len())
            .ok_or_else(|| self.truncated())?;

        out.copy_from_slice(&bytes);
        self.cursor += out.len();

        Ok(())
    }
}
