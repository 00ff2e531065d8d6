//! Segments
//!
//! A file is stored on the ledger as an ordered run of fixed-size segments,
//! each in its own cell. The cell data of a segment is its position followed
//! by the raw payload, with no other framing:
//!
//! ```text
//! | index: u8 | payload ... |
//! ```
//!
//! Because the index is a single byte, a file may be split into at most
//! [`MAX_SEGMENTS`] segments. [`Segmenter::new`] rejects inputs that would
//! need more before producing anything.
//!
//! ## Example Usage
//!
//! ```
//! use spore_primitives::segment::Segmenter;
//!
//! let segmenter = Segmenter::new(vec![0u8; 250], 100).unwrap();
//! let lengths: Vec<usize> = segmenter.iter().map(|s| s.encoded_len()).collect();
//! assert_eq!(lengths, [101, 101, 51]);
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Maximum number of segments a single asset can be split into.
pub const MAX_SEGMENTS: usize = u8::MAX as usize + 1;

/// Size of the index prefix in an encoded segment.
pub const SEGMENT_INDEX_SIZE: usize = 1;

/// Errors from splitting or decoding segments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SegmentError {
    /// The segment size was zero.
    #[error("segment size must be positive")]
    ZeroSegmentSize,

    /// The input would need more segments than the index byte can address.
    #[error("input of {len} bytes needs {count} segments of {segment_size} bytes, maximum is {max}")]
    TooManySegments {
        /// Input length.
        len: usize,
        /// Requested segment size.
        segment_size: usize,
        /// Segments required.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// Encoded segment data was empty, so it has no index byte.
    #[error("encoded segment is empty")]
    Empty,

    /// Reassembly found a segment out of position.
    #[error("segment out of order: expected index {expected}, got {actual}")]
    OutOfOrder {
        /// Index expected at this position.
        expected: usize,
        /// Index found.
        actual: u8,
    },
}

/// One indexed piece of a source buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    index: u8,
    payload: Bytes,
}

impl Segment {
    /// Create a segment.
    pub fn new(index: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            index,
            payload: payload.into(),
        }
    }

    /// Zero-based position of this segment.
    #[inline]
    pub const fn index(&self) -> u8 {
        self.index
    }

    /// The raw payload.
    #[inline]
    pub const fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Length of the ledger encoding.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        SEGMENT_INDEX_SIZE + self.payload.len()
    }

    /// Ledger encoding: index byte followed by the payload.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_u8(self.index);
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    /// Decode a segment from cell data.
    pub fn decode(data: impl Into<Bytes>) -> Result<Self, SegmentError> {
        let mut data: Bytes = data.into();
        if data.is_empty() {
            return Err(SegmentError::Empty);
        }
        let index = data.split_to(SEGMENT_INDEX_SIZE)[0];
        Ok(Self {
            index,
            payload: data,
        })
    }
}

/// Deterministic splitter of a buffer into indexed segments.
///
/// Cloning a `Segmenter` is cheap (the buffer is reference counted) and
/// [`iter`](Self::iter) can be called any number of times, each call
/// producing the same sequence from the start.
#[derive(Debug, Clone)]
pub struct Segmenter {
    buffer: Bytes,
    segment_size: usize,
    count: usize,
}

impl Segmenter {
    /// Prepare to split `buffer` into segments of `segment_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::ZeroSegmentSize`] for a zero size and
    /// [`SegmentError::TooManySegments`] if more than [`MAX_SEGMENTS`]
    /// segments would be required.
    pub fn new(buffer: impl Into<Bytes>, segment_size: usize) -> Result<Self, SegmentError> {
        let buffer = buffer.into();
        if segment_size == 0 {
            return Err(SegmentError::ZeroSegmentSize);
        }

        let count = buffer.len().div_ceil(segment_size);
        if count > MAX_SEGMENTS {
            return Err(SegmentError::TooManySegments {
                len: buffer.len(),
                segment_size,
                count,
                max: MAX_SEGMENTS,
            });
        }

        Ok(Self {
            buffer,
            segment_size,
            count,
        })
    }

    /// Number of segments the buffer splits into.
    #[inline]
    pub const fn segment_count(&self) -> usize {
        self.count
    }

    /// Configured segment size.
    #[inline]
    pub const fn segment_size(&self) -> usize {
        self.segment_size
    }

    /// The source buffer.
    #[inline]
    pub const fn buffer(&self) -> &Bytes {
        &self.buffer
    }

    /// The segment at `index`, if within range.
    pub fn get(&self, index: usize) -> Option<Segment> {
        if index >= self.count {
            return None;
        }
        let start = index * self.segment_size;
        let end = usize::min(start + self.segment_size, self.buffer.len());
        Some(Segment {
            // count <= MAX_SEGMENTS, so every valid index fits in a byte
            index: index as u8,
            payload: self.buffer.slice(start..end),
        })
    }

    /// Iterate the segments from the first.
    pub fn iter(&self) -> SegmentIter<'_> {
        SegmentIter {
            segmenter: self,
            next: 0,
        }
    }
}

impl<'a> IntoIterator for &'a Segmenter {
    type Item = Segment;
    type IntoIter = SegmentIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the segments of a [`Segmenter`].
#[derive(Debug, Clone)]
pub struct SegmentIter<'a> {
    segmenter: &'a Segmenter,
    next: usize,
}

impl Iterator for SegmentIter<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Self::Item> {
        let segment = self.segmenter.get(self.next)?;
        self.next += 1;
        Some(segment)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.segmenter.count.saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SegmentIter<'_> {}

/// Concatenate segment payloads back into the original buffer.
///
/// Segments must be supplied in index order starting at zero.
pub fn reassemble<'a, I>(segments: I) -> Result<Bytes, SegmentError>
where
    I: IntoIterator<Item = &'a Segment>,
{
    let mut out = BytesMut::new();
    for (expected, segment) in segments.into_iter().enumerate() {
        if segment.index as usize != expected {
            return Err(SegmentError::OutOfOrder {
                expected,
                actual: segment.index,
            });
        }
        out.put_slice(&segment.payload);
    }
    Ok(out.freeze())
}
