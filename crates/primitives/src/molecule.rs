//! Molecule encoding
//!
//! The ledger serializes every structure with molecule, a little-endian,
//! offset-based binary format. Only the composite shapes needed by cells and
//! transactions are implemented here:
//!
//! ```text
//! fixvec  | item_count: u32 | item | item | ...
//! dynvec  | total_size: u32 | offset: u32 ... | item | item | ...
//! table   | total_size: u32 | offset: u32 ... | field | field | ...
//! option  | (empty) or the inner value
//! ```
//!
//! Structs (fixed-size records) are plain concatenations and need no helper.

use byteorder::{ByteOrder, LittleEndian};
use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Size of a molecule header word.
pub const NUMBER_SIZE: usize = 4;

/// Errors from decoding molecule data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoleculeError {
    /// Input ended before the header or a declared item.
    #[error("molecule data truncated: need {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes required by the header.
        expected: usize,
        /// Bytes available.
        actual: usize,
    },

    /// Declared total size disagrees with the input length.
    #[error("molecule total size mismatch: header says {declared}, got {actual}")]
    TotalSizeMismatch {
        /// Size recorded in the header.
        declared: usize,
        /// Actual input size.
        actual: usize,
    },

    /// Offsets are not monotonically increasing or point outside the data.
    #[error("molecule offsets out of order")]
    OffsetOutOfOrder,

    /// A table carries a different number of fields than its schema.
    #[error("molecule field count mismatch: expected {expected}, got {actual}")]
    FieldCount {
        /// Fields in the schema.
        expected: usize,
        /// Fields present.
        actual: usize,
    },

    /// A byte-sized enum holds an undefined value.
    #[error("invalid enum value: {0}")]
    InvalidEnumValue(u8),

    /// A fixed-size value has the wrong length.
    #[error("molecule item size mismatch: expected {expected}, got {actual}")]
    ItemSize {
        /// Expected size.
        expected: usize,
        /// Actual size.
        actual: usize,
    },
}

/// Encode a `Bytes` value (a `fixvec<byte>`).
pub fn bytes(data: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(NUMBER_SIZE + data.len());
    buf.put_u32_le(data.len() as u32);
    buf.put_slice(data);
    buf.freeze()
}

/// Encode a `fixvec` of already-serialized fixed-size items.
pub fn fixvec<I: AsRef<[u8]>>(items: &[I]) -> Bytes {
    let body: usize = items.iter().map(|item| item.as_ref().len()).sum();
    let mut buf = BytesMut::with_capacity(NUMBER_SIZE + body);
    buf.put_u32_le(items.len() as u32);
    for item in items {
        buf.put_slice(item.as_ref());
    }
    buf.freeze()
}

/// Encode a `dynvec` of already-serialized items.
pub fn dynvec<I: AsRef<[u8]>>(items: &[I]) -> Bytes {
    offset_encoded(items)
}

/// Encode a table from its already-serialized fields, in schema order.
pub fn table<I: AsRef<[u8]>>(fields: &[I]) -> Bytes {
    offset_encoded(fields)
}

/// Size of a table with the given field sizes, without building it.
pub fn table_size(field_sizes: &[usize]) -> usize {
    NUMBER_SIZE * (1 + field_sizes.len()) + field_sizes.iter().sum::<usize>()
}

fn offset_encoded<I: AsRef<[u8]>>(items: &[I]) -> Bytes {
    let header_size = NUMBER_SIZE * (1 + items.len());
    let body: usize = items.iter().map(|item| item.as_ref().len()).sum();
    let total = header_size + body;

    let mut buf = BytesMut::with_capacity(total);
    buf.put_u32_le(total as u32);

    let mut offset = header_size;
    for item in items {
        buf.put_u32_le(offset as u32);
        offset += item.as_ref().len();
    }
    for item in items {
        buf.put_slice(item.as_ref());
    }
    buf.freeze()
}

/// Encode an optional value: empty when absent.
pub fn option(value: Option<&[u8]>) -> Bytes {
    value.map(Bytes::copy_from_slice).unwrap_or_default()
}

/// Read a little-endian header word at `offset`.
fn read_number(data: &[u8], offset: usize) -> Result<usize, MoleculeError> {
    let end = offset + NUMBER_SIZE;
    if data.len() < end {
        return Err(MoleculeError::Truncated {
            expected: end,
            actual: data.len(),
        });
    }
    Ok(LittleEndian::read_u32(&data[offset..end]) as usize)
}

/// Decode a `Bytes` value, returning the raw payload.
pub fn read_bytes(data: &[u8]) -> Result<&[u8], MoleculeError> {
    let len = read_number(data, 0)?;
    let declared = NUMBER_SIZE + len;
    if data.len() != declared {
        return Err(MoleculeError::TotalSizeMismatch {
            declared,
            actual: data.len(),
        });
    }
    Ok(&data[NUMBER_SIZE..])
}

/// Split offset-encoded data (a table or dynvec) into its items.
pub fn read_items(data: &[u8]) -> Result<Vec<&[u8]>, MoleculeError> {
    let total = read_number(data, 0)?;
    if total != data.len() {
        return Err(MoleculeError::TotalSizeMismatch {
            declared: total,
            actual: data.len(),
        });
    }
    if total == NUMBER_SIZE {
        return Ok(Vec::new());
    }

    let first = read_number(data, NUMBER_SIZE)?;
    if first % NUMBER_SIZE != 0 || first < NUMBER_SIZE * 2 || first > total {
        return Err(MoleculeError::OffsetOutOfOrder);
    }
    let count = first / NUMBER_SIZE - 1;

    let mut offsets = Vec::with_capacity(count + 1);
    for i in 0..count {
        offsets.push(read_number(data, NUMBER_SIZE * (1 + i))?);
    }
    offsets.push(total);

    let mut items = Vec::with_capacity(count);
    for window in offsets.windows(2) {
        let (start, end) = (window[0], window[1]);
        if start > end || end > total {
            return Err(MoleculeError::OffsetOutOfOrder);
        }
        items.push(&data[start..end]);
    }
    Ok(items)
}

/// Split a table into exactly `expected` fields.
pub fn read_table(data: &[u8], expected: usize) -> Result<Vec<&[u8]>, MoleculeError> {
    let fields = read_items(data)?;
    if fields.len() != expected {
        return Err(MoleculeError::FieldCount {
            expected,
            actual: fields.len(),
        });
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_encoding() {
        assert_eq!(bytes(&[]).as_ref(), &[0, 0, 0, 0]);
        assert_eq!(bytes(&[0xab, 0xcd]).as_ref(), &[2, 0, 0, 0, 0xab, 0xcd]);
    }

    #[test]
    fn test_empty_dynvec() {
        let empty: [&[u8]; 0] = [];
        assert_eq!(dynvec(&empty).as_ref(), &[4, 0, 0, 0]);
    }

    #[test]
    fn test_table_layout() {
        let encoded = table(&[&[1u8][..], &[2, 3][..]]);
        assert_eq!(
            encoded.as_ref(),
            &[15, 0, 0, 0, 12, 0, 0, 0, 13, 0, 0, 0, 1, 2, 3]
        );
        assert_eq!(table_size(&[1, 2]), encoded.len());
    }

    #[test]
    fn test_read_table() {
        let encoded = table(&[bytes(b"video/mp4"), bytes(&[7; 32]), Bytes::new()]);
        let fields = read_table(&encoded, 3).unwrap();

        assert_eq!(read_bytes(fields[0]).unwrap(), b"video/mp4");
        assert_eq!(read_bytes(fields[1]).unwrap(), &[7; 32]);
        assert!(fields[2].is_empty());
    }

    #[test]
    fn test_read_table_wrong_field_count() {
        let encoded = table(&[bytes(b"a")]);
        assert!(matches!(
            read_table(&encoded, 2),
            Err(MoleculeError::FieldCount {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_read_truncated() {
        assert!(matches!(
            read_items(&[8, 0]),
            Err(MoleculeError::Truncated { .. })
        ));
        assert!(matches!(
            read_bytes(&[5, 0, 0, 0, 1]),
            Err(MoleculeError::TotalSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_fixvec() {
        let encoded = fixvec(&[[1u8, 2], [3, 4]]);
        assert_eq!(encoded.as_ref(), &[2, 0, 0, 0, 1, 2, 3, 4]);
    }
}
