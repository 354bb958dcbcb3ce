//! Append-only cursor over a caller-supplied byte region.
//!
//! The builder never grows. Callers size the region up front from an exact
//! or maximum encoded length, and every append checks the remaining room
//! first, returning [`WebPushError::BufferOverflow`] instead of writing a
//! partial value.
//!
//! ```
//! use vapid_push::builder::ByteBuilder;
//!
//! let mut buf = [0u8; 8];
//! let mut builder = ByteBuilder::new(&mut buf);
//! builder.append_str("ab")?.append_int(0x0102u16)?;
//! assert_eq!(builder.result(), b"ab\x01\x02");
//! # Ok::<(), vapid_push::WebPushError>(())
//! ```

use crate::{base64url, Result, WebPushError};

/// Fixed-width integers written in network byte order.
pub trait BigEndian: Copy {
    /// Encoded width in bytes.
    const WIDTH: usize;

    /// Write `self` big-endian into `dst`, which is exactly [`Self::WIDTH`] long.
    fn write_be(self, dst: &mut [u8]);
}

macro_rules! impl_big_endian {
    ($($ty:ty),*) => {
        $(
            impl BigEndian for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                fn write_be(self, dst: &mut [u8]) {
                    dst.copy_from_slice(&self.to_be_bytes());
                }
            }
        )*
    };
}

impl_big_endian!(u8, u16, u32, u64, i8, i16, i32, i64);

/// Bounds-checked writer over a borrowed byte slice.
#[derive(Debug)]
pub struct ByteBuilder<'a> {
    buffer: &'a mut [u8],
    position: usize,
}

impl<'a> ByteBuilder<'a> {
    /// Start writing at the beginning of `buffer`.
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.position
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.position == 0
    }

    /// Bytes still available.
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    /// The written prefix.
    pub fn result(&self) -> &[u8] {
        &self.buffer[..self.position]
    }

    /// Reserve `len` bytes, failing without side effects if they do not fit.
    fn take(&mut self, len: usize) -> Result<&mut [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(WebPushError::BufferOverflow {
                requested: len,
                remaining,
            });
        }
        let start = self.position;
        self.position += len;
        Ok(&mut self.buffer[start..start + len])
    }

    /// Append raw bytes.
    pub fn append(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        self.take(bytes.len())?.copy_from_slice(bytes);
        Ok(self)
    }

    /// Append an integer in big-endian order regardless of host order.
    pub fn append_int<T: BigEndian>(&mut self, value: T) -> Result<&mut Self> {
        value.write_be(self.take(T::WIDTH)?);
        Ok(self)
    }

    /// Append text as UTF-8.
    pub fn append_str(&mut self, text: &str) -> Result<&mut Self> {
        self.append(text.as_bytes())
    }

    /// Append `bytes` re-encoded as unpadded base64url text, in place.
    pub fn append_base64url(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        let dst = self.take(base64url::encoded_len(bytes.len()))?;
        base64url::encode(bytes, dst)?;
        Ok(self)
    }
}
