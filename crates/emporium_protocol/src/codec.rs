//! # Wire Codec
//!
//! Primitive encoding shared by every shop packet.
//!
//! | Type     | Encoding                                  |
//! |----------|-------------------------------------------|
//! | `u32`    | unsigned LEB128 varint, at most 5 bytes   |
//! | `u64`    | unsigned LEB128 varint, at most 10 bytes  |
//! | `i32`    | zig-zag, then varint                      |
//! | `String` | varint byte length, then UTF-8 bytes      |
//!
//! Reads never panic: a truncated or malformed buffer reads as `None`.

/// Longest string, in bytes, either side accepts.
pub const MAX_STRING_LEN: usize = 32_767;

/// Growable packet writer.
#[derive(Clone, Debug, Default)]
pub struct WireWriter {
    buffer: Vec<u8>,
}

impl WireWriter {
    /// Creates an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of bytes written.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if no bytes have been written.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns the written bytes.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Consumes the writer, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Writes a varint.
    pub fn write_var_u32(&mut self, value: u32) {
        self.write_var_u64(u64::from(value));
    }

    /// Writes a varint.
    pub fn write_var_u64(&mut self, mut value: u64) {
        loop {
            // low 7 bits
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                self.buffer.push(byte);
                return;
            }
            self.buffer.push(byte | 0x80);
        }
    }

    /// Writes a zig-zag varint.
    pub fn write_var_i32(&mut self, value: i32) {
        let zigzag = ((value << 1) ^ (value >> 31)) as u32;
        self.write_var_u32(zigzag);
    }

    /// Writes a collection length.
    ///
    /// Returns false if `len` does not fit a `u32`.
    pub fn write_len(&mut self, len: usize) -> bool {
        match u32::try_from(len) {
            Ok(len) => {
                self.write_var_u32(len);
                true
            }
            Err(_) => false,
        }
    }

    /// Writes a length-prefixed string.
    ///
    /// Returns false, writing nothing, if the string exceeds
    /// [`MAX_STRING_LEN`] bytes.
    pub fn write_string(&mut self, value: &str) -> bool {
        if value.len() > MAX_STRING_LEN {
            return false;
        }
        if !self.write_len(value.len()) {
            return false;
        }
        self.buffer.extend_from_slice(value.as_bytes());
        true
    }
}

/// Bounds-checked packet reader.
#[derive(Clone, Debug)]
pub struct WireReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> WireReader<'a> {
    /// Creates a reader over `buffer`.
    #[must_use]
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, position: 0 }
    }

    /// Returns the number of bytes remaining.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Option<u8> {
        let value = *self.buffer.get(self.position)?;
        self.position += 1;
        Some(value)
    }

    /// Reads a varint of at most 5 bytes.
    pub fn read_var_u32(&mut self) -> Option<u32> {
        self.read_varint(5).and_then(|v| u32::try_from(v).ok())
    }

    /// Reads a varint of at most 10 bytes.
    pub fn read_var_u64(&mut self) -> Option<u64> {
        self.read_varint(10)
    }

    fn read_varint(&mut self, max_bytes: u32) -> Option<u64> {
        let mut value = 0u64;
        for i in 0..max_bytes {
            let byte = self.read_u8()?;
            let bits = u64::from(byte & 0x7F);
            let shift = 7 * i;
            if shift == 63 && bits > 1 {
                return None;
            }
            value |= bits << shift;
            if byte & 0x80 == 0 {
                return Some(value);
            }
        }
        None
    }

    /// Reads a zig-zag varint.
    pub fn read_var_i32(&mut self) -> Option<i32> {
        let zigzag = self.read_var_u32()?;
        Some(((zigzag >> 1) as i32) ^ -((zigzag & 1) as i32))
    }

    /// Reads a collection length, rejecting any that could not possibly fit
    /// in the remaining bytes at `min_item_size` bytes per item.
    pub fn read_len(&mut self, min_item_size: usize) -> Option<usize> {
        let len = usize::try_from(self.read_var_u32()?).ok()?;
        if len.checked_mul(min_item_size.max(1))? > self.remaining() {
            return None;
        }
        Some(len)
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Option<String> {
        let len = self.read_len(1)?;
        if len > MAX_STRING_LEN {
            return None;
        }
        let bytes = self.buffer.get(self.position..self.position + len)?;
        self.position += len;
        String::from_utf8(bytes.to_vec()).ok()
    }
}
