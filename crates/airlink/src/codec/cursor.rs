// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Read/write cursors for little-endian wire buffers.

use super::{CodecError, CodecResult};

/// Generate write methods for primitive types.
///
/// Each generated method:
/// 1. Checks buffer bounds (returns `CodecError::WriteFailed` if overflow)
/// 2. Converts value to little-endian bytes via `to_le_bytes()`
/// 3. Copies bytes to buffer
/// 4. Advances offset
macro_rules! impl_write_le {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self, value: $type) -> CodecResult<()> {
            if self.offset + $size > self.buffer.len() {
                return Err(CodecError::WriteFailed {
                    offset: self.offset,
                    reason: "buffer too small".into(),
                });
            }
            let bytes = value.to_le_bytes();
            self.buffer[self.offset..self.offset + $size].copy_from_slice(&bytes);
            self.offset += $size;
            Ok(())
        }
    };
}

/// Generate read methods for primitive types.
///
/// Each generated method:
/// 1. Checks buffer bounds (returns `CodecError::ReadFailed` if overflow)
/// 2. Reads N bytes from buffer
/// 3. Converts bytes to value via `from_le_bytes()`
/// 4. Advances offset
macro_rules! impl_read_le {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> CodecResult<$type> {
            if self.offset + $size > self.buffer.len() {
                return Err(CodecError::ReadFailed {
                    offset: self.offset,
                    reason: "unexpected end of buffer".into(),
                });
            }
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(&self.buffer[self.offset..self.offset + $size]);
            self.offset += $size;
            Ok(<$type>::from_le_bytes(bytes))
        }
    };
}

/// Mutable cursor for writing (bounds-checked, zero-copy)
pub struct CursorMut<'a> {
    buffer: &'a mut [u8],
    offset: usize,
}

impl<'a> CursorMut<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    impl_write_le!(write_u8, u8, 1);
    impl_write_le!(write_u16_le, u16, 2);
    impl_write_le!(write_u32_le, u32, 4);
    impl_write_le!(write_u64_le, u64, 8);
    impl_write_le!(write_i32_le, i32, 4);
    impl_write_le!(write_i64_le, i64, 8);

    pub fn write_f32_le(&mut self, value: f32) -> CodecResult<()> {
        self.write_u32_le(value.to_bits())
    }

    pub fn write_f64_le(&mut self, value: f64) -> CodecResult<()> {
        self.write_u64_le(value.to_bits())
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> CodecResult<()> {
        if self.offset + data.len() > self.buffer.len() {
            return Err(CodecError::WriteFailed {
                offset: self.offset,
                reason: "buffer too small".into(),
            });
        }
        self.buffer[self.offset..self.offset + data.len()].copy_from_slice(data);
        self.offset += data.len();
        Ok(())
    }

    /// Write a UTF-8 string as u32 byte length + bytes (no NUL terminator).
    pub fn write_string(&mut self, value: &str) -> CodecResult<()> {
        let bytes = value.as_bytes();
        if bytes.len() > u32::MAX as usize {
            return Err(CodecError::WriteFailed {
                offset: self.offset,
                reason: "string exceeds u32 length".into(),
            });
        }
        self.write_u32_le(bytes.len() as u32)?;
        self.write_bytes(bytes)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }
}

/// Immutable cursor for reading (bounds-checked, zero-copy)
pub struct Cursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    impl_read_le!(read_u8, u8, 1);
    impl_read_le!(read_u16_le, u16, 2);
    impl_read_le!(read_u32_le, u32, 4);
    impl_read_le!(read_u64_le, u64, 8);
    impl_read_le!(read_i32_le, i32, 4);
    impl_read_le!(read_i64_le, i64, 8);

    pub fn read_f32_le(&mut self) -> CodecResult<f32> {
        Ok(f32::from_bits(self.read_u32_le()?))
    }

    pub fn read_f64_le(&mut self) -> CodecResult<f64> {
        Ok(f64::from_bits(self.read_u64_le()?))
    }

    pub fn read_bytes(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        if self.offset + len > self.buffer.len() {
            return Err(CodecError::ReadFailed {
                offset: self.offset,
                reason: "unexpected end of buffer".into(),
            });
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    /// Read a u32 length-prefixed UTF-8 string written by [`CursorMut::write_string`].
    pub fn read_string(&mut self) -> CodecResult<String> {
        let len = self.read_u32_le()? as usize;
        let start = self.offset;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::ReadFailed {
            offset: start,
            reason: "invalid utf-8 in string".into(),
        })
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_overflow_reports_offset() {
        let mut buffer = [0u8; 2];
        let mut cursor = CursorMut::new(&mut buffer);
        cursor.write_u16_le(0xABCD).expect("write u16 should succeed");

        let err = cursor.write_u8(0xFF).unwrap_err();
        match err {
            CodecError::WriteFailed { offset, reason } => {
                assert_eq!(offset, 2);
                assert_eq!(reason, "buffer too small");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn read_overflow_reports_offset() {
        let buffer = [0u8; 1];
        let mut cursor = Cursor::new(&buffer);
        assert_eq!(cursor.read_u8().expect("read u8 should succeed"), 0);

        let err = cursor.read_u8().unwrap_err();
        match err {
            CodecError::ReadFailed { offset, reason } => {
                assert_eq!(offset, 1);
                assert_eq!(reason, "unexpected end of buffer");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn roundtrip_across_numeric_types() {
        let mut buffer = [0u8; 64];
        let mut writer = CursorMut::new(&mut buffer);
        writer.write_u8(0xAB).expect("write u8");
        writer.write_u16_le(0xCDEF).expect("write u16");
        writer.write_u32_le(0x1234_5678).expect("write u32");
        writer.write_i64_le(-42).expect("write i64");
        writer.write_f32_le(2.5).expect("write f32");
        writer.write_f64_le(std::f64::consts::PI).expect("write f64");
        let written = writer.offset();

        let mut reader = Cursor::new(&buffer[..written]);
        assert_eq!(reader.read_u8().expect("read u8"), 0xAB);
        assert_eq!(reader.read_u16_le().expect("read u16"), 0xCDEF);
        assert_eq!(reader.read_u32_le().expect("read u32"), 0x1234_5678);
        assert_eq!(reader.read_i64_le().expect("read i64"), -42);
        assert_eq!(reader.read_f32_le().expect("read f32"), 2.5);
        assert_eq!(
            reader.read_f64_le().expect("read f64"),
            std::f64::consts::PI
        );
        assert!(reader.is_eof());
    }

    #[test]
    fn string_roundtrip_and_invalid_utf8() {
        let mut buffer = [0u8; 32];
        let mut writer = CursorMut::new(&mut buffer);
        writer.write_string("MissionCommand").expect("write string");
        let written = writer.offset();

        let mut reader = Cursor::new(&buffer[..written]);
        assert_eq!(reader.read_string().expect("read string"), "MissionCommand");

        // Length prefix claiming 2 bytes of invalid UTF-8
        let bad = [2u8, 0, 0, 0, 0xFF, 0xFE];
        let mut reader = Cursor::new(&bad);
        assert!(matches!(
            reader.read_string().unwrap_err(),
            CodecError::ReadFailed { .. }
        ));
    }
}
