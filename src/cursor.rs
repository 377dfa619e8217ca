// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.
use crate::error::GeometryError;

/// Byte order of a WKB record, selected by the record's leading byte
/// (0 = big endian, 1 = little endian).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Big,
    Little,
}

/// Bounds-checked reader over a WKB buffer
///
/// Fixed-width reads honour the byte order declared by the most recent
/// endian byte; nested records may switch the order mid-buffer. Failed
/// reads report the offset at which the read was attempted.
#[derive(Debug)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    offset: usize,
    order: ByteOrder,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor at the start of a buffer
    ///
    /// The byte order is little endian until the first endian byte is read.
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            offset: 0,
            order: ByteOrder::Little,
        }
    }

    /// Resume reading mid-buffer with a known byte order
    pub fn resume(buf: &'a [u8], offset: usize, order: ByteOrder) -> Self {
        Self { buf, offset, order }
    }

    /// The current position in the buffer
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The byte order currently in effect
    pub fn order(&self) -> ByteOrder {
        self.order
    }

    fn ensure(&self, n: usize) -> Result<(), GeometryError> {
        if self.buf.len().saturating_sub(self.offset) < n {
            return Err(GeometryError::Wkb(format!(
                "buffer too small at offset {}: need {n} bytes",
                self.offset
            )));
        }
        Ok(())
    }

    /// Read an endian byte and switch the cursor to that order
    pub fn read_byte_order(&mut self) -> Result<ByteOrder, GeometryError> {
        self.ensure(1)?;
        let value = self.buf[self.offset];
        self.order = match value {
            0 => ByteOrder::Big,
            1 => ByteOrder::Little,
            other => {
                return Err(GeometryError::Wkb(format!(
                    "first byte of a WKB record must be 0 or 1, got {other} at offset {}",
                    self.offset
                )))
            }
        };
        self.offset += 1;
        Ok(self.order)
    }

    /// Read a 4-byte unsigned integer in the current byte order
    pub fn read_u32(&mut self) -> Result<u32, GeometryError> {
        self.ensure(4)?;
        let off = self.offset;
        let bytes = [
            self.buf[off],
            self.buf[off + 1],
            self.buf[off + 2],
            self.buf[off + 3],
        ];
        self.offset += 4;
        Ok(match self.order {
            ByteOrder::Big => u32::from_be_bytes(bytes),
            ByteOrder::Little => u32::from_le_bytes(bytes),
        })
    }

    /// Read a 4-byte signed integer in the current byte order
    pub fn read_i32(&mut self) -> Result<i32, GeometryError> {
        self.read_u32().map(|value| value as i32)
    }

    /// Read an IEEE-754 double in the current byte order
    pub fn read_f64(&mut self) -> Result<f64, GeometryError> {
        self.ensure(8)?;
        let off = self.offset;
        let bytes = [
            self.buf[off],
            self.buf[off + 1],
            self.buf[off + 2],
            self.buf[off + 3],
            self.buf[off + 4],
            self.buf[off + 5],
            self.buf[off + 6],
            self.buf[off + 7],
        ];
        self.offset += 8;
        Ok(match self.order {
            ByteOrder::Big => f64::from_be_bytes(bytes),
            ByteOrder::Little => f64::from_le_bytes(bytes),
        })
    }
}
