//! Decodes a byte stream into Unicode scalar values, auto-detecting the
//! encoding from a byte-order mark when the caller hasn't pinned one down.

use alloc::collections::VecDeque;

use crate::macros::vecdeque_starts_with;
use crate::{Encoding, ReaderError, INPUT_RAW_BUFFER_SIZE};

const BOM_UTF8: &[u8] = b"\xEF\xBB\xBF";
const BOM_UTF16LE: &[u8] = b"\xFF\xFE";
const BOM_UTF16BE: &[u8] = b"\xFE\xFF";

/// Buffers raw bytes from a [`std::io::Read`] source and decodes them into
/// `char`s one grammar-safe unit at a time.
pub(crate) struct Reader<'r> {
    read_handler: Option<&'r mut dyn std::io::Read>,
    eof: bool,
    raw_buffer: VecDeque<u8>,
    pub(crate) buffer: VecDeque<char>,
    pub(crate) encoding: Encoding,
    pub(crate) offset: usize,
}

impl<'r> Reader<'r> {
    pub(crate) fn new() -> Self {
        Reader {
            read_handler: None,
            eof: false,
            raw_buffer: VecDeque::new(),
            buffer: VecDeque::new(),
            encoding: Encoding::Any,
            offset: 0,
        }
    }

    pub(crate) fn set_input(&mut self, read_handler: &'r mut dyn std::io::Read) {
        self.read_handler = Some(read_handler);
    }

    pub(crate) fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = encoding;
    }

    fn error<T>(problem: &'static str, offset: usize, value: i32) -> Result<T, ReaderError> {
        Err(ReaderError::Problem {
            problem,
            offset,
            value,
        })
    }

    fn determine_encoding(&mut self) -> Result<(), ReaderError> {
        while !self.eof && self.raw_buffer.len() < 4 {
            self.update_raw_buffer()?;
        }
        if vecdeque_starts_with(&self.raw_buffer, BOM_UTF16LE) {
            self.encoding = Encoding::Utf16Le;
            self.raw_buffer.drain(0..2);
            self.offset += 2;
        } else if vecdeque_starts_with(&self.raw_buffer, BOM_UTF16BE) {
            self.encoding = Encoding::Utf16Be;
            self.raw_buffer.drain(0..2);
            self.offset += 2;
        } else if vecdeque_starts_with(&self.raw_buffer, BOM_UTF8) {
            self.encoding = Encoding::Utf8;
            self.raw_buffer.drain(0..3);
            self.offset += 3;
        } else {
            self.encoding = Encoding::Utf8;
        }
        Ok(())
    }

    fn update_raw_buffer(&mut self) -> Result<(), ReaderError> {
        if self.raw_buffer.len() >= INPUT_RAW_BUFFER_SIZE || self.eof {
            return Ok(());
        }
        let len_before = self.raw_buffer.len();
        self.raw_buffer.resize(INPUT_RAW_BUFFER_SIZE, 0);
        let contiguous = self.raw_buffer.make_contiguous();
        let write_to = &mut contiguous[len_before..];

        let size_read = self
            .read_handler
            .as_mut()
            .expect("reader input not set")
            .read(write_to)?;

        self.raw_buffer.truncate(len_before + size_read);
        if size_read == 0 {
            self.eof = true;
        }
        Ok(())
    }

    /// Ensure at least `length` decoded characters are buffered (or EOF is
    /// reached), pulling and decoding more raw bytes as needed.
    pub(crate) fn update_buffer(&mut self, length: usize) -> Result<(), ReaderError> {
        if self.eof && self.raw_buffer.is_empty() {
            return Ok(());
        }
        if self.buffer.len() >= length {
            return Ok(());
        }
        if matches!(self.encoding, Encoding::Any) {
            self.determine_encoding()?;
        }

        let mut first = true;
        while self.buffer.len() < length {
            if self.eof && self.raw_buffer.is_empty() {
                return Ok(());
            }
            if !first || self.raw_buffer.is_empty() {
                self.update_raw_buffer()?;
            }
            first = false;
            match self.encoding {
                Encoding::Utf8 | Encoding::Any => self.decode_one_utf8()?,
                Encoding::Utf16Le => self.decode_one_utf16(false)?,
                Encoding::Utf16Be => self.decode_one_utf16(true)?,
            }
        }

        if self.offset >= usize::MAX / 2 {
            return Self::error("input is too long", self.offset, -1);
        }
        Ok(())
    }

    fn push_char(&mut self, ch: char) -> Result<(), ReaderError> {
        if !crate::macros::is_printable(ch) && ch != '\u{feff}' {
            return Self::error("control characters are not allowed", self.offset, ch as i32);
        }
        self.offset += ch.len_utf8();
        self.buffer.push_back(ch);
        Ok(())
    }

    fn decode_one_utf8(&mut self) -> Result<(), ReaderError> {
        let Some(first) = self.raw_buffer.front().copied() else {
            return Ok(());
        };
        let (width, mut value) = utf8_char_width_and_initial_value(first);
        if width == 0 {
            return Self::error("invalid leading UTF-8 octet", self.offset, first as i32);
        }
        if self.raw_buffer.len() < width {
            if self.eof {
                return Self::error("incomplete UTF-8 octet sequence", self.offset, -1);
            }
            return Ok(());
        }
        for (i, trailing) in self.raw_buffer.iter().enumerate().take(width).skip(1) {
            if trailing & 0xc0 != 0x80 {
                return Self::error(
                    "invalid trailing UTF-8 octet",
                    self.offset + i,
                    *trailing as i32,
                );
            }
            value = (value << 6) + (*trailing as u32 & 0x3f);
        }
        let length_ok = width == 1
            || width == 2 && value >= 0x80
            || width == 3 && value >= 0x800
            || width == 4 && value >= 0x10000;
        if !length_ok {
            return Self::error("invalid length of a UTF-8 sequence", self.offset, -1);
        }
        let Some(ch) = char::from_u32(value) else {
            return Self::error("invalid Unicode character", self.offset, value as i32);
        };
        self.raw_buffer.drain(..width);
        self.push_char(ch)
    }

    fn decode_one_utf16(&mut self, big_endian: bool) -> Result<(), ReaderError> {
        if self.raw_buffer.is_empty() {
            return Ok(());
        }
        if self.raw_buffer.len() < 2 {
            if self.eof {
                return Self::error("incomplete UTF-16 character", self.offset, -1);
            }
            return Ok(());
        }
        let read_unit = |buf: &VecDeque<u8>, at: usize| -> u32 {
            let bytes = [buf[at], buf[at + 1]];
            if big_endian {
                u16::from_be_bytes(bytes) as u32
            } else {
                u16::from_le_bytes(bytes) as u32
            }
        };
        let high = read_unit(&self.raw_buffer, 0);
        if high & 0xfc00 == 0xdc00 {
            return Self::error("unexpected low surrogate area", self.offset, high as i32);
        }
        let (width, value) = if high & 0xfc00 == 0xd800 {
            if self.raw_buffer.len() < 4 {
                if self.eof {
                    return Self::error("incomplete UTF-16 surrogate pair", self.offset, -1);
                }
                return Ok(());
            }
            let low = read_unit(&self.raw_buffer, 2);
            if low & 0xfc00 != 0xdc00 {
                return Self::error(
                    "expected low surrogate area",
                    self.offset + 2,
                    low as i32,
                );
            }
            (
                4,
                0x10000 + ((high & 0x3ff) << 10) + (low & 0x3ff),
            )
        } else {
            (2, high)
        };
        let Some(ch) = char::from_u32(value) else {
            return Self::error("invalid Unicode character", self.offset, value as i32);
        };
        self.raw_buffer.drain(..width);
        self.push_char(ch)
    }
}

fn utf8_char_width_and_initial_value(initial: u8) -> (usize, u32) {
    let initial = initial as u32;
    if initial & 0x80 == 0 {
        (1, initial & 0x7f)
    } else if initial & 0xE0 == 0xC0 {
        (2, initial & 0x1f)
    } else if initial & 0xF0 == 0xE0 {
        (3, initial & 0x0f)
    } else if initial & 0xF8 == 0xF0 {
        (4, initial & 0x07)
    } else {
        (0, 0)
    }
}
