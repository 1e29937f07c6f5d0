//! Flushes the emitter's in-memory text buffer to the attached byte sink,
//! transcoding to UTF-16 when that encoding was requested.

use crate::emitter::Emitter;
use crate::{Encoding, WriterError};

impl Emitter<'_> {
    pub(crate) fn flush(&mut self) -> Result<(), WriterError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        if matches!(self.encoding, Encoding::Utf8 | Encoding::Any) {
            let to_emit = self.buffer.as_bytes();
            self.write_handler
                .as_mut()
                .expect("emitter output not set")
                .write_all(to_emit)?;
            self.buffer.clear();
            return Ok(());
        }

        let big_endian = matches!(self.encoding, Encoding::Utf16Be);
        for ch in self.buffer.encode_utf16() {
            let bytes = if big_endian {
                ch.to_be_bytes()
            } else {
                ch.to_le_bytes()
            };
            self.raw_buffer.extend(bytes);
        }

        let to_emit = self.raw_buffer.as_slice();
        self.write_handler
            .as_mut()
            .expect("emitter output not set")
            .write_all(to_emit)?;
        self.buffer.clear();
        self.raw_buffer.clear();
        Ok(())
    }
}
