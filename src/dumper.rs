//! Writes one or more composed [`Document`]s to an [`Emitter`], the
//! output-side mirror of [`Loader`](crate::Loader): open the stream once,
//! dump each document, close the stream.

use crate::{Document, DumpError, Emitter, Encoding, Event, Representer, RepresenterOptions};

/// A writer over a stream of zero or more YAML documents.
///
/// Call [`Dumper::open`] once, [`Dumper::dump`] per document, and
/// [`Dumper::close`] to finish the stream. [`Document::dump`] is a
/// single-document convenience that drives all three in one call.
#[non_exhaustive]
pub struct Dumper {
    representer: Representer,
}

impl Default for Dumper {
    fn default() -> Self {
        Self::new()
    }
}

impl Dumper {
    /// A dumper with default representation options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(RepresenterOptions::default())
    }

    #[must_use]
    pub fn with_options(options: RepresenterOptions) -> Self {
        Dumper {
            representer: Representer::with_options(options),
        }
    }

    /// Emit `STREAM-START`, unless `emitter` has already been opened.
    ///
    /// This function should be called before [`Dumper::dump`].
    pub fn open(&self, emitter: &mut Emitter) -> Result<(), DumpError> {
        if !emitter.is_opened() {
            emitter.emit(Event::stream_start(Encoding::Utf8))?;
        }
        Ok(())
    }

    /// Emit `STREAM-END`, unless `emitter` is unopened or already closed.
    ///
    /// This function should be called after the last [`Dumper::dump`].
    pub fn close(&self, emitter: &mut Emitter) -> Result<(), DumpError> {
        if emitter.is_opened() && !emitter.is_closed() {
            emitter.emit(Event::stream_end())?;
        }
        Ok(())
    }

    /// Represent and emit one document. Opens the stream first if
    /// needed, but does not close it, so further documents can follow.
    pub fn dump(&self, emitter: &mut Emitter, document: &Document) -> Result<(), DumpError> {
        self.open(emitter)?;
        if document.root().is_some() {
            for event in self.representer.represent_document(document) {
                emitter.emit(event)?;
            }
        }
        Ok(())
    }

    /// Open, dump, and close in one call: a complete single-document
    /// stream.
    pub fn dump_one(&self, emitter: &mut Emitter, document: &Document) -> Result<(), DumpError> {
        self.dump(emitter, document)?;
        self.close(emitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Document, Parser};

    #[test]
    fn dumps_a_single_document_round_trip() {
        let mut input: &[u8] = b"key: value\n";
        let mut parser = Parser::new();
        parser.set_input(&mut input);
        let document = Document::load(&mut parser).unwrap();

        let mut output = Vec::new();
        let mut emitter = Emitter::new();
        emitter.set_output(&mut output);
        document.dump(&mut emitter).unwrap();

        assert_eq!(std::str::from_utf8(&output).unwrap(), "key: value\n");
    }

    #[test]
    fn dumper_writes_several_documents_to_one_stream() {
        let mut first_input: &[u8] = b"a: 1\n";
        let mut parser = Parser::new();
        parser.set_input(&mut first_input);
        let first = Document::load(&mut parser).unwrap();

        let mut second_input: &[u8] = b"b: 2\n";
        let mut parser = Parser::new();
        parser.set_input(&mut second_input);
        let second = Document::load(&mut parser).unwrap();

        let mut output = Vec::new();
        let mut emitter = Emitter::new();
        emitter.set_output(&mut output);
        let dumper = Dumper::new();
        dumper.open(&mut emitter).unwrap();
        dumper.dump(&mut emitter, &first).unwrap();
        dumper.dump(&mut emitter, &second).unwrap();
        dumper.close(&mut emitter).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("a: 1"));
        assert!(text.contains("b: 2"));
    }
}
