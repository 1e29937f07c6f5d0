//! The pull-style multi-document reader built on [`Parser`] +
//! [`Document`], matching spec §6's external `Loader` interface.

use std::io::Read;

use crate::{Document, LoadError, Parser, Resolver};

/// Tunable behavior for [`Loader`], mirroring the options enumerated in
/// spec §6.
///
/// `known_fields` and `stream_nodes` from that list are not represented
/// here: both only make sense in front of the reflection-based
/// `Constructor` layer that spec §1 places out of scope, and this
/// loader always hands back [`Document`]s (streaming nodes is simply
/// what it does). See DESIGN.md.
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct LoaderOptions {
    /// Accept any number of documents. Informational on [`Loader`]
    /// itself (which always supports pulling further documents); used by
    /// the [`load_all`] convenience to document intent.
    pub all_documents: bool,
    /// Enforce that the stream holds exactly one document: a second
    /// `load` call that finds further content fails with
    /// [`LoadError::MultipleDocuments`] instead of returning it.
    pub single_document: bool,
    /// Skip the "extra document after first" check `single_document`
    /// would otherwise perform, for callers migrating from a tool that
    /// never enforced it.
    pub from_legacy: bool,
    /// Skip comment capture in the scanner, for callers that don't need
    /// `head_comment`/`line_comment`/`foot_comment` on the resulting
    /// nodes and want a faster walk over the input.
    pub skip_comments: bool,
    /// Resolve implicit tags with the YAML 1.1-compatible resolver
    /// ([`Resolver::legacy`]), which additionally recognizes
    /// `yes`/`no`/`on`/`off` as booleans, instead of the YAML 1.2 core
    /// schema ([`Resolver::new`]).
    pub legacy_booleans: bool,
    /// Use the alternate comment-attachment rule: a trailing comment on a
    /// closing block collection attaches to that collection's last child
    /// instead of to the collection itself.
    pub v3_legacy_comments: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        LoaderOptions {
            all_documents: false,
            single_document: false,
            from_legacy: false,
            skip_comments: false,
            legacy_booleans: false,
            v3_legacy_comments: false,
        }
    }
}

/// A pull-style reader over a stream of zero or more YAML documents.
///
/// Wraps a [`Parser`] and repeatedly drives
/// [`Document::load_with_resolver`]; each call to [`Loader::load`]
/// returns the next document, or `None` at end of stream.
#[non_exhaustive]
pub struct Loader<'r> {
    parser: Parser<'r>,
    resolver: Resolver,
    options: LoaderOptions,
    documents_produced: u32,
}

impl<'r> Loader<'r> {
    /// A loader with default options.
    #[must_use]
    pub fn new(read_handler: &'r mut dyn Read) -> Self {
        Self::with_options(read_handler, LoaderOptions::default())
    }

    #[must_use]
    pub fn with_options(read_handler: &'r mut dyn Read, options: LoaderOptions) -> Self {
        let mut parser = Parser::new();
        parser.set_input(read_handler);
        parser.set_skip_comments(options.skip_comments);
        let resolver = if options.legacy_booleans {
            Resolver::legacy()
        } else {
            Resolver::new()
        };
        Loader {
            parser,
            resolver,
            options,
            documents_produced: 0,
        }
    }

    /// Pull the next document. Returns `Ok(None)` once the stream is
    /// exhausted.
    ///
    /// When [`LoaderOptions::single_document`] is set and this call
    /// finds a second document, the call fails with
    /// [`LoadError::MultipleDocuments`] rather than returning it.
    pub fn load(&mut self) -> Result<Option<Document>, LoadError> {
        let document = Document::load_with_options(
            &mut self.parser,
            &self.resolver,
            self.options.v3_legacy_comments,
        )?;
        if document.root().is_none() {
            return Ok(None);
        }
        self.documents_produced += 1;
        if self.options.single_document
            && !self.options.from_legacy
            && self.documents_produced > 1
        {
            return Err(LoadError::MultipleDocuments);
        }
        Ok(Some(document))
    }

    /// Pull every remaining document from the stream.
    pub fn load_all(&mut self) -> Result<Vec<Document>, LoadError> {
        let mut documents = Vec::new();
        while let Some(document) = self.load()? {
            documents.push(document);
        }
        Ok(documents)
    }

    /// Pull exactly one document, failing if the stream holds zero or
    /// more than one. Matches spec §6's `load(bytes, target)` in spirit,
    /// short of the reflection-based `target` construction that stays
    /// out of scope (spec §1); see DESIGN.md.
    pub fn load_single(&mut self) -> Result<Document, LoadError> {
        let first = self.load()?.ok_or(LoadError::NoDocuments)?;
        if self.load()?.is_some() {
            return Err(LoadError::MultipleDocuments);
        }
        Ok(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_single_document() {
        let mut input: &[u8] = b"key: value\n";
        let mut loader = Loader::with_options(
            &mut input,
            LoaderOptions {
                single_document: true,
                ..LoaderOptions::default()
            },
        );
        let document = loader.load_single().unwrap();
        assert!(document.root().is_some());
    }

    #[test]
    fn rejects_zero_documents_in_single_mode() {
        let mut input: &[u8] = b"";
        let mut loader = Loader::with_options(
            &mut input,
            LoaderOptions {
                single_document: true,
                ..LoaderOptions::default()
            },
        );
        let err = loader.load_single().unwrap_err();
        assert!(matches!(err, LoadError::NoDocuments));
    }

    #[test]
    fn rejects_multiple_documents_in_single_mode() {
        let mut input: &[u8] = b"---\na: 1\n---\nb: 2\n";
        let mut loader = Loader::with_options(
            &mut input,
            LoaderOptions {
                single_document: true,
                ..LoaderOptions::default()
            },
        );
        assert!(loader.load().unwrap().is_some());
        let err = loader.load().unwrap_err();
        assert!(matches!(err, LoadError::MultipleDocuments));
    }

    #[test]
    fn load_single_rejects_multiple_documents_with_default_options() {
        let mut input: &[u8] = b"---\na: 1\n---\nb: 2\n";
        let mut loader = Loader::new(&mut input);
        let err = loader.load_single().unwrap_err();
        assert!(matches!(err, LoadError::MultipleDocuments));
    }

    #[test]
    fn loads_all_documents_in_a_stream() {
        let mut input: &[u8] = b"---\na: 1\n---\nb: 2\n";
        let mut loader = Loader::with_options(
            &mut input,
            LoaderOptions {
                all_documents: true,
                ..LoaderOptions::default()
            },
        );
        let documents = loader.load_all().unwrap();
        assert_eq!(documents.len(), 2);
    }

    #[test]
    fn from_legacy_skips_the_multiple_documents_check() {
        let mut input: &[u8] = b"---\na: 1\n---\nb: 2\n";
        let mut loader = Loader::with_options(
            &mut input,
            LoaderOptions {
                single_document: true,
                from_legacy: true,
                ..LoaderOptions::default()
            },
        );
        assert!(loader.load().unwrap().is_some());
        assert!(loader.load().unwrap().is_some());
        assert!(loader.load().unwrap().is_none());
    }
}
