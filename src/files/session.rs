//! Metadata sessions
//!
//! A [`MetadataSession`] loads every schema of one media file into a
//! [`MetadataStore`], lets the caller edit it and writes it back on
//! [`commit`](MetadataSession::commit). Nothing reaches the backend until
//! the write policy has accepted the whole store.

use crate::core::error::{MetaError, MetaResult};
use crate::core::metadata::MetadataStore;
use crate::core::parser::{ParseOptions, XmpParser};
use crate::core::serializer::SerializeOptions;
use crate::files::handler::{MetadataBackend, SessionOptions};
use crate::files::policy::WritePolicy;
use crate::files::registry::FileFormat;
use crate::ingest::{AdapterSkip, ExifAdapter, IngestAdapter, IptcAdapter, RawTree};
use crate::types::key::{Key, Namespace};
use crate::types::value::Value;
use log::{debug, warn};

/// An open metadata session on one media file
#[derive(Debug)]
pub struct MetadataSession<B: MetadataBackend> {
    backend: B,
    format: FileFormat,
    options: SessionOptions,
    policy: WritePolicy,
    store: MetadataStore,
    /// Store as last loaded or committed
    original: MetadataStore,
    diagnostics: Vec<AdapterSkip>,
}

impl<B: MetadataBackend> MetadataSession<B> {
    /// Open a session for update
    pub fn open(backend: B, format: FileFormat) -> MetaResult<Self> {
        Self::open_with(backend, format, SessionOptions::default().for_update())
    }

    /// Open a session with custom options
    ///
    /// EXIF and IPTC trees go through the ingest adapters and the XMP packet
    /// through the codec. A malformed packet is treated as "no XMP" unless
    /// [`SessionOptions::strict_xmp`] is set.
    pub fn open_with(mut backend: B, format: FileFormat, options: SessionOptions) -> MetaResult<Self> {
        let mut store = MetadataStore::new();
        let mut diagnostics = Vec::new();

        if !options.only_xmp {
            let exif = backend.read_raw(Namespace::Exif)?;
            diagnostics.extend(ExifAdapter::new().ingest(&exif).apply_to(&mut store));
            let iptc = backend.read_raw(Namespace::Iptc)?;
            diagnostics.extend(IptcAdapter::new().ingest(&iptc).apply_to(&mut store));
        }

        if let Some(text) = backend.read_xmp_packet()? {
            let mut parse_options = ParseOptions::new();
            if options.strict_packet {
                parse_options = parse_options.strict_packet();
            }
            match XmpParser::with_options(parse_options).parse(&text) {
                Ok(packet) => {
                    let xmp = MetadataStore::from_xmp_packet(packet);
                    store.merge(&xmp, Namespace::Xmp, true)?;
                }
                Err(e) if e.is_recoverable() && !options.strict_xmp => {
                    warn!("Ignoring XMP packet of {} file: {}", format, e);
                }
                Err(e) => return Err(e),
            }
        }

        debug!(
            "Opened {} session: {} EXIF, {} IPTC, {} XMP entries",
            format,
            store.count(Namespace::Exif),
            store.count(Namespace::Iptc),
            store.count(Namespace::Xmp)
        );

        Ok(Self {
            backend,
            format,
            options,
            policy: WritePolicy::default_table().clone(),
            original: store.clone(),
            store,
            diagnostics,
        })
    }

    /// Replace the write policy used by `commit`
    pub fn with_policy(mut self, policy: WritePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Get a value from the working store
    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.store.get(key)
    }

    /// Set a value; see [`MetadataStore::set`]
    pub fn set(&mut self, key: Key, value: impl Into<Value>) -> MetaResult<()> {
        self.store.set(key, value)
    }

    /// Delete a value; no-op if absent
    pub fn delete(&mut self, key: &Key) -> Option<Value> {
        self.store.delete(key)
    }

    /// The working store
    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    /// Mutable access to the working store (merge, namespace registration)
    pub fn store_mut(&mut self) -> &mut MetadataStore {
        &mut self.store
    }

    /// Format the session was opened with
    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// Tags the adapters dropped or kept raw while loading
    pub fn diagnostics(&self) -> &[AdapterSkip] {
        &self.diagnostics
    }

    /// Check whether the store differs from what was loaded or committed
    pub fn is_dirty(&self) -> bool {
        self.store != self.original
    }

    /// Write changed namespaces back
    ///
    /// The whole store is checked against the write policy first, and every
    /// payload is built before the backend is called, so a rejected commit
    /// makes no external call. Fails with [`MetaError::BadParam`] if the
    /// session is read-only.
    pub fn commit(&mut self) -> MetaResult<()> {
        if !self.is_dirty() {
            debug!("Nothing to commit for {} file", self.format);
            return Ok(());
        }
        if !self.options.for_update {
            return Err(MetaError::BadParam(
                "Session was not opened for update".to_string(),
            ));
        }

        self.policy.validate_for_write(&self.store, self.format)?;

        let mut raw_trees = Vec::new();
        for namespace in [Namespace::Exif, Namespace::Iptc] {
            if self.changed(namespace) {
                raw_trees.push((namespace, RawTree::from_partition(&self.store, namespace)?));
            }
        }
        let packet = if self.changed(Namespace::Xmp) {
            Some(self.store.to_xmp(&SerializeOptions::new())?)
        } else {
            None
        };

        for (namespace, tree) in &raw_trees {
            debug!("Writing {} {} tags", tree.len(), namespace);
            self.backend.write_raw(*namespace, tree)?;
        }
        if let Some(packet) = packet {
            debug!("Writing XMP packet ({} bytes)", packet.len());
            self.backend.write_xmp_packet(&packet)?;
        }

        self.original = self.store.clone();
        Ok(())
    }

    /// Drop every change since the last load or commit
    pub fn discard(&mut self) {
        self.store = self.original.clone();
    }

    /// Close the session and hand the backend back
    pub fn into_backend(self) -> B {
        self.backend
    }

    fn changed(&self, namespace: Namespace) -> bool {
        !self
            .store
            .partition(namespace)
            .eq(self.original.partition(namespace))
    }
}

/// Run `f` inside a session
///
/// Changes are committed when `f` returns `Ok` and discarded when it returns
/// `Err`; the error from `f` is passed through unchanged.
pub fn with_session<B, T, F>(backend: B, format: FileFormat, f: F) -> MetaResult<T>
where
    B: MetadataBackend,
    F: FnOnce(&mut MetadataSession<B>) -> MetaResult<T>,
{
    let mut session = MetadataSession::open(backend, format)?;
    match f(&mut session) {
        Ok(result) => {
            session.commit()?;
            Ok(result)
        }
        Err(e) => {
            session.discard();
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{RawValue, SkipKind};

    #[derive(Debug, Default)]
    struct MemoryBackend {
        exif: RawTree,
        iptc: RawTree,
        xmp: Option<String>,
        raw_writes: Vec<(Namespace, RawTree)>,
        xmp_writes: Vec<String>,
    }

    impl MetadataBackend for MemoryBackend {
        fn read_raw(&mut self, namespace: Namespace) -> MetaResult<RawTree> {
            Ok(match namespace {
                Namespace::Exif => self.exif.clone(),
                Namespace::Iptc => self.iptc.clone(),
                Namespace::Xmp => RawTree::new(),
            })
        }

        fn read_xmp_packet(&mut self) -> MetaResult<Option<String>> {
            Ok(self.xmp.clone())
        }

        fn write_raw(&mut self, namespace: Namespace, tree: &RawTree) -> MetaResult<()> {
            self.raw_writes.push((namespace, tree.clone()));
            Ok(())
        }

        fn write_xmp_packet(&mut self, packet: &str) -> MetaResult<()> {
            self.xmp_writes.push(packet.to_string());
            Ok(())
        }
    }

    fn backend() -> MemoryBackend {
        MemoryBackend {
            exif: RawTree::new()
                .with("Make", "Canon")
                .with("DateTimeOriginal", "not-a-date"),
            iptc: RawTree::new().with("Keywords", vec!["fruit"]),
            xmp: Some(
                r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
                <rdf:Description rdf:about="" xmlns:dc="http://purl.org/dc/elements/1.1/" dc:format="image/jpeg"/>
                </rdf:RDF></x:xmpmeta>"#
                    .to_string(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn test_open_loads_all_namespaces() {
        let session = MetadataSession::open(backend(), FileFormat::Jpeg).unwrap();
        assert_eq!(session.get(&Key::exif("Make")), Some(&Value::text("Canon")));
        assert_eq!(
            session.get(&Key::iptc("Keywords")),
            Some(&Value::unordered(["fruit"]))
        );
        assert_eq!(
            session.get(&Key::xmp("dc", "format")),
            Some(&Value::text("image/jpeg"))
        );
        assert_eq!(session.diagnostics().len(), 1);
        assert_eq!(session.diagnostics()[0].kind, SkipKind::KeptRaw);
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_only_xmp() {
        let session =
            MetadataSession::open_with(backend(), FileFormat::Jpeg, SessionOptions::default().only_xmp())
                .unwrap();
        assert_eq!(session.store().count(Namespace::Exif), 0);
        assert_eq!(session.store().count(Namespace::Xmp), 1);
    }

    #[test]
    fn test_malformed_xmp_treated_as_absent() {
        let mut b = backend();
        b.xmp = Some("<x:xmpmeta><rdf:RDF>".to_string());
        let session = MetadataSession::open(&mut b, FileFormat::Jpeg).unwrap();
        assert_eq!(session.store().count(Namespace::Xmp), 0);
        assert_eq!(session.store().count(Namespace::Exif), 2);
        drop(session);

        let strict = SessionOptions::default().strict_xmp();
        assert!(matches!(
            MetadataSession::open_with(&mut b, FileFormat::Jpeg, strict),
            Err(MetaError::MalformedXmp(_))
        ));
    }

    #[test]
    fn test_commit_writes_changed_namespaces_only() {
        let mut b = backend();
        let mut session = MetadataSession::open(&mut b, FileFormat::Jpeg).unwrap();
        session.set(Key::iptc("City"), "Paris").unwrap();
        assert!(session.is_dirty());
        session.commit().unwrap();
        assert!(!session.is_dirty());
        drop(session);

        assert_eq!(b.raw_writes.len(), 1);
        assert_eq!(b.raw_writes[0].0, Namespace::Iptc);
        assert_eq!(b.raw_writes[0].1.get("City"), Some(&RawValue::from("Paris")));
        assert!(b.xmp_writes.is_empty());
    }

    #[test]
    fn test_commit_rejected_makes_no_call() {
        let mut b = backend();
        let mut session = MetadataSession::open(&mut b, FileFormat::Cr2).unwrap();
        session.set(Key::xmp("dc", "title"), Value::lang_alt("t")).unwrap();
        assert!(matches!(
            session.commit(),
            Err(MetaError::UnsupportedWrite { .. })
        ));
        drop(session);
        assert!(b.raw_writes.is_empty());
        assert!(b.xmp_writes.is_empty());
    }

    #[test]
    fn test_read_only_session() {
        let mut session =
            MetadataSession::open_with(backend(), FileFormat::Jpeg, SessionOptions::default()).unwrap();
        session.set(Key::exif("Model"), "R5").unwrap();
        assert!(matches!(session.commit(), Err(MetaError::BadParam(_))));
    }

    #[test]
    fn test_discard() {
        let mut session = MetadataSession::open(backend(), FileFormat::Jpeg).unwrap();
        session.delete(&Key::exif("Make"));
        session.discard();
        assert_eq!(session.get(&Key::exif("Make")), Some(&Value::text("Canon")));
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_with_session() {
        let mut b = backend();
        let title = with_session(&mut b, FileFormat::Jpeg, |session| {
            session.set(Key::xmp("dc", "title"), Value::lang_alt("Pears"))?;
            Ok("done")
        })
        .unwrap();
        assert_eq!(title, "done");
        assert_eq!(b.xmp_writes.len(), 1);
        assert!(b.xmp_writes[0].contains("Pears"));

        let result: MetaResult<()> = with_session(&mut b, FileFormat::Jpeg, |session| {
            session.set(Key::exif("Model"), "R5")?;
            Err(MetaError::BadParam("abort".to_string()))
        });
        assert!(result.is_err());
        assert!(b.raw_writes.is_empty());
    }
}
