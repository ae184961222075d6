//! Metadata backend trait
//!
//! The OS metadata service that actually reads and writes media files sits
//! behind [`MetadataBackend`]. It hands over loosely typed property trees and
//! the raw XMP packet, and takes flat trees back once the write policy has
//! accepted the store.

use crate::core::error::MetaResult;
use crate::ingest::RawTree;
use crate::types::key::Namespace;

/// Options for metadata sessions.
///
/// Use the builder pattern to configure options.
///
/// # Example
///
/// ```rust,no_run
/// use metakit::{FileFormat, MetadataSession, SessionOptions};
/// # fn run(backend: impl metakit::MetadataBackend) -> metakit::MetaResult<()> {
/// let _session = MetadataSession::open_with(
///     backend,
///     FileFormat::Jpeg,
///     SessionOptions::default().for_update().only_xmp(),
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Default, Clone, Copy, Debug)]
pub struct SessionOptions {
    /// Allow `commit` to write back (default: read-only)
    pub for_update: bool,
    /// Only load the XMP packet, skip the EXIF and IPTC trees
    pub only_xmp: bool,
    /// Reject an XMP packet without the `<?xpacket?>` wrapper
    pub strict_packet: bool,
    /// Fail the open on a malformed XMP packet instead of treating it as absent
    pub strict_xmp: bool,
}

impl SessionOptions {
    /// Open for read-only access (default).
    pub fn for_read(mut self) -> Self {
        self.for_update = false;
        self
    }

    /// Open for reading and writing.
    ///
    /// Changes reach the backend only on `commit`.
    pub fn for_update(mut self) -> Self {
        self.for_update = true;
        self
    }

    /// Only the XMP is wanted.
    pub fn only_xmp(mut self) -> Self {
        self.only_xmp = true;
        self
    }

    /// Require the packet wrapper around the XMP.
    pub fn strict_packet(mut self) -> Self {
        self.strict_packet = true;
        self
    }

    /// Surface a malformed XMP packet as an error.
    pub fn strict_xmp(mut self) -> Self {
        self.strict_xmp = true;
        self
    }
}

/// Access to the OS metadata service for one media file
///
/// Implementations return primitives and arrays of primitives only; all
/// shape inspection happens in the ingest adapters.
pub trait MetadataBackend {
    /// Read the raw property tree of the EXIF or IPTC schema
    ///
    /// A schema the file does not carry is an empty tree, not an error.
    fn read_raw(&mut self, namespace: Namespace) -> MetaResult<RawTree>;

    /// Read the embedded XMP packet, if any
    fn read_xmp_packet(&mut self) -> MetaResult<Option<String>>;

    /// Replace the EXIF or IPTC schema with a flat tree
    fn write_raw(&mut self, namespace: Namespace, tree: &RawTree) -> MetaResult<()>;

    /// Replace the embedded XMP packet
    fn write_xmp_packet(&mut self, packet: &str) -> MetaResult<()>;
}

impl<B: MetadataBackend + ?Sized> MetadataBackend for &mut B {
    fn read_raw(&mut self, namespace: Namespace) -> MetaResult<RawTree> {
        (**self).read_raw(namespace)
    }

    fn read_xmp_packet(&mut self) -> MetaResult<Option<String>> {
        (**self).read_xmp_packet()
    }

    fn write_raw(&mut self, namespace: Namespace, tree: &RawTree) -> MetaResult<()> {
        (**self).write_raw(namespace, tree)
    }

    fn write_xmp_packet(&mut self, packet: &str) -> MetaResult<()> {
        (**self).write_xmp_packet(packet)
    }
}

impl<B: MetadataBackend + ?Sized> MetadataBackend for Box<B> {
    fn read_raw(&mut self, namespace: Namespace) -> MetaResult<RawTree> {
        (**self).read_raw(namespace)
    }

    fn read_xmp_packet(&mut self) -> MetaResult<Option<String>> {
        (**self).read_xmp_packet()
    }

    fn write_raw(&mut self, namespace: Namespace, tree: &RawTree) -> MetaResult<()> {
        (**self).write_raw(namespace, tree)
    }

    fn write_xmp_packet(&mut self, packet: &str) -> MetaResult<()> {
        (**self).write_xmp_packet(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = SessionOptions::default();
        assert!(!options.for_update);
        assert!(!options.only_xmp);

        let options = SessionOptions::default()
            .for_update()
            .only_xmp()
            .strict_packet()
            .strict_xmp();
        assert!(options.for_update);
        assert!(options.only_xmp);
        assert!(options.strict_packet);
        assert!(options.strict_xmp);
        assert!(!options.for_read().for_update);
    }
}
