//! Write policy
//!
//! Not every container can store every metadata schema. The policy table maps
//! each [`FileFormat`] to the namespaces it can take on write-back, and
//! [`WritePolicy::validate_for_write`] refuses a store holding entries the
//! format cannot take before anything is handed to the backend.

use crate::core::error::{MetaError, MetaResult};
use crate::core::metadata::MetadataStore;
use crate::files::registry::{FileFormat, FormatKind};
use crate::types::key::Namespace;
use std::sync::OnceLock;

/// Access level of one namespace for a format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// The namespace can be written back
    Writable,
    /// The namespace can be read but not written
    ReadOnly,
}

/// Per-namespace access for one format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capabilities {
    /// Access to the XMP packet
    pub xmp: Access,
    /// Access to EXIF tags
    pub exif: Access,
    /// Access to IPTC datasets
    pub iptc: Access,
}

impl Capabilities {
    /// Every namespace writable
    pub const WRITABLE: Capabilities = Capabilities {
        xmp: Access::Writable,
        exif: Access::Writable,
        iptc: Access::Writable,
    };

    /// Every namespace read-only
    pub const READ_ONLY: Capabilities = Capabilities {
        xmp: Access::ReadOnly,
        exif: Access::ReadOnly,
        iptc: Access::ReadOnly,
    };

    /// Access level for a namespace
    pub fn access(&self, namespace: Namespace) -> Access {
        match namespace {
            Namespace::Xmp => self.xmp,
            Namespace::Exif => self.exif,
            Namespace::Iptc => self.iptc,
        }
    }

    /// Change the access level for a namespace (builder form)
    pub fn with(mut self, namespace: Namespace, access: Access) -> Self {
        match namespace {
            Namespace::Xmp => self.xmp = access,
            Namespace::Exif => self.exif = access,
            Namespace::Iptc => self.iptc = access,
        }
        self
    }

    /// Check if a namespace is writable
    pub fn can_write(&self, namespace: Namespace) -> bool {
        self.access(namespace) == Access::Writable
    }
}

/// Format to capability table
///
/// Formats missing from the table are treated as read-only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WritePolicy {
    table: Vec<(FileFormat, Capabilities)>,
}

impl WritePolicy {
    /// Create an empty table (everything read-only)
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table
    ///
    /// JPEG, TIFF and HEIC take all three schemas. PNG and WebP carry no
    /// IPTC block and GIF only stores XMP. RAW and video formats are
    /// read-only for every namespace.
    pub fn default_table() -> &'static WritePolicy {
        static DEFAULT: OnceLock<WritePolicy> = OnceLock::new();
        DEFAULT.get_or_init(|| {
            let mut policy = WritePolicy::new()
                .with(FileFormat::Jpeg, Capabilities::WRITABLE)
                .with(FileFormat::Tiff, Capabilities::WRITABLE)
                .with(FileFormat::Heic, Capabilities::WRITABLE)
                .with(
                    FileFormat::Png,
                    Capabilities::WRITABLE.with(Namespace::Iptc, Access::ReadOnly),
                )
                .with(
                    FileFormat::Webp,
                    Capabilities::WRITABLE.with(Namespace::Iptc, Access::ReadOnly),
                )
                .with(
                    FileFormat::Gif,
                    Capabilities::READ_ONLY.with(Namespace::Xmp, Access::Writable),
                );
            for format in FileFormat::ALL {
                if matches!(format.kind(), FormatKind::Raw | FormatKind::Video) {
                    policy = policy.with(format, Capabilities::READ_ONLY);
                }
            }
            policy
        })
    }

    /// Set the capabilities of a format (builder form)
    pub fn with(mut self, format: FileFormat, capabilities: Capabilities) -> Self {
        match self.table.iter_mut().find(|(f, _)| *f == format) {
            Some(entry) => entry.1 = capabilities,
            None => self.table.push((format, capabilities)),
        }
        self
    }

    /// Capabilities of a format
    pub fn capabilities(&self, format: FileFormat) -> Capabilities {
        self.table
            .iter()
            .find(|(f, _)| *f == format)
            .map(|(_, caps)| *caps)
            .unwrap_or(Capabilities::READ_ONLY)
    }

    /// Check whether a namespace can be written to a format
    pub fn can_write(&self, format: FileFormat, namespace: Namespace) -> bool {
        self.capabilities(format).can_write(namespace)
    }

    /// Check a store against the format before write-back
    ///
    /// Fails with [`MetaError::UnsupportedWrite`] naming every namespace that
    /// holds at least one entry but cannot be written. Empty namespaces are
    /// never rejected.
    pub fn validate_for_write(&self, store: &MetadataStore, format: FileFormat) -> MetaResult<()> {
        let capabilities = self.capabilities(format);
        let rejected: Vec<Namespace> = store
            .populated_namespaces()
            .into_iter()
            .filter(|ns| !capabilities.can_write(*ns))
            .collect();

        if rejected.is_empty() {
            Ok(())
        } else {
            Err(MetaError::UnsupportedWrite {
                format: format.name().to_string(),
                rejected,
            })
        }
    }
}

/// Check a namespace against the built-in table
pub fn can_write(format: FileFormat, namespace: Namespace) -> bool {
    WritePolicy::default_table().can_write(format, namespace)
}

/// Check a store against the built-in table
pub fn validate_for_write(store: &MetadataStore, format: FileFormat) -> MetaResult<()> {
    WritePolicy::default_table().validate_for_write(store, format)
}
