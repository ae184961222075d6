//! # metakit
//!
//! A unified EXIF/IPTC/XMP metadata model with a pure Rust XMP packet codec.
//!
//! Metadata from all three schemas lives in one [`MetadataStore`], keyed by
//! namespace-qualified [`Key`]s and holding values of a closed shape
//! ([`Value`]: scalar, ordered list, unordered set, language alternative or
//! struct). XMP packets are parsed into and serialized out of the XMP
//! partition; EXIF and IPTC property trees from the OS metadata service go
//! through the ingest adapters; a per-format [`WritePolicy`] guards every
//! write-back.
//!
//! ## Example
//!
//! ```rust
//! use metakit::{Key, MetadataStore, SerializeOptions, Value};
//!
//! let mut store = MetadataStore::new();
//! store.set(Key::xmp("dc", "description"), Value::lang_alt("A pair of pears on a tree"))?;
//! store.set(Key::xmp("dc", "subject"), Value::unordered(["fruit", "tree"]))?;
//!
//! let packet = store.to_xmp(&SerializeOptions::default())?;
//! let parsed = MetadataStore::from_xmp(&packet)?;
//! assert_eq!(
//!     parsed.get(&Key::xmp("dc", "subject")),
//!     Some(&Value::unordered(["tree", "fruit"]))
//! );
//! # Ok::<(), metakit::MetaError>(())
//! ```
//!
//! ## Features
//!
//! - `serde`: JSON rendering of the flat dictionary export
//!   ([`MetadataStore::to_json`])

pub mod core;
pub mod files;
pub mod ingest;
pub mod types;
pub mod utils;

pub use crate::core::error::{MetaError, MetaResult};
pub use crate::core::metadata::{FlatDict, FlatValue, MetadataStore};
pub use crate::core::namespace::{ns, NamespaceMap};
pub use crate::core::packet::{is_xmp_packet, XmpPacket};
pub use crate::core::parser::{ParseOptions, XmpParser};
pub use crate::core::serializer::{SerializeOptions, XmpSerializer};
pub use files::{
    read_sidecar_file, sidecar_path_for, with_session, write_sidecar_file, xmp_dump, xmp_dumps,
    xmp_load, xmp_loads, FileFormat, FormatRegistry, MetadataBackend, MetadataSession,
    SessionOptions, WritePolicy,
};
pub use ingest::{
    ingest_all, AdapterSkip, ExifAdapter, GpsCoordinate, IngestAdapter, IptcAdapter, RawTree,
    RawValue,
};
pub use types::{Key, LangAlt, Namespace, QualifiedName, Scalar, Value, XmpStruct, X_DEFAULT};
pub use utils::{Iso6709, MetaDateTime};
