//! Core module
//!
//! This module contains the metadata store and the XMP packet codec:
//! namespace bindings, parsing, serialization and path lookup.

pub mod error;
pub mod metadata;
pub mod namespace;
pub mod packet;
pub mod parser;
pub mod serializer;
pub mod xpath;

pub use error::{MetaError, MetaResult};
pub use metadata::{FlatDict, FlatValue, MetadataStore};
pub use namespace::{ns, NamespaceMap};
pub use packet::{is_xmp_packet, strip_packet_wrapper, XmpPacket, PACKET_ID};
pub use parser::{ParseOptions, XmpParser};
pub use serializer::{SerializeOptions, XmpSerializer};
pub use xpath::{build_path, parse_path, PathComponent, PathComponents};
