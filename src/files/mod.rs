//! Media file support
//!
//! Format recognition, the per-format write policy, the backend seam to the
//! OS metadata service, editing sessions and XMP sidecars.

pub mod handler;
pub mod policy;
pub mod registry;
pub mod session;
pub mod sidecar;

pub use handler::{MetadataBackend, SessionOptions};
pub use policy::{can_write, validate_for_write, Access, Capabilities, WritePolicy};
pub use registry::{default_registry, FileFormat, FormatKind, FormatRegistry};
pub use session::{with_session, MetadataSession};
pub use sidecar::{
    read_sidecar_file, sidecar_path_for, write_sidecar_file, xmp_dump, xmp_dumps, xmp_load,
    xmp_loads,
};
