//! XMP sidecar I/O
//!
//! A sidecar is a standalone XMP packet stored next to a media file
//! (`photo.jpg` -> `photo.jpg.xmp`). Loading merges the packet onto a store,
//! overwriting keys that are already present; dumping serializes the XMP
//! partition only.

use crate::core::error::MetaResult;
use crate::core::metadata::MetadataStore;
use crate::core::serializer::SerializeOptions;
use crate::types::key::Namespace;
use log::debug;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Merge an XMP packet from text onto `store`
///
/// Fails with [`MalformedXmp`](crate::MetaError::MalformedXmp) without
/// touching the store if the packet does not parse.
pub fn xmp_loads(store: &mut MetadataStore, text: &str) -> MetaResult<()> {
    let loaded = MetadataStore::from_xmp(text)?;
    debug!("Loaded {} XMP properties from sidecar", loaded.count(Namespace::Xmp));
    store.merge(&loaded, Namespace::Xmp, true)
}

/// Merge an XMP packet from a reader onto `store`
///
/// The stream must be UTF-8.
pub fn xmp_load<R: Read>(store: &mut MetadataStore, mut reader: R) -> MetaResult<()> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    xmp_loads(store, &text)
}

/// Serialize the XMP partition of `store`, with or without the packet wrapper
pub fn xmp_dumps(store: &MetadataStore, header: bool) -> MetaResult<String> {
    let mut options = SerializeOptions::new();
    if !header {
        options = options.no_header();
    }
    store.to_xmp(&options)
}

/// Serialize the XMP partition of `store` into a writer
pub fn xmp_dump<W: Write>(store: &MetadataStore, mut writer: W, header: bool) -> MetaResult<()> {
    let text = xmp_dumps(store, header)?;
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Read a sidecar file into a new store
pub fn read_sidecar_file<P: AsRef<Path>>(path: P) -> MetaResult<MetadataStore> {
    let reader = BufReader::new(File::open(path)?);
    let mut store = MetadataStore::new();
    xmp_load(&mut store, reader)?;
    Ok(store)
}

/// Write the XMP partition of `store` to a sidecar file, replacing it
pub fn write_sidecar_file<P: AsRef<Path>>(
    store: &MetadataStore,
    path: P,
    options: &SerializeOptions,
) -> MetaResult<()> {
    let text = store.to_xmp(options)?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Sidecar path for a media file: the full file name plus `.xmp`
pub fn sidecar_path_for<P: AsRef<Path>>(media: P) -> PathBuf {
    let mut name = media.as_ref().as_os_str().to_os_string();
    name.push(".xmp");
    PathBuf::from(name)
}
