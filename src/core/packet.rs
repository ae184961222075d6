//! XMP packet framing
//!
//! An XMP packet may be wrapped in `<?xpacket begin=...?>` / `<?xpacket end=...?>`
//! processing instructions. This module detects and strips that wrapper and
//! defines the intermediate form the codec exchanges with a metadata store.

use crate::core::namespace::NamespaceMap;
use crate::types::key::QualifiedName;
use crate::types::value::Value;

/// Packet id carried by every standard `xpacket` header
pub const PACKET_ID: &str = "W5M0MpCehiHzreSzNTczkc9d";

/// Byte-order mark placed in the `begin` attribute of the header
pub const PACKET_BOM: char = '\u{feff}';

/// Parsed XMP packet: property triples plus the bindings their prefixes use
///
/// Properties appear in document order. Each prefix is the canonical prefix
/// of its namespace URI within the packet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmpPacket {
    /// Prefix bindings referenced by `properties`
    pub bindings: NamespaceMap,
    /// `(prefix:local, value)` triples
    pub properties: Vec<(QualifiedName, Value)>,
}

impl XmpPacket {
    /// Look up a property by name
    pub fn get(&self, name: &QualifiedName) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

/// Build the standard packet header
pub fn packet_header(id: &str) -> String {
    format!("<?xpacket begin=\"{}\" id=\"{}\"?>", PACKET_BOM, id)
}

/// The standard writable packet trailer
pub fn packet_trailer() -> &'static str {
    "<?xpacket end=\"w\"?>"
}

/// Check whether `text` carries an `xpacket` header
///
/// Accepts both quote styles and a begin marker that is empty, the BOM
/// character, or the BOM spelled as its UTF-8 bytes.
pub fn is_xmp_packet(text: &str) -> bool {
    let text = text.trim_start_matches(PACKET_BOM).trim_start();
    let Some(rest) = text.strip_prefix("<?xpacket") else {
        return false;
    };
    let rest = rest.trim_start();
    let Some(rest) = rest.strip_prefix("begin=") else {
        return false;
    };
    let mut chars = rest.chars();
    let Some(quote @ ('"' | '\'')) = chars.next() else {
        return false;
    };
    let marker: String = chars.take_while(|c| *c != quote).collect();
    matches!(
        marker.as_str(),
        "" | "\u{feff}" | "\u{ef}\u{bb}\u{bf}"
    )
}

/// Strip an optional `xpacket` wrapper, returning the enclosed XML
///
/// The result is trimmed. Input without a wrapper is returned trimmed and
/// otherwise untouched; a header without a matching trailer yields
/// everything after the header.
pub fn strip_packet_wrapper(text: &str) -> &str {
    let Some(start) = text.find("<?xpacket") else {
        return text.trim().trim_start_matches(PACKET_BOM).trim();
    };
    let Some(header_len) = text[start..].find("?>") else {
        return text.trim();
    };
    let body_start = start + header_len + 2;
    let body = &text[body_start..];
    match body.rfind("<?xpacket") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}
