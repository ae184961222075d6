//! XMP XML/RDF serializer
//!
//! This module serializes XMP properties into RDF/XML packets. Output is
//! deterministic: prefixes appear in first-seen order and properties keep
//! their insertion order within each prefix.

use crate::core::error::{MetaError, MetaResult};
use crate::core::namespace::{ns, resolve_uri, NamespaceMap};
use crate::core::packet::{packet_header, packet_trailer, PACKET_ID};
use crate::types::key::QualifiedName;
use crate::types::lang_alt::LangAlt;
use crate::types::value::{Value, XmpStruct};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

/// Options controlling packet output
#[derive(Debug, Clone)]
pub struct SerializeOptions {
    /// Wrap output in `<?xpacket ...?>` header and trailer
    pub header: bool,
    /// Spaces per indentation level (0 = no line breaks)
    pub indent: usize,
    /// Packet id written into the header
    pub packet_id: String,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            header: true,
            indent: 2,
            packet_id: PACKET_ID.to_string(),
        }
    }
}

impl SerializeOptions {
    /// Create default options (header on, two-space indent)
    pub fn new() -> Self {
        Self::default()
    }

    /// Omit the packet header and trailer
    pub fn no_header(mut self) -> Self {
        self.header = false;
        self
    }

    /// Set the indentation width
    pub fn indent(mut self, spaces: usize) -> Self {
        self.indent = spaces;
        self
    }

    /// Emit everything on one line
    pub fn compact(self) -> Self {
        self.indent(0)
    }

    /// Use a custom packet id in the header
    pub fn packet_id(mut self, id: impl Into<String>) -> Self {
        self.packet_id = id.into();
        self
    }
}

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Serializer for XMP packets
#[derive(Debug, Clone, Default)]
pub struct XmpSerializer {
    options: SerializeOptions,
}

impl XmpSerializer {
    /// Create a serializer with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a serializer with the given options
    pub fn with_options(options: SerializeOptions) -> Self {
        Self { options }
    }

    /// Serialize properties into packet text
    ///
    /// Every prefix used by a property (or a struct field) must resolve
    /// through `bindings` or the built-in namespaces.
    pub fn serialize<'a, I>(&self, properties: I, bindings: &NamespaceMap) -> MetaResult<String>
    where
        I: IntoIterator<Item = (&'a QualifiedName, &'a Value)>,
    {
        let properties: Vec<(&QualifiedName, &Value)> = properties.into_iter().collect();

        // Group by prefix in first-seen order, insertion order inside a group
        let mut prefixes: Vec<&str> = Vec::new();
        for (name, _) in &properties {
            if !prefixes.contains(&name.prefix.as_str()) {
                prefixes.push(&name.prefix);
            }
        }

        let mut declared: Vec<&str> = Vec::new();
        for (name, value) in &properties {
            collect_prefixes(name, value, &mut declared);
        }

        let mut desc_start = BytesStart::new("rdf:Description");
        desc_start.push_attribute(("rdf:about", ""));
        for prefix in &declared {
            if *prefix == ns::XML_PREFIX {
                continue;
            }
            let uri = resolve_uri(bindings, prefix).ok_or_else(|| {
                MetaError::Serialization(format!("Unbound namespace prefix '{}'", prefix))
            })?;
            desc_start.push_attribute((format!("xmlns:{}", prefix).as_str(), uri));
        }

        let mut writer = if self.options.indent > 0 {
            Writer::new_with_indent(Cursor::new(Vec::new()), b' ', self.options.indent)
        } else {
            Writer::new(Cursor::new(Vec::new()))
        };

        let mut meta_start = BytesStart::new("x:xmpmeta");
        meta_start.push_attribute(("xmlns:x", ns::X));
        writer.write_event(Event::Start(meta_start))?;

        let mut rdf_start = BytesStart::new("rdf:RDF");
        rdf_start.push_attribute(("xmlns:rdf", ns::RDF));
        writer.write_event(Event::Start(rdf_start))?;

        if properties.is_empty() {
            writer.write_event(Event::Empty(desc_start))?;
        } else {
            writer.write_event(Event::Start(desc_start))?;
            for prefix in &prefixes {
                for (name, value) in properties.iter().filter(|(n, _)| n.prefix == *prefix) {
                    write_property(&mut writer, name, value)?;
                }
            }
            writer.write_event(Event::End(BytesEnd::new("rdf:Description")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("rdf:RDF")))?;
        writer.write_event(Event::End(BytesEnd::new("x:xmpmeta")))?;

        let body = String::from_utf8(writer.into_inner().into_inner())
            .map_err(|e| MetaError::Serialization(format!("UTF-8 encoding error: {}", e)))?;

        if !self.options.header {
            return Ok(body);
        }
        Ok(format!(
            "{}\n{}\n{}",
            packet_header(&self.options.packet_id),
            body,
            packet_trailer()
        ))
    }
}

/// Record prefixes in first-seen order, descending into struct fields
fn collect_prefixes<'a>(name: &'a QualifiedName, value: &'a Value, out: &mut Vec<&'a str>) {
    if !out.contains(&name.prefix.as_str()) {
        out.push(&name.prefix);
    }
    match value {
        Value::Struct(st) => {
            for (field, field_value) in st.fields() {
                collect_prefixes(field, field_value, out);
            }
        }
        Value::OrderedList(items) | Value::UnorderedSet(items) => {
            for item in items {
                if let Value::Struct(st) = item {
                    for (field, field_value) in st.fields() {
                        collect_prefixes(field, field_value, out);
                    }
                }
            }
        }
        Value::Scalar(_) | Value::LangAlt(_) => {}
    }
}

fn write_property(writer: &mut XmlWriter, name: &QualifiedName, value: &Value) -> MetaResult<()> {
    let elem_name = name.to_string();
    match value {
        Value::Scalar(scalar) => {
            writer.write_event(Event::Start(BytesStart::new(elem_name.as_str())))?;
            writer.write_event(Event::Text(BytesText::new(&scalar.lexical())))?;
            writer.write_event(Event::End(BytesEnd::new(elem_name.as_str())))?;
        }
        Value::OrderedList(items) => write_container(writer, &elem_name, "rdf:Seq", items)?,
        Value::UnorderedSet(items) => write_container(writer, &elem_name, "rdf:Bag", items)?,
        Value::LangAlt(alt) => write_lang_alt(writer, &elem_name, alt)?,
        Value::Struct(st) => {
            writer.write_event(Event::Start(BytesStart::new(elem_name.as_str())))?;
            write_struct(writer, st)?;
            writer.write_event(Event::End(BytesEnd::new(elem_name.as_str())))?;
        }
    }
    Ok(())
}

fn write_container(
    writer: &mut XmlWriter,
    elem_name: &str,
    container_name: &str,
    items: &[Value],
) -> MetaResult<()> {
    writer.write_event(Event::Start(BytesStart::new(elem_name)))?;
    writer.write_event(Event::Start(BytesStart::new(container_name)))?;
    for item in items {
        writer.write_event(Event::Start(BytesStart::new("rdf:li")))?;
        match item {
            Value::Scalar(scalar) => {
                writer.write_event(Event::Text(BytesText::new(&scalar.lexical())))?;
            }
            Value::Struct(st) => write_struct(writer, st)?,
            other => {
                return Err(MetaError::Serialization(format!(
                    "{} cannot hold a nested {}",
                    container_name,
                    other.shape()
                )))
            }
        }
        writer.write_event(Event::End(BytesEnd::new("rdf:li")))?;
    }
    writer.write_event(Event::End(BytesEnd::new(container_name)))?;
    writer.write_event(Event::End(BytesEnd::new(elem_name)))?;
    Ok(())
}

fn write_lang_alt(writer: &mut XmlWriter, elem_name: &str, alt: &LangAlt) -> MetaResult<()> {
    writer.write_event(Event::Start(BytesStart::new(elem_name)))?;
    writer.write_event(Event::Start(BytesStart::new("rdf:Alt")))?;
    for (lang, text) in alt.iter() {
        let mut li_start = BytesStart::new("rdf:li");
        li_start.push_attribute(("xml:lang", lang));
        writer.write_event(Event::Start(li_start))?;
        writer.write_event(Event::Text(BytesText::new(text)))?;
        writer.write_event(Event::End(BytesEnd::new("rdf:li")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("rdf:Alt")))?;
    writer.write_event(Event::End(BytesEnd::new(elem_name)))?;
    Ok(())
}

/// Structs are written as a nested `rdf:Description`
fn write_struct(writer: &mut XmlWriter, st: &XmpStruct) -> MetaResult<()> {
    if st.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new("rdf:Description")))?;
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new("rdf:Description")))?;
    for (field, value) in st.fields() {
        write_property(writer, field, value)?;
    }
    writer.write_event(Event::End(BytesEnd::new("rdf:Description")))?;
    Ok(())
}
