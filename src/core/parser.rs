//! XMP XML/RDF parser
//!
//! This module parses XMP packets into [`XmpPacket`]s. The packet wrapper is
//! optional; the RDF/XML inside is read with quick-xml into a small element
//! tree with namespaces resolved, which is then mapped onto the value model.

use crate::core::error::{MetaError, MetaResult};
use crate::core::namespace::{ns, NamespaceMap};
use crate::core::packet::{is_xmp_packet, strip_packet_wrapper, XmpPacket};
use crate::types::key::QualifiedName;
use crate::types::lang_alt::LangAlt;
use crate::types::value::{Value, XmpStruct};
use log::{debug, warn};
use quick_xml::escape::{resolve_xml_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Options controlling how packets are parsed
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Reject input that lacks the `<?xpacket begin=...?>` header
    pub strict_packet: bool,
}

impl ParseOptions {
    /// Create default options (wrapper optional)
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the packet wrapper
    pub fn strict_packet(mut self) -> Self {
        self.strict_packet = true;
        self
    }
}

/// Parser for XMP packets
#[derive(Debug, Clone, Default)]
pub struct XmpParser {
    options: ParseOptions,
}

impl XmpParser {
    /// Create a new XMP parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with the given options
    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Parse an XMP packet from a string
    ///
    /// Fails with [`MetaError::MalformedXmp`] when the text is not
    /// well-formed XML or holds no `rdf:RDF` element.
    pub fn parse(&self, text: &str) -> MetaResult<XmpPacket> {
        if self.options.strict_packet && !is_xmp_packet(text) {
            return Err(MetaError::MalformedXmp(
                "missing <?xpacket begin=...?> header".to_string(),
            ));
        }

        let body = strip_packet_wrapper(text);
        if body.is_empty() {
            return Err(MetaError::MalformedXmp("empty packet".to_string()));
        }

        let (root, declared) = build_tree(body)?;
        let rdf = find_rdf(&root)
            .ok_or_else(|| MetaError::MalformedXmp("no rdf:RDF element".to_string()))?;

        let mut builder = PacketBuilder {
            declared,
            used: NamespaceMap::new(),
        };
        let mut properties: Vec<(QualifiedName, Value)> = Vec::new();

        for desc in rdf.children.iter().filter(|c| c.is_rdf("Description")) {
            for (name, value) in builder.description_fields(desc)? {
                if properties.iter().any(|(n, _)| *n == name) {
                    debug!("Duplicate XMP property {} ignored; first occurrence wins", name);
                    continue;
                }
                properties.push((name, value));
            }
        }

        Ok(XmpPacket {
            bindings: builder.used,
            properties,
        })
    }
}

/// An element with its name and attributes resolved to namespace URIs
#[derive(Debug)]
struct Element {
    uri: Option<String>,
    local: String,
    attrs: Vec<Attr>,
    children: Vec<Element>,
    text: String,
}

#[derive(Debug)]
struct Attr {
    uri: Option<String>,
    local: String,
    value: String,
}

impl Element {
    fn is(&self, uri: &str, local: &str) -> bool {
        self.uri.as_deref() == Some(uri) && self.local == local
    }

    fn is_rdf(&self, local: &str) -> bool {
        self.is(ns::RDF, local)
    }

    fn attr(&self, uri: &str, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.uri.as_deref() == Some(uri) && a.local == local)
            .map(|a| a.value.as_str())
    }

    /// Attributes that denote properties (not RDF syntax or xml:*)
    fn property_attrs(&self) -> impl Iterator<Item = (&str, &Attr)> {
        self.attrs.iter().filter_map(|a| {
            let uri = a.uri.as_deref()?;
            (uri != ns::RDF && uri != ns::XML).then_some((uri, a))
        })
    }
}

/// Read the XML into an element tree
///
/// Returns the root element and every `(prefix, uri)` declaration in
/// document order.
fn build_tree(xml: &str) -> MetaResult<(Element, Vec<(String, String)>)> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut scopes: Vec<Vec<(String, String)>> =
        vec![vec![(ns::XML_PREFIX.to_string(), ns::XML.to_string())]];
    let mut declared: Vec<(String, String)> = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let element = open_element(&e, &mut scopes, &mut declared)?;
                stack.push(element);
            }
            Ok(Event::Empty(e)) => {
                let element = open_element(&e, &mut scopes, &mut declared)?;
                scopes.pop();
                attach(element, &mut stack, &mut root)?;
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or_else(|| {
                    MetaError::MalformedXmp("unexpected closing tag".to_string())
                })?;
                scopes.pop();
                attach(element, &mut stack, &mut root)?;
            }
            Ok(Event::Text(e)) => {
                let raw_text = String::from_utf8_lossy(e.as_ref());
                let text = match unescape(&raw_text) {
                    Ok(unescaped) => unescaped.to_string(),
                    Err(_) => raw_text.to_string(),
                };
                push_text(&mut stack, &text)?;
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(e.as_ref()).to_string();
                push_text(&mut stack, &text)?;
            }
            Ok(Event::GeneralRef(e)) => {
                let resolved = match e.resolve_char_ref() {
                    Ok(Some(ch)) => ch.to_string(),
                    Ok(None) => {
                        let name = String::from_utf8_lossy(e.as_ref());
                        resolve_xml_entity(&name)
                            .ok_or_else(|| {
                                MetaError::MalformedXmp(format!("unknown entity &{};", name))
                            })?
                            .to_string()
                    }
                    Err(err) => {
                        return Err(MetaError::MalformedXmp(format!(
                            "bad character reference: {}",
                            err
                        )))
                    }
                };
                push_text(&mut stack, &resolved)?;
            }
            Ok(Event::Eof) => break,
            // Declarations, processing instructions, comments and doctypes carry no metadata
            Ok(_) => {}
            Err(e) => {
                return Err(MetaError::MalformedXmp(format!(
                    "XML parsing error at position {}: {}",
                    reader.error_position(),
                    e
                )));
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(MetaError::MalformedXmp(format!(
            "unclosed element <{}>",
            open.local
        )));
    }
    let root = root.ok_or_else(|| MetaError::MalformedXmp("no root element".to_string()))?;
    Ok((root, declared))
}

fn open_element(
    e: &BytesStart<'_>,
    scopes: &mut Vec<Vec<(String, String)>>,
    declared: &mut Vec<(String, String)>,
) -> MetaResult<Element> {
    let mut raw_attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| MetaError::MalformedXmp(format!("bad attribute: {}", err)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        // Decode XML entities in attribute values (e.g., &quot; -> ")
        let raw_value = String::from_utf8_lossy(attr.value.as_ref());
        let value = unescape(&raw_value)
            .map_err(|err| MetaError::MalformedXmp(format!("bad attribute value: {}", err)))?
            .to_string();
        raw_attrs.push((key, value));
    }

    let mut scope = Vec::new();
    for (key, value) in &raw_attrs {
        let prefix = if key == "xmlns" {
            ""
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            prefix
        } else {
            continue;
        };
        scope.push((prefix.to_string(), value.clone()));
        if !prefix.is_empty() && !declared.iter().any(|(p, u)| p == prefix && u == value) {
            declared.push((prefix.to_string(), value.clone()));
        }
    }
    scopes.push(scope);

    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let (uri, local) = resolve_name(&name, scopes, true)?;

    let mut attrs = Vec::new();
    for (key, value) in raw_attrs {
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let (uri, local) = resolve_name(&key, scopes, false)?;
        attrs.push(Attr { uri, local, value });
    }

    Ok(Element {
        uri,
        local,
        attrs,
        children: Vec::new(),
        text: String::new(),
    })
}

/// Resolve `prefix:local` against the scope stack
///
/// Unprefixed elements take the default namespace; unprefixed attributes
/// have none.
fn resolve_name(
    name: &str,
    scopes: &[Vec<(String, String)>],
    is_element: bool,
) -> MetaResult<(Option<String>, String)> {
    let (prefix, local) = match name.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None if is_element => ("", name),
        None => return Ok((None, name.to_string())),
    };
    let uri = scopes
        .iter()
        .rev()
        .flat_map(|scope| scope.iter().rev())
        .find(|(p, _)| p == prefix)
        .map(|(_, u)| u.clone());
    if uri.is_none() && !prefix.is_empty() {
        return Err(MetaError::MalformedXmp(format!(
            "unbound namespace prefix '{}' in <{}>",
            prefix, name
        )));
    }
    Ok((uri, local.to_string()))
}

fn attach(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
) -> MetaResult<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    } else {
        return Err(MetaError::MalformedXmp(
            "multiple root elements".to_string(),
        ));
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) -> MetaResult<()> {
    match stack.last_mut() {
        Some(top) => top.text.push_str(text),
        None if text.trim().is_empty() => {}
        None => {
            return Err(MetaError::MalformedXmp(
                "text outside of the root element".to_string(),
            ))
        }
    }
    Ok(())
}

fn find_rdf(element: &Element) -> Option<&Element> {
    if element.is_rdf("RDF") {
        return Some(element);
    }
    element.children.iter().find_map(find_rdf)
}

/// Maps resolved elements onto property names and values
struct PacketBuilder {
    declared: Vec<(String, String)>,
    used: NamespaceMap,
}

impl PacketBuilder {
    /// Pick the prefix a URI is known by in the parsed packet
    ///
    /// The first prefix the document declares for a URI wins; a URI only
    /// bound as the default namespace falls back to its well-known prefix or
    /// a generated `nsN`.
    fn name_for(&mut self, uri: &str, local: &str) -> MetaResult<QualifiedName> {
        if let Some(prefix) = self.used.get_prefix(uri) {
            return Ok(QualifiedName::new(prefix, local));
        }

        let declared = self
            .declared
            .iter()
            .filter(|(_, u)| u == uri)
            .map(|(p, _)| p.clone());
        let builtin = NamespaceMap::builtin().get_prefix(uri).map(str::to_string);
        let mut prefix = declared
            .chain(builtin)
            .find(|p| !self.used.has_prefix(p));
        if prefix.is_none() {
            prefix = (1..)
                .map(|n| format!("ns{}", n))
                .find(|p| !self.used.has_prefix(p));
        }
        let prefix = prefix.ok_or_else(|| {
            MetaError::MalformedXmp(format!("no prefix available for namespace '{}'", uri))
        })?;

        debug!("Binding XMP prefix '{}' to '{}'", prefix, uri);
        self.used.register(uri, &prefix)?;
        Ok(QualifiedName::new(prefix, local))
    }

    /// Collect the properties of a `Description`-like element
    ///
    /// Property attributes come first, then property elements, each in
    /// document order.
    fn description_fields(&mut self, desc: &Element) -> MetaResult<Vec<(QualifiedName, Value)>> {
        let mut fields = Vec::new();
        for (uri, attr) in desc.property_attrs() {
            let name = self.name_for(uri, &attr.local)?;
            fields.push((name, Value::text(attr.value.clone())));
        }
        for child in &desc.children {
            let Some(uri) = child.uri.as_deref() else {
                warn!("Skipping XMP property <{}> without a namespace", child.local);
                continue;
            };
            let name = self.name_for(uri, &child.local)?;
            if let Some(value) = self.property_value(child)? {
                fields.push((name, value));
            }
        }
        Ok(fields)
    }

    fn struct_value(&mut self, desc: &Element) -> MetaResult<Value> {
        let mut st = XmpStruct::new();
        for (name, value) in self.description_fields(desc)? {
            st.set_field(name, value);
        }
        Ok(Value::Struct(st))
    }

    /// Map a property element to a value
    ///
    /// Returns `None` for properties that were skipped.
    fn property_value(&mut self, element: &Element) -> MetaResult<Option<Value>> {
        if let Some(resource) = element.attr(ns::RDF, "resource") {
            return Ok(Some(Value::text(resource)));
        }
        if element.attr(ns::RDF, "parseType") == Some("Resource") {
            return self.struct_value(element).map(Some);
        }

        let Some(child) = element.children.first() else {
            if element.property_attrs().next().is_some() {
                return self.struct_value(element).map(Some);
            }
            return Ok(Some(Value::text(element.text.clone())));
        };

        if element.children.len() == 1 {
            if child.is_rdf("Bag") {
                return self.items(child).map(|items| Some(Value::UnorderedSet(items)));
            }
            if child.is_rdf("Seq") {
                return self.items(child).map(|items| Some(Value::OrderedList(items)));
            }
            if child.is_rdf("Alt") {
                return self.alternatives(child).map(Some);
            }
            if child.is_rdf("Description") {
                return self.struct_value(child).map(Some);
            }
        }

        if element.children.iter().any(|c| c.uri.as_deref() == Some(ns::RDF)) {
            warn!(
                "Skipping XMP property <{}> with unsupported RDF content",
                element.local
            );
            return Ok(None);
        }
        debug!(
            "XMP property <{}> has bare child properties; reading as struct",
            element.local
        );
        self.struct_value(element).map(Some)
    }

    /// Items of a Bag or Seq (nested containers are skipped)
    fn items(&mut self, container: &Element) -> MetaResult<Vec<Value>> {
        let mut items = Vec::new();
        for li in container.children.iter().filter(|c| c.is_rdf("li")) {
            match self.property_value(li)? {
                Some(item @ (Value::Scalar(_) | Value::Struct(_))) => items.push(item),
                Some(other) => warn!(
                    "Skipping nested {} inside rdf:{}",
                    other.shape(),
                    container.local
                ),
                None => {}
            }
        }
        Ok(items)
    }

    /// An Alt whose items carry `xml:lang` becomes a language alternative
    fn alternatives(&mut self, alt: &Element) -> MetaResult<Value> {
        let lis: Vec<&Element> = alt.children.iter().filter(|c| c.is_rdf("li")).collect();
        let langs: Vec<Option<&str>> = lis.iter().map(|li| li.attr(ns::XML, "lang")).collect();

        if !lis.is_empty() && langs.iter().all(Option::is_some) {
            let entries = lis
                .iter()
                .zip(langs)
                .map(|(li, lang)| (lang.unwrap_or_default(), li.text.as_str()));
            return LangAlt::from_entries(entries).map(Value::LangAlt);
        }

        debug!("rdf:Alt without xml:lang on every item; reading as ordered list");
        self.items(alt).map(Value::OrderedList)
    }
}
