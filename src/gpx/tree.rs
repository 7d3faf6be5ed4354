//! Owned XML element tree, read through quick-xml's namespace-resolving
//! reader. The GPX documents this tool handles are small cache listings,
//! so materializing the tree keeps the codecs free of event bookkeeping.

use anyhow::{anyhow, bail, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use std::io::BufRead;

/// One XML element with namespace-resolved name, attributes, text and children
#[derive(Debug, Clone, Default)]
pub struct Element {
    /// Resolved namespace URI, if the element is in one
    pub ns: Option<String>,
    /// Local name, prefix stripped
    pub name: String,
    /// Attribute local names and unescaped values
    pub attrs: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    /// True if the element has the given namespace URI and local name
    pub fn is(&self, ns: &str, name: &str) -> bool {
        self.ns.as_deref() == Some(ns) && self.name == name
    }

    /// Attribute value by local name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Text content, if any
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// Parse a whole document into its root element
pub fn read_document<R: BufRead>(reader: R) -> Result<Element> {
    let mut xml = NsReader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match xml.read_resolved_event_into(&mut buf)? {
            (ns, Event::Start(start)) => {
                stack.push(element_from_start(ns, &start)?);
            }
            (ns, Event::Empty(start)) => {
                let element = element_from_start(ns, &start)?;
                attach(&mut stack, &mut root, element)?;
            }
            (_, Event::End(_)) => {
                let Some(element) = stack.pop() else {
                    bail!("Unbalanced closing tag");
                };
                attach(&mut stack, &mut root, element)?;
            }
            (_, Event::Text(text)) => {
                if let Some(parent) = stack.last_mut() {
                    append_text(parent, &text.unescape()?);
                }
            }
            (_, Event::CData(cdata)) => {
                if let Some(parent) = stack.last_mut() {
                    append_text(parent, &String::from_utf8(cdata.into_inner().into_owned())?);
                }
            }
            (_, Event::Eof) => break,
            // declaration, comments, processing instructions, doctype
            _ => {}
        }
        buf.clear();
    }

    root.ok_or_else(|| anyhow!("Document has no root element"))
}

fn element_from_start(ns: ResolveResult, start: &BytesStart) -> Result<Element> {
    let ns = match ns {
        ResolveResult::Bound(namespace) => {
            Some(String::from_utf8(namespace.into_inner().to_vec())?)
        }
        _ => None,
    };
    let name = String::from_utf8(start.local_name().into_inner().to_vec())?;

    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8(attr.key.local_name().into_inner().to_vec())?;
        let value = attr.unescape_value()?.into_owned();
        attrs.push((key, value));
    }

    Ok(Element {
        ns,
        name,
        attrs,
        text: None,
        children: Vec::new(),
    })
}

fn attach(stack: &mut Vec<Element>, root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_some() {
                bail!("Document has more than one root element");
            }
            *root = Some(element);
        }
    }
    Ok(())
}

fn append_text(parent: &mut Element, text: &str) {
    match &mut parent.text {
        Some(existing) => existing.push_str(text),
        None => parent.text = Some(text.to_string()),
    }
}
