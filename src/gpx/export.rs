//! GPX export: render selected caches, their owners, attributes and
//! logs into a document with computed geographic bounds.

use anyhow::{Context, Result};
use chrono::Local;
use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::{bool_text, GPX_NS, GS_NS, XSI_NS};
use crate::store::{CacheView, GeocacheDb, LogView, WaypointView};

const CREATOR: &str = "gpx-to-sqlite, all rights reserved";
const DOC_NAME: &str = "Cache Listing Generated by gpx-to-sqlite";
const DOC_DESC: &str = "This is an individual list of geocaches generated by gpx-to-sqlite.";
const DOC_AUTHOR: &str = "gpx-to-sqlite";
const DOC_EMAIL: &str = "gpx-to-sqlite@example.org";
const DOC_URL: &str = "https://github.com/yourusername/gpx-to-sqlite";
const DOC_URLNAME: &str = "Geocache listings, exported";
const DOC_KEYWORD: &str = "cache, geocache";

/// Caller-selected content of one export
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Cache ids to export, in order
    pub list: Vec<i64>,
    /// Upper bound on logs written per cache; 0 omits the logs block
    pub max_logs: usize,
    /// Also emit satellite waypoints sharing a cache's GC code
    pub waypoints: bool,
}

/// Running lat/lon extrema over every waypoint written so far
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub minlat: f64,
    pub maxlat: f64,
    pub minlon: f64,
    pub maxlon: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        // sentinel extrema, narrowed by the first waypoint
        Self {
            minlat: 1000.0,
            maxlat: -1000.0,
            minlon: 1000.0,
            maxlon: -1000.0,
        }
    }
}

impl Bounds {
    pub fn update(&mut self, lat: f64, lon: f64) {
        self.minlat = self.minlat.min(lat);
        self.maxlat = self.maxlat.max(lat);
        self.minlon = self.minlon.min(lon);
        self.maxlon = self.maxlon.max(lon);
    }
}

/// One element of the output document. The tree is accumulated while
/// encoding and serialized in a single pass at the end, once the bounds
/// placeholder can be filled from the final accumulator state.
#[derive(Debug)]
struct XmlNode {
    name: &'static str,
    attrs: Vec<(&'static str, String)>,
    text: Option<String>,
    children: Vec<XmlNode>,
}

impl XmlNode {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    fn leaf(name: &'static str, text: Option<String>) -> Self {
        Self {
            text,
            ..Self::new(name)
        }
    }

    fn set_attr(&mut self, name: &'static str, value: impl Into<String>) {
        self.attrs.push((name, value.into()));
    }

    fn child(&mut self, node: XmlNode) {
        self.children.push(node);
    }
}

/// Export the selected caches as a GPX document.
///
/// Returns the serialized bytes; any cache id in the list that does not
/// exist in the store is a not-found error.
pub fn export_gpx(db: &GeocacheDb, options: &ExportOptions) -> Result<Vec<u8>> {
    let mut bounds = Bounds::default();

    let mut root = XmlNode::new("gpx");
    root.set_attr("xmlns", GPX_NS);
    root.set_attr("xmlns:xsi", XSI_NS);
    root.set_attr("version", "1.0");
    root.set_attr("creator", CREATOR);
    root.set_attr(
        "xsi:schemaLocation",
        format!("{0} {0}/gpx.xsd {1} {1}/cache.xsd", GPX_NS, GS_NS),
    );

    root.child(XmlNode::leaf("name", Some(DOC_NAME.to_string())));
    root.child(XmlNode::leaf("desc", Some(DOC_DESC.to_string())));
    root.child(XmlNode::leaf("author", Some(DOC_AUTHOR.to_string())));
    root.child(XmlNode::leaf("email", Some(DOC_EMAIL.to_string())));
    root.child(XmlNode::leaf("url", Some(DOC_URL.to_string())));
    root.child(XmlNode::leaf("urlname", Some(DOC_URLNAME.to_string())));
    root.child(XmlNode::leaf(
        "time",
        Some(Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()),
    ));
    root.child(XmlNode::leaf("keyword", Some(DOC_KEYWORD.to_string())));

    let bounds_index = root.children.len();
    root.child(XmlNode::new("bounds"));

    for id in &options.list {
        geocache_to_xml(db, &mut root, *id, options, &mut bounds)?;
    }

    // fill the placeholder now that every waypoint has been seen
    if let Some(node) = root.children.get_mut(bounds_index) {
        node.set_attr("minlat", bounds.minlat.to_string());
        node.set_attr("minlon", bounds.minlon.to_string());
        node.set_attr("maxlat", bounds.maxlat.to_string());
        node.set_attr("maxlon", bounds.maxlon.to_string());
    }

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_node(&mut writer, &root)?;
    Ok(writer.into_inner())
}

fn geocache_to_xml(
    db: &GeocacheDb,
    parent: &mut XmlNode,
    id: i64,
    options: &ExportOptions,
    bounds: &mut Bounds,
) -> Result<()> {
    let cache = db
        .cache_view(id)?
        .with_context(|| format!("Cache {} not found", id))?;
    let wpt = db
        .primary_waypoint(id)?
        .with_context(|| format!("Cache {} has no primary waypoint", id))?;

    let mut wpt_node = wpt_to_xml(&wpt, bounds);
    wpt_node.child(cache_to_xml(db, &cache, options)?);
    parent.child(wpt_node);

    if options.waypoints {
        // satellite waypoints share the primary waypoint's name as their
        // GC code but carry no cache extension of their own
        if let Some(name) = &wpt.name {
            for satellite in db.waypoints_by_gc_code(name)? {
                if satellite.cache_id.is_none() {
                    parent.child(wpt_to_xml(&satellite, bounds));
                }
            }
        }
    }

    Ok(())
}

fn wpt_to_xml(wpt: &WaypointView, bounds: &mut Bounds) -> XmlNode {
    bounds.update(wpt.lat, wpt.lon);

    let mut node = XmlNode::new("wpt");
    node.set_attr("lat", wpt.lat.to_string());
    node.set_attr("lon", wpt.lon.to_string());
    node.child(XmlNode::leaf("time", wpt.time.clone()));
    node.child(XmlNode::leaf("name", wpt.name.clone()));
    node.child(XmlNode::leaf("cmt", wpt.cmt.clone()));
    node.child(XmlNode::leaf("desc", wpt.descr.clone()));
    node.child(XmlNode::leaf("url", wpt.url.clone()));
    node.child(XmlNode::leaf("urlname", wpt.urlname.clone()));
    node.child(XmlNode::leaf("sym", wpt.sym.clone()));
    node.child(XmlNode::leaf("type", wpt.type_name.clone()));
    node
}

fn cache_to_xml(db: &GeocacheDb, cache: &CacheView, options: &ExportOptions) -> Result<XmlNode> {
    let mut node = XmlNode::new("groundspeak:cache");
    node.set_attr("xmlns:groundspeak", GS_NS);
    node.set_attr("id", cache.id.to_string());
    node.set_attr("available", bool_text(cache.available));
    node.set_attr("archived", bool_text(cache.archived));

    node.child(XmlNode::leaf("groundspeak:name", cache.name.clone()));
    node.child(XmlNode::leaf(
        "groundspeak:placed_by",
        cache.placed_by.clone(),
    ));

    let mut owner = XmlNode::leaf("groundspeak:owner", cache.owner.clone());
    if let Some(owner_id) = cache.owner_id {
        owner.set_attr("id", owner_id.to_string());
    }
    node.child(owner);

    node.child(XmlNode::leaf("groundspeak:type", cache.type_name.clone()));
    node.child(XmlNode::leaf(
        "groundspeak:container",
        cache.container.clone(),
    ));

    let attributes = db.attributes_for_cache(cache.id)?;
    if !attributes.is_empty() {
        let mut block = XmlNode::new("groundspeak:attributes");
        for attribute in attributes {
            let mut attr_node = XmlNode::leaf("groundspeak:attribute", attribute.name);
            attr_node.set_attr("id", attribute.gc_id.to_string());
            attr_node.set_attr("inc", if attribute.inc { "1" } else { "0" });
            block.child(attr_node);
        }
        node.child(block);
    }

    node.child(XmlNode::leaf(
        "groundspeak:difficulty",
        cache.difficulty.map(rating_text),
    ));
    node.child(XmlNode::leaf(
        "groundspeak:terrain",
        cache.terrain.map(rating_text),
    ));
    node.child(XmlNode::leaf("groundspeak:country", cache.country.clone()));
    node.child(XmlNode::leaf("groundspeak:state", cache.state.clone()));

    let mut short = XmlNode::leaf(
        "groundspeak:short_description",
        cache.short_desc.clone(),
    );
    short.set_attr("html", bool_text(cache.short_html));
    node.child(short);

    let mut long = XmlNode::leaf("groundspeak:long_description", cache.long_desc.clone());
    long.set_attr("html", bool_text(cache.long_html));
    node.child(long);

    node.child(XmlNode::leaf(
        "groundspeak:encoded_hints",
        cache.encoded_hints.clone(),
    ));

    let mut logs = db.logs_for_cache(cache.id)?;
    if !logs.is_empty() && options.max_logs > 0 {
        // the oldest logs win here, sorted ascending; the import-side
        // last_logs digest keeps the newest instead
        logs.sort_by(|a, b| a.date.cmp(&b.date));
        logs.truncate(options.max_logs);

        let mut block = XmlNode::new("groundspeak:logs");
        for log in &logs {
            block.child(log_to_xml(log));
        }
        node.child(block);
    }

    Ok(node)
}

fn log_to_xml(log: &LogView) -> XmlNode {
    let mut node = XmlNode::new("groundspeak:log");
    node.set_attr("id", log.id.to_string());
    node.child(XmlNode::leaf("groundspeak:date", log.date.clone()));
    node.child(XmlNode::leaf("groundspeak:type", log.type_name.clone()));

    let mut finder = XmlNode::leaf("groundspeak:finder", log.finder.clone());
    if let Some(finder_id) = log.finder_id {
        finder.set_attr("id", finder_id.to_string());
    }
    node.child(finder);

    let mut text = XmlNode::leaf("groundspeak:text", log.text.clone());
    text.set_attr("encoded", bool_text(log.text_encoded));
    node.child(text);

    node
}

/// Render a difficulty or terrain rating, dropping a trailing ".0"
/// ("2.0" becomes "2", "2.5" stays as is)
fn rating_text(value: f64) -> String {
    let text = format!("{:.1}", value);
    match text.strip_suffix(".0") {
        Some(trimmed) => trimmed.to_string(),
        None => text,
    }
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<()> {
    let mut start = BytesStart::new(node.name);
    for (name, value) in &node.attrs {
        start.push_attribute((*name, value.as_str()));
    }

    if node.text.is_none() && node.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    let end = start.to_end().into_owned();
    writer.write_event(Event::Start(start))?;
    if let Some(text) = &node.text {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in &node.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(end))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_track_the_tightest_rectangle() {
        let mut bounds = Bounds::default();
        bounds.update(10.0, 20.0);
        bounds.update(5.0, 25.0);
        bounds.update(15.0, 18.0);
        assert_eq!(
            bounds,
            Bounds {
                minlat: 5.0,
                maxlat: 15.0,
                minlon: 18.0,
                maxlon: 25.0,
            }
        );
    }

    #[test]
    fn test_rating_text_trims_the_trailing_zero() {
        assert_eq!(rating_text(2.0), "2");
        assert_eq!(rating_text(2.5), "2.5");
        assert_eq!(rating_text(4.0), "4");
    }

    #[test]
    fn test_write_node_escapes_content() {
        let mut node = XmlNode::leaf("name", Some("Rock & Roll".to_string()));
        node.set_attr("id", "1".to_string());

        let mut writer = Writer::new(Vec::new());
        write_node(&mut writer, &node).unwrap();
        let xml = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(xml, r#"<name id="1">Rock &amp; Roll</name>"#);
    }

    #[test]
    fn test_write_node_collapses_empty_elements() {
        let node = XmlNode::new("cmt");
        let mut writer = Writer::new(Vec::new());
        write_node(&mut writer, &node).unwrap();
        assert_eq!(writer.into_inner(), b"<cmt/>");
    }
}
