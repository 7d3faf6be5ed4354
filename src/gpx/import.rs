//! GPX import: decode waypoints, caches, attributes and logs into the
//! store, deduplicating reference values through the resolver.

use anyhow::{bail, Context, Result};
use rusqlite::{params, Transaction};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::tree::{self, Element};
use super::{gc_code, text_bool, GPX_NS, GS_NS};
use crate::model::{Cache, Log, Waypoint};
use crate::store::{execute, GeocacheDb, Resolver};

/// Controls how a document that is not a GPX listing is treated
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Error on unparsable documents or a foreign root element instead
    /// of silently importing nothing.
    pub strict: bool,
}

/// Date and type of one imported log, kept for the last_logs digest
struct LogDigest {
    date: String,
    type_name: String,
}

/// Import a GPX file into the database
pub fn import_gpx_file(db: &mut GeocacheDb, path: &Path, options: ImportOptions) -> Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    import_gpx(db, BufReader::new(file), options)
}

/// Import a GPX document into the database.
///
/// All rows are written inside one transaction committed after the last
/// waypoint, so a failing import leaves the database untouched.
///
/// A document that does not parse, or whose root element is not a GPX
/// `gpx` element, imports nothing and reports success. Receivers of
/// this format rely on that lenient default even though it masks
/// genuine errors; pass `ImportOptions { strict: true }` to surface
/// them instead.
pub fn import_gpx<R: BufRead>(db: &mut GeocacheDb, reader: R, options: ImportOptions) -> Result<()> {
    let root = match tree::read_document(reader) {
        Ok(root) => root,
        Err(err) if options.strict => {
            return Err(err.context("Failed to parse GPX document"));
        }
        Err(_) => return Ok(()),
    };

    if !root.is(GPX_NS, "gpx") {
        if options.strict {
            bail!("Root element is not a GPX <gpx> element");
        }
        return Ok(());
    }

    let tx = db.transaction()?;
    let mut resolver = Resolver::new();

    for node in &root.children {
        if node.is(GPX_NS, "wpt") {
            parse_wpt(&tx, &mut resolver, node)?;
        }
    }

    tx.commit().context("Failed to commit import")?;
    Ok(())
}

fn parse_wpt(tx: &Transaction, resolver: &mut Resolver, node: &Element) -> Result<()> {
    let mut wpt = Waypoint {
        lat: required_f64_attr(node, "lat")?,
        lon: required_f64_attr(node, "lon")?,
        ..Default::default()
    };
    let mut cache = None;

    for child in &node.children {
        if child.is(GPX_NS, "time") {
            wpt.time = owned_text(child);
        } else if child.is(GPX_NS, "name") {
            wpt.name = owned_text(child);
            wpt.gc_code = wpt.name.as_deref().map(gc_code);
        } else if child.is(GPX_NS, "cmt") {
            wpt.cmt = owned_text(child);
        } else if child.is(GPX_NS, "desc") {
            wpt.descr = owned_text(child);
        } else if child.is(GPX_NS, "url") {
            wpt.url = owned_text(child);
        } else if child.is(GPX_NS, "urlname") {
            wpt.urlname = owned_text(child);
        } else if child.is(GPX_NS, "sym") {
            wpt.sym_id = Some(resolver.waypoint_sym(tx, child.text().unwrap_or(""))?);
        } else if child.is(GPX_NS, "type") {
            wpt.type_id = Some(resolver.waypoint_type(tx, child.text().unwrap_or(""))?);
        } else if child.is(GS_NS, "cache") {
            let parsed = parse_cache(tx, resolver, child)?;
            wpt.cache_id = Some(parsed.id);
            cache = Some(parsed);
        }
    }

    if let Some(mut cache) = cache {
        // copy some values from the waypoint, so that join statements
        // can be avoided
        cache.lat = wpt.lat;
        cache.lon = wpt.lon;
        cache.gc_id = wpt.name.clone();
        let (stmt, paras) = cache.insert();
        execute(tx, &stmt, &paras)?;
    }

    let (stmt, paras) = wpt.insert();
    execute(tx, &stmt, &paras)?;
    Ok(())
}

fn parse_cache(tx: &Transaction, resolver: &mut Resolver, node: &Element) -> Result<Cache> {
    let mut cache = Cache {
        id: required_i64_attr(node, "id")?,
        available: text_bool(node.attr("available")),
        archived: text_bool(node.attr("archived")),
        ..Default::default()
    };
    let mut logs = Vec::new();

    for child in &node.children {
        if child.is(GS_NS, "name") {
            cache.name = owned_text(child);
        } else if child.is(GS_NS, "placed_by") {
            cache.placed_by = owned_text(child);
        } else if child.is(GS_NS, "owner") {
            let owner_id = required_i64_attr(child, "id")?;
            cache.owner_id = Some(resolver.cacher(tx, owner_id, child.text())?);
        } else if child.is(GS_NS, "type") {
            cache.type_id = Some(resolver.cache_type(tx, child.text().unwrap_or(""))?);
        } else if child.is(GS_NS, "container") {
            cache.container_id = Some(resolver.cache_container(tx, child.text().unwrap_or(""))?);
        } else if child.is(GS_NS, "difficulty") {
            cache.difficulty = Some(required_f64_text(child)?);
        } else if child.is(GS_NS, "terrain") {
            cache.terrain = Some(required_f64_text(child)?);
        } else if child.is(GS_NS, "country") {
            cache.country_id = Some(resolver.cache_country(tx, child.text().unwrap_or(""))?);
        } else if child.is(GS_NS, "state") {
            cache.state_id = Some(resolver.cache_state(tx, child.text().unwrap_or(""))?);
        } else if child.is(GS_NS, "short_description") {
            cache.short_desc = owned_text(child);
            cache.short_html = text_bool(child.attr("html"));
        } else if child.is(GS_NS, "long_description") {
            cache.long_desc = owned_text(child);
            cache.long_html = text_bool(child.attr("html"));
        } else if child.is(GS_NS, "encoded_hints") {
            cache.encoded_hints = owned_text(child);
        } else if child.is(GS_NS, "attributes") {
            for attr_node in &child.children {
                if attr_node.is(GS_NS, "attribute") {
                    parse_attribute(tx, resolver, attr_node, cache.id)?;
                }
            }
        } else if child.is(GS_NS, "logs") {
            for log_node in &child.children {
                if log_node.is(GS_NS, "log") {
                    logs.push(parse_log(tx, resolver, log_node, cache.id)?);
                }
            }
        }
    }

    // keep the log types of the 5 latest logs as a digest string
    logs.sort_by(|a, b| b.date.cmp(&a.date));
    cache.last_logs = Some(
        logs.iter()
            .take(5)
            .map(|digest| digest.type_name.as_str())
            .collect::<Vec<_>>()
            .join(";"),
    );

    Ok(cache)
}

fn parse_attribute(
    tx: &Transaction,
    resolver: &mut Resolver,
    node: &Element,
    cache_id: i64,
) -> Result<()> {
    let gc_id = required_i64_attr(node, "id")?;
    let inc = node.attr("inc") == Some("1");
    let attribute_id = resolver.attribute(tx, gc_id, inc, node.text())?;

    tx.execute(
        "INSERT INTO cache_to_attribute (cache_id, attribute_id) VALUES (?1, ?2)",
        params![cache_id, attribute_id],
    )
    .context("Failed to link attribute to cache")?;
    Ok(())
}

fn parse_log(
    tx: &Transaction,
    resolver: &mut Resolver,
    node: &Element,
    cache_id: i64,
) -> Result<LogDigest> {
    let mut log = Log {
        id: required_i64_attr(node, "id")?,
        cache_id,
        ..Default::default()
    };
    let mut type_name = String::new();

    for child in &node.children {
        if child.is(GS_NS, "date") {
            log.date = owned_text(child);
        } else if child.is(GS_NS, "type") {
            let name = child.text().unwrap_or("");
            log.type_id = Some(resolver.log_type(tx, name)?);
            type_name = name.to_string();
        } else if child.is(GS_NS, "finder") {
            let finder_id = required_i64_attr(child, "id")?;
            log.finder_id = Some(resolver.cacher(tx, finder_id, child.text())?);
        } else if child.is(GS_NS, "text") {
            log.text = owned_text(child);
            log.text_encoded = text_bool(child.attr("encoded"));
        } else if child.is(GS_NS, "log_wpt") {
            log.lat = Some(required_f64_attr(child, "lat")?);
            log.lon = Some(required_f64_attr(child, "lon")?);
        }
    }

    let (stmt, paras) = log.insert();
    execute(tx, &stmt, &paras)?;

    Ok(LogDigest {
        date: log.date.unwrap_or_default(),
        type_name,
    })
}

fn owned_text(node: &Element) -> Option<String> {
    node.text().map(str::to_string)
}

fn required_f64_attr(node: &Element, name: &str) -> Result<f64> {
    let raw = node
        .attr(name)
        .with_context(|| format!("<{}> is missing the {} attribute", node.name, name))?;
    raw.parse()
        .with_context(|| format!("Invalid {} value: {}", name, raw))
}

fn required_i64_attr(node: &Element, name: &str) -> Result<i64> {
    let raw = node
        .attr(name)
        .with_context(|| format!("<{}> is missing the {} attribute", node.name, name))?;
    raw.parse()
        .with_context(|| format!("Invalid {} value: {}", name, raw))
}

fn required_f64_text(node: &Element) -> Result<f64> {
    let raw = node.text().unwrap_or("");
    raw.parse()
        .with_context(|| format!("Invalid <{}> value: {}", node.name, raw))
}
