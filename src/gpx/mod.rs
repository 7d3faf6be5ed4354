//! GPX codec: the geocaching dialect layering groundspeak cache
//! extensions over topografix GPX 1.0 waypoints.

pub mod export;
pub mod import;
pub mod tree;

pub use export::{export_gpx, Bounds, ExportOptions};
pub use import::{import_gpx, import_gpx_file, ImportOptions};

pub const GPX_NS: &str = "http://www.topografix.com/GPX/1/0";
pub const GS_NS: &str = "http://www.groundspeak.com/cache/1/0/1";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Derive the GC code from a waypoint name by replacing its
/// two-character prefix ("WP", "PK", ...) with "GC".
///
/// This is a convention of the format, not validated against the name;
/// it lives here so a format change has one place to touch.
pub fn gc_code(name: &str) -> String {
    let tail: String = name.chars().skip(2).collect();
    format!("GC{}", tail)
}

/// The dialect spells booleans as "True"/"False", capitalized
pub(crate) fn bool_text(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Anything but the exact literal "True" reads as false
pub(crate) fn text_bool(text: Option<&str>) -> bool {
    text == Some("True")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gc_code_replaces_the_prefix() {
        assert_eq!(gc_code("WP1234"), "GC1234");
        assert_eq!(gc_code("GC1234"), "GC1234");
        assert_eq!(gc_code("PKABCD"), "GCABCD");
    }

    #[test]
    fn test_gc_code_on_short_names() {
        assert_eq!(gc_code(""), "GC");
        assert_eq!(gc_code("W"), "GC");
        assert_eq!(gc_code("WP"), "GC");
    }

    #[test]
    fn test_bool_literals() {
        assert_eq!(bool_text(true), "True");
        assert_eq!(bool_text(false), "False");
        assert!(text_bool(Some("True")));
        assert!(!text_bool(Some("true")));
        assert!(!text_bool(Some("1")));
        assert!(!text_bool(None));
    }
}
