//! Fixture data served by connectors running offline.

use super::types::{BacklogItem, DeprecationRecord, Ticket};
use crate::constants::PYTHON_DEPRECATIONS_URL;

fn section(anchor: &str) -> String {
    format!("{}#{}", PYTHON_DEPRECATIONS_URL, anchor)
}

/// A slice of the "Pending removal" sections of the Python docs
pub fn deprecation_catalog() -> Vec<DeprecationRecord> {
    vec![
        DeprecationRecord::new("ast.Num", "3.8")
            .removed_in("3.14")
            .in_module("ast")
            .described("ast.Num, ast.Str, ast.Bytes, ast.NameConstant and ast.Ellipsis are deprecated since Python 3.8. Use ast.Constant instead.")
            .replaced_by("ast.Constant")
            .at(section("pending-removal-in-python-3-14")),
        DeprecationRecord::new("pkgutil.find_loader", "3.12")
            .removed_in("3.14")
            .in_module("pkgutil")
            .described("pkgutil.find_loader() and pkgutil.get_loader() are deprecated since Python 3.12. Use importlib.util.find_spec() instead.")
            .replaced_by("importlib.util.find_spec()")
            .at(section("pending-removal-in-python-3-14")),
        DeprecationRecord::new("asyncio.get_child_watcher", "3.12")
            .removed_in("3.14")
            .in_module("asyncio")
            .described("The child watcher classes and asyncio.get_child_watcher() are deprecated since Python 3.12.")
            .at(section("pending-removal-in-python-3-14")),
        DeprecationRecord::new("ctypes.SetPointerType", "3.13")
            .removed_in("3.15")
            .in_module("ctypes")
            .described("The undocumented ctypes.SetPointerType() function is deprecated since Python 3.13.")
            .at(section("pending-removal-in-python-3-15")),
        DeprecationRecord::new("http.server.CGIHTTPRequestHandler", "3.13")
            .removed_in("3.15")
            .in_module("http.server")
            .described("The obsolete and rarely used CGIHTTPRequestHandler is deprecated since Python 3.13. No direct replacement exists.")
            .at(section("pending-removal-in-python-3-15")),
        DeprecationRecord::new("locale.getdefaultlocale", "3.11")
            .removed_in("3.15")
            .in_module("locale")
            .described("locale.getdefaultlocale() is deprecated since Python 3.11. Use getlocale(), setlocale() and getencoding() instead.")
            .replaced_by("getlocale(), setlocale() and getencoding()")
            .at(section("pending-removal-in-python-3-15")),
        DeprecationRecord::new("array 'u' format code", "3.13")
            .removed_in("3.16")
            .in_module("array")
            .described("The 'u' format code (wchar_t) is deprecated in documentation since Python 3.3 and at runtime since Python 3.13. Use the 'w' format code instead.")
            .replaced_by("the 'w' format code")
            .at(section("pending-removal-in-python-3-16")),
        DeprecationRecord::new("asyncio.iscoroutinefunction", "3.14")
            .removed_in("3.16")
            .in_module("asyncio")
            .described("asyncio.iscoroutinefunction() is deprecated since Python 3.14. Use inspect.iscoroutinefunction() instead.")
            .replaced_by("inspect.iscoroutinefunction()")
            .at(section("pending-removal-in-python-3-16")),
        DeprecationRecord::new("PyImport_ImportModuleNoBlock", "3.13")
            .removed_in("3.15")
            .in_module("C API - Python initialization")
            .described("PyImport_ImportModuleNoBlock() is deprecated since Python 3.13. Use PyImport_ImportModule() instead.")
            .replaced_by("PyImport_ImportModule()")
            .at(section("c-api-pending-removal-in-python-3-15")),
        DeprecationRecord::new("ssl.match_hostname", "3.7")
            .removed_in("Future")
            .in_module("ssl")
            .described("ssl.match_hostname() is deprecated since Python 3.7 and scheduled for removal in a future version.")
            .at(section("pending-removal-in-future-versions")),
    ]
}

/// Issues of the demo SCRUM project
pub fn tickets() -> Vec<Ticket> {
    vec![
        Ticket::new("SCRUM-1", "Deprecate old C API", "Testing"),
        Ticket::new("SCRUM-6", "Update documentation for ctypes", "Done"),
        Ticket::new("SCRUM-3", "Another testing task", "Testing"),
    ]
}

/// Notes of the demo backlog folder
pub fn backlog() -> Vec<BacklogItem> {
    vec![
        BacklogItem::new(
            "Deprecate old SSL",
            "Remove SSL v2/v3 support",
            "ssl_notes.txt",
        ),
        BacklogItem::new(
            "New deprecation for email module",
            "Deprecate old email formats",
            "email_notes.txt",
        ),
    ]
}
