//! Method name to severity mapping.

use ctd_core::Severity;

/// Method names recognised on a reporting receiver, with their severity.
pub const REPORTING_METHODS: &[(&str, Severity)] = &[
    ("sendError", Severity::Error),
    ("sendWarning", Severity::Warning),
    ("sendInfo", Severity::Info),
    ("debug", Severity::Debug),
    ("sendUnhandledError", Severity::UnhandledError),
];

/// Maps a reporting method name to its severity.
///
/// Returns `None` for names outside [`REPORTING_METHODS`]; such calls are
/// not candidates for any entry.
#[must_use]
pub fn classify_method(method: &str) -> Option<Severity> {
    REPORTING_METHODS
        .iter()
        .find(|(name, _)| *name == method)
        .map(|(_, severity)| *severity)
}

/// Extracts the method name from a callee text (`Receiver.method`).
///
/// The method is the token after the final `.`; a callee without a dot
/// has no method.
#[must_use]
pub fn method_name(callee: &str) -> Option<&str> {
    callee
        .rsplit_once('.')
        .map(|(_, method)| method.trim())
        .filter(|m| !m.is_empty())
}
