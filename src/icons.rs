//! Status icon lookup.
//!
//! Maps a workflow status label to a display glyph by scanning an ordered
//! key list with substring matching. Iteration order is semantically
//! load-bearing: a composite label like "completed success" must match
//! "success" before it can fall through to "completed", so the table is an
//! explicit slice rather than a map.

/// Ordered (key, glyph) pairs; first key that is a substring of the label wins.
const STATUS_ICONS: &[(&str, &str)] = &[
    ("success", "✅"),
    ("failure", "❌"),
    ("cancelled", "🛑"),
    ("skipped", "⏭️"),
    ("timed_out", "⌛"),
    ("action_required", "⛔"),
    ("neutral", "⭕"),
    ("stale", "🥖"),
    ("in_progress", "🔁"),
    ("queued", "📋"),
    ("no_runs", "➖"),
    ("completed", "➖"),
    ("loading", "🌀"),
    ("error", "⚠️"),
];

/// Glyph used when no key matches (and for empty labels).
pub const DEFAULT_ICON: &str = "➖";

/// Glyph prefixed to warning lines.
pub const WARN_ICON: &str = "⚠️";

/// Return the display glyph for a status label.
///
/// Total over all strings: empty input and no-match both yield
/// [`DEFAULT_ICON`]. Matching is case-sensitive byte substring.
pub fn icon_for(status: &str) -> &'static str {
    if status.is_empty() {
        return DEFAULT_ICON;
    }
    STATUS_ICONS
        .iter()
        .find(|(key, _)| status.contains(key))
        .map(|(_, icon)| *icon)
        .unwrap_or(DEFAULT_ICON)
}
