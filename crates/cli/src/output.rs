//! Output format selection for commands.

/// How command results are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table.
    Table,
    /// Compact JSON (one line, machine-readable).
    Json,
    /// Pretty-printed JSON.
    JsonPretty,
}
