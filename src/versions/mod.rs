/// Snapshot of 2024-10-07.
pub mod v20241007;

/// Snapshot of 2025-03-06, the latest version.
pub mod v20250306;
