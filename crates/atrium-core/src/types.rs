//! Shared datetime aliases

use chrono::{DateTime, Utc};

/// Datetime stored in `TIMESTAMPTZ` columns.
pub type DBDateTime = DateTime<Utc>;

/// Datetime exposed in API responses, serialized as RFC 3339 with a `Z` suffix.
///
/// When used in a utoipa schema, annotate the field:
/// ```rust,ignore
/// #[schema(value_type = String, format = DateTime)]
/// pub expires_at: UtcDateTime,
/// ```
pub type UtcDateTime = DateTime<Utc>;
