use std::sync::Arc;

use crate::value::Value;

/// The map type backing mapping values.
///
/// Keys are sorted unless the `preserve_order` feature is enabled in which
/// case insertion order is retained.  Either way iteration is deterministic.
#[cfg(feature = "preserve_order")]
pub type ValueMap = indexmap::IndexMap<Arc<str>, Value>;

/// The map type backing mapping values.
///
/// Keys are sorted unless the `preserve_order` feature is enabled in which
/// case insertion order is retained.  Either way iteration is deterministic.
#[cfg(not(feature = "preserve_order"))]
pub type ValueMap = std::collections::BTreeMap<Arc<str>, Value>;
