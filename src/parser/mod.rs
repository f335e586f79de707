//! Module-text parsing — include directives and the cgo interop marker.

pub mod includes;

pub use includes::{
    extract_includes, has_interop_marker, IncludeDirective, QuoteStyle, INTEROP_MARKER,
};
