//! Pure lineage engine: sanitizing, classifying, filtering and laying out
//! relation records. Nothing in here touches the browser.
//!
//! The usual pipeline for one render is
//!
//! 1. [`sanitize`] the raw documents once per load and view mode,
//! 2. [`filter_records`] with the current [`FilterState`],
//! 3. [`build_elements`] from the filtered subset,
//! 4. [`column_layout`] (or the free-flow simulation) to place the nodes.

pub mod closure;
pub mod details;
pub mod elements;
pub mod filter;
pub mod layout;
pub mod record;
pub mod sanitize;
pub mod zone;

pub use closure::{IncomingIndex, upstream_closure};
pub use details::{Details, EMPTY_SELECTION_HINT, LOAD_ERROR_HINT, describe};
pub use elements::{FieldNode, GraphElements, RelationEdge, TableNode, build_elements};
pub use filter::{Action, Choice, FilterOptions, FilterState, SelectorView, filter_records};
pub use layout::{Bands, ColumnLayout, LayoutMetrics, LayoutMode, Point, TableBox, column_layout, pack_fields};
pub use record::{RawRecord, RelationRecord, ViewMode};
pub use sanitize::{Rejection, SanitizeReport, sanitize};
pub use zone::{ColumnKey, ZoneIndex, ZoneInfo, ZoneType};
