//! Lineage graph canvas.
//!
//! Renders a filtered lineage scene on an HTML canvas with:
//! - Three zone bands (columns layout) or a force-directed free-flow layout
//! - Table boxes with their field rows, coloured by zone-type
//! - Pan and zoom, edge hover tooltips, click selection
//!
//! # Example
//!
//! ```ignore
//! view! {
//!     <LineageCanvas
//!         scene=scene
//!         layout=layout
//!         view_resets=resets
//!         metrics=LayoutMetrics::default()
//!         force=ForceSettings::default()
//!         on_select=move |id| log::info!("selected {id:?}")
//!     />
//! }
//! ```

mod component;
mod render;
pub mod scale;
pub mod state;
pub mod theme;

pub use component::LineageCanvas;
pub use theme::Theme;
