//! Leptos components of the viewer.

pub mod controls;
pub mod details_panel;
pub mod lineage_graph;

pub use controls::Controls;
pub use details_panel::DetailsPanel;
pub use lineage_graph::LineageCanvas;
