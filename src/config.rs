//! Runtime configuration.
//!
//! The host page may embed a `<script id="lineage-config" type="application/json">`
//! element to override data locations or layout metrics. Missing keys fall
//! back to [`Default`], and a malformed document falls back entirely.

use log::warn;
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::HtmlScriptElement;

use crate::lineage::LayoutMetrics;

/// Id of the optional configuration script element.
pub const CONFIG_ELEMENT_ID: &str = "lineage-config";

/// Where the two relation documents live.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataSources {
	/// Table-level relations.
	pub tables_url: String,
	/// Field-level relations.
	pub fields_url: String,
}

impl Default for DataSources {
	fn default() -> Self {
		Self {
			tables_url: "../json/datos-objetivo.json".to_string(),
			fields_url: "../json/datos-objetivo-campos.json".to_string(),
		}
	}
}

/// Parameters of the free-flow simulation.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForceSettings {
	/// Simulation steps run before the layout is shown.
	pub iterations: usize,
	/// Seconds per simulation step.
	pub time_step: f32,
	/// Repulsion between nodes.
	pub force_charge: f32,
	/// Pull along edges.
	pub force_spring: f32,
	/// Cap on the force applied per step.
	pub force_max: f32,
	/// Velocity cap.
	pub node_speed: f32,
	/// Velocity kept per step.
	pub damping_factor: f32,
	/// Screen padding kept around the graph when fitting the view.
	pub fit_padding: f64,
}

impl Default for ForceSettings {
	fn default() -> Self {
		Self {
			iterations: 300,
			time_step: 0.016,
			force_charge: 2000.0,
			force_spring: 0.02,
			force_max: 280.0,
			node_speed: 7000.0,
			damping_factor: 0.9,
			fit_padding: 80.0,
		}
	}
}

/// Viewer configuration, read from the page.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LineageConfig {
	/// Where the documents live.
	pub data: DataSources,
	/// Box sizes for both layouts.
	pub layout: LayoutMetrics,
	/// Free-flow simulation parameters.
	pub force: ForceSettings,
}

impl LineageConfig {
	/// Parses a configuration document, falling back to defaults on error.
	pub fn from_json(text: &str) -> Self {
		match serde_json::from_str(text) {
			Ok(config) => config,
			Err(e) => {
				warn!("lineage-graph: ignoring malformed configuration: {}", e);
				Self::default()
			}
		}
	}

	/// Reads the configuration element from the current document.
	pub fn from_document() -> Self {
		let text = web_sys::window()
			.and_then(|w| w.document())
			.and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
			.and_then(|e| e.dyn_into::<HtmlScriptElement>().ok())
			.and_then(|s| s.text().ok());
		match text {
			Some(text) if !text.trim().is_empty() => Self::from_json(&text),
			_ => Self::default(),
		}
	}
}
