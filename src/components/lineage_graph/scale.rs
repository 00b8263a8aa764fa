//! Zoom-dependent scaling for strokes, arrows, labels and hit testing.
//!
//! Boxes live in world space and scale with the view. Strokes and hit
//! tolerances are specified in screen pixels and divided by the zoom level so
//! they keep a constant on-screen size.

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World-space scaling, clamped to min/max screen-space bounds.
	Clamped {
		/// Smallest on-screen size in pixels.
		min_screen: f64,
		/// Largest on-screen size in pixels.
		max_screen: f64,
	},
}

impl ScaleBehavior {
	/// World-space value for `base` at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Zoom bounds, arrow sizing and fonts for the canvas.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// Zoom bounds for the wheel handler and view fitting.
	pub min_zoom: f64,
	/// Upper zoom bound.
	pub max_zoom: f64,
	/// Arrowhead length in world units.
	pub arrow_size: f64,
	/// How arrowheads react to zoom.
	pub arrow_behavior: ScaleBehavior,
	/// How close (screen pixels) a click must land to pick an edge.
	pub edge_hit_tolerance: f64,
	/// Font sizes in pixels.
	pub table_font_px: f64,
	/// Field label size.
	pub field_font_px: f64,
	/// Tooltip text size.
	pub tooltip_font_px: f64,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			min_zoom: 0.1,
			max_zoom: 4.0,
			arrow_size: 10.0,
			arrow_behavior: ScaleBehavior::Clamped {
				min_screen: 4.0,
				max_screen: 18.0,
			},
			edge_hit_tolerance: 5.0,
			table_font_px: 13.0,
			field_font_px: 11.0,
			tooltip_font_px: 12.0,
		}
	}
}

impl ScaleConfig {
	/// Clamps `k` into the zoom bounds.
	pub fn clamp_zoom(&self, k: f64) -> f64 {
		k.clamp(self.min_zoom, self.max_zoom)
	}
}

/// Pre-computed scale values for a specific zoom level.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Arrowhead length in world units.
	pub arrow_size: f64,
	/// Edge pick distance in world units.
	pub edge_hit_tolerance: f64,
	/// Converts a screen-pixel stroke width to world units.
	pub pixel: f64,
	/// Canvas font strings.
	pub table_font: String,
	/// Font for field labels.
	pub field_font: String,
}

impl ScaledValues {
	/// Scales `config` for zoom `k`.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		Self {
			arrow_size: config.arrow_behavior.apply(config.arrow_size, k),
			edge_hit_tolerance: ScaleBehavior::Screen.apply(config.edge_hit_tolerance, k),
			pixel: 1.0 / k,
			table_font: format!("bold {}px sans-serif", config.table_font_px),
			field_font: format!("{}px sans-serif", config.field_font_px),
		}
	}
}
