//! Visual theming for the lineage canvas.
//!
//! Colours are keyed by zone-type: table headers and borders use the strong
//! zone colour, field boxes a lighter border of the same family.

use crate::lineage::{ColumnKey, ZoneType};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red.
	pub r: u8,
	/// Green.
	pub g: u8,
	/// Blue.
	pub b: u8,
	/// Alpha, 0.0 to 1.0.
	pub a: f64,
}

impl Color {
	/// Opaque colour.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Colour with explicit alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Parses `#rrggbb`; anything else is mid grey.
	pub fn hex(color: &str) -> Self {
		let channel = |range: std::ops::Range<usize>| {
			color
				.get(range)
				.and_then(|h| u8::from_str_radix(h, 16).ok())
				.unwrap_or(128)
		};
		if color.starts_with('#') && color.len() == 7 {
			Color::rgb(channel(1..3), channel(3..5), channel(5..7))
		} else {
			Color::rgb(128, 128, 128)
		}
	}

	/// Same colour with alpha `a`.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// CSS colour string for canvas styles.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Colours of one zone-type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoneStyle {
	/// Table border and header plate.
	pub strong: Color,
	/// Header text.
	pub on_strong: Color,
	/// Field box border.
	pub field_border: Color,
}

/// Edge visual style.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	/// Stroke for ordinary relations.
	pub color: Color,
	/// Relations sourced from a landing zone.
	pub lz_color: Color,
	/// Line width in screen pixels; table-level and lz edges use `wide_width`.
	pub width: f64,
	/// Width of wide edges in screen pixels.
	pub wide_width: f64,
}

/// Band guides drawn behind the column layout.
#[derive(Clone, Debug)]
pub struct BandStyle {
	/// Background per band, left to right.
	pub fills: [Color; 3],
	/// Band headings, left to right.
	pub titles: [&'static str; 3],
	/// Band heading text.
	pub title_color: Color,
	/// Dashed gutter lines.
	pub separator_color: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Canvas backdrop in columns mode.
	pub background: Color,
	/// Free-flow mode has no bands and a tinted backdrop.
	pub free_flow_background: Color,
	/// Column band guides.
	pub bands: BandStyle,
	/// Relation strokes.
	pub edge: EdgeStyle,
	/// Fill of field boxes.
	pub box_fill: Color,
	/// Primary label colour.
	pub text: Color,
	/// Column lists and secondary labels.
	pub muted_text: Color,
	/// Outline of the selected element.
	pub selection: Color,
	/// Tooltip background.
	pub tooltip_fill: Color,
	/// Tooltip text.
	pub tooltip_text: Color,
}

impl Theme {
	/// Colours for boxes of a zone type.
	pub fn zone(&self, zone_type: ZoneType) -> ZoneStyle {
		let white = Color::rgb(255, 255, 255);
		let (strong, on_strong, field_border) = match zone_type {
			ZoneType::Results => ("#65a30d", white, "#a3e635"),
			ZoneType::Process => ("#be185d", white, "#fda4af"),
			ZoneType::StagingArea => ("#5b21b6", Color::hex("#f8fafc"), "#a855f7"),
			ZoneType::LzStatic => ("#b91c1c", white, "#f87171"),
			ZoneType::LzFunction => ("#64748b", white, "#94a3b8"),
			ZoneType::Other => ("#475569", white, "#94a3b8"),
		};
		ZoneStyle {
			strong: Color::hex(strong),
			on_strong,
			field_border: Color::hex(field_border),
		}
	}

	/// Background of band `key`.
	pub fn band_fill(&self, key: ColumnKey) -> Color {
		self.bands.fills[key.index()]
	}

	/// Heading of band `key`.
	pub fn band_title(&self, key: ColumnKey) -> &'static str {
		self.bands.titles[key.index()]
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			background: Color::rgb(255, 255, 255),
			free_flow_background: Color::hex("#ecfccb"),
			bands: BandStyle {
				fills: [
					Color::rgba(91, 33, 182, 0.06),
					Color::rgba(190, 24, 93, 0.05),
					Color::rgba(101, 163, 13, 0.07),
				],
				titles: ["Staging area", "Process and landing zones", "Results"],
				title_color: Color::hex("#334155"),
				separator_color: Color::hex("#cbd5e1"),
			},
			edge: EdgeStyle {
				color: Color::hex("#94a3b8"),
				lz_color: Color::hex("#ef4444"),
				width: 2.0,
				wide_width: 3.0,
			},
			box_fill: Color::rgb(255, 255, 255),
			text: Color::hex("#0f172a"),
			muted_text: Color::hex("#64748b"),
			selection: Color::hex("#0ea5e9"),
			tooltip_fill: Color::rgba(15, 23, 42, 0.9),
			tooltip_text: Color::rgb(255, 255, 255),
		}
	}
}
