//! Deterministic three-band column layout.
//!
//! Tables are split into left/center/right bands by zone-type, sorted by
//! name and stacked top to bottom. Field nodes are stacked inside their
//! table using the same metrics that size the table, so the last row ends
//! exactly one gap above the table's bottom edge.
//!
//! The force-directed "free-flow" mode lives with the canvas component; it
//! reuses [`pack_fields`] to place fields once the tables have settled.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::elements::{FieldNode, GraphElements, TableNode};
use super::zone::ColumnKey;

/// User-selectable layout mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
	/// Three fixed bands by zone-type.
	#[default]
	Columns,
	/// Force-directed simulation over the table nodes.
	FreeFlow,
}

impl LayoutMode {
	/// Selector value of this mode.
	pub fn as_str(self) -> &'static str {
		match self {
			LayoutMode::Columns => "columns",
			LayoutMode::FreeFlow => "free-flow",
		}
	}

	/// Parses a selector value, defaulting to columns.
	pub fn from_value(value: &str) -> Self {
		match value {
			"free-flow" => LayoutMode::FreeFlow,
			_ => LayoutMode::Columns,
		}
	}

	/// Human-readable selector label.
	pub fn label(self) -> &'static str {
		match self {
			LayoutMode::Columns => "Columns by zone",
			LayoutMode::FreeFlow => "Free flow",
		}
	}
}

/// Pixel metrics shared by the column layout, field packing and rendering.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutMetrics {
	/// Top of the first table in every band.
	pub start_y: f64,
	/// Height of the table header plate plus its gap.
	pub header_height: f64,
	/// Height of one field row.
	pub row_height: f64,
	/// Vertical gap around and between field rows.
	pub field_gap: f64,
	/// Vertical gap between stacked tables.
	pub table_gap: f64,
	/// Horizontal separator between bands.
	pub separator: f64,
	/// Bands never get narrower than this.
	pub min_band_width: f64,
	/// Used when the container reports no width.
	pub fallback_width: f64,
	/// Minimum canvas height in columns mode.
	pub min_height: f64,
	/// Space kept below the lowest table.
	pub bottom_padding: f64,
	/// Width of a table box.
	pub table_width: f64,
	/// Width of a field box.
	pub field_width: f64,
}

impl Default for LayoutMetrics {
	fn default() -> Self {
		Self {
			start_y: 120.0,
			header_height: 46.0,
			row_height: 32.0,
			field_gap: 12.0,
			table_gap: 140.0,
			separator: 6.0,
			min_band_width: 320.0,
			fallback_width: 1200.0,
			min_height: 900.0,
			bottom_padding: 200.0,
			table_width: 300.0,
			field_width: 260.0,
		}
	}
}

impl LayoutMetrics {
	/// Height of a table holding `field_count` rows (at least one row).
	pub fn table_height(&self, field_count: usize) -> f64 {
		let n = field_count.max(1) as f64;
		self.header_height
			+ self.field_gap
			+ n * self.row_height
			+ (n - 1.0) * self.field_gap
			+ self.field_gap
	}

	/// Distance from a table's top edge to the centre of row `index`.
	pub fn row_offset(&self, index: usize) -> f64 {
		self.header_height
			+ self.field_gap
			+ self.row_height / 2.0
			+ index as f64 * (self.row_height + self.field_gap)
	}
}

/// A position in graph space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

/// Placed bounding box of a table; `x` is the horizontal centre.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableBox {
	/// Table node id.
	pub id: String,
	/// Horizontal centre.
	pub x: f64,
	/// Top edge.
	pub top: f64,
	/// Full height, see [`LayoutMetrics::table_height`].
	pub height: f64,
}

impl TableBox {
	/// Centre of the box.
	pub fn center(&self) -> Point {
		Point {
			x: self.x,
			y: self.top + self.height / 2.0,
		}
	}

	/// Bottom edge.
	pub fn bottom(&self) -> f64 {
		self.top + self.height
	}
}

/// Horizontal geometry of the three bands.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bands {
	/// Width of each band.
	pub band_width: f64,
	/// Horizontal centres, indexed by [`ColumnKey::index`].
	pub centers: [f64; 3],
	/// Width covered by the bands and separators.
	pub total_width: f64,
	/// Left edge of the first band.
	pub offset_x: f64,
}

impl Bands {
	/// Splits `container_width` into three equal bands (never narrower than
	/// the minimum). With the overlay guide visible the bands are centred as
	/// a block; otherwise the layout spans the viewport.
	pub fn compute(metrics: &LayoutMetrics, container_width: f64, overlay_visible: bool) -> Self {
		let width = if container_width > 0.0 {
			container_width
		} else {
			metrics.fallback_width
		};
		let sep = metrics.separator;
		let band_width = metrics
			.min_band_width
			.max(((width - sep * 2.0) / 3.0).max(0.0));
		let block_width = band_width * 3.0 + sep * 2.0;
		let (total_width, offset_x) = if overlay_visible {
			(block_width, ((width - block_width) / 2.0).max(0.0))
		} else {
			(width, 0.0)
		};
		let center = |i: f64| offset_x + band_width * i + sep * i + band_width / 2.0;
		Self {
			band_width,
			centers: [center(0.0), center(1.0), center(2.0)],
			total_width,
			offset_x,
		}
	}

	/// Horizontal centre of a band.
	pub fn center(&self, key: ColumnKey) -> f64 {
		self.centers[key.index()]
	}

	/// Left edge of a band.
	pub fn left(&self, key: ColumnKey) -> f64 {
		self.center(key) - self.band_width / 2.0
	}
}

/// Result of [`column_layout`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColumnLayout {
	/// Band geometry the tables were placed in.
	pub bands: Bands,
	/// Table boxes, band by band, each band sorted by name.
	pub tables: Vec<TableBox>,
	/// Centre of every node (tables and fields) by id.
	pub positions: BTreeMap<String, Point>,
	/// Canvas height needed to show every band.
	pub height: f64,
}

fn rows_of(table: &TableNode, elements: &GraphElements) -> usize {
	table.columns.len().max(elements.children(&table.id).count())
}

fn sorted_children<'a>(elements: &'a GraphElements, table_id: &'a str) -> Vec<&'a FieldNode> {
	let mut fields: Vec<&FieldNode> = elements.children(table_id).collect();
	fields.sort_by(|a, b| a.field.cmp(&b.field));
	fields
}

/// Positions every node of `elements` in the three-band layout.
pub fn column_layout(
	elements: &GraphElements,
	container_width: f64,
	overlay_visible: bool,
	metrics: &LayoutMetrics,
) -> ColumnLayout {
	let bands = Bands::compute(metrics, container_width, overlay_visible);

	let mut by_band: [Vec<&TableNode>; 3] = [Vec::new(), Vec::new(), Vec::new()];
	for table in &elements.tables {
		by_band[table.zone_type.column().index()].push(table);
	}

	let mut boxes = Vec::with_capacity(elements.tables.len());
	let mut positions = BTreeMap::new();
	let mut max_bottom = metrics.start_y;

	for key in ColumnKey::ALL {
		let tables = &mut by_band[key.index()];
		tables.sort_by(|a, b| a.table.cmp(&b.table));

		let x = bands.center(key);
		let mut cursor = metrics.start_y;
		for table in tables.iter() {
			let height = metrics.table_height(rows_of(table, elements));
			let placed = TableBox {
				id: table.id.clone(),
				x,
				top: cursor,
				height,
			};
			positions.insert(table.id.clone(), placed.center());
			for (i, field) in sorted_children(elements, &table.id).into_iter().enumerate() {
				positions.insert(
					field.id.clone(),
					Point {
						x,
						y: cursor + metrics.row_offset(i),
					},
				);
			}
			max_bottom = max_bottom.max(placed.bottom());
			cursor += height + metrics.table_gap;
			boxes.push(placed);
		}
	}

	ColumnLayout {
		bands,
		tables: boxes,
		positions,
		height: metrics.min_height.max(max_bottom + metrics.bottom_padding),
	}
}

/// Stacks each table's fields around the table's current centre.
///
/// Used after a free-form layout has placed the tables; returns the field
/// positions together with the resulting table boxes.
pub fn pack_fields(
	elements: &GraphElements,
	table_centers: &BTreeMap<String, Point>,
	metrics: &LayoutMetrics,
) -> (Vec<TableBox>, BTreeMap<String, Point>) {
	let mut boxes = Vec::with_capacity(elements.tables.len());
	let mut positions = BTreeMap::new();

	for table in &elements.tables {
		let Some(center) = table_centers.get(&table.id) else {
			continue;
		};
		let height = metrics.table_height(rows_of(table, elements));
		let top = center.y - height / 2.0;
		for (i, field) in sorted_children(elements, &table.id).into_iter().enumerate() {
			positions.insert(
				field.id.clone(),
				Point {
					x: center.x,
					y: top + metrics.row_offset(i),
				},
			);
		}
		boxes.push(TableBox {
			id: table.id.clone(),
			x: center.x,
			top,
			height,
		});
	}
	(boxes, positions)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::lineage::elements::build_elements;
	use crate::lineage::record::{RelationRecord, ViewMode};

	fn rec(source: &str, target: &str, sf: &str, tf: &str) -> RelationRecord {
		RelationRecord {
			source_table: source.into(),
			target_table: target.into(),
			source_field: Some(sf.into()),
			target_field: tf.into(),
			transformation: None,
			recommendation: None,
			query: None,
		}
	}

	#[test]
	fn table_height_formula_is_exact() {
		let m = LayoutMetrics::default();
		assert_eq!(m.table_height(0), 46.0 + 12.0 + 32.0 + 12.0);
		assert_eq!(m.table_height(1), m.table_height(0));
		assert_eq!(m.table_height(3), 46.0 + 12.0 + 3.0 * 32.0 + 2.0 * 12.0 + 12.0);
	}

	#[test]
	fn last_row_ends_one_gap_above_bottom() {
		let m = LayoutMetrics::default();
		for n in 1..10 {
			let last_bottom = m.row_offset(n - 1) + m.row_height / 2.0;
			assert_eq!(last_bottom + m.field_gap, m.table_height(n));
		}
	}

	#[test]
	fn bands_split_width_evenly() {
		let m = LayoutMetrics::default();
		let bands = Bands::compute(&m, 1512.0, true);
		assert_eq!(bands.band_width, 500.0);
		assert_eq!(bands.total_width, 1512.0);
		assert_eq!(bands.offset_x, 0.0);
		assert_eq!(bands.centers, [250.0, 756.0, 1262.0]);
	}

	#[test]
	fn narrow_containers_use_minimum_band_width() {
		let m = LayoutMetrics::default();
		let bands = Bands::compute(&m, 600.0, true);
		assert_eq!(bands.band_width, 320.0);
		assert_eq!(bands.total_width, 972.0);

		let full = Bands::compute(&m, 600.0, false);
		assert_eq!(full.total_width, 600.0);

		let fallback = Bands::compute(&m, 0.0, true);
		assert_eq!(fallback.band_width, (1200.0 - 12.0) / 3.0);
	}

	#[test]
	fn tables_land_in_their_band() {
		let records = vec![
			rec("s_bani.a", "proceso.p", "id", "id"),
			rec("proceso.p", "resultados.r", "id", "id"),
		];
		let elements = build_elements(&records, ViewMode::Tables);
		let m = LayoutMetrics::default();
		let layout = column_layout(&elements, 1512.0, true, &m);

		assert_eq!(layout.positions["table:s_bani.a"].x, 250.0);
		assert_eq!(layout.positions["table:proceso.p"].x, 756.0);
		assert_eq!(layout.positions["table:resultados.r"].x, 1262.0);
		for b in &layout.tables {
			assert_eq!(b.top, m.start_y);
		}
		assert_eq!(layout.height, m.min_height);
	}

	#[test]
	fn fields_are_sorted_and_stacked_inside_table() {
		let records = vec![
			rec("s_bani.a", "proceso.p", "zeta", "zeta"),
			rec("s_bani.a", "proceso.p", "alfa", "alfa"),
			rec("s_bani.a", "proceso.p", "medio", "medio"),
		];
		let elements = build_elements(&records, ViewMode::Fields);
		let m = LayoutMetrics::default();
		let layout = column_layout(&elements, 1200.0, true, &m);

		let top = m.start_y;
		let ys: Vec<f64> = ["alfa", "medio", "zeta"]
			.iter()
			.map(|f| layout.positions[&format!("column:proceso.p:{f}")].y)
			.collect();
		assert_eq!(ys, vec![top + 46.0 + 12.0 + 16.0, top + 46.0 + 12.0 + 16.0 + 44.0, top + 46.0 + 12.0 + 16.0 + 88.0]);

		let table = layout.tables.iter().find(|t| t.id == "table:proceso.p").unwrap();
		assert_eq!(table.height, m.table_height(3));
		let last = ys[2] + m.row_height / 2.0;
		assert!(last < table.bottom());
	}

	#[test]
	fn stacked_tables_do_not_overlap() {
		let records: Vec<RelationRecord> = (0..6)
			.map(|i| rec("s_bani.a", &format!("proceso.t{i}"), "id", &format!("c{i}")))
			.collect();
		let elements = build_elements(&records, ViewMode::Tables);
		let layout = column_layout(&elements, 1200.0, true, &LayoutMetrics::default());

		let mut center: Vec<&TableBox> = layout.tables.iter().filter(|t| t.id.starts_with("table:proceso")).collect();
		center.sort_by(|a, b| a.top.total_cmp(&b.top));
		for pair in center.windows(2) {
			assert!(pair[0].bottom() < pair[1].top);
		}
		let names: Vec<&str> = center.iter().map(|t| t.id.as_str()).collect();
		let mut sorted = names.clone();
		sorted.sort();
		assert_eq!(names, sorted);
	}

	#[test]
	fn pack_fields_centres_rows_on_table() {
		let records = vec![rec("s_bani.a", "proceso.p", "uno", "dos")];
		let elements = build_elements(&records, ViewMode::Fields);
		let m = LayoutMetrics::default();
		let mut centers = BTreeMap::new();
		centers.insert("table:proceso.p".to_string(), Point { x: 10.0, y: 500.0 });

		let (boxes, positions) = pack_fields(&elements, &centers, &m);
		assert_eq!(boxes.len(), 1);
		let field = positions["column:proceso.p:dos"];
		assert_eq!(field.x, 10.0);
		assert_eq!(field.y, 500.0 - m.table_height(1) / 2.0 + m.row_offset(0));
		assert!(!positions.contains_key("column:s_bani.a:uno"));
	}
}
