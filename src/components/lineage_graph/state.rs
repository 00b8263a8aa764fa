//! Canvas state: placed geometry, view transform and interaction tracking.
//!
//! The column layout is computed by [`column_layout`]; the free-flow layout
//! runs the `force_graph` simulation over the table nodes, spreads the result
//! until no two table boxes overlap, and then packs fields inside each table.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::f64::consts::PI;

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::scale::{ScaleConfig, ScaledValues};
use crate::config::ForceSettings;
use crate::lineage::{
	Bands, GraphElements, LayoutMetrics, LayoutMode, Point, RelationEdge, TableBox, column_layout,
	pack_fields,
};

/// Largest spread factor applied to a settled simulation.
const MAX_SPREAD: f64 = 25.0;
/// Clearance kept between free-flow table boxes.
const TABLE_MARGIN: f64 = 40.0;

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal translation in screen pixels.
	pub x: f64,
	/// Vertical translation in screen pixels.
	pub y: f64,
	/// Zoom factor (1.0 = 100%).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	/// A button is held down on the canvas.
	pub active: bool,
	/// Set once the pointer has travelled far enough to not be a click.
	pub moved: bool,
	/// Pointer position where the pan began.
	pub start_x: f64,
	/// See `start_x`.
	pub start_y: f64,
	/// Transform translation when the pan began.
	pub transform_start_x: f64,
	/// See `transform_start_x`.
	pub transform_start_y: f64,
}

/// Everything the renderer and the event handlers need for one scene.
pub struct LineageGraphState {
	/// The graph being shown.
	pub elements: GraphElements,
	/// Active layout.
	pub layout: LayoutMode,
	/// Box sizes.
	pub metrics: LayoutMetrics,
	force: ForceSettings,
	/// Current pan and zoom.
	pub transform: ViewTransform,
	/// Drag in progress, if any.
	pub pan: PanState,
	/// Canvas size in CSS pixels.
	pub width: f64,
	/// Canvas height in CSS pixels.
	pub height: f64,
	/// Band guides; present in columns mode only.
	pub bands: Option<Bands>,
	/// Height of the laid-out graph in world units.
	pub content_height: f64,
	/// Placed table boxes.
	pub tables: Vec<TableBox>,
	/// Centre of every placed node by id.
	pub positions: BTreeMap<String, Point>,
	/// Edge under the pointer, for the tooltip.
	pub hovered_edge: Option<String>,
	/// Id of the selected node or edge.
	pub selected: Option<String>,
	/// Last pointer position in screen space.
	pub pointer: (f64, f64),
}

impl LineageGraphState {
	/// Lays out `elements` for a canvas of the given size.
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		elements: GraphElements,
		layout: LayoutMode,
		metrics: LayoutMetrics,
		force: ForceSettings,
		width: f64,
		height: f64,
		scale: &ScaleConfig,
	) -> Self {
		let mut state = Self {
			elements,
			layout,
			metrics,
			force,
			transform: ViewTransform::default(),
			pan: PanState::default(),
			width,
			height,
			bands: None,
			content_height: height,
			tables: Vec::new(),
			positions: BTreeMap::new(),
			hovered_edge: None,
			selected: None,
			pointer: (0.0, 0.0),
		};
		state.relayout(scale);
		state
	}

	/// Switches the layout mode and recomputes positions.
	pub fn set_layout(&mut self, layout: LayoutMode, scale: &ScaleConfig) {
		self.layout = layout;
		self.relayout(scale);
	}

	/// Runs the layout again and refits the view.
	pub fn relayout(&mut self, scale: &ScaleConfig) {
		match self.layout {
			LayoutMode::Columns => self.apply_columns(),
			LayoutMode::FreeFlow => self.apply_free_flow(scale),
		}
	}

	/// Columns: recompute the bands. Free-flow: refit the current positions.
	pub fn reset_view(&mut self, scale: &ScaleConfig) {
		match self.layout {
			LayoutMode::Columns => self.apply_columns(),
			LayoutMode::FreeFlow => self.fit(scale),
		}
	}

	/// Records a new canvas size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		if self.layout == LayoutMode::Columns {
			self.apply_columns();
		}
	}

	fn apply_columns(&mut self) {
		let layout = column_layout(&self.elements, self.width, true, &self.metrics);
		self.bands = Some(layout.bands);
		self.content_height = layout.height;
		self.tables = layout.tables;
		self.positions = layout.positions;
		self.transform = ViewTransform::default();
	}

	fn apply_free_flow(&mut self, scale: &ScaleConfig) {
		let centers = simulate(&self.elements, &self.force, self.width, self.height);
		let centers = separate(&self.elements, centers, &self.metrics);
		let (tables, mut positions) = pack_fields(&self.elements, &centers, &self.metrics);
		positions.extend(centers);
		self.bands = None;
		self.tables = tables;
		self.positions = positions;
		self.fit(scale);
	}

	/// Zooms and pans so every table is visible with the configured padding.
	pub fn fit(&mut self, scale: &ScaleConfig) {
		let Some((min, max)) = self.bounds() else {
			self.transform = ViewTransform::default();
			return;
		};
		self.content_height = self.height;
		let padding = self.force.fit_padding;
		let (bw, bh) = ((max.x - min.x).max(1.0), (max.y - min.y).max(1.0));
		let k = ((self.width - 2.0 * padding).max(1.0) / bw)
			.min((self.height - 2.0 * padding).max(1.0) / bh);
		let k = scale.clamp_zoom(k);
		let (cx, cy) = ((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}

	fn bounds(&self) -> Option<(Point, Point)> {
		let half = self.metrics.table_width / 2.0;
		self.tables.iter().fold(None, |acc, b| {
			let (lo, hi) = (
				Point {
					x: b.x - half,
					y: b.top,
				},
				Point {
					x: b.x + half,
					y: b.bottom(),
				},
			);
			Some(match acc {
				None => (lo, hi),
				Some((min, max)) => (
					Point {
						x: min.x.min(lo.x),
						y: min.y.min(lo.y),
					},
					Point {
						x: max.x.max(hi.x),
						y: max.y.max(hi.y),
					},
				),
			})
		})
	}

	/// Converts canvas pixels to graph coordinates.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Placed box of table `id`.
	pub fn table_box(&self, id: &str) -> Option<&TableBox> {
		self.tables.iter().find(|b| b.id == id)
	}

	/// Centre and half extents of a placed node.
	fn extent(&self, id: &str) -> Option<(Point, f64, f64)> {
		if self.elements.field(id).is_some() {
			let center = *self.positions.get(id)?;
			return Some((
				center,
				self.metrics.field_width / 2.0,
				self.metrics.row_height / 2.0,
			));
		}
		let table = self.table_box(id)?;
		Some((table.center(), self.metrics.table_width / 2.0, table.height / 2.0))
	}

	/// Edge segment clipped to the borders of its end boxes.
	pub fn edge_segment(&self, edge: &RelationEdge) -> Option<(Point, Point)> {
		let (from, fw, fh) = self.extent(&edge.source)?;
		let (to, tw, th) = self.extent(&edge.target)?;
		let start = clip(from, fw, fh, to);
		let end = clip(to, tw, th, from);
		let length = (end.x - start.x).hypot(end.y - start.y);
		(length > 1.0).then_some((start, end))
	}

	/// Topmost field, then table, then edge under the screen point.
	pub fn hit_test(&self, sx: f64, sy: f64, scale: &ScaledValues) -> Option<String> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let inside = |center: Point, hw: f64, hh: f64| {
			(gx - center.x).abs() <= hw && (gy - center.y).abs() <= hh
		};

		let field = self.elements.fields.iter().rev().find(|f| {
			self.extent(&f.id)
				.is_some_and(|(c, hw, hh)| inside(c, hw, hh))
		});
		if let Some(field) = field {
			return Some(field.id.clone());
		}

		let table = self.tables.iter().rev().find(|b| {
			inside(b.center(), self.metrics.table_width / 2.0, b.height / 2.0)
		});
		if let Some(table) = table {
			return Some(table.id.clone());
		}

		self.edge_at(sx, sy, scale).map(|e| e.id.clone())
	}

	/// Closest edge within the hit tolerance of the screen point.
	pub fn edge_at(&self, sx: f64, sy: f64, scale: &ScaledValues) -> Option<&RelationEdge> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let point = Point { x: gx, y: gy };
		self.elements
			.edges
			.iter()
			.filter_map(|edge| {
				let (a, b) = self.edge_segment(edge)?;
				let distance = segment_distance(point, a, b);
				(distance <= scale.edge_hit_tolerance).then_some((distance, edge))
			})
			.min_by(|x, y| x.0.total_cmp(&y.0))
			.map(|(_, edge)| edge)
	}
}

/// Point where the ray from `center` toward `toward` leaves the box.
fn clip(center: Point, hw: f64, hh: f64, toward: Point) -> Point {
	let (dx, dy) = (toward.x - center.x, toward.y - center.y);
	if dx == 0.0 && dy == 0.0 {
		return center;
	}
	let tx = if dx == 0.0 { f64::INFINITY } else { hw / dx.abs() };
	let ty = if dy == 0.0 { f64::INFINITY } else { hh / dy.abs() };
	let t = tx.min(ty).min(1.0);
	Point {
		x: center.x + dx * t,
		y: center.y + dy * t,
	}
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len2 = dx * dx + dy * dy;
	let t = if len2 == 0.0 {
		0.0
	} else {
		(((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0)
	};
	(p.x - (a.x + t * dx)).hypot(p.y - (a.y + t * dy))
}

fn owner<'a>(elements: &'a GraphElements, node_id: &'a str) -> &'a str {
	elements
		.field(node_id)
		.map(|f| f.parent.as_str())
		.unwrap_or(node_id)
}

/// Runs the force simulation over tables; field edges pull their tables.
fn simulate(
	elements: &GraphElements,
	force: &ForceSettings,
	width: f64,
	height: f64,
) -> BTreeMap<String, Point> {
	let mut graph: ForceGraph<String, ()> = ForceGraph::new(SimulationParameters {
		force_charge: force.force_charge,
		force_spring: force.force_spring,
		force_max: force.force_max,
		node_speed: force.node_speed,
		damping_factor: force.damping_factor,
	});

	let count = elements.tables.len().max(1);
	let radius = 40.0 * (count as f64).sqrt() * 4.0;
	let mut index = HashMap::new();
	for (i, table) in elements.tables.iter().enumerate() {
		let angle = (i as f64) * 2.0 * PI / count as f64;
		let rows = table.columns.len().max(1);
		let idx = graph.add_node(NodeData {
			x: (width / 2.0 + radius * angle.cos()) as f32,
			y: (height / 2.0 + radius * angle.sin()) as f32,
			mass: 10.0 + rows as f32,
			is_anchor: false,
			user_data: table.id.clone(),
		});
		index.insert(table.id.as_str(), idx);
	}

	let pairs: BTreeSet<(&str, &str)> = elements
		.edges
		.iter()
		.map(|e| (owner(elements, &e.source), owner(elements, &e.target)))
		.filter(|(s, t)| s != t)
		.collect();
	for (source, target) in pairs {
		if let (Some(&a), Some(&b)) = (index.get(source), index.get(target)) {
			graph.add_edge(a, b, EdgeData::default());
		}
	}

	for _ in 0..force.iterations {
		graph.update(force.time_step);
	}

	let mut centers = BTreeMap::new();
	graph.visit_nodes(|node| {
		centers.insert(
			node.data.user_data.clone(),
			Point {
				x: node.x() as f64,
				y: node.y() as f64,
			},
		);
	});
	centers
}

/// Scales settled positions about their centroid until no boxes overlap.
fn separate(
	elements: &GraphElements,
	centers: BTreeMap<String, Point>,
	metrics: &LayoutMetrics,
) -> BTreeMap<String, Point> {
	let heights: Vec<(&Point, f64)> = elements
		.tables
		.iter()
		.filter_map(|t| {
			let rows = t.columns.len().max(elements.children(&t.id).count());
			centers.get(&t.id).map(|p| (p, metrics.table_height(rows)))
		})
		.collect();
	if heights.len() < 2 {
		return centers;
	}

	let mut factor: f64 = 1.0;
	for (i, (a, ha)) in heights.iter().enumerate() {
		for (b, hb) in &heights[i + 1..] {
			let need_x = metrics.table_width + TABLE_MARGIN;
			let need_y = (ha + hb) / 2.0 + TABLE_MARGIN;
			let (dx, dy) = ((a.x - b.x).abs(), (a.y - b.y).abs());
			if dx >= need_x || dy >= need_y {
				continue;
			}
			let fx = if dx > 0.0 { need_x / dx } else { f64::INFINITY };
			let fy = if dy > 0.0 { need_y / dy } else { f64::INFINITY };
			factor = factor.max(fx.min(fy));
		}
	}
	let factor = factor.min(MAX_SPREAD);
	if factor <= 1.0 {
		return centers;
	}

	let n = centers.len() as f64;
	let cx = centers.values().map(|p| p.x).sum::<f64>() / n;
	let cy = centers.values().map(|p| p.y).sum::<f64>() / n;
	centers
		.into_iter()
		.map(|(id, p)| {
			(
				id,
				Point {
					x: cx + (p.x - cx) * factor,
					y: cy + (p.y - cy) * factor,
				},
			)
		})
		.collect()
}
