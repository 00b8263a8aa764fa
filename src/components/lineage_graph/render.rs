//! Canvas rendering for the lineage graph.
//!
//! Rendering uses multiple passes for correct z-ordering:
//! 1. Background and band guides
//! 2. Edges and arrowheads
//! 3. Table boxes, then field boxes on top
//! 4. Edge tooltip (screen space)

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::scale::{ScaleConfig, ScaledValues};
use super::state::LineageGraphState;
use super::theme::{Color, Theme};
use crate::lineage::{ColumnKey, Point, ViewMode};

/// Renders the complete graph to the canvas.
pub fn render(
	state: &LineageGraphState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let scale = ScaledValues::new(config, state.transform.k);

	let background = match state.bands {
		Some(_) => theme.background,
		None => theme.free_flow_background,
	};
	ctx.set_fill_style_str(&background.to_css());
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	draw_bands(state, ctx, theme);
	draw_edges(state, ctx, &scale, theme);
	draw_tables(state, ctx, &scale, theme);
	draw_fields(state, ctx, &scale, theme);

	ctx.restore();

	draw_tooltip(state, ctx, config, theme);
}

/// Clears the canvas when there is no graph.
pub fn clear(ctx: &CanvasRenderingContext2d, width: f64, height: f64, theme: &Theme) {
	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, width, height);
}

fn draw_bands(state: &LineageGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let Some(bands) = &state.bands else {
		return;
	};
	for key in ColumnKey::ALL {
		let left = bands.left(key);
		ctx.set_fill_style_str(&theme.band_fill(key).to_css());
		ctx.fill_rect(left, 0.0, bands.band_width, state.content_height);

		ctx.set_fill_style_str(&theme.bands.title_color.to_css());
		ctx.set_font("600 14px sans-serif");
		ctx.set_text_align("center");
		let _ = ctx.fill_text(theme.band_title(key), bands.center(key), 48.0);
	}

	// Dashed separators in the gutters between bands.
	ctx.set_stroke_style_str(&theme.bands.separator_color.to_css());
	ctx.set_line_width(1.0);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(&JsValue::from(6.0), &JsValue::from(4.0)));
	for key in [ColumnKey::Center, ColumnKey::Right] {
		let x = bands.left(key) - state.metrics.separator / 2.0;
		ctx.begin_path();
		ctx.move_to(x, 0.0);
		ctx.line_to(x, state.content_height);
		ctx.stroke();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn edge_color(theme: &Theme, lz: bool) -> Color {
	if lz { theme.edge.lz_color } else { theme.edge.color }
}

fn draw_edges(
	state: &LineageGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	for edge in &state.elements.edges {
		let Some((from, to)) = state.edge_segment(edge) else {
			continue;
		};
		let highlighted = state.hovered_edge.as_deref() == Some(edge.id.as_str())
			|| state.selected.as_deref() == Some(edge.id.as_str());
		let color = if highlighted {
			theme.selection
		} else {
			edge_color(theme, edge.lz)
		};
		let wide = edge.lz || edge.level == ViewMode::Tables;
		let width = if wide {
			theme.edge.wide_width
		} else {
			theme.edge.width
		};
		let width = if highlighted { width + 1.0 } else { width };

		draw_arrow(ctx, from, to, color, width * scale.pixel, scale.arrow_size);
	}
}

fn draw_arrow(
	ctx: &CanvasRenderingContext2d,
	from: Point,
	to: Point,
	color: Color,
	width: f64,
	arrow_size: f64,
) {
	let (dx, dy) = (to.x - from.x, to.y - from.y);
	let dist = dx.hypot(dy);
	if dist < 0.001 {
		return;
	}
	let (ux, uy) = (dx / dist, dy / dist);
	let css = color.to_css();

	ctx.set_stroke_style_str(&css);
	ctx.set_line_width(width);
	ctx.begin_path();
	ctx.move_to(from.x, from.y);
	ctx.line_to(to.x - ux * arrow_size, to.y - uy * arrow_size);
	ctx.stroke();

	let (back_x, back_y) = (to.x - ux * arrow_size, to.y - uy * arrow_size);
	let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
	ctx.set_fill_style_str(&css);
	ctx.begin_path();
	ctx.move_to(to.x, to.y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_tables(
	state: &LineageGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let metrics = &state.metrics;
	let width = metrics.table_width;

	for placed in &state.tables {
		let Some(table) = state.elements.table(&placed.id) else {
			continue;
		};
		let zone = theme.zone(table.zone_type);
		let left = placed.x - width / 2.0;
		let selected = state.selected.as_deref() == Some(placed.id.as_str());

		ctx.set_fill_style_str(&theme.box_fill.to_css());
		ctx.fill_rect(left, placed.top, width, placed.height);
		let border = if selected { theme.selection } else { zone.strong };
		ctx.set_stroke_style_str(&border.to_css());
		ctx.set_line_width(if selected { 4.0 } else { 2.0 } * scale.pixel);
		ctx.stroke_rect(left, placed.top, width, placed.height);

		// Header plate with the table name.
		let plate_height = metrics.header_height - metrics.field_gap;
		ctx.set_fill_style_str(&zone.strong.to_css());
		ctx.fill_rect(left, placed.top, width, plate_height);
		ctx.set_fill_style_str(&zone.on_strong.to_css());
		ctx.set_font(&scale.table_font);
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		let _ = ctx.fill_text_with_max_width(
			&table.table,
			placed.x,
			placed.top + plate_height / 2.0,
			width - 16.0,
		);

		// Table level has no field nodes; list the known columns instead.
		if state.elements.mode == ViewMode::Tables {
			ctx.set_fill_style_str(&theme.muted_text.to_css());
			ctx.set_font(&scale.field_font);
			for (i, column) in table.columns.iter().enumerate() {
				let _ = ctx.fill_text_with_max_width(
					column,
					placed.x,
					placed.top + metrics.row_offset(i),
					metrics.field_width,
				);
			}
		}
	}
}

fn draw_fields(
	state: &LineageGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let metrics = &state.metrics;
	let (w, h) = (metrics.field_width, metrics.row_height);

	ctx.set_font(&scale.field_font);
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	for field in &state.elements.fields {
		let Some(center) = state.positions.get(&field.id) else {
			continue;
		};
		let (left, top) = (center.x - w / 2.0, center.y - h / 2.0);
		let selected = state.selected.as_deref() == Some(field.id.as_str());

		ctx.set_fill_style_str(&theme.box_fill.to_css());
		ctx.fill_rect(left, top, w, h);
		let border = if selected {
			theme.selection
		} else {
			theme.zone(field.zone_type).field_border
		};
		ctx.set_stroke_style_str(&border.to_css());
		ctx.set_line_width(if selected { 3.0 } else { 1.0 } * scale.pixel);
		ctx.stroke_rect(left, top, w, h);

		ctx.set_fill_style_str(&theme.text.to_css());
		let _ = ctx.fill_text_with_max_width(&field.field, center.x, center.y, w - 12.0);
	}
}

fn draw_tooltip(
	state: &LineageGraphState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let Some(edge) = state
		.hovered_edge
		.as_deref()
		.and_then(|id| state.elements.edge(id))
	else {
		return;
	};
	let text = edge.tooltip();
	let (x, y) = (state.pointer.0 + 14.0, state.pointer.1 + 14.0);
	let font_px = config.tooltip_font_px;

	ctx.set_font(&format!("{font_px}px sans-serif"));
	let text_width = ctx
		.measure_text(&text)
		.map(|m| m.width())
		.unwrap_or(text.len() as f64 * font_px * 0.6);
	let (pad, box_h) = (6.0, font_px + 12.0);

	ctx.set_fill_style_str(&theme.tooltip_fill.to_css());
	ctx.fill_rect(x, y, text_width + pad * 2.0, box_h);
	ctx.set_fill_style_str(&theme.tooltip_text.to_css());
	ctx.set_text_align("left");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(&text, x + pad, y + box_h / 2.0);
}
