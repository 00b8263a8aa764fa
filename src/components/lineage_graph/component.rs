//! Leptos component wrapping the lineage canvas.
//!
//! The component creates an HTML canvas element and wires up mouse/wheel event
//! handlers for panning, zooming, hovering and selection. An animation loop
//! runs via `requestAnimationFrame` and redraws the current scene each frame.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render;
use super::scale::{ScaleConfig, ScaledValues};
use super::state::LineageGraphState;
use super::theme::Theme;
use crate::config::ForceSettings;
use crate::lineage::{LayoutMetrics, LayoutMode};
use crate::session::Scene;

/// Pointer travel (pixels) below which a press counts as a click.
const CLICK_SLOP: f64 = 3.0;

/// Bundles the drawing context with the current scene state.
struct CanvasContext {
	ctx: Option<CanvasRenderingContext2d>,
	state: Option<LineageGraphState>,
	scale: ScaleConfig,
	theme: Theme,
	width: f64,
	height: f64,
}

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|(w, h)| *w > 0.0 && *h > 0.0)
		.unwrap_or((800.0, 600.0))
}

fn set_cursor(canvas: &HtmlCanvasElement, cursor: &str) {
	if let Err(e) = web_sys::HtmlElement::style(canvas).set_property("cursor", cursor) {
		debug!("lineage-graph: could not set cursor: {:?}", e);
	}
}

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?;
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Renders a lineage scene on a canvas sized to its parent.
///
/// A new `scene` replaces the graph (or clears it when `None`). Changing
/// `layout` re-runs the layout; bumping `view_resets` resets the view.
/// Clicks report the id of the field, table or edge under the pointer.
#[component]
pub fn LineageCanvas(
	#[prop(into)] scene: Signal<Option<Scene>>,
	#[prop(into)] layout: Signal<LayoutMode>,
	#[prop(into)] view_resets: Signal<u64>,
	metrics: LayoutMetrics,
	force: ForceSettings,
	#[prop(into)] on_select: Callback<Option<String>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context = Rc::new(RefCell::new(CanvasContext {
		ctx: None,
		state: None,
		scale: ScaleConfig::default(),
		theme: Theme::default(),
		width: 800.0,
		height: 600.0,
	}));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	let (context_init, animate_init, resize_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = parent_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok());
		let Some(ctx) = ctx else {
			warn!("lineage-graph: canvas has no 2d context");
			return;
		};

		{
			let mut c = context_init.borrow_mut();
			c.ctx = Some(ctx);
			c.width = w;
			c.height = h;
			if let Some(state) = c.state.as_mut() {
				state.resize(w, h);
			}
		}

		let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = parent_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			let mut c = context_resize.borrow_mut();
			c.width = nw;
			c.height = nh;
			if let Some(state) = c.state.as_mut() {
				state.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			{
				let c = context_anim.borrow();
				if let Some(ctx) = &c.ctx {
					match &c.state {
						Some(state) => render::render(state, ctx, &c.scale, &c.theme),
						None => render::clear(ctx, c.width, c.height, &c.theme),
					}
				}
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_scene = context.clone();
	Effect::new(move |_| {
		scene.with(|scene| {
			let mut c = context_scene.borrow_mut();
			let (width, height, scale) = (c.width, c.height, c.scale.clone());
			c.state = scene.as_ref().map(|scene| {
				debug!(
					"lineage-graph: drawing {} tables, {} fields, {} edges",
					scene.elements.tables.len(),
					scene.elements.fields.len(),
					scene.elements.edges.len()
				);
				LineageGraphState::new(
					scene.elements.clone(),
					scene.layout,
					metrics.clone(),
					force.clone(),
					width,
					height,
					&scale,
				)
			});
		});
	});

	let context_layout = context.clone();
	Effect::new(move |_| {
		let mode = layout.get();
		view_resets.track();
		let mut c = context_layout.borrow_mut();
		let CanvasContext { state, scale, .. } = &mut *c;
		if let Some(state) = state.as_mut() {
			if state.layout == mode {
				state.reset_view(scale);
			} else {
				state.set_layout(mode, scale);
			}
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(state) = context_md.borrow_mut().state.as_mut() {
			state.pan.active = true;
			state.pan.moved = false;
			state.pan.start_x = x;
			state.pan.start_y = y;
			state.pan.transform_start_x = state.transform.x;
			state.pan.transform_start_y = state.transform.y;
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		let mut c = context_mm.borrow_mut();
		let CanvasContext { state, scale, .. } = &mut *c;
		let Some(state) = state.as_mut() else {
			return;
		};
		state.pointer = (x, y);

		if state.pan.active {
			let (dx, dy) = (x - state.pan.start_x, y - state.pan.start_y);
			if dx.hypot(dy) > CLICK_SLOP {
				state.pan.moved = true;
			}
			state.transform.x = state.pan.transform_start_x + dx;
			state.transform.y = state.pan.transform_start_y + dy;
			return;
		}

		let scaled = ScaledValues::new(scale, state.transform.k);
		let hit = state.hit_test(x, y, &scaled);
		let cursor = if hit.is_some() { "pointer" } else { "grab" };
		state.hovered_edge = hit.filter(|id| state.elements.edge(id).is_some());
		if let Some(canvas) = canvas_ref.get() {
			set_cursor(&canvas, cursor);
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		let selection = {
			let mut c = context_mu.borrow_mut();
			let CanvasContext { state, scale, .. } = &mut *c;
			let Some(state) = state.as_mut() else {
				return;
			};
			let clicked = state.pan.active && !state.pan.moved;
			state.pan.active = false;
			if !clicked {
				return;
			}
			let scaled = ScaledValues::new(scale, state.transform.k);
			state.selected = state.hit_test(x, y, &scaled);
			state.selected.clone()
		};
		on_select.run(selection);
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(state) = context_ml.borrow_mut().state.as_mut() {
			state.pan.active = false;
			state.hovered_edge = None;
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		let mut c = context_wh.borrow_mut();
		let CanvasContext { state, scale, .. } = &mut *c;
		if let Some(state) = state.as_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = scale.clamp_zoom(state.transform.k * factor);
			let ratio = new_k / state.transform.k;
			state.transform.x = x - (x - state.transform.x) * ratio;
			state.transform.y = y - (y - state.transform.y) * ratio;
			state.transform.k = new_k;
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="lineage-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
