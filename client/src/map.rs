use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use leptos::prelude::*;
use shires_shared::style::Interaction;
use shires_shared::zoom::normalize_wheel_delta;
use shires_shared::{GestureOutcome, MapLayout, PanZoom, RenderedFeature, ZoomConfig};
use wasm_bindgen::JsCast;
use web_sys::{PointerEvent, WheelEvent};

/// Zoom step for the on-map +/- buttons.
const BUTTON_ZOOM_FACTOR: f64 = 2.0;

/// Fill for one feature given its bound unit and current interaction state.
pub(crate) type FillFn = Callback<(Option<String>, Interaction), &'static str>;

/// Where the svg viewport sits on screen. The svg keeps its aspect ratio
/// (`xMidYMid meet`), so the drawing is uniformly scaled and centred inside
/// the element box.
#[derive(Clone, Copy)]
struct ScreenFrame {
    left: f64,
    top: f64,
    offset_x: f64,
    offset_y: f64,
    units_per_px: f64,
}

impl ScreenFrame {
    fn of(target: Option<web_sys::EventTarget>, layout: MapLayout) -> Self {
        let Some(el) = target.and_then(|t| t.dyn_into::<web_sys::Element>().ok()) else {
            return Self::identity(0.0, 0.0);
        };
        let rect = el.get_bounding_client_rect();
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return Self::identity(rect.left(), rect.top());
        }
        let units_per_px = (layout.width / rect.width()).max(layout.height / rect.height());
        Self {
            left: rect.left(),
            top: rect.top(),
            offset_x: (rect.width() - layout.width / units_per_px) / 2.0,
            offset_y: (rect.height() - layout.height / units_per_px) / 2.0,
            units_per_px,
        }
    }

    fn identity(left: f64, top: f64) -> Self {
        Self {
            left,
            top,
            offset_x: 0.0,
            offset_y: 0.0,
            units_per_px: 1.0,
        }
    }

    /// Client (CSS px) coordinates to viewBox units.
    fn to_map(self, client_x: f64, client_y: f64) -> (f64, f64) {
        (
            (client_x - self.left - self.offset_x) * self.units_per_px,
            (client_y - self.top - self.offset_y) * self.units_per_px,
        )
    }
}

fn to_map_coords(
    target: Option<web_sys::EventTarget>,
    client_x: f64,
    client_y: f64,
    layout: MapLayout,
) -> (f64, f64) {
    ScreenFrame::of(target, layout).to_map(client_x, client_y)
}

fn touch_distance(t0: &web_sys::Touch, t1: &web_sys::Touch) -> f64 {
    let dx = (t1.client_x() - t0.client_x()) as f64;
    let dy = (t1.client_y() - t0.client_y()) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Pannable, zoomable svg map of pre-projected features.
///
/// Pan/zoom state lives here and is dropped with the component, so leaving
/// a screen and coming back starts from the identity transform.
#[component]
pub fn MapView(
    layout: MapLayout,
    zoom: ZoomConfig,
    features: Arc<Vec<RenderedFeature>>,
    fill: FillFn,
    on_hover: Callback<Option<String>>,
    on_select: Callback<String>,
    #[prop(optional)] stroke: Option<(&'static str, f64)>,
) -> impl IntoView {
    let pan_zoom = Rc::new(RefCell::new(PanZoom::new(zoom)));
    let transform = RwSignal::new(pan_zoom.borrow().transform());
    // Index into `features`, not the dataset key.
    let hovered: RwSignal<Option<usize>> = RwSignal::new(None);
    let pressed: RwSignal<Option<usize>> = RwSignal::new(None);
    let pinch_dist = Rc::new(Cell::new(0.0_f64));

    let unit_at = {
        let features = features.clone();
        move |idx: usize| features.get(idx).and_then(|f| f.unit.clone())
    };

    let on_wheel = {
        let pan_zoom = pan_zoom.clone();
        move |e: WheelEvent| {
            e.prevent_default();
            let delta = normalize_wheel_delta(e.delta_y(), e.delta_mode());
            let (x, y) = to_map_coords(
                e.current_target(),
                e.client_x() as f64,
                e.client_y() as f64,
                layout,
            );
            transform.set(pan_zoom.borrow_mut().zoom_at(delta, x, y));
        }
    };

    let on_pointer_down = {
        let pan_zoom = pan_zoom.clone();
        move |e: PointerEvent| {
            if e.button() != 0 {
                return;
            }
            let frame = ScreenFrame::of(e.current_target(), layout);
            let (x, y) = frame.to_map(e.client_x() as f64, e.client_y() as f64);
            let mut pz = pan_zoom.borrow_mut();
            pz.set_units_per_px(frame.units_per_px);
            pz.pointer_down(x, y);
        }
    };

    let on_pointer_move = {
        let pan_zoom = pan_zoom.clone();
        move |e: PointerEvent| {
            let (x, y) = to_map_coords(
                e.current_target(),
                e.client_x() as f64,
                e.client_y() as f64,
                layout,
            );
            let mut pz = pan_zoom.borrow_mut();
            let was_panning = pz.is_panning();
            let Some(next) = pz.pointer_move(x, y) else {
                return;
            };
            drop(pz);
            transform.set(next);

            if !was_panning {
                // The press became a pan: nothing under it may be selected now.
                pressed.set(None);
                if let Some(el) = e
                    .current_target()
                    .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                {
                    el.set_pointer_capture(e.pointer_id()).ok();
                }
            }
        }
    };

    let on_pointer_up = {
        let pan_zoom = pan_zoom.clone();
        move |e: PointerEvent| {
            let (x, y) = to_map_coords(
                e.current_target(),
                e.client_x() as f64,
                e.client_y() as f64,
                layout,
            );
            let outcome = pan_zoom.borrow_mut().pointer_up(x, y);
            let target = pressed.get_untracked();
            pressed.set(None);
            if let Some(el) = e
                .current_target()
                .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
            {
                el.release_pointer_capture(e.pointer_id()).ok();
            }
            if outcome == GestureOutcome::Click
                && let Some(unit) = target.and_then(&unit_at)
            {
                on_select.run(unit);
            }
        }
    };

    let cancel_gesture = {
        let pan_zoom = pan_zoom.clone();
        move || {
            pan_zoom.borrow_mut().pointer_cancel();
            pressed.set(None);
        }
    };

    let on_pointer_leave = {
        let pan_zoom = pan_zoom.clone();
        let cancel_gesture = cancel_gesture.clone();
        move |_: PointerEvent| {
            // A captured pan keeps receiving events; only an un-captured press ends here.
            let pz = pan_zoom.borrow();
            let uncaptured_press = pz.is_pressed() && !pz.is_panning();
            drop(pz);
            if uncaptured_press {
                cancel_gesture();
            }
        }
    };

    let on_pointer_cancel = {
        let cancel_gesture = cancel_gesture.clone();
        move |_: PointerEvent| cancel_gesture()
    };

    let on_touch_start = {
        let pinch_dist = pinch_dist.clone();
        let cancel_gesture = cancel_gesture.clone();
        move |e: web_sys::TouchEvent| {
            let touches = e.touches();
            if touches.length() == 2 {
                e.prevent_default();
                cancel_gesture();
                let (Some(t0), Some(t1)) = (touches.get(0), touches.get(1)) else {
                    return;
                };
                pinch_dist.set(touch_distance(&t0, &t1));
            }
        }
    };

    let on_touch_move = {
        let pinch_dist = pinch_dist.clone();
        let pan_zoom = pan_zoom.clone();
        move |e: web_sys::TouchEvent| {
            let touches = e.touches();
            if touches.length() == 2 {
                e.prevent_default();
                let (Some(t0), Some(t1)) = (touches.get(0), touches.get(1)) else {
                    return;
                };
                let new_dist = touch_distance(&t0, &t1);
                let old_dist = pinch_dist.get();

                if old_dist > 0.0 && new_dist > 0.0 {
                    let mid_x = (t0.client_x() + t1.client_x()) as f64 / 2.0;
                    let mid_y = (t0.client_y() + t1.client_y()) as f64 / 2.0;
                    let (x, y) = to_map_coords(e.current_target(), mid_x, mid_y, layout);
                    transform.set(pan_zoom.borrow_mut().zoom_by(new_dist / old_dist, x, y));
                }

                pinch_dist.set(new_dist);
            }
        }
    };

    let zoom_button = {
        let pan_zoom = pan_zoom.clone();
        move |factor: f64| {
            let pan_zoom = pan_zoom.clone();
            move |_: web_sys::MouseEvent| {
                let next = pan_zoom
                    .borrow_mut()
                    .zoom_by(factor, layout.width / 2.0, layout.height / 2.0);
                transform.set(next);
            }
        }
    };

    let (stroke_color, stroke_width) = match stroke {
        Some((color, width)) => (Some(color), Some(width.to_string())),
        None => (None, None),
    };

    let paths = features
        .iter()
        .enumerate()
        .map(|(idx, feature)| {
            let unit = feature.unit.clone();
            let data_unit = unit.clone().unwrap_or_default();
            let fill_unit = unit.clone();
            let interaction = move || {
                if pressed.get() == Some(idx) {
                    Interaction::Pressed
                } else if hovered.get() == Some(idx) {
                    Interaction::Hovered
                } else {
                    Interaction::Idle
                }
            };
            view! {
                <path
                    d=feature.path.clone()
                    data-unit=data_unit
                    fill=move || fill.run((fill_unit.clone(), interaction()))
                    stroke=stroke_color
                    stroke-width=stroke_width.clone()
                    style="outline: none;"
                    on:pointerenter=move |_: PointerEvent| {
                        hovered.set(Some(idx));
                        on_hover.run(unit.clone());
                    }
                    on:pointerleave=move |_: PointerEvent| {
                        if hovered.get_untracked() == Some(idx) {
                            hovered.set(None);
                        }
                        on_hover.run(None);
                    }
                    on:pointerdown=move |e: PointerEvent| {
                        if e.button() == 0 {
                            pressed.set(Some(idx));
                        }
                    }
                />
            }
        })
        .collect_view();

    let view_box = format!("0 0 {} {}", layout.width, layout.height);

    view! {
        <div class="map-frame" style="position: relative; max-width: 100%;">
            <svg
                viewBox=view_box
                width=layout.width.to_string()
                height=layout.height.to_string()
                style="display: block; max-width: 100%; height: auto; touch-action: none; user-select: none; cursor: grab;"
                on:wheel=on_wheel
                on:pointerdown=on_pointer_down
                on:pointermove=on_pointer_move
                on:pointerup=on_pointer_up
                on:pointerleave=on_pointer_leave
                on:pointercancel=on_pointer_cancel
                on:touchstart=on_touch_start
                on:touchmove=on_touch_move
            >
                <rect
                    width=layout.width.to_string()
                    height=layout.height.to_string()
                    fill="transparent"
                />
                <g transform=move || transform.get().to_svg()>{paths}</g>
            </svg>
            <div
                class="map-zoom-controls"
                style="position: absolute; right: 8px; bottom: 8px; display: flex; flex-direction: column; gap: 4px;"
            >
                <button title="Zoom in" on:click=zoom_button(BUTTON_ZOOM_FACTOR)>"+"</button>
                <button title="Zoom out" on:click=zoom_button(1.0 / BUTTON_ZOOM_FACTOR)>"−"</button>
            </div>
        </div>
    }
}
