use std::cell::RefCell;
use std::sync::Arc;

use gloo_storage::Storage;
use leptos::prelude::*;
use serde::{Deserialize, Serialize};
use shires_shared::RegionConfig;
use shires_shared::config::MOBILE_BREAKPOINT_PX;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use crate::data::{self, RegionData};
use crate::quiz::QuizScreen;
use crate::study::StudyScreen;

const SCREEN_STORAGE_KEY: &str = "shires_screen";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Screen {
    #[default]
    Home,
    Study,
    Quiz,
}

#[derive(Clone, Copy)]
pub(crate) struct CurrentScreen(pub RwSignal<Screen>);

#[derive(Clone)]
pub(crate) enum LoadState {
    Loading,
    Ready(Arc<RegionData>),
    Failed(String),
}

struct ResizeBinding {
    window: web_sys::Window,
    _handler: Closure<dyn Fn()>,
}

thread_local! {
    static RESIZE_BINDING: RefCell<Option<ResizeBinding>> = const { RefCell::new(None) };
}

/// The screen to switch to, or `None` when `requested` is already showing.
fn navigation_target(current: Screen, requested: Screen) -> Option<Screen> {
    (current != requested).then_some(requested)
}

/// Switch screens. Re-selecting the current screen keeps its state.
fn navigate(screen: RwSignal<Screen>, requested: Screen) {
    if let Some(next) = navigation_target(screen.get_untracked(), requested) {
        screen.set(next);
    }
}

pub(crate) fn window_width() -> f64 {
    web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|v| v.as_f64())
        .unwrap_or(1024.0)
}

#[component]
pub fn App() -> impl IntoView {
    let saved: Screen = gloo_storage::LocalStorage::get(SCREEN_STORAGE_KEY).unwrap_or_default();
    let screen = RwSignal::new(saved);
    let load: RwSignal<LoadState> = RwSignal::new(LoadState::Loading);
    let viewport_width = RwSignal::new(window_width());
    let mobile = Memo::new(move |_| viewport_width.get() < MOBILE_BREAKPOINT_PX);
    // Screens are rebuilt only when the screen actually changes.
    let active_screen = Memo::new(move |_| screen.get());

    provide_context(CurrentScreen(screen));

    wasm_bindgen_futures::spawn_local(async move {
        match data::load_region_data().await {
            Ok(region) => load.set(LoadState::Ready(Arc::new(region))),
            Err(e) => {
                web_sys::console::warn_1(&format!("Map data failed to load: {e}").into());
                load.set(LoadState::Failed(e));
            }
        }
    });

    Effect::new(move || {
        let _ = gloo_storage::LocalStorage::set(SCREEN_STORAGE_KEY, screen.get());
    });

    // Track the window width so the study map can switch to its tall layout.
    Effect::new(move || {
        let Some(window) = web_sys::window() else {
            return;
        };

        RESIZE_BINDING.with(|slot| {
            if let Some(old) = slot.borrow_mut().take() {
                let _ = old.window.remove_event_listener_with_callback(
                    "resize",
                    old._handler.as_ref().unchecked_ref(),
                );
            }
        });

        let handler = Closure::<dyn Fn()>::new(move || {
            viewport_width.set(window_width());
        });
        if window
            .add_event_listener_with_callback("resize", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            RESIZE_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(ResizeBinding {
                    window,
                    _handler: handler,
                });
            });
        }
    });

    let title = move || match load.get() {
        LoadState::Ready(data) => data.config.title.clone(),
        _ => RegionConfig::default().title,
    };

    let content = move || match (active_screen.get(), load.get()) {
        (Screen::Home, _) => {
            view! { <p class="home-hint">"Select study or quiz mode"</p> }.into_any()
        }
        (_, LoadState::Loading) => {
            view! { <p class="status">"Loading map data..."</p> }.into_any()
        }
        (_, LoadState::Failed(e)) => view! {
            <p class="status status-error">{format!("Could not load map data: {e}")}</p>
        }
        .into_any(),
        (Screen::Study, LoadState::Ready(data)) => {
            // Remount only when crossing the mobile breakpoint.
            mobile.track();
            view! { <StudyScreen data=data viewport_width=viewport_width.get_untracked() /> }
                .into_any()
        }
        (Screen::Quiz, LoadState::Ready(data)) => view! {
            <QuizScreen data=data viewport_width=viewport_width.get_untracked() />
        }
        .into_any(),
    };

    view! {
        <div class="app">
            <Header title=Signal::derive(title) />
            <main class="app-main">{content}</main>
        </div>
    }
}

#[component]
fn Header(title: Signal<String>) -> impl IntoView {
    let CurrentScreen(screen) = expect_context();
    let nav_class = move |target: Screen| {
        move || {
            if screen.get() == target {
                "nav-button nav-button-active"
            } else {
                "nav-button"
            }
        }
    };

    view! {
        <header class="app-header">
            <a
                class="app-title"
                href="#"
                on:click=move |e: web_sys::MouseEvent| {
                    e.prevent_default();
                    navigate(screen, Screen::Home);
                }
            >
                {move || title.get()}
            </a>
            <nav class="app-nav">
                <button class=nav_class(Screen::Study) on:click=move |_| navigate(screen, Screen::Study)>
                    "Study"
                </button>
                <button class=nav_class(Screen::Quiz) on:click=move |_| navigate(screen, Screen::Quiz)>
                    "Quiz"
                </button>
            </nav>
        </header>
    }
}
