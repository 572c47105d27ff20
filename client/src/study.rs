use std::sync::Arc;

use leptos::prelude::*;
use shires_shared::style::{Interaction, STUDY_STROKE, STUDY_STROKE_WIDTH, study_fill};
use shires_shared::{Mode, StudyState};

use crate::data::RegionData;
use crate::map::MapView;

/// Hover (or tap) a unit to see its name in the side panel.
#[component]
pub fn StudyScreen(data: Arc<RegionData>, viewport_width: f64) -> impl IntoView {
    let layout = data.config.layout(Mode::Study, viewport_width);
    let zoom = data.config.zoom_config(Mode::Study, layout);
    let features = data.features(layout);
    let unit_type = data.config.unit_type.clone();
    let study = RwSignal::new(StudyState::new(&unit_type));

    let fill = Callback::new(|(_, interaction): (Option<String>, Interaction)| {
        study_fill(interaction)
    });
    let on_hover = Callback::new(move |unit: Option<String>| {
        study.update(|s| match unit {
            Some(unit) => s.select(unit),
            None => s.clear(),
        });
    });
    let on_select = Callback::new(move |unit: String| study.update(|s| s.select(unit)));

    view! {
        <section class="study-screen">
            <div class="study-panel">
                <p class="study-message">{move || study.with(|s| s.message().to_owned())}</p>
                <p class="study-label">{move || study.with(|s| s.label(&unit_type))}</p>
            </div>
            <MapView
                layout=layout
                zoom=zoom
                features=features
                fill=fill
                on_hover=on_hover
                on_select=on_select
                stroke=(STUDY_STROKE, STUDY_STROKE_WIDTH)
            />
        </section>
    }
}
