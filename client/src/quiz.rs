use std::sync::Arc;

use leptos::prelude::*;
use shires_shared::style::{Interaction, QuizMarks, quiz_fill};
use shires_shared::{Mode, QuizState, QuizStatus, SelectionOutcome};

use crate::data::RegionData;
use crate::map::MapView;

#[component]
pub fn QuizScreen(data: Arc<RegionData>, viewport_width: f64) -> impl IntoView {
    let layout = data.config.layout(Mode::Quiz, viewport_width);
    let zoom = data.config.zoom_config(Mode::Quiz, layout);
    let features = data.features(layout);
    let quiz = RwSignal::new(QuizState::initialize(
        &data.registry,
        &mut rand::thread_rng(),
    ));

    let fill = Callback::new(
        move |(unit, interaction): (Option<String>, Interaction)| {
            let marks = unit
                .as_deref()
                .map(|unit| {
                    quiz.with(|q| QuizMarks {
                        completed: q.is_completed(unit),
                        current_target: q.is_current_target(unit),
                    })
                })
                .unwrap_or_default();
            quiz_fill(marks, interaction)
        },
    );

    let on_select = Callback::new(move |unit: String| {
        let outcome = quiz.try_update(|q| q.submit_selection(&unit));
        if outcome == Some(SelectionOutcome::Finished) {
            let (done, total) = quiz.with_untracked(QuizState::progress);
            web_sys::console::info_1(&format!("quiz_finished completed={done} total={total}").into());
        }
    });

    let on_restart = {
        let data = data.clone();
        move |_: web_sys::MouseEvent| {
            quiz.update(|q| q.restart(&data.registry, &mut rand::thread_rng()));
        }
    };

    view! {
        <section class="quiz-screen">
            <div class="quiz-panel">
                <p class="quiz-message">{move || quiz.with(|q| q.message().to_owned())}</p>
                <Show when=move || quiz.with(QuizState::status) == QuizStatus::InProgress>
                    <p class="quiz-target">
                        {move || quiz.with(|q| q.current_target().unwrap_or_default().to_owned())}
                    </p>
                </Show>
                <p class="quiz-progress">
                    {move || {
                        let (done, total) = quiz.with(QuizState::progress);
                        format!("{done} / {total}")
                    }}
                </p>
                <button class="quiz-restart" on:click=on_restart>
                    "Restart"
                </button>
            </div>
            <MapView
                layout=layout
                zoom=zoom
                features=features
                fill=fill
                on_hover=Callback::new(|_: Option<String>| {})
                on_select=on_select
            />
        </section>
    }
}
