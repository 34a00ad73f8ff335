use dioxus::prelude::*;
use dioxus_router::use_navigator;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct HomeData {
    stored: u64,
}

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let mut count = use_signal(|| ctx.default_question_count());

    let quiz = ctx.quiz();
    let resource = use_resource(move || {
        let quiz = quiz.clone();
        async move {
            let stored = quiz.stored_count().await.map_err(|_| ViewError::Unknown)?;
            Ok::<_, ViewError>(HomeData { stored })
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page home-page",
            header { class: "view-header",
                h2 { class: "view-title", "Start a Quiz" }
                p { class: "view-subtitle", "Pick how many questions to play." }
            }
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "view-error", "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| {
                            let mut resource = resource;
                            resource.restart();
                        },
                        "Retry"
                    }
                },
                ViewState::Ready(data) => {
                    let empty_message = ViewError::Empty.message();
                    rsx! {
                        if data.stored == 0 {
                            p { class: "home-empty", "{empty_message}" }
                        } else {
                            p { class: "home-bank", "{data.stored} questions in the bank." }
                            div { class: "home-controls",
                                label { r#for: "question-count", "Questions" }
                                input {
                                    id: "question-count",
                                    r#type: "number",
                                    min: "1",
                                    max: "50",
                                    value: "{count()}",
                                    oninput: move |evt| {
                                        if let Ok(parsed) = evt.value().parse::<u32>() {
                                            count.set(parsed.clamp(1, 50));
                                        }
                                    },
                                }
                                button {
                                    class: "btn btn-primary",
                                    r#type: "button",
                                    onclick: move |_| {
                                        let _ = navigator.push(Route::Quiz { count: count() });
                                    },
                                    "Start Quiz"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
