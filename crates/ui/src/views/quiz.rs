use chrono::Utc;
use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use services::{QuizError, QuizSession};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};

/// Everything the view needs to render the current question.
#[derive(Clone, Debug, PartialEq)]
struct QuestionCard {
    number: usize,
    total: usize,
    score: u32,
    category: String,
    text: String,
    choices: Vec<String>,
}

fn question_card(session: &QuizSession) -> Option<QuestionCard> {
    let prepared = session.current_question()?;
    Some(QuestionCard {
        number: session.answered_count() + 1,
        total: session.total_questions(),
        score: session.score(),
        category: prepared.question().category().to_string(),
        text: prepared.question().text().to_string(),
        choices: prepared.choices().to_vec(),
    })
}

fn progress_line(card: &QuestionCard) -> String {
    format!(
        "Question {} of {} \u{2022} Score {}",
        card.number, card.total, card.score
    )
}

#[component]
pub fn QuizView(count: u32) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();

    let error = use_signal(|| None::<ViewError>);
    let vm = use_signal(|| None::<QuizSession>);

    let quiz = ctx.quiz();
    let resource = use_resource(move || {
        let quiz = quiz.clone();
        let mut vm = vm;
        let mut error = error;
        async move {
            let session = quiz.start(count).await.map_err(|err| match err {
                QuizError::Empty => ViewError::Empty,
                _ => ViewError::Unknown,
            })?;
            vm.set(Some(session));
            error.set(None);
            Ok::<_, ViewError>(())
        }
    });

    let state = view_state_from_resource(&resource);
    let card = vm.read().as_ref().and_then(question_card);

    let answer = use_callback(move |choice_index: usize| {
        let mut vm = vm;
        let mut error = error;
        let nav = navigator;
        let mut finished = None;
        {
            let mut guard = vm.write();
            if let Some(session) = guard.as_mut() {
                match session.answer_current(choice_index, Utc::now()) {
                    Ok(_) => {
                        if session.is_complete() {
                            let total = u32::try_from(session.total_questions()).unwrap_or(0);
                            finished = Some((session.score(), total));
                        }
                    }
                    Err(_) => error.set(Some(ViewError::Unknown)),
                }
            }
        }
        if let Some((correct, total)) = finished {
            let _ = nav.push(Route::Results { correct, total });
        }
    });

    rsx! {
        div { class: "page quiz-page",
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "view-error", "{err.message()}" }
                    Link { class: "btn btn-secondary", to: Route::Home {}, "Back" }
                },
                ViewState::Ready(()) => {
                    match card {
                        Some(card) => {
                            let progress = progress_line(&card);
                            let choices = card.choices.iter().enumerate().map(|(idx, choice)| {
                                let answer = answer;
                                let choice = choice.clone();
                                rsx! {
                                    button {
                                        class: "btn quiz-choice",
                                        r#type: "button",
                                        onclick: move |_| answer.call(idx),
                                        "{choice}"
                                    }
                                }
                            });
                            rsx! {
                                p { class: "quiz-progress", "{progress}" }
                                p { class: "quiz-category", "{card.category}" }
                                h2 { class: "quiz-question", "{card.text}" }
                                if let Some(err) = error() {
                                    p { class: "view-error", "{err.message()}" }
                                }
                                div { class: "quiz-choices", {choices} }
                                Link { class: "quiz-quit", to: Route::Home {}, "Quit" }
                            }
                        }
                        // The session exists but has no current question: the
                        // last answer just navigated away, or is about to.
                        None => rsx! {
                            p { "Loading..." }
                        },
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Difficulty, QuestionDraft, QuestionId, QuestionKind};
    use quiz_core::time::fixed_now;

    fn session() -> QuizSession {
        let question = QuestionDraft {
            text: "Two plus two?".to_string(),
            correct_answer: "Four".to_string(),
            incorrect_answers: vec!["Three".to_string(), "Five".to_string()],
            category: "Mathematics".to_string(),
            difficulty: Difficulty::Easy,
            kind: QuestionKind::Multiple,
        }
        .validate(fixed_now())
        .unwrap()
        .assign_id(QuestionId::new(1));
        QuizSession::new(vec![question], fixed_now()).unwrap()
    }

    #[test]
    fn question_card_reflects_session_state() {
        let session = session();
        let card = question_card(&session).expect("fresh session has a question");

        assert_eq!(card.number, 1);
        assert_eq!(card.total, 1);
        assert_eq!(card.score, 0);
        assert_eq!(card.text, "Two plus two?");
        assert_eq!(card.choices.len(), 3);
    }

    #[test]
    fn question_card_is_none_when_finished() {
        let mut session = session();
        session.answer_current(0, fixed_now()).unwrap();
        assert!(question_card(&session).is_none());
    }

    #[test]
    fn progress_line_formats_counts() {
        let card = QuestionCard {
            number: 3,
            total: 10,
            score: 2,
            category: String::new(),
            text: String::new(),
            choices: Vec::new(),
        };
        assert_eq!(progress_line(&card), "Question 3 of 10 \u{2022} Score 2");
    }
}
