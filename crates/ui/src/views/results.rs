use dioxus::prelude::*;
use dioxus_router::Link;

use crate::routes::Route;

fn score_summary(correct: u32, total: u32) -> String {
    if total == 0 {
        return "No questions were played.".to_string();
    }
    let percent = correct * 100 / total;
    format!("You scored {correct} out of {total} ({percent}%).")
}

#[component]
pub fn ResultsView(correct: u32, total: u32) -> Element {
    rsx! {
        div { class: "page results-page",
            header { class: "view-header",
                h2 { class: "view-title", "Quiz Finished" }
            }
            p { class: "results-score", "{score_summary(correct, total)}" }
            Link { class: "btn btn-primary", to: Route::Home {}, "Play Again" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_includes_counts_and_percent() {
        assert_eq!(score_summary(7, 10), "You scored 7 out of 10 (70%).");
        assert_eq!(score_summary(0, 5), "You scored 0 out of 5 (0%).");
        assert_eq!(score_summary(5, 5), "You scored 5 out of 5 (100%).");
    }

    #[test]
    fn summary_handles_zero_total() {
        assert_eq!(score_summary(0, 0), "No questions were played.");
    }
}
