use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::views::{HomeView, QuizView, ResultsView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/quiz/:count", QuizView)] Quiz { count: u32 },
        #[route("/results/:correct/:total", ResultsView)] Results { correct: u32, total: u32 },
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            header { class: "topbar",
                h1 { "Trivia Quiz" }
                nav {
                    Link { to: Route::Home {}, "Home" }
                }
            }
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}
