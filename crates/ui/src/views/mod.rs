mod home;
mod quiz;
mod results;
mod state;

pub use home::HomeView;
pub use quiz::QuizView;
pub use results::ResultsView;
pub use state::{ViewError, ViewState, view_state_from_resource};
