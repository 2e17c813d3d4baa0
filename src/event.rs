use crate::auth::User;
use crate::completion::CompletionError;

/// Messages delivered to the UI thread from background work.
#[derive(Debug)]
pub enum AppEvent {
    CompletionSettled {
        generation: u64,
        result: Result<String, CompletionError>,
    },
    AuthStateChanged(Option<User>),
}
