use crate::backend::HttpBackend;
use crate::session::Session;

#[derive(Clone)]
pub struct AppState {
    pub session: Session<HttpBackend>,
}

impl AppState {
    pub fn new(session: Session<HttpBackend>) -> Self {
        Self { session }
    }
}
