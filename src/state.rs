use std::sync::Arc;

use crate::config::Config;
use crate::email::Notifier;
use crate::store::RegistrationStore;

pub type SharedState = Arc<AppState>;

/// Collaborators built once at startup and shared by every request.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn RegistrationStore>,
    pub notifier: Option<Arc<dyn Notifier>>,
}
