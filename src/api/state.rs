use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::commands::Bot;

#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<Bot>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(bot: Arc<Bot>) -> Self {
        Self {
            bot,
            started_at: Utc::now(),
        }
    }
}
