use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info};

use crate::AppState;

pub struct CleanupService {
    state: Arc<AppState>,
}

impl CleanupService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Удаляет брошенные сессии выбора мест
    pub async fn run_session_cleanup(&self) -> usize {
        // TTL вне диапазона chrono: считаем сессии вечными
        let ttl = Duration::try_seconds(self.state.config.sessions.idle_ttl_seconds).unwrap_or(Duration::MAX);
        let removed = self.state.sessions.sweep_idle(ttl).await;

        if removed == 0 {
            debug!("🧹 No idle selection sessions to cleanup");
        } else {
            info!(
                "🧹 Removed {} idle selection sessions, {} still open",
                removed,
                self.state.sessions.len().await
            );
        }
        removed
    }

    /// Бесконечный цикл очистки, запускается фоновой задачей
    pub async fn run_forever(self) {
        let interval = std::time::Duration::from_secs(self.state.config.sessions.sweep_interval_seconds.max(1));
        loop {
            tokio::time::sleep(interval).await;
            self.run_session_cleanup().await;
        }
    }
}
