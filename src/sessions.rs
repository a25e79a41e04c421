use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::services::selection::{SelectionPhase, SelectionSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("selection session not found")]
    NotFound,
    #[error("selection session already submitted")]
    Submitted,
    #[error("checkout of this selection is already in progress")]
    CheckoutInProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Selecting,
    CheckingOut,
    Submitted,
}

/// Что вернул шлюз после передачи заказа.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutReceipt {
    pub order_id: Uuid,
    pub payment_id: Option<String>,
    pub payment_url: Option<String>,
    pub total: f64,
}

#[derive(Debug, Clone)]
pub struct SelectionSession {
    pub id: Uuid,
    pub selection: SelectionSet,
    pub receipt: Option<CheckoutReceipt>,
    /// Заказ передан шлюзу, ответа ещё нет.
    pub checkout_pending: bool,
    pub opened_at: DateTime<Utc>,
    pub touched_at: DateTime<Utc>,
}

impl SelectionSession {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            selection: SelectionSet::new(),
            receipt: None,
            checkout_pending: false,
            opened_at: now,
            touched_at: now,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.receipt.is_some() {
            return SessionPhase::Submitted;
        }
        if self.checkout_pending {
            return SessionPhase::CheckingOut;
        }
        match self.selection.phase() {
            SelectionPhase::Idle => SessionPhase::Idle,
            SelectionPhase::Selecting => SessionPhase::Selecting,
        }
    }
}

// Сессии выбора мест живут только в памяти процесса
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SelectionSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Открывает новую сессию с пустым выбором.
    pub async fn open(&self) -> Uuid {
        let session = SelectionSession::new();
        let id = session.id;
        self.sessions.write().await.insert(id, session);
        debug!("Selection session {} opened", id);
        id
    }

    pub async fn contains(&self, id: Uuid) -> bool {
        self.sessions.read().await.contains_key(&id)
    }

    pub async fn snapshot(&self, id: Uuid) -> Result<SelectionSession, SessionError> {
        self.sessions.read().await.get(&id).cloned().ok_or(SessionError::NotFound)
    }

    /// Изменяет выбор сессии. Оформленные и оформляемые сессии не меняются.
    pub async fn update<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut SelectionSet) -> R,
    ) -> Result<(R, SelectionSession), SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound)?;
        ensure_open(session)?;

        let result = f(&mut session.selection);
        session.touched_at = Utc::now();
        Ok((result, session.clone()))
    }

    /// Начинает оформление: сессия блокируется до `mark_submitted` или
    /// `abort_checkout`, возвращается копия выбора для передачи шлюзу.
    pub async fn begin_checkout(&self, id: Uuid) -> Result<SelectionSet, SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound)?;
        ensure_open(session)?;

        session.checkout_pending = true;
        session.touched_at = Utc::now();
        debug!("Selection session {}: checkout started with {} seats", id, session.selection.len());
        Ok(session.selection.clone())
    }

    /// Снимает блокировку после неудачной передачи, выбор остаётся прежним.
    pub async fn abort_checkout(&self, id: Uuid) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound)?;
        if session.receipt.is_some() {
            return Err(SessionError::Submitted);
        }

        session.checkout_pending = false;
        session.touched_at = Utc::now();
        Ok(())
    }

    /// Фиксирует успешную передачу заказа: выбор очищается, сессия закрывается.
    /// Пока идёт оформление, выбор заморожен, так что очищается ровно то,
    /// что ушло в шлюз.
    pub async fn mark_submitted(&self, id: Uuid, receipt: CheckoutReceipt) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound)?;
        if session.receipt.is_some() {
            return Err(SessionError::Submitted);
        }

        info!("Selection session {} submitted as order {}", id, receipt.order_id);
        session.selection.clear();
        session.checkout_pending = false;
        session.receipt = Some(receipt);
        session.touched_at = Utc::now();
        Ok(())
    }

    /// Удаляет сессии, к которым не обращались дольше `max_age`.
    pub async fn sweep_idle(&self, max_age: Duration) -> usize {
        // Возраст больше представимого: ни одна сессия не устарела
        let Some(cutoff) = Utc::now().checked_sub_signed(max_age) else {
            return 0;
        };
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.touched_at >= cutoff);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

fn ensure_open(session: &SelectionSession) -> Result<(), SessionError> {
    if session.receipt.is_some() {
        return Err(SessionError::Submitted);
    }
    if session.checkout_pending {
        return Err(SessionError::CheckoutInProgress);
    }
    Ok(())
}
