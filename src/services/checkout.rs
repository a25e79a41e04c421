//! checkout.rs
//!
//! Передача выбранных мест внешнему платежному шлюзу.
//!
//! Ключевые компоненты:
//! 1.  **CircuitBreaker**: "Автоматический выключатель", который перестает
//!     отправлять запросы к шлюзу после серии сбоев.
//! 2.  **CheckoutHandoff**: неизменяемый снимок заказа - строки {секция, ряд,
//!     место, цена} и итоговая сумма.
//! 3.  **CheckoutClient**: HTTP-клиент шлюза; все вызовы идут через `CircuitBreaker`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::{CheckoutConfig, CircuitBreakerConfig};
use crate::services::pricing::{to_minor_units, PriceAggregator};
use crate::services::selection::SelectionSet;

/// Состояния "Автоматического выключателя".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CircuitState {
    /// Нормальный режим, запросы разрешены.
    Closed,
    /// Запросы запрещены до истечения таймаута.
    Open,
    /// Разрешен пробный запрос.
    HalfOpen,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    state: RwLock<CircuitState>,
    /// Счетчик последовательных сбоев.
    failure_count: AtomicU32,
    last_failure: Mutex<Option<Instant>>,
    failure_threshold: u32,
    timeout_duration: Duration,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, timeout: Duration) -> Self {
        Self {
            state: RwLock::new(CircuitState::Closed),
            failure_count: AtomicU32::new(0),
            last_failure: Mutex::new(None),
            failure_threshold: failure_threshold.max(1),
            timeout_duration: timeout,
        }
    }

    pub fn from_config(config: &CircuitBreakerConfig) -> Self {
        Self::new(config.failure_threshold, Duration::from_secs(config.timeout_seconds))
    }

    /// Проверяет, можно ли выполнить следующий запрос.
    pub fn can_execute(&self) -> bool {
        let current = *self.state.read().unwrap_or_else(PoisonError::into_inner);

        match current {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let last_failure = *self.last_failure.lock().unwrap_or_else(PoisonError::into_inner);
                let expired = last_failure.map_or(true, |at| at.elapsed() >= self.timeout_duration);

                if expired {
                    *self.state.write().unwrap_or_else(PoisonError::into_inner) = CircuitState::HalfOpen;
                    info!("Circuit breaker transitioning to HalfOpen state");
                }
                expired
            }
        }
    }

    pub fn record_success(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if *state == CircuitState::HalfOpen {
            info!("Circuit breaker recovered - transitioning to Closed state");
        }
        *state = CircuitState::Closed;
        self.failure_count.store(0, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        let failure_count = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        *self.last_failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        match *state {
            CircuitState::Closed if failure_count >= self.failure_threshold => {
                *state = CircuitState::Open;
                error!(
                    "Circuit breaker OPENED - {} failures reached threshold {}",
                    failure_count, self.failure_threshold
                );
            }
            // Пробный запрос провалился
            CircuitState::HalfOpen => {
                *state = CircuitState::Open;
                warn!("Circuit breaker test failed - returning to Open state");
            }
            _ => {}
        }
    }

    pub fn get_state(&self) -> CircuitState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("nothing selected")]
    EmptySelection,
    #[error("circuit breaker is open - payment gateway temporarily unavailable")]
    CircuitOpen,
    #[error("payment gateway error: {0}")]
    Gateway(#[from] reqwest::Error),
    #[error("payment gateway rejected the order: {0}")]
    Rejected(String),
}

/// Строка заказа, передаваемая шлюзу.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutLine {
    pub section: String,
    pub row: String,
    #[serde(rename = "seatNumber")]
    pub seat_number: u32,
    pub price: f64,
}

/// Снимок заказа на момент нажатия "Proceed to Checkout".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutHandoff {
    #[serde(rename = "orderId")]
    pub order_id: Uuid,
    pub lines: Vec<CheckoutLine>,
    pub subtotal: f64,
    #[serde(rename = "serviceFee")]
    pub service_fee: f64,
    pub total: f64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl CheckoutHandoff {
    pub fn from_selection(selection: &SelectionSet, pricing: &PriceAggregator) -> Result<Self, CheckoutError> {
        if selection.is_empty() {
            return Err(CheckoutError::EmptySelection);
        }

        let summary = pricing.summary(selection);
        let lines = selection
            .iter()
            .map(|seat| CheckoutLine {
                section: seat.section_id.clone(),
                row: seat.row_label.clone(),
                seat_number: seat.seat_number,
                price: seat.price,
            })
            .collect();

        Ok(Self {
            order_id: Uuid::new_v4(),
            lines,
            subtotal: summary.subtotal,
            service_fee: summary.service_fee,
            total: summary.total,
            created_at: Utc::now(),
        })
    }
}

/// Запрос на инициацию оплаты заказа.
#[derive(Debug, Serialize)]
struct CheckoutInitRequest<'a> {
    #[serde(rename = "teamSlug")]
    team_slug: &'a str,
    token: String,
    amount: i64,
    currency: &'a str,
    #[serde(rename = "successURL")]
    success_url: &'a str,
    #[serde(rename = "failURL")]
    fail_url: &'a str,
    #[serde(flatten)]
    order: &'a CheckoutHandoff,
}

/// Ответ шлюза на инициацию оплаты.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutInitResponse {
    pub success: bool,
    #[serde(rename = "paymentId")]
    pub payment_id: Option<String>,
    #[serde(rename = "paymentURL")]
    pub payment_url: Option<String>,
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct CheckoutClient {
    team_slug: String,
    password: String,
    base_url: String,
    currency: String,
    success_url: String,
    fail_url: String,
    http_client: reqwest::Client,
    circuit_breaker: std::sync::Arc<CircuitBreaker>,
}

impl CheckoutClient {
    pub fn from_config(
        config: &CheckoutConfig,
        breaker: &CircuitBreakerConfig,
        currency: &str,
    ) -> Result<Self, CheckoutError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            team_slug: config.merchant_id.clone(),
            password: config.merchant_password.clone(),
            base_url: config.gateway_url.trim_end_matches('/').to_string(),
            currency: currency.to_string(),
            success_url: config.success_url.clone(),
            fail_url: config.fail_url.clone(),
            http_client,
            circuit_breaker: std::sync::Arc::new(CircuitBreaker::from_config(breaker)),
        })
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.get_state()
    }

    /// Выполняет запрос, пропуская его через Circuit Breaker.
    async fn execute_with_circuit_breaker<F, T>(&self, operation: F) -> Result<T, CheckoutError>
    where
        F: std::future::Future<Output = Result<T, reqwest::Error>>,
    {
        if !self.circuit_breaker.can_execute() {
            warn!("Circuit breaker is OPEN - blocking payment gateway request");
            return Err(CheckoutError::CircuitOpen);
        }

        match operation.await {
            Ok(result) => {
                self.circuit_breaker.record_success();
                Ok(result)
            }
            Err(e) => {
                error!("Payment gateway request failed: {:?}", e);
                self.circuit_breaker.record_failure();
                Err(CheckoutError::Gateway(e))
            }
        }
    }

    /// Токен запроса: sha256(amount + currency + orderId + password + teamSlug).
    fn generate_init_token(&self, amount: i64, order_id: &Uuid) -> String {
        let token_string = format!(
            "{}{}{}{}{}",
            amount, self.currency, order_id, self.password, self.team_slug
        );
        let mut hasher = Sha256::new();
        hasher.update(token_string.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Передает заказ шлюзу. Успехом считается только `success: true`.
    pub async fn submit(&self, handoff: &CheckoutHandoff) -> Result<CheckoutInitResponse, CheckoutError> {
        if handoff.lines.is_empty() {
            return Err(CheckoutError::EmptySelection);
        }

        let amount = to_minor_units(handoff.total);
        let request = CheckoutInitRequest {
            team_slug: &self.team_slug,
            token: self.generate_init_token(amount, &handoff.order_id),
            amount,
            currency: &self.currency,
            success_url: &self.success_url,
            fail_url: &self.fail_url,
            order: handoff,
        };

        info!(
            "Submitting order {}: {} seats, amount={} {}",
            handoff.order_id,
            handoff.lines.len(),
            amount,
            self.currency
        );

        let operation = async {
            self.http_client
                .post(format!("{}/checkout/init", self.base_url))
                .json(&request)
                .send()
                .await?
                .error_for_status()?
                .json::<CheckoutInitResponse>()
                .await
        };

        let response = self.execute_with_circuit_breaker(operation).await?;
        if !response.success {
            let reason = response.message.clone().unwrap_or_else(|| "unknown reason".to_string());
            warn!("Order {} rejected by gateway: {}", handoff.order_id, reason);
            return Err(CheckoutError::Rejected(reason));
        }

        info!("Order {} accepted, payment_id={:?}", handoff.order_id, response.payment_id);
        Ok(response)
    }
}
