//! # Notifications
//!
//! Outbound messages (SMS, push) produced by committed transitions. Delivery is
//! fire-and-forget: a failed send never undoes the transition that produced it. Failures are
//! logged at `error` and counted so an operator-side collaborator can alert or retry.

use crate::model::UserId;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Something a party should be told about an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Texts the numeric delivery code to the shipping phone.
    DeliveryCode {
        phone: String,
        code: String,
        order_number: String,
    },
    /// Tells a courier they now carry the order.
    CourierAssigned {
        courier_id: UserId,
        order_number: String,
    },
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::DeliveryCode { .. } => "delivery_code",
            Notification::CourierAssigned { .. } => "courier_assigned",
        }
    }

    pub fn order_number(&self) -> &str {
        match self {
            Notification::DeliveryCode { order_number, .. }
            | Notification::CourierAssigned { order_number, .. } => order_number,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    #[error("notification channel unavailable: {0}")]
    Unavailable(String),
    #[error("notification rejected: {0}")]
    Rejected(String),
}

/// Delivery channel for [`Notification`]s.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Logs each notification instead of sending it. The code itself is never logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        match notification {
            Notification::DeliveryCode {
                phone,
                order_number,
                ..
            } => info!(%phone, %order_number, "Delivery code sent"),
            Notification::CourierAssigned {
                courier_id,
                order_number,
            } => info!(%courier_id, %order_number, "Courier notified of assignment"),
        }
        Ok(())
    }
}

/// Sends notifications in the background and keeps a running failure count.
#[derive(Clone)]
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    failures: Arc<AtomicU64>,
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            failures: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Spawns one task that sends `notifications` in order. Returns `None` if there is nothing
    /// to send. Callers are not expected to await the handle.
    pub fn dispatch(&self, notifications: Vec<Notification>) -> Option<JoinHandle<()>> {
        if notifications.is_empty() {
            return None;
        }
        let notifier = Arc::clone(&self.notifier);
        let failures = Arc::clone(&self.failures);
        Some(tokio::spawn(async move {
            for notification in notifications {
                if let Err(e) = notifier.send(&notification).await {
                    failures.fetch_add(1, Ordering::Relaxed);
                    error!(
                        kind = notification.kind(),
                        order_number = notification.order_number(),
                        error = %e,
                        "Notification failed"
                    );
                }
            }
        }))
    }

    /// Number of sends that have failed since this dispatcher was built.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}
