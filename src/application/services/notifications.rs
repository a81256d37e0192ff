//! Outbound notifications.
//!
//! Handlers enqueue a [`Notification`] and move on; a background task
//! drains the queue and delivers each one through a [`Mailer`], retrying
//! with exponential backoff before giving up. On shutdown the task is given
//! a bounded window to empty the queue.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use chrono::NaiveDate;
use metrics::counter;
use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::models::checklist::humanize_key;
use crate::infrastructure::config::NotificationSettings;
use crate::infrastructure::mail::{Mail, Mailer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    MissingItems {
        room: String,
        date: NaiveDate,
        items: Vec<String>,
    },
    LowStock {
        item: String,
        quantity: i64,
        low_stock_level: i64,
    },
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::MissingItems { .. } => "missing_items",
            Notification::LowStock { .. } => "low_stock",
        }
    }

    pub fn subject(&self) -> String {
        match self {
            Notification::MissingItems { room, date, .. } => {
                format!("Urgent: Missing Items in Room {room} on {date}")
            }
            Notification::LowStock { item, .. } => format!("LOW STOCK ALERT: {item}"),
        }
    }

    pub fn html_body(&self) -> String {
        match self {
            Notification::MissingItems { room, date, items } => {
                let list = items
                    .iter()
                    .map(|item| format!("<li>{}</li>", escape_html(&humanize_key(item))))
                    .collect::<String>();
                format!(
                    "<p>Room <strong>{}</strong> on <strong>{date}</strong> is missing:</p>\
                     <ul>{list}</ul>\
                     <p>Please address this immediately.</p>",
                    escape_html(room)
                )
            }
            Notification::LowStock {
                item,
                quantity,
                low_stock_level,
            } => format!(
                "<p><strong>Urgent Low Stock Alert!</strong></p>\
                 <p>The inventory for <strong>{}</strong> is critically low. \
                 There are only <strong>{quantity}</strong> units remaining. \
                 The low stock level for this item is {low_stock_level}.</p>\
                 <p>Please reorder this item as soon as possible.</p>",
                escape_html(item)
            ),
        }
    }

    pub fn to_mail(&self, recipient: &str) -> Mail {
        Mail {
            to: recipient.to_string(),
            subject: self.subject(),
            html: self.html_body(),
        }
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Accepts notifications on behalf of request handlers. Returns whether the
/// notification was accepted; it never blocks.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification) -> bool;
}

/// Notifications accepted but not yet delivered or given up on.
#[derive(Debug, Clone, Default)]
pub struct Backlog(Arc<AtomicUsize>);

impl Backlog {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn push(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    fn settle(&self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Clone)]
pub struct NotificationQueue {
    sender: Sender<Notification>,
    backlog: Backlog,
}

/// Receiving end of a [`NotificationQueue`], consumed by [`run_dispatcher`].
pub struct NotificationInbox {
    receiver: Receiver<Notification>,
    backlog: Backlog,
}

impl NotificationInbox {
    /// Handle that outlives the inbox, for reporting at shutdown.
    pub fn backlog(&self) -> Backlog {
        self.backlog.clone()
    }
}

impl NotificationQueue {
    pub fn new(capacity: usize) -> (Self, NotificationInbox) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let backlog = Backlog::default();
        (
            Self {
                sender,
                backlog: backlog.clone(),
            },
            NotificationInbox { receiver, backlog },
        )
    }
}

impl Notifier for NotificationQueue {
    fn notify(&self, notification: Notification) -> bool {
        let kind = notification.kind();
        self.backlog.push();
        let sent = self.sender.try_send(notification);
        if sent.is_err() {
            self.backlog.settle();
        }
        match sent {
            Ok(()) => {
                counter!("notifications_enqueued_total", 1, "kind" => kind);
                true
            }
            Err(TrySendError::Full(_)) => {
                counter!("notifications_dropped_total", 1, "kind" => kind, "reason" => "full");
                warn!(target: "notifications", kind, "notification queue is full, dropping");
                false
            }
            Err(TrySendError::Closed(_)) => {
                counter!("notifications_dropped_total", 1, "kind" => kind, "reason" => "closed");
                warn!(target: "notifications", kind, "notification dispatcher has stopped, dropping");
                false
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct DispatchPolicy {
    pub recipient: String,
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl From<&NotificationSettings> for DispatchPolicy {
    fn from(settings: &NotificationSettings) -> Self {
        Self {
            recipient: settings.recipient.clone(),
            max_attempts: settings.max_attempts.max(1),
            initial_backoff: Duration::from_millis(settings.initial_backoff_ms),
        }
    }
}

/// Delivers one notification. Returns `true` once a send succeeds.
pub async fn deliver_with_retry<M: Mailer>(
    mailer: &M,
    notification: &Notification,
    policy: &DispatchPolicy,
) -> bool {
    let kind = notification.kind();
    let mut backoff = policy.initial_backoff;

    for attempt in 1..=policy.max_attempts {
        match mailer.send(notification.to_mail(&policy.recipient)).await {
            Ok(()) => {
                counter!("notifications_delivered_total", 1, "kind" => kind);
                info!(target: "notifications", kind, attempt, "notification delivered");
                return true;
            }
            Err(err) if attempt < policy.max_attempts => {
                warn!(target: "notifications", kind, attempt, error = %err, "delivery failed, retrying");
                tokio::time::sleep(backoff).await;
                backoff = backoff.saturating_mul(2);
            }
            Err(err) => {
                counter!("notifications_failed_total", 1, "kind" => kind);
                warn!(target: "notifications", kind, attempt, error = %err, "delivery failed, giving up");
            }
        }
    }

    false
}

/// Runs until every [`NotificationQueue`] handle has been dropped and the
/// queue is empty.
pub async fn run_dispatcher<M: Mailer>(mailer: M, inbox: NotificationInbox, policy: DispatchPolicy) {
    let NotificationInbox {
        mut receiver,
        backlog,
    } = inbox;
    info!(target: "notifications", recipient = %policy.recipient, "notification dispatcher started");

    while let Some(notification) = receiver.recv().await {
        deliver_with_retry(&mailer, &notification, &policy).await;
        backlog.settle();
    }

    info!(target: "notifications", "notification dispatcher stopped");
}

/// Waits up to `limit` for the dispatcher to finish once the senders are
/// gone. Returns how many notifications were left undelivered.
pub async fn drain(dispatcher: JoinHandle<()>, backlog: Backlog, limit: Duration) -> usize {
    let waiting = backlog.get();
    if waiting > 0 {
        info!(target: "notifications", waiting, "delivering queued notifications before exit");
    }

    match tokio::time::timeout(limit, dispatcher).await {
        Ok(Ok(())) => 0,
        Ok(Err(err)) => {
            error!(target: "notifications", "notification dispatcher failed: {err}");
            report_undelivered(backlog.get())
        }
        Err(_) => {
            warn!(target: "notifications", seconds = limit.as_secs(), "notification drain timed out");
            report_undelivered(backlog.get())
        }
    }
}

fn report_undelivered(count: usize) -> usize {
    if count > 0 {
        counter!("notifications_dropped_total", count as u64, "reason" => "shutdown");
        warn!(target: "notifications", undelivered = count, "dropping undelivered notifications");
    }
    count
}
