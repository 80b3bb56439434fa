//! Email and fax notifications, delivered from the background queue.
//!
//! A request only validates and enqueues; delivery happens later on the single
//! worker through a [`NotificationSender`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use rxkit::{RequestContext, RequestError, RequestHandler, ResultEnvelope, TaskQueue, WorkItem};
use rxkit_security::Requirements;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::access::roles;
use super::entity::Entity;
use super::handlers::CreateHook;
use super::model::{Invoice, Organization};
use super::repo::Repository;
use super::tenant::Membership;
use super::validation::Violations;
use crate::config::NotificationsConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Channel {
    Email,
    Fax,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Email => "email",
            Self::Fax => "fax",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Notification {
    pub channel: Channel,
    /// Email address or fax number
    pub recipient: String,
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

impl Notification {
    #[must_use]
    pub fn email(recipient: &str, subject: &str, body: String) -> Self {
        Self {
            channel: Channel::Email,
            recipient: recipient.to_owned(),
            subject: subject.to_owned(),
            body,
        }
    }

    fn validate(&self) -> Result<(), RequestError> {
        let mut v = Violations::new();
        match self.channel {
            Channel::Email => v.email("recipient", &self.recipient),
            Channel::Fax => v.fax("recipient", &self.recipient),
        }
        v.text("subject", &self.subject);
        v.finish()
    }
}

/// Delivery collaborator (SMTP relay, fax gateway, ...)
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, notification: &Notification) -> anyhow::Result<()>;
}

/// Default sender: records the delivery in the log and nothing else
#[derive(Debug, Clone)]
pub struct LoggingSender {
    from: String,
}

impl LoggingSender {
    #[must_use]
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl NotificationSender for LoggingSender {
    async fn send(&self, notification: &Notification) -> anyhow::Result<()> {
        tracing::info!(
            channel = %notification.channel,
            from = %self.from,
            recipient = %notification.recipient,
            subject = %notification.subject,
            "notification delivered"
        );
        Ok(())
    }
}

/// Puts notifications on the background queue
pub struct Notifier {
    queue: TaskQueue,
    sender: Arc<dyn NotificationSender>,
    enabled: bool,
}

impl Notifier {
    #[must_use]
    pub fn new(queue: TaskQueue, sender: Arc<dyn NotificationSender>, cfg: &NotificationsConfig) -> Self {
        Self {
            queue,
            sender,
            enabled: cfg.enabled,
        }
    }

    /// Queue one delivery. Returns the work item id, or `None` when
    /// notifications are switched off.
    #[must_use]
    pub fn dispatch(&self, notification: Notification) -> Option<Uuid> {
        if !self.enabled {
            tracing::debug!(channel = %notification.channel, "notifications disabled, dropped");
            return None;
        }
        let id = Uuid::new_v4();
        let sender = Arc::clone(&self.sender);
        let name = format!("notify-{}-{id}", notification.channel);
        self.queue.enqueue(WorkItem::new(name, move |cancel| async move {
            if cancel.is_cancelled() {
                tracing::debug!(%id, "delivering during shutdown");
            }
            sender.send(&notification).await
        }));
        Some(id)
    }
}

/// Ask for an email or fax to go out
#[derive(Debug, Clone)]
pub struct SendNotification {
    pub notification: Notification,
}

impl rxkit::Request for SendNotification {
    type Response = Option<Uuid>;
}

impl SendNotification {
    /// Staff who may send messages on the tenant's behalf
    pub fn requirements() -> Requirements {
        Requirements::none().any_role([roles::ADMIN, roles::PHARMACIST, roles::BILLING])
    }
}

pub struct SendNotificationHandler {
    notifier: Arc<Notifier>,
    membership: Arc<Membership>,
}

impl SendNotificationHandler {
    #[must_use]
    pub fn new(notifier: Arc<Notifier>, membership: Arc<Membership>) -> Self {
        Self { notifier, membership }
    }
}

#[async_trait]
impl RequestHandler<SendNotification> for SendNotificationHandler {
    async fn handle(
        &self,
        request: SendNotification,
        ctx: &RequestContext,
    ) -> Result<ResultEnvelope<Option<Uuid>>, RequestError> {
        let tenant = self.membership.tenant(ctx).await?;
        request.notification.validate()?;
        let channel = request.notification.channel;
        let queued = self.notifier.dispatch(request.notification);
        tracing::info!(%tenant, %channel, queued = queued.is_some(), "notification requested");

        let message = if queued.is_some() {
            "notification queued"
        } else {
            "notifications are disabled"
        };
        Ok(ResultEnvelope::success(queued).with_message(message))
    }
}

/// Emails a new invoice to the tenant's billing address, when one is on file
pub struct InvoiceMailer {
    organizations: Arc<dyn Repository<Organization>>,
    notifier: Arc<Notifier>,
}

impl InvoiceMailer {
    #[must_use]
    pub fn new(organizations: Arc<dyn Repository<Organization>>, notifier: Arc<Notifier>) -> Self {
        Self {
            organizations,
            notifier,
        }
    }
}

#[async_trait]
impl CreateHook<Invoice> for InvoiceMailer {
    async fn created(&self, invoice: &Invoice, _ctx: &RequestContext) -> anyhow::Result<()> {
        let tenant = invoice.organization_id();
        let billing = self
            .organizations
            .find(tenant, tenant)
            .await?
            .and_then(|org| org.billing_email);
        let Some(recipient) = billing else {
            tracing::debug!(%tenant, invoice = %invoice.number, "no billing address, invoice not mailed");
            return Ok(());
        };

        let due = invoice
            .due_date
            .map_or_else(|| "on receipt".to_owned(), |d| format!("on {d}"));
        let body = format!(
            "Invoice {} for {} is due {due}.",
            invoice.number, invoice.amount
        );
        let queued = self.notifier.dispatch(Notification::email(
            &recipient,
            &format!("Invoice {}", invoice.number),
            body,
        ));
        tracing::debug!(%tenant, invoice = %invoice.number, queued = queued.is_some(), "invoice mail requested");
        Ok(())
    }
}
