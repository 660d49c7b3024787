//! Customer-facing notification templates.

use chrono::{DateTime, Duration, Utc};
use common::NotificationId;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;

use super::{OrderStatus, ServiceOrder};

/// Hours added to the labor estimate when promising a delivery time.
const DELIVERY_BUFFER_HOURS: f64 = 2.0;

/// Fallback when no part name is known for the waiting-parts message.
const UNKNOWN_PARTS: &str = "peças solicitadas";

/// Fallback when no mechanic is assigned.
const UNKNOWN_MECHANIC: &str = "nossa equipe";

/// Channel a message is meant to be sent through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    WhatsApp,
    Email,
}

/// What caused a message to be composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationTrigger {
    OrderCreated,
    Approval,
    WaitingParts,
    InProgress,
    Completed,
    Paid,
    PreventiveReminder,
}

impl NotificationTrigger {
    /// The template for entering `status`, if that status has one.
    pub fn for_status(status: OrderStatus) -> Option<Self> {
        match status {
            OrderStatus::Approval => Some(Self::Approval),
            OrderStatus::WaitingParts => Some(Self::WaitingParts),
            OrderStatus::InProgress => Some(Self::InProgress),
            OrderStatus::Completed => Some(Self::Completed),
            OrderStatus::Paid => Some(Self::Paid),
            OrderStatus::Pending | OrderStatus::Diagnosing => None,
        }
    }

    pub fn channel(&self) -> Channel {
        match self {
            Self::Paid => Channel::Email,
            _ => Channel::WhatsApp,
        }
    }
}

/// A message composed for the customer and kept on the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerNotification {
    pub id: NotificationId,
    pub trigger: NotificationTrigger,
    pub channel: Channel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Data a template needs that does not live on the order.
#[derive(Debug, Clone)]
pub struct NotificationContext {
    /// First name of the assigned mechanic.
    pub mechanic_first_name: Option<String>,
    pub now: DateTime<Utc>,
}

impl NotificationContext {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            mechanic_first_name: None,
            now,
        }
    }

    pub fn with_mechanic(mut self, first_name: impl Into<String>) -> Self {
        self.mechanic_first_name = Some(first_name.into());
        self
    }
}

/// `now` plus the labor estimate and the delivery buffer.
///
/// Falls back to the buffer alone when the estimate does not fit a date.
fn delivery_estimate(now: DateTime<Utc>, labor_hours: f64) -> DateTime<Utc> {
    let buffer = Duration::minutes((DELIVERY_BUFFER_HOURS * 60.0) as i64);
    let minutes = ((labor_hours + DELIVERY_BUFFER_HOURS) * 60.0).round();
    let estimated = (minutes.is_finite() && minutes.abs() < i64::MAX as f64)
        .then(|| Duration::try_minutes(minutes as i64))
        .flatten()
        .and_then(|delta| now.checked_add_signed(delta));
    estimated.unwrap_or(now + buffer)
}

/// Composes the message for `trigger`.
///
/// Returns None when the customer has not consented to notifications, or
/// when the trigger has nothing to say (a reminder without a diagnosis).
pub fn compose(
    order: &ServiceOrder,
    trigger: NotificationTrigger,
    ctx: &NotificationContext,
) -> Option<CustomerNotification> {
    if !order.customer().accepts_notifications {
        return None;
    }

    let id = order.id();
    let message = match trigger {
        NotificationTrigger::OrderCreated => format!(
            "Olá! Recebemos seu veículo. A ordem de serviço {id} foi aberta para: \"{}\". \
             Avisaremos você a cada etapa.",
            order.complaint().trim()
        ),
        NotificationTrigger::Approval => format!(
            "O orçamento da {id} está pronto: {}. Responda esta mensagem para aprovar o serviço.",
            order.total_cost()
        ),
        NotificationTrigger::InProgress => {
            let hours = order
                .ai_diagnosis()
                .map(|d| d.labor_hours())
                .unwrap_or_default();
            let delivery = delivery_estimate(ctx.now, hours);
            let mechanic = ctx
                .mechanic_first_name
                .as_deref()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(UNKNOWN_MECHANIC);
            format!(
                "Boa notícia! {mechanic} iniciou o serviço da {id}. \
                 Previsão de entrega: {}.",
                delivery.format("%d/%m/%Y às %H:%M")
            )
        }
        NotificationTrigger::Completed => format!(
            "Olá {}, o serviço da {id} foi concluído! Seu veículo já está pronto para retirada.",
            order.customer().name.trim()
        ),
        NotificationTrigger::Paid => format!(
            "Pagamento da {id} confirmado. Obrigado pela preferência!"
        ),
        NotificationTrigger::WaitingParts => {
            let part = order
                .ai_diagnosis()
                .and_then(|d| d.first_part_name())
                .unwrap_or(UNKNOWN_PARTS);
            format!(
                "A {id} está aguardando a chegada de peças ({part}). \
                 Avisaremos assim que tudo chegar."
            )
        }
        NotificationTrigger::PreventiveReminder => {
            let advice = order
                .ai_diagnosis()
                .map(|d| d.preventive_maintenance.trim())
                .filter(|text| !text.is_empty())?;
            format!("Lembrete de manutenção preventiva: {advice}")
        }
    };

    Some(CustomerNotification {
        id: NotificationId::new(),
        trigger,
        channel: trigger.channel(),
        message,
        created_at: ctx.now,
    })
}

/// Builds a `wa.me` share link for a message.
///
/// Returns None when the phone number contains no digits.
pub fn whatsapp_link(phone: &str, message: &str) -> Option<String> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    Some(format!(
        "https://wa.me/55{digits}?text={}",
        urlencoding::encode(message)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_per_status() {
        assert_eq!(NotificationTrigger::for_status(OrderStatus::Pending), None);
        assert_eq!(NotificationTrigger::for_status(OrderStatus::Diagnosing), None);
        assert_eq!(
            NotificationTrigger::for_status(OrderStatus::WaitingParts),
            Some(NotificationTrigger::WaitingParts)
        );
        assert_eq!(NotificationTrigger::Paid.channel(), Channel::Email);
        assert_eq!(NotificationTrigger::Approval.channel(), Channel::WhatsApp);
    }

    #[test]
    fn test_delivery_estimate() {
        use chrono::TimeZone;
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 14, 0, 0).unwrap();
        let buffered = Utc.with_ymd_and_hms(2024, 3, 15, 16, 0, 0).unwrap();

        assert_eq!(
            delivery_estimate(now, 1.5),
            Utc.with_ymd_and_hms(2024, 3, 15, 17, 30, 0).unwrap()
        );
        assert_eq!(delivery_estimate(now, 0.0), buffered);
        assert_eq!(delivery_estimate(now, 1e10), buffered);
        assert_eq!(delivery_estimate(now, 1e300), buffered);
    }

    #[test]
    fn test_whatsapp_link_keeps_digits_and_encodes() {
        let link = whatsapp_link("(11) 98765-4321", "OS pronta & paga").unwrap();
        assert_eq!(
            link,
            "https://wa.me/5511987654321?text=OS%20pronta%20%26%20paga"
        );
    }

    #[test]
    fn test_whatsapp_link_without_digits() {
        assert_eq!(whatsapp_link("sem telefone", "oi"), None);
        assert_eq!(whatsapp_link("", "oi"), None);
    }
}
