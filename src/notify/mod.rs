//! Telegram notifications for inbound orders and leads.
//!
//! Fire-and-forget: delivery failures are logged and never surface to
//! the request that triggered them. When the bot token or chat id is
//! not configured the notifier degrades to a silent no-op.

use serde_json::json;
use tracing::warn;

use crate::config::AppConfig;
use crate::domain::{Category, DealType, Feedback, GeoPosition, SellOrder};

/// Forum topic for sell order notifications.
const ORDERS_THREAD_ID: i64 = 2;
/// Forum topic for feedback notifications.
const FEEDBACKS_THREAD_ID: i64 = 6;

/// Telegram bot client over a shared HTTP client.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    http: reqwest::Client,
    credentials: Option<(String, String)>,
    admin_base_url: String,
}

impl TelegramNotifier {
    /// Builds the notifier. Missing credentials yield a no-op instance.
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        let credentials = config
            .telegram_bot_token
            .clone()
            .zip(config.telegram_chat_id.clone());
        if credentials.is_none() {
            warn!("telegram credentials not configured, notifications disabled");
        }
        Self {
            http: reqwest::Client::new(),
            credentials,
            admin_base_url: config.admin_base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// A notifier with no credentials. Every send is a no-op; useful
    /// where notifications are irrelevant.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials: None,
            admin_base_url: String::new(),
        }
    }

    /// Announces a new sell order in the orders topic.
    pub async fn sell_order_created(&self, order: &SellOrder) {
        let text = sell_order_message(order);
        let button_url = format!("{}/orders/sell/{}", self.admin_base_url, order.id);
        self.send(ORDERS_THREAD_ID, &text, &button_url).await;
    }

    /// Announces a new lead in the feedbacks topic.
    pub async fn feedback_created(&self, feedback: &Feedback) {
        let text = feedback_message(feedback);
        let button_url = format!("{}/orders/feedback/{}", self.admin_base_url, feedback.id);
        self.send(FEEDBACKS_THREAD_ID, &text, &button_url).await;
    }

    async fn send(&self, thread_id: i64, text: &str, button_url: &str) {
        let Some((token, chat_id)) = &self.credentials else {
            return;
        };
        let body = json!({
            "chat_id": chat_id,
            "message_thread_id": thread_id,
            "text": text,
            "parse_mode": "HTML",
            "reply_markup": {
                "inline_keyboard": [[{"text": "Open in admin panel", "url": button_url}]],
            },
        });
        let url = format!("https://api.telegram.org/bot{token}/sendMessage");
        match self.http.post(&url).json(&body).send().await {
            Ok(response) if !response.status().is_success() => {
                warn!(status = %response.status(), "telegram rejected the notification");
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "telegram notification failed"),
        }
    }
}

/// `City, Street 12` from whatever address parts are present.
fn address_line(geo: Option<&GeoPosition>) -> String {
    let Some(geo) = geo else {
        return String::new();
    };
    let mut parts = Vec::new();
    if let Some(city) = geo.city.as_deref().filter(|s| !s.is_empty()) {
        parts.push(city.to_owned());
    }
    let street = [geo.street.as_deref(), geo.house_number.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if !street.is_empty() {
        parts.push(street);
    }
    parts.join(", ")
}

fn category_label(raw: &str) -> &'static str {
    Category::parse(raw).map_or("Other", Category::label)
}

fn deal_label(raw: &str) -> &'static str {
    DealType::parse(raw).map_or("Property sale", DealType::label)
}

fn sell_order_message(order: &SellOrder) -> String {
    let mut text = format!(
        "<b>New sell request</b>\n{} — {}",
        deal_label(&order.fields.deal_type),
        category_label(&order.fields.category),
    );
    let address = address_line(order.fields.geo_position.as_deref());
    if !address.is_empty() {
        text.push('\n');
        text.push_str(&address);
    }
    text.push_str(&format!("\nPrice: {}", order.fields.price));
    text
}

fn feedback_message(feedback: &Feedback) -> String {
    let mut text = format!(
        "<b>New feedback</b>\n{}\n{}",
        feedback.name, feedback.phone
    );
    if let Some(title) = feedback.title.as_deref().filter(|s| !s.is_empty()) {
        text.push('\n');
        text.push_str(title);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::Map;
    use sqlx::types::Json;
    use uuid::Uuid;

    fn order_with_geo(geo: Option<GeoPosition>) -> SellOrder {
        SellOrder {
            id: Uuid::new_v4(),
            fields: crate::domain::PropertyFields {
                deal_type: "sell".into(),
                category: "apartment".into(),
                price: 25_000_000,
                description: None,
                estate_agent: None,
                geo_position: geo.map(Json),
                owner_info: None,
                apartment_complex: None,
                images: Json(vec![]),
                documents: None,
                room_count: None,
                house_square: None,
                kitchen_square: None,
                house_building_year: None,
                target_floor: None,
                total_floor: None,
                not_first_floor: None,
                not_last_floor: None,
                attrs: Json(Map::new()),
            },
            status: "new".into(),
            decline_reason: None,
            created_object_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn order_message_carries_labels_and_address() {
        let order = order_with_geo(Some(GeoPosition {
            city: Some("Almaty".into()),
            street: Some("Abay".into()),
            house_number: Some("12".into()),
            ..GeoPosition::default()
        }));
        let text = sell_order_message(&order);
        assert!(text.contains("Property sale — Apartment"));
        assert!(text.contains("Almaty, Abay 12"));
        assert!(text.contains("Price: 25000000"));
    }

    #[test]
    fn order_message_without_geo_skips_the_address_line() {
        let text = sell_order_message(&order_with_geo(None));
        assert!(!text.contains(", "));
        assert!(text.contains("Price:"));
    }

    #[test]
    fn feedback_message_includes_the_frozen_title() {
        let feedback = Feedback {
            id: Uuid::new_v4(),
            name: "Ermek".into(),
            phone: "+7777".into(),
            status: "new".into(),
            estate_id: None,
            description: None,
            estate_agent: None,
            title: Some("2-room Apartment, Almaty".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let text = feedback_message(&feedback);
        assert!(text.contains("Ermek"));
        assert!(text.contains("2-room Apartment, Almaty"));
    }

    #[test]
    fn unknown_raw_values_fall_back_to_defaults() {
        assert_eq!(category_label("mystery"), "Other");
        assert_eq!(deal_label("mystery"), "Property sale");
    }
}
