//! Push notification display rules.
//!
//! A background push carries a small data payload. The client turns it into a
//! visible notification and, when tapped, navigates to a deep link chosen by
//! the payload `type`. The rules live here so the admin API can preview
//! exactly what a device will show.

use serde::{Deserialize, Serialize};

/// Kind of push notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A reward became available or was redeemed.
    Reward,
    /// Points were earned or spent.
    Transaction,
    /// A loyalty program changed.
    Program,
    /// Anything else. Routed to the home page.
    #[serde(other)]
    Other,
}

impl NotificationKind {
    const fn default_title(self) -> &'static str {
        match self {
            Self::Reward => "New reward",
            Self::Transaction => "Points update",
            Self::Program => "Program update",
            Self::Other => "Notification",
        }
    }

    const fn tag(self) -> &'static str {
        match self {
            Self::Reward => "reward",
            Self::Transaction => "transaction",
            Self::Program => "program",
            Self::Other => "general",
        }
    }
}

/// Data payload delivered with a push message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    /// Routing discriminator.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Title override.
    #[serde(default)]
    pub title: Option<String>,
    /// Body text.
    #[serde(default)]
    pub body: Option<String>,
    /// Business the notification relates to.
    #[serde(default)]
    pub business_id: Option<String>,
    /// Transaction the notification relates to.
    #[serde(default)]
    pub transaction_id: Option<String>,
}

/// What the device shows and where a tap leads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDisplay {
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// Collapse tag; a newer notification with the same tag replaces an older one.
    pub tag: String,
    /// App-relative path opened on click.
    pub link: String,
}

impl NotificationPayload {
    /// App-relative path a tap on this notification opens.
    #[must_use]
    pub fn deep_link(&self) -> String {
        let business = non_empty(self.business_id.as_deref());
        let transaction = non_empty(self.transaction_id.as_deref());

        match self.kind {
            NotificationKind::Reward => business.map_or_else(
                || "/rewards".to_owned(),
                |id| format!("/rewards?businessId={}", urlencoding::encode(id)),
            ),
            NotificationKind::Transaction => transaction.map_or_else(
                || "/transactions".to_owned(),
                |id| format!("/transactions/{}", urlencoding::encode(id)),
            ),
            NotificationKind::Program => business.map_or_else(
                || "/programs".to_owned(),
                |id| format!("/programs/{}", urlencoding::encode(id)),
            ),
            NotificationKind::Other => "/".to_owned(),
        }
    }

    /// Resolve the payload into what the device displays.
    #[must_use]
    pub fn display(&self) -> NotificationDisplay {
        NotificationDisplay {
            title: non_empty(self.title.as_deref())
                .unwrap_or(self.kind.default_title())
                .to_owned(),
            body: self.body.clone().unwrap_or_default(),
            tag: self.kind.tag().to_owned(),
            link: self.deep_link(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
