//! User notifications and push device registration

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::NotificationId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notificacion {
    pub id: NotificationId,
    pub titulo: String,
    pub mensaje: String,
    pub leida: bool,
    pub fecha: NaiveDateTime,
    #[serde(default)]
    pub tipo: Option<String>,
}

/// Response body of the unread counter endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    pub count: u32,
}

/// Platform of the device receiving push notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePlatform {
    Android,
    Ios,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTokenRegistration {
    pub token: String,
    pub plataforma: DevicePlatform,
}
