//! Request/response shapes mirrored from the ordering API

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Role tag attached to every account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Manager,
    Member,
    #[serde(other)]
    Other,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Member => "MEMBER",
            Role::Other => "UNKNOWN",
        }
    }

    /// ADMIN and MANAGER
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile returned by `GET /auth/me`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    #[serde(default)]
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub country: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "number_or_string")]
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
}

/// Paging block of `GET /restaurants`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageMeta {
    pub total: u32,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RestaurantPage {
    pub data: Vec<Restaurant>,
    #[serde(default)]
    pub meta: PageMeta,
}

/// Order lifecycle tag; anything unrecognised keeps the server's spelling
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "PENDING" => OrderStatus::Pending,
            "PAID" => OrderStatus::Paid,
            "CANCELLED" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(raw),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderUser {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderRestaurant {
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderMenuItem {
    pub name: String,
    pub restaurant: OrderRestaurant,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub quantity: u32,
    #[serde(deserialize_with = "number_or_string")]
    pub price: f64,
    pub menu_item: OrderMenuItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentType {
    #[default]
    Cash,
    Upi,
    Card,
    Netbanking,
}

impl PaymentType {
    pub const ALL: [PaymentType; 4] = [
        PaymentType::Cash,
        PaymentType::Upi,
        PaymentType::Card,
        PaymentType::Netbanking,
    ];

    /// Label shown in the payment selector
    pub fn label(self) -> &'static str {
        match self {
            PaymentType::Cash => "Cash on Delivery",
            PaymentType::Upi => "UPI",
            PaymentType::Card => "Card",
            PaymentType::Netbanking => "Net Banking",
        }
    }
}

/// Type-specific payment fields; CASH sends an empty object
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
}

/// Body of `PATCH /orders/:id/pay` and the `payment` field of a new order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    #[serde(default)]
    pub details: PaymentDetails,
}

/// Payment method already stored against an order
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    #[serde(default)]
    pub details: serde_json::Value,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user: OrderUser,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(deserialize_with = "number_or_string")]
    pub total_amount: f64,
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub menu_item_id: String,
    pub quantity: u32,
    pub restaurant_id: String,
}

/// Body of `POST /orders`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateOrder {
    pub items: Vec<OrderLine>,
    pub payment: Payment,
}

/// Response of `POST /orders`; only the id is used
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedOrder {
    #[serde(default)]
    pub id: Option<String>,
}

/// Body of `POST /restaurants`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRestaurant {
    pub name: String,
    pub country: String,
}

/// Body of `POST /items`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMenuItem {
    pub name: String,
    pub price: f64,
    pub restaurant_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Amounts arrive as JSON numbers or, from decimal columns, as strings.
fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(f64),
        Text(String),
    }

    match Amount::deserialize(deserializer)? {
        Amount::Number(n) => Ok(n),
        Amount::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
