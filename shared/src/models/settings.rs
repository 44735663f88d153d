//! Admin Settings Model

use serde::{Deserialize, Serialize};

/// Bank / QR payment details, stored as a single upserted row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AdminSettings {
    pub qr_code_image: String,
    pub bank_name: String,
    pub account_holder_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub upi_id: String,
}

/// Admin payment-details update payload; absent fields reset to empty,
/// matching the upsert-the-whole-row semantics of the settings form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentDetailsUpdate {
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub account_holder_name: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub ifsc_code: String,
    #[serde(default)]
    pub upi_id: String,
}

/// One selectable plan in the public settings view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanOption {
    pub id: i64,
    pub name: String,
    pub price: f64,
}

/// Public settings payload for the registration and donation pages.
///
/// `lifetime_price`/`one_time_price` are legacy aliases of the first plan's
/// price, kept for older clients of the settings endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsView {
    pub lifetime_price: f64,
    pub one_time_price: f64,
    pub membership_options: Vec<PlanOption>,
    pub payment_qr_image: String,
    pub bank_name: String,
    pub account_holder_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub upi_id: String,
}
