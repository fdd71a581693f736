//! Wire DTOs for the Mercado Pago REST API.
//!
//! Field names follow the provider's JSON contract; conversion into domain
//! types happens in the adapter, keeping the domain free of wire concerns.

use serde::{Deserialize, Serialize};

use crate::domain::{Payment, PaymentId, PaymentStatus};

/// Request body for `POST /checkout/preferences`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PreferenceRequestDto {
    pub items: Vec<PreferenceItemDto>,
    pub payer: PreferencePayerDto,
    pub back_urls: BackUrlsDto,
    pub auto_return: String,
    pub external_reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_url: Option<String>,
    pub payment_methods: PaymentMethodsDto,
}

/// A single purchasable item on the preference.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PreferenceItemDto {
    pub id: String,
    pub title: String,
    pub description: String,
    pub quantity: u32,
    pub currency_id: String,
    pub unit_price: f64,
}

/// Payer identity forwarded so the provider can reject self-payments.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PreferencePayerDto {
    pub id: String,
}

/// Post-payment browser return URLs.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BackUrlsDto {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

/// Payment method restrictions applied to the preference.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaymentMethodsDto {
    pub excluded_payment_types: Vec<ExcludedPaymentTypeDto>,
    pub installments: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExcludedPaymentTypeDto {
    pub id: String,
}

/// Response body from `POST /checkout/preferences`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PreferenceResponseDto {
    pub id: String,
    pub init_point: String,
}

/// Response body from `GET /v1/payments/{id}`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PaymentDto {
    pub status: String,
    #[serde(default)]
    pub external_reference: Option<String>,
}

impl PaymentDto {
    /// Convert into the domain payment model.
    pub fn into_payment(self, id: PaymentId) -> Payment {
        Payment {
            id,
            status: PaymentStatus::from_provider(&self.status),
            external_reference: self.external_reference,
        }
    }
}
