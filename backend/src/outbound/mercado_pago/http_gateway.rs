//! Reqwest-backed Mercado Pago gateway adapter.
//!
//! This adapter owns transport details only: request serialisation, timeout
//! and HTTP error mapping, and JSON decoding into the domain payment model.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::{
    BackUrlsDto, ExcludedPaymentTypeDto, PaymentDto, PaymentMethodsDto, PreferenceItemDto,
    PreferencePayerDto, PreferenceRequestDto, PreferenceResponseDto,
};
use crate::domain::ports::{
    PaymentGateway, PaymentGatewayError, PurchaseIntent, PurchaseIntentRequest,
};
use crate::domain::{Payment, PaymentId};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CURRENCY: &str = "BRL";
/// Placeholder amount substituted for unpriced courses.
const PLACEHOLDER_AMOUNT: f64 = 1.0;
/// Boleto-style tickets settle days later; excluding them keeps the
/// webhook-driven grant flow close to real time.
const EXCLUDED_PAYMENT_TYPE: &str = "ticket";
const MAX_INSTALLMENTS: u32 = 12;

/// Mercado Pago gateway adapter performing authenticated REST calls.
pub struct MercadoPagoGateway {
    client: Client,
    base_url: Url,
    access_token: String,
    notification_url: Option<String>,
}

impl MercadoPagoGateway {
    /// Build an adapter with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        access_token: impl Into<String>,
        notification_url: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, access_token, notification_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(
        base_url: Url,
        access_token: impl Into<String>,
        notification_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            access_token: access_token.into(),
            notification_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, PaymentGatewayError> {
        self.base_url.join(path).map_err(|error| {
            PaymentGatewayError::transport(format!("invalid gateway endpoint {path}: {error}"))
        })
    }
}

#[async_trait]
impl PaymentGateway for MercadoPagoGateway {
    async fn create_purchase_intent(
        &self,
        request: &PurchaseIntentRequest,
    ) -> Result<PurchaseIntent, PaymentGatewayError> {
        let body = build_preference_request(request, self.notification_url.clone());
        let endpoint = self.endpoint("checkout/preferences")?;

        let response = self
            .client
            .post(endpoint)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, bytes.as_ref()));
        }

        let decoded: PreferenceResponseDto = serde_json::from_slice(&bytes).map_err(|error| {
            PaymentGatewayError::decode(format!("invalid preference payload: {error}"))
        })?;
        Ok(PurchaseIntent {
            preference_id: decoded.id,
            redirect_url: decoded.init_point,
        })
    }

    async fn fetch_payment(&self, id: &PaymentId) -> Result<Payment, PaymentGatewayError> {
        let endpoint = self.endpoint(&format!("v1/payments/{id}"))?;

        let response = self
            .client
            .get(endpoint)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, bytes.as_ref()));
        }

        let decoded: PaymentDto = serde_json::from_slice(&bytes).map_err(|error| {
            PaymentGatewayError::decode(format!("invalid payment payload: {error}"))
        })?;
        Ok(decoded.into_payment(id.clone()))
    }
}

fn build_preference_request(
    request: &PurchaseIntentRequest,
    notification_url: Option<String>,
) -> PreferenceRequestDto {
    let course_id = request.course_id.as_str();
    PreferenceRequestDto {
        items: vec![PreferenceItemDto {
            id: course_id.to_owned(),
            title: request.course_title.clone(),
            description: format!("Acesso ao curso: {}", request.course_title),
            quantity: 1,
            currency_id: CURRENCY.to_owned(),
            unit_price: chargeable_amount(request.amount),
        }],
        payer: PreferencePayerDto {
            id: request.payer_user_id.to_string(),
        },
        back_urls: build_back_urls(&request.back_url, course_id),
        // Only approved payments may skip the provider's interstitial page.
        auto_return: "approved".to_owned(),
        external_reference: request.reference.clone(),
        notification_url,
        payment_methods: PaymentMethodsDto {
            excluded_payment_types: vec![ExcludedPaymentTypeDto {
                id: EXCLUDED_PAYMENT_TYPE.to_owned(),
            }],
            installments: MAX_INSTALLMENTS,
        },
    }
}

/// Substitute a placeholder amount for unpriced courses.
///
/// The provider rejects zero-amount preferences, so free or mispriced demo
/// courses charge the placeholder instead. Positive amounts pass through
/// untouched; pricing is not this adapter's business.
fn chargeable_amount(amount: f64) -> f64 {
    if amount <= 0.0 {
        PLACEHOLDER_AMOUNT
    } else {
        amount
    }
}

/// Build the browser return URLs with status markers the frontend reads.
fn build_back_urls(base: &str, course_id: &str) -> BackUrlsDto {
    let base = base.trim_end_matches('/');
    BackUrlsDto {
        success: format!("{base}/dashboard?status=approved&course_id={course_id}"),
        failure: format!("{base}/course/{course_id}?status=rejected&course_id={course_id}"),
        pending: format!("{base}/course/{course_id}?status=pending&course_id={course_id}"),
    }
}

fn map_transport_error(error: reqwest::Error) -> PaymentGatewayError {
    if error.is_timeout() {
        PaymentGatewayError::timeout(error.to_string())
    } else {
        PaymentGatewayError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PaymentGatewayError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };

    if status.is_client_error() && is_self_payment_rejection(&preview) {
        return PaymentGatewayError::self_payment(message);
    }
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            PaymentGatewayError::timeout(message)
        }
        _ => PaymentGatewayError::rejected(status.as_u16(), message),
    }
}

/// Detect the provider's payer-equals-collector rejection from the body text.
///
/// The provider has no stable error code for this case; its message always
/// names both parties.
fn is_self_payment_rejection(body: &str) -> bool {
    let lowered = body.to_lowercase();
    lowered.contains("payer") && lowered.contains("collector")
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network gateway mapping helpers.

    use super::*;
    use crate::domain::{CourseId, UserId};
    use rstest::rstest;

    fn request(amount: f64) -> PurchaseIntentRequest {
        PurchaseIntentRequest {
            course_id: CourseId::new("course-1").expect("valid id"),
            course_title: "Rust do Zero".to_owned(),
            amount,
            payer_user_id: UserId::new("user-1").expect("valid id"),
            back_url: "https://app.invalid/".to_owned(),
            reference: "user-1|course-1".to_owned(),
        }
    }

    #[test]
    fn builds_preference_with_provider_contract() {
        let dto = build_preference_request(
            &request(49.9),
            Some("https://app.invalid/api/v1/payments/webhook".to_owned()),
        );

        assert_eq!(dto.items.len(), 1);
        let item = &dto.items[0];
        assert_eq!(item.currency_id, "BRL");
        assert_eq!(item.quantity, 1);
        assert_eq!(item.description, "Acesso ao curso: Rust do Zero");
        assert_eq!(dto.auto_return, "approved");
        assert_eq!(dto.external_reference, "user-1|course-1");
        assert_eq!(dto.payer.id, "user-1");
        assert_eq!(dto.payment_methods.excluded_payment_types[0].id, "ticket");
        assert_eq!(dto.payment_methods.installments, 12);
        assert_eq!(
            dto.notification_url.as_deref(),
            Some("https://app.invalid/api/v1/payments/webhook")
        );
    }

    #[rstest]
    #[case(0.0, 1.0)]
    #[case(-5.0, 1.0)]
    #[case(0.5, 0.5)]
    #[case(1.0, 1.0)]
    #[case(49.9, 49.9)]
    fn substitutes_placeholder_only_for_non_positive_amounts(
        #[case] amount: f64,
        #[case] expected: f64,
    ) {
        assert!((chargeable_amount(amount) - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn back_urls_carry_status_markers() {
        let urls = build_back_urls("https://app.invalid/", "course-1");
        assert_eq!(
            urls.success,
            "https://app.invalid/dashboard?status=approved&course_id=course-1"
        );
        assert_eq!(
            urls.failure,
            "https://app.invalid/course/course-1?status=rejected&course_id=course-1"
        );
        assert_eq!(
            urls.pending,
            "https://app.invalid/course/course-1?status=pending&course_id=course-1"
        );
    }

    #[test]
    fn detects_self_payment_rejections() {
        let body = br#"{"message":"The payer and the collector must be different accounts"}"#;
        let error = map_status_error(StatusCode::BAD_REQUEST, body);
        assert!(matches!(error, PaymentGatewayError::SelfPayment { .. }));
    }

    #[rstest]
    #[case::request_timeout(StatusCode::REQUEST_TIMEOUT)]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT)]
    fn maps_timeout_statuses(#[case] status: StatusCode) {
        let error = map_status_error(status, b"");
        assert!(matches!(error, PaymentGatewayError::Timeout { .. }));
    }

    #[test]
    fn other_statuses_map_to_rejected_with_preview() {
        let error = map_status_error(StatusCode::INTERNAL_SERVER_ERROR, b"upstream exploded");
        match error {
            PaymentGatewayError::Rejected { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("upstream exploded"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn body_preview_truncates_long_bodies() {
        let body = "x".repeat(500);
        let preview = body_preview(body.as_bytes());
        assert!(preview.ends_with("..."));
        assert!(preview.chars().count() <= 163);
    }
}
