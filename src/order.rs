//! Orders as seen by the scanner: identifiers in, status and audit meta out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::BlockedOrder;
use crate::eval::{Disposition, ScanResult};

/// Order meta key holding the app user id captured at checkout.
pub const APP_USER_ID_META: &str = "app_user_id";
/// Order meta key holding the JSON scan annotation.
pub const SCAN_RESULT_META: &str = "scan_result";

/// A custom order status added by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderStatus {
    /// Status slug as stored on the order, e.g. `review-required`.
    pub slug: &'static str,
    /// Registered post status, e.g. `wc-review-required`.
    pub post_status: &'static str,
    pub label: &'static str,
    /// Whether an order in this status may still be paid for.
    pub valid_for_payment: bool,
}

pub const CUSTOM_STATUSES: [OrderStatus; 3] = [
    OrderStatus {
        slug: "verified",
        post_status: "wc-verified",
        label: "Verified",
        valid_for_payment: true,
    },
    OrderStatus {
        slug: "review-required",
        post_status: "wc-review-required",
        label: "Review Required",
        valid_for_payment: true,
    },
    OrderStatus {
        slug: "blocked",
        post_status: "wc-blocked",
        label: "Blocked",
        valid_for_payment: false,
    },
];

impl OrderStatus {
    pub fn for_disposition(disposition: Disposition) -> Option<&'static OrderStatus> {
        let slug = disposition.order_status()?;
        CUSTOM_STATUSES.iter().find(|s| s.slug == slug)
    }
}

/// The order-side collaborator of a scan.
///
/// Supplies the two identifiers and receives the status and audit
/// annotation.
pub trait CheckoutOrder {
    fn order_id(&self) -> u64;

    fn billing_email(&self) -> &str;

    /// App user id meta value; empty when not captured.
    fn app_user_id(&self) -> &str;

    fn update_status(&mut self, status: &str);

    fn update_meta(&mut self, key: &str, value: String);
}

/// In-memory order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub billing_email: String,
    pub status: String,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

impl Order {
    /// New order in `pending` status.
    pub fn new(id: u64, billing_email: impl Into<String>) -> Self {
        Self {
            id,
            billing_email: billing_email.into(),
            status: "pending".into(),
            meta: BTreeMap::new(),
        }
    }

    /// Record the app user id field. Blank values are not stored.
    pub fn with_app_user_id(mut self, app_user_id: &str) -> Self {
        let trimmed = app_user_id.trim();
        if !trimmed.is_empty() {
            self.meta
                .insert(APP_USER_ID_META.to_string(), trimmed.to_string());
        }
        self
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    /// The persisted scan annotation, if the order was ever matched.
    pub fn scan_result(&self) -> Option<Result<ScanResult, serde_json::Error>> {
        self.meta(SCAN_RESULT_META).map(ScanResult::from_annotation)
    }
}

impl CheckoutOrder for Order {
    fn order_id(&self) -> u64 {
        self.id
    }

    fn billing_email(&self) -> &str {
        &self.billing_email
    }

    fn app_user_id(&self) -> &str {
        self.meta(APP_USER_ID_META).unwrap_or_default()
    }

    fn update_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    fn update_meta(&mut self, key: &str, value: String) {
        self.meta.insert(key.to_string(), value);
    }
}

/// Message shown to a customer whose order was blocked.
pub fn blocked_message(support_contact: &str) -> String {
    format!(
        "Your email has been blacklisted from ordering. Please reach out to {support_contact} if this was an error."
    )
}

/// Write a disposition to the order.
///
/// The annotation is stored whenever `scan` is non-empty. The status comes
/// from [`CUSTOM_STATUSES`]; an order moved to a status that is not valid
/// for payment is returned as [`BlockedOrder`] and must not complete.
pub fn apply_disposition<O>(
    order: &mut O,
    disposition: Disposition,
    scan: &ScanResult,
    support_contact: &str,
) -> Result<Disposition, BlockedOrder>
where
    O: CheckoutOrder + ?Sized,
{
    if !scan.is_empty() {
        order.update_meta(SCAN_RESULT_META, scan.to_annotation());
    }

    let Some(status) = OrderStatus::for_disposition(disposition) else {
        return Ok(disposition);
    };
    order.update_status(status.slug);

    if !status.valid_for_payment {
        return Err(BlockedOrder {
            order_id: order.order_id(),
            message: blocked_message(support_contact),
        });
    }

    Ok(disposition)
}
