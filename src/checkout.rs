//! The order-processing pipeline: look up, evaluate, apply.
//!
//! [`scan_order`] is the library entry point. [`run_checkout`] wraps it for
//! the hook binary, turning a JSON checkout event into a JSON response.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{LookupFailurePolicy, Settings};
use crate::entry::Kind;
use crate::error::ScanError;
use crate::eval::{self, Disposition, Lookups, ScanResult};
use crate::logging;
use crate::order::{self, CheckoutOrder, Order};
use crate::store::{EntryStore, FileStore, MemoryStore};

/// Per-invocation scan behavior, taken from [`Settings`].
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub on_lookup_error: LookupFailurePolicy,
    pub support_contact: String,
    pub require_app_user_id: bool,
}

impl ScanSettings {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            on_lookup_error: settings.on_lookup_error,
            support_contact: settings.support_contact.clone(),
            require_app_user_id: settings.require_app_user_id,
        }
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            on_lookup_error: LookupFailurePolicy::FailClosed,
            support_contact: "support@example.com".into(),
            require_app_user_id: false,
        }
    }
}

/// What a completed (non-blocked) scan produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub scan: ScanResult,
    pub disposition: Disposition,
}

fn identifier_for<O: CheckoutOrder + ?Sized>(order: &O, kind: Kind) -> &str {
    match kind {
        Kind::AppUserId => order.app_user_id(),
        Kind::Email => order.billing_email(),
    }
}

/// Reject a checkout missing a required app user id.
pub fn validate_checkout<O>(order: &O, settings: &ScanSettings) -> Result<(), ScanError>
where
    O: CheckoutOrder + ?Sized,
{
    if settings.require_app_user_id && order.app_user_id().trim().is_empty() {
        return Err(ScanError::MissingAppUserId);
    }
    Ok(())
}

/// Look up both identifiers of an order.
///
/// Failed lookups follow `policy`: fail-closed returns the error, fail-open
/// logs it and leaves the slot empty.
pub fn lookup_order<S, O>(
    store: &S,
    order: &O,
    policy: LookupFailurePolicy,
) -> Result<Lookups, ScanError>
where
    S: EntryStore + ?Sized,
    O: CheckoutOrder + ?Sized,
{
    let mut lookups = BTreeMap::new();
    for kind in Kind::ALL {
        let entry = match store.lookup(kind, identifier_for(order, kind)) {
            Ok(entry) => entry,
            Err(source) => match policy {
                LookupFailurePolicy::FailClosed => {
                    return Err(ScanError::Lookup { kind, source });
                }
                LookupFailurePolicy::FailOpen => {
                    log::warn!(
                        "order {}: {kind} lookup failed, treating as no match: {source}",
                        order.order_id()
                    );
                    None
                }
            },
        };
        lookups.insert(kind, entry);
    }
    Ok(lookups)
}

/// Open the entry file for a scan.
///
/// A file that cannot be read or parsed follows `policy` like a failed
/// lookup: fail-closed returns the error, fail-open logs it and scans
/// against an empty store.
pub fn open_scan_store(
    path: &Path,
    policy: LookupFailurePolicy,
) -> Result<Box<dyn EntryStore>, ScanError> {
    match FileStore::open(path) {
        Ok(store) => Ok(Box::new(store)),
        Err(source) => match policy {
            LookupFailurePolicy::FailClosed => Err(ScanError::Store { source }),
            LookupFailurePolicy::FailOpen => {
                log::warn!("entry store unusable, scanning with no entries: {source}");
                Ok(Box::new(MemoryStore::new()))
            }
        },
    }
}

/// Scan one order at checkout.
///
/// Returns `Ok(None)` without touching the store or order when `enabled`
/// is false. A blocked order is marked `blocked` and returned as
/// [`ScanError::Blocked`].
pub fn scan_order<S, O>(
    store: &S,
    order: &mut O,
    enabled: bool,
    settings: &ScanSettings,
) -> Result<Option<ScanReport>, ScanError>
where
    S: EntryStore + ?Sized,
    O: CheckoutOrder + ?Sized,
{
    if !enabled {
        return Ok(None);
    }

    let lookups = lookup_order(store, order, settings.on_lookup_error)?;
    let (scan, disposition) = eval::evaluate(&lookups);
    logging::log_scan(order.order_id(), disposition, &scan);

    order::apply_disposition(order, disposition, &scan, &settings.support_contact)?;
    Ok(Some(ScanReport { scan, disposition }))
}

// ── Hook I/O ──

/// Checkout event read by the hook binary.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutInput {
    pub order_id: u64,
    #[serde(default)]
    pub billing_email: String,
    #[serde(default)]
    pub app_user_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl CheckoutInput {
    pub fn into_order(self) -> Order {
        let mut order = Order::new(self.order_id, self.billing_email).with_app_user_id(&self.app_user_id);
        if let Some(status) = self.status {
            order.status = status;
        }
        order
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOutput {
    pub scan_output: ScanOutput,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutput {
    pub order_id: u64,
    pub scanned: bool,
    pub disposition: Disposition,
    pub order_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_result: Option<ScanResult>,
    /// Customer-facing message; set only for blocked orders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckoutOutput {
    pub fn is_blocked(&self) -> bool {
        self.scan_output.disposition == Disposition::Blocked
    }

    /// Hook exit status: 2 when the order must not complete, else 0.
    pub fn exit_code(&self) -> u8 {
        if self.is_blocked() { 2 } else { 0 }
    }
}

/// Validate and scan a checkout event.
///
/// Blocked orders produce an output (with the customer message), not an
/// error. Errors are reserved for rejected input and fail-closed lookups.
pub fn run_checkout<S>(
    input: CheckoutInput,
    store: &S,
    enabled: bool,
    settings: &ScanSettings,
) -> Result<CheckoutOutput, ScanError>
where
    S: EntryStore + ?Sized,
{
    let mut order = input.into_order();
    validate_checkout(&order, settings)?;

    let (scanned, disposition, message) = match scan_order(store, &mut order, enabled, settings) {
        Ok(None) => (false, Disposition::None, None),
        Ok(Some(report)) => (true, report.disposition, None),
        Err(ScanError::Blocked(blocked)) => (true, Disposition::Blocked, Some(blocked.message)),
        Err(e) => return Err(e),
    };

    let scan_result = order.scan_result().transpose().ok().flatten();

    Ok(CheckoutOutput {
        scan_output: ScanOutput {
            order_id: order.id,
            scanned,
            disposition,
            order_status: order.status,
            scan_result,
            message,
        },
    })
}
