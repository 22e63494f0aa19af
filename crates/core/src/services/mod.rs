//! Business logic services.

#![allow(missing_docs)]

pub mod inventory;
pub mod lab_request;
pub mod lab_review;
pub mod reservation;

pub use inventory::InventoryService;
pub use lab_request::LabRequestService;
pub use lab_review::LabReviewService;
pub use reservation::ReservationService;

/// Capability proving the caller cleared the portal's admin gate.
///
/// Minted at the API boundary once the role check has passed, then handed
/// into every admin-facing service call. Services never consult ambient
/// session state, so tests construct a token directly.
#[derive(Debug, Clone)]
pub struct AdminToken {
    admin_id: String,
}

impl AdminToken {
    /// Wrap a verified admin's user ID.
    #[must_use]
    pub fn new(admin_id: impl Into<String>) -> Self {
        Self {
            admin_id: admin_id.into(),
        }
    }

    /// The admin's user ID, recorded as the reviewer on audit fields.
    #[must_use]
    pub fn admin_id(&self) -> &str {
        &self.admin_id
    }
}
