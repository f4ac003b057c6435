//! Resource descriptor tables.
//!
//! One module per backend collection. Each exposes `static`
//! [`ResourceDescriptor`]s consumed by the HTTP layer, and the listing
//! modules also own their typed backend records and view mappings.
//!
//! [`ResourceDescriptor`]: crate::forward::ResourceDescriptor

pub mod complaints;
pub mod employees;
pub mod events;
pub mod lenient;
pub mod payments;
pub mod residents;

use crate::forward::ResourceDescriptor;

/// Every descriptor the gateway serves.
pub fn all() -> [&'static ResourceDescriptor; 11] {
    [
        &employees::LIST,
        &employees::CREATE,
        &residents::LIST,
        &residents::CREATE,
        &residents::DELETE,
        &payments::LIST,
        &payments::CREATE_BILL,
        &payments::MARK_PAID,
        &complaints::LIST,
        &complaints::CREATE,
        &events::BOOK,
    ]
}
