//! Workflow services. Each operation loads the aggregate, applies one change,
//! saves the whole document and then publishes the events the change raised.

pub mod allocation;
pub mod orders;
pub mod returns;

pub use allocation::AllocationService;
pub use orders::{OrderDetails, OrderService};
pub use returns::{OrderSummary, ReturnDetails, ReturnService};

use crate::publisher::EventPublisher;
use crate::store::Repositories;

#[derive(Clone)]
pub struct Services {
    pub orders: OrderService,
    pub allocation: AllocationService,
    pub returns: ReturnService,
}

impl Services {
    pub fn new(repos: Repositories, publisher: EventPublisher) -> Self {
        Self {
            orders: OrderService::new(repos.clone(), publisher.clone()),
            allocation: AllocationService::new(repos.clone(), publisher.clone()),
            returns: ReturnService::new(repos, publisher),
        }
    }
}
