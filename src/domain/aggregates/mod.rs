//! Aggregates module
pub mod order;
pub mod return_request;
pub mod warehouse;

pub use order::{Allocation, LineItem, NewOrder, Order, OrderError, OrderStatus, PaymentStatus, WarehouseAllocationStatus};
pub use return_request::{NewReturn, Pickup, PickupUpdate, RefundStatus, ReturnDecision, ReturnError, ReturnRequest, ReturnStatus};
pub use warehouse::Warehouse;
