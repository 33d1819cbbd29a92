pub mod disputes;
pub mod notification;
pub mod order_lifecycle;
pub mod settlement;
