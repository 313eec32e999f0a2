//! Domain Models

pub mod order;
pub mod product;

pub use order::{
    LineItemInput, Order, OrderDetail, OrderItem, OrderStatus, PaymentStatus, PlaceOrderRequest,
};
pub use product::{Product, ProductCreate, ProductUpdate};
