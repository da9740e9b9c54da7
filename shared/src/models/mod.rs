//! Domain models consumed from the ERP backend

mod count;
mod dispatch;
mod item;
mod receiving;
mod sales;
mod status;
mod stock;
mod transfer;
mod user;
mod warehouse;

pub use count::*;
pub use dispatch::*;
pub use item::*;
pub use receiving::*;
pub use sales::*;
pub use status::*;
pub use stock::*;
pub use transfer::*;
pub use user::*;
pub use warehouse::*;
