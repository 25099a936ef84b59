// src/models/mod.rs
pub mod dispatch;
pub mod driver;
pub mod trip;
pub mod user;

pub use dispatch::*;
pub use driver::*;
pub use trip::*;
pub use user::*;
