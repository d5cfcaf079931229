mod availability_rule;
mod blackout_date;
mod reservation;
mod service;

pub use availability_rule::*;
pub use blackout_date::*;
pub use reservation::*;
pub use service::*;
