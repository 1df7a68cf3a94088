pub mod entities;
pub mod messaging;
pub mod ports;
pub mod value_objects;

pub use courier_errors::{CourierError, CourierResult};
pub use entities::*;
pub use messaging::*;
pub use ports::*;
pub use value_objects::*;
