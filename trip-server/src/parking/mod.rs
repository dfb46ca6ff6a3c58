//! Parking location inventory.
//!
//! Park-and-ride candidates come from a CSV file with `id`, `lon` and `lat`
//! columns. The same inventory serves both the bicycle and car chains.

mod error;
mod inventory;

pub use error::ParkingError;
pub use inventory::ParkingInventory;
