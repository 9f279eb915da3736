pub mod drawing;
pub mod selector;
pub mod state;

pub use selector::{select_region, SelectError};
pub use state::{SelectionAction, SelectionMode, SelectionState};
