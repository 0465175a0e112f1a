pub mod mutual_information;
pub mod traits;
pub mod approaches;
pub mod utils;

pub use traits::{GlobalValue, LocalValues, OptionalLocalValues};
