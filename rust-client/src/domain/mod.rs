pub mod reading;

pub use reading::{is_blank, Reading, ReadingKey};
