pub mod records;

pub use records::{answers_from_hickory, from_hickory, to_hickory};
