pub mod constants;
pub mod test_helpers;
pub mod types;
pub mod week;
