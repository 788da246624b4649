pub mod fake_lookup;
pub mod fixtures;
