pub mod impl_earth_engine;
pub mod impl_fake;
pub mod interface;
