pub mod impl_fake;
pub mod impl_osm;
pub mod interface;
pub mod marker;
pub mod tiles;
