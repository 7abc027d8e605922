pub mod impl_console;
#[cfg(test)]
pub mod impl_fake;
pub mod impl_tracing;
pub mod interface;
