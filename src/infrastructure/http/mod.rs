pub mod client;
pub(crate) mod wire;
