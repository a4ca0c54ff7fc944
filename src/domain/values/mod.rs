pub mod cache_status;
pub mod display;
pub mod polarity;
pub mod request_descriptor;
pub mod resource;
