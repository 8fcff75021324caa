//! HTTP client side

pub mod fetch;
