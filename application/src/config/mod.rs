//! Application-level configuration.
//!
//! - [`GatewayParams`]: generation settings and request deadlines

pub mod gateway_params;

pub use gateway_params::GatewayParams;
