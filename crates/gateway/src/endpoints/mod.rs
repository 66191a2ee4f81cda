//! # Gatewayエンドポイント

pub mod service_info;
pub mod verify;

pub use service_info::handle_service_info;
pub use verify::handle_verify;
