pub mod entities;
pub mod errors;
pub mod lifecycle;
pub mod ports;
pub mod request;
