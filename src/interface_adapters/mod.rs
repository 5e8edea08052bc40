pub mod http;
pub mod protocol;
pub mod storage;
