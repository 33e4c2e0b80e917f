pub mod chunked_download;
pub mod download_engine;
pub mod structs;
pub mod traits;
