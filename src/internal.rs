pub mod downloader;
pub mod filename;
pub mod logging;
pub mod resolver;
pub mod states;
