pub mod loader;
pub mod m3u_export;
pub mod m3u_parser;
pub mod xtream;
