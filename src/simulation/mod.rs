pub mod config;
pub mod id;
pub mod io;
pub mod logging;
pub mod network;
pub mod scenario;
pub mod vehicles;
