pub mod network;
pub mod pasv_pool;

pub use network::{handle_connection, start_server};
pub use pasv_pool::{DataConn, PassivePool, PasvError, PasvReservation};
