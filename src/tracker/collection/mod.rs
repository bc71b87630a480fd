pub mod line;
pub mod transport;
pub mod worker;
