mod connection_counter;

pub use connection_counter::ConnectionCounter;
