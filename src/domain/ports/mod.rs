mod conntrack_source;

pub use conntrack_source::{ConntrackError, ConntrackSource};
