mod procfs_conntrack;
mod static_conntrack;

pub use procfs_conntrack::ProcfsConntrackSource;
pub use static_conntrack::StaticConntrackSource;
