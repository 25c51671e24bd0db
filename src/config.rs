use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // Reporting API settings
    pub listen_addr: String,

    // Conntrack sync settings
    pub sync_interval_secs: u64,
    pub conntrack_path: String,

    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:2222".to_string(),
            sync_interval_secs: 30,
            conntrack_path: "/proc/net/nf_conntrack".to_string(),
            debug: false,
        }
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    let listen_addr = std::env::var("CONNTRACK_AGENT_LISTEN_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:2222".to_string());

    // 0 disables the periodic task; update-triggered syncs still run.
    let sync_interval_secs = std::env::var("CONNTRACK_AGENT_SYNC_INTERVAL_SECS")
        .unwrap_or_else(|_| "30".to_string())
        .parse()
        .unwrap_or(30);

    let conntrack_path = std::env::var("CONNTRACK_AGENT_CONNTRACK_PATH")
        .unwrap_or_else(|_| "/proc/net/nf_conntrack".to_string());

    let debug = std::env::var("DEBUG").is_ok();

    Ok(Config {
        listen_addr,
        sync_interval_secs,
        conntrack_path,
        debug,
    })
}
