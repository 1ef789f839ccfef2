// crates/chatline-daemon/src/config.rs
//
// Runtime configuration for the Chatline daemon.
// Read from a TOML file; every key is optional.

use serde::Deserialize;
use std::fs;

use chatline_rpc::RpcConfig;

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Host address the gRPC server binds to.
    #[serde(default = "default_rpc_host")]
    pub rpc_host: String,

    /// Port the gRPC server binds to.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Capacity of each outbound stream channel (ListMessages, Chat).
    #[serde(default = "default_stream_buffer")]
    pub stream_buffer: usize,

    /// Log level used when RUST_LOG is unset: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_rpc_host() -> String {
    "127.0.0.1".to_string()
}

fn default_rpc_port() -> u16 {
    50051
}

fn default_stream_buffer() -> usize {
    32
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            rpc_host: default_rpc_host(),
            rpc_port: default_rpc_port(),
            stream_buffer: default_stream_buffer(),
            log_level: default_log_level(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: DaemonConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// The server-side settings handed to the RPC layer.
    pub fn rpc_config(&self) -> RpcConfig {
        RpcConfig {
            host: self.rpc_host.clone(),
            port: self.rpc_port,
            stream_buffer: self.stream_buffer,
        }
    }
}
