use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Default location of the survey export
pub const DEFAULT_DATA_PATH: &str = "Question_Socio.xlsx";

/// Configuration of a dashboard instance
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardConfig {
    /// Excel file read once at start-up
    pub data_path: PathBuf,

    /// Address the web server listens on
    pub bind_addr: SocketAddr,

    /// Directory served under `/assets`
    pub assets_dir: PathBuf,

    /// Show error details in HTTP responses
    pub debug: bool,
}

impl Default for DashboardConfig {
    /// Creates the default configuration
    ///
    /// # Returns
    /// * `DashboardConfig` - `Question_Socio.xlsx` in the working directory,
    ///   served on 127.0.0.1:8050 with debug disabled
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8050)),
            assets_dir: PathBuf::from("assets"),
            debug: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.data_path, PathBuf::from("Question_Socio.xlsx"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8050");
        assert!(!config.debug);
    }
}
