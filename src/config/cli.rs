use crate::config::toml_config::ClientConfig;
use crate::core::list_state::ListQuery;
use crate::utils::error::{ClientError, Result};
use clap::{Args, Parser, Subcommand};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Clone, Parser)]
#[command(name = "rental-client")]
#[command(about = "Command-line client for the rental management API")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Base URL of the rental API (overrides the config file)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Where the session credentials are stored
    #[arg(long)]
    pub credentials: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Log in and store the session credentials
    Login {
        #[arg(long)]
        email: String,
        /// Falls back to the RENTAL_PASSWORD environment variable
        #[arg(long)]
        password: Option<String>,
    },
    /// Clear the stored session and invalidate it on the server
    Logout,
    /// Show the current user
    Whoami,
    /// Restore the stored session and report its state
    Status,
    #[command(subcommand)]
    Apartments(ApartmentsCommand),
    #[command(subcommand)]
    Applications(ApplicationsCommand),
    #[command(subcommand)]
    Owners(DirectoryCommand),
    #[command(subcommand)]
    Tenants(DirectoryCommand),
}

#[derive(Debug, Clone, Subcommand)]
pub enum ApartmentsCommand {
    List(ListArgs),
    /// Apartments owned by the current user
    Mine(ListArgs),
    Show { id: String },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ApplicationsCommand {
    List(ListArgs),
    /// Apply for an apartment
    Apply {
        apartment_id: String,
        #[arg(long)]
        message: Option<String>,
        /// Desired move-in date (YYYY-MM-DD)
        #[arg(long)]
        move_in: Option<chrono::NaiveDate>,
    },
    /// Set an application's status (pending, approved, rejected, cancelled)
    Status { id: String, status: String },
}

#[derive(Debug, Clone, Subcommand)]
pub enum DirectoryCommand {
    List(ListArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    #[arg(long, default_value = "1")]
    pub page: u32,

    #[arg(long, default_value = "10")]
    pub limit: u32,

    #[arg(long)]
    pub search: Option<String>,

    /// Extra filters as key=value (e.g. city=Porto)
    #[arg(long = "filter", value_delimiter = ',')]
    pub filters: Vec<String>,

    /// Print results as CSV
    #[arg(long)]
    pub csv: bool,
}

impl ListArgs {
    pub fn to_query(&self) -> Result<ListQuery> {
        let mut query = ListQuery::new();
        if let Some(search) = &self.search {
            query = query.search(search.as_str());
        }
        for filter in &self.filters {
            let (key, value) =
                filter
                    .split_once('=')
                    .ok_or_else(|| ClientError::InvalidConfigValueError {
                        field: "filter".to_string(),
                        value: filter.clone(),
                        reason: "Expected key=value".to_string(),
                    })?;
            query = query.filter(key.trim(), value.trim());
        }
        // 篩選會重設頁碼，所以最後才設定
        Ok(query.page(self.page).limit(self.limit))
    }
}

impl CliConfig {
    /// 合併設定檔與命令列參數，命令列優先
    pub fn resolve(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::new(DEFAULT_API_URL),
        };

        if let Some(api_url) = &self.api_url {
            config.api.base_url = api_url.clone();
        }
        if let Some(credentials) = &self.credentials {
            config.storage.credentials_path = credentials.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            config.api.timeout_seconds = Some(timeout);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ConfigProvider;

    #[test]
    fn test_flags_override_defaults() {
        let cli = CliConfig::parse_from([
            "rental-client",
            "--api-url",
            "https://rentals.example.com",
            "--timeout-seconds",
            "5",
            "whoami",
        ]);
        let config = cli.resolve().unwrap();
        assert_eq!(config.base_url(), "https://rentals.example.com");
        assert_eq!(config.timeout_seconds(), 5);
        assert!(matches!(cli.command, Command::Whoami));
    }

    #[test]
    fn test_list_args_to_query() {
        let cli = CliConfig::parse_from([
            "rental-client",
            "apartments",
            "list",
            "--page",
            "3",
            "--filter",
            "city=Porto,minPrice=500",
            "--search",
            "balcony",
        ]);
        let Command::Apartments(ApartmentsCommand::List(args)) = cli.command else {
            panic!("expected apartments list");
        };
        let query = args.to_query().unwrap();
        assert_eq!(query.page, 3);
        assert_eq!(query.filters.get("city").map(String::as_str), Some("Porto"));
        assert_eq!(query.filters.get("minPrice").map(String::as_str), Some("500"));
        assert_eq!(query.search.as_deref(), Some("balcony"));
    }

    #[test]
    fn test_bad_filter_is_rejected() {
        let args = ListArgs {
            page: 1,
            limit: 10,
            search: None,
            filters: vec!["city".to_string()],
            csv: false,
        };
        assert!(args.to_query().is_err());
    }
}
