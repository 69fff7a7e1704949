use crate::config::toml_config::{StoreConfig, TomlConfig};
use crate::utils::error::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "reservation-hours")]
#[command(about = "Restaurant reservation availability: opening hours, bookable slots and validation")]
#[command(version)]
pub struct CliConfig {
    /// TOML configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, short, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// IANA timezone of the restaurant, e.g. Europe/Madrid
    #[arg(long, global = true)]
    pub timezone: Option<String>,

    /// PostgREST endpoint of the business hours store
    #[arg(long, global = true, env = "STORE_ENDPOINT")]
    pub store_endpoint: Option<String>,

    #[arg(long, global = true, env = "STORE_API_KEY", hide_env_values = true)]
    pub store_api_key: Option<String>,

    /// JSON file with weekly day rules, used instead of a remote store
    #[arg(long, global = true, conflicts_with = "store_endpoint")]
    pub rules_file: Option<PathBuf>,

    /// Evaluate as if it were this instant (RFC 3339)
    #[arg(long, global = true)]
    pub now: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Debug, Clone, Args)]
pub struct FormatArg {
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the resolved weekly opening hours
    Hours(FormatArg),
    /// List the reservation slots of a date
    Slots {
        #[arg(long, short)]
        date: String,
        /// Ignore the advance-booking lead time
        #[arg(long)]
        staff: bool,
        #[command(flatten)]
        output: FormatArg,
    },
    /// Check whether a time can still be booked
    Validate {
        #[arg(long, short)]
        date: String,
        #[arg(long, short)]
        time: String,
    },
    /// Whether a date can be picked in the booking calendar
    DateStatus {
        #[arg(long, short)]
        date: String,
    },
    /// Slots for several dates at once
    BulkSlots {
        #[arg(long, value_delimiter = ',', required = true)]
        dates: Vec<String>,
        #[command(flatten)]
        output: FormatArg,
    },
    /// Whether a shift is being served right now
    OpenNow,
    /// Run the HTTP query service
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

impl CliConfig {
    /// The file configuration (or defaults) with command line overrides applied.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(timezone) = &self.timezone {
            config.restaurant.timezone = timezone.clone();
        }
        if let Some(endpoint) = &self.store_endpoint {
            let store = config.store.get_or_insert_with(|| StoreConfig {
                endpoint: endpoint.clone(),
                api_key: None,
                schema: None,
                hours_table: "business_hours".to_string(),
                restaurants_table: "restaurants".to_string(),
            });
            store.endpoint = endpoint.clone();
        }
        if let (Some(key), Some(store)) = (&self.store_api_key, config.store.as_mut()) {
            store.api_key = Some(key.clone());
        }
        if self.rules_file.is_some() {
            config.store = None;
        }
        if let Command::Serve { host, port } = &self.command {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
        Ok(config)
    }
}
