use std::{
    io::IsTerminal,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;
use people_config::Config;
use tracing::Subscriber;
use tracing_subscriber::{registry::LookupSpan, Layer};

mod log;

pub(crate) use log::LogLevel;

use self::log::LogStyle;

const DEFAULT_LISTEN_ADDRESS: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000);

pub(crate) type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

#[derive(Debug, Parser)]
#[command(name = "people-gateway", version)]
/// GraphQL gateway over the people and hobbies dataset
pub struct Args {
    /// IP address on which the server will listen for incoming connections. Defaults to 127.0.0.1:3000.
    #[arg(short, long, env = "PEOPLE_LISTEN_ADDRESS")]
    pub listen_address: Option<SocketAddr>,
    /// Path to the TOML configuration file. A missing file means the defaults.
    #[arg(long, short, env = "PEOPLE_CONFIG_PATH", default_value = "./people.toml")]
    pub config: PathBuf,
    /// Set the logging level
    #[arg(long = "log", env = "PEOPLE_LOG")]
    pub log_level: Option<LogLevel>,
    /// Set the style of log output
    #[arg(long, env = "PEOPLE_LOG_STYLE", default_value_t = LogStyle::Text)]
    log_style: LogStyle,
    /// Print the GraphQL schema to stdout and exit
    #[arg(long)]
    pub print_schema: bool,
}

impl Args {
    pub fn config(&self) -> anyhow::Result<Config> {
        let config = Config::load(&self.config)
            .with_context(|| format!("loading configuration from {}", self.config.display()))?;

        Ok(config.unwrap_or_default())
    }

    /// The command line wins over the configuration file.
    pub fn listen_address(&self, config: &Config) -> SocketAddr {
        self.listen_address
            .or(config.network.listen_address)
            .unwrap_or(DEFAULT_LISTEN_ADDRESS)
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level.unwrap_or_default()
    }

    pub fn log_format<S>(&self) -> BoxedLayer<S>
    where
        S: Subscriber + for<'span> LookupSpan<'span> + Send + Sync,
    {
        let layer = tracing_subscriber::fmt::layer();

        match self.log_style {
            // for interactive terminals we provide colored output
            LogStyle::Text if std::io::stdout().is_terminal() => layer.with_ansi(true).boxed(),
            // for server logs, colors are off
            LogStyle::Text => layer.with_ansi(false).boxed(),
            LogStyle::Json => layer.json().boxed(),
        }
    }
}

pub(crate) fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    use indoc::indoc;
    use std::io::Write;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["people-gateway"]).unwrap();

        assert_eq!(PathBuf::from("./people.toml"), args.config);
        assert_eq!(LogLevel::Info, args.log_level());
        assert_eq!(LogStyle::Text, args.log_style);
        assert!(!args.print_schema);
        assert_eq!(DEFAULT_LISTEN_ADDRESS, args.listen_address(&Config::default()));
    }

    #[test]
    fn listen_address_precedence() {
        let mut config = Config::default();
        config.network.listen_address = Some("0.0.0.0:4000".parse().unwrap());

        let args = Args::try_parse_from(["people-gateway"]).unwrap();
        assert_eq!("0.0.0.0:4000".parse::<SocketAddr>().unwrap(), args.listen_address(&config));

        let args = Args::try_parse_from(["people-gateway", "--listen-address", "127.0.0.1:5000"]).unwrap();
        assert_eq!("127.0.0.1:5000".parse::<SocketAddr>().unwrap(), args.listen_address(&config));
    }

    #[test]
    fn log_options() {
        let args = Args::try_parse_from(["people-gateway", "--log", "debug", "--log-style", "json"]).unwrap();

        assert_eq!(LogLevel::Debug, args.log_level());
        assert_eq!(LogStyle::Json, args.log_style);

        assert!(Args::try_parse_from(["people-gateway", "--log", "verbose"]).is_err());
    }

    #[test]
    fn missing_config_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.toml");

        let args = Args::try_parse_from(["people-gateway", "--config", path.to_str().unwrap()]).unwrap();
        assert_eq!(Config::default(), args.config().unwrap());
    }

    #[test]
    fn config_file_is_loaded() {
        let content = indoc! {r#"
            [graph]
            introspection = false
        "#};

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();

        let args = Args::try_parse_from(["people-gateway", "-c", file.path().to_str().unwrap()]).unwrap();
        let config = args.config().unwrap();

        assert!(!config.graph.introspection);
        assert!(config.graph.graphiql);
    }

    #[test]
    fn broken_config_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[graph]\nintrospection = \"maybe\"").unwrap();

        let args = Args::try_parse_from(["people-gateway", "-c", file.path().to_str().unwrap()]).unwrap();
        let err = args.config().unwrap_err();

        assert!(err.to_string().starts_with("loading configuration from"), "{err}");
    }
}
