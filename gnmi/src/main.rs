//! gNMI command line client.
//!
//! Dials a target, runs one RPC and prints `path = value` lines, one per
//! update. Subscriptions stream until the deadline passes or Ctrl-C.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_stream::StreamExt;
use tracing::info;

use gnmi::proto;
use gnmi::{
    ConnectOptions, Credentials, DataType, Encoding, GetOptions, StreamMode, SubscribeOptions,
    SubscriptionMode, Value, api,
};

/// gNMI client
#[derive(Parser, Debug)]
#[command(name = "gnmi")]
#[command(about = "Query and stream telemetry from gNMI-enabled devices")]
struct Cli {
    /// Username sent as request metadata
    #[arg(short, long, global = true)]
    username: Option<String>,

    /// Password sent as request metadata
    #[arg(short, long, global = true)]
    password: Option<String>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the target's models, encodings and protocol version
    Capabilities {
        /// Target as host[:port]
        target: String,
    },

    /// Fetch a snapshot of the given paths
    Get {
        /// Target as host[:port]
        target: String,

        /// Paths to fetch
        #[arg(required = true)]
        paths: Vec<String>,

        /// Prefix applied to every path
        #[arg(long)]
        prefix: Option<String>,

        /// Value encoding to request
        #[arg(long, default_value = "json")]
        encoding: Encoding,

        /// Class of data to retrieve
        #[arg(long = "type", default_value = "all")]
        data_type: DataType,
    },

    /// Stream updates for the given paths
    Subscribe {
        /// Target as host[:port]
        target: String,

        /// Paths to subscribe to
        #[arg(required = true)]
        paths: Vec<String>,

        /// Prefix applied to every path
        #[arg(long)]
        prefix: Option<String>,

        /// Delivery mode for the subscription list
        #[arg(long, default_value = "stream")]
        mode: StreamMode,

        /// Trigger policy for each path
        #[arg(long, default_value = "on-change")]
        submode: SubscriptionMode,

        /// Value encoding to request
        #[arg(long, default_value = "json")]
        encoding: Encoding,

        /// Sample interval in nanoseconds
        #[arg(long)]
        interval: Option<u64>,

        /// Heartbeat interval in nanoseconds
        #[arg(long)]
        heartbeat: Option<u64>,

        /// Stop the stream after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// DSCP marking for the stream
        #[arg(long, default_value_t = 0)]
        qos: u32,

        /// Allow the target to aggregate values
        #[arg(long)]
        aggregate: bool,

        /// Suppress unchanged sampled values
        #[arg(long)]
        suppress: bool,

        /// Request target-side path aliasing
        #[arg(long)]
        use_alias: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Cli {
        username,
        password,
        log_level,
        command,
    } = Cli::parse();

    init_tracing(&log_level)?;

    let connect = ConnectOptions {
        credentials: username.map(|username| Credentials {
            username,
            password: password.unwrap_or_default(),
        }),
        ..ConnectOptions::default()
    };

    match command {
        Command::Capabilities { target } => {
            let response = api::capabilities(&target, &connect).await?;
            println!("gNMI version: {}", response.version());
            for model in response.models() {
                println!("{} {} ({})", model.name(), model.version(), model.organization());
            }
            for &code in response.encodings() {
                match proto::Encoding::try_from(code) {
                    Ok(encoding) => println!("encoding: {encoding:?}"),
                    Err(_) => println!("encoding: {code}"),
                }
            }
        }

        Command::Get {
            target,
            paths,
            prefix,
            encoding,
            data_type,
        } => {
            let options = GetOptions {
                prefix,
                encoding,
                data_type,
            };
            for (path, value) in api::get(&target, &paths, &options, &connect).await? {
                print_pair(&path, value.as_ref());
            }
        }

        Command::Subscribe {
            target,
            paths,
            prefix,
            mode,
            submode,
            encoding,
            interval,
            heartbeat,
            timeout,
            qos,
            aggregate,
            suppress,
            use_alias,
        } => {
            let options = SubscribeOptions {
                prefix,
                mode,
                submode,
                encoding,
                qos,
                aggregate,
                suppress,
                use_alias,
                interval,
                heartbeat,
                timeout,
            };
            let mut stream = api::subscribe(&target, &paths, &options, &connect).await?;

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        info!("received shutdown signal");
                        break;
                    }
                    item = stream.next() => match item {
                        Some(pair) => {
                            let (path, value) = pair?;
                            print_pair(&path, value.as_ref());
                        }
                        None => break,
                    },
                }
            }
        }
    }

    Ok(())
}

fn print_pair(path: &str, value: Option<&Value>) {
    match value {
        Some(value) => println!("{path} = {value}"),
        None => println!("{path}"),
    }
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()
        .context("failed to initialize tracing")?;
    Ok(())
}
