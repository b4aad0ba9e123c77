//! Command line interface, reads connection parameters, runs one operation and prints the KME answer

use std::io::Write;
use std::time::Duration;
use clap::{Parser, Subcommand};
use log::{info, warn};
use crate::config::{ConfigFile, ConnectionConfig};
use crate::qkd014_data::request_obj::KeyRequest;
use crate::qkd014_data::Qkd014Data;
use crate::{KmeReply, Qkd014Client, Qkd014Error, HTTP_STATUS_OK};

/// Exit code when the KME answered 200
pub const EXIT_CODE_SUCCESS: i32 = 0;
/// Exit code when the KME answered with an error object
pub const EXIT_CODE_KME_ERROR: i32 = 1;
/// Exit code when no valid answer could be obtained
pub const EXIT_CODE_FAILURE: i32 = 2;

/// ETSI GS QKD 014 client, retrieves keys from a KME
#[derive(Parser, Debug)]
#[command(name = "qkd014-client", version)]
pub struct CliArgs {
    /// Hostname of the KME, with optional port
    #[arg(short = 'H', long, global = true)]
    pub hostname: Option<String>,

    /// Path of the certificate file
    #[arg(short, long, global = true)]
    pub cert: Option<String>,

    /// Path of the key file
    #[arg(short, long, global = true)]
    pub key: Option<String>,

    /// Path of the root CA file
    #[arg(short = 'r', long, global = true)]
    pub ca: Option<String>,

    /// Do not check the KME server certificate (insecure)
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Path of the JSON configuration file, replaces all connection parameters
    #[arg(short = 'C', long, global = true)]
    pub config: Option<String>,

    /// Request timeout, in seconds
    #[arg(short, long, global = true)]
    pub timeout: Option<u64>,

    /// Print the KME answer as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Get status of the keys shared with a slave SAE
    GetStatus {
        /// ID of the slave SAE
        sae_id: String,
    },
    /// Get key(s) to share with a slave SAE
    GetKey {
        /// ID of the slave SAE
        sae_id: String,
        /// Number of keys requested
        #[arg(short, long)]
        number: Option<u64>,
        /// Size of each key in bits
        #[arg(short, long)]
        size: Option<u64>,
        /// Other slave SAE to share the keys with, may be repeated
        #[arg(short, long = "additional-slave-sae-id")]
        additional_slave_sae_ids: Vec<String>,
    },
    /// Get key(s) from a master SAE, given their IDs
    GetKeyWithId {
        /// ID of the master SAE
        sae_id: String,
        /// Key ID(s) given by the master SAE
        #[arg(required = true)]
        key_ids: Vec<String>,
    },
}

impl CliArgs {
    /// Log level matching the verbosity flags
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }

    /// Connection parameters, from the configuration file if given, from command line otherwise
    /// # Errors
    /// A configuration error naming the missing parameter
    pub fn connection_config(&self) -> Result<ConnectionConfig, Qkd014Error> {
        let config = match &self.config {
            Some(config_path) => {
                info!("Attempting to read configuration file {}", config_path);
                let config = ConfigFile::from_json_path(config_path)?.to_connection_config()?;
                info!("Configuration file successfully read");
                config
            }
            None => {
                info!("Attempting to read configuration from the command line arguments");
                let hostname = Self::required_arg(&self.hostname, "hostname", "-H or --hostname")?;
                let cert = Self::required_arg(&self.cert, "cert", "-c or --cert")?;
                let key = Self::required_arg(&self.key, "key", "-k or --key")?;
                let ca = match (&self.ca, self.force) {
                    (None, true) => "",
                    _ => Self::required_arg(&self.ca, "ca", "-r or --ca")?,
                };
                let config = ConnectionConfig::new(hostname, cert, key, ca, self.force)?;
                info!("Command line parameters successfully read");
                config
            }
        };
        Ok(match self.timeout {
            Some(timeout_secs) => config.with_timeout(Duration::from_secs(timeout_secs)),
            None => config,
        })
    }

    fn required_arg<'a>(value: &'a Option<String>, name: &str, flags: &str) -> Result<&'a str, Qkd014Error> {
        value.as_deref().ok_or_else(|| {
            Qkd014Error::Config(format!("{} parameter is missing. Give the {} parameter with {}.", name, name, flags))
        })
    }
}

/// Run the selected command and print the result to `out`, errors are printed to stderr
/// # Returns
/// The process exit code
pub fn run(args: &CliArgs, out: &mut impl Write) -> i32 {
    let reply = args.connection_config()
        .and_then(Qkd014Client::new)
        .and_then(|client| execute(&client, &args.command));
    match reply.and_then(|reply| print_reply(&reply, args.json, out).map(|_| reply.0)) {
        Ok(HTTP_STATUS_OK) => EXIT_CODE_SUCCESS,
        Ok(_) => EXIT_CODE_KME_ERROR,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_CODE_FAILURE
        }
    }
}

/// Run the selected command against the KME
pub fn execute<T: crate::transport::KmeTransport>(client: &Qkd014Client<T>, command: &Command) -> Result<KmeReply, Qkd014Error> {
    match command {
        Command::GetStatus { sae_id } => client.get_status(sae_id),
        Command::GetKey { sae_id, number, size, additional_slave_sae_ids } => {
            let key_request = KeyRequest {
                number: *number,
                size: *size,
                additional_slave_SAE_IDs: if additional_slave_sae_ids.is_empty() {
                    None
                } else {
                    Some(additional_slave_sae_ids.clone())
                },
                ..Default::default()
            };
            client.get_key_with_request(sae_id, &key_request)
        }
        Command::GetKeyWithId { sae_id, key_ids } => {
            for key_id in key_ids {
                if uuid::Uuid::parse_str(key_id).is_err() {
                    warn!("Key ID {} is not in UUID format", key_id);
                }
            }
            client.get_key_with_key_ids(sae_id, key_ids.clone(), None, None)
        }
    }
}

/// Print the status code and the payload, human readable or JSON
pub fn print_reply(reply: &KmeReply, as_json: bool, out: &mut impl Write) -> Result<(), Qkd014Error> {
    let (code, data) = reply;
    let text = if as_json {
        data.to_json_pretty()?
    } else {
        format!("{}", data)
    };
    let write_result = writeln!(out, "Response code : {}\n", code)
        .and_then(|_| writeln!(out, "{}", text))
        .and_then(|_| match data {
            Qkd014Data::KeyContainer(key_container) if !as_json => {
                for key in &key_container.keys {
                    match key.decode_key() {
                        Ok(key_bytes) => writeln!(out, "Key {} size : {} bits", key.key_ID, key_bytes.len() * 8)?,
                        Err(e) => warn!("{}", e),
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        });
    write_result.map_err(|e| Qkd014Error::Output(format!("Cannot write output: {}", e)))
}
