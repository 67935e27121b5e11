//! Configuration for the hamming-relay application.
//!
//! Handles parsing command-line arguments and filling in defaults. The
//! tool works with zero arguments: it listens where the reference service
//! listened, relays where it relayed, and uses the reference noise levels.
//! The seed is always resolved and logged so runs are reproducible.

use hamming_relay_core::channel::{ChannelConfig, LossModel};
use hamming_relay_core::{PaddingPolicy, PipelineConfig};

/// Default inbound listen address.
pub const DEFAULT_LISTEN: &str = "localhost:8001";

/// Default downstream relay endpoint.
pub const DEFAULT_RELAY_URL: &str = "http://localhost:8002/transfer";

/// Complete configuration for a run.
#[derive(Debug, Clone)]
pub struct Config {
    // === Transport ===
    /// Address the HTTP listener binds to
    pub listen: String,

    /// Where corrected segments are posted
    pub relay_url: String,

    /// Timeout for one relay call in milliseconds
    pub relay_timeout_ms: u64,

    // === Simulation ===
    /// Seed for the process-wide random source
    pub seed: u64,

    /// Channel noise, loss and padding policy
    pub pipeline: PipelineConfig,

    /// Run N generated segments offline instead of serving
    pub simulate: Option<usize>,

    // === Behavior ===
    /// Whether to print detailed config
    pub print_config: bool,
}

/// What the command line asked for.
#[derive(Debug, Clone)]
pub enum Command {
    Run(Config),
    Help,
}

impl Config {
    /// Parse configuration from command-line arguments (program name excluded).
    ///
    /// If `--seed` is not given, a time-based seed is used.
    pub fn from_args(args: &[String]) -> Result<Command, String> {
        let mut listen: Option<String> = None;
        let mut relay_url: Option<String> = None;
        let mut relay_timeout_ms: Option<u64> = None;
        let mut seed: Option<u64> = None;
        let mut channel = ChannelConfig::default();
        let mut loss = LossModel::default();
        let mut padding = PaddingPolicy::Truncate;
        let mut simulate: Option<usize> = None;
        let mut print_config = false;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--listen" => {
                    listen = Some(value(args, &mut i, "an address")?.to_string());
                }
                "--relay-url" => {
                    relay_url = Some(value(args, &mut i, "a URL")?.to_string());
                }
                "--relay-timeout-ms" => {
                    relay_timeout_ms = Some(parse(args, &mut i, "relay-timeout-ms")?);
                }
                "--seed" => {
                    seed = Some(parse(args, &mut i, "seed")?);
                }
                "--error-rate" => {
                    channel.error_rate = probability(args, &mut i, "error-rate")?;
                }
                "--double-rate" => {
                    channel.double_error_rate = probability(args, &mut i, "double-rate")?;
                }
                "--loss" => {
                    loss.loss_rate = probability(args, &mut i, "loss")?;
                }
                "--no-noise" => {
                    channel = ChannelConfig::perfect();
                    loss = LossModel::none();
                }
                "--keep-padding" => {
                    padding = PaddingPolicy::Preserve;
                }
                "--simulate" => {
                    simulate = Some(parse(args, &mut i, "simulate")?);
                }
                "--print-config" => {
                    print_config = true;
                }
                "--help" | "-h" => {
                    return Ok(Command::Help);
                }
                other => {
                    return Err(format!("unknown argument: {other}"));
                }
            }
            i += 1;
        }

        let seed = seed.unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|t| t.as_nanos() as u64)
                .unwrap_or(0)
        });

        Ok(Command::Run(Config {
            listen: listen.unwrap_or_else(|| DEFAULT_LISTEN.to_string()),
            relay_url: relay_url.unwrap_or_else(|| DEFAULT_RELAY_URL.to_string()),
            relay_timeout_ms: relay_timeout_ms.unwrap_or(5000),
            seed,
            pipeline: PipelineConfig {
                channel,
                loss,
                padding,
            },
            simulate,
            print_config,
        }))
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        match self.simulate {
            Some(n) => println!("Mode: offline simulation ({n} segments)"),
            None => println!("Mode: server on {}", self.listen),
        }
        println!("Relay: {} (timeout {} ms)", self.relay_url, self.relay_timeout_ms);
        println!();
        println!("=== Channel Simulation ===");
        println!("Seed: {}", self.seed);
        println!("Error rate: {:.2}%", self.pipeline.channel.error_rate * 100.0);
        println!("Double error share: {:.2}%", self.pipeline.channel.double_error_rate * 100.0);
        println!("Loss rate: {:.2}%", self.pipeline.loss.loss_rate * 100.0);
        println!("Padding: {:?}", self.pipeline.padding);
        println!();
    }
}

/// Take the argument following flag `i`, advancing `i`.
fn value<'a>(args: &'a [String], i: &mut usize, what: &str) -> Result<&'a str, String> {
    let flag = &args[*i];
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires {what}"))
}

fn parse<T: std::str::FromStr>(args: &[String], i: &mut usize, name: &str) -> Result<T, String> {
    value(args, i, "a number")?
        .parse()
        .map_err(|_| format!("invalid {name}"))
}

fn probability(args: &[String], i: &mut usize, name: &str) -> Result<f64, String> {
    let p: f64 = parse(args, i, name)?;
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!("{name} must be within 0.0-1.0, got {p}"))
    }
}

pub fn print_help() {
    println!("hamming-relay: relays bit-string segments through a simulated noisy Hamming-coded link");
    println!();
    println!("USAGE:");
    println!("    hamming-relay [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --listen <ADDR>          Listen address (default: {DEFAULT_LISTEN})");
    println!("    --relay-url <URL>        Relay target (default: {DEFAULT_RELAY_URL})");
    println!("    --relay-timeout-ms <MS>  Relay call timeout (default: 5000)");
    println!("    --seed <N>               Random seed for determinism");
    println!();
    println!("    --error-rate <P>         Per-codeword error probability (default: 0.07)");
    println!("    --double-rate <P>        Share of errors that flip two bits (default: 0.05)");
    println!("    --loss <P>               Whole-request loss probability (default: 0.01)");
    println!("    --no-noise               Disable errors and loss");
    println!("    --keep-padding           Relay block padding instead of trimming it");
    println!();
    println!("    --simulate <N>           Run N generated segments offline and print metrics");
    println!("    --print-config           Print resolved configuration");
    println!("    --help, -h               Print this help");
    println!();
    println!("EXAMPLES:");
    println!("    hamming-relay                                  # Serve with reference noise");
    println!("    hamming-relay --seed 42 --simulate 1000        # Deterministic offline run");
    println!("    hamming-relay --no-noise --listen 0.0.0.0:8001 # Clean link");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn run(list: &[&str]) -> Config {
        match Config::from_args(&args(list)).unwrap() {
            Command::Run(config) => config,
            Command::Help => panic!("unexpected help"),
        }
    }

    #[test]
    fn test_defaults() {
        let config = run(&[]);
        assert_eq!(config.listen, DEFAULT_LISTEN);
        assert_eq!(config.relay_url, DEFAULT_RELAY_URL);
        assert_eq!(config.relay_timeout_ms, 5000);
        assert_eq!(config.pipeline, PipelineConfig::default());
        assert_eq!(config.pipeline.channel.error_rate, 0.07);
        assert_eq!(config.pipeline.channel.double_error_rate, 0.05);
        assert_eq!(config.pipeline.loss.loss_rate, 0.01);
        assert_eq!(config.pipeline.padding, PaddingPolicy::Truncate);
        assert!(config.simulate.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = run(&[
            "--seed", "7", "--error-rate", "0.5", "--double-rate", "0.25", "--loss", "0", "--keep-padding",
            "--simulate", "10",
        ]);
        assert_eq!(config.seed, 7);
        assert_eq!(config.pipeline.channel.error_rate, 0.5);
        assert_eq!(config.pipeline.channel.double_error_rate, 0.25);
        assert_eq!(config.pipeline.loss.loss_rate, 0.0);
        assert_eq!(config.pipeline.padding, PaddingPolicy::Preserve);
        assert_eq!(config.simulate, Some(10));
    }

    #[test]
    fn test_no_noise() {
        let config = run(&["--no-noise"]);
        assert_eq!(config.pipeline.channel, ChannelConfig::perfect());
        assert_eq!(config.pipeline.loss, LossModel::none());
    }

    #[test]
    fn test_errors() {
        assert!(Config::from_args(&args(&["--seed"])).is_err());
        assert!(Config::from_args(&args(&["--seed", "x"])).is_err());
        assert!(Config::from_args(&args(&["--loss", "1.5"])).is_err());
        assert!(Config::from_args(&args(&["--bogus"])).is_err());
    }

    #[test]
    fn test_help() {
        assert!(matches!(Config::from_args(&args(&["-h"])), Ok(Command::Help)));
    }
}
