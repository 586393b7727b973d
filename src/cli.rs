use clap::Parser;

use crate::utils::version;

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
    /// Frame rate, i.e. number of frames (and simulation ticks) per second
    #[arg(short, long, value_name = "FLOAT", default_value_t = 60.0, value_parser = parse_frame_rate)]
    pub frame_rate: f64,

    /// Seed for the pipe gap generator, random when omitted
    #[arg(short, long, value_name = "U64")]
    pub seed: Option<u64>,

    /// Run the simulation without a terminal and print one JSON snapshot per tick
    #[arg(long)]
    pub headless: bool,

    /// Number of ticks to run in headless mode
    #[arg(long, value_name = "N", default_value_t = 600, requires = "headless")]
    pub ticks: u64,

    /// Fixed tick length in milliseconds for headless mode
    #[arg(long, value_name = "MS", default_value_t = 16, requires = "headless")]
    pub dt_ms: u64,

    /// Tap every N ticks in headless mode, 0 never taps
    #[arg(long, value_name = "N", default_value_t = 0, requires = "headless")]
    pub tap_every: u64,
}

fn parse_frame_rate(s: &str) -> Result<f64, String> {
    let rate: f64 = s.parse().map_err(|e| format!("`{s}` is not a number: {e}"))?;
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(format!("frame rate must be a positive number, got `{s}`"))
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["flappy-rs"]);
        assert_eq!(cli.frame_rate, 60.0);
        assert_eq!(cli.seed, None);
        assert!(!cli.headless);
    }

    #[test]
    fn test_headless_options() {
        let cli = Cli::parse_from(["flappy-rs", "--headless", "--ticks", "10", "--tap-every", "5", "-s", "3"]);
        assert!(cli.headless);
        assert_eq!(cli.ticks, 10);
        assert_eq!(cli.tap_every, 5);
        assert_eq!(cli.seed, Some(3));
    }

    #[test]
    fn test_headless_flags_need_headless() {
        assert!(Cli::try_parse_from(["flappy-rs", "--ticks", "10"]).is_err());
    }

    #[test]
    fn test_frame_rate_must_be_positive_and_finite() {
        for rate in ["0", "-1", "NaN", "inf", "fast"] {
            let arg = format!("--frame-rate={rate}");
            assert!(Cli::try_parse_from(["flappy-rs", arg.as_str()]).is_err(), "{rate} was accepted");
        }
        let cli = Cli::parse_from(["flappy-rs", "--frame-rate", "0.5"]);
        assert_eq!(cli.frame_rate, 0.5);
    }
}
