//! loadlink-logger - record samples from a LoadLink device
//!
//! Waits for the device's ready signal, then requests and records one
//! sample after another until the configured duration elapses or Ctrl-C.
//! On exit the device is told to restart its handshake.

use loadlink_hal::ConfigurableStream;
use loadlink_host::{HostError, Logger, LoggerConfig, Recorder, Result, SerialPortStream};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const HELP: &str = "\
loadlink-logger - record sensor samples from a LoadLink device

USAGE:
  loadlink-logger [OPTIONS]

OPTIONS:
  -h, --help              Prints help information
  -c, --config <path>     TOML configuration file
  -p, --port <path>       Serial port (overrides config)
  -o, --output <file>     CSV output file (overrides config)
  -d, --duration <secs>   Stop after this many seconds (overrides config)
";

#[derive(Debug)]
struct AppArgs {
    config: Option<PathBuf>,
    port: Option<String>,
    output: Option<PathBuf>,
    duration: Option<f64>,
}

fn parse_args() -> std::result::Result<AppArgs, pico_args::Error> {
    let mut pargs = pico_args::Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{}", HELP);
        std::process::exit(0);
    }

    let args = AppArgs {
        config: pargs.opt_value_from_str(["-c", "--config"])?,
        port: pargs.opt_value_from_str(["-p", "--port"])?,
        output: pargs.opt_value_from_str(["-o", "--output"])?,
        duration: pargs.opt_value_from_str(["-d", "--duration"])?,
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        eprintln!("Warning: unused arguments left: {:?}", remaining);
    }

    Ok(args)
}

fn load_config(args: &AppArgs) -> Result<LoggerConfig> {
    let mut config = match &args.config {
        Some(path) => LoggerConfig::load(path)?,
        None => LoggerConfig::default(),
    };

    if let Some(port) = &args.port {
        config.serial.port = port.clone();
    }
    if let Some(output) = &args.output {
        config.recording.output = output.clone();
    }
    if args.duration.is_some() {
        config.recording.max_duration_s = args.duration;
    }

    config.validate()?;
    Ok(config)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprint!("{}", HELP);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &AppArgs) -> Result<()> {
    let config = load_config(args)?;

    let uart = config.serial.uart();
    let mut stream = SerialPortStream::open(&config.serial.port, &uart)?;
    stream.configure(&uart)?;

    let labels = config.recording.channel_labels();
    let recorder = Recorder::create(&config.recording.output, &labels)?;
    let mut logger = Logger::new(stream, recorder, labels)?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .map_err(|e| HostError::Io(std::io::Error::other(e)))?;

    log::info!("Waiting for device on {}...", config.serial.port);

    let poll_interval = Duration::from_millis(config.recording.poll_interval_ms);
    let max_duration = config.recording.max_duration()?;

    while running.load(Ordering::SeqCst) {
        logger.poll()?;

        if let (Some(max), Some(elapsed)) = (max_duration, logger.elapsed()) {
            if elapsed >= max {
                log::info!("Recording time limit reached");
                break;
            }
        }

        thread::sleep(poll_interval);
    }

    logger.shutdown()?;
    Ok(())
}
