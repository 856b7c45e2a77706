use clap::Parser;
use embassy_executor::Executor;
use mecanum_core::mk_static;
use mecanum_core::utils::controllers::PwmDriver;
use mecanum_core::utils::{
    ConfigError, DRIVE_CHANNEL, DriveCommand, VehicleConfig, VehicleController,
};
use std::convert::Infallible;
use std::fmt;
use std::io::BufRead;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    /// JSON vehicle configuration file
    #[clap(long)]
    config: Option<PathBuf>,
    /// initial speed for every wheel
    #[clap(long)]
    initial_speed: Option<u16>,
    /// speed step for every wheel
    #[clap(long)]
    step: Option<u16>,
    /// PWM frequency in Hz
    #[clap(long)]
    frequency: Option<u16>,
}

/// PWM driver that logs every channel write to the console.
struct ConsolePwm;

impl PwmDriver for ConsolePwm {
    type Error = Infallible;

    fn set_channel_duty(
        &mut self,
        channel: u8,
        duty: u16,
        phase: u16,
    ) -> Result<(), Self::Error> {
        info!(channel, duty, phase, "PWM");
        Ok(())
    }
}

#[embassy_executor::task]
async fn drive_task(mut ctrl: VehicleController<ConsolePwm>) -> ! {
    ctrl.drive_ch().await
}

/// Reasons the vehicle configuration could not be loaded.
#[derive(Debug)]
enum LoadError {
    Read(PathBuf, std::io::Error),
    Parse(PathBuf, serde_json::Error),
    Invalid(ConfigError),
}

impl fmt::Display for LoadError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            LoadError::Read(path, e) => write!(f, "{}: {}", path.display(), e),
            LoadError::Parse(path, e) => write!(f, "{}: {}", path.display(), e),
            LoadError::Invalid(e) => write!(f, "{}", e),
        }
    }
}

impl From<ConfigError> for LoadError {
    fn from(e: ConfigError) -> Self {
        LoadError::Invalid(e)
    }
}

fn load_config(opts: &Opts) -> Result<VehicleConfig, LoadError> {
    let mut config = match &opts.config {
        Some(path) => {
            let bytes = std::fs::read(path).map_err(|e| LoadError::Read(path.clone(), e))?;
            VehicleConfig::from_json(&bytes).map_err(|e| LoadError::Parse(path.clone(), e))?
        }
        None => VehicleConfig::default(),
    };
    if let Some(speed) = opts.initial_speed {
        config = config.with_initial_speed(speed);
    }
    if let Some(step) = opts.step {
        config = config.with_step(step);
    }
    if let Some(hz) = opts.frequency {
        config.frequency_hz = hz;
    }
    config.validate()?;
    Ok(config)
}

/// Parse JSON commands from stdin, one per line, into `DRIVE_CHANNEL`.
fn read_console() {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("stdin read failed: {}", e);
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match DriveCommand::from_json(line.as_bytes()) {
            Ok(cmd) => {
                if DRIVE_CHANNEL.try_send(cmd).is_err() {
                    warn!("drive queue full, command dropped");
                }
            }
            Err(error) => error!(?error, "invalid command format"),
        }
    }
    info!("console closed");
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opts: Opts = Opts::parse();
    let config = match load_config(&opts) {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    // prescale was validated with the rest of the configuration
    info!(
        frequency_hz = config.frequency_hz,
        prescale = config.pwm_prescale().unwrap_or_default(),
        "PWM frequency configured (simulated)"
    );

    let ctrl = match VehicleController::new(ConsolePwm, &config) {
        Ok(ctrl) => ctrl,
        Err(e) => {
            error!("drive init failed: {}", e);
            std::process::exit(1);
        }
    };

    info!(r#"Enter commands, e.g. {{"dc":"move","m":"clock12"}} or {{"dc":"speed","op":"+"}}"#);
    std::thread::spawn(read_console);

    let executor = mk_static!(Executor, Executor::new());
    executor.run(|spawner| {
        spawner.spawn(drive_task(ctrl)).unwrap();
    });
}
