use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use usbdetect_core::config::DetectorConfig;
use usbdetect_core::device::{DiskInfo, UsbStorageDevice};
use usbdetect_core::platform::{Detection, LinuxStorageDetector};

#[derive(Parser)]
#[command(name = "usbdetect")]
#[command(about = "Lists USB mass-storage drives mounted on this machine", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Detector configuration file (TOML)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List mounted USB drives
    List {
        /// Print the devices as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the udev properties used to classify one device node
    Info {
        /// Device node, e.g. /dev/sdb1
        #[arg(required = true)]
        device: String,
    },
}

/// Logs go to stderr so `list --json` output stays machine-readable.
/// `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<DetectorConfig> {
    match path {
        Some(path) => DetectorConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(DetectorConfig::default()),
    }
}

fn warn_if_degraded(detection: &Detection) {
    if !detection.is_degraded() {
        return;
    }
    eprintln!(
        "{} {} command(s) failed; the list may be incomplete:",
        style("WARNING:").yellow().bold(),
        detection.failures.len()
    );
    for failure in &detection.failures {
        eprintln!("  {failure}");
    }
}

fn print_devices(devices: &[UsbStorageDevice]) {
    if devices.is_empty() {
        println!("No USB drives found.");
        return;
    }

    println!("Found {} USB drive(s):", devices.len());
    println!(
        "\n  {:<15} {:<20} {:<12} {}",
        "DEVICE", "NAME", "UUID", "MOUNTED ON"
    );
    println!("  {:-<15} {:-<20} {:-<12} {:-<20}", "", "", "", "");
    for device in devices {
        println!("  {}", device);
    }
}

fn print_disk(disk: &DiskInfo) {
    let bus = if disk.is_usb {
        style("usb").green().to_string()
    } else {
        style("not usb").red().to_string()
    };
    let mount_point = if disk.mount_point.is_empty() {
        "(Not mounted)"
    } else {
        disk.mount_point.as_str()
    };

    println!("  Device: {}", style(disk.device()).cyan());
    println!("  Bus:    {bus}");
    println!("  Label:  {}", disk.name.as_deref().unwrap_or("-"));
    println!("  UUID:   {}", disk.uuid.as_deref().unwrap_or("-"));
    println!("  Mount:  {mount_point}");
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_ref())?;
    tracing::debug!(?config, "loaded configuration");
    let detector = LinuxStorageDetector::new(config);

    match cli.command {
        Commands::List { json } => {
            let detection = detector.detect();
            warn_if_degraded(&detection);
            let devices = detection.into_devices();

            if json {
                let out = serde_json::to_string_pretty(&devices)
                    .context("serializing device list")?;
                println!("{out}");
            } else {
                print_devices(&devices);
            }
        }
        Commands::Info { device } => {
            let disk = detector
                .detect_device(&device)
                .with_context(|| format!("inspecting {device}"))?;
            print_disk(&disk);
        }
    }

    Ok(())
}
