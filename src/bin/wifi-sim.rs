//! Host walkthrough of the WiFi controller against the simulated radio.
//!
//! Powers the radio on, scans, joins a network, switches to access-point
//! mode and powers off, printing each result as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin wifi-sim [config.json]
//! ```
//!
//! The optional argument is a manager configuration document; missing
//! fields use the defaults.

use log::{error, info, warn};
use serde_json::json;
use std::sync::Arc;
use wfx_wifi::config::{ManagerConfig, NetworkParams, Security};
use wfx_wifi::network::LoggingNetworkStack;
use wfx_wifi::wifi::sim::{SimulatedAp, SimulatedRadio};
use wfx_wifi::wifi::{ReturnCode, ScanResult, WifiError, WifiManager};

const SCAN_CAPACITY: usize = 8;

fn load_config() -> Result<ManagerConfig, String> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| format!("Cannot read {}: {}", path, e))?;
            ManagerConfig::from_json(&text).map_err(|e| format!("Invalid {}: {}", path, e))
        }
        None => Ok(ManagerConfig::default()),
    }
}

fn report<T>(step: &str, result: &Result<T, WifiError>) {
    let code = ReturnCode::from_result(result);
    let detail = match result {
        Ok(_) => String::new(),
        Err(e) => e.to_string(),
    };
    println!(
        "{}",
        json!({ "step": step, "code": format!("{:?}", code), "detail": detail })
    );
}

fn run(config: ManagerConfig) -> Result<(), WifiError> {
    let manager = WifiManager::new(config, Arc::new(LoggingNetworkStack), |events| {
        SimulatedRadio::new(events)
            .with_access_point(SimulatedAp::wpa2("home", "secret123", 6).with_rcpi(190))
            .with_access_point(SimulatedAp::open("cafe", 1).with_rcpi(150))
            .with_access_point(SimulatedAp::wpa2("office", "hunter2hunter2", 11))
    })
    .map_err(|e| {
        error!("Configuration rejected: {}", e);
        WifiError::UnsupportedParameter("manager configuration")
    })?;

    manager.power_on()?;
    report("power_on", &Ok::<(), WifiError>(()));

    let mut results = vec![ScanResult::default(); SCAN_CAPACITY];
    let scan = manager.scan(&mut results);
    report("scan", &scan);
    for result in results.iter().take(*scan.as_ref().unwrap_or(&0)) {
        println!(
            "{}",
            json!({
                "ssid": result.ssid_lossy(),
                "bssid": result.bssid.to_string(),
                "channel": result.channel,
                "rssi": result.rssi,
                "security": result.security.as_str(),
            })
        );
    }

    let station = NetworkParams::new("home", "secret123", 6, Security::Wpa2)
        .map_err(|_| WifiError::UnsupportedParameter("station parameters"))?;
    report("connect", &manager.connect(&station));
    report("mac", &manager.mac_address().map(|mac| mac.to_string()));

    let wrong = NetworkParams::new("office", "password1", 11, Security::Wpa2)
        .map_err(|_| WifiError::UnsupportedParameter("station parameters"))?;
    report("connect_wrong_passphrase", &manager.connect(&wrong));

    let ap = NetworkParams::new("wfx-sim", "letmein99", 11, Security::Wpa2)
        .map_err(|_| WifiError::UnsupportedParameter("access point parameters"))?;
    report("configure_ap", &manager.configure_ap(&ap));
    report("start_ap", &manager.start_ap());
    report("mac", &manager.mac_address().map(|mac| mac.to_string()));
    info!("Link up: {}", manager.is_connected());
    report("stop_ap", &manager.stop_ap());

    let off = manager.power_off();
    if let Err(WifiError::NotSupported(_)) = off {
        warn!("Power off completed; result code is NotSupported");
    }
    report("power_off", &off);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("=== WFX WiFi simulation starting ===");

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config) {
        error!("Simulation aborted: {}", e);
        std::process::exit(1);
    }
}
