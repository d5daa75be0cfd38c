//! Issue a license for this machine and validate it.
//!
//! # Running
//!
//! ```bash
//! export SECRET_KEY="change-me"
//! cargo run --example issue_and_validate
//! cargo run --example issue_and_validate -- <license-key>
//! ```
//!
//! Without an argument a 30-day key is issued for this machine and then
//! validated. With an argument that key is validated instead.

use hwlicense::{
    FingerprintProvider, HttpTimeOracle, Issuer, LicenseValidator, LicensingConfig,
    SystemFingerprint, ValidationState,
};
use std::sync::Arc;
use tracing::{error, info, Level};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .init();

    // A missing secret is fatal: stop before doing anything else.
    let config = match LicensingConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let fingerprint = SystemFingerprint::new(config.probe_timeout);
    let hwid = fingerprint.fingerprint();
    info!("This machine's HWID: {}", hwid);

    let license_key = match std::env::args().nth(1) {
        Some(key) => key,
        None => match Issuer::new(config.secret.clone()).issue(30, &hwid) {
            Ok(issued) => {
                info!("Issued key valid until {}", issued.expires);
                println!("{}", issued.license_key);
                issued.license_key
            }
            Err(e) => {
                error!("Issuance failed: {}", e);
                std::process::exit(1);
            }
        },
    };

    let oracle = match HttpTimeOracle::new(&config) {
        Ok(o) => o,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let validator = LicenseValidator::new(config.secret.clone(), Arc::new(fingerprint), Arc::new(oracle));
    let result = validator.validate(&license_key);

    match result.state {
        ValidationState::Valid => println!("✓ {}", result.reason),
        ValidationState::TimeUnavailable => {
            eprintln!("✗ {} (check network access to {})", result.reason, config.time_source_url)
        }
        _ => eprintln!("✗ {}", result.reason),
    }

    if !result.valid {
        std::process::exit(1);
    }
}
