//! End-to-end issuance and validation with deterministic capabilities.

use chrono::{DateTime, Days, NaiveDate, Utc};
use hwlicense::activation::{activate, ActivationRequest};
use hwlicense::{
    ApiKey, Clock, FingerprintProvider, Issuer, LicenseValidator, SigningSecret, TimeOracle,
    ValidationState,
};
use std::sync::Arc;

const MACHINE: &str = "9F86D081884C7D659A2FEAA0C55AD015";
const OTHER_MACHINE: &str = "A665A45920422F9D417E4867EFDC4FB8";

struct FixedClock(NaiveDate);

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0.and_hms_opt(9, 30, 0).unwrap().and_utc()
    }
}

struct FixedFingerprint(&'static str);

impl FingerprintProvider for FixedFingerprint {
    fn fingerprint(&self) -> String {
        self.0.to_string()
    }
}

struct FixedTime(Option<NaiveDate>);

impl TimeOracle for FixedTime {
    fn trusted_date(&self) -> Option<NaiveDate> {
        self.0
    }
}

fn issue_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

fn secret() -> SigningSecret {
    SigningSecret::new("K").unwrap()
}

fn issuer() -> Issuer {
    Issuer::with_clock(secret(), Arc::new(FixedClock(issue_date())))
}

fn validator(machine: &'static str, today: Option<NaiveDate>) -> LicenseValidator {
    LicenseValidator::new(
        secret(),
        Arc::new(FixedFingerprint(machine)),
        Arc::new(FixedTime(today)),
    )
}

#[test]
fn issue_then_validate_same_day() {
    let issued = issuer().issue(30, MACHINE).unwrap();
    let expected_expiry = issue_date().checked_add_days(Days::new(30)).unwrap();
    assert_eq!(issued.expires, expected_expiry.format("%Y-%m-%d").to_string());

    let result = validator(MACHINE, Some(issue_date())).validate(&issued.license_key);
    assert_eq!(
        result.into_pair(),
        (true, format!("Valid until {}", issued.expires))
    );
}

#[test]
fn zero_day_license_valid_today_only() {
    let issued = issuer().issue(0, MACHINE).unwrap();
    assert!(validator(MACHINE, Some(issue_date())).validate(&issued.license_key).valid);

    let tomorrow = issue_date().succ_opt().unwrap();
    let result = validator(MACHINE, Some(tomorrow)).validate(&issued.license_key);
    assert_eq!(result.state, ValidationState::Expired);
}

#[test]
fn expired_yesterday() {
    let issued = issuer().issue(10, MACHINE).unwrap();
    let expiry = issue_date().checked_add_days(Days::new(10)).unwrap();
    let result = validator(MACHINE, expiry.succ_opt()).validate(&issued.license_key);
    assert_eq!(
        result.into_pair(),
        (false, format!("Expired on {}", issued.expires))
    );
}

#[test]
fn other_machine_is_rejected_even_when_current() {
    let issued = issuer().issue(30, MACHINE).unwrap();
    let result = validator(OTHER_MACHINE, Some(issue_date())).validate(&issued.license_key);
    assert_eq!(result.state, ValidationState::HwidFail);
    assert!(result.reason.contains(MACHINE));
    assert!(result.reason.contains(OTHER_MACHINE));
}

#[test]
fn tampered_signature_tail() {
    let issued = issuer().issue(30, MACHINE).unwrap();
    let mut tampered = issued.license_key.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'a' { 'b' } else { 'a' });

    let result = validator(MACHINE, Some(issue_date())).validate(&tampered);
    assert_eq!(
        result.into_pair(),
        (false, "Invalid Signature (Tampered)".to_string())
    );
}

#[test]
fn edited_claim_is_tampering() {
    // Re-point the key at another machine without re-signing.
    let issued = issuer().issue(30, MACHINE).unwrap();
    let (_, signature) = issued.license_key.split_once('.').unwrap();
    let forged_claim = hwlicense::token::encode_claim(&hwlicense::Claim::new(
        NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
        OTHER_MACHINE,
    ))
    .unwrap();
    let forged = format!("{}.{}", forged_claim, signature);

    let result = validator(OTHER_MACHINE, Some(issue_date())).validate(&forged);
    assert_eq!(result.state, ValidationState::SignatureFail);
}

#[test]
fn missing_separator_is_invalid_format() {
    let issued = issuer().issue(30, MACHINE).unwrap();
    let undelimited = issued.license_key.replace('.', "");
    let result = validator(MACHINE, Some(issue_date())).validate(&undelimited);
    assert_eq!(result.into_pair(), (false, "Invalid Format".to_string()));
}

#[test]
fn time_source_down_is_not_a_verdict() {
    let issued = issuer().issue(30, MACHINE).unwrap();
    let result = validator(MACHINE, None).validate(&issued.license_key);
    assert!(!result.valid);
    assert_eq!(result.state, ValidationState::TimeUnavailable);
}

#[test]
fn key_from_another_secret_is_rejected() {
    let foreign = Issuer::with_clock(
        SigningSecret::new("not-K").unwrap(),
        Arc::new(FixedClock(issue_date())),
    )
    .issue(30, MACHINE)
    .unwrap();
    let result = validator(MACHINE, Some(issue_date())).validate(&foreign.license_key);
    assert_eq!(result.state, ValidationState::SignatureFail);
}

#[test]
fn activation_round_trip() {
    let api_key = ApiKey::new("shared").unwrap();
    let request = ActivationRequest {
        hardware_id: format!(" {} ", MACHINE.to_lowercase()),
        duration: 30,
    };
    let response = activate(&issuer(), Some(&api_key), Some("shared"), &request).unwrap();

    let result = validator(MACHINE, Some(issue_date())).validate(&response.license_key);
    assert!(result.valid);
    assert_eq!(result.reason, format!("Valid until {}", response.expires));
}
