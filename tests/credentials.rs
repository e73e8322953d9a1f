//! Credential resolution chain, exercised end to end.
//!
//! Environment-variable scenarios live in one test function: the process
//! environment is shared and the test harness runs tests in parallel.

use briefpress::credentials::CREDENTIALS_JSON_ENV;
use briefpress::resolve_credentials;

const PRIMARY_ID: &str = "PDF_SERVICES_CLIENT_ID";
const PRIMARY_SECRET: &str = "PDF_SERVICES_CLIENT_SECRET";
const LEGACY_ID: &str = "ADOBE_PDF_SERVICES_CLIENT_ID";
const LEGACY_SECRET: &str = "ADOBE_PDF_SERVICES_CLIENT_SECRET";

fn clear_env() {
    for name in [
        CREDENTIALS_JSON_ENV,
        PRIMARY_ID,
        PRIMARY_SECRET,
        LEGACY_ID,
        LEGACY_SECRET,
    ] {
        std::env::remove_var(name);
    }
}

#[test]
fn resolution_chain_scenarios() {
    clear_env();

    // Override file wins over everything.
    let dir = tempfile::tempdir().unwrap();
    let creds_path = dir.path().join("creds.json");
    std::fs::write(
        &creds_path,
        r#"{"client_credentials": {"client_id": "file-id-12345", "client_secret": "file-secret-12345"}}"#,
    )
    .unwrap();
    let creds = resolve_credentials(Some(&creds_path)).unwrap();
    assert_eq!(creds.client_id, "file-id-12345");
    assert!(creds.source.starts_with("json:"));

    // Env path candidate is used when no override is given.
    std::env::set_var(CREDENTIALS_JSON_ENV, &creds_path);
    let creds = resolve_credentials(None).unwrap();
    assert_eq!(creds.client_id, "file-id-12345");
    std::env::remove_var(CREDENTIALS_JSON_ENV);

    // A corrupt override file is diagnosed but resolution continues to
    // the environment pair.
    let bad_path = dir.path().join("bad.json");
    std::fs::write(&bad_path, "not json").unwrap();
    std::env::set_var(PRIMARY_ID, "env-id-12345");
    std::env::set_var(PRIMARY_SECRET, "env-secret-12345");
    let creds = resolve_credentials(Some(&bad_path)).unwrap();
    assert_eq!(creds.client_id, "env-id-12345");
    assert!(creds.source.starts_with("env:"));

    // Primary pair beats the legacy pair.
    std::env::set_var(LEGACY_ID, "legacy-id-12345");
    std::env::set_var(LEGACY_SECRET, "legacy-secret-12345");
    let creds = resolve_credentials(None).unwrap();
    assert_eq!(creds.client_id, "env-id-12345");
    clear_env();

    // Half a pair is a distinct configuration error, not "no sources".
    std::env::set_var(LEGACY_ID, "legacy-id-12345");
    let err = resolve_credentials(None).unwrap_err();
    let message = err.to_string();
    assert!(
        message.contains("ADOBE_PDF_SERVICES_CLIENT_SECRET is missing"),
        "got: {message}"
    );
    assert!(!message.contains("No usable environment credentials"));
    clear_env();

    // Nothing anywhere: the consolidated error lists every attempt.
    let err = resolve_credentials(Some(dir.path().join("absent.json").as_path())).unwrap_err();
    assert!(err.attempts.len() >= 2, "attempts: {:?}", err.attempts);
    assert!(err.attempts[0].contains("override"));
    assert!(err.attempts.last().unwrap().contains("environment"));
}
