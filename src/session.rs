//! Per-invocation AWS session setup.
//!
//! Credential resolution happens exactly once per run and the result is
//! only ever handed to [`crate::store::SsmStore`]; nothing else in the
//! crate touches ambient AWS state. With `--mfa`, a token code is read
//! from stdin and exchanged for temporary session credentials via STS.

use std::io::Write;

use aws_config::{BehaviorVersion, SdkConfig};
use aws_credential_types::Credentials;
use aws_credential_types::provider::SharedCredentialsProvider;
use tracing::debug;

use crate::error::{Error, Result};

/// Environment variable naming the MFA device serial (an ARN such as
/// `arn:aws:iam::123456789012:mfa/alice`).
pub const MFA_SERIAL_VAR: &str = "PEMSTORE_MFA_SERIAL";

/// Loads the SDK configuration for this invocation.
///
/// `profile` falls back to `AWS_PROFILE` and then to the default credential
/// chain. When `mfa` is set, prompts for a token code and rebuilds the
/// configuration around STS session credentials.
pub async fn load_sdk_config(profile: Option<String>, mfa: bool) -> Result<SdkConfig> {
    let profile = profile
        .filter(|p| !p.is_empty())
        .or_else(|| std::env::var("AWS_PROFILE").ok());

    let mut builder = aws_config::defaults(BehaviorVersion::latest());
    if let Some(profile) = &profile {
        debug!(profile, "using AWS profile");
        builder = builder.profile_name(profile);
    }
    let base = builder.load().await;

    if !mfa {
        return Ok(base);
    }

    let serial = std::env::var(MFA_SERIAL_VAR).map_err(|_| Error::MfaSerialMissing)?;
    let code = prompt_token_code()?;

    let sts = aws_sdk_sts::Client::new(&base);
    let resp = sts
        .get_session_token()
        .serial_number(serial)
        .token_code(code)
        .send()
        .await
        .map_err(Error::remote)?;
    let session = resp
        .credentials
        .ok_or_else(|| Error::Remote("STS returned no session credentials".to_string().into()))?;

    let credentials = Credentials::new(
        session.access_key_id,
        session.secret_access_key,
        Some(session.session_token),
        None,
        "pemstore-mfa-session",
    );
    Ok(base
        .to_builder()
        .credentials_provider(SharedCredentialsProvider::new(credentials))
        .build())
}

/// Reads an MFA token code from stdin, prompting on stderr so stdout stays
/// clean for command output.
fn prompt_token_code() -> Result<String> {
    let mut stderr = std::io::stderr();
    write!(stderr, "MFA token code: ").map_err(|e| Error::io("stderr", e))?;
    stderr.flush().map_err(|e| Error::io("stderr", e))?;

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| Error::io("stdin", e))?;

    let code = line.trim().to_string();
    if code.is_empty() {
        return Err(Error::MfaTokenEmpty);
    }
    Ok(code)
}
