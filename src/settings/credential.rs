// src/settings/credential.rs
// The only place that reads or writes the API key outside a running request.
use bevy::log::{debug, error, info};
use thiserror::Error;

use crate::analysis::backend::Credential;

const KEYRING_SERVICE_NAME: &str = "chromadev";
const KEYRING_API_KEY_USERNAME: &str = "gemini_api_key";
const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("keyring access failed: {0}")]
    Keyring(#[from] keyring::Error),
    #[error("the API key is blank")]
    Blank,
}

/// Where the startup credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Keyring,
    Environment,
}

impl CredentialSource {
    pub fn label(self) -> &'static str {
        match self {
            CredentialSource::Keyring => "Key Set (Keyring)",
            CredentialSource::Environment => "Key Set (Environment)",
        }
    }
}

fn entry() -> Result<keyring::Entry, CredentialError> {
    Ok(keyring::Entry::new(KEYRING_SERVICE_NAME, KEYRING_API_KEY_USERNAME)?)
}

fn load_from_keyring() -> Result<Option<Credential>, CredentialError> {
    match entry()?.get_password() {
        Ok(key) => Ok(Credential::new(key)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn load_from_env() -> Option<Credential> {
    if let Err(e) = dotenvy::dotenv() {
        debug!("No .env file loaded: {}", e);
    }
    std::env::var(API_KEY_ENV_VAR).ok().and_then(Credential::new)
}

/// Keyring first, then `GEMINI_API_KEY` from the environment or `.env`.
pub fn load_credential() -> Option<(Credential, CredentialSource)> {
    match load_from_keyring() {
        Ok(Some(key)) => {
            info!("API Key found in keyring.");
            return Some((key, CredentialSource::Keyring));
        }
        Ok(None) => info!("No API Key found in keyring."),
        Err(e) => error!("Error accessing keyring: {}", e),
    }
    let key = load_from_env()?;
    info!("API Key taken from {}.", API_KEY_ENV_VAR);
    Some((key, CredentialSource::Environment))
}

pub fn store_credential(raw: &str) -> Result<Credential, CredentialError> {
    let key = Credential::new(raw).ok_or(CredentialError::Blank)?;
    entry()?.set_password(key.expose())?;
    info!("API Key saved to keyring.");
    Ok(key)
}

/// Removing a key that was never stored is not an error.
pub fn clear_credential() -> Result<(), CredentialError> {
    match entry()?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => {
            info!("API Key removed from keyring.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
