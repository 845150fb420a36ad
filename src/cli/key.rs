// src/cli/key.rs
use super::CliError;
use crate::settings::credential;

pub fn set_key(key: &str) -> Result<(), CliError> {
    credential::store_credential(key)?;
    println!("API key saved to the system keyring.");
    Ok(())
}

pub fn clear_key() -> Result<(), CliError> {
    credential::clear_credential()?;
    println!("API key removed from the system keyring.");
    Ok(())
}

pub fn key_status() {
    match credential::load_credential() {
        Some((_, source)) => println!("{}", source.label()),
        None => println!("No Key Set"),
    }
}
