pub mod credential;
pub mod io;

use serde::{Deserialize, Serialize};

use crate::analysis::client::ClientConfig;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub api_base_url: String,
    pub model_id: String,
    pub curve_model_id: String,
    pub grounding_with_google_search: bool,
    pub output_language: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            api_base_url: client.api_base_url,
            model_id: client.model_id,
            curve_model_id: client.curve_model_id,
            grounding_with_google_search: client.grounding_with_google_search,
            output_language: client.output_language,
        }
    }
}

impl AppSettings {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_base_url: self.api_base_url.trim_end_matches('/').to_string(),
            model_id: self.model_id.clone(),
            curve_model_id: self.curve_model_id.clone(),
            grounding_with_google_search: self.grounding_with_google_search,
            output_language: self.output_language.clone(),
        }
    }
}
