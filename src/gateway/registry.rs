//! Provider Registry (C3): builds a [`Provider`] handle — catalog definition
//! plus runtime config plus a pooled HTTP client — on demand per dispatch.

use std::collections::HashMap;

use crate::gateway::catalog::{self, AuthScheme, ProviderDef};
use crate::gateway::config::GatewayConfig;
use crate::gateway::error::GatewayError;
use crate::gateway::http_client_pool::get_or_create_client;

/// A fully-resolved provider instance: catalog definition, injected token,
/// injected client, and resolved base URL (spec §3 "Provider instance").
#[derive(Clone)]
pub struct Provider {
    pub def: &'static ProviderDef,
    pub base_url: String,
    pub token: Option<String>,
    pub client: reqwest::Client,
}

impl Provider {
    /// Apply this provider's credential-attachment rule to a request builder
    /// (spec §4.1 "Credential attachment").
    pub fn authorize(&self, mut builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.def.auth_scheme {
            AuthScheme::Bearer => {
                if let Some(token) = &self.token {
                    builder = builder.bearer_auth(token);
                }
            }
            AuthScheme::XHeader => {
                if let (Some(header), Some(token)) = (self.def.auth_header_name, &self.token) {
                    builder = builder.header(header, token);
                }
            }
            AuthScheme::QueryParam => {
                if let Some(token) = &self.token {
                    builder = builder.query(&[("key", token.as_str())]);
                }
            }
            AuthScheme::None => {}
        }
        for (name, value) in self.def.extra_headers {
            builder = builder.header(*name, *value);
        }
        builder
    }

    pub fn chat_url(&self) -> String {
        format!("{}{}", self.base_url, self.def.endpoints.chat)
    }

    pub fn models_url(&self) -> String {
        format!("{}{}", self.base_url, self.def.endpoints.models)
    }
}

/// Builds [`Provider`] handles from the static catalog plus runtime
/// configuration (spec §2 "C3 Provider Registry").
pub struct ProviderRegistry {
    provider_urls: HashMap<String, String>,
    provider_keys: HashMap<String, String>,
}

impl ProviderRegistry {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            provider_urls: config.provider_urls.clone(),
            provider_keys: config.provider_keys.clone(),
        }
    }

    /// `build(provider-id, client) → Provider | Error` (spec §4.1 "Build contract").
    pub fn build(&self, provider_id: &str) -> Result<Provider, GatewayError> {
        let def = catalog::lookup(provider_id)
            .ok_or_else(|| GatewayError::UnknownProvider(unknown_provider_message()))?;

        let base_url = self
            .provider_urls
            .get(provider_id)
            .cloned()
            .unwrap_or_else(|| def.default_url.to_string());

        let token = self.provider_keys.get(provider_id).cloned();
        if def.auth_scheme != AuthScheme::None && token.is_none() {
            return Err(GatewayError::MissingCredential(format!(
                "no credential configured for provider '{}'",
                provider_id
            )));
        }

        let client = get_or_create_client(&base_url);
        Ok(Provider {
            def,
            base_url,
            token,
            client,
        })
    }

    /// Every provider id with an explicit credential or default-auth-scheme
    /// `none`, in catalog order — used by the "all providers" list-models fan-out.
    pub fn configured_provider_ids(&self) -> Vec<&'static str> {
        catalog::provider_ids()
            .filter(|id| self.build(id).is_ok())
            .collect()
    }
}

pub fn unknown_provider_message() -> String {
    "Unable to determine provider for model. Please specify a provider.".to_string()
}
