//! Static provider catalog (C1): identity, default URL, auth scheme, extra
//! headers, and endpoint paths for every provider the gateway knows about.
//! Populated once at startup and immutable thereafter (spec §5 "Shared
//! resources & locking": "the provider catalog is immutable post-init").

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// How a provider expects its credential attached (spec §4.1 "Credential attachment").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Bearer,
    XHeader,
    QueryParam,
    None,
}

/// A provider's fixed endpoint paths, relative to its `default_url`.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub chat: &'static str,
    pub models: &'static str,
    pub generate: Option<&'static str>,
}

/// Immutable, per-process provider identity (spec §3 "Provider definition").
#[derive(Debug, Clone)]
pub struct ProviderDef {
    pub id: &'static str,
    pub display_name: &'static str,
    pub default_url: &'static str,
    pub auth_scheme: AuthScheme,
    /// Header name used when `auth_scheme` is `XHeader`.
    pub auth_header_name: Option<&'static str>,
    /// Extra headers appended verbatim to every request to this provider.
    pub extra_headers: &'static [(&'static str, &'static str)],
    pub endpoints: Endpoints,
}

const DEFS: &[ProviderDef] = &[
    ProviderDef {
        id: "openai",
        display_name: "OpenAI",
        default_url: "https://api.openai.com/v1",
        auth_scheme: AuthScheme::Bearer,
        auth_header_name: None,
        extra_headers: &[],
        endpoints: Endpoints {
            chat: "/chat/completions",
            models: "/models",
            generate: None,
        },
    },
    ProviderDef {
        id: "anthropic",
        display_name: "Anthropic",
        default_url: "https://api.anthropic.com",
        auth_scheme: AuthScheme::XHeader,
        auth_header_name: Some("x-api-key"),
        extra_headers: &[("anthropic-version", "2023-06-01")],
        endpoints: Endpoints {
            chat: "/v1/chat/completions",
            models: "/v1/models",
            generate: None,
        },
    },
    ProviderDef {
        id: "groq",
        display_name: "Groq",
        default_url: "https://api.groq.com/openai/v1",
        auth_scheme: AuthScheme::Bearer,
        auth_header_name: None,
        extra_headers: &[],
        endpoints: Endpoints {
            chat: "/chat/completions",
            models: "/models",
            generate: None,
        },
    },
    ProviderDef {
        id: "google",
        display_name: "Google Gemini",
        default_url: "https://generativelanguage.googleapis.com/v1beta/openai",
        auth_scheme: AuthScheme::Bearer,
        auth_header_name: None,
        extra_headers: &[],
        endpoints: Endpoints {
            chat: "/chat/completions",
            models: "/models",
            generate: None,
        },
    },
    ProviderDef {
        id: "cohere",
        display_name: "Cohere",
        default_url: "https://api.cohere.ai/compatibility/v1",
        auth_scheme: AuthScheme::Bearer,
        auth_header_name: None,
        extra_headers: &[],
        endpoints: Endpoints {
            chat: "/chat/completions",
            models: "/models",
            generate: None,
        },
    },
    ProviderDef {
        id: "cloudflare",
        display_name: "Cloudflare Workers AI",
        default_url: "https://api.cloudflare.com/client/v4/accounts",
        auth_scheme: AuthScheme::Bearer,
        auth_header_name: None,
        extra_headers: &[],
        endpoints: Endpoints {
            chat: "/ai/v1/chat/completions",
            models: "/ai/v1/models",
            generate: None,
        },
    },
    ProviderDef {
        id: "ollama",
        display_name: "Ollama",
        default_url: "http://localhost:11434",
        auth_scheme: AuthScheme::None,
        auth_header_name: None,
        extra_headers: &[],
        endpoints: Endpoints {
            chat: "/v1/chat/completions",
            models: "/v1/models",
            generate: Some("/api/generate"),
        },
    },
    ProviderDef {
        id: "deepseek",
        display_name: "DeepSeek",
        default_url: "https://api.deepseek.com",
        auth_scheme: AuthScheme::Bearer,
        auth_header_name: None,
        extra_headers: &[],
        endpoints: Endpoints {
            chat: "/chat/completions",
            models: "/models",
            generate: None,
        },
    },
];

/// `provider-id → ProviderDef`, built once at first access.
pub static CATALOG: Lazy<HashMap<&'static str, &'static ProviderDef>> = Lazy::new(|| {
    let mut map = HashMap::with_capacity(DEFS.len());
    for def in DEFS {
        map.insert(def.id, def);
    }
    map
});

/// Look up a provider definition by lowercase id.
pub fn lookup(provider_id: &str) -> Option<&'static ProviderDef> {
    CATALOG.get(provider_id).copied()
}

/// Every known provider id, in catalog order.
pub fn provider_ids() -> impl Iterator<Item = &'static str> {
    DEFS.iter().map(|d| d.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_unique_keys_matching_def_count() {
        assert_eq!(CATALOG.len(), DEFS.len());
    }

    #[test]
    fn anthropic_uses_x_header_auth_with_version_header() {
        let def = lookup("anthropic").unwrap();
        assert_eq!(def.auth_scheme, AuthScheme::XHeader);
        assert_eq!(def.auth_header_name, Some("x-api-key"));
        assert!(def
            .extra_headers
            .iter()
            .any(|(k, _)| *k == "anthropic-version"));
    }

    #[test]
    fn ollama_requires_no_credential() {
        let def = lookup("ollama").unwrap();
        assert_eq!(def.auth_scheme, AuthScheme::None);
        assert_eq!(def.default_url, "http://localhost:11434");
    }

    #[test]
    fn unknown_provider_is_none() {
        assert!(lookup("not-a-provider").is_none());
    }
}
