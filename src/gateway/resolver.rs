//! Model Resolver (C4): decides which provider should handle a given model
//! name (spec §4.2 "Resolution order").

use crate::gateway::catalog;
use crate::gateway::error::GatewayError;
use crate::gateway::registry::unknown_provider_message;

/// Prefix → provider-id sniffing table, consulted only when neither an
/// explicit `?provider=` query override nor a `provider/model` split
/// resolves the request (spec §4.2 "Prefix sniffing").
///
/// Open Question (a): `deepseek-` prefixed models resolve to the `deepseek`
/// provider id, not `groq`, even though Groq also serves DeepSeek-family
/// models — a caller wanting Groq's copy must use the `groq/deepseek-...`
/// split form or `?provider=groq`.
const PREFIX_TABLE: &[(&str, &str)] = &[
    ("gpt-", "openai"),
    ("o1", "openai"),
    ("o3", "openai"),
    ("claude-", "anthropic"),
    ("llama-", "groq"),
    ("mixtral-", "groq"),
    ("gemini-", "google"),
    ("command-", "cohere"),
    ("deepseek-", "deepseek"),
];

/// Resolve `(provider_id, bare_model_name)` for an incoming request.
///
/// Resolution order (spec §4.2):
/// 1. an explicit `?provider=` query parameter, if present;
/// 2. a `provider/model` split on the first `/` in the model string, when
///    the left-hand side names a known provider;
/// 3. prefix sniffing against [`PREFIX_TABLE`];
/// 4. otherwise `GatewayError::UnknownProvider`.
pub fn resolve<'a>(
    model: &'a str,
    query_provider: Option<&str>,
) -> Result<(&'static str, &'a str), GatewayError> {
    if let Some(p) = query_provider {
        let lower = p.to_lowercase();
        if let Some(def) = catalog::lookup(&lower) {
            return Ok((def.id, model));
        }
        return Err(GatewayError::UnknownProvider(unknown_provider_message()));
    }

    if let Some((head, tail)) = model.split_once('/') {
        let lower = head.to_lowercase();
        if let Some(def) = catalog::lookup(&lower) {
            return Ok((def.id, tail));
        }
    }

    let lower = model.to_lowercase();
    for (prefix, provider_id) in PREFIX_TABLE {
        if lower.starts_with(prefix) {
            let def = catalog::lookup(provider_id).expect("prefix table refers to known provider");
            return Ok((def.id, model));
        }
    }

    Err(GatewayError::UnknownProvider(unknown_provider_message()))
}
