//! Thin CLI entry point: load configuration, build the provider registry,
//! optionally start the A2A worker, bind the HTTP server (spec §6 "Process
//! entry point").

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use llm_gateway::gateway::a2a_server::task::TaskStore;
use llm_gateway::gateway::config::GatewayConfig;
use llm_gateway::gateway::registry::ProviderRegistry;
use llm_gateway::gateway::server::{build_router, AppState};
use llm_gateway::gateway::telemetry_sink::TelemetrySink;
use llm_gateway::llm::client_wrapper::ClientWrapper;
use llm_gateway::llm::clients::openai::{Model, OpenAIClient};
use llm_gateway::tools::custom::CustomToolProtocol;
use llm_gateway::tools::tool_protocol::ToolRegistry;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = match GatewayConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    log::info!(
        "starting {} in {} mode",
        config.application_name,
        config.environment
    );

    let config = Arc::new(config);
    let registry = Arc::new(ProviderRegistry::from_config(&config));
    let telemetry = Arc::new(TelemetrySink::new());
    let task_store = TaskStore::new();

    let (worker, agent_card) = if config.a2a_enable {
        let upstream_key = config
            .provider_keys
            .get("openai")
            .cloned()
            .unwrap_or_default();
        let client: Arc<dyn ClientWrapper> = Arc::new(OpenAIClient::new_with_model_enum(
            &upstream_key,
            Model::GPT41Nano,
        ));
        let tools = Arc::new(ToolRegistry::new(Arc::new(CustomToolProtocol::new())));
        let worker = llm_gateway::gateway::a2a_server::worker::Worker::spawn(
            config.a2a_queue_capacity,
            config.a2a_max_chat_completion_iterations,
            task_store.clone(),
            client,
            tools,
            reqwest::Client::new(),
        );

        let agent_card = if config.a2a_expose {
            Some(llm_gateway::gateway::a2a_client::AgentCard {
                name: config.application_name.clone(),
                description: "LLM gateway exposed as an A2A agent".to_string(),
                url: format!("http://{}:{}", config.server_host, config.server_port),
                skills: Vec::new(),
            })
        } else {
            None
        };
        (Some(worker), agent_card)
    } else {
        (None, None)
    };

    // Periodically purge terminal A2A tasks (and their push configs) so the
    // in-memory task store doesn't grow unboundedly (spec.md:109/:147).
    {
        let sweep_store = task_store.clone();
        let cleanup_interval = config.a2a_cleanup_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(cleanup_interval);
            loop {
                ticker.tick().await;
                let ids = sweep_store.all_ids().await;
                sweep_store.sweep_terminal(&ids).await;
            }
        });
    }

    let state = AppState {
        config: config.clone(),
        registry,
        telemetry,
        task_store,
        worker,
        agent_card,
    };

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port)
        .parse()
        .expect("invalid SERVER_HOST/SERVER_PORT");

    let router = build_router(state);

    log::info!("listening on {}", addr);

    let handle = axum_server::Handle::new();
    {
        let handle = handle.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            log::info!("signal received, starting graceful shutdown");
            handle.graceful_shutdown(Some(Duration::from_secs(30)));
        });
    }

    let result = match (&config.server_tls_cert_path, &config.server_tls_key_path) {
        (Some(cert), Some(key)) => {
            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(cert, key)
                .await
                .expect("failed to load TLS certificate/key");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(router.into_make_service())
                .await
        }
        _ => {
            axum_server::bind(addr)
                .handle(handle)
                .serve(router.into_make_service())
                .await
        }
    };

    if let Err(e) = result {
        log::error!("server error: {}", e);
        std::process::exit(1);
    }

    log::info!("shut down gracefully");
}

/// Waits for Ctrl+C or (on unix) SIGTERM, whichever comes first — paired
/// with `axum_server::Handle::graceful_shutdown` so in-flight requests
/// finish before the process exits with code 0 (spec.md:184).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        term.recv().await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
