use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::dev::{Server, ServerHandle};
use actix_web::{web, App, HttpServer};
use completion_client::CompletionClientTrait;
use tracing::{error, info};

use crate::config::ServiceConfig;
use crate::controllers::claims_controller;
use crate::middleware::TracingMiddleware;
use crate::prompts::PromptLoader;
use crate::relay::CompletionRelay;
use crate::shaper::ProcessSchema;

pub struct AppState {
    pub relay: CompletionRelay,
    pub prompts: PromptLoader,
    pub process_schema: ProcessSchema,
}

impl AppState {
    pub fn new(client: Arc<dyn CompletionClientTrait>, config: &ServiceConfig) -> Self {
        let mut prompts = PromptLoader::new();
        if let Some(dir) = &config.prompts_dir {
            prompts = prompts.with_override(dir.clone());
        }
        Self {
            relay: CompletionRelay::new(client, config.deployment.clone())
                .with_sampling(config.sampling),
            prompts,
            process_schema: config.process_schema.clone(),
        }
    }
}

pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.configure(claims_controller::config);
}

fn bind_listener(config: &ServiceConfig) -> Result<TcpListener, String> {
    let addrs = config.bind_addrs()?;
    TcpListener::bind(&addrs[..]).map_err(|e| format!("Failed to bind server: {e}"))
}

fn build_server(
    client: Arc<dyn CompletionClientTrait>,
    config: &ServiceConfig,
    listener: TcpListener,
    handle_signals: bool,
) -> Result<Server, String> {
    let payload_limit = config.payload_limit;
    let app_state = web::Data::new(AppState::new(client, config));

    info!("Prompt search locations: {:?}", app_state.prompts.roots());

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(web::PayloadConfig::new(payload_limit))
            .wrap(TracingMiddleware)
            .wrap(Cors::permissive())
            .configure(app_config)
    })
    .workers(config.workers.max(1));

    if !handle_signals {
        server = server.disable_signals();
    }

    Ok(server
        .listen(listener)
        .map_err(|e| format!("Failed to listen: {e}"))?
        .run())
}

pub async fn run(
    client: Arc<dyn CompletionClientTrait>,
    config: ServiceConfig,
) -> Result<(), String> {
    info!("Starting claims service...");

    let listener = bind_listener(&config)?;
    if let Ok(addr) = listener.local_addr() {
        info!("Claims service listening on http://{addr}");
    }
    let server = build_server(client, &config, listener, true)?;

    if let Err(e) = server.await {
        error!("Claims service error: {}", e);
        return Err(format!("Claims service error: {e}"));
    }

    Ok(())
}

/// Claims service running in a background task, stopped explicitly or on drop.
pub struct ClaimsService {
    handle: Option<ServerHandle>,
    server_task: Option<tokio::task::JoinHandle<()>>,
}

impl ClaimsService {
    pub fn new() -> Self {
        Self {
            handle: None,
            server_task: None,
        }
    }

    pub async fn start(
        &mut self,
        client: Arc<dyn CompletionClientTrait>,
        config: &ServiceConfig,
    ) -> Result<SocketAddr, String> {
        if self.server_task.is_some() {
            return Err("Claims service is already running".to_string());
        }

        let listener = bind_listener(config)?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {e}"))?;
        let server = build_server(client, config, listener, false)?;

        self.handle = Some(server.handle());
        self.server_task = Some(tokio::spawn(async move {
            if let Err(e) = server.await {
                error!("Claims service error: {}", e);
            }
        }));

        info!("Claims service started on http://{local_addr}");
        Ok(local_addr)
    }

    pub async fn stop(&mut self) -> Result<(), String> {
        if let Some(handle) = self.handle.take() {
            handle.stop(true).await;
        }

        if let Some(task) = self.server_task.take() {
            if let Err(e) = task.await {
                error!("Error waiting for server shutdown: {}", e);
                return Err(format!("Error waiting for server shutdown: {e}"));
            }
        }

        info!("Claims service stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.server_task.is_some()
    }
}

impl Default for ClaimsService {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ClaimsService {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            // The stop command is sent eagerly; the future only awaits completion.
            drop(handle.stop(false));
        }
    }
}
