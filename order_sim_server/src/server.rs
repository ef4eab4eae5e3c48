use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use order_sim_engine::{
    broker::logging_handler,
    BrokerError,
    BrokerPublisher,
    HttpRelayBroker,
    MemoryQueue,
    MessageBroker,
    OrderGenerator,
    OrderPipelineApi,
};
use tokio_util::sync::CancellationToken;

use crate::{
    config::{BrokerConfig, GenerationSettings, ServerConfig},
    errors::ServerError,
    order_scheduler::OrderScheduler,
    routes::{health, GenerateOrdersRoute, SchedulerStatusRoute},
};

pub type SimPublisher = BrokerPublisher<Arc<dyn MessageBroker>>;
pub type SimPipeline = OrderPipelineApi<OrderGenerator, SimPublisher>;
pub type SimScheduler = OrderScheduler<OrderGenerator, SimPublisher>;

/// The order generation endpoints and the scheduler. Only present when the broker could be reached at startup.
#[derive(Clone)]
pub struct GenerationModule {
    pub api: Arc<SimPipeline>,
    pub scheduler: Arc<SimScheduler>,
}

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let module = match connect_broker(&config.broker).await {
        Ok(broker) => Some(create_generation_module(&config, broker)),
        Err(e) => {
            warn!(
                "📮️ The order broker is unavailable. Order generation is disabled and the scheduler will not run. \
                 {e}"
            );
            None
        },
    };
    serve(config, module).await
}

/// Binds the server and only then starts the scheduler, so a failed bind leaves nothing running.
pub async fn serve(config: ServerConfig, module: Option<GenerationModule>) -> Result<(), ServerError> {
    let scheduler_enabled = config.scheduler_enabled;
    let srv = create_server_instance(config, module.clone())?;
    let shutdown = CancellationToken::new();
    if let Some(module) = &module {
        if scheduler_enabled {
            module.scheduler.start(&shutdown);
        } else {
            info!("🕰️ The order scheduler is disabled");
        }
    }
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    if let Some(module) = module {
        module.scheduler.stop().await;
    }
    shutdown.cancel();
    result
}

pub async fn connect_broker(config: &BrokerConfig) -> Result<Arc<dyn MessageBroker>, BrokerError> {
    match config {
        BrokerConfig::Memory { queue_size } => {
            let queue = MemoryQueue::new(*queue_size, logging_handler());
            let broker = queue.broker();
            tokio::spawn(queue.start_consumer());
            info!("📮️ Publishing orders to the in-memory queue");
            Ok(Arc::new(broker))
        },
        BrokerConfig::HttpRelay { url } => {
            let broker = HttpRelayBroker::connect(url).await?;
            info!("📮️ Publishing orders to the relay at {}", broker.base_url());
            Ok(Arc::new(broker))
        },
    }
}

pub fn create_generation_module(config: &ServerConfig, broker: Arc<dyn MessageBroker>) -> GenerationModule {
    let generator = match config.generator_seed {
        Some(seed) => OrderGenerator::new().with_seed(seed),
        None => OrderGenerator::new(),
    };
    let api = Arc::new(OrderPipelineApi::new(generator, BrokerPublisher::new(broker)));
    let scheduler = Arc::new(OrderScheduler::new(api.clone(), config.scheduler.clone()));
    GenerationModule { api, scheduler }
}

pub fn create_server_instance(config: ServerConfig, module: Option<GenerationModule>) -> Result<Server, ServerError> {
    let settings = GenerationSettings::from(&config);
    let srv = HttpServer::new(move || {
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("osim::access_log"))
            .service(health);
        match &module {
            Some(module) => app
                .app_data(web::Data::from(module.api.clone()))
                .app_data(web::Data::from(module.scheduler.clone()))
                .app_data(web::Data::new(settings))
                .service(GenerateOrdersRoute::<OrderGenerator, SimPublisher>::new())
                .service(SchedulerStatusRoute::<OrderGenerator, SimPublisher>::new()),
            None => app,
        }
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

#[cfg(test)]
mod test {
    use std::net::TcpListener;

    use order_sim_engine::MemoryQueue;

    use super::*;

    #[actix_web::test]
    async fn failed_binds_leave_the_scheduler_idle() {
        let _ = env_logger::try_init();
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();
        let config = ServerConfig::new("127.0.0.1", port);
        assert!(config.scheduler_enabled);
        let queue = MemoryQueue::new(8, logging_handler());
        let module = create_generation_module(&config, Arc::new(queue.broker()));

        let err = serve(config, Some(module.clone())).await.unwrap_err();
        assert!(matches!(err, ServerError::IOError(_)), "{err}");
        assert!(!module.scheduler.is_running());
    }
}
