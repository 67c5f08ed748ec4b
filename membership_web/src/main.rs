use std::{error::Error, sync::Arc};

use axum_server::tls_rustls::RustlsConfig;
use eventstore::ClientSettings;
use membership::{
    application::customer::CustomerService,
    domain::customer::CustomerRepository,
    infrastructure::{customer::EventStoreCustomerRepository, memory::InMemoryCustomerRepository},
    Backend, MembershipConfig,
};
use membership_web::router;
use tracing::{error, info, Level};

#[tokio::main]
async fn main() {
    match MembershipConfig::load() {
        Ok(config) => {
            tracing_subscriber::fmt()
                .with_max_level(Level::from(&config.logger.level))
                .init();
            if let Err(error) = serve(&config).await {
                error!("アプリケーションエラー: {}", error);
            }
        }
        Err(error) => {
            tracing_subscriber::fmt::init();
            error!("アプリケーションエラー: {}", error)
        }
    }
}

fn repository(config: &MembershipConfig) -> Result<Arc<dyn CustomerRepository>, Box<dyn Error>> {
    let repository: Arc<dyn CustomerRepository> = match config.storage.backend {
        Backend::Memory => Arc::new(InMemoryCustomerRepository::new()),
        Backend::EventStore => {
            let settings = config.eventstore.url.parse::<ClientSettings>()?;
            Arc::new(EventStoreCustomerRepository::new(eventstore::Client::new(
                settings,
            )?))
        }
    };
    Ok(repository)
}

async fn serve(config: &MembershipConfig) -> Result<(), Box<dyn Error>> {
    let service = CustomerService::new(repository(config)?)
        .with_policy(config.allocation.policy)
        .with_max_attempts(config.allocation.max_attempts);
    let app = router(Arc::new(service));

    info!(
        "{} で待ち受けます (ストレージ: {:?}, 採番: {:?})",
        config.server.address, config.storage.backend, config.allocation.policy
    );
    match &config.server.tls {
        Some(tls) => {
            let rustls = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
            axum_server::bind_rustls(config.server.address, rustls)
                .serve(app.into_make_service())
                .await?
        }
        None => {
            axum_server::bind(config.server.address)
                .serve(app.into_make_service())
                .await?
        }
    }
    Ok(())
}
