pub mod config;
pub mod context;
pub mod error;
pub mod routes;
pub mod schema;

use std::{future, io};

use actix_web::{
    App, HttpServer,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web,
};
use log::{info, warn};
use tokio::signal;

pub use config::{ModelSource, ServerConfig};
pub use context::ServiceContext;
pub use error::{ApiError, ServerError};

/// Builds the application serving `context`.
pub fn app(
    context: web::Data<ServiceContext>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(context).configure(routes::configure)
}

/// Binds to the configured address and serves `context` until the server
/// stops or Ctrl-C is received.
///
/// # Errors
/// Returns an `io::Error` if the address cannot be bound.
pub async fn serve(context: ServiceContext, config: &ServerConfig) -> io::Result<()> {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("received SIGINT"),
            Err(e) => {
                warn!("cannot listen for SIGINT: {e}");
                future::pending::<()>().await;
            }
        }
    };

    serve_until(context, config, ctrl_c).await
}

/// Like `serve`, but stops gracefully once `shutdown` completes: the listener
/// is closed and requests already accepted are answered before returning.
///
/// # Errors
/// Returns an `io::Error` if the address cannot be bound.
pub async fn serve_until<F>(
    context: ServiceContext,
    config: &ServerConfig,
    shutdown: F,
) -> io::Result<()>
where
    F: Future<Output = ()>,
{
    let context = web::Data::new(context);
    let mut server = HttpServer::new(move || app(context.clone()))
        .disable_signals()
        .bind((config.host.as_str(), config.port))?
        .run();

    let handle = server.handle();
    info!("listening at {}", config.addr());

    tokio::select! {
        ret = &mut server => {
            ret?;
            info!("server stopped");
        }
        _ = shutdown => {
            info!("shutting down, draining in-flight requests");
            let stop = handle.stop(true);
            server.await?;
            stop.await;
            info!("server stopped");
        }
    }

    Ok(())
}
