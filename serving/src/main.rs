use std::io;

use env_logger::Env;
use log::info;
use serving::{ServerConfig, ServiceContext};

#[actix_rt::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env()?;
    info!("starting with {:?}", config.model_source);

    let context = ServiceContext::acquire(&config.model_source)?;
    info!(classes = context.labels().len(); "model ready");

    serving::serve(context, &config).await
}
