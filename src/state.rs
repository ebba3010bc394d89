use std::sync::Arc;

use redis::aio::ConnectionManager;

use super::{config::Config, store::init_redis};

pub struct State {
    pub config: Config,
    pub redis_connection: ConnectionManager,
}

impl State {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let redis_connection = init_redis(&config.redis_url).await;

        Arc::new(Self {
            config,
            redis_connection,
        })
    }
}
