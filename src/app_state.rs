use crate::chat_server::ChatServer;
use crate::config::Config;
use crate::store::MongoDB;
use actix::Addr;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub chat_server: Addr<ChatServer>,
    pub mongodb: Arc<MongoDB>,
    pub config: Config,
}
