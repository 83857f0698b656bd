// src/chat_server.rs
//
// The live chat feed. Websocket sessions register here; every successful
// write re-reads the ordered message list and pushes the full snapshot to
// every registered session, so clients re-render the whole list on each
// change notification.

use std::collections::HashMap;
use std::sync::Arc;

use actix::prelude::*;
use log::{error, info};
use mongodb::bson::doc;

use crate::models::ChatMessage;
use crate::store::{self, MongoDB};

/// A serialized, timestamp-ordered snapshot of the whole feed.
#[derive(Message)]
#[rtype(result = "()")]
pub struct FeedSnapshot(pub String);

#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub session_id: String,
    pub addr: Recipient<FeedSnapshot>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub session_id: String,
}

/// Store a message on behalf of a websocket sender, then broadcast.
#[derive(Message)]
#[rtype(result = "()")]
pub struct PostMessage {
    pub email: String,
    pub message: String,
}

/// Re-read the feed and broadcast; sent after out-of-band writes.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Refresh;

pub struct ChatServer {
    sessions: HashMap<String, Recipient<FeedSnapshot>>,
    db: Arc<MongoDB>,
}

impl ChatServer {
    pub fn new(db: Arc<MongoDB>) -> Self {
        ChatServer {
            sessions: HashMap::new(),
            db,
        }
    }

    async fn load_snapshot(db: &MongoDB) -> Option<String> {
        match db
            .list_sorted::<ChatMessage>(store::MESSAGES, doc! { "timestamp": 1 })
            .await
        {
            Ok(messages) => match serde_json::to_string(&messages) {
                Ok(json) => Some(json),
                Err(e) => {
                    error!("Error serializing chat snapshot: {}", e);
                    None
                }
            },
            Err(e) => {
                error!("Error loading chat snapshot: {}", e);
                None
            }
        }
    }
}

impl Actor for ChatServer {
    type Context = Context<Self>;
}

impl Handler<Connect> for ChatServer {
    type Result = ResponseFuture<()>;

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) -> Self::Result {
        info!("Chat session {} connected", msg.session_id);
        let addr = msg.addr.clone();
        self.sessions.insert(msg.session_id, msg.addr);

        // New sessions get the current snapshot right away.
        let db = self.db.clone();
        Box::pin(async move {
            if let Some(snapshot) = Self::load_snapshot(&db).await {
                addr.do_send(FeedSnapshot(snapshot));
            }
        })
    }
}

impl Handler<Disconnect> for ChatServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        info!("Chat session {} disconnected", msg.session_id);
        self.sessions.remove(&msg.session_id);
    }
}

impl Handler<Refresh> for ChatServer {
    type Result = ResponseFuture<()>;

    fn handle(&mut self, _: Refresh, _: &mut Context<Self>) -> Self::Result {
        let sessions: Vec<Recipient<FeedSnapshot>> = self.sessions.values().cloned().collect();
        let db = self.db.clone();
        Box::pin(async move {
            if let Some(snapshot) = Self::load_snapshot(&db).await {
                for addr in sessions {
                    addr.do_send(FeedSnapshot(snapshot.clone()));
                }
            }
        })
    }
}

impl Handler<PostMessage> for ChatServer {
    type Result = ResponseFuture<()>;

    fn handle(&mut self, msg: PostMessage, _: &mut Context<Self>) -> Self::Result {
        let sessions: Vec<Recipient<FeedSnapshot>> = self.sessions.values().cloned().collect();
        let db = self.db.clone();
        Box::pin(async move {
            let new_message = ChatMessage::new(msg.email, msg.message);
            let messages_coll = db.collection::<ChatMessage>(store::MESSAGES);
            if let Err(e) = messages_coll.insert_one(&new_message).await {
                error!("Error storing chat message: {}", e);
                return;
            }
            // The sender sees their own message once this snapshot lands.
            if let Some(snapshot) = Self::load_snapshot(&db).await {
                for addr in sessions {
                    addr.do_send(FeedSnapshot(snapshot.clone()));
                }
            }
        })
    }
}
