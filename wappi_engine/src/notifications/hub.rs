use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use log::*;
use tokio::sync::{
    mpsc,
    mpsc::error::TrySendError,
    oneshot,
};

use super::{Notification, NotificationType, OrderClaimedPayload};

pub type ClientId = u64;

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// A connected listener. The hub holds the only sender for the client's outbound buffer, so dropping the client closes
/// the buffer and lets the client's writer task wind down.
#[derive(Debug)]
pub struct HubClient {
    id: ClientId,
    user_id: Option<String>,
    sender: mpsc::Sender<String>,
    is_manager: bool,
}

impl HubClient {
    /// Creates a client with an outbound buffer of `buffer_size` messages, returning the receiving end of the buffer.
    pub fn new(user_id: Option<String>, is_manager: bool, buffer_size: usize) -> (Self, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        let id = NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed);
        (Self { id, user_id, sender, is_manager }, receiver)
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn is_manager(&self) -> bool {
        self.is_manager
    }
}

#[derive(Debug)]
enum HubCommand {
    Register(HubClient),
    Unregister(ClientId),
    Broadcast(String),
    ClientCount(oneshot::Sender<usize>),
}

/// The notification hub actor. Create it, hand out [`HubHandle`]s, then spawn [`NotificationHub::run`].
pub struct NotificationHub {
    receiver: mpsc::Receiver<HubCommand>,
    sender: mpsc::Sender<HubCommand>,
}

impl NotificationHub {
    pub fn new(buffer_size: usize) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        Self { receiver, sender }
    }

    pub fn handle(&self) -> HubHandle {
        HubHandle { sender: self.sender.clone() }
    }

    /// Processes commands in the order they were submitted. Returns once every [`HubHandle`] has been dropped.
    pub async fn run(self) {
        debug!("📡️ Starting notification hub");
        let Self { mut receiver, sender } = self;
        // Without our own sender, the loop ends when the last handle goes away.
        drop(sender);
        let mut clients = ClientSet::default();
        while let Some(command) = receiver.recv().await {
            match command {
                HubCommand::Register(client) => clients.register(client),
                HubCommand::Unregister(id) => clients.unregister(id),
                HubCommand::Broadcast(message) => clients.broadcast(message),
                HubCommand::ClientCount(reply) => {
                    let _ = reply.send(clients.len());
                },
            }
        }
        let remaining = clients.close_all();
        debug!("📡️ Notification hub has shut down. {remaining} clients were disconnected");
    }
}

/// The hub's view of who is connected. Only ever touched from inside [`NotificationHub::run`].
#[derive(Default)]
struct ClientSet {
    clients: HashMap<ClientId, HubClient>,
}

impl ClientSet {
    fn len(&self) -> usize {
        self.clients.len()
    }

    fn register(&mut self, client: HubClient) {
        debug!(
            "📡️ Client {} registered (user: {}, manager: {})",
            client.id,
            client.user_id.as_deref().unwrap_or("anonymous"),
            client.is_manager
        );
        self.clients.insert(client.id, client);
        trace!("📡️ {} clients connected", self.clients.len());
    }

    fn unregister(&mut self, id: ClientId) {
        match self.clients.remove(&id) {
            Some(_) => debug!("📡️ Client {id} unregistered"),
            None => trace!("📡️ Client {id} was already gone"),
        }
    }

    fn broadcast(&mut self, message: String) {
        let mut evicted = Vec::new();
        let mut delivered = 0usize;
        for client in self.clients.values().filter(|c| c.is_manager) {
            match client.sender.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!("📡️ Client {} is not keeping up. Disconnecting it", client.id);
                    evicted.push(client.id);
                },
                Err(TrySendError::Closed(_)) => {
                    debug!("📡️ Client {} has gone away", client.id);
                    evicted.push(client.id);
                },
            }
        }
        for id in evicted {
            self.clients.remove(&id);
        }
        trace!("📡️ Broadcast delivered to {delivered} clients");
    }

    /// Drops every client, closing their buffers. Returns how many there were.
    fn close_all(&mut self) -> usize {
        let count = self.clients.len();
        self.clients.clear();
        count
    }
}

/// A cheap, cloneable way to talk to the [`NotificationHub`]. None of these calls fail: if the hub has stopped, the
/// request is logged and dropped.
#[derive(Clone, Debug)]
pub struct HubHandle {
    sender: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    async fn submit(&self, command: HubCommand) {
        if let Err(e) = self.sender.send(command).await {
            warn!("📡️ Notification hub is not running. Dropping {:?}", e.0);
        }
    }

    pub async fn register(&self, client: HubClient) {
        self.submit(HubCommand::Register(client)).await;
    }

    pub async fn unregister(&self, id: ClientId) {
        self.submit(HubCommand::Unregister(id)).await;
    }

    pub async fn broadcast(&self, notification: &Notification) {
        match serde_json::to_string(notification) {
            Ok(message) => self.submit(HubCommand::Broadcast(message)).await,
            Err(e) => error!("📡️ Could not serialize {:?} notification. {e}", notification.notification_type),
        }
    }

    pub async fn notify_order_claimed(&self, payload: &OrderClaimedPayload) {
        match Notification::new(NotificationType::OrderClaimed, payload) {
            Ok(notification) => self.broadcast(&notification).await,
            Err(e) => error!("📡️ Could not build order_claimed notification for {}. {e}", payload.order_id),
        }
    }

    /// The number of registered clients, as seen by the hub after every earlier command has been applied.
    pub async fn client_count(&self) -> usize {
        let (tx, rx) = oneshot::channel();
        self.submit(HubCommand::ClientCount(tx)).await;
        rx.await.unwrap_or_default()
    }
}
