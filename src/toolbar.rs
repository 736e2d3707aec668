// ABOUTME: Toolbar session owning one notification store for one signed-in identity
// ABOUTME: Serializes snapshot, push, and dismissal results through a single event loop task
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Toolbar session
//!
//! A [`ToolbarSession`] ties together everything the toolbar needs for one
//! identity: the store, the snapshot loader, the dismissal coordinator, and the
//! push channel. The store lives inside a single task; every mutation reaches
//! it as a message, so mutations are applied one at a time in arrival order
//! without locks. After each mutation the task publishes a [`StoreSnapshot`]
//! on a `watch` channel for renderers.
//!
//! Shutting the session down closes the push channel exactly once. Snapshot
//! and dismissal results that complete afterwards are logged and dropped.

use crate::channel::{ChannelHandle, ChannelState, PushChannelClient, PushEvent, TransportOptions};
use crate::context::SessionContext;
use crate::errors::{AppError, AppResult};
use crate::models::{Identity, NotificationId};
use crate::notifications::{
    DismissOutcome, DismissalCoordinator, LoadedSnapshot, NotificationBackend, NotificationStore,
    SnapshotLoader, StoreSnapshot,
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Session tuning
#[derive(Debug, Clone)]
pub struct ToolbarOptions {
    /// Push channel transport, or `None` to run without a live channel
    pub push_channel: Option<TransportOptions>,
    /// Capacity of the inbound push event queue
    pub event_buffer: usize,
}

impl Default for ToolbarOptions {
    fn default() -> Self {
        Self {
            push_channel: Some(TransportOptions::default()),
            event_buffer: 64,
        }
    }
}

impl ToolbarOptions {
    /// Options without a push channel, for snapshot-only use
    #[must_use]
    pub fn without_push_channel() -> Self {
        Self {
            push_channel: None,
            ..Self::default()
        }
    }
}

/// Messages the store task accepts besides push events
enum StoreCommand {
    Seed(LoadedSnapshot),
    ApplyDismissal {
        id: NotificationId,
        reply: oneshot::Sender<DismissOutcome>,
    },
    ClearUnseen,
}

/// Task that exclusively owns the store
struct StoreActor {
    store: NotificationStore,
    commands: mpsc::Receiver<StoreCommand>,
    push_events: mpsc::Receiver<PushEvent>,
    state_tx: watch::Sender<StoreSnapshot>,
    shutdown_rx: watch::Receiver<bool>,
}

impl StoreActor {
    async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown_rx.changed() => break,
                Some(command) = self.commands.recv() => self.on_command(command),
                Some(event) = self.push_events.recv() => self.on_push(event),
                else => break,
            }
        }
        self.discard_pending();
    }

    fn on_command(&mut self, command: StoreCommand) {
        let before = self.store.revision();
        match command {
            StoreCommand::Seed(snapshot) => snapshot.install(&mut self.store),
            StoreCommand::ApplyDismissal { id, reply } => {
                let outcome = DismissalCoordinator::apply(&mut self.store, &id);
                if reply.send(outcome).is_err() {
                    debug!(notification_id = %id, "Dismissal caller went away before the reply");
                }
            }
            StoreCommand::ClearUnseen => self.store.clear_unseen_flag(),
        }
        self.publish_if_changed(before);
    }

    fn on_push(&mut self, event: PushEvent) {
        let before = self.store.revision();
        let id = event.record.id.clone();
        let outcome = self.store.insert(event.record);
        debug!(notification_id = %id, outcome = ?outcome, "Applied push event");
        self.publish_if_changed(before);
    }

    fn publish_if_changed(&self, before: u64) {
        if self.store.revision() != before {
            self.state_tx.send_replace(self.store.snapshot());
        }
    }

    /// Drop anything queued when teardown began
    fn discard_pending(&mut self) {
        self.commands.close();
        self.push_events.close();
        let mut discarded = 0_usize;
        while self.push_events.try_recv().is_ok() {
            discarded += 1;
        }
        while self.commands.try_recv().is_ok() {
            discarded += 1;
        }
        if discarded > 0 {
            debug!(discarded, "Discarded messages queued during teardown");
        }
    }
}

/// Cloneable handle for driving a running session from other tasks
#[derive(Clone)]
pub struct ToolbarHandle {
    context: Arc<SessionContext>,
    loader: SnapshotLoader,
    coordinator: DismissalCoordinator,
    commands: mpsc::Sender<StoreCommand>,
    push_tx: mpsc::Sender<PushEvent>,
    state_rx: watch::Receiver<StoreSnapshot>,
    shutdown_rx: watch::Receiver<bool>,
}

impl ToolbarHandle {
    /// Session this handle acts for
    #[must_use]
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Current store contents
    #[must_use]
    pub fn state(&self) -> StoreSnapshot {
        self.state_rx.borrow().clone()
    }

    /// Receiver notified after every store mutation
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.state_rx.clone()
    }

    /// Inbound queue for push events from any transport
    #[must_use]
    pub fn push_sender(&self) -> mpsc::Sender<PushEvent> {
        self.push_tx.clone()
    }

    /// Whether the session has been shut down
    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Fetch a fresh snapshot and install it
    ///
    /// Returns `false` when the load was skipped for an empty identity or the
    /// session ended before the result arrived.
    ///
    /// # Errors
    ///
    /// Propagates the backend failure; the store is untouched
    pub async fn reload_snapshot(&self) -> AppResult<bool> {
        let Some(snapshot) = self.loader.load(&self.context).await? else {
            return Ok(false);
        };
        if self.is_closed() || self.commands.send(StoreCommand::Seed(snapshot)).await.is_err() {
            debug!(session_id = %self.context.session_id(), "Discarding snapshot that arrived after teardown");
            return Ok(false);
        }
        Ok(true)
    }

    /// Dismiss a notification, mutating the store only after the backend confirms
    ///
    /// # Errors
    ///
    /// Propagates the backend failure; the record stays active
    pub async fn dismiss(&self, id: &NotificationId) -> AppResult<DismissOutcome> {
        self.coordinator.request(&self.context, id).await?;

        let (reply, outcome) = oneshot::channel();
        let command = StoreCommand::ApplyDismissal {
            id: id.clone(),
            reply,
        };
        if self.is_closed() || self.commands.send(command).await.is_err() {
            debug!(notification_id = %id, "Discarding dismissal confirmed after teardown");
            return Ok(DismissOutcome::Discarded);
        }
        Ok(outcome.await.unwrap_or(DismissOutcome::Discarded))
    }

    /// Lower the unseen flag, e.g. when the dropdown opens
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if the session has ended
    pub async fn clear_unseen_flag(&self) -> AppResult<()> {
        self.commands
            .send(StoreCommand::ClearUnseen)
            .await
            .map_err(|_| AppError::internal("Toolbar session has ended"))
    }
}

/// One identity's notification toolbar
pub struct ToolbarSession {
    handle: ToolbarHandle,
    backend: Arc<dyn NotificationBackend>,
    options: ToolbarOptions,
    channel: Option<ChannelHandle>,
    shutdown_tx: watch::Sender<bool>,
    actor: Option<JoinHandle<()>>,
}

impl ToolbarSession {
    /// Start the store task, the initial snapshot load, and the push channel
    ///
    /// Must be called inside a Tokio runtime. The snapshot loads in the
    /// background; its failure is logged and leaves the store empty.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the push channel URL cannot be built
    pub fn start(
        context: SessionContext,
        backend: Arc<dyn NotificationBackend>,
        options: ToolbarOptions,
    ) -> AppResult<Self> {
        let context = Arc::new(context);
        let (command_tx, command_rx) = mpsc::channel(16);
        let (push_tx, push_rx) = mpsc::channel(options.event_buffer.max(1));
        let (state_tx, state_rx) = watch::channel(StoreSnapshot::default());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let channel = match &options.push_channel {
            Some(transport) => Some(
                PushChannelClient::with_options(&context, transport.clone())?
                    .spawn(push_tx.clone()),
            ),
            None => None,
        };

        let actor = StoreActor {
            store: NotificationStore::new(),
            commands: command_rx,
            push_events: push_rx,
            state_tx,
            shutdown_rx: shutdown_rx.clone(),
        };
        let actor = tokio::spawn(actor.run());

        let handle = ToolbarHandle {
            context,
            loader: SnapshotLoader::new(Arc::clone(&backend)),
            coordinator: DismissalCoordinator::new(Arc::clone(&backend)),
            commands: command_tx,
            push_tx,
            state_rx,
            shutdown_rx,
        };

        let initial = handle.clone();
        tokio::spawn(async move {
            if let Err(e) = initial.reload_snapshot().await {
                warn!(error = %e, "Initial notification snapshot failed");
            }
        });

        info!(
            identity = %handle.context.identity(),
            session_id = %handle.context.session_id(),
            push_channel = channel.is_some(),
            "Toolbar session started"
        );

        Ok(Self {
            handle,
            backend,
            options,
            channel,
            shutdown_tx,
            actor: Some(actor),
        })
    }

    /// Cloneable handle for other tasks
    #[must_use]
    pub fn handle(&self) -> ToolbarHandle {
        self.handle.clone()
    }

    /// Identity this session serves
    #[must_use]
    pub fn identity(&self) -> &Identity {
        self.handle.context.identity()
    }

    /// Current store contents
    #[must_use]
    pub fn state(&self) -> StoreSnapshot {
        self.handle.state()
    }

    /// Receiver notified after every store mutation
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.handle.subscribe()
    }

    /// Push channel state, `Disconnected` when running without one
    #[must_use]
    pub fn channel_state(&self) -> ChannelState {
        self.channel
            .as_ref()
            .map_or(ChannelState::Disconnected, ChannelHandle::state)
    }

    /// Push channel handle, if one was started
    #[must_use]
    pub const fn channel(&self) -> Option<&ChannelHandle> {
        self.channel.as_ref()
    }

    /// See [`ToolbarHandle::reload_snapshot`]
    ///
    /// # Errors
    ///
    /// Propagates the backend failure
    pub async fn reload_snapshot(&self) -> AppResult<bool> {
        self.handle.reload_snapshot().await
    }

    /// See [`ToolbarHandle::dismiss`]
    ///
    /// # Errors
    ///
    /// Propagates the backend failure
    pub async fn dismiss(&self, id: &NotificationId) -> AppResult<DismissOutcome> {
        self.handle.dismiss(id).await
    }

    /// See [`ToolbarHandle::clear_unseen_flag`]
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if the session has ended
    pub async fn clear_unseen_flag(&self) -> AppResult<()> {
        self.handle.clear_unseen_flag().await
    }

    /// Tear down for a new identity and start over
    ///
    /// Keeps the running session when the identity is unchanged.
    ///
    /// # Errors
    ///
    /// Propagates teardown or startup failures
    pub async fn switch_identity(self, context: SessionContext) -> AppResult<Self> {
        if context.identity() == self.identity() {
            debug!(identity = %context.identity(), "Identity unchanged, keeping toolbar session");
            return Ok(self);
        }
        info!(
            from = %self.identity(),
            to = %context.identity(),
            "Switching toolbar session identity"
        );
        let backend = Arc::clone(&self.backend);
        let options = self.options.clone();
        self.shutdown().await?;
        Self::start(context, backend, options)
    }

    /// Stop processing, close the push channel, and wait for the store task
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if a background task panicked
    pub async fn shutdown(mut self) -> AppResult<()> {
        self.shutdown_tx.send_replace(true);

        if let Some(channel) = self.channel.take() {
            channel.close().await?;
        }
        if let Some(actor) = self.actor.take() {
            actor
                .await
                .map_err(|e| AppError::internal(format!("toolbar store task failed: {e}")))?;
        }
        info!(identity = %self.identity(), "Toolbar session shut down");
        Ok(())
    }
}
