//! The event loop.
//!
//! A connection collaborator decodes platform events and pushes them into a
//! `tokio::sync::mpsc` channel. [`CourierRuntime`] drains that channel one
//! event at a time: it tracks the session identity, builds messages and
//! hands them to the [`Dispatcher`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use courier_runtime::CourierRuntime;
//!
//! let (tx, rx) = tokio::sync::mpsc::channel(64);
//! spawn_connection(token, tx);
//!
//! let runtime = CourierRuntime::builder()
//!     .resolver(platform_directory)
//!     .registry(registry)
//!     .build()?;
//! runtime.run(rx).await?;
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use courier_core::{
    BoxedResolver, Directory, Identity, IdentityResolver, InboundEvent, MessageBuilder,
    MessageEvent,
};
use courier_framework::{Dispatcher, HandlerRegistry, Route};
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{Instrument, debug, error, info, span, trace, warn};

use crate::config::{ConfigLoader, CourierConfig};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;
use crate::session::Session;

/// Drives inbound events through message building and dispatch.
pub struct CourierRuntime {
    config: CourierConfig,
    session: Arc<Session>,
    dispatcher: Dispatcher,
    stats: Arc<StatsCounters>,
}

impl CourierRuntime {
    /// Creates a runtime builder that loads configuration from the usual places.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from an already-loaded configuration.
    ///
    /// Initializes logging from `config` unless a subscriber is already set.
    pub fn from_config<R>(config: &CourierConfig, resolver: R, registry: HandlerRegistry) -> Self
    where
        R: IdentityResolver + 'static,
    {
        logging::init_from_config(config);
        Self::with_resolver(config, Arc::new(resolver), registry)
    }

    fn with_resolver(
        config: &CourierConfig,
        resolver: BoxedResolver,
        registry: HandlerRegistry,
    ) -> Self {
        let dispatcher =
            Dispatcher::new(registry).suppress_bot_messages(config.bot.suppress_bot_messages);

        info!(
            suppress_bot_messages = config.bot.suppress_bot_messages,
            commands = ?dispatcher.registry().command_tokens(),
            "Runtime initialized from configuration"
        );

        Self {
            config: config.clone(),
            session: Arc::new(Session::new(resolver)),
            dispatcher,
            stats: Arc::new(StatsCounters::default()),
        }
    }

    pub fn config(&self) -> &CourierConfig {
        &self.config
    }

    /// The session shared with message building.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Shorthand for `session().who_am_i()`.
    pub fn who_am_i(&self) -> Option<Identity> {
        self.session.who_am_i()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// A snapshot of the event counters.
    pub fn stats(&self) -> RuntimeStats {
        self.stats.snapshot()
    }

    /// Processes a single event.
    ///
    /// Returns the route taken for `Message` events and `None` for everything
    /// else.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::InvalidAuth`] when the platform rejected the credentials.
    pub async fn handle_event(&self, event: InboundEvent) -> RuntimeResult<Option<Route>> {
        self.stats.events_received.fetch_add(1, Ordering::Relaxed);

        match event {
            InboundEvent::Hello => trace!("Server hello"),
            InboundEvent::Connected { self_identity } => self.session.connected(self_identity),
            InboundEvent::Message(event) => return Ok(Some(self.handle_message(&event).await)),
            InboundEvent::PresenceChange { user, presence } => {
                debug!(user = %user, presence = %presence, "Presence changed");
            }
            InboundEvent::LatencyReport { value_ms } => debug!(value_ms, "Latency report"),
            InboundEvent::Error { error } => {
                warn!(code = error.code, msg = %error.msg, "Platform reported an error");
            }
            InboundEvent::InvalidAuth => {
                error!("Invalid credentials");
                return Err(RuntimeError::InvalidAuth);
            }
            InboundEvent::Other => trace!("Ignoring unsupported event"),
        }

        Ok(None)
    }

    async fn handle_message(&self, event: &MessageEvent) -> Route {
        let span = span!(tracing::Level::DEBUG, "message", channel = %event.channel);

        async {
            let message = MessageBuilder::new(self.session.as_ref())
                .build(event)
                .await;
            let route = self.dispatcher.dispatch(message).await;
            self.stats.record(&route);
            route
        }
        .instrument(span)
        .await
    }

    /// Consumes `events` until the stream closes or Ctrl+C / SIGTERM arrives.
    pub async fn run(&self, events: mpsc::Receiver<InboundEvent>) -> RuntimeResult<()> {
        info!("Courier runtime is now running. Press Ctrl+C to stop.");
        self.run_until(events, wait_for_shutdown()).await
    }

    /// Consumes `events` until the stream closes or `shutdown` completes.
    ///
    /// Events are handled strictly in arrival order; an event already being
    /// handled finishes before shutdown is observed.
    pub async fn run_until<F>(
        &self,
        mut events: mpsc::Receiver<InboundEvent>,
        shutdown: F,
    ) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let result = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break Ok(());
                }
                event = events.recv() => match event {
                    Some(event) => {
                        if let Err(e) = self.handle_event(event).await {
                            break Err(e);
                        }
                    }
                    None => {
                        info!("Event stream closed");
                        break Ok(());
                    }
                },
            }
        };

        self.session.disconnected();
        info!(stats = %self.stats(), "Runtime stopped");
        result
    }
}

impl fmt::Debug for CourierRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CourierRuntime")
            .field("session", &self.session)
            .field("dispatcher", &self.dispatcher)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// Waits for Ctrl+C, or SIGTERM on unix.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to register SIGTERM handler"),
        }
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            warn!(error = %e, "Failed to listen for Ctrl+C, running until the stream closes");
            std::future::pending::<()>().await;
        }
    }
}

// =============================================================================
// Stats
// =============================================================================

#[derive(Debug, Default)]
struct StatsCounters {
    events_received: AtomicUsize,
    messages_dispatched: AtomicUsize,
    messages_suppressed: AtomicUsize,
    messages_unrouted: AtomicUsize,
}

impl StatsCounters {
    fn record(&self, route: &Route) {
        let counter = match route {
            Route::Suppressed => &self.messages_suppressed,
            Route::Unrouted => &self.messages_unrouted,
            Route::Broadcast | Route::Command(_) | Route::Fallback => &self.messages_dispatched,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> RuntimeStats {
        RuntimeStats {
            events_received: self.events_received.load(Ordering::Relaxed),
            messages_dispatched: self.messages_dispatched.load(Ordering::Relaxed),
            messages_suppressed: self.messages_suppressed.load(Ordering::Relaxed),
            messages_unrouted: self.messages_unrouted.load(Ordering::Relaxed),
        }
    }
}

/// Event counters since the runtime was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Events of any type taken off the stream.
    pub events_received: usize,
    /// Messages that reached a handler.
    pub messages_dispatched: usize,
    /// Bot messages dropped by suppression.
    pub messages_suppressed: usize,
    /// Messages no handler matched.
    pub messages_unrouted: usize,
}

impl fmt::Display for RuntimeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Events: {} received, messages: {} dispatched, {} suppressed, {} unrouted",
            self.events_received,
            self.messages_dispatched,
            self.messages_suppressed,
            self.messages_unrouted
        )
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for a [`CourierRuntime`] with configuration loaded by [`ConfigLoader`].
///
/// ```rust,ignore
/// let runtime = CourierRuntime::builder()
///     .config_file("config/courier.toml")
///     .profile("production")
///     .resolver(directory)
///     .registry(registry)
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    resolver: Option<BoxedResolver>,
    registry: HandlerRegistry,
    suppress_bot_messages: Option<bool>,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
            resolver: None,
            registry: HandlerRegistry::new(),
            suppress_bot_messages: None,
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g. "development", "production").
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: CourierConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Sets the identity directory. Defaults to an empty [`Directory`].
    pub fn resolver<R: IdentityResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Sets the handlers. Defaults to an empty registry.
    pub fn registry(mut self, registry: HandlerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Forces `bot.suppress_bot_messages`, above every configuration source.
    pub fn suppress_bot_messages(mut self, suppress: bool) -> Self {
        self.suppress_bot_messages = Some(suppress);
        self
    }

    /// Loads the configuration, initializes logging and builds the runtime.
    pub fn build(self) -> RuntimeResult<CourierRuntime> {
        let mut config = self.config_loader.load()?;
        if let Some(suppress) = self.suppress_bot_messages {
            config.bot.suppress_bot_messages = suppress;
        }
        logging::init_from_config(&config);

        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(Directory::new()) as BoxedResolver);
        Ok(CourierRuntime::with_resolver(
            &config,
            resolver,
            self.registry,
        ))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{Message, MessageType, PlatformError};
    use parking_lot::Mutex;

    type Seen = Arc<Mutex<Vec<(&'static str, Message)>>>;

    fn recorder(
        seen: &Seen,
        label: &'static str,
    ) -> impl FnOnce(Message) -> std::future::Ready<()> + Clone + Send + Sync + 'static {
        let seen = Arc::clone(seen);
        move |message: Message| {
            seen.lock().push((label, message));
            std::future::ready(())
        }
    }

    fn directory() -> Directory {
        Directory::new()
            .with_user("U1", "alice")
            .with_user("U2", "bob")
            .with_user("U0BOT", "courier")
            .with_bot("B1", "deploybot")
            .with_channel("C1", "general")
    }

    fn runtime(seen: &Seen, suppress: bool) -> CourierRuntime {
        let registry = HandlerRegistry::new()
            .with_broadcast(recorder(seen, "broadcast"))
            .with_direct(recorder(seen, "direct"))
            .with_command("deploy", recorder(seen, "deploy"))
            .unwrap();

        let mut config = CourierConfig::default();
        config.bot.suppress_bot_messages = suppress;
        CourierRuntime::with_resolver(&config, Arc::new(directory()), registry)
    }

    fn message_event(channel: &str, user: &str, text: &str) -> InboundEvent {
        InboundEvent::Message(MessageEvent::new(channel, user, text))
    }

    fn connected() -> InboundEvent {
        InboundEvent::Connected {
            self_identity: Identity::new("U0BOT", "courier"),
        }
    }

    #[tokio::test]
    async fn test_message_routes() {
        let seen = Seen::default();
        let runtime = runtime(&seen, false);

        let public = runtime
            .handle_event(message_event("C1", "U1", "hi all"))
            .await
            .unwrap();
        let command = runtime
            .handle_event(message_event("D1", "U1", "deploy api now"))
            .await
            .unwrap();
        let direct = runtime
            .handle_event(message_event("D1", "U1", "hello"))
            .await
            .unwrap();

        assert_eq!(public, Some(Route::Broadcast));
        assert_eq!(command, Some(Route::Command("deploy".into())));
        assert_eq!(direct, Some(Route::Fallback));

        let seen = seen.lock();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].0, "broadcast");
        assert_eq!(seen[0].1.channel, Identity::new("C1", "general"));
        assert_eq!(seen[1].0, "deploy");
        assert_eq!(seen[1].1.text, "api now");
        assert_eq!(seen[2].0, "direct");
        assert_eq!(seen[2].1.message_type, MessageType::Direct);
    }

    #[tokio::test]
    async fn test_connected_enables_mention_detection() {
        let seen = Seen::default();
        let runtime = runtime(&seen, false);

        runtime
            .handle_event(message_event("C1", "U1", "hey <@U0BOT>"))
            .await
            .unwrap();
        runtime.handle_event(connected()).await.unwrap();
        runtime
            .handle_event(message_event("C1", "U1", "hey <@U0BOT>"))
            .await
            .unwrap();

        assert_eq!(runtime.who_am_i(), Some(Identity::new("U0BOT", "courier")));

        let seen = seen.lock();
        assert!(!seen[0].1.mentioned);
        assert!(seen[1].1.mentioned);
        assert_eq!(seen[1].1.mentions, vec![Identity::new("U0BOT", "courier")]);
    }

    #[tokio::test]
    async fn test_bot_messages_suppressed() {
        let seen = Seen::default();
        let runtime = runtime(&seen, true);

        let route = runtime
            .handle_event(InboundEvent::Message(MessageEvent::from_bot(
                "C1", "B1", "build passed",
            )))
            .await
            .unwrap();

        assert_eq!(route, Some(Route::Suppressed));
        assert!(seen.lock().is_empty());
        assert_eq!(runtime.stats().messages_suppressed, 1);
    }

    #[tokio::test]
    async fn test_bot_messages_delivered_without_suppression() {
        let seen = Seen::default();
        let runtime = runtime(&seen, false);

        runtime
            .handle_event(InboundEvent::Message(MessageEvent::from_bot(
                "C1", "B1", "build passed",
            )))
            .await
            .unwrap();

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].1.is_bot_message);
        assert_eq!(seen[0].1.from, Identity::new("B1", "deploybot"));
    }

    #[tokio::test]
    async fn test_non_message_events_return_none() {
        let seen = Seen::default();
        let runtime = runtime(&seen, false);

        let events = [
            InboundEvent::Hello,
            InboundEvent::PresenceChange {
                user: "U1".into(),
                presence: "away".into(),
            },
            InboundEvent::LatencyReport { value_ms: 42 },
            InboundEvent::Error {
                error: PlatformError {
                    code: 1,
                    msg: "socket hiccup".into(),
                },
            },
            InboundEvent::Other,
        ];
        for event in events {
            assert_eq!(runtime.handle_event(event).await.unwrap(), None);
        }

        assert!(seen.lock().is_empty());
        assert_eq!(runtime.stats().events_received, 5);
    }

    #[tokio::test]
    async fn test_invalid_auth_is_fatal() {
        let seen = Seen::default();
        let runtime = runtime(&seen, false);

        let result = runtime.handle_event(InboundEvent::InvalidAuth).await;
        assert!(matches!(result, Err(RuntimeError::InvalidAuth)));
    }

    #[tokio::test]
    async fn test_run_until_stream_closes() {
        let seen = Seen::default();
        let runtime = runtime(&seen, false);
        let (tx, rx) = mpsc::channel(8);

        tx.send(InboundEvent::Hello).await.unwrap();
        tx.send(connected()).await.unwrap();
        tx.send(message_event("C1", "U2", "first")).await.unwrap();
        tx.send(message_event("C9", "U2", "second")).await.unwrap();
        tx.send(message_event("X1", "U2", "dropped")).await.unwrap();
        drop(tx);

        runtime
            .run_until(rx, std::future::pending())
            .await
            .unwrap();

        let texts: Vec<_> = seen.lock().iter().map(|(_, m)| m.text.clone()).collect();
        assert_eq!(texts, ["first", "second"]);
        assert_eq!(
            runtime.stats(),
            RuntimeStats {
                events_received: 5,
                messages_dispatched: 2,
                messages_suppressed: 0,
                messages_unrouted: 1,
            }
        );
        assert!(runtime.who_am_i().is_none());
    }

    #[tokio::test]
    async fn test_run_until_stops_on_invalid_auth() {
        let seen = Seen::default();
        let runtime = runtime(&seen, false);
        let (tx, rx) = mpsc::channel(8);

        tx.send(connected()).await.unwrap();
        tx.send(InboundEvent::InvalidAuth).await.unwrap();
        tx.send(message_event("C1", "U1", "never seen")).await.unwrap();

        let result = runtime.run_until(rx, std::future::pending()).await;

        assert!(matches!(result, Err(RuntimeError::InvalidAuth)));
        assert!(seen.lock().is_empty());
        assert!(runtime.who_am_i().is_none());
        assert_eq!(runtime.stats().events_received, 2);
        drop(tx);
    }

    #[tokio::test]
    async fn test_run_until_shutdown() {
        let seen = Seen::default();
        let runtime = runtime(&seen, false);
        let (_tx, rx) = mpsc::channel(8);

        runtime.run_until(rx, async {}).await.unwrap();
        assert_eq!(runtime.stats(), RuntimeStats::default());
    }

    #[test]
    fn test_builder_suppression_beats_config_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("courier.toml", "[bot]\nsuppress_bot_messages = false")?;

            let runtime = CourierRuntime::builder()
                .without_env()
                .suppress_bot_messages(true)
                .build()
                .map_err(|e| e.to_string())?;
            assert!(runtime.dispatcher().suppresses_bot_messages());
            assert!(runtime.config().bot.suppress_bot_messages);

            let runtime = CourierRuntime::builder()
                .without_env()
                .build()
                .map_err(|e| e.to_string())?;
            assert!(!runtime.dispatcher().suppresses_bot_messages());
            Ok(())
        });
    }

    #[test]
    fn test_stats_display() {
        let stats = RuntimeStats {
            events_received: 3,
            messages_dispatched: 1,
            messages_suppressed: 1,
            messages_unrouted: 0,
        };
        assert_eq!(
            stats.to_string(),
            "Events: 3 received, messages: 1 dispatched, 1 suppressed, 0 unrouted"
        );
    }
}
