//! Conductor Client
//!
//! Thin wrapper around the Conductor for TUI integration.
//! This client embeds the Conductor directly and provides a convenient
//! interface for sending events and receiving messages.
//!
//! # Architecture
//!
//! The TUI is a "thin client" - it doesn't contain any session logic.
//! All orchestration happens in the Conductor. The TUI's job is:
//! 1. Convert terminal events to SurfaceEvents
//! 2. Send SurfaceEvents to Conductor
//! 3. Receive CompanionMessages
//! 4. Render display state based on messages

use tokio::sync::mpsc;

use companion_core::{
    CompanionApi, CompanionConfigFile, CompanionMessage, Conductor, ConductorConfig,
    FileIdentityStore, HttpCompanionApi, IdentityProvider, SurfaceEvent, SurfaceType,
};

/// Client for communicating with the embedded Conductor
pub struct ConductorClient<A: CompanionApi + 'static = HttpCompanionApi> {
    /// The embedded Conductor instance
    conductor: Conductor<A>,
    /// Receiver for messages from Conductor
    rx: mpsc::Receiver<CompanionMessage>,
}

impl ConductorClient<HttpCompanionApi> {
    /// Create a client talking to the configured companion service
    pub fn from_config(config: &CompanionConfigFile) -> Self {
        let api = HttpCompanionApi::from_config(config);
        let identity = FileIdentityStore::from_override(config.identity_path.as_deref());
        Self::new(api, identity, ConductorConfig::from_file(config))
    }
}

impl<A: CompanionApi + 'static> ConductorClient<A> {
    /// Create a new ConductorClient with embedded Conductor
    pub fn new(
        api: A,
        identity: impl IdentityProvider + 'static,
        config: ConductorConfig,
    ) -> Self {
        // Create channel for Conductor -> TUI messages
        let (tx, rx) = mpsc::channel(100);
        let conductor = Conductor::new(api, identity, config, tx);
        Self { conductor, rx }
    }

    /// Start the Conductor (health probe, identity, session check)
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.conductor.start().await
    }

    /// Connect this surface to the Conductor
    pub async fn connect(&mut self) -> anyhow::Result<()> {
        let event = SurfaceEvent::Connected {
            event_id: SurfaceEvent::new_event_id(),
            surface_type: SurfaceType::Tui,
        };
        self.conductor.handle_event(event).await
    }

    /// Send a user message to the Conductor
    pub async fn send_message(&mut self, content: String) -> anyhow::Result<()> {
        let event = SurfaceEvent::UserMessage {
            event_id: SurfaceEvent::new_event_id(),
            content,
        };
        self.conductor.handle_event(event).await
    }

    /// Ask for resources beyond the ones shown
    pub async fn request_more_resources(&mut self) -> anyhow::Result<()> {
        let event = SurfaceEvent::MoreResourcesRequested {
            event_id: SurfaceEvent::new_event_id(),
        };
        self.conductor.handle_event(event).await
    }

    /// Ask for a different strategy
    pub async fn request_another_strategy(&mut self) -> anyhow::Result<()> {
        let event = SurfaceEvent::AnotherStrategyRequested {
            event_id: SurfaceEvent::new_event_id(),
        };
        self.conductor.handle_event(event).await
    }

    /// Ask for the sign-in URL
    pub async fn request_login(&mut self) -> anyhow::Result<()> {
        let event = SurfaceEvent::LoginRequested {
            event_id: SurfaceEvent::new_event_id(),
        };
        self.conductor.handle_event(event).await
    }

    /// Sign out
    pub async fn request_logout(&mut self) -> anyhow::Result<()> {
        let event = SurfaceEvent::LogoutRequested {
            event_id: SurfaceEvent::new_event_id(),
        };
        self.conductor.handle_event(event).await
    }

    /// Notify Conductor that user wants to quit
    pub async fn request_quit(&mut self) -> anyhow::Result<()> {
        let event = SurfaceEvent::QuitRequested {
            event_id: SurfaceEvent::new_event_id(),
        };
        self.conductor.handle_event(event).await
    }

    /// Apply finished network calls (must be called regularly)
    pub async fn poll(&mut self) -> bool {
        self.conductor.poll().await
    }

    /// Wait for the next network call to finish
    pub async fn wait_for_outcome(&mut self) -> bool {
        self.conductor.wait_for_outcome().await
    }

    /// Receive all pending messages from the Conductor (non-blocking)
    pub fn recv_all(&mut self) -> Vec<CompanionMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Send raw surface event to Conductor
    pub async fn send_event(&mut self, event: SurfaceEvent) -> anyhow::Result<()> {
        self.conductor.handle_event(event).await
    }
}
