use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use super::{
    MediaElement, MediaEvent, PlaybackSession, PresentationSink, SessionEffect, SessionInput,
    SessionSnapshot,
};
use crate::{
    claim::{ClaimApi, ClaimError, ClaimTicket},
    models::ClaimResponse,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

enum SessionCommand {
    Input(SessionInput),
    Snapshot(oneshot::Sender<SessionSnapshot>),
}

struct ClaimCompletion {
    ticket: ClaimTicket,
    result: Result<ClaimResponse, ClaimError>,
}

/// Owns the driver task of one playback session for the lifetime of a screen
/// visit. Inputs are queued and handled strictly one after another; claim
/// requests run on their own tasks and report back through the same loop.
///
/// Dropping the controller tears the session down. Claim responses that
/// arrive afterwards are discarded.
pub struct SessionController {
    commands: mpsc::UnboundedSender<SessionCommand>,
    cancel_token: CancellationToken,
    driver: Option<JoinHandle<PlaybackSession>>,
}

impl SessionController {
    /// Spawns the driver. Must be called from within a tokio runtime.
    pub fn start<M: MediaElement>(
        session: PlaybackSession,
        media: M,
        sink: Arc<dyn PresentationSink>,
        api: Arc<dyn ClaimApi>,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let cancel_token = CancellationToken::new();

        log_info!(
            "Starting watch session {} for task {}",
            session.info().id,
            session.task_id()
        );

        let driver = tokio::spawn(drive_session(
            session,
            media,
            sink,
            api,
            command_rx,
            cancel_token.clone(),
        ));

        Self {
            commands: command_tx,
            cancel_token,
            driver: Some(driver),
        }
    }

    pub fn send(&self, input: SessionInput) -> Result<()> {
        self.commands
            .send(SessionCommand::Input(input))
            .map_err(|_| anyhow!("watch session already torn down"))
    }

    pub fn media_event(&self, event: MediaEvent) -> Result<()> {
        self.send(SessionInput::Media(event))
    }

    pub fn visibility_changed(&self, hidden: bool) -> Result<()> {
        self.send(SessionInput::VisibilityChanged { hidden })
    }

    pub fn retry_claim(&self) -> Result<()> {
        self.send(SessionInput::RetryClaim)
    }

    /// Snapshot taken after every input queued before this call was handled.
    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::Snapshot(reply_tx))
            .map_err(|_| anyhow!("watch session already torn down"))?;
        reply_rx
            .await
            .context("watch session stopped before answering snapshot")
    }

    /// Stops the driver and returns the final session state. A claim still in
    /// flight keeps running but its response is dropped.
    pub async fn teardown(mut self) -> Result<PlaybackSession> {
        self.cancel_token.cancel();
        let driver = self
            .driver
            .take()
            .ok_or_else(|| anyhow!("watch session driver missing"))?;
        driver.await.context("watch session driver failed to join")
    }

    pub fn is_torn_down(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn drive_session<M: MediaElement>(
    mut session: PlaybackSession,
    mut media: M,
    sink: Arc<dyn PresentationSink>,
    api: Arc<dyn ClaimApi>,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    cancel_token: CancellationToken,
) -> PlaybackSession {
    let (claim_tx, mut claim_rx) = mpsc::unbounded_channel::<ClaimCompletion>();

    loop {
        // Teardown wins over everything; queued inputs are handled before
        // claim responses so a trigger already queued sees the state it raced.
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("Watch session {} torn down", session.info().id);
                break;
            }
            command = commands.recv() => match command {
                Some(SessionCommand::Input(input)) => {
                    let effects = session.handle(input);
                    apply_effects(
                        effects, &session, &mut media, &sink, &api, &claim_tx, &cancel_token,
                    );
                }
                Some(SessionCommand::Snapshot(reply)) => {
                    let _ = reply.send(session.snapshot());
                }
                None => {
                    log_info!("Watch session {} lost all handles; stopping", session.info().id);
                    break;
                }
            },
            Some(done) = claim_rx.recv() => {
                let effects = session.resolve_claim(done.ticket, done.result);
                apply_effects(
                    effects, &session, &mut media, &sink, &api, &claim_tx, &cancel_token,
                );
            }
        }
    }

    session
}

fn apply_effects<M: MediaElement>(
    effects: Vec<SessionEffect>,
    session: &PlaybackSession,
    media: &mut M,
    sink: &Arc<dyn PresentationSink>,
    api: &Arc<dyn ClaimApi>,
    claim_tx: &mpsc::UnboundedSender<ClaimCompletion>,
    cancel_token: &CancellationToken,
) {
    for effect in effects {
        match effect {
            SessionEffect::SeekMedia(position) => media.set_current_time(position),
            SessionEffect::SetPlaybackRate(rate) => media.set_playback_rate(rate),
            SessionEffect::PauseMedia => media.pause(),
            SessionEffect::Present(event) => sink.emit(&event),
            SessionEffect::BeginClaim(ticket) => spawn_claim(
                ticket,
                session.task_id().to_string(),
                Arc::clone(api),
                claim_tx.clone(),
                cancel_token.clone(),
            ),
        }
    }
}

fn spawn_claim(
    ticket: ClaimTicket,
    task_id: String,
    api: Arc<dyn ClaimApi>,
    claim_tx: mpsc::UnboundedSender<ClaimCompletion>,
    cancel_token: CancellationToken,
) {
    let request = api.complete_task(&task_id);
    tokio::spawn(async move {
        let result = request.await;
        if cancel_token.is_cancelled() {
            log_debug!(
                "Discarding claim response for task {} attempt {}: session torn down",
                task_id,
                ticket.attempt
            );
            return;
        }
        if claim_tx.send(ClaimCompletion { ticket, result }).is_err() {
            log_debug!(
                "Discarding claim response for task {} attempt {}: driver gone",
                task_id,
                ticket.attempt
            );
        }
    });
}
