//! Command scheduler
//!
//! This module implements the session state machine that drives one
//! character. The scheduler owns both queues (parsed script commands and
//! live chat lines) and is the only component that ever submits a
//! directive to the actor. It cycles through four phases:
//!
//! 1. `Fetching`: request a fresh script, parse it, queue it
//! 2. `Cooldown`: wait out the minimum interval between fetch attempts
//! 3. `Executing`: drain the scripted queue one directive at a time,
//!    waiting for the actor to fall idle around every submission
//! 4. `Interactive`: after a movement to the configured trigger location,
//!    drain the chat queue instead for a fixed window, then refresh the
//!    script immediately (the one fetch that skips the cooldown)
//!
//! Everything runs on a single flow of control: fetches are awaited inline,
//! so at most one is ever outstanding, and every wait (idle polls, pacing
//! delays, the cooldown, the window) is an explicit await point. The chat
//! poller is the only concurrent piece and touches nothing but its channel.
//!
//! No error is fatal here. Failed fetches and unparseable lines are logged
//! and the loop moves on; the session ends only when the embedding binary
//! stops driving it.

use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use sdk::{Actor, EngineError};

use crate::chat::ChatFeed;
use crate::commands::{parse_line, ScriptCommand};
use crate::config::SchedulerConfig;
use crate::script::ScriptSource;

/// Scheduler phase.
///
/// Exactly one per session, mutated only by the scheduler's own loop. The
/// old ad-hoc flag set (fetching? cooling down? at the podium?) collapses
/// into this enum so impossible combinations cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// A script fetch runs next
    Fetching,

    /// Queue empty, waiting out the fetch cooldown
    Cooldown,

    /// Draining the scripted queue
    Executing,

    /// Draining the chat queue until the window deadline
    Interactive,
}

/// Chat feed plus the receiving end of its message channel.
struct ChatChannel {
    feed: ChatFeed,
    rx: mpsc::UnboundedReceiver<String>,
}

/// The session state machine.
pub struct Scheduler {
    actor: Arc<dyn Actor>,
    source: Arc<dyn ScriptSource>,
    chat: Option<ChatChannel>,
    queue: VecDeque<ScriptCommand>,
    phase: Phase,

    /// Deadline before which no new fetch may start. A deadline, not a
    /// sleep: execution continues while it ticks, only fetching is gated.
    cooldown_until: Option<Instant>,

    /// End of the current interactive window. Set iff phase is Interactive.
    interactive_until: Option<Instant>,

    config: SchedulerConfig,
    session_id: Uuid,
}

impl Scheduler {
    /// Create a scheduler for one character session.
    ///
    /// `chat` may be absent; the session then runs scripted-only and the
    /// interactive trigger never fires. That is an operator problem worth
    /// shouting about, but not a reason to refuse the session.
    pub fn new(
        actor: Arc<dyn Actor>,
        source: Arc<dyn ScriptSource>,
        chat: Option<(ChatFeed, mpsc::UnboundedReceiver<String>)>,
        config: SchedulerConfig,
    ) -> Self {
        if chat.is_none() {
            error!(
                "{}",
                EngineError::MissingCollaborator(
                    "chat feed; interactive mode will never trigger".to_string()
                )
            );
        }

        Self {
            actor,
            source,
            chat: chat.map(|(feed, rx)| ChatChannel { feed, rx }),
            queue: VecDeque::new(),
            phase: Phase::Fetching,
            cooldown_until: None,
            interactive_until: None,
            config,
            session_id: Uuid::new_v4(),
        }
    }

    /// Current phase (exposed for integration tests and diagnostics).
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Drive the session until the caller stops it.
    pub async fn run(&mut self) {
        info!(
            "Session {} started for character {}",
            self.session_id,
            self.actor.identity()
        );

        loop {
            self.step().await;
        }
    }

    /// Execute one state-machine transition.
    ///
    /// `run` is nothing but this in a loop; tests drive it directly so
    /// every ordering claim can be checked step by step.
    pub async fn step(&mut self) {
        match self.phase {
            Phase::Fetching => self.fetch().await,
            Phase::Cooldown => self.cool_down().await,
            Phase::Executing => self.execute_next().await,
            Phase::Interactive => self.interact().await,
        }
    }

    /// Fetch a script, parse it, and append to the queue.
    ///
    /// Runs to completion before the phase is decided: there is never a
    /// second fetch racing this one, and the queue is only read again after
    /// the append below.
    async fn fetch(&mut self) {
        match self.source.fetch_script(self.actor.identity()).await {
            Ok(lines) => {
                debug!("Queueing {} script line(s)", lines.len());
                for line in &lines {
                    self.queue.push_back(parse_line(line));
                }
            }
            Err(e) => warn!("Script fetch failed: {}", e),
        }

        self.cooldown_until = Some(Instant::now() + self.config.fetch_cooldown());
        self.phase = if self.queue.is_empty() {
            Phase::Cooldown
        } else {
            Phase::Executing
        };
    }

    /// Wait out the remainder of the fetch cooldown.
    async fn cool_down(&mut self) {
        if !self.queue.is_empty() {
            self.phase = Phase::Executing;
            return;
        }

        match self.cooldown_until {
            Some(until) if Instant::now() < until => sleep_until(until).await,
            _ => {
                self.cooldown_until = None;
                self.phase = Phase::Fetching;
            }
        }
    }

    /// Execute the next scripted command.
    async fn execute_next(&mut self) {
        let Some(command) = self.queue.pop_front() else {
            self.phase = match self.cooldown_until {
                Some(until) if Instant::now() < until => Phase::Cooldown,
                _ => Phase::Fetching,
            };
            return;
        };

        if let ScriptCommand::Unmarked(line) = &command {
            warn!("Skipping line without command marker: {}", line);
            return;
        }

        if !command.is_recognized() {
            warn!(
                "Unrecognized command format, forwarding as-is: {}",
                command.directive()
            );
        }

        let directive = command.directive();
        self.wait_for_idle().await;
        debug!("Submitting directive: {}", directive);
        self.actor.submit(&directive).await;
        self.wait_for_idle().await;
        sleep(self.config.command_delay()).await;

        if command.location() == Some(self.config.interactive_location.as_str()) {
            self.begin_interactive();
        }
    }

    /// Open an interactive window: start the chat poller, arm the deadline.
    fn begin_interactive(&mut self) {
        let Some(chat) = self.chat.as_mut() else {
            return;
        };

        info!(
            "Character reached {}; opening interactive window",
            self.config.interactive_location
        );
        chat.feed.start();
        self.interactive_until = Some(Instant::now() + self.config.interactive_window());
        self.phase = Phase::Interactive;
    }

    /// Drain one chat message, or close the window when its deadline hits.
    ///
    /// The deadline check is biased ahead of the channel, but a message
    /// already being replied to always completes: the select only ever
    /// decides what happens next, it never interrupts a submission.
    async fn interact(&mut self) {
        let Some(until) = self.interactive_until else {
            // Cannot happen via the normal transitions; recover to scripted mode.
            self.end_interactive();
            return;
        };

        let received = match self.chat.as_mut() {
            Some(chat) => {
                tokio::select! {
                    biased;
                    _ = sleep_until(until) => None,
                    line = chat.rx.recv() => line,
                }
            }
            None => None,
        };

        match received {
            Some(line) => {
                self.wait_for_idle().await;
                debug!("Replying to chat message: {}", line);
                self.actor.submit(&line).await;
                self.wait_for_idle().await;
                sleep(self.config.chat_delay()).await;
            }
            None => self.end_interactive(),
        }
    }

    /// Close the interactive window and refresh the script immediately.
    fn end_interactive(&mut self) {
        if let Some(chat) = self.chat.as_mut() {
            chat.feed.stop();
        }
        self.interactive_until = None;

        // The one fetch that skips the cooldown: the script is stale after
        // a window of unscripted conversation.
        self.cooldown_until = None;
        self.phase = Phase::Fetching;
        info!("Interactive window closed; refreshing script");
    }

    /// Poll the actor until it reports neither speaking nor performing.
    ///
    /// This is the sole synchronization point gating submissions, and it
    /// has no upper bound: a runtime whose busy signals never clear stalls
    /// the session (visibly, via the poll debug logs) rather than being
    /// interrupted mid-action.
    async fn wait_for_idle(&self) {
        while self.actor.is_speaking().await {
            sleep(self.config.idle_poll()).await;
        }
        while self.actor.is_performing_action().await {
            sleep(self.config.idle_poll()).await;
        }
    }
}
