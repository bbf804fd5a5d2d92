use std::future;

use anyhow::{Context, Result};
use scheduled::{
    activity_prompt, auto_clock_in, AUTO_CLOCK_OUT_DELAY, CLOCK_OUT_POSTPONED, CLOCK_OUT_WARNING,
    POSTPONED_CLOCK_OUT_DELAY,
};
use tokio::{sync::mpsc, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::{
    api::{
        console::ConsoleTransport, http::HttpTimeTracker, ChatTransport, InboundMessage, Person,
        TimeTracker,
    },
    batch::{confirmation, LogBatcher},
    clock::ClockState,
    command::{classify, extract_log_lines, ClockDirection, Intent},
    errors::{user_reply, UserFacingError},
    schedule::{Job, Scheduler},
    utils::clock::{Clock, DefaultClock},
};

pub mod args;
pub mod config;
pub mod scheduled;
pub mod shutdown;

use config::BotConfig;

const STARTUP_GREETING: &str = "I'm up and keeping an eye on your clock.";
const FAREWELL: &str = "👋 Going offline, see you later.";

/// Represents the starting point for the bot. Runs until the process is asked to stop.
pub async fn start_bot(config: BotConfig) -> Result<()> {
    let tracker = HttpTimeTracker::new(&config.tracker.base_url, config.user.api_token.clone())?;
    let (chat, receiver) = ConsoleTransport::start();

    let shutdown_token = CancellationToken::new();
    tokio::spawn(shutdown::detect_shutdown(shutdown_token.clone()));

    let session = Session::new(
        config,
        Box::new(tracker),
        Box::new(chat),
        Box::new(DefaultClock),
    );
    session.run(receiver, shutdown_token).await
}

enum SessionEvent {
    Message(InboundMessage),
    InboundClosed,
    FlushBatch,
    DeferredClockOut,
    Job(Job),
    Shutdown,
}

/// Owns everything a bot session needs: the collaborators, the recurring jobs, the pending log
/// batch and the deferred clock-out. All of it is driven from a single event loop in
/// [Session::run], so none of it needs synchronization.
pub struct Session {
    config: BotConfig,
    tracker: Box<dyn TimeTracker>,
    chat: Box<dyn ChatTransport>,
    clock: Box<dyn Clock>,
    scheduler: Scheduler,
    batcher: LogBatcher,
    deferred_clock_out: Option<Instant>,
    person: Option<Person>,
}

impl Session {
    pub fn new(
        config: BotConfig,
        tracker: Box<dyn TimeTracker>,
        chat: Box<dyn ChatTransport>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let scheduler = Scheduler::new(
            config.timezone,
            [
                (Job::AutoClockIn, config.schedule.clock_in.clone()),
                (Job::AutoClockOut, config.schedule.clock_out.clone()),
                (Job::PromptActivity, config.schedule.prompt.clone()),
            ],
        );
        Self {
            config,
            tracker,
            chat,
            clock,
            scheduler,
            batcher: LogBatcher::default(),
            deferred_clock_out: None,
            person: None,
        }
    }

    fn clock_state(&self) -> ClockState<'_> {
        ClockState::new(&*self.tracker, &self.config.project, self.config.timezone)
    }

    fn first_name(&self) -> &str {
        self.person
            .as_ref()
            .map_or("there", |person| person.first_name.as_str())
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_armed()
    }

    pub fn clock_out_deadline(&self) -> Option<Instant> {
        self.deferred_clock_out
    }

    /// Looks up the user, arms the recurring jobs and says hello.
    pub async fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }
        let person = self
            .chat
            .find_person(&self.config.user.handle)
            .await
            .with_context(|| format!("Failed to find user {}", self.config.user.handle))?;
        info!("Starting session for {}", person.handle);
        self.person = Some(person);

        self.scheduler.arm(self.clock.time());
        let greeting = format!("👋 Hi {}, {STARTUP_GREETING}", self.first_name());
        self.reply(&greeting).await;
        Ok(())
    }

    /// Disarms every job and timer. Logs that were still waiting for a flush are dropped.
    pub async fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        self.scheduler.disarm();
        self.deferred_clock_out = None;
        let dropped = self.batcher.discard();
        if dropped > 0 {
            warn!("Dropping {dropped} unsaved log line(s)");
        }
        self.reply(FAREWELL).await;
        info!("Session stopped");
    }

    /// Executes the session event loop until `shutdown` is cancelled.
    pub async fn run(
        mut self,
        mut receiver: mpsc::Receiver<InboundMessage>,
        shutdown: CancellationToken,
    ) -> Result<()> {
        self.start().await?;
        let mut inbound_open = true;
        loop {
            match self.next_event(&mut receiver, inbound_open, &shutdown).await {
                SessionEvent::Shutdown => break,
                SessionEvent::InboundClosed => {
                    warn!("Chat stopped delivering messages");
                    inbound_open = false;
                }
                SessionEvent::Message(message) => {
                    let span = info_span!("Handling message");
                    self.handle_message(&message.content).instrument(span).await
                }
                SessionEvent::FlushBatch => self.flush_batch().await,
                SessionEvent::DeferredClockOut => self.fire_deferred_clock_out().await,
                SessionEvent::Job(job) => {
                    let span = info_span!("Running job", ?job);
                    self.run_job(job).instrument(span).await
                }
            }
        }
        self.stop().await;
        Ok(())
    }

    async fn next_event(
        &self,
        receiver: &mut mpsc::Receiver<InboundMessage>,
        inbound_open: bool,
        shutdown: &CancellationToken,
    ) -> SessionEvent {
        let clock = &*self.clock;
        let flush_at = self.batcher.deadline();
        let clock_out_at = self.deferred_clock_out;
        let next_job = self
            .scheduler
            .next_due()
            .map(|(job, at)| (job, clock.instant_at(at)));

        tokio::select! {
            _ = shutdown.cancelled() => SessionEvent::Shutdown,
            message = receiver.recv(), if inbound_open => match message {
                Some(message) => SessionEvent::Message(message),
                None => SessionEvent::InboundClosed,
            },
            _ = wait_until(clock, flush_at) => SessionEvent::FlushBatch,
            _ = wait_until(clock, clock_out_at) => SessionEvent::DeferredClockOut,
            job = wait_for_job(clock, next_job) => SessionEvent::Job(job),
        }
    }

    /// Classifies a message and acts on it. Failures are reported back to the user.
    pub async fn handle_message(&mut self, content: &str) {
        let intent = classify(content);
        let reply = match self.dispatch(intent, content).await {
            Ok(Some(reply)) => reply,
            Ok(None) => return,
            Err(e) => {
                warn!("Failed to handle {:?}: {e:?}", intent.tokens());
                user_reply(&e)
            }
        };
        self.reply(&reply).await;
    }

    /// Acts on `intent`. Messages without a command only feed the log batch and get no reply.
    async fn dispatch(&mut self, intent: Intent, content: &str) -> Result<Option<String>> {
        let reply = match intent {
            Intent::UpdateClock(direction) => {
                let outcome = self.clock_state().update(direction).await?;
                if direction == ClockDirection::Out {
                    self.deferred_clock_out = None;
                }
                outcome.to_string()
            }
            Intent::CancelClockOut => {
                if self.deferred_clock_out.is_none() {
                    return Err(UserFacingError::new("I wasn't going to clock you out").into());
                }
                self.deferred_clock_out = Some(self.clock.instant() + POSTPONED_CLOCK_OUT_DELAY);
                CLOCK_OUT_POSTPONED.to_string()
            }
            Intent::DisplayStatus => {
                self.clock_state()
                    .status_message(self.clock.time())
                    .await?
            }
            Intent::NoMatch => {
                let lines = extract_log_lines(content);
                if lines.is_empty() {
                    debug!("Ignoring message {content:?}");
                } else {
                    self.batcher.submit(lines, self.clock.instant());
                }
                return Ok(None);
            }
        };
        info!("Handled {:?}", intent.tokens());
        Ok(Some(reply))
    }

    async fn flush_batch(&mut self) {
        let now = self.clock.time();
        let instant = self.clock.instant();
        let clock = ClockState::new(&*self.tracker, &self.config.project, self.config.timezone);
        let reply = match self.batcher.flush(&clock, now, instant).await {
            Ok(0) => return,
            Ok(count) => confirmation(count),
            Err(e) => {
                error!(
                    "Failed to flush {} log line(s) {e:?}",
                    self.batcher.pending().len()
                );
                user_reply(&e)
            }
        };
        self.reply(&reply).await;
    }

    async fn fire_deferred_clock_out(&mut self) {
        self.deferred_clock_out = None;
        let reply = match self.clock_state().update(ClockDirection::Out).await {
            Ok(outcome) => outcome.to_string(),
            Err(e) => {
                error!("Automatic clock-out failed {e:?}");
                user_reply(&e)
            }
        };
        self.reply(&reply).await;
    }

    /// Runs a recurring job. Failures are logged and the job stays scheduled.
    pub async fn run_job(&mut self, job: Job) {
        let now = self.clock.time();
        self.scheduler.complete(job, now);

        let result = match job {
            Job::AutoClockIn => auto_clock_in(&self.clock_state(), self.first_name(), now).await,
            Job::AutoClockOut => {
                self.deferred_clock_out = Some(self.clock.instant() + AUTO_CLOCK_OUT_DELAY);
                Ok(CLOCK_OUT_WARNING.to_string())
            }
            Job::PromptActivity => activity_prompt(&self.clock_state(), now).await,
        };

        match result {
            Ok(message) => self.reply(&message).await,
            Err(e) => error!("Scheduled job {job:?} failed {e:?}"),
        }
    }

    async fn reply(&self, text: &str) {
        if let Err(e) = self.chat.send_message(text).await {
            error!("Failed to send message {text:?}: {e:?}");
        }
    }
}

async fn wait_until(clock: &dyn Clock, deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => clock.sleep_until(deadline).await,
        None => future::pending().await,
    }
}

async fn wait_for_job(clock: &dyn Clock, next: Option<(Job, Instant)>) -> Job {
    match next {
        Some((job, at)) => {
            clock.sleep_until(at).await;
            job
        }
        None => future::pending().await,
    }
}
