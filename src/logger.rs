use crate::gate::Gate;
use crate::message::{Arg, MessageFormatter};
use crate::options::LoggerOptions;
use crate::registry::{StatusRegistry, Upsert};
use crate::render::Renderer;
use crate::style::Style;
use anyhow::{anyhow, Context, Result};
use log::{debug, trace, warn};
use parking_lot::Mutex;
use serde_json::Value;
use std::future::Future;
use std::io::{self, Stdout, Write};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Formatting passes to try before giving up on a redraw whose statuses keep
/// being added or removed while it formats.
const REDRAW_ATTEMPTS: usize = 3;

/// Live block of named status lines at the bottom of a terminal.
///
/// The logger is a cheap handle; clones share the same display. Every redraw
/// erases the previously drawn block and writes each active status again with
/// its elapsed time, once per tick while any status is active.
///
/// The internal lock is released whenever user code runs (formatters, end
/// callbacks, paused operations), so all of them may call back into the logger.
pub struct StatusLogger<W: Write + Send + 'static = Stdout> {
    shared: Arc<Mutex<State<W>>>,
}

impl<W: Write + Send + 'static> Clone for StatusLogger<W> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

struct State<W: Write> {
    registry: StatusRegistry,
    // Bumped whenever a status is added or removed.
    revision: u64,
    renderer: Renderer<W>,
    gate: Gate,
    formatter: Arc<dyn MessageFormatter>,
    style: Style,
    tick: Duration,
    ticker: Option<JoinHandle<()>>,
}

/// What a redraw needs to format its lines once the lock is released.
struct Snapshot {
    revision: u64,
    formatter: Arc<dyn MessageFormatter>,
    entries: Vec<(Vec<Arg>, Instant)>,
}

impl Snapshot {
    fn format(&self, now: Instant) -> Vec<String> {
        self.entries
            .iter()
            .map(|(args, started)| {
                self.formatter
                    .format(args, now.saturating_duration_since(*started))
            })
            .collect()
    }
}

impl<W: Write> State<W> {
    fn snapshot(&self) -> Option<Snapshot> {
        if self.gate.is_paused() {
            return None;
        }
        Some(Snapshot {
            revision: self.revision,
            formatter: self.formatter.clone(),
            entries: self
                .registry
                .iter()
                .map(|(_, entry)| (entry.args.clone(), entry.started))
                .collect(),
        })
    }

    fn changed(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn forget(&mut self, name: &str) {
        if self.registry.remove(name).is_some() {
            self.changed();
        }
        if self.registry.is_empty() {
            self.stop_ticker();
        }
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            debug!("Stopping status render loop");
            ticker.abort();
        }
    }
}

impl<W: Write> Drop for State<W> {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

/// Formats every active status with the lock released, then draws the block if
/// no status was added or removed in the meantime. A no-op while paused.
fn redraw<W: Write>(shared: &Mutex<State<W>>, now: Instant) -> io::Result<()> {
    for _ in 0..REDRAW_ATTEMPTS {
        let Some(snapshot) = shared.lock().snapshot() else {
            return Ok(());
        };
        let messages = snapshot.format(now);

        let mut guard = shared.lock();
        let state = &mut *guard;
        if state.gate.is_paused() {
            return Ok(());
        }
        if state.revision == snapshot.revision {
            trace!(
                "Redrawing {} statuses over {} drawn lines",
                messages.len(),
                state.renderer.line_count()
            );
            return state.renderer.draw(&messages, &state.style);
        }
    }
    trace!("Skipping redraw, statuses changed while formatting");
    Ok(())
}

impl StatusLogger<Stdout> {
    pub fn new(options: LoggerOptions) -> Self {
        Self::with_writer(io::stdout(), options)
    }
}

impl Default for StatusLogger<Stdout> {
    fn default() -> Self {
        Self::new(LoggerOptions::default())
    }
}

impl<W: Write + Send + 'static> StatusLogger<W> {
    pub fn with_writer(output: W, options: LoggerOptions) -> Self {
        let state = State {
            registry: StatusRegistry::new(),
            revision: 0,
            renderer: Renderer::new(output),
            gate: Gate::default(),
            formatter: options.message_formatter(),
            style: options.style(),
            tick: options.tick,
            ticker: None,
        };
        Self {
            shared: Arc::new(Mutex::new(state)),
        }
    }

    /// Shows `name` with `args`, or replaces the arguments of an already active
    /// `name`. Updating never resets the elapsed time of a status.
    ///
    /// The first status to become active starts the render loop on the current
    /// Tokio runtime and is drawn immediately; later ones appear on the next tick.
    /// If that first draw fails, the status is not kept.
    pub fn status<I, A>(&self, name: &str, args: I) -> Result<()>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        let now = Instant::now();
        let args = args.into_iter().map(Into::into).collect();
        if self.activate(name, args, now)? {
            if let Err(err) = redraw(&self.shared, now) {
                self.shared.lock().forget(name);
                return Err(err.into());
            }
        }
        self.play_callbacks();
        Ok(())
    }

    /// Records `name`, starting the render loop when it is the first active
    /// status. Returns whether the loop was started.
    fn activate(&self, name: &str, args: Vec<Arg>, now: Instant) -> Result<bool> {
        let mut state = self.shared.lock();
        if state.registry.upsert(name, args, now) == Upsert::Updated {
            return Ok(false);
        }
        state.changed();
        if state.ticker.is_some() {
            return Ok(false);
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                state.forget(name);
                return Err(err)
                    .context("status lines need a Tokio runtime to drive their render loop");
            }
        };
        debug!("Starting status render loop");
        let first_tick = now + state.tick;
        state.ticker = Some(runtime.spawn(tick_loop(
            Arc::downgrade(&self.shared),
            first_tick,
            state.tick,
        )));
        Ok(true)
    }

    /// Ends `name` and redraws the remaining statuses.
    pub fn status_end(&self, name: &str) -> Result<()> {
        self.end(name, None)
    }

    /// Ends `name` and hands its final message to `callback` once the display is
    /// not paused. Non-empty `args` replace the status's last arguments in that
    /// message. The callback also receives the first structured argument, if any.
    ///
    /// The status is ended and the callback queued even when redrawing fails; the
    /// write error is returned afterwards.
    pub fn status_end_with<I, A, F>(&self, name: &str, args: I, callback: F) -> Result<()>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
        F: FnOnce(String, Option<Value>) + Send + 'static,
    {
        let args: Vec<Arg> = args.into_iter().map(Into::into).collect();
        let callback: EndCallback = Box::new(callback);
        self.end(name, Some((args, callback)))
    }

    fn end(&self, name: &str, completion: Option<(Vec<Arg>, EndCallback)>) -> Result<()> {
        let now = Instant::now();
        let (entry, formatter) = {
            let mut state = self.shared.lock();
            let entry = state
                .registry
                .get(name)
                .cloned()
                .ok_or_else(|| anyhow!("no active status named `{name}`"))?;
            state.forget(name);
            (entry, state.formatter.clone())
        };
        let drawn = redraw(&self.shared, now);

        if let Some((args, callback)) = completion {
            let args = if args.is_empty() { entry.args } else { args };
            let elapsed = now.saturating_duration_since(entry.started);
            let message = formatter.format(&args, elapsed);
            let payload = args.iter().find_map(Arg::as_object).cloned();
            self.shared
                .lock()
                .gate
                .defer(Box::new(move || callback(message, payload)));
        }
        self.play_callbacks();
        Ok(drawn?)
    }

    /// Ends every status without running any callbacks and erases the display.
    pub fn status_end_all(&self) -> Result<()> {
        let mut state = self.shared.lock();
        state.registry.clear();
        state.changed();
        state.stop_ticker();
        state.renderer.clear()?;
        Ok(())
    }

    /// Runs `operation` with the display erased, then restores it. End callbacks
    /// issued meanwhile run after the display is back, in the order they were
    /// issued. The operation's outcome is returned unchanged.
    pub fn wait_until<T>(&self, operation: impl FnOnce() -> T) -> T {
        let _pause = self.pause();
        operation()
    }

    /// Like [`StatusLogger::wait_until`], for an operation that completes later.
    /// The display is restored when the future settles, before its output is
    /// returned.
    pub async fn wait_until_async<F, Fut, T>(&self, operation: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _pause = self.pause();
        operation().await
    }

    /// Erases the display and holds redraws and end callbacks until the returned
    /// guard is released.
    pub fn pause(&self) -> PauseGuard<W> {
        let mut state = self.shared.lock();
        state.gate.pause();
        debug!("Pausing status display");
        if let Err(err) = state.renderer.clear() {
            warn!("Failed to erase status display: {err}");
        }
        PauseGuard {
            logger: Some(self.clone()),
        }
    }

    fn resume(&self, play_callbacks: bool) {
        {
            let mut state = self.shared.lock();
            if !state.gate.release() {
                return;
            }
            debug!(
                "Resuming status display with {} held callbacks",
                state.gate.pending()
            );
        }
        if let Err(err) = redraw(&self.shared, Instant::now()) {
            warn!("Failed to redraw status display: {err}");
        }
        if play_callbacks {
            self.play_callbacks();
        }
    }

    // Callbacks run without the lock held so they may use the logger themselves.
    fn play_callbacks(&self) {
        loop {
            let next = self.shared.lock().gate.next_ready();
            match next {
                Some(callback) => callback(),
                None => break,
            }
        }
    }

    pub fn is_paused(&self) -> bool {
        self.shared.lock().gate.is_paused()
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.shared.lock().registry.contains(name)
    }

    /// Names of active statuses in display order.
    pub fn active(&self) -> Vec<String> {
        self.shared.lock().registry.names().map(str::to_owned).collect()
    }

    pub fn is_ticking(&self) -> bool {
        self.shared.lock().ticker.is_some()
    }

    pub fn style(&self) -> Style {
        self.shared.lock().style.clone()
    }

    /// Replaces the style used from the next redraw on.
    pub fn set_color(&self, color: &str) {
        self.shared.lock().style = Style::parse(color);
    }
}

type EndCallback = Box<dyn FnOnce(String, Option<Value>) + Send + 'static>;

async fn tick_loop<W: Write + Send + 'static>(
    shared: Weak<Mutex<State<W>>>,
    start: Instant,
    period: Duration,
) {
    let mut interval = time::interval_at(start, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        let Some(shared) = shared.upgrade() else {
            break;
        };
        if let Err(err) = redraw(&shared, Instant::now()) {
            warn!("Failed to redraw status display: {err}");
        }
    }
}

/// Keeps a [`StatusLogger`] paused. Dropping it resumes the display and runs any
/// end callbacks that were held back.
///
/// A guard dropped while panicking restores the display but leaves held callbacks
/// queued. They run at the next `status`, `status_end*` or resume.
#[must_use = "the display resumes as soon as the guard is dropped"]
pub struct PauseGuard<W: Write + Send + 'static = Stdout> {
    logger: Option<StatusLogger<W>>,
}

impl<W: Write + Send + 'static> PauseGuard<W> {
    pub fn resume(mut self) {
        if let Some(logger) = self.logger.take() {
            logger.resume(true);
        }
    }
}

impl<W: Write + Send + 'static> Drop for PauseGuard<W> {
    fn drop(&mut self) {
        if let Some(logger) = self.logger.take() {
            // Held callbacks wait for the next drain rather than run mid-unwind.
            logger.resume(!std::thread::panicking());
        }
    }
}
