//! Polling loop for watch mode.
//!
//! Each tick polls every source once. Sources are polled concurrently, bounded
//! by a semaphore, while each source's state is borrowed exclusively by its own
//! poll so two fetches of the same source never overlap. A tick never starts
//! before the previous one has finished.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::app::{FreshetError, Result};
use crate::config::{format_interval, DEFAULT_WORKERS};
use crate::domain::{FetchOutcome, InputRef, WatchState};
use crate::fetcher::{ChangeAwareFetcher, RequestOptions};

/// One watched document and its session state.
#[derive(Debug, Clone)]
pub struct Source {
    pub label: String,
    pub input: InputRef,
    pub state: WatchState,
}

impl Source {
    pub fn new(input: InputRef) -> Self {
        Self::with_state(input, WatchState::new())
    }

    pub fn with_state(input: InputRef, state: WatchState) -> Self {
        Self {
            label: input.to_string(),
            input,
            state,
        }
    }
}

/// What happened to one source during one tick.
#[derive(Debug)]
pub struct PollReport {
    pub index: usize,
    pub label: String,
    pub polled_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub result: Result<FetchOutcome>,
}

#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub interval: Duration,
    pub timeout: Duration,
    pub request: RequestOptions,
    pub workers: usize,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            timeout: Duration::from_secs(10),
            request: RequestOptions::default(),
            workers: DEFAULT_WORKERS,
        }
    }
}

/// Stops a running [`Watcher`] from anywhere.
#[derive(Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

pub struct Watcher {
    fetcher: Arc<ChangeAwareFetcher>,
    sources: Vec<Source>,
    options: WatchOptions,
    semaphore: Arc<Semaphore>,
    stop: StopHandle,
}

impl Watcher {
    pub fn new(fetcher: Arc<ChangeAwareFetcher>, sources: Vec<Source>, options: WatchOptions) -> Self {
        let semaphore = Arc::new(Semaphore::new(options.workers.max(1)));
        Self {
            fetcher,
            sources,
            options,
            semaphore,
            stop: StopHandle::default(),
        }
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Poll every source once and wait for all of them.
    pub async fn poll_once(&mut self) -> Vec<PollReport> {
        let fetcher = &self.fetcher;
        let options = &self.options;
        let semaphore = &self.semaphore;

        let polls = self
            .sources
            .iter_mut()
            .enumerate()
            .map(move |(index, source)| async move {
                let permit = semaphore.acquire().await;
                // Queueing for a worker is not part of the poll
                let polled_at = Utc::now();
                let started = Instant::now();

                let result = match permit {
                    Ok(_permit) => {
                        fetcher
                            .fetch(
                                &source.input,
                                &options.request,
                                options.timeout,
                                &mut source.state,
                            )
                            .await
                    }
                    Err(_) => Err(FreshetError::Other("Worker pool closed".to_string())),
                };

                PollReport {
                    index,
                    label: source.label.clone(),
                    polled_at,
                    elapsed: started.elapsed(),
                    result,
                }
            });

        join_all(polls).await
    }

    /// Poll on every tick until SIGINT/SIGTERM or [`StopHandle::stop`].
    pub async fn run<F>(&mut self, on_report: F) -> Result<()>
    where
        F: FnMut(&PollReport),
    {
        let stop = self.stop.clone();
        let listener = tokio::spawn(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received");
            stop.stop();
        });

        self.run_with_listener(listener, on_report).await
    }

    /// Run until stopped, then abort `listener`.
    async fn run_with_listener<F>(&mut self, listener: JoinHandle<()>, on_report: F) -> Result<()>
    where
        F: FnMut(&PollReport),
    {
        let result = self.run_until_stopped(on_report).await;
        listener.abort();
        result
    }

    /// Poll on every tick until [`StopHandle::stop`] is called. The first
    /// tick fires immediately.
    pub async fn run_until_stopped<F>(&mut self, mut on_report: F) -> Result<()>
    where
        F: FnMut(&PollReport),
    {
        tracing::info!(
            "Watching {} sources (interval: {}, workers: {})",
            self.sources.len(),
            format_interval(self.options.interval),
            self.options.workers
        );

        let mut timer = interval(self.options.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let stop = self.stop.clone();

        while !stop.is_stopped() {
            // Register interest before checking the flag to avoid a lost wakeup
            let stopped = stop.notify.notified();
            tokio::pin!(stopped);
            stopped.as_mut().enable();
            if stop.is_stopped() {
                break;
            }

            tokio::select! {
                _ = timer.tick() => {}
                _ = &mut stopped => break,
            }

            let reports = self.poll_once().await;
            log_tick(&reports);
            for report in &reports {
                on_report(report);
            }
        }

        tracing::info!("Watcher stopped");
        Ok(())
    }
}

fn log_tick(reports: &[PollReport]) {
    let mut changed = 0;
    let mut failed = 0;

    for report in reports {
        match &report.result {
            Ok(FetchOutcome::Content { .. }) => changed += 1,
            Ok(FetchOutcome::NotModified { .. }) => {}
            Ok(FetchOutcome::NotOk { response }) => {
                failed += 1;
                tracing::warn!(
                    "{} unavailable (status {}, {:?})",
                    report.label,
                    response.status,
                    report.elapsed
                );
            }
            Err(e) => {
                failed += 1;
                tracing::error!("Polling {} failed: {}", report.label, e);
            }
        }
    }

    tracing::debug!(
        "Tick complete: {} changed, {} unavailable, {} sources",
        changed,
        failed,
        reports.len()
    );
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {},
                _ = sigint.recv() => {},
            }
        }
        _ => {
            tracing::warn!("Failed to install signal handlers, falling back to Ctrl-C");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
