//! Polling push of one identifier's latest location to a subscriber.
//!
//! Each [`LocationStream`] owns a background task that asks the tracker
//! runtime for the identifier's [`StreamHead`] on a fixed interval. When the
//! history grew since the last push, only the newest record is delivered;
//! records that arrived in between are coalesced.

use std::{
    pin::Pin,
    task::{Context, Poll},
};

use futures::Stream;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
    time::{self, Duration, Instant, MissedTickBehavior},
};
use tracing::{debug, info};

use crate::{
    core::store::StreamHead,
    location::LocationRecord,
    types::Identifier,
};

use super::handle::TrackerHandle;

/// Cadence and buffering for location streams.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Interval between length checks.
    pub poll_interval_ms: u64,
    /// Records a slow subscriber may have queued before pushes are retried.
    pub buffer: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            buffer: 16,
        }
    }
}

/// Lifecycle of a subscriber; `Detached` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberState {
    /// Open and polling.
    Attached,
    /// Closed; no further pushes.
    Detached,
}

/// Change detector comparing history length against the last pushed length.
#[derive(Debug)]
pub struct Subscriber {
    identifier: Identifier,
    last_known_length: usize,
    state: SubscriberState,
}

impl Subscriber {
    pub fn new(identifier: impl Into<Identifier>) -> Self {
        Self {
            identifier: identifier.into(),
            last_known_length: 0,
            state: SubscriberState::Attached,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn state(&self) -> SubscriberState {
        self.state
    }

    pub fn last_known_length(&self) -> usize {
        self.last_known_length
    }

    /// Records the current length and returns the catch-up record, if any.
    pub fn attach(&mut self, head: StreamHead) -> Option<LocationRecord> {
        if self.state == SubscriberState::Detached {
            return None;
        }
        self.last_known_length = head.length;
        head.latest
    }

    /// Returns the record to push and the length it corresponds to when the
    /// history grew past the last acknowledged length.
    pub fn check(&self, head: StreamHead) -> Option<(LocationRecord, usize)> {
        if self.state == SubscriberState::Detached || head.length <= self.last_known_length {
            return None;
        }
        head.latest.map(|record| (record, head.length))
    }

    pub fn acknowledge(&mut self, length: usize) {
        if self.state == SubscriberState::Attached {
            self.last_known_length = self.last_known_length.max(length);
        }
    }

    pub fn detach(&mut self) {
        self.state = SubscriberState::Detached;
    }
}

/// Live feed of one identifier's latest location.
///
/// Dropping the stream or calling [`LocationStream::detach`] stops the
/// background check before returning.
pub struct LocationStream {
    identifier: Identifier,
    rx: mpsc::Receiver<LocationRecord>,
    task: JoinHandle<()>,
    state: SubscriberState,
}

impl LocationStream {
    pub(crate) fn attach(
        handle: TrackerHandle,
        identifier: Identifier,
        config: &StreamConfig,
    ) -> Self {
        let (tx, rx) = mpsc::channel(config.buffer.max(1));
        let period = Duration::from_millis(config.poll_interval_ms.max(1));

        info!(
            identifier = %identifier,
            poll_interval_ms = config.poll_interval_ms,
            "location stream attached"
        );
        let task = tokio::spawn(run_subscriber(
            handle,
            Subscriber::new(identifier.clone()),
            tx,
            period,
        ));

        Self {
            identifier,
            rx,
            task,
            state: SubscriberState::Attached,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn is_attached(&self) -> bool {
        self.state == SubscriberState::Attached
    }

    /// Waits for the next pushed record; `None` once detached.
    pub async fn recv(&mut self) -> Option<LocationRecord> {
        if !self.is_attached() {
            return None;
        }
        let next = self.rx.recv().await;
        if next.is_none() {
            self.detach();
        }
        next
    }

    pub fn detach(&mut self) {
        if self.state == SubscriberState::Detached {
            return;
        }
        self.state = SubscriberState::Detached;
        self.task.abort();
        self.rx.close();
        info!(identifier = %self.identifier, "location stream detached");
    }
}

impl Stream for LocationStream {
    type Item = LocationRecord;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if !self.is_attached() {
            return Poll::Ready(None);
        }
        let next = self.rx.poll_recv(cx);
        if let Poll::Ready(None) = next {
            self.detach();
        }
        next
    }
}

impl Drop for LocationStream {
    fn drop(&mut self) {
        self.detach();
    }
}

async fn run_subscriber(
    handle: TrackerHandle,
    mut subscriber: Subscriber,
    tx: mpsc::Sender<LocationRecord>,
    period: Duration,
) {
    match handle.head(subscriber.identifier()).await {
        Ok(head) => {
            if let Some(record) = subscriber.attach(head) {
                if tx.try_send(record).is_err() {
                    subscriber.detach();
                }
            }
        }
        Err(_) => subscriber.detach(),
    }

    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while subscriber.state() == SubscriberState::Attached {
        tokio::select! {
            biased;
            _ = tx.closed() => subscriber.detach(),
            _ = ticker.tick() => check_once(&handle, &mut subscriber, &tx).await,
        }
    }

    debug!(
        identifier = %subscriber.identifier(),
        last_known_length = subscriber.last_known_length(),
        "location stream check stopped"
    );
}

async fn check_once(
    handle: &TrackerHandle,
    subscriber: &mut Subscriber,
    tx: &mpsc::Sender<LocationRecord>,
) {
    let head = match handle.head(subscriber.identifier()).await {
        Ok(head) => head,
        Err(_) => {
            subscriber.detach();
            return;
        }
    };

    let Some((record, length)) = subscriber.check(head) else {
        return;
    };

    match tx.try_send(record) {
        Ok(()) => subscriber.acknowledge(length),
        // length stays unacknowledged so the next tick pushes the newest record
        Err(TrySendError::Full(_)) => debug!(
            identifier = %subscriber.identifier(),
            "subscriber buffer full, retrying next tick"
        ),
        Err(TrySendError::Closed(_)) => subscriber.detach(),
    }
}
