use std::fmt;

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info};

use crate::{
    core::store::{LocationStore, StreamHead},
    location::{LocationRecord, RawLocationReport, ValidatedLocation},
    types::Identifier,
    validate::{ValidationError, validate},
};

use super::{
    events::LocationEvent,
    stream::{LocationStream, StreamConfig},
};

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    Validation(ValidationError),
    ChannelClosed,
}

impl From<ValidationError> for RuntimeError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid location report: {err}"),
            Self::ChannelClosed => f.write_str("tracker runtime is not running"),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::ChannelClosed => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub command_queue_bound: usize,
    pub event_capacity: usize,
    pub stream: StreamConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_queue_bound: 256,
            event_capacity: 1024,
            stream: StreamConfig::default(),
        }
    }
}

pub struct TrackerHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<LocationEvent>,
    stream_config: StreamConfig,
}

impl Clone for TrackerHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
            stream_config: self.stream_config.clone(),
        }
    }
}

enum Command {
    Append {
        location: ValidatedLocation,
        resp: oneshot::Sender<LocationRecord>,
    },
    Latest {
        identifier: Identifier,
        resp: oneshot::Sender<Option<LocationRecord>>,
    },
    LatestAll {
        resp: oneshot::Sender<Vec<LocationRecord>>,
    },
    History {
        identifier: Identifier,
        resp: oneshot::Sender<Option<Vec<LocationRecord>>>,
    },
    Length {
        identifier: Identifier,
        resp: oneshot::Sender<usize>,
    },
    Head {
        identifier: Identifier,
        resp: oneshot::Sender<StreamHead>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

pub fn spawn_tracker(store: LocationStore, config: RuntimeConfig) -> TrackerHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound);
    let (events_tx, _) = broadcast::channel::<LocationEvent>(config.event_capacity);

    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        let mut store = store;
        info!(
            identifiers = store.identifiers().len(),
            records = store.total_records(),
            "tracker runtime started"
        );

        while let Some(cmd) = cmd_rx.recv().await {
            if handle_command(cmd, &mut store, &events_tx_loop) {
                break;
            }
        }

        let _ = events_tx_loop.send(LocationEvent::Stopped);
        info!(
            identifiers = store.identifiers().len(),
            records = store.total_records(),
            "tracker runtime stopped"
        );
    });

    TrackerHandle {
        cmd_tx,
        events_tx,
        stream_config: config.stream,
    }
}

impl TrackerHandle {
    pub fn events(&self) -> broadcast::Receiver<LocationEvent> {
        self.events_tx.subscribe()
    }

    /// Attaches a polling stream that pushes `identifier`'s latest location.
    pub fn subscribe(&self, identifier: impl Into<Identifier>) -> LocationStream {
        LocationStream::attach(self.clone(), identifier.into(), &self.stream_config)
    }

    /// Validates a raw report and appends it on success.
    pub async fn ingest(&self, report: RawLocationReport) -> Result<LocationRecord, RuntimeError> {
        let location = validate(report)?;
        self.append(location).await
    }

    pub async fn append(
        &self,
        location: ValidatedLocation,
    ) -> Result<LocationRecord, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Append { location, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    pub async fn latest(
        &self,
        identifier: impl Into<Identifier>,
    ) -> Result<Option<LocationRecord>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Latest {
                identifier: identifier.into(),
                resp: tx,
            })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    pub async fn latest_all(&self) -> Result<Vec<LocationRecord>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::LatestAll { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    pub async fn history(
        &self,
        identifier: impl Into<Identifier>,
    ) -> Result<Option<Vec<LocationRecord>>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::History {
                identifier: identifier.into(),
                resp: tx,
            })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    pub async fn length(&self, identifier: impl Into<Identifier>) -> Result<usize, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Length {
                identifier: identifier.into(),
                resp: tx,
            })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    pub async fn head(
        &self,
        identifier: impl Into<Identifier>,
    ) -> Result<StreamHead, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Head {
                identifier: identifier.into(),
                resp: tx,
            })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Shutdown { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }
}

fn handle_command(
    cmd: Command,
    store: &mut LocationStore,
    events_tx: &broadcast::Sender<LocationEvent>,
) -> bool {
    match cmd {
        Command::Append { location, resp } => {
            let record = store.append(location);
            let length = store.length(&record.identifier);
            debug!(
                identifier = %record.identifier,
                latitude = record.coordinates.latitude,
                longitude = record.coordinates.longitude,
                length,
                "location appended"
            );
            let _ = events_tx.send(LocationEvent::Appended {
                identifier: record.identifier.clone(),
                length,
            });
            let _ = resp.send(record);
        }
        Command::Latest { identifier, resp } => {
            let _ = resp.send(store.latest_cloned(&identifier));
        }
        Command::LatestAll { resp } => {
            let _ = resp.send(store.latest_all_cloned());
        }
        Command::History { identifier, resp } => {
            let _ = resp.send(store.history_cloned(&identifier));
        }
        Command::Length { identifier, resp } => {
            let _ = resp.send(store.length(&identifier));
        }
        Command::Head { identifier, resp } => {
            let _ = resp.send(store.head(&identifier));
        }
        Command::Shutdown { resp } => {
            let _ = resp.send(());
            return true;
        }
    }

    false
}
