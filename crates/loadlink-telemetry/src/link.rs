use loadlink_frame::{
    decode, AssemblerStats, CommandWriter, DecodeError, FrameAssembler, FrameError, Reading,
    SendCommand,
};
use loadlink_transport::Connector;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::LinkConfig;
use crate::dispatch::{self, StatusEvent};
use crate::error::{LinkError, Result};
use crate::pump::{ChunkPump, PumpEvent};
use crate::snapshot::{SystemErrors, TelemetrySnapshot};
use crate::state::ConnectionState;

/// Outcome of feeding one chunk through the link.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessReport {
    /// Complete frames the chunk finished.
    pub frames: usize,
    /// Frames that decoded and were applied to the snapshot, in order.
    pub readings: Vec<Reading>,
    /// Frames that were dropped because they failed to decode.
    #[serde(skip)]
    pub rejected: Vec<DecodeError>,
    pub events: Vec<StatusEvent>,
}

/// A connection to the sensor controller.
///
/// Owns the connection state, the frame assembler and the telemetry snapshot.
/// Sending and processing take `&mut self`, so a link shared between a reader
/// loop and a command sender lives behind one `Mutex` and both sides observe
/// the same state.
pub struct Link<C: Connector> {
    connector: C,
    config: LinkConfig,
    state: ConnectionState,
    assembler: FrameAssembler,
    snapshot: TelemetrySnapshot,
    writer: Option<CommandWriter<C::Sink>>,
    source: Option<C::Source>,
}

impl<C: Connector> Link<C> {
    pub fn new(connector: C) -> Self {
        Self::with_config(connector, LinkConfig::default())
    }

    pub fn with_config(connector: C, config: LinkConfig) -> Self {
        Self {
            assembler: FrameAssembler::with_max_pending(config.max_pending),
            connector,
            config,
            state: ConnectionState::Disconnected,
            snapshot: TelemetrySnapshot::default(),
            writer: None,
            source: None,
        }
    }

    /// Open the transport.
    ///
    /// On success the snapshot starts over from zero and the link-failure
    /// flag is clear. On failure the state records the reason and the
    /// link-failure flag is raised.
    pub fn connect(&mut self) -> Result<()> {
        let target = self.connector.describe();
        match self.connector.connect(self.config.timeouts()) {
            Ok((source, sink)) => {
                self.writer = Some(CommandWriter::with_config(
                    sink,
                    self.config.frame_config(),
                ));
                self.source = Some(source);
                self.assembler = FrameAssembler::with_max_pending(self.config.max_pending);
                self.snapshot = TelemetrySnapshot::default();
                self.state = ConnectionState::Connected;
                info!(target = %target, "link connected");
                Ok(())
            }
            Err(err) => {
                self.drop_stream();
                self.snapshot
                    .system_errors
                    .set(SystemErrors::LINK_FAILURE);
                self.state = ConnectionState::ConnectFailed(err.to_string());
                warn!(target = %target, error = %err, "link connect failed");
                Err(LinkError::Connect {
                    target,
                    source: err,
                })
            }
        }
    }

    /// Close the link from the host side.
    pub fn disconnect(&mut self) {
        if self.state.is_connected() {
            info!(target = %self.connector.describe(), "link disconnected");
        }
        self.drop_stream();
        self.state = ConnectionState::Disconnected;
    }

    /// Record that the link dropped while reading.
    pub fn read_failed(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(target = %self.connector.describe(), reason = %reason, "link lost");
        self.drop_stream();
        self.snapshot
            .system_errors
            .set(SystemErrors::LINK_FAILURE);
        self.state = ConnectionState::ConnectFailed(reason);
    }

    /// Encode and transmit one command.
    ///
    /// Fails with [`LinkError::NotConnected`] before anything is encoded when
    /// the link is down.
    pub fn send(&mut self, command: SendCommand, data: &str) -> Result<()> {
        let writer = match (&self.state, self.writer.as_mut()) {
            (ConnectionState::Connected, Some(writer)) => writer,
            _ => return Err(LinkError::NotConnected),
        };
        writer.send(command, data).map_err(|err| match err {
            FrameError::Encode(err) => LinkError::Encode(err),
            other => LinkError::Frame(other),
        })
    }

    /// Feed a chunk of received bytes through assembly, decoding and dispatch.
    ///
    /// Frames that fail to decode are logged and skipped; the frames around
    /// them are still applied.
    pub fn process(&mut self, chunk: &[u8]) -> Result<ProcessReport> {
        if !self.state.is_connected() {
            return Err(LinkError::NotConnected);
        }

        let frames = self.assembler.process(chunk);
        let mut report = ProcessReport {
            frames: frames.len(),
            ..Default::default()
        };
        for frame in frames {
            match decode(&frame) {
                Ok(reading) => {
                    if let Some(event) = dispatch::apply(&reading, &mut self.snapshot) {
                        report.events.push(event);
                    }
                    report.readings.push(reading);
                }
                Err(err) => {
                    warn!(frame = %frame, error = %err, "dropping undecodable frame");
                    report.rejected.push(err);
                }
            }
        }
        Ok(report)
    }

    /// Handle one event from the reader thread.
    ///
    /// EOF and read errors mark the link failed and come back as
    /// [`LinkError::Disconnected`].
    pub fn handle(&mut self, event: PumpEvent) -> Result<ProcessReport> {
        let reason = match event {
            PumpEvent::Chunk(chunk) => return self.process(&chunk),
            PumpEvent::Closed => "controller closed the link".to_string(),
            PumpEvent::Failed(err) => err.to_string(),
        };
        self.read_failed(reason.clone());
        Err(LinkError::Disconnected(reason))
    }

    /// Move the read half into a reader thread.
    pub fn start_pump(&mut self) -> Result<ChunkPump> {
        if !self.state.is_connected() {
            return Err(LinkError::NotConnected);
        }
        let source = self.source.take().ok_or(LinkError::ReaderTaken)?;
        let pump = ChunkPump::spawn(
            source,
            self.config.read_chunk_size,
            self.config.channel_capacity,
        )
        .map_err(LinkError::Pump)?;
        debug!(
            chunk_size = self.config.read_chunk_size,
            capacity = self.config.channel_capacity,
            "reader thread started"
        );
        Ok(pump)
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn snapshot(&self) -> &TelemetrySnapshot {
        &self.snapshot
    }

    pub fn assembler_stats(&self) -> AssemblerStats {
        self.assembler.stats()
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    fn drop_stream(&mut self) {
        self.writer = None;
        self.source = None;
        let dropped = self.assembler.reset();
        if dropped > 0 {
            debug!(bytes = dropped, "discarded partial frame");
        }
    }
}
