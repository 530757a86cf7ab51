//! Device output through rodio
//!
//! The rodio stream is not `Send`, so it lives on a dedicated thread that
//! owns one sink per lane and executes commands sent over a channel.

use super::output::{AudioOutput, Lane, Playable};
use crate::error::{Error, Result};
use rodio::{Decoder, OutputStream, Sink, Source};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::sync::mpsc;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, error, info, warn};

enum Command {
    Start {
        lane: Lane,
        playable: Playable,
        offset_seconds: f64,
    },
    Level {
        lane: Lane,
        level: f32,
    },
    Stop {
        lane: Lane,
    },
}

/// Audio output on the default device
pub struct RodioOutput {
    tx: Mutex<mpsc::Sender<Command>>,
}

impl RodioOutput {
    /// Open the default output device on a dedicated thread
    pub fn open() -> Result<Self> {
        let (tx, rx) = mpsc::channel::<Command>();
        let (ready_tx, ready_rx) = mpsc::channel::<std::result::Result<(), String>>();

        std::thread::Builder::new()
            .name("dugout-audio".to_string())
            .spawn(move || {
                let (_stream, handle) = match OutputStream::try_default() {
                    Ok(pair) => pair,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                info!("Audio output thread started");

                let mut sinks: HashMap<Lane, Sink> = HashMap::new();
                while let Ok(command) = rx.recv() {
                    match command {
                        Command::Start {
                            lane,
                            playable,
                            offset_seconds,
                        } => {
                            if let Some(old) = sinks.remove(&lane) {
                                old.stop();
                            }
                            match Sink::try_new(&handle) {
                                Ok(sink) => {
                                    if append_source(&sink, &playable, offset_seconds) {
                                        sinks.insert(lane, sink);
                                    }
                                }
                                Err(e) => error!(%lane, "Failed to create sink: {}", e),
                            }
                        }
                        Command::Level { lane, level } => {
                            if let Some(sink) = sinks.get(&lane) {
                                sink.set_volume(level.clamp(0.0, 1.0));
                            }
                        }
                        Command::Stop { lane } => {
                            if let Some(sink) = sinks.remove(&lane) {
                                sink.stop();
                            }
                        }
                    }
                }
                info!("Audio output thread stopped");
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self { tx: Mutex::new(tx) }),
            Ok(Err(e)) => Err(Error::Internal(format!("Failed to open audio device: {}", e))),
            Err(_) => Err(Error::Internal("Audio output thread exited during startup".to_string())),
        }
    }

    fn send(&self, command: Command) {
        let sent = self
            .tx
            .lock()
            .map(|tx| tx.send(command).is_ok())
            .unwrap_or(false);
        if !sent {
            warn!("Audio output thread is gone");
        }
    }
}

fn append_source(sink: &Sink, playable: &Playable, offset_seconds: f64) -> bool {
    let skip = Duration::from_secs_f64(offset_seconds.max(0.0));
    match playable {
        Playable::File(path) => {
            let decoder = File::open(path)
                .map_err(|e| e.to_string())
                .and_then(|f| Decoder::new(BufReader::new(f)).map_err(|e| e.to_string()));
            match decoder {
                Ok(source) => {
                    sink.append(source.skip_duration(skip));
                    true
                }
                Err(e) => {
                    error!("Failed to decode {}: {}", path.display(), e);
                    false
                }
            }
        }
        Playable::Clip(bytes) => match Decoder::new(Cursor::new(bytes.as_ref().clone())) {
            Ok(source) => {
                sink.append(source.skip_duration(skip));
                true
            }
            Err(e) => {
                error!("Failed to decode voice clip: {}", e);
                false
            }
        },
        Playable::Url(url) => {
            warn!("Streaming URLs are not supported by the device output: {}", url);
            false
        }
    }
}

impl AudioOutput for RodioOutput {
    fn start(&self, lane: Lane, playable: &Playable, offset_seconds: f64) -> Result<()> {
        debug!(%lane, offset_seconds, "Device start: {}", playable.describe());
        self.send(Command::Start {
            lane,
            playable: playable.clone(),
            offset_seconds,
        });
        Ok(())
    }

    fn set_level(&self, lane: Lane, level: f32) {
        self.send(Command::Level { lane, level });
    }

    fn stop(&self, lane: Lane) {
        self.send(Command::Stop { lane });
    }
}
