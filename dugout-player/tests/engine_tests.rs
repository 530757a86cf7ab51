//! Integration tests for the playback engine
//!
//! Run on tokio's paused clock with a recording output, a resolver with
//! scripted delays and a recording speech synthesizer, so timing-sensitive
//! behavior (cancellation, fades, announcement sequencing, seek
//! coalescing) is deterministic.

use async_trait::async_trait;
use dugout_common::events::FailureKind;
use dugout_common::{DugoutEvent, EventBus, TransportKind, TransportState};
use dugout_player::audio::{AudioOutput, Lane, Playable};
use dugout_player::db::settings::RuntimeSettings;
use dugout_player::media::{MediaResolver, ResolvedMedia};
use dugout_player::voice::{SpeechSynthesizer, VoiceAdapter, VoiceProvider};
use dugout_player::{Error, PlaybackEngine, Result, SharedState};
use dugout_store::{
    DataStore, MusicSource, Player, SongRef, SoundButton, TeamEvent, Voice, VoiceKind,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Notify};
use tokio::time::{sleep, Instant};
use uuid::Uuid;

// ============================================================================
// Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Start { lane: Lane, what: String, offset: f64 },
    Level { lane: Lane, level: f32 },
    Stop { lane: Lane },
}

#[derive(Default)]
struct RecordingOutput {
    calls: Mutex<Vec<(Instant, Call)>>,
}

impl RecordingOutput {
    fn calls(&self) -> Vec<(Instant, Call)> {
        self.calls.lock().unwrap().clone()
    }

    fn starts(&self, lane: Lane) -> Vec<(String, f64)> {
        self.calls()
            .into_iter()
            .filter_map(|(_, call)| match call {
                Call::Start { lane: l, what, offset } if l == lane => Some((what, offset)),
                _ => None,
            })
            .collect()
    }

    fn levels(&self, lane: Lane) -> Vec<f32> {
        self.calls()
            .into_iter()
            .filter_map(|(_, call)| match call {
                Call::Level { lane: l, level } if l == lane => Some(level),
                _ => None,
            })
            .collect()
    }

    fn first_start_at(&self, what: &str) -> Option<Instant> {
        self.calls().into_iter().find_map(|(at, call)| match call {
            Call::Start { what: w, .. } if w == what => Some(at),
            _ => None,
        })
    }
}

impl AudioOutput for RecordingOutput {
    fn start(&self, lane: Lane, playable: &Playable, offset_seconds: f64) -> Result<()> {
        self.calls.lock().unwrap().push((
            Instant::now(),
            Call::Start {
                lane,
                what: playable.describe(),
                offset: offset_seconds,
            },
        ));
        Ok(())
    }

    fn set_level(&self, lane: Lane, level: f32) {
        self.calls
            .lock()
            .unwrap()
            .push((Instant::now(), Call::Level { lane, level }));
    }

    fn stop(&self, lane: Lane) {
        self.calls
            .lock()
            .unwrap()
            .push((Instant::now(), Call::Stop { lane }));
    }
}

#[derive(Clone, Copy)]
struct FakeTrack {
    delay: Duration,
    duration: Option<f64>,
}

#[derive(Default)]
struct FakeResolver {
    tracks: HashMap<String, FakeTrack>,
}

impl FakeResolver {
    fn with(mut self, id: &str, delay_ms: u64, duration: Option<f64>) -> Self {
        self.tracks.insert(
            id.to_string(),
            FakeTrack {
                delay: Duration::from_millis(delay_ms),
                duration,
            },
        );
        self
    }
}

#[async_trait]
impl MediaResolver for FakeResolver {
    async fn resolve(&self, _source: MusicSource, track_id: &str) -> Result<ResolvedMedia> {
        let track = *self
            .tracks
            .get(track_id)
            .ok_or_else(|| Error::NotFound(track_id.to_string()))?;
        sleep(track.delay).await;
        Ok(ResolvedMedia::new(
            Playable::File(PathBuf::from(track_id)),
            track.duration,
        ))
    }
}

/// Speech that takes a fixed time and records what was said
struct RecordingSpeech {
    seconds: f64,
    spoken: Mutex<Vec<(Instant, Lane, String)>>,
    stop_main: Notify,
    stop_preview: Notify,
    stop_voice: Notify,
}

impl RecordingSpeech {
    fn new(seconds: f64) -> Self {
        Self {
            seconds,
            spoken: Mutex::new(Vec::new()),
            stop_main: Notify::new(),
            stop_preview: Notify::new(),
            stop_voice: Notify::new(),
        }
    }

    fn signal(&self, lane: Lane) -> &Notify {
        match lane {
            Lane::Main => &self.stop_main,
            Lane::Preview => &self.stop_preview,
            Lane::Voice => &self.stop_voice,
        }
    }

    fn spoken(&self) -> Vec<(Instant, Lane, String)> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for RecordingSpeech {
    async fn speak(&self, lane: Lane, text: &str, _voice: &Voice) -> Result<()> {
        self.spoken
            .lock()
            .unwrap()
            .push((Instant::now(), lane, text.to_string()));
        tokio::select! {
            _ = sleep(Duration::from_secs_f64(self.seconds)) => {}
            _ = self.signal(lane).notified() => {}
        }
        Ok(())
    }

    fn stop(&self, lane: Lane) {
        self.signal(lane).notify_waiters();
    }
}

struct FakeProvider {
    quota_exceeded: bool,
}

#[async_trait]
impl VoiceProvider for FakeProvider {
    async fn generate(&self, _text: &str, _voice: &Voice) -> Result<Vec<u8>> {
        if self.quota_exceeded {
            Err(Error::QuotaExceeded("character limit reached".into()))
        } else {
            Ok(b"clip-bytes".to_vec())
        }
    }
}

struct Harness {
    engine: Arc<PlaybackEngine>,
    state: Arc<SharedState>,
    output: Arc<RecordingOutput>,
    speech: Arc<RecordingSpeech>,
    events: broadcast::Receiver<DugoutEvent>,
}

fn test_settings() -> RuntimeSettings {
    RuntimeSettings {
        progress_interval_ms: 1000,
        fade_step_ms: 100,
        speech_words_per_minute: 150,
        ..RuntimeSettings::default()
    }
}

fn harness(
    store: DataStore,
    resolver: FakeResolver,
    provider: Option<Arc<dyn VoiceProvider>>,
) -> Harness {
    let bus = EventBus::new(4096);
    let events = bus.subscribe();
    let state = Arc::new(SharedState::new(store, test_settings(), bus.clone()));
    let output = Arc::new(RecordingOutput::default());
    let speech = Arc::new(RecordingSpeech::new(2.0));
    let engine = PlaybackEngine::new(
        state.clone(),
        Arc::new(resolver),
        output.clone(),
        speech.clone(),
        VoiceAdapter::new(provider, None, bus),
    );
    Harness {
        engine,
        state,
        output,
        speech,
        events,
    }
}

fn store_with_team() -> (DataStore, Uuid) {
    let mut store = DataStore::new();
    let team = store.create_event(TeamEvent::new("Tigers")).unwrap();
    (store, team.id)
}

fn add_song_button(store: &mut DataStore, name: &str, song: SongRef, fade: Option<f64>) -> Uuid {
    let button = SoundButton {
        fade_out_enabled: fade.is_some(),
        fade_out_duration: fade.unwrap_or(3.0),
        ..SoundButton::new(name, Some(song))
    };
    store.create_button(button).unwrap().id
}

fn local(track: &str) -> SongRef {
    SongRef::new(MusicSource::Local, track)
}

fn drain(rx: &mut broadcast::Receiver<DugoutEvent>) -> Vec<DugoutEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn state_changes(events: &[DugoutEvent], kind: TransportKind) -> Vec<TransportState> {
    events
        .iter()
        .filter_map(|event| match event {
            DugoutEvent::TransportStateChanged {
                transport,
                new_state,
                ..
            } if *transport == kind => Some(*new_state),
            _ => None,
        })
        .collect()
}

fn assert_at(actual: Instant, start: Instant, expected_seconds: f64) {
    let seconds = actual.duration_since(start).as_secs_f64();
    assert!(
        (seconds - expected_seconds).abs() < 0.01,
        "expected t={expected_seconds}s, got t={seconds}s"
    );
}

// ============================================================================
// Main transport
// ============================================================================

#[tokio::test(start_paused = true)]
async fn main_transport_keeps_only_the_latest_request() {
    let (mut store, _) = store_with_team();
    let slow = add_song_button(&mut store, "Slow", local("slow"), None);
    let fast = add_song_button(&mut store, "Fast", local("fast"), None);
    let resolver = FakeResolver::default()
        .with("slow", 5000, Some(120.0))
        .with("fast", 1000, Some(120.0));
    let h = harness(store, resolver, None);

    let first = h.engine.play_button(slow).await.unwrap();
    sleep(Duration::from_millis(100)).await;
    let second = h.engine.play_button(fast).await.unwrap();
    assert!(second > first);

    sleep(Duration::from_secs(10)).await;

    let status = h.engine.status(TransportKind::Main);
    assert_eq!(status.state, TransportState::Playing);
    assert_eq!(status.button_id, Some(fast));
    assert_eq!(status.token, second);
    assert_eq!(h.output.starts(Lane::Main), vec![("fast".to_string(), 0.0)]);
}

#[tokio::test(start_paused = true)]
async fn stop_during_loading_keeps_transport_idle() {
    let (mut store, _) = store_with_team();
    let button = add_song_button(&mut store, "Anthem", local("anthem"), None);
    let mut h = harness(store, FakeResolver::default().with("anthem", 5000, Some(90.0)), None);

    h.engine.play_button(button).await.unwrap();
    sleep(Duration::from_secs(1)).await;
    assert_eq!(h.engine.status(TransportKind::Main).state, TransportState::Loading);

    h.engine.stop();
    sleep(Duration::from_secs(10)).await;

    assert_eq!(h.engine.status(TransportKind::Main).state, TransportState::Idle);
    assert!(h.output.starts(Lane::Main).is_empty());
    let events = drain(&mut h.events);
    assert_eq!(
        state_changes(&events, TransportKind::Main),
        vec![TransportState::Loading, TransportState::Idle]
    );
    assert!(!events
        .iter()
        .any(|e| matches!(e, DugoutEvent::PlaybackFailed { .. })));
}

#[tokio::test(start_paused = true)]
async fn fade_out_passes_through_stopping_to_idle_at_track_end() {
    let (mut store, _) = store_with_team();
    let button = add_song_button(&mut store, "Organ", local("organ"), Some(2.0));
    let mut h = harness(store, FakeResolver::default().with("organ", 0, Some(10.0)), None);

    h.engine.play_button(button).await.unwrap();
    sleep(Duration::from_millis(8500)).await;
    let fading = h.engine.status(TransportKind::Main);
    assert_eq!(fading.state, TransportState::Stopping);
    assert!(fading.level < 1.0 && fading.level > 0.0);

    sleep(Duration::from_secs(2)).await;
    assert_eq!(h.engine.status(TransportKind::Main).state, TransportState::Idle);

    let levels = h.output.levels(Lane::Main);
    assert_eq!(levels.len(), 20);
    assert!(levels.windows(2).all(|w| w[1] <= w[0]));
    assert_eq!(*levels.last().unwrap(), 0.0);

    let events = drain(&mut h.events);
    assert_eq!(
        state_changes(&events, TransportKind::Main),
        vec![
            TransportState::Loading,
            TransportState::Playing,
            TransportState::Stopping,
            TransportState::Idle
        ]
    );
    assert!(events
        .iter()
        .any(|e| matches!(e, DugoutEvent::PlaybackProgress { .. })));
}

#[tokio::test(start_paused = true)]
async fn stop_during_fade_abandons_the_ramp() {
    let (mut store, _) = store_with_team();
    let button = add_song_button(&mut store, "Organ", local("organ"), Some(4.0));
    let h = harness(store, FakeResolver::default().with("organ", 0, Some(10.0)), None);

    h.engine.play_button(button).await.unwrap();
    sleep(Duration::from_secs(7)).await;
    h.engine.stop();
    let levels_at_stop = h.output.levels(Lane::Main).len();

    sleep(Duration::from_secs(5)).await;
    assert_eq!(h.engine.status(TransportKind::Main).state, TransportState::Idle);
    assert_eq!(h.output.levels(Lane::Main).len(), levels_at_stop);
}

#[tokio::test(start_paused = true)]
async fn missing_track_fails_to_idle_with_not_found() {
    let (mut store, _) = store_with_team();
    let button = add_song_button(&mut store, "Ghost", local("ghost"), None);
    let mut h = harness(store, FakeResolver::default(), None);

    h.engine.play_button(button).await.unwrap();
    sleep(Duration::from_millis(10)).await;

    assert_eq!(h.engine.status(TransportKind::Main).state, TransportState::Idle);
    let events = drain(&mut h.events);
    assert_eq!(
        state_changes(&events, TransportKind::Main),
        vec![TransportState::Loading, TransportState::Idle]
    );
    assert!(events.iter().any(|e| matches!(
        e,
        DugoutEvent::PlaybackFailed {
            kind: FailureKind::NotFound,
            transport: TransportKind::Main,
            ..
        }
    )));
}

#[tokio::test(start_paused = true)]
async fn unknown_button_is_rejected_up_front() {
    let (store, _) = store_with_team();
    let h = harness(store, FakeResolver::default(), None);

    let err = h.engine.play_button(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(h.engine.status(TransportKind::Main).token, 0);
}

#[tokio::test(start_paused = true)]
async fn start_offset_is_clamped_to_duration() {
    let (mut store, _) = store_with_team();
    let button = add_song_button(&mut store, "Late", local("short").with_offset(250.0), None);
    let h = harness(store, FakeResolver::default().with("short", 0, Some(100.0)), None);

    h.engine.play_button(button).await.unwrap();
    sleep(Duration::from_millis(10)).await;

    assert_eq!(h.output.starts(Lane::Main), vec![("short".to_string(), 100.0)]);
    assert_eq!(h.engine.status(TransportKind::Main).state, TransportState::Idle);
}

#[tokio::test(start_paused = true)]
async fn unknown_duration_plays_until_stopped_without_progress() {
    let (mut store, _) = store_with_team();
    let button = add_song_button(&mut store, "Stream", local("stream"), Some(3.0));
    let mut h = harness(store, FakeResolver::default().with("stream", 0, None), None);

    h.engine.play_button(button).await.unwrap();
    sleep(Duration::from_secs(600)).await;

    let status = h.engine.status(TransportKind::Main);
    assert_eq!(status.state, TransportState::Playing);
    assert!(!status.progress_enabled);
    assert!(h.output.levels(Lane::Main).is_empty());
    assert!(!drain(&mut h.events)
        .iter()
        .any(|e| matches!(e, DugoutEvent::PlaybackProgress { .. })));

    h.engine.stop();
    assert_eq!(h.engine.status(TransportKind::Main).state, TransportState::Idle);
}

// ============================================================================
// Announcements
// ============================================================================

fn store_with_player(voice: Option<Voice>, walk_up: Option<SongRef>) -> (DataStore, Uuid) {
    let (mut store, team) = store_with_team();
    if let Some(voice) = voice {
        let voice = store.add_voice(voice).unwrap();
        store.assign_voice_to_team(Some(voice.id), team).unwrap();
    }
    let player = Player {
        walk_up_song: walk_up,
        ..Player::new("Ruth", "3", team)
    };
    let (player, _) = store.create_player(player, None).unwrap();
    (store, player.id)
}

#[tokio::test(start_paused = true)]
async fn announcement_runs_delays_speech_then_walk_up() {
    let voice = Voice {
        pre_delay_seconds: 1.0,
        post_delay_seconds: 0.5,
        ..Voice::new("PA", VoiceKind::System, "en-US")
    };
    let (store, player) = store_with_player(Some(voice), Some(local("walkup")));
    let mut h = harness(store, FakeResolver::default().with("walkup", 0, Some(30.0)), None);

    let start = Instant::now();
    h.engine.announce(player).await.unwrap();
    sleep(Duration::from_secs(5)).await;

    let spoken = h.speech.spoken();
    assert_eq!(spoken.len(), 1);
    assert_eq!(spoken[0].1, Lane::Main);
    assert_eq!(spoken[0].2, "Now batting, number 3, Ruth");
    assert_at(spoken[0].0, start, 1.0);

    let walk_up_at = h.output.first_start_at("walkup").expect("walk-up started");
    assert_at(walk_up_at, start, 3.5);

    let events = drain(&mut h.events);
    assert_eq!(
        state_changes(&events, TransportKind::Main),
        vec![
            TransportState::Loading,
            TransportState::Playing,
            TransportState::Loading,
            TransportState::Playing
        ]
    );
    assert_eq!(h.engine.status(TransportKind::Main).state, TransportState::Playing);
}

#[tokio::test(start_paused = true)]
async fn stop_during_announcement_tears_down_the_sequence() {
    let (store, player) = store_with_player(None, Some(local("walkup")));
    let h = harness(store, FakeResolver::default().with("walkup", 0, Some(30.0)), None);

    h.engine.announce(player).await.unwrap();
    sleep(Duration::from_secs(1)).await;
    h.engine.stop();
    sleep(Duration::from_secs(10)).await;

    assert_eq!(h.engine.status(TransportKind::Main).state, TransportState::Idle);
    assert!(h.output.first_start_at("walkup").is_none());
}

#[tokio::test(start_paused = true)]
async fn announcement_button_plays_its_player_sequence() {
    let (store, player) = store_with_player(None, None);
    let button = store.player(player).unwrap().announcement_sound_id.unwrap();
    let h = harness(store, FakeResolver::default(), None);

    h.engine.play_button(button).await.unwrap();
    sleep(Duration::from_millis(10)).await;
    assert_eq!(h.engine.status(TransportKind::Main).button_id, Some(button));
    assert_eq!(h.engine.status(TransportKind::Main).title.as_deref(), Some("#3 Ruth"));

    sleep(Duration::from_secs(3)).await;
    assert_eq!(h.speech.spoken().len(), 1);
    assert_eq!(h.engine.status(TransportKind::Main).state, TransportState::Idle);
}

#[tokio::test(start_paused = true)]
async fn quota_exceeded_falls_back_to_system_speech() {
    let voice = Voice::new("Stadium", VoiceKind::AiGenerated, "abc123");
    let (store, player) = store_with_player(Some(voice), None);
    let provider: Arc<dyn VoiceProvider> = Arc::new(FakeProvider {
        quota_exceeded: true,
    });
    let mut h = harness(store, FakeResolver::default(), Some(provider));

    h.engine.announce(player).await.unwrap();
    sleep(Duration::from_secs(5)).await;

    assert_eq!(h.speech.spoken().len(), 1);
    assert_eq!(h.engine.status(TransportKind::Main).state, TransportState::Idle);
    let events = drain(&mut h.events);
    assert!(events
        .iter()
        .any(|e| matches!(e, DugoutEvent::VoiceFallback { .. })));
    assert!(!events
        .iter()
        .any(|e| matches!(e, DugoutEvent::PlaybackFailed { .. })));
}

#[tokio::test(start_paused = true)]
async fn ai_clip_plays_on_main_for_its_estimated_length() {
    let voice = Voice::new("Stadium", VoiceKind::AiGenerated, "abc123");
    let (store, player) = store_with_player(Some(voice), None);
    let provider: Arc<dyn VoiceProvider> = Arc::new(FakeProvider {
        quota_exceeded: false,
    });
    let h = harness(store, FakeResolver::default(), Some(provider));

    let start = Instant::now();
    h.engine.announce(player).await.unwrap();
    sleep(Duration::from_secs(5)).await;

    assert!(h.speech.spoken().is_empty());
    assert_eq!(
        h.output.starts(Lane::Main),
        vec![("<clip 10 bytes>".to_string(), 0.0)]
    );
    // Five words at 150 wpm
    let stopped_at = h
        .output
        .calls()
        .into_iter()
        .filter(|(_, call)| *call == Call::Stop { lane: Lane::Main })
        .map(|(at, _)| at)
        .last()
        .unwrap();
    assert_at(stopped_at, start, 2.0);
    assert_eq!(h.engine.status(TransportKind::Main).state, TransportState::Idle);
}

// ============================================================================
// Preview transport
// ============================================================================

#[tokio::test(start_paused = true)]
async fn preview_seeks_coalesce_to_the_latest() {
    let (store, _) = store_with_team();
    let h = harness(store, FakeResolver::default().with("demo", 0, Some(60.0)), None);

    h.engine.preview_play(local("demo")).await;
    sleep(Duration::from_millis(100)).await;

    assert!(h.engine.preview_seek(10.0));
    assert!(h.engine.preview_seek(20.0));
    assert!(h.engine.preview_seek(30.0));
    sleep(Duration::from_millis(100)).await;

    assert_eq!(
        h.output.starts(Lane::Preview),
        vec![("demo".to_string(), 0.0), ("demo".to_string(), 30.0)]
    );
    let status = h.engine.status(TransportKind::Preview);
    assert_eq!(status.state, TransportState::Playing);
    assert!(status.elapsed_seconds >= 30.0);
}

#[tokio::test(start_paused = true)]
async fn seek_during_loading_becomes_the_start_offset() {
    let (store, _) = store_with_team();
    let h = harness(store, FakeResolver::default().with("demo", 1000, Some(60.0)), None);

    h.engine.preview_play(local("demo").with_offset(5.0)).await;
    sleep(Duration::from_millis(100)).await;
    assert!(h.engine.preview_seek(42.0));
    sleep(Duration::from_secs(2)).await;

    assert_eq!(h.output.starts(Lane::Preview), vec![("demo".to_string(), 42.0)]);
}

#[tokio::test(start_paused = true)]
async fn seek_while_idle_is_refused() {
    let (store, _) = store_with_team();
    let h = harness(store, FakeResolver::default(), None);
    assert!(!h.engine.preview_seek(12.0));
}

#[tokio::test(start_paused = true)]
async fn main_and_preview_are_independent_by_default() {
    let (mut store, _) = store_with_team();
    let button = add_song_button(&mut store, "Anthem", local("anthem"), None);
    let resolver = FakeResolver::default()
        .with("anthem", 0, Some(90.0))
        .with("demo", 0, Some(60.0));
    let h = harness(store, resolver, None);

    h.engine.preview_play(local("demo")).await;
    h.engine.play_button(button).await.unwrap();
    sleep(Duration::from_secs(1)).await;
    assert_eq!(h.engine.status(TransportKind::Preview).state, TransportState::Playing);

    h.engine.stop();
    assert_eq!(h.engine.status(TransportKind::Preview).state, TransportState::Playing);
}

#[tokio::test(start_paused = true)]
async fn main_play_stops_preview_when_configured() {
    let (mut store, _) = store_with_team();
    let button = add_song_button(&mut store, "Anthem", local("anthem"), None);
    let resolver = FakeResolver::default()
        .with("anthem", 0, Some(90.0))
        .with("demo", 0, Some(60.0));
    let h = harness(store, resolver, None);
    h.state
        .set_settings(RuntimeSettings {
            stop_preview_on_main_play: true,
            ..test_settings()
        })
        .await;

    h.engine.preview_play(local("demo")).await;
    sleep(Duration::from_secs(1)).await;
    assert_eq!(h.engine.status(TransportKind::Preview).state, TransportState::Playing);

    h.engine.play_button(button).await.unwrap();
    sleep(Duration::from_secs(1)).await;
    assert_eq!(h.engine.status(TransportKind::Main).state, TransportState::Playing);
    assert_eq!(h.engine.status(TransportKind::Preview).state, TransportState::Idle);
}

// ============================================================================
// Voice preview
// ============================================================================

#[tokio::test(start_paused = true)]
async fn voice_preview_stays_off_both_transports() {
    let (store, _) = store_with_team();
    let mut h = harness(store, FakeResolver::default(), None);

    h.engine
        .preview_voice("Testing one two".to_string(), Voice::neutral())
        .await;
    sleep(Duration::from_millis(500)).await;

    let spoken = h.speech.spoken();
    assert_eq!(spoken.len(), 1);
    assert_eq!(spoken[0].1, Lane::Voice);
    assert!(state_changes(&drain(&mut h.events), TransportKind::Main).is_empty());

    h.engine.stop_speaking();
    assert!(h
        .output
        .calls()
        .iter()
        .any(|(_, call)| *call == Call::Stop { lane: Lane::Voice }));
    assert_eq!(h.engine.status(TransportKind::Main).state, TransportState::Idle);
    assert_eq!(h.engine.status(TransportKind::Preview).state, TransportState::Idle);
}
