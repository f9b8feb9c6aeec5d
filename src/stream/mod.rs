//! Playback infrastructure
//!
//! - Detect: URL-based container guess
//! - Decoder: collaborator traits and the events they report
//! - Engine: HLS -> TS -> native cascade state machine
//! - Player: VLC/mpv process as the native sink

pub mod decoder;
pub mod detect;
pub mod engine;
pub mod player;

pub use decoder::{
    DecoderError, HlsConfig, HlsDecoder, HlsDecoderFactory, HlsEvent, MediaSink, PlaybackEvent,
    RequestId, SinkError, SinkEvent, StatusObserver, TsConfig, TsDecoder, TsDecoderFactory,
    TsEvent,
};
pub use detect::detect;
pub use engine::{PlayError, PlaybackEngine};
pub use player::{LocalPlayer, PlayerError, PlayerType, StampedEvent};
