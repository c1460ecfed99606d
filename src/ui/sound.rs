/// Sound engine: procedural chiptune cues for session events via rodio.
///
/// All cues are rendered to in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile with `--no-default-features` or without "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

use std::f32::consts::TAU;

use crate::sim::event::SessionEvent;

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
const SAMPLE_RATE: u32 = 22050;

/// One sound cue per audible session event.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Sfx {
    Step,
    Bump,
    Open,
    Solved,
    TimeUp,
    Won,
}

impl Sfx {
    #[cfg_attr(not(feature = "sound"), allow(dead_code))]
    pub const ALL: [Sfx; 6] = [Sfx::Step, Sfx::Bump, Sfx::Open, Sfx::Solved, Sfx::TimeUp, Sfx::Won];

    pub fn for_event(event: &SessionEvent) -> Option<Sfx> {
        match event {
            SessionEvent::PlayerMoved { .. }  => Some(Sfx::Step),
            SessionEvent::Bumped { .. }       => Some(Sfx::Bump),
            SessionEvent::PuzzleOpened { .. } => Some(Sfx::Open),
            SessionEvent::PuzzleSolved { .. } => Some(Sfx::Solved),
            SessionEvent::TimeUp { .. }       => Some(Sfx::TimeUp),
            SessionEvent::GameWon { .. }      => Some(Sfx::Won),
            _ => None,
        }
    }

    #[cfg_attr(not(feature = "sound"), allow(dead_code))]
    fn samples(self) -> Vec<f32> {
        match self {
            Sfx::Step   => gen_blip(520.0, 0.03, 0.15),
            Sfx::Bump   => gen_thud(),
            Sfx::Open   => gen_notes(&[(392.0, 0.07), (523.0, 0.07), (659.0, 0.12)], 0.25),
            Sfx::Solved => gen_notes(&[(523.0, 0.08), (659.0, 0.08), (784.0, 0.08), (1047.0, 0.2)], 0.3),
            Sfx::TimeUp => gen_notes(&[(440.0, 0.12), (370.0, 0.12), (311.0, 0.12), (261.0, 0.3)], 0.3),
            Sfx::Won    => gen_fanfare(),
        }
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::{make_wav, Sfx};

    /// Pre-rendered WAV buffers for each cue.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        buffers: HashMap<Sfx, Arc<Vec<u8>>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;
            let buffers = Sfx::ALL
                .iter()
                .map(|&sfx| (sfx, Arc::new(make_wav(&sfx.samples()))))
                .collect();
            Some(SoundEngine { _stream: stream, handle, buffers })
        }

        pub fn play(&self, sfx: Sfx) {
            let Some(buf) = self.buffers.get(&sfx) else { return };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Waveform generators: all produce Vec<f32> mono samples
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn sample_count(duration: f32) -> usize {
    (SAMPLE_RATE as f32 * duration) as usize
}

/// Simple sine blip with a linear fade out
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
    let n = sample_count(duration);
    (0..n)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32);
            (t * freq * TAU).sin() * env * volume
        })
        .collect()
}

/// Edge bump: low descending thud
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_thud() -> Vec<f32> {
    let n = sample_count(0.08);
    (0..n)
        .map(|i| {
            let p = i as f32 / n as f32;
            let freq = 180.0 - p * 90.0;
            let t = i as f32 / SAMPLE_RATE as f32;
            (t * freq * TAU).sin() * (1.0 - p).powf(1.5) * 0.3
        })
        .collect()
}

/// Note sequence, sine plus octave for a retro edge
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_notes(notes: &[(f32, f32)], volume: f32) -> Vec<f32> {
    let mut samples = Vec::new();
    for &(freq, dur) in notes {
        let n = sample_count(dur);
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32) * 0.4;
            let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 2.0 * TAU).sin() * 0.3;
            samples.push(wave * env * volume);
        }
    }
    // Final fade
    let fade_len = samples.len() / 4;
    let total = samples.len();
    for (k, s) in samples[total - fade_len..].iter_mut().enumerate() {
        *s *= 1.0 - k as f32 / fade_len as f32;
    }
    samples
}

/// Escape: arpeggio then a held chord
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_fanfare() -> Vec<f32> {
    let mut samples = gen_notes(&[(523.0, 0.1), (659.0, 0.1), (784.0, 0.1)], 0.3);
    let chord = [523.0_f32, 659.0, 784.0, 1047.0];
    let n = sample_count(0.5);
    for i in 0..n {
        let t = i as f32 / SAMPLE_RATE as f32;
        let env = 1.0 - i as f32 / n as f32;
        let wave: f32 = chord.iter().map(|f| (t * f * TAU).sin()).sum::<f32>() / chord.len() as f32;
        samples.push(wave * env * 0.35);
    }
    samples
}

// ════════════════════════════════════════════════════════════
//  WAV encoder: wraps f32 samples into a 16-bit PCM buffer
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn make_wav(samples: &[f32]) -> Vec<u8> {
    let num_channels: u16 = 1;
    let bits_per_sample: u16 = 16;
    let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
    let block_align = num_channels * bits_per_sample / 8;
    let data_size = samples.len() as u32 * 2;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
    buf.extend_from_slice(&num_channels.to_le_bytes());
    buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());

    for &s in samples {
        let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
        buf.extend_from_slice(&val.to_le_bytes());
    }

    buf
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sfx: Sfx) {}
}
