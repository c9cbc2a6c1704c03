/// Procedural sound effects via rodio.
///
/// Every clip is synthesised into an in-memory WAV buffer at start-up and
/// played fire-and-forget. `cues` decides which clip a tick's events call
/// for; it is independent of the audio backend.
///
/// Without the "sound" feature the engine is a stub that plays nothing.

use crate::domain::actor::{ActorId, ActorLabel};
use crate::sim::event::GameEvent;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sfx {
    Shot,
    Step,
    Jump,
    FloorShot,
    FloorBreak,
    Kill,
    PlayerDeath,
    Ambush,
    Depth,
    Record,
}

impl Sfx {
    #[cfg_attr(not(feature = "sound"), allow(dead_code))]
    const ALL: [Sfx; 10] = [
        Sfx::Shot,
        Sfx::Step,
        Sfx::Jump,
        Sfx::FloorShot,
        Sfx::FloorBreak,
        Sfx::Kill,
        Sfx::PlayerDeath,
        Sfx::Ambush,
        Sfx::Depth,
        Sfx::Record,
    ];
}

/// Clips to play for one tick's events, each at most once, in first-seen
/// order. Enemy footsteps stay silent.
pub fn cues(events: &[GameEvent], player: ActorId) -> Vec<Sfx> {
    let mut out = Vec::new();
    for ev in events {
        let sfx = match ev {
            GameEvent::Fired { .. } => Sfx::Shot,
            GameEvent::Stepped { id, .. } if *id == player => Sfx::Step,
            GameEvent::Jumped { .. } => Sfx::Jump,
            GameEvent::FloorShot { .. } => Sfx::FloorShot,
            GameEvent::FloorBroken { .. } | GameEvent::DropKick { .. } => Sfx::FloorBreak,
            GameEvent::ActorKilled { label: ActorLabel::Player, .. } => Sfx::PlayerDeath,
            GameEvent::ActorKilled { .. } => Sfx::Kill,
            GameEvent::AmbushSpawned { .. } => Sfx::Ambush,
            GameEvent::ReachedDepth { .. } => Sfx::Depth,
            GameEvent::NewRecord { .. } => Sfx::Record,
            _ => continue,
        };
        if !out.contains(&sfx) {
            out.push(sfx);
        }
    }
    // A record already celebrates the depth.
    if out.contains(&Sfx::Record) {
        out.retain(|s| *s != Sfx::Depth);
    }
    out
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::Sfx;

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::TAU;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        clips: Vec<(Sfx, Arc<Vec<u8>>)>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output: {e}");
                    return None;
                }
            };
            let clips = Sfx::ALL.iter().map(|&s| (s, Arc::new(make_wav(&synth(s))))).collect();
            Some(SoundEngine { _stream: stream, handle, clips })
        }

        pub fn play(&self, sfx: Sfx) {
            let Some((_, buf)) = self.clips.iter().find(|(s, _)| *s == sfx) else { return };
            let Ok(sink) = Sink::try_new(&self.handle) else { return };
            if let Ok(src) = rodio::Decoder::new(Cursor::new(buf.as_ref().clone())) {
                sink.append(src);
                sink.detach();
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Synthesis
    // ════════════════════════════════════════════════════════════

    /// One sweep from `from` Hz to `to` Hz, mixed with `noise` (0..1) of
    /// white noise under a decaying envelope.
    struct Voice {
        from: f32,
        to: f32,
        secs: f32,
        noise: f32,
        volume: f32,
    }

    fn sweep(v: &Voice, seed: &mut u32, out: &mut Vec<f32>) {
        let n = (SAMPLE_RATE as f32 * v.secs) as usize;
        let mut phase = 0.0f32;
        for i in 0..n {
            let t = i as f32 / n as f32;
            let freq = v.from + (v.to - v.from) * t;
            phase += freq / SAMPLE_RATE as f32;
            let tone = (phase * TAU).sin();
            *seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
            let white = (*seed >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0;
            let env = (1.0 - t).powf(0.7);
            out.push((tone * (1.0 - v.noise) + white * v.noise) * env * v.volume);
        }
    }

    fn voices(voices: &[Voice]) -> Vec<f32> {
        let mut seed = 0x2545_f491;
        let mut out = Vec::new();
        for v in voices {
            sweep(v, &mut seed, &mut out);
        }
        out
    }

    fn synth(sfx: Sfx) -> Vec<f32> {
        let v = |from, to, secs, noise, volume| Voice { from, to, secs, noise, volume };
        match sfx {
            Sfx::Shot => voices(&[v(1400.0, 300.0, 0.07, 0.5, 0.25)]),
            Sfx::Step => voices(&[v(180.0, 120.0, 0.03, 0.3, 0.15)]),
            Sfx::Jump => voices(&[v(500.0, 180.0, 0.14, 0.0, 0.22)]),
            Sfx::FloorShot => voices(&[v(900.0, 200.0, 0.05, 0.7, 0.22)]),
            Sfx::FloorBreak => voices(&[v(260.0, 60.0, 0.2, 0.8, 0.3)]),
            Sfx::Kill => voices(&[v(700.0, 90.0, 0.18, 0.4, 0.28)]),
            Sfx::PlayerDeath => voices(&[
                v(440.0, 430.0, 0.12, 0.0, 0.3),
                v(370.0, 360.0, 0.12, 0.0, 0.3),
                v(311.0, 300.0, 0.12, 0.0, 0.3),
                v(261.0, 200.0, 0.3, 0.0, 0.3),
            ]),
            Sfx::Ambush => voices(&[v(150.0, 150.0, 0.08, 0.2, 0.3), v(110.0, 110.0, 0.12, 0.2, 0.3)]),
            Sfx::Depth => voices(&[v(784.0, 784.0, 0.05, 0.0, 0.18)]),
            Sfx::Record => voices(&[
                v(523.0, 523.0, 0.08, 0.0, 0.25),
                v(659.0, 659.0, 0.08, 0.0, 0.25),
                v(784.0, 784.0, 0.08, 0.0, 0.25),
                v(1047.0, 1047.0, 0.22, 0.0, 0.25),
            ]),
        }
    }

    /// 16-bit mono PCM in a RIFF container.
    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let data_size = samples.len() as u32 * 2;
        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVEfmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&1u16.to_le_bytes()); // mono
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes());
        buf.extend_from_slice(&2u16.to_le_bytes());
        buf.extend_from_slice(&16u16.to_le_bytes());
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            buf.extend_from_slice(&((s.clamp(-1.0, 1.0) * 32767.0) as i16).to_le_bytes());
        }
        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn every_clip_is_a_sized_wav() {
            for s in Sfx::ALL {
                let pcm = synth(s);
                assert!(!pcm.is_empty(), "{s:?}");
                let wav = make_wav(&pcm);
                assert_eq!(&wav[..4], b"RIFF");
                assert_eq!(wav.len(), 44 + pcm.len() * 2);
            }
        }
    }
}

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> {
        Some(SoundEngine)
    }
    pub fn play(&self, _sfx: Sfx) {}
}
