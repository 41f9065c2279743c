/// Sound engine: procedural sound effects via rodio.
///
/// Every effect is synthesized into an in-memory WAV buffer at init time;
/// nothing is loaded from disk. Playback is fire-and-forget through a
/// detached Sink.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_till: Arc<Vec<u8>>,
        sfx_step: Arc<Vec<u8>>,
        sfx_bump: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        /// `None` when no output device can be opened.
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::info!("no audio output, sound disabled: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_till: Arc::new(encode_wav(&gen_till())),
                sfx_step: Arc::new(encode_wav(&gen_tone(660.0, 0.03, 0.12))),
                sfx_bump: Arc::new(encode_wav(&gen_tone(110.0, 0.06, 0.3))),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            let sink = match Sink::try_new(&self.handle) {
                Ok(s) => s,
                Err(e) => {
                    log::debug!("sound sink unavailable: {e}");
                    return;
                }
            };
            if let Ok(src) = rodio::Decoder::new(Cursor::new(buf.as_ref().clone())) {
                sink.append(src);
                sink.detach();
            }
        }

        pub fn play_till(&self) { self.play(&self.sfx_till); }
        pub fn play_step(&self) { self.play(&self.sfx_step); }
        pub fn play_bump(&self) { self.play(&self.sfx_bump); }
    }

    // ── Waveform generators: mono f32 samples in [-1, 1] ──

    /// Sine with a linear fade-out.
    pub(super) fn gen_tone(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - i as f32 / n as f32;
                (t * freq * TAU).sin() * env * volume
            })
            .collect()
    }

    /// Hoe in the dirt: noise over a falling tone.
    pub(super) fn gen_till() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.1) as usize;
        let mut rng: u32 = 0x5eed;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let freq = 180.0 + (1.0 - p) * 220.0;
                let t = i as f32 / SAMPLE_RATE as f32;
                rng = rng.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                let noise = (rng >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0;
                let env = (1.0 - p).powf(1.5);
                ((t * freq * TAU).sin() * 0.35 + noise * 0.65) * env * 0.3
            })
            .collect()
    }

    // ── WAV encoder: 16-bit PCM mono ──

    pub(super) fn encode_wav(samples: &[f32]) -> Vec<u8> {
        const CHANNELS: u16 = 1;
        const BITS: u16 = 16;
        let block_align = CHANNELS * BITS / 8;
        let byte_rate = SAMPLE_RATE * block_align as u32;
        let data_len = samples.len() as u32 * block_align as u32;

        let mut buf = Vec::with_capacity(44 + data_len as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_len).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&CHANNELS.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&BITS.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_len.to_le_bytes());
        for &s in samples {
            let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf
    }
}

// ── Public API: compiles to no-ops when the sound feature is off ──

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_till(&self) {}
    pub fn play_step(&self) {}
    pub fn play_bump(&self) {}
}
