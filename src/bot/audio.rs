//! Raw PCM handling for synthesized speech.
//!
//! Gemini TTS delivers audio as 16-bit little-endian PCM at 24 kHz, mono.
//! Playback needs either normalized float frames or a WAV container.

/// Sample rate of synthesized speech.
pub const SAMPLE_RATE: u32 = 24_000;
/// Channel count of synthesized speech.
pub const CHANNELS: u16 = 1;

/// De-interleave 16-bit little-endian PCM into per-channel float samples.
///
/// Every two bytes form one signed sample, normalized into [-1, 1] by
/// dividing by 32768. The input is channel-interleaved; the output holds one
/// buffer per channel with `frame_count = samples / channels` entries.
pub fn decode_pcm16(data: &[u8], channels: usize) -> Result<Vec<Vec<f32>>, String> {
    if channels == 0 {
        return Err("PCM channel count must be at least 1".to_string());
    }
    if data.len() % 2 != 0 {
        return Err(format!("PCM byte length {} is not sample-aligned", data.len()));
    }

    let samples: Vec<f32> = data
        .chunks_exact(2)
        .map(|chunk| {
            let sample = i16::from_le_bytes([chunk[0], chunk[1]]);
            sample as f32 / 32768.0
        })
        .collect();

    let frame_count = samples.len() / channels;
    let mut buffers = vec![Vec::with_capacity(frame_count); channels];
    for frame in 0..frame_count {
        for (channel, buffer) in buffers.iter_mut().enumerate() {
            buffer.push(samples[frame * channels + channel]);
        }
    }

    Ok(buffers)
}

/// Wrap raw 16-bit PCM in a minimal WAV container so ordinary players can
/// open it.
pub fn pcm_to_wav(pcm: &[u8], sample_rate: u32, channels: u16) -> Vec<u8> {
    let data_len = pcm.len() as u32;
    let byte_rate = sample_rate * channels as u32 * 2;
    let block_align = channels * 2;

    let mut wav = Vec::with_capacity(44 + pcm.len());
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    wav.extend_from_slice(&channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.extend_from_slice(pcm);
    wav
}
