// FFmpeg helpers
// Locates the ffmpeg binary (sidecar-managed download or PATH) and drives it
// through std::process, piping raw PCM or encoded clip bytes over stdout.

use anyhow::{anyhow, Result};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Sample rate used for decode/probe work. Matches what the local whisper
/// backend expects, so decoded PCM can be fed to it directly.
pub const DECODE_SAMPLE_RATE: u32 = 16_000;

/// Find a usable ffmpeg binary: the sidecar-managed download first, then PATH
pub fn find_ffmpeg_path() -> Option<PathBuf> {
    let sidecar = ffmpeg_sidecar::paths::ffmpeg_path();
    if sidecar.is_file() {
        return Some(sidecar);
    }
    which::which("ffmpeg").ok()
}

/// Decode an audio file to raw f32 samples (16kHz mono)
pub fn decode_audio_file(audio_path: &Path) -> Result<(Vec<f32>, u32)> {
    if !audio_path.exists() {
        return Err(anyhow!("Audio file does not exist: {}", audio_path.display()));
    }

    let ffmpeg_path = find_ffmpeg_path()
        .ok_or_else(|| anyhow!("FFmpeg not found. Please install FFmpeg."))?;

    log::debug!("Decoding {} with FFmpeg at {:?}", audio_path.display(), ffmpeg_path);

    let mut command = Command::new(&ffmpeg_path);
    command
        .arg("-i")
        .arg(audio_path)
        .arg("-f")
        .arg("f32le")
        .arg("-acodec")
        .arg("pcm_f32le")
        .arg("-ar")
        .arg(DECODE_SAMPLE_RATE.to_string())
        .arg("-ac")
        .arg("1")
        .arg("-")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn()
        .map_err(|e| anyhow!("Failed to spawn FFmpeg process: {}", e))?;

    let mut stdout = child.stdout.take()
        .ok_or_else(|| anyhow!("Failed to capture FFmpeg stdout"))?;

    let mut raw_bytes = Vec::new();
    stdout.read_to_end(&mut raw_bytes)?;

    let output = child.wait_with_output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("FFmpeg failed to decode audio: {}", stderr));
    }

    if raw_bytes.len() % 4 != 0 {
        return Err(anyhow!(
            "Invalid audio data length: {} bytes (not divisible by 4)",
            raw_bytes.len()
        ));
    }

    let samples: Vec<f32> = raw_bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    log::debug!(
        "Decoded {} samples ({:.2}s) from {}",
        samples.len(),
        samples.len() as f64 / DECODE_SAMPLE_RATE as f64,
        audio_path.display()
    );

    Ok((samples, DECODE_SAMPLE_RATE))
}

/// Full-track duration in seconds, by decoding and counting samples
pub fn probe_duration(audio_path: &Path) -> Result<f64> {
    let (samples, sample_rate) = decode_audio_file(audio_path)?;
    Ok(samples.len() as f64 / sample_rate as f64)
}

/// Duration in seconds of an in-memory encoded clip
pub fn probe_duration_of_bytes(bytes: &[u8]) -> Result<f64> {
    let ffmpeg_path = find_ffmpeg_path()
        .ok_or_else(|| anyhow!("FFmpeg not found. Please install FFmpeg."))?;

    let mut child = Command::new(&ffmpeg_path)
        .arg("-i")
        .arg("-")
        .arg("-f")
        .arg("f32le")
        .arg("-acodec")
        .arg("pcm_f32le")
        .arg("-ar")
        .arg(DECODE_SAMPLE_RATE.to_string())
        .arg("-ac")
        .arg("1")
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| anyhow!("Failed to spawn FFmpeg process: {}", e))?;

    // Feed stdin from a separate thread so a full pipe cannot deadlock
    let mut stdin = child.stdin.take()
        .ok_or_else(|| anyhow!("Failed to capture FFmpeg stdin"))?;
    let input = bytes.to_vec();
    let writer = std::thread::spawn(move || {
        let _ = stdin.write_all(&input);
    });

    let mut stdout = child.stdout.take()
        .ok_or_else(|| anyhow!("Failed to capture FFmpeg stdout"))?;
    let mut raw_bytes = Vec::new();
    stdout.read_to_end(&mut raw_bytes)?;

    let output = child.wait_with_output()?;
    let _ = writer.join();

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("FFmpeg failed to decode clip bytes: {}", stderr));
    }

    let samples = raw_bytes.len() / 4;
    Ok(samples as f64 / DECODE_SAMPLE_RATE as f64)
}

/// Re-encode the [start,end) window of a source file into the given lossy
/// target, returning the encoded bytes
pub fn extract_window(
    audio_path: &Path,
    start_seconds: f64,
    end_seconds: f64,
    format: &str,
    bitrate: &str,
) -> Result<Vec<u8>> {
    let ffmpeg_path = find_ffmpeg_path()
        .ok_or_else(|| anyhow!("FFmpeg not found. Please install FFmpeg."))?;

    let mut command = Command::new(&ffmpeg_path);
    command
        .arg("-ss")
        .arg(format!("{:.3}", start_seconds))
        .arg("-to")
        .arg(format!("{:.3}", end_seconds))
        .arg("-i")
        .arg(audio_path)
        .arg("-f")
        .arg(format)
        .arg("-b:a")
        .arg(bitrate)
        .arg("-")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    log::debug!("FFmpeg extract command: {:?}", command);

    let mut child = command.spawn()
        .map_err(|e| anyhow!("Failed to spawn FFmpeg process: {}", e))?;

    let mut stdout = child.stdout.take()
        .ok_or_else(|| anyhow!("Failed to capture FFmpeg stdout"))?;

    let mut clip_bytes = Vec::new();
    stdout.read_to_end(&mut clip_bytes)?;

    let output = child.wait_with_output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("FFmpeg failed to extract clip: {}", stderr));
    }

    if clip_bytes.is_empty() {
        return Err(anyhow!("FFmpeg produced an empty clip"));
    }

    Ok(clip_bytes)
}
