//! Test doubles shared by unit tests.

use crate::domain::tts::ChunkJob;
use crate::infrastructure::repositories::{SynthesisFailure, TtsRepository};
use async_trait::async_trait;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::collections::HashMap;
use std::ffi::OsString;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const SAMPLE_RATE: u32 = 24000;

/// Write a mono 16-bit sine tone of the given length
pub fn write_tone(path: &Path, secs: f64) {
    write_tone_with(path, SAMPLE_RATE, 1, secs);
}

/// Write a 16-bit sine tone with any rate and channel count
pub fn write_tone_with(path: &Path, sample_rate: u32, channels: u16, secs: f64) {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    let frames = (sample_rate as f64 * secs).round() as u32;
    for n in 0..frames {
        let t = n as f32 / sample_rate as f32;
        let sample = (t * 220.0 * 2.0 * std::f32::consts::PI).sin() * 0.4;
        for _ in 0..channels {
            writer.write_sample((sample * i16::MAX as f32) as i16).unwrap();
        }
    }
    writer.finalize().unwrap();
}

/// Writes a WAV tone per job, optionally failing the first N calls for a chunk
pub struct FakeSynthesizer {
    secs: f64,
    failures: Mutex<HashMap<usize, u32>>,
    calls: Mutex<Vec<(usize, PathBuf)>>,
}

impl FakeSynthesizer {
    pub fn reliable(secs: f64) -> Self {
        Self {
            secs,
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(self, chunk_index: usize, times: u32) -> Self {
        self.failures.lock().unwrap().insert(chunk_index, times);
        self
    }

    /// Every call so far as (chunk index, output path)
    pub fn calls(&self) -> Vec<(usize, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn attempts_for(&self, chunk_index: usize) -> usize {
        self.calls()
            .iter()
            .filter(|(index, _)| *index == chunk_index)
            .count()
    }
}

#[async_trait]
impl TtsRepository for FakeSynthesizer {
    async fn synthesize(&self, job: &ChunkJob) -> Result<(), SynthesisFailure> {
        self.calls
            .lock()
            .unwrap()
            .push((job.chunk.index, job.output_path.clone()));

        {
            let mut failures = self.failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(&job.chunk.index) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(SynthesisFailure::NonZeroExit {
                        status: Some(1),
                        stderr: "simulated failure".to_string(),
                    });
                }
            }
        }

        write_tone(&job.output_path, self.secs);
        Ok(())
    }
}

/// Replaces PATH for the lifetime of the guard. Tests holding one must be `#[serial]`.
pub struct PathGuard {
    original: Option<OsString>,
}

impl PathGuard {
    pub fn only(dir: &Path) -> Self {
        let original = std::env::var_os("PATH");
        std::env::set_var("PATH", dir);
        Self { original }
    }
}

impl Drop for PathGuard {
    fn drop(&mut self) {
        match self.original.take() {
            Some(path) => std::env::set_var("PATH", path),
            None => std::env::remove_var("PATH"),
        }
    }
}

#[cfg(unix)]
/// Install an executable `/bin/sh` script called `name` in `dir`
pub fn install_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
/// Fake encoder: records its argv in `<dir>/<name>.args` and writes `bytes`
/// to its last argument
pub fn install_fake_encoder(dir: &Path, name: &str, bytes: &str) -> PathBuf {
    let args_file = dir.join(format!("{}.args", name));
    install_script(
        dir,
        name,
        &format!(
            "echo \"$@\" > \"{}\"\nfor last; do :; done\nprintf '%s' '{}' > \"$last\"\n",
            args_file.display(),
            bytes
        ),
    );
    args_file
}
