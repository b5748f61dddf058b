use anyhow::Result;
use async_trait::async_trait;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use xtts_narrator::domain::tts::{
    ChunkJob, ChunkPipeline, LanguageChoice, LanguageCode, NarrationRequest, NarrationService,
    RetryPolicy,
};
use xtts_narrator::infrastructure::audio::AudioAssembler;
use xtts_narrator::infrastructure::repositories::{SynthesisFailure, TtsRepository};


pub const SAMPLE_RATE: u32 = 24000;

/// Write a mono 16-bit tone
pub fn write_tone(path: &Path, secs: f64) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    let frames = (SAMPLE_RATE as f64 * secs).round() as u32;
    for n in 0..frames {
        let t = n as f32 / SAMPLE_RATE as f32;
        let sample = (t * 330.0 * 2.0 * std::f32::consts::PI).sin() * 0.3;
        writer.write_sample((sample * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

pub fn wav_secs(path: &Path) -> Result<f64> {
    let reader = hound::WavReader::open(path)?;
    Ok(reader.duration() as f64 / reader.spec().sample_rate as f64)
}

/// Text of `len` characters made of space-separated words, no punctuation
pub fn unpunctuated_text(len: usize) -> String {
    let words = ["lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing"];
    let mut text = String::with_capacity(len + 16);
    let mut i = 0;
    while text.len() < len {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(words[i % words.len()]);
        i += 1;
    }
    text.truncate(len);
    text.trim_end().to_string()
}

/// Fake synthesizer: writes a fixed-length tone per chunk and records what it
/// was asked, failing chunks on demand
pub struct FakeSynthesizer {
    secs: f64,
    failures: Mutex<HashMap<usize, u32>>,
    jobs: Mutex<Vec<ChunkJob>>,
}

impl FakeSynthesizer {
    pub fn new(secs: f64) -> Self {
        Self {
            secs,
            failures: Mutex::new(HashMap::new()),
            jobs: Mutex::new(Vec::new()),
        }
    }

    /// Fail the first `times` attempts of chunk `index`
    pub fn fail_chunk(self, index: usize, times: u32) -> Self {
        self.failures.lock().unwrap().insert(index, times);
        self
    }

    pub fn jobs(&self) -> Vec<ChunkJob> {
        self.jobs.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.jobs().into_iter().map(|job| job.chunk.text).collect()
    }
}

#[async_trait]
impl TtsRepository for FakeSynthesizer {
    async fn synthesize(&self, job: &ChunkJob) -> Result<(), SynthesisFailure> {
        self.jobs.lock().unwrap().push(job.clone());

        if let Some(remaining) = self.failures.lock().unwrap().get_mut(&job.chunk.index) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(SynthesisFailure::NonZeroExit {
                    status: Some(1),
                    stderr: "CUDA out of memory".to_string(),
                });
            }
        }

        write_tone(&job.output_path, self.secs).map_err(|e| SynthesisFailure::Io(e.to_string()))
    }
}

/// Temp workspace with a voice sample and a narration service over a fake
pub struct TestContext {
    pub dir: TempDir,
    pub voice_sample: PathBuf,
    pub synthesizer: Arc<FakeSynthesizer>,
    pub service: NarrationService,
}

impl TestContext {
    pub fn new(synthesizer: FakeSynthesizer) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let voice_sample = dir.path().join("voice.wav");
        write_tone(&voice_sample, 0.5)?;

        let synthesizer = Arc::new(synthesizer);
        let pipeline = ChunkPipeline::new(
            synthesizer.clone(),
            AudioAssembler::default(),
            RetryPolicy {
                max_attempts: 3,
                backoff: Duration::from_millis(5),
            },
        )
        .with_chunk_extension("wav");

        Ok(Self {
            dir,
            voice_sample,
            synthesizer,
            service: NarrationService::new(pipeline),
        })
    }

    pub fn output(&self) -> PathBuf {
        self.dir.path().join("narration.wav")
    }

    pub fn request(&self, text: &str, max_chars: usize) -> NarrationRequest {
        NarrationRequest {
            text: text.to_string(),
            output: self.output(),
            voice_sample: self.voice_sample.clone(),
            language: LanguageChoice::Fixed(LanguageCode::English),
            speed: 1.0,
            max_chars,
        }
    }
}
