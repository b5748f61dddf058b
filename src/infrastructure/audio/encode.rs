use super::clip::AudioClip;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Stdio};

/// Quality of the compressed output
pub const DEFAULT_BITRATE_KBPS: u32 = 192;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Wav,
    Mp3,
}

impl OutputFormat {
    /// Pick the format from the output file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "wav" => Some(OutputFormat::Wav),
            "mp3" => Some(OutputFormat::Mp3),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Wav => "wav",
            OutputFormat::Mp3 => "mp3",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error(transparent)]
    Wav(#[from] hound::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("no MP3 encoder found, install lame or ffmpeg")]
    NoEncoder,
    #[error("{encoder} failed: {stderr}")]
    EncoderFailed { encoder: &'static str, stderr: String },
}

/// Write the clip as 16-bit PCM WAV
pub fn write_wav(path: &Path, clip: &AudioClip) -> Result<(), EncodeError> {
    let spec = WavSpec {
        channels: clip.channels,
        sample_rate: clip.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for sample in &clip.samples {
        let clamped = sample.clamp(-1.0, 1.0);
        writer.write_sample((clamped * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Encode a WAV file to MP3 at a constant bitrate, with lame or ffmpeg
pub fn encode_mp3(wav_path: &Path, mp3_path: &Path, bitrate_kbps: u32) -> Result<(), EncodeError> {
    let bitrate = bitrate_kbps.to_string();

    let mut lame = Command::new("lame");
    lame.arg("--quiet")
        .arg("-b")
        .arg(&bitrate)
        .arg(wav_path)
        .arg(mp3_path);

    let mut ffmpeg = Command::new("ffmpeg");
    ffmpeg
        .arg("-y")
        .arg("-loglevel")
        .arg("error")
        .arg("-i")
        .arg(wav_path)
        .arg("-codec:a")
        .arg("libmp3lame")
        .arg("-b:a")
        .arg(format!("{}k", bitrate))
        .arg(mp3_path);

    for (encoder, mut cmd) in [("lame", lame), ("ffmpeg", ffmpeg)] {
        let output = match cmd.stdin(Stdio::null()).output() {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(encoder, "Encoder not installed, trying next");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if !output.status.success() {
            return Err(EncodeError::EncoderFailed {
                encoder,
                stderr: String::from_utf8_lossy(&output.stderr)
                    .chars()
                    .take(200)
                    .collect(),
            });
        }

        tracing::debug!(encoder, bitrate_kbps, "MP3 encoded");
        return Ok(());
    }

    Err(EncodeError::NoEncoder)
}
