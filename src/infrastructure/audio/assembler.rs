use super::clip::AudioClip;
use super::convert::{conform, ConvertError};
use super::decode::{decode_file, DecodeError};
use super::encode::{encode_mp3, write_wav, EncodeError, OutputFormat, DEFAULT_BITRATE_KBPS};
use crate::domain::tts::MergedAudio;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Silence inserted between consecutive chunks
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(200);

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("no audio files to merge")]
    NoInput,
    #[error("none of the {0} audio files could be loaded")]
    NoValidAudio(usize),
    #[error("unsupported output format for '{}' (use .mp3 or .wav)", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("failed to convert audio part: {0}")]
    Convert(#[from] ConvertError),
    #[error("failed to export merged audio: {0}")]
    Encode(#[from] EncodeError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Joins per-chunk audio files, in order, into one output file
#[derive(Debug, Clone)]
pub struct AudioAssembler {
    pause: Duration,
    bitrate_kbps: u32,
}

impl Default for AudioAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_PAUSE, DEFAULT_BITRATE_KBPS)
    }
}

impl AudioAssembler {
    pub fn new(pause: Duration, bitrate_kbps: u32) -> Self {
        Self {
            pause,
            bitrate_kbps,
        }
    }

    /// Merge `parts` into `output`, a pause between each pair.
    ///
    /// Missing or undecodable parts are skipped with a warning. Parts are
    /// converted to the sample rate and channel count of the first loaded
    /// part. Nothing is written to `output` unless the whole export succeeds.
    pub fn merge(&self, parts: &[PathBuf], output: &Path) -> Result<MergedAudio, AssemblyError> {
        if parts.is_empty() {
            return Err(AssemblyError::NoInput);
        }

        let format = OutputFormat::from_path(output)
            .ok_or_else(|| AssemblyError::UnsupportedFormat(output.to_path_buf()))?;

        let mut merged: Option<AudioClip> = None;
        let mut parts_merged = 0;

        for (position, part) in parts.iter().enumerate() {
            let Some(clip) = self.load_part(position, part) else {
                continue;
            };

            match merged.as_mut() {
                None => merged = Some(clip),
                Some(acc) => {
                    let clip = if acc.same_layout(&clip) {
                        clip
                    } else {
                        tracing::info!(
                            part = %part.display(),
                            sample_rate = clip.sample_rate,
                            channels = clip.channels,
                            target_sample_rate = acc.sample_rate,
                            target_channels = acc.channels,
                            "Converting audio part to the layout of the first part"
                        );
                        conform(clip, acc.sample_rate, acc.channels)?
                    };
                    acc.append_silence(self.pause);
                    acc.append(&clip);
                }
            }

            parts_merged += 1;
            tracing::info!(
                part = position + 1,
                duration_secs = clip_secs(&merged),
                "Audio part added"
            );
        }

        let merged = merged.ok_or(AssemblyError::NoValidAudio(parts.len()))?;

        self.export(&merged, output, format)?;

        let size_bytes = std::fs::metadata(output)?.len();
        let result = MergedAudio {
            path: output.to_path_buf(),
            duration: merged.duration(),
            size_bytes,
            parts_merged,
            parts_skipped: parts.len() - parts_merged,
        };

        tracing::info!(
            output = %output.display(),
            duration_secs = result.duration.as_secs_f64(),
            size_bytes,
            parts_merged,
            parts_skipped = result.parts_skipped,
            "Merged audio exported"
        );

        Ok(result)
    }

    fn load_part(&self, position: usize, part: &Path) -> Option<AudioClip> {
        if !part.exists() {
            tracing::warn!(part = position + 1, path = %part.display(), "Audio part not found, skipping");
            return None;
        }

        match decode_file(part) {
            Ok(clip) => Some(clip),
            Err(e) => {
                log_decode_failure(position, part, &e);
                None
            }
        }
    }

    /// Write to a temporary sibling first, then rename into place
    fn export(
        &self,
        clip: &AudioClip,
        output: &Path,
        format: OutputFormat,
    ) -> Result<(), AssemblyError> {
        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let staged = tempfile::Builder::new()
            .prefix(".xtts-narrator-")
            .suffix(&format!(".{}", format.extension()))
            .tempfile_in(&dir)?;

        match format {
            OutputFormat::Wav => write_wav(staged.path(), clip)?,
            OutputFormat::Mp3 => {
                let pcm = tempfile::Builder::new().suffix(".wav").tempfile()?;
                write_wav(pcm.path(), clip)?;
                encode_mp3(pcm.path(), staged.path(), self.bitrate_kbps)?;
            }
        }

        staged.persist(output).map_err(|e| AssemblyError::Io(e.error))?;
        Ok(())
    }
}

fn clip_secs(clip: &Option<AudioClip>) -> f64 {
    clip.as_ref().map(|c| c.duration().as_secs_f64()).unwrap_or(0.0)
}

fn log_decode_failure(position: usize, part: &Path, error: &DecodeError) {
    tracing::warn!(
        part = position + 1,
        path = %part.display(),
        error = %error,
        "Audio part could not be decoded, skipping"
    );
}
