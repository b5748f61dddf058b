use super::clip::AudioClip;
use rubato::{FftFixedIn, Resampler};

/// Frames fed to the resampler per call
const RESAMPLE_CHUNK: usize = 1024;
const SUB_CHUNKS: usize = 2;

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("failed to create resampler: {0}")]
    Construction(#[from] rubato::ResamplerConstructionError),
    #[error("resampling failed: {0}")]
    Resample(#[from] rubato::ResampleError),
}

/// Bring `clip` to the given sample rate and channel count
pub fn conform(clip: AudioClip, sample_rate: u32, channels: u16) -> Result<AudioClip, ConvertError> {
    let clip = remix(clip, channels);
    if clip.sample_rate == sample_rate {
        return Ok(clip);
    }
    resample(&clip, sample_rate)
}

/// Down-mix to mono by averaging, up-mix by copying the mono signal
fn remix(clip: AudioClip, channels: u16) -> AudioClip {
    if clip.channels == channels || clip.channels == 0 || channels == 0 {
        return clip;
    }

    let from = clip.channels as usize;
    let to = channels as usize;
    let mut samples = Vec::with_capacity(clip.frames() as usize * to);

    for frame in clip.samples.chunks_exact(from) {
        let mono = frame.iter().sum::<f32>() / from as f32;
        samples.extend(std::iter::repeat(mono).take(to));
    }

    AudioClip::new(clip.sample_rate, channels, samples)
}

fn resample(clip: &AudioClip, sample_rate: u32) -> Result<AudioClip, ConvertError> {
    let channels = clip.channels as usize;
    let frames = clip.frames() as usize;
    let expected =
        (frames as f64 * sample_rate as f64 / clip.sample_rate as f64).round() as usize;
    if frames == 0 || expected == 0 {
        return Ok(AudioClip::new(sample_rate, clip.channels, Vec::new()));
    }

    let planar: Vec<Vec<f32>> = (0..channels)
        .map(|c| clip.samples.iter().skip(c).step_by(channels).copied().collect())
        .collect();

    let mut resampler = FftFixedIn::<f32>::new(
        clip.sample_rate as usize,
        sample_rate as usize,
        RESAMPLE_CHUNK,
        SUB_CHUNKS,
        channels,
    )?;
    let delay = resampler.output_delay();

    let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity(delay + expected); channels];
    let mut pos = 0;

    // Input past the end is zero-padded until the delayed tail has come out
    while output[0].len() < delay + expected {
        let needed = resampler.input_frames_next();
        let block: Vec<Vec<f32>> = planar
            .iter()
            .map(|channel| {
                let mut chunk = vec![0.0; needed];
                if pos < frames {
                    let end = (pos + needed).min(frames);
                    chunk[..end - pos].copy_from_slice(&channel[pos..end]);
                }
                chunk
            })
            .collect();

        let resampled = resampler.process(&block, None)?;
        for (out, chunk) in output.iter_mut().zip(resampled) {
            out.extend_from_slice(&chunk);
        }
        pos += needed;
    }

    let mut samples = Vec::with_capacity(expected * channels);
    for frame in delay..delay + expected {
        for channel in &output {
            samples.push(channel[frame]);
        }
    }

    tracing::debug!(
        from_rate = clip.sample_rate,
        to_rate = sample_rate,
        frames_in = frames,
        frames_out = expected,
        "Audio part resampled"
    );

    Ok(AudioClip::new(sample_rate, clip.channels, samples))
}
