use super::clip::AudioClip;
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Symphonia(#[from] SymphoniaError),
    #[error("no decodable audio track")]
    NoTrack,
    #[error("stream does not declare sample rate or channels")]
    UnknownLayout,
}

/// Decode any container/codec symphonia understands into interleaved f32 PCM
pub fn decode_file(path: &Path) -> Result<AudioClip, DecodeError> {
    let file = File::open(path)?;
    let stream = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    // Gapless trims encoder delay and padding so MP3 parts join without gaps
    let format_options = FormatOptions {
        enable_gapless: true,
        ..Default::default()
    };

    let probed = symphonia::default::get_probe().format(
        &hint,
        stream,
        &format_options,
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoTrack)?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut decoder =
        symphonia::default::get_codecs().make(&codec_params, &DecoderOptions::default())?;

    let mut sample_rate = codec_params.sample_rate;
    let mut channels = codec_params.channels.map(|c| c.count() as u16);
    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let capacity = decoded.capacity() as u64;
                sample_rate.get_or_insert(spec.rate);
                channels.get_or_insert(spec.channels.count() as u16);

                let mut buffer = SampleBuffer::<f32>::new(capacity, spec);
                buffer.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buffer.samples());
            }
            Err(SymphoniaError::DecodeError(reason)) => {
                tracing::debug!(path = %path.display(), reason, "Skipping corrupt packet");
            }
            Err(e) => return Err(e.into()),
        }
    }

    match (sample_rate, channels) {
        (Some(rate), Some(channels)) if rate > 0 && channels > 0 => {
            Ok(AudioClip::new(rate, channels, samples))
        }
        _ => Err(DecodeError::UnknownLayout),
    }
}
