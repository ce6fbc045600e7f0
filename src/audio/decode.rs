//! Audio container decoding.
//!
//! Accepts the upload formats (mp3, wav, ogg, flac, m4a — anything symphonia
//! can probe), decodes the default audio track, downmixes to mono, and
//! resamples to the processing rate. A corrupt or unsupported file fails
//! here, before the pipeline starts.

use crate::audio::AudioBuffer;
use crate::defaults::SAMPLE_RATE;
use crate::error::{KikitoriError, Result};
use std::io::Cursor;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decode an audio file into a mono buffer at the processing rate.
pub fn decode_file(path: &Path) -> Result<AudioBuffer> {
    let file = std::fs::File::open(path).map_err(|e| KikitoriError::Decode {
        message: format!("cannot open {}: {}", path.display(), e),
    })?;

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    decode_source(Box::new(file), hint)
}

/// Decode in-memory audio data, with an optional container extension hint.
pub fn decode_bytes(data: Vec<u8>, extension: Option<&str>) -> Result<AudioBuffer> {
    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    decode_source(Box::new(Cursor::new(data)), hint)
}

fn decode_source(source: Box<dyn MediaSource>, hint: Hint) -> Result<AudioBuffer> {
    let mss = MediaSourceStream::new(source, Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| KikitoriError::Decode {
            message: format!("unrecognized audio container: {}", e),
        })?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| KikitoriError::Decode {
            message: "no audio track found".to_string(),
        })?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| KikitoriError::Decode {
            message: format!("unsupported codec: {}", e),
        })?;

    let mut source_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count())
        .unwrap_or(0);

    let mut interleaved: Vec<i16> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            // End of stream.
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(KikitoriError::Decode {
                    message: format!("failed to read packet: {}", e),
                });
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                source_rate = spec.rate;
                channels = spec.channels.count();

                let mut sample_buf = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
                sample_buf.copy_interleaved_ref(decoded);
                interleaved.extend_from_slice(sample_buf.samples());
            }
            // A single damaged packet is skippable; the rest of the file
            // can still be transcribed.
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => {
                return Err(KikitoriError::Decode {
                    message: format!("decode failed: {}", e),
                });
            }
        }
    }

    if interleaved.is_empty() {
        return Ok(AudioBuffer::new(Vec::new(), SAMPLE_RATE));
    }

    if source_rate == 0 || channels == 0 {
        return Err(KikitoriError::Decode {
            message: "audio track has no sample rate or channel layout".to_string(),
        });
    }

    let mono = downmix(&interleaved, channels);
    let samples = resample(&mono, source_rate, SAMPLE_RATE);

    Ok(AudioBuffer::new(samples, SAMPLE_RATE))
}

/// Average interleaved frames down to a single channel.
fn downmix(interleaved: &[i16], channels: usize) -> Vec<i16> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Simple linear interpolation resampling.
fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[source_idx]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}
