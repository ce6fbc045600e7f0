//! In-memory WAV clip encoding.
//!
//! Each recognition request carries one window (or one live utterance) as a
//! standalone WAV clip; the service re-parses it independently of its
//! neighbors.

use crate::error::{KikitoriError, Result};
use std::io::Cursor;

/// Encode mono 16-bit PCM samples as a complete WAV file in memory.
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer =
        hound::WavWriter::new(&mut cursor, spec).map_err(|e| KikitoriError::Encode {
            message: format!("failed to create WAV writer: {}", e),
        })?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| KikitoriError::Encode {
                message: format!("failed to write WAV sample: {}", e),
            })?;
    }

    writer.finalize().map_err(|e| KikitoriError::Encode {
        message: format!("failed to finalize WAV clip: {}", e),
    })?;

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_clip_round_trips_through_hound() {
        let samples = vec![0i16, 1000, -1000, i16::MAX, i16::MIN];
        let data = encode_wav(&samples, 16_000).unwrap();

        let mut reader = hound::WavReader::new(Cursor::new(data)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(spec.bits_per_sample, 16);

        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn empty_samples_produce_valid_header_only_clip() {
        let data = encode_wav(&[], 16_000).unwrap();
        let reader = hound::WavReader::new(Cursor::new(data)).unwrap();
        assert_eq!(reader.len(), 0);
    }

    #[test]
    fn clip_carries_the_buffer_rate() {
        let data = encode_wav(&[1i16; 100], 44_100).unwrap();
        let reader = hound::WavReader::new(Cursor::new(data)).unwrap();
        assert_eq!(reader.spec().sample_rate, 44_100);
    }
}
