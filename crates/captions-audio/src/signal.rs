//! Signal-level metrics used for VAD gating and short-utterance heuristics.

/// Root-mean-square amplitude of a PCM16 buffer, in raw sample units
/// (0..=32768). Zero on empty input.
pub fn rms(samples: &[i16]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: i64 = samples.iter().map(|&s| (s as i64) * (s as i64)).sum();
    let mean_square = sum_squares as f64 / samples.len() as f64;
    mean_square.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_has_zero_rms() {
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn silence_has_zero_rms() {
        assert_eq!(rms(&[0i16; 512]), 0.0);
    }

    #[test]
    fn full_scale_square_wave_approaches_max_amplitude() {
        let samples: Vec<i16> = (0..512)
            .map(|i| if i % 2 == 0 { i16::MAX } else { i16::MIN })
            .collect();
        let r = rms(&samples);
        assert!((r - i16::MAX as f64).abs() < 2.0);
    }

    #[test]
    fn constant_amplitude_equals_absolute_value() {
        let samples = vec![1000i16; 256];
        assert!((rms(&samples) - 1000.0).abs() < 0.01);
    }
}
