// Integration tests for the enhancement pipeline
//
// The tiered fallback contract is the important part: whatever fails, the
// caller always gets a usable blob back, and each fallback tier produces
// output byte-identical to calling that tier directly.

use voiceclip::error::ProcessingError;
use voiceclip::{AudioBlob, EnhanceOptions, EnhancementPipeline};

/// 1 second of a 440Hz tone at 16kHz mono, peaking at the given level.
fn tone_blob(peak: f32) -> AudioBlob {
    let samples: Vec<f32> = (0..16_000)
        .map(|i| {
            let t = i as f32 / 16_000.0;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * peak
        })
        .collect();
    AudioBlob::from_samples(&samples, 16_000, 1).unwrap()
}

#[test]
fn test_full_enhancement_normalizes_to_target_peak() {
    let blob = tone_blob(0.2);
    let options = EnhanceOptions::default();

    let enhanced = EnhancementPipeline::auto_enhance(&blob, &options);
    let decoded = enhanced.decode().unwrap();

    let peak = decoded.samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
    assert!(
        (peak - 0.95).abs() < 0.01,
        "expected peak near 0.95, got {peak}"
    );
}

#[test]
fn test_tier_two_fallback_matches_normalize_only() {
    let blob = tone_blob(0.4);
    let options = EnhanceOptions::default();

    // Force the full-enhancement tier to fail.
    let result = EnhancementPipeline::auto_enhance_with(
        &blob,
        &options,
        |_, _| Err(ProcessingError::Enhancement("forced failure".to_string())),
        |b, peak| EnhancementPipeline::normalize_only(b, peak),
    );

    let expected = EnhancementPipeline::normalize_only(&blob, options.target_peak).unwrap();
    assert_eq!(result.bytes, expected.bytes, "tier 2 must equal normalize_only");
}

#[test]
fn test_tier_three_fallback_returns_original_bytes() {
    let blob = tone_blob(0.4);
    let options = EnhanceOptions::default();

    // Force both processing tiers to fail.
    let result = EnhancementPipeline::auto_enhance_with(
        &blob,
        &options,
        |_, _| Err(ProcessingError::Enhancement("forced failure".to_string())),
        |_, _| Err(ProcessingError::Enhancement("forced failure".to_string())),
    );

    assert_eq!(result.bytes, blob.bytes, "tier 3 must return the input unchanged");
    assert_eq!(result.mime_type, blob.mime_type);
}

#[test]
fn test_undecodable_blob_falls_through_to_original() {
    // A garbage blob fails both real tiers naturally.
    let blob = AudioBlob::new(vec![0xde, 0xad, 0xbe, 0xef], "audio/wav");
    let result = EnhancementPipeline::auto_enhance(&blob, &EnhanceOptions::default());
    assert_eq!(result.bytes, blob.bytes);
}

#[test]
fn test_manual_volume_unity_is_a_true_noop() {
    let blob = tone_blob(0.8);
    let adjusted = EnhancementPipeline::manual_volume_adjust(&blob, 1.0).unwrap();
    // Unity gain must skip processing entirely, not just scale by 1.
    assert_eq!(adjusted.bytes, blob.bytes);
}

#[test]
fn test_manual_volume_halves_amplitude() {
    let blob = tone_blob(0.8);
    let adjusted = EnhancementPipeline::manual_volume_adjust(&blob, 0.5).unwrap();

    let peak = adjusted
        .decode()
        .unwrap()
        .samples
        .iter()
        .fold(0.0f32, |acc, &s| acc.max(s.abs()));
    assert!((peak - 0.4).abs() < 0.01, "expected peak near 0.4, got {peak}");
}

#[test]
fn test_manual_volume_clamps_boost_against_clipping() {
    let blob = tone_blob(0.8);
    let adjusted = EnhancementPipeline::manual_volume_adjust(&blob, 2.0).unwrap();

    let decoded = adjusted.decode().unwrap();
    assert!(decoded.samples.iter().all(|s| s.abs() <= 1.0));
}

#[test]
fn test_noise_reduction_attenuates_quiet_passages() {
    // Loud tone with a quiet hissy tail.
    let mut samples: Vec<f32> = (0..8_000)
        .map(|i| {
            let t = i as f32 / 16_000.0;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.8
        })
        .collect();
    // Pseudo-noise floor: small alternating values
    samples.extend((0..8_000).map(|i| if i % 2 == 0 { 0.004 } else { -0.004 }));
    let blob = AudioBlob::from_samples(&samples, 16_000, 1).unwrap();

    let options = EnhanceOptions {
        reduce_noise: true,
        normalize: false,
        target_peak: 0.95,
    };
    let enhanced = EnhancementPipeline::enhance_full(&blob, &options).unwrap();
    let decoded = enhanced.decode().unwrap();

    let tail_energy: f32 = decoded.samples[8_000..]
        .iter()
        .map(|s| s.abs())
        .sum::<f32>()
        / 8_000.0;
    let original_tail_energy = 0.004;
    assert!(
        tail_energy < original_tail_energy * 0.9,
        "quiet tail should be attenuated, got {tail_energy}"
    );
}
