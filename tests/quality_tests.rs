// Integration tests for the advisory quality analyzer

use voiceclip::{AudioBlob, QualityAnalyzer, RecommendedAction};

const SAMPLE_RATE: u32 = 16_000;

fn blob_from(samples: Vec<f32>) -> AudioBlob {
    AudioBlob::from_samples(&samples, SAMPLE_RATE, 1).unwrap()
}

#[test]
fn test_clipped_clip_reports_clipping_and_input_advice() {
    // Full-scale square wave: every sample sits at the rails.
    let samples: Vec<f32> = (0..SAMPLE_RATE as usize)
        .map(|i| if i % 16 < 8 { 1.0 } else { -1.0 })
        .collect();

    let metrics = QualityAnalyzer::analyze(&blob_from(samples)).unwrap();
    assert!(metrics.clipping_ratio > 0.9);
    assert!((metrics.peak_level - 1.0).abs() < 1e-3);
    assert!(metrics
        .recommended_actions
        .contains(&RecommendedAction::ReduceInputLevel));
}

#[test]
fn test_quiet_clip_suggests_gain_boost() {
    let samples: Vec<f32> = (0..SAMPLE_RATE as usize)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.1
        })
        .collect();

    let metrics = QualityAnalyzer::analyze(&blob_from(samples)).unwrap();
    assert!(metrics.peak_level < 0.15);
    assert!(metrics
        .recommended_actions
        .contains(&RecommendedAction::BoostGain));
}

#[test]
fn test_half_silent_clip_measures_silence_ratio() {
    // One second of tone, one second of digital silence.
    let mut samples: Vec<f32> = (0..SAMPLE_RATE as usize)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect();
    samples.extend(std::iter::repeat(0.0f32).take(SAMPLE_RATE as usize));

    let metrics = QualityAnalyzer::analyze(&blob_from(samples)).unwrap();
    assert!(
        (metrics.silence_ratio - 0.5).abs() < 0.1,
        "expected ~0.5, got {}",
        metrics.silence_ratio
    );
    assert!(metrics
        .recommended_actions
        .contains(&RecommendedAction::TrimSilence));
}

#[test]
fn test_noisy_clip_suggests_noise_reduction() {
    // A second of speech-level tone followed by a second of audible hiss:
    // the quiet bed carries energy well above the advisory threshold.
    let mut samples: Vec<f32> = (0..SAMPLE_RATE as usize)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect();
    samples.extend((0..SAMPLE_RATE as usize).map(|i| if i % 2 == 0 { 0.04 } else { -0.04 }));

    let metrics = QualityAnalyzer::analyze(&blob_from(samples)).unwrap();
    assert!(metrics.noise_floor_estimate > 0.02);
    assert!(metrics
        .recommended_actions
        .contains(&RecommendedAction::ApplyNoiseReduction));
}

#[test]
fn test_clean_clip_yields_no_advice() {
    let samples: Vec<f32> = (0..2 * SAMPLE_RATE as usize)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.7
        })
        .collect();

    let metrics = QualityAnalyzer::analyze(&blob_from(samples)).unwrap();
    assert!(metrics.recommended_actions.is_empty(), "got {:?}", metrics.recommended_actions);
}

#[test]
fn test_undecodable_blob_is_an_error_not_a_panic() {
    let blob = AudioBlob::new(vec![9, 9, 9], "audio/wav");
    assert!(QualityAnalyzer::analyze(&blob).is_err());
}

#[test]
fn test_empty_clip_is_an_error() {
    let blob = AudioBlob::from_samples(&[], SAMPLE_RATE, 1).unwrap();
    assert!(QualityAnalyzer::analyze(&blob).is_err());
}
