// Integration tests for the trim engine
//
// Trimming is non-destructive and committed only at submission; the engine
// re-measures the resulting duration from the encoded output and falls
// back to the untrimmed original when anything goes wrong.

use voiceclip::{AudioBlob, TrimEngine, TrimSelection};

const SAMPLE_RATE: u32 = 16_000;

/// A clip whose sample values encode their own second-index, so slices can
/// be verified after the round trip.
fn staircase_blob(seconds: usize) -> AudioBlob {
    let mut samples = Vec::with_capacity(seconds * SAMPLE_RATE as usize);
    for second in 0..seconds {
        let level = (second as f32 + 1.0) * 0.05;
        samples.extend(std::iter::repeat(level).take(SAMPLE_RATE as usize));
    }
    AudioBlob::from_samples(&samples, SAMPLE_RATE, 1).unwrap()
}

#[test]
fn test_trim_keeps_exactly_the_selected_window() {
    let blob = staircase_blob(10);

    let mut selection = TrimSelection::new(10.0);
    selection.set_start(2.0);
    selection.set_end(3.0);

    let outcome = TrimEngine::apply(&blob, 10.0, &selection);
    assert!(outcome.warning.is_none());

    let decoded = outcome.blob.decode().unwrap();
    // Kept [2s, 7s): five seconds of audio.
    assert_eq!(decoded.samples.len(), 5 * SAMPLE_RATE as usize);

    // First kept sample belongs to second 2 (level 0.15), last to second 6.
    assert!((decoded.samples[0] - 0.15).abs() < 0.01);
    assert!((decoded.samples.last().unwrap() - 0.35).abs() < 0.01);
}

#[test]
fn test_trimmed_duration_is_remeasured_from_encoded_output() {
    let blob = staircase_blob(10);

    let mut selection = TrimSelection::new(10.0);
    selection.set_start(1.25);
    selection.set_end(0.75);

    let outcome = TrimEngine::apply(&blob, 10.0, &selection);
    assert!(outcome.warning.is_none());
    assert!(
        (outcome.duration_seconds - 8.0).abs() < 0.01,
        "expected ~8s, got {}",
        outcome.duration_seconds
    );
}

#[test]
fn test_noop_selection_passes_blob_through() {
    let blob = staircase_blob(3);
    let selection = TrimSelection::new(3.0);

    let outcome = TrimEngine::apply(&blob, 3.0, &selection);
    assert!(outcome.warning.is_none());
    assert_eq!(outcome.blob.bytes, blob.bytes);
    assert_eq!(outcome.duration_seconds, 3.0);
}

#[test]
fn test_failed_trim_falls_back_to_original() {
    let blob = AudioBlob::new(vec![1, 2, 3], "audio/wav");

    let mut selection = TrimSelection::new(10.0);
    selection.set_start(1.0);

    let outcome = TrimEngine::apply(&blob, 10.0, &selection);
    assert!(outcome.warning.is_some(), "failure must surface a warning");
    assert_eq!(outcome.blob.bytes, blob.bytes, "original blob preserved");
    assert_eq!(outcome.duration_seconds, 10.0);
}

#[test]
fn test_selection_invariant_for_ten_second_clip() {
    let mut selection = TrimSelection::new(10.0);

    // Drive both bounds through aggressive edits; the invariant
    // start + end <= 9.5 must hold after every single one.
    for step in 0..40 {
        let value = (step as f64) * 0.7;
        if step % 2 == 0 {
            selection.set_start(value);
        } else {
            selection.set_end(value);
        }
        assert!(
            selection.start_offset_sec() + selection.end_offset_sec() <= 9.5 + 1e-9,
            "step {step}: start={} end={}",
            selection.start_offset_sec(),
            selection.end_offset_sec()
        );
    }
}

#[test]
fn test_selection_edits_reclamp_the_other_bound() {
    let mut selection = TrimSelection::new(10.0);

    selection.set_end(9.0);
    assert_eq!(selection.end_offset_sec(), 9.0);

    // Pushing the start forward must shrink the tail allowance.
    selection.set_start(4.0);
    assert_eq!(selection.start_offset_sec(), 4.0);
    assert!(selection.end_offset_sec() <= 5.5);
    assert!(selection.kept_seconds() >= 0.5 - 1e-9);
}
