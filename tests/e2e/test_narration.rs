use crate::e2e::helpers;

use helpers::{unpunctuated_text, wav_secs, FakeSynthesizer, TestContext};
use pretty_assertions::assert_eq;
use xtts_narrator::domain::tts::{
    LanguageChoice, LanguageCode, NarrationError, NarrationResult, NarrationServiceApi,
};

#[tokio::test]
async fn it_should_narrate_long_text_in_word_aligned_chunks() {
    let ctx = TestContext::new(FakeSynthesizer::new(0.5)).unwrap();
    let text = unpunctuated_text(4500);

    let result = ctx.service.narrate(ctx.request(&text, 2000)).await.unwrap();

    let summary = match result {
        NarrationResult::Completed(summary) => summary,
        other => panic!("expected completion, got {:?}", other),
    };
    assert_eq!(summary.chunk_count, 3);
    assert_eq!(summary.total_attempts, 3);

    let texts = ctx.synthesizer.texts();
    assert_eq!(texts.len(), 3);
    for chunk in &texts {
        assert!(chunk.chars().count() <= 2000);
        assert!(!chunk.starts_with(' ') && !chunk.ends_with(' '));
    }
    // Cuts fall on spaces, so no word is split and nothing is lost
    assert_eq!(texts.join(" "), text);

    // Three 0.5 s chunks plus two 200 ms pauses
    assert!((summary.audio.duration.as_secs_f64() - 1.9).abs() < 0.001);
    assert!((wav_secs(&ctx.output()).unwrap() - 1.9).abs() < 0.001);
    assert_eq!(
        summary.audio.size_bytes,
        std::fs::metadata(ctx.output()).unwrap().len()
    );
}

#[tokio::test]
async fn it_should_fail_fast_and_leave_no_output_when_a_chunk_exhausts_retries() {
    let ctx = TestContext::new(FakeSynthesizer::new(0.2).fail_chunk(1, 3)).unwrap();
    let text = unpunctuated_text(4500);

    let err = ctx
        .service
        .narrate(ctx.request(&text, 2000))
        .await
        .unwrap_err();

    match err {
        NarrationError::ChunkFailed {
            chunk_index,
            attempts,
        } => {
            assert_eq!(chunk_index, 1);
            assert_eq!(attempts, 3);
        }
        other => panic!("expected chunk failure, got {:?}", other),
    }
    assert!(!ctx.output().exists());

    let attempted: Vec<usize> = ctx
        .synthesizer
        .jobs()
        .iter()
        .map(|job| job.chunk.index)
        .collect();
    assert_eq!(attempted, vec![0, 1, 1, 1]);
}

#[tokio::test]
async fn it_should_recover_from_transient_backend_failures() {
    let ctx = TestContext::new(FakeSynthesizer::new(0.3).fail_chunk(0, 2)).unwrap();

    let result = ctx
        .service
        .narrate(ctx.request("A short story. It has two sentences.", 2000))
        .await
        .unwrap();

    match result {
        NarrationResult::Completed(summary) => {
            assert_eq!(summary.chunk_count, 1);
            assert_eq!(summary.total_attempts, 3);
            assert!((summary.audio.duration.as_secs_f64() - 0.3).abs() < 0.001);
        }
        other => panic!("expected completion, got {:?}", other),
    }
}

#[tokio::test]
async fn it_should_send_voice_settings_with_every_chunk() {
    let ctx = TestContext::new(FakeSynthesizer::new(0.1)).unwrap();
    let mut request = ctx.request(
        "Der schnelle braune Fuchs springt über den faulen Hund. Danach schläft er im Garten unter dem großen Baum.",
        60,
    );
    request.language = LanguageChoice::Detect;
    request.speed = 1.3;

    ctx.service.narrate(request).await.unwrap();

    let jobs = ctx.synthesizer.jobs();
    assert!(jobs.len() >= 2);
    for job in &jobs {
        assert_eq!(job.language, LanguageCode::German);
        assert_eq!(job.speed, 1.3);
        assert_eq!(job.voice_sample, ctx.voice_sample);
    }
}

#[tokio::test]
async fn it_should_flatten_newlines_before_chunking() {
    let ctx = TestContext::new(FakeSynthesizer::new(0.1)).unwrap();

    ctx.service
        .narrate(ctx.request("First line\nsecond line\n\n\tthird   line.", 2000))
        .await
        .unwrap();

    assert_eq!(
        ctx.synthesizer.texts(),
        vec!["First line second line third line.".to_string()]
    );
}

#[tokio::test]
async fn it_should_do_nothing_for_whitespace_only_text() {
    let ctx = TestContext::new(FakeSynthesizer::new(0.1)).unwrap();

    let result = ctx.service.narrate(ctx.request("\n \t \n", 2000)).await.unwrap();

    assert_eq!(result, NarrationResult::NothingToSynthesize);
    assert!(ctx.synthesizer.jobs().is_empty());
    assert!(!ctx.output().exists());
}
