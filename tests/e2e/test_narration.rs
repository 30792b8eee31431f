use crate::e2e::helpers;

use helpers::fakes::{expected_samples, FakeTtsRepository};
use helpers::fixtures::{lecture, ssml_settings, with_markup, words, SAMPLE_RATE_HZ};
use helpers::TestContext;
use narrator::domain::narration::{
    read_document, AudioEncoding, LanguageSetting, MarkupExpander, MarkupMode, MarkupSettings,
    NarrationError, NarrationServiceApi, SynthesisInput,
};
use narrator::error::AppError;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn it_should_narrate_a_short_document_in_one_request() {
    let ctx = TestContext::new("Hello world. This is a test.\n", "wav").unwrap();
    let service = ctx.service(ssml_settings(4800, AudioEncoding::Linear16)).unwrap();

    let outcome = service.narrate(&ctx.input, &ctx.output).await.unwrap();

    let expected_payload = MarkupExpander::new(MarkupSettings::default())
        .expand("Hello world. This is a test.");
    assert_eq!(outcome.chunk_count, 1);
    assert_eq!(
        *ctx.tts.calls.lock(),
        vec![SynthesisInput::Markup(expected_payload.clone())]
    );

    let audio = outcome.audio.expect("audio written");
    assert_eq!(
        audio.frames,
        Some(expected_samples(1, expected_payload.len()).len() as u64)
    );
    assert!(ctx.output.exists());
}

#[tokio::test]
async fn it_should_split_a_long_document_and_keep_it_in_order() {
    let document = lecture();
    let ctx = TestContext::new(&document, "wav").unwrap();
    let budget = 700;
    let service = ctx.service(ssml_settings(budget, AudioEncoding::Linear16)).unwrap();

    let outcome = service.narrate(&ctx.input, &ctx.output).await.unwrap();

    // Planning is deterministic, so the plan matches what was sent
    let normalized = read_document(&ctx.input).await.unwrap();
    let chunks = service.plan(&normalized).unwrap();
    let calls = ctx.tts.calls.lock().clone();
    assert!(chunks.len() > 1);
    assert_eq!(outcome.chunk_count, chunks.len());
    assert_eq!(
        calls,
        chunks.iter().map(|c| c.payload.clone()).collect::<Vec<_>>()
    );

    for payload in &calls {
        assert!(payload.is_markup());
        assert!(payload.wire_size() <= budget, "payload of {} bytes", payload.wire_size());
    }

    let chunk_words: Vec<String> = chunks.iter().flat_map(|c| words(&c.text)).collect();
    assert_eq!(chunk_words, words(&normalized));

    // Samples come back in chunk order with nothing added or dropped
    let expected: Vec<i16> = calls
        .iter()
        .enumerate()
        .flat_map(|(i, payload)| expected_samples(i + 1, payload.wire_size()))
        .collect();
    let reader = hound::WavReader::open(&ctx.output).unwrap();
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.spec().bits_per_sample, 16);
    assert_eq!(reader.spec().sample_rate, SAMPLE_RATE_HZ);
    let samples: Vec<i16> = reader.into_samples::<i16>().map(Result::unwrap).collect();
    assert_eq!(samples, expected);
    assert_eq!(outcome.audio.unwrap().frames, Some(expected.len() as u64));
}

#[tokio::test]
async fn it_should_send_plain_text_when_markup_is_disabled() {
    let ctx = TestContext::new("Fish & chips, please.\n\nThank you.", "wav").unwrap();
    let settings = with_markup(ssml_settings(4800, AudioEncoding::Linear16), MarkupMode::Disabled);
    let service = ctx.service(settings).unwrap();

    service.narrate(&ctx.input, &ctx.output).await.unwrap();

    assert_eq!(
        *ctx.tts.calls.lock(),
        vec![SynthesisInput::Text(
            "Fish & chips, please.\n\nThank you.".to_string()
        )]
    );
}

#[tokio::test]
async fn it_should_fail_on_an_unsplittable_word_before_synthesis() {
    let word = "x".repeat(200);
    let ctx = TestContext::new(&format!("A short start. Then {} ends it.", word), "wav").unwrap();
    let service = ctx.service(ssml_settings(150, AudioEncoding::Linear16)).unwrap();

    let err = service.narrate(&ctx.input, &ctx.output).await.unwrap_err();

    match &err {
        NarrationError::Unsplittable { fragment, budget, .. } => {
            assert!(fragment.starts_with("xxxx"));
            assert_eq!(*budget, 150);
        }
        other => panic!("expected unsplittable error, got {other:?}"),
    }
    assert_eq!(AppError::from(err).stage(), "segmentation");
    assert_eq!(ctx.tts.call_count(), 0);
    assert!(!ctx.output.exists());
}

#[tokio::test]
async fn it_should_report_a_missing_input_document() {
    let ctx = TestContext::new("unused", "wav").unwrap();
    std::fs::remove_file(&ctx.input).unwrap();
    let service = ctx.service(ssml_settings(4800, AudioEncoding::Linear16)).unwrap();

    let err = service.narrate(&ctx.input, &ctx.output).await.unwrap_err();

    assert!(matches!(err, NarrationError::MissingInput(ref path) if path == &ctx.input));
    assert_eq!(err.stage(), "input read");
    assert_eq!(ctx.tts.call_count(), 0);
}

#[tokio::test]
async fn it_should_reject_an_empty_document() {
    let ctx = TestContext::new("\r\n   \r\n", "wav").unwrap();
    let service = ctx.service(ssml_settings(4800, AudioEncoding::Linear16)).unwrap();

    let err = service.narrate(&ctx.input, &ctx.output).await.unwrap_err();

    assert!(matches!(err, NarrationError::EmptyDocument));
    assert_eq!(ctx.tts.call_count(), 0);
}

#[tokio::test]
async fn it_should_reject_oversized_raw_markup_before_synthesis() {
    let document = format!("<speak>{}</speak>", "word ".repeat(1000));
    let ctx = TestContext::new(&document, "wav").unwrap();
    let settings = with_markup(ssml_settings(4800, AudioEncoding::Linear16), MarkupMode::Raw);
    let service = ctx.service(settings).unwrap();

    let err = service.narrate(&ctx.input, &ctx.output).await.unwrap_err();

    assert!(matches!(
        err,
        NarrationError::RawMarkupTooLarge { ceiling: 5000, .. }
    ));
    assert_eq!(ctx.tts.call_count(), 0);
}

#[tokio::test]
async fn it_should_send_raw_markup_unchanged() {
    let document = "<speak>Welcome.<break time=\"2s\"/>Let us begin.</speak>";
    let ctx = TestContext::new(document, "wav").unwrap();
    let settings = with_markup(ssml_settings(4800, AudioEncoding::Linear16), MarkupMode::Raw);
    let service = ctx.service(settings).unwrap();

    let outcome = service.narrate(&ctx.input, &ctx.output).await.unwrap();

    assert_eq!(outcome.chunk_count, 1);
    assert_eq!(
        *ctx.tts.calls.lock(),
        vec![SynthesisInput::Markup(document.to_string())]
    );
}

#[tokio::test]
async fn it_should_abort_on_the_first_failed_chunk() {
    let ctx = TestContext::with_fakes(
        &lecture(),
        "wav",
        FakeTtsRepository::failing_on(2),
        Default::default(),
    )
    .unwrap();
    let service = ctx.service(ssml_settings(700, AudioEncoding::Linear16)).unwrap();

    let err = service.narrate(&ctx.input, &ctx.output).await.unwrap_err();

    match &err {
        NarrationError::Synthesis { chunk, total, message } => {
            assert_eq!(*chunk, 2);
            assert!(*total > 2);
            assert_eq!(message, "429 Too Many Requests: quota exhausted");
        }
        other => panic!("expected synthesis error, got {other:?}"),
    }
    assert_eq!(err.stage(), "synthesis");
    assert_eq!(ctx.tts.call_count(), 2);
    assert!(!ctx.output.exists());
}

#[tokio::test]
async fn it_should_plan_without_synthesis_on_a_dry_run() {
    let ctx = TestContext::new(&lecture(), "wav").unwrap();
    let mut settings = ssml_settings(700, AudioEncoding::Linear16);
    settings.dry_run = true;
    let service = ctx.service(settings).unwrap();

    let outcome = service.narrate(&ctx.input, &ctx.output).await.unwrap();

    assert!(outcome.chunk_count > 1);
    assert!(outcome.wire_bytes > 0);
    assert!(outcome.audio.is_none());
    assert_eq!(ctx.tts.call_count(), 0);
    assert!(!ctx.output.exists());
}

#[tokio::test]
async fn it_should_pick_a_voice_for_the_detected_language() {
    let ctx = TestContext::new(
        "Esto es una prueba en español. El rápido zorro marrón salta sobre el perro perezoso.",
        "wav",
    )
    .unwrap();
    let mut settings = ssml_settings(4800, AudioEncoding::Linear16);
    settings.voice.language = LanguageSetting::Auto;
    let service = ctx.service(settings).unwrap();

    let outcome = service.narrate(&ctx.input, &ctx.output).await.unwrap();

    assert_eq!(outcome.voice.language, "es-ES");
    assert_eq!(outcome.voice.name, "fake-es");
    assert_eq!(ctx.tts.voices.lock()[0], outcome.voice);
}

#[tokio::test]
async fn it_should_keep_an_explicit_voice_name() {
    let ctx = TestContext::new("Hello there.", "wav").unwrap();
    let mut settings = ssml_settings(4800, AudioEncoding::Linear16);
    settings.voice.name = Some("en-US-Neural2-D".to_string());
    let service = ctx.service(settings).unwrap();

    let outcome = service.narrate(&ctx.input, &ctx.output).await.unwrap();

    assert_eq!(outcome.voice.name, "en-US-Neural2-D");
}

#[tokio::test]
async fn it_should_refuse_a_budget_above_the_provider_ceiling() {
    let ctx = TestContext::new("Hello.", "wav").unwrap();

    let result = ctx.service(ssml_settings(5001, AudioEncoding::Linear16));

    assert!(matches!(
        result,
        Err(NarrationError::BudgetExceedsCeiling { budget: 5001, ceiling: 5000, provider: "fake" })
    ));
}
