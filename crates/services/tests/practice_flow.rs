use chrono::Duration;
use drill_core::model::{LearnerProgress, Level};
use drill_core::progression::{Advancement, ProgressionState};
use drill_core::time::fixed_now;
use drill_services::{Clock, PracticeService, QuestionEngine, TestSessionError, parameter_source};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Answers every question correctly, one every `secs_per_answer` seconds.
fn run_test(
    svc: &PracticeService,
    level: Level,
    seed: u64,
    secs_per_answer: i64,
) -> drill_services::TestSession {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut session = svc.start_test_with_rng(level, &mut rng).unwrap();
    let mut now = fixed_now();
    while let Some(question) = session.current_question() {
        let answer = question.correct_answer().to_owned();
        now += Duration::seconds(secs_per_answer);
        session.submit_answer(&answer, now).unwrap();
    }
    session
}

#[test]
fn three_slow_passes_raise_the_level_once() {
    let svc = PracticeService::new(Clock::fixed(fixed_now()), QuestionEngine::default());
    let mut progress = LearnerProgress::new(ProgressionState::new(Level::new(8).unwrap(), 0));

    // 25 answers at 7s each: 175s used, 5s left, a slow pass.
    let finished_at = Clock::fixed(fixed_now() + Duration::seconds(175));
    let closer = svc.clone().with_clock(finished_at);

    let mut advancements = Vec::new();
    for seed in 1..=3 {
        let session = run_test(&svc, progress.level(), seed, 7);
        let done = closer.complete_test(&mut progress, session).unwrap();
        assert_eq!(done.attempt.correct_count(), 25);
        assert_eq!(done.attempt.time_remaining(), 5);
        advancements.push(done.outcome.advancement);
    }

    assert_eq!(
        advancements,
        vec![
            Advancement::StreakExtended,
            Advancement::StreakExtended,
            Advancement::StreakCompleted
        ]
    );
    assert_eq!(progress.level().value(), 9);
    assert_eq!(progress.state().streak, 0);
    assert_eq!(progress.recent_tests().len(), 3);
}

#[test]
fn fast_pass_at_the_top_level_stays_capped() {
    let svc = PracticeService::new(Clock::fixed(fixed_now()), QuestionEngine::default());
    let mut progress = LearnerProgress::new(ProgressionState::new(Level::MAX, 0));

    let session = run_test(&svc, Level::MAX, 12, 1);
    let closer = svc.clone().with_clock(Clock::fixed(fixed_now() + Duration::seconds(25)));
    let done = closer.complete_test(&mut progress, session).unwrap();

    assert_eq!(done.outcome.advancement, Advancement::SuperFastTrack);
    assert!(!done.outcome.leveled_up);
    assert_eq!(progress.level(), Level::MAX);
}

#[test]
fn wrong_answers_reset_the_streak() {
    let svc = PracticeService::new(Clock::fixed(fixed_now()), QuestionEngine::default());
    let mut progress = LearnerProgress::new(ProgressionState::new(Level::new(12).unwrap(), 2));

    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut session = svc.start_test_with_rng(progress.level(), &mut rng).unwrap();
    while session.current_question().is_some() {
        svc.answer_current(&mut session, "nope").unwrap();
    }
    assert!(matches!(
        svc.answer_current(&mut session, "1"),
        Err(drill_services::PracticeError::Session(TestSessionError::Completed))
    ));

    let done = svc.complete_test(&mut progress, session).unwrap();
    assert_eq!(done.attempt.correct_count(), 0);
    assert_eq!(done.outcome.advancement, Advancement::Failed);
    assert_eq!(progress.level().value(), 12);
    assert_eq!(progress.state().streak, 0);
}

#[test]
fn configured_document_drives_the_engine() {
    let document = r#"{ "integerLevels": [], "fractionLevels": [] }"#;
    let engine = QuestionEngine::new(parameter_source(Some(document)));
    let svc = PracticeService::new(Clock::fixed(fixed_now()), engine);

    let session = svc.start_test(Level::new(15).unwrap()).unwrap();
    assert_eq!(session.total_questions(), 25);
    assert_eq!(session.time_remaining(fixed_now()), 180);
}
