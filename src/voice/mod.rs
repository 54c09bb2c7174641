//! Voice recitation quiz
//!
//! The learner hears an ayah, then recites the next one. The pipeline is a
//! straight sequence of awaits (greeting, audio, cue, listen, verify,
//! feedback) and every one of them races the session's cancellation token.
//! Speech and audio sit behind small traits so the terminal build can stand
//! in typed input and printed lines for them.

pub mod terminal;

use std::future::Future;

use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::VoiceConfig;
use crate::curriculum::Curriculum;
use crate::quiz::generator::candidate_pool;
use crate::quiz::{CorrectAnswer, Outcome, QuizError, ScopeSelection};
use crate::verify::{Verification, Verifier};

/// Cue spoken after the prompt ayah
pub const CONTINUE_CUE: &str = "Silakan lanjutkan";
/// Closing line
pub const CLOSING_LINE: &str = "Alhamdulillah, latihan selesai";

/// Errors from speech and audio collaborators
#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Speech recognition failed: {0}")]
    RecognitionFailed(String),

    #[error("No speech detected")]
    NoSpeech,

    #[error("Audio playback failed: {0}")]
    AudioFailed(String),

    #[error("Speech synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns the learner's voice into text
pub trait SpeechRecognizer {
    fn listen(&mut self) -> impl Future<Output = Result<String, VoiceError>>;
}

/// Speaks a line to the learner
pub trait SpeechSynthesizer {
    fn speak(&mut self, text: &str) -> impl Future<Output = Result<(), VoiceError>>;
}

/// Plays a reciter's audio for one ayah
pub trait AyahAudio {
    fn play(&mut self, url: &str) -> impl Future<Output = Result<(), VoiceError>>;
}

/// Audio URL for an ayah recited by Mishary Alafasy
pub fn ayah_audio_url(surah_number: u32, ayah_number: u32) -> String {
    format!("https://everyayah.com/data/Alafasy_128kbps/{surah_number:03}{ayah_number:03}.mp3")
}

/// One recitation prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceQuestion {
    pub surah_name: String,
    pub surah_number: u32,
    pub juz_number: u32,
    pub prompt_ayah_number: u32,
    pub prompt_text: String,
    pub answer_ayah_number: u32,
    pub answer_text: String,
}

/// Draw `count` recitation prompts from the learner's scope
pub fn voice_questions<R: Rng + ?Sized>(
    curriculum: &Curriculum,
    scope: &ScopeSelection,
    count: usize,
    rng: &mut R,
) -> Result<Vec<VoiceQuestion>, QuizError> {
    scope.validate()?;

    let mut pool = candidate_pool(curriculum, scope);
    if pool.is_empty() {
        return Err(QuizError::EmptyCandidatePool);
    }
    pool.shuffle(rng);

    Ok(pool
        .into_iter()
        .take(count)
        .map(|c| VoiceQuestion {
            surah_name: c.surah.name.clone(),
            surah_number: c.surah.number,
            juz_number: c.juz_number,
            prompt_ayah_number: c.prompt.number,
            prompt_text: c.prompt.text.clone(),
            answer_ayah_number: c.answer.number,
            answer_text: c.answer.text.clone(),
        })
        .collect())
}

/// Progress reported while the pipeline runs
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceEvent {
    Greeting(String),
    QuestionShown { index: usize, total: usize, question: VoiceQuestion },
    Listening { attempt: u32 },
    Heard(String),
    Resolved { outcome: Outcome, points: u32, verification: Option<Verification> },
    Finished(VoiceSummary),
}

/// Totals for a voice session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceSummary {
    pub score: u32,
    pub correct_count: u32,
    /// Questions that were resolved
    pub answered: u32,
    pub total: u32,
    pub outcomes: Vec<Outcome>,
    /// Ended early by the cancellation token
    pub cancelled: bool,
    /// One per correct recitation, for the progress tracker
    pub correct_answers: Vec<CorrectAnswer>,
}

/// Race `fut` against cancellation
async fn until_cancelled<F: Future>(token: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = token.cancelled() => None,
        out = fut => Some(out),
    }
}

/// Runs a voice session against speech collaborators
pub struct VoiceQuiz<'a, S, T, A> {
    config: VoiceConfig,
    verifier: &'a Verifier,
    recognizer: S,
    synthesizer: T,
    audio: A,
    cancel_token: CancellationToken,
}

impl<'a, S, T, A> VoiceQuiz<'a, S, T, A>
where
    S: SpeechRecognizer,
    T: SpeechSynthesizer,
    A: AyahAudio,
{
    pub fn new(
        config: VoiceConfig,
        verifier: &'a Verifier,
        recognizer: S,
        synthesizer: T,
        audio: A,
    ) -> Self {
        Self { config, verifier, recognizer, synthesizer, audio, cancel_token: CancellationToken::new() }
    }

    /// Token that stops the whole session
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Play every question and return the totals.
    ///
    /// Cancellation at any await ends the session with what was scored so far.
    pub async fn run(
        &mut self,
        learner_name: &str,
        juz: &[u32],
        questions: &[VoiceQuestion],
        mut on_event: impl FnMut(&VoiceEvent),
    ) -> VoiceSummary {
        let mut summary = VoiceSummary { total: questions.len() as u32, ..VoiceSummary::default() };
        let token = self.cancel_token.clone();

        let Some(greeting) = until_cancelled(&token, self.verifier.greeting(learner_name, juz, &token)).await
        else {
            return self.finish(summary, &mut on_event);
        };
        on_event(&VoiceEvent::Greeting(greeting.clone()));
        if !self.say(&token, &greeting).await {
            return self.finish(summary, &mut on_event);
        }

        for (index, question) in questions.iter().enumerate() {
            on_event(&VoiceEvent::QuestionShown {
                index,
                total: questions.len(),
                question: question.clone(),
            });

            let url = ayah_audio_url(question.surah_number, question.prompt_ayah_number);
            match until_cancelled(&token, self.audio.play(&url)).await {
                None => return self.finish(summary, &mut on_event),
                Some(Err(e)) => tracing::warn!("Skipping ayah audio {}: {}", url, e),
                Some(Ok(())) => {}
            }
            if !self.say(&token, CONTINUE_CUE).await {
                return self.finish(summary, &mut on_event);
            }

            let Some(heard) = self.listen(&token, &mut on_event).await else {
                return self.finish(summary, &mut on_event);
            };

            let (outcome, verification, elapsed) = match heard {
                Some((spoken, elapsed)) => {
                    on_event(&VoiceEvent::Heard(spoken.clone()));
                    let Some(verification) = until_cancelled(
                        &token,
                        self.verifier.verify(&question.answer_text, &spoken, learner_name, &token),
                    )
                    .await
                    else {
                        return self.finish(summary, &mut on_event);
                    };
                    let outcome = if verification.correct { Outcome::Correct } else { Outcome::Incorrect };
                    (outcome, Some(verification), elapsed)
                }
                None => (Outcome::Incorrect, None, 0),
            };

            let points = if outcome == Outcome::Correct { self.config.points_per_correct } else { 0 };
            summary.score += points;
            summary.answered += 1;
            summary.outcomes.push(outcome);
            if outcome == Outcome::Correct {
                summary.correct_count += 1;
                summary.correct_answers.push(CorrectAnswer {
                    surah_number: question.surah_number,
                    surah_name: question.surah_name.clone(),
                    ayah_number: question.answer_ayah_number,
                    response_time_seconds: Some(elapsed),
                });
            }

            let feedback = verification
                .as_ref()
                .map(|v| v.feedback.clone())
                .unwrap_or_else(|| "Hampir tepat, terus semangat ya".to_string());
            on_event(&VoiceEvent::Resolved { outcome, points, verification });
            if !self.say(&token, &feedback).await {
                return self.finish(summary, &mut on_event);
            }
        }

        // A closing line that fails to play does not change the result
        self.say(&token, CLOSING_LINE).await;
        self.finish(summary, &mut on_event)
    }

    /// Speak a line. Returns false only when cancelled.
    async fn say(&mut self, token: &CancellationToken, text: &str) -> bool {
        match until_cancelled(token, self.synthesizer.speak(text)).await {
            None => false,
            Some(Err(e)) => {
                tracing::warn!("Could not speak line: {}", e);
                true
            }
            Some(Ok(())) => true,
        }
    }

    /// Listen with retries. Outer `None` means cancelled, inner `None`
    /// means every attempt failed.
    async fn listen(
        &mut self,
        token: &CancellationToken,
        on_event: &mut impl FnMut(&VoiceEvent),
    ) -> Option<Option<(String, u32)>> {
        let attempts = self.config.max_listen_attempts.max(1);
        for attempt in 1..=attempts {
            on_event(&VoiceEvent::Listening { attempt });
            let started = Instant::now();
            match until_cancelled(token, self.recognizer.listen()).await? {
                Ok(text) if !text.trim().is_empty() => {
                    return Some(Some((text, started.elapsed().as_secs() as u32)));
                }
                Ok(_) => tracing::debug!("Empty recognition on attempt {}", attempt),
                Err(e) => tracing::warn!("Recognition attempt {} failed: {}", attempt, e),
            }
        }
        Some(None)
    }

    fn finish(&self, mut summary: VoiceSummary, on_event: &mut impl FnMut(&VoiceEvent)) -> VoiceSummary {
        summary.cancelled = self.cancel_token.is_cancelled();
        on_event(&VoiceEvent::Finished(summary.clone()));
        summary
    }
}
