//! Terminal stand-ins for speech and audio
//!
//! Used by `hafalan voice`: the learner types the recitation and spoken
//! lines are printed.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};

use super::{AyahAudio, SpeechRecognizer, SpeechSynthesizer, VoiceError};

/// Reads one line per recitation
pub struct LineRecognizer<R> {
    reader: R,
}

impl LineRecognizer<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self { reader: BufReader::new(tokio::io::stdin()) }
    }
}

impl<R: AsyncBufRead + Unpin> LineRecognizer<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: AsyncBufRead + Unpin> SpeechRecognizer for LineRecognizer<R> {
    async fn listen(&mut self) -> Result<String, VoiceError> {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Err(VoiceError::RecognitionFailed("input closed".to_string()));
        }
        let line = line.trim();
        if line.is_empty() { Err(VoiceError::NoSpeech) } else { Ok(line.to_string()) }
    }
}

/// Prints what would be spoken
pub struct PrintSynthesizer;

impl SpeechSynthesizer for PrintSynthesizer {
    async fn speak(&mut self, text: &str) -> Result<(), VoiceError> {
        println!("🔊 {text}");
        Ok(())
    }
}

/// Prints the audio URL instead of playing it
pub struct AnnounceAudio;

impl AyahAudio for AnnounceAudio {
    async fn play(&mut self, url: &str) -> Result<(), VoiceError> {
        println!("▶ {url}");
        Ok(())
    }
}
