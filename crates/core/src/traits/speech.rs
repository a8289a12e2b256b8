//! Speech transcoding trait

use crate::Result;
use async_trait::async_trait;

/// Audio transcription and synthesis.
///
/// The engine never looks at audio encodings; it only consumes and produces
/// plain text. Implementations own format detection.
///
/// # Example
///
/// ```ignore
/// let text = transcoder.transcribe(&bytes, "call-17.ogg").await?;
/// let outcome = engine.handle_utterance(&session_id, &text).await?;
/// let audio = transcoder.synthesize(&outcome.display_text).await?;
/// ```
#[async_trait]
pub trait SpeechTranscoder: Send + Sync + 'static {
    /// Transcribe audio bytes to text
    ///
    /// # Arguments
    /// * `audio` - Encoded audio as received from the channel
    /// * `filename_hint` - Original file name, used to guess the container format
    async fn transcribe(&self, audio: &[u8], filename_hint: &str) -> Result<String>;

    /// Synthesize text to encoded audio
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;

    /// Backend name for logging
    fn name(&self) -> &str;
}
