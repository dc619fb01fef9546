//! Concrete LLM provider clients.

pub mod ollama;
pub mod openai;

pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

use docqa_core::{AppError, AppResult};
use futures::{Stream, StreamExt};

/// Accumulates streamed bytes and yields complete lines.
///
/// HTTP chunk boundaries do not line up with the newline-delimited frames
/// both providers emit, or with UTF-8 character boundaries. Bytes are held
/// until a full line is available and only then decoded.
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Append bytes and drain every complete, non-empty line.
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            if let Some(line) = decode_line(&line) {
                lines.push(line);
            }
        }
        lines
    }

    /// Return whatever is left once the stream has ended.
    pub(crate) fn finish(&mut self) -> Option<String> {
        decode_line(&std::mem::take(&mut self.pending))
    }
}

fn decode_line(bytes: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(bytes);
    let line = line.trim();
    (!line.is_empty()).then(|| line.to_string())
}

/// Turn a streaming HTTP response body into a stream of complete lines.
pub(crate) fn line_stream(
    response: reqwest::Response,
) -> impl Stream<Item = AppResult<String>> + Send {
    let bytes = Box::pin(response.bytes_stream());

    futures::stream::unfold(
        (bytes, LineBuffer::default(), false),
        |(mut bytes, mut buffer, finished)| async move {
            if finished {
                return None;
            }
            match bytes.next().await {
                Some(Ok(chunk)) => {
                    let lines: Vec<AppResult<String>> =
                        buffer.push(&chunk).into_iter().map(Ok).collect();
                    Some((lines, (bytes, buffer, false)))
                }
                Some(Err(e)) => Some((
                    vec![Err(AppError::Provider(format!("Stream error: {}", e)))],
                    (bytes, buffer, true),
                )),
                None => {
                    let tail: Vec<AppResult<String>> = buffer.finish().into_iter().map(Ok).collect();
                    Some((tail, (bytes, buffer, true)))
                }
            }
        },
    )
    .flat_map(futures::stream::iter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_buffer_holds_partial_lines() {
        let mut buffer = LineBuffer::default();
        assert_eq!(buffer.push(b"{\"a\":1}\n{\"b\""), vec!["{\"a\":1}"]);
        assert_eq!(buffer.push(b":2}\n\n"), vec!["{\"b\":2}"]);
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn test_line_buffer_finish_returns_tail() {
        let mut buffer = LineBuffer::default();
        assert!(buffer.push(b"data: [DONE]").is_empty());
        assert_eq!(buffer.finish().as_deref(), Some("data: [DONE]"));
    }

    #[test]
    fn test_line_buffer_keeps_split_multibyte_chars() {
        let line = "{\"response\":\"café 日本語\"}\n".as_bytes();
        let split = line.iter().position(|&b| b == 0xC3).unwrap() + 1;

        let mut buffer = LineBuffer::default();
        assert!(buffer.push(&line[..split]).is_empty());
        assert_eq!(
            buffer.push(&line[split..]),
            vec!["{\"response\":\"café 日本語\"}"]
        );
    }

    #[test]
    fn test_line_buffer_byte_at_a_time() {
        let text = "données: ü\nnext 語\n";
        let mut buffer = LineBuffer::default();
        let mut lines = Vec::new();
        for byte in text.as_bytes() {
            lines.extend(buffer.push(std::slice::from_ref(byte)));
        }
        assert_eq!(lines, vec!["données: ü", "next 語"]);
        assert_eq!(buffer.finish(), None);
    }
}
