//! Delivery of a finished report through a chat channel.
//!
//! Reports are escaped for Telegram MarkdownV2 once, then cut into chunks
//! the transport accepts and sent strictly in order.

use std::future::Future;

use thiserror::Error;

/// Upper bound on one outgoing message, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 4096;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Message rejected: {0}")]
    Rejected(String),
}

/// Destination that accepts already escaped text chunks.
pub trait NotificationChannel: Send + Sync {
    fn send(&self, text: &str) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Escapes the characters the report uses that MarkdownV2 reserves, and
/// folds the letters Telegram's parser rejects.
///
/// Formatting markers such as `*` are left alone on purpose; the report
/// relies on them for bold amounts.
pub fn escape_message(message: &str) -> String {
    let mut out = String::with_capacity(message.len() + message.len() / 8);
    for c in message.chars() {
        match c {
            '.' | ')' | '(' | '-' => {
                out.push('\\');
                out.push(c);
            }
            'Ñ' => out.push('N'),
            'ñ' => out.push('n'),
            '\u{FFFD}' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Splits `message` into consecutive slices of at most `max` characters.
///
/// Cuts always land on char boundaries but may separate a `\` from the
/// character it escapes; the count is always `ceil(chars / max)`. An empty
/// message produces no chunks.
pub fn chunk_message(message: &str, max: usize) -> Vec<&str> {
    let max = max.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in message.char_indices() {
        if count == max {
            chunks.push(&message[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < message.len() {
        chunks.push(&message[start..]);
    }
    chunks
}

/// Escapes, chunks and sends reports through a [`NotificationChannel`].
pub struct Dispatcher<C> {
    channel: C,
    max_len: usize,
}

impl<C: NotificationChannel> Dispatcher<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            max_len: MAX_MESSAGE_LENGTH,
        }
    }

    pub fn with_max_length(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Sends `report` and returns the number of chunks delivered.
    ///
    /// Stops at the first failed chunk; later chunks are never sent.
    pub async fn dispatch(&self, report: &str) -> Result<usize, NotifyError> {
        let escaped = escape_message(report);
        let chunks = chunk_message(&escaped, self.max_len);
        let total = chunks.len();

        for (i, chunk) in chunks.into_iter().enumerate() {
            if let Err(e) = self.channel.send(chunk).await {
                tracing::error!("Failed to send chunk {}/{}: {}", i + 1, total, e);
                return Err(e);
            }
            tracing::debug!("Sent chunk {}/{} ({} chars)", i + 1, total, chunk.chars().count());
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<String>>,
        fail_on: Option<usize>,
    }

    impl NotificationChannel for Recorder {
        async fn send(&self, text: &str) -> Result<(), NotifyError> {
            let mut sent = self.sent.lock().unwrap();
            if self.fail_on == Some(sent.len()) {
                return Err(NotifyError::Rejected("Bad Request".into()));
            }
            sent.push(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn escapes_reserved_characters() {
        assert_eq!(escape_message("Total: $1.234,56"), "Total: $1\\.234,56");
        assert_eq!(escape_message("(a-b)"), "\\(a\\-b\\)");
    }

    #[test]
    fn folds_enye_and_drops_replacement_chars() {
        assert_eq!(escape_message("Peña Ñandú"), "Pena Nandú");
        assert_eq!(escape_message("ok\u{FFFD}ay"), "okay");
    }

    #[test]
    fn plain_text_is_unchanged() {
        let text = "Consulta sin multas 🎉 *2*";
        assert_eq!(escape_message(text), text);
        assert_eq!(escape_message(&escape_message(text)), text);
    }

    #[test]
    fn chunking_respects_char_boundaries() {
        let chunks = chunk_message("ñáéíóú", 4);
        assert_eq!(chunks, vec!["ñáéí", "óú"]);
    }

    #[test]
    fn exact_multiple_has_no_trailing_chunk() {
        assert_eq!(chunk_message("abcdef", 3), vec!["abc", "def"]);
        assert_eq!(chunk_message("abc", 3), vec!["abc"]);
    }

    #[test]
    fn cut_can_split_an_escape_pair() {
        let escaped = escape_message("abc.def");
        assert_eq!(chunk_message(&escaped, 4), vec!["abc\\", ".def"]);
    }

    #[test]
    fn empty_message_has_no_chunks() {
        assert!(chunk_message("", MAX_MESSAGE_LENGTH).is_empty());
    }

    #[tokio::test]
    async fn dispatch_sends_chunks_in_order() {
        let dispatcher = Dispatcher::new(Recorder::default()).with_max_length(4);
        let sent = dispatcher.dispatch("(ab) cd").await.unwrap();
        assert_eq!(sent, 3);
        assert_eq!(
            *dispatcher.channel().sent.lock().unwrap(),
            vec!["\\(ab".to_string(), "\\) c".to_string(), "d".to_string()]
        );
    }

    #[tokio::test]
    async fn dispatch_stops_at_first_failure() {
        let channel = Recorder {
            fail_on: Some(1),
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(channel).with_max_length(2);
        let err = dispatcher.dispatch("abcdef").await.unwrap_err();
        assert!(matches!(err, NotifyError::Rejected(_)));
        assert_eq!(*dispatcher.channel().sent.lock().unwrap(), vec!["ab".to_string()]);
    }

    #[tokio::test]
    async fn empty_report_sends_nothing() {
        let dispatcher = Dispatcher::new(Recorder::default());
        assert_eq!(dispatcher.dispatch("").await.unwrap(), 0);
        assert!(dispatcher.channel().sent.lock().unwrap().is_empty());
    }

    mod proptests {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn chunks_rejoin_and_respect_max(s in "\\PC{0,300}", max in 1usize..50) {
                let chunks = chunk_message(&s, max);
                prop_assert_eq!(chunks.concat(), s.clone());
                for chunk in &chunks {
                    prop_assert!(chunk.chars().count() <= max);
                    prop_assert!(!chunk.is_empty());
                }
                let len = s.chars().count();
                prop_assert_eq!(chunks.len(), len.div_ceil(max));
            }

            #[test]
            fn escape_leaves_plain_text_alone(s in "[a-zA-Z0-9 *:$,💰🎉\\n]{0,100}") {
                prop_assert_eq!(escape_message(&s), s);
            }
        }
    }
}
