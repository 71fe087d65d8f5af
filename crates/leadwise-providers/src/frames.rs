// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoded wire frames and their normalisation into a text stream.

use futures::future::ready;
use futures::stream::{Stream, StreamExt};
use leadwise_core::{LeadwiseError, TextStream};

/// One decoded unit from a provider stream.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Frame {
    Text(String),
    /// The provider signalled the end of the reply.
    Done,
}

/// Ends at the first [`Frame::Done`] and drops empty text.
pub(crate) fn into_text_stream<S>(frames: S) -> TextStream
where
    S: Stream<Item = Result<Frame, LeadwiseError>> + Send + 'static,
{
    let text = frames
        .take_while(|frame| ready(!matches!(frame, Ok(Frame::Done))))
        .filter_map(|frame| {
            ready(match frame {
                Ok(Frame::Text(text)) if text.is_empty() => None,
                Ok(Frame::Text(text)) => Some(Ok(text)),
                Ok(Frame::Done) => None,
                Err(e) => Some(Err(e)),
            })
        });
    Box::pin(text)
}
