//! In-memory backend for tests.

use crate::error::{Result, StudioError};
use crate::model::{ContentPart, ImageRequest, ModelBackend, TextRequest};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

type Scripted<T> = (Duration, Result<T>);

/// Replays scripted replies and records every request it sees.
#[derive(Default)]
pub(crate) struct MockBackend {
    text_replies: Mutex<VecDeque<Scripted<String>>>,
    image_replies: Mutex<VecDeque<Scripted<Vec<ContentPart>>>>,
    pub(crate) text_calls: Mutex<Vec<TextRequest>>,
    pub(crate) image_calls: Mutex<Vec<ImageRequest>>,
}

impl MockBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_text(self, reply: Result<String>) -> Self {
        self.text_replies
            .lock()
            .unwrap()
            .push_back((Duration::ZERO, reply));
        self
    }

    pub(crate) fn with_image(self, reply: Result<Vec<ContentPart>>) -> Self {
        self.with_delayed_image(Duration::ZERO, reply)
    }

    pub(crate) fn with_delayed_image(
        self,
        delay: Duration,
        reply: Result<Vec<ContentPart>>,
    ) -> Self {
        self.image_replies.lock().unwrap().push_back((delay, reply));
        self
    }

    pub(crate) fn text_call_count(&self) -> usize {
        self.text_calls.lock().unwrap().len()
    }

    pub(crate) fn image_call_count(&self) -> usize {
        self.image_calls.lock().unwrap().len()
    }

    pub(crate) fn last_text_call(&self) -> TextRequest {
        self.text_calls.lock().unwrap().last().cloned().unwrap()
    }

    pub(crate) fn last_image_call(&self) -> ImageRequest {
        self.image_calls.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl ModelBackend for MockBackend {
    async fn generate_text(&self, request: &TextRequest) -> Result<String> {
        self.text_calls.lock().unwrap().push(request.clone());
        let next = self.text_replies.lock().unwrap().pop_front();
        let (delay, reply) = next.unwrap_or_else(|| {
            (
                Duration::ZERO,
                Err(StudioError::UnexpectedResponse("no scripted text reply".into())),
            )
        });
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply
    }

    async fn generate_image(&self, request: &ImageRequest) -> Result<Vec<ContentPart>> {
        self.image_calls.lock().unwrap().push(request.clone());
        let next = self.image_replies.lock().unwrap().pop_front();
        let (delay, reply) = next.unwrap_or_else(|| {
            (
                Duration::ZERO,
                Err(StudioError::UnexpectedResponse("no scripted image reply".into())),
            )
        });
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A one-part image reply.
pub(crate) fn png_reply(data: &str) -> Result<Vec<ContentPart>> {
    Ok(vec![ContentPart::inline("image/png", data)])
}
