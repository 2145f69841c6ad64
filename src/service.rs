use async_trait::async_trait;

use crate::error::Result;
use crate::prompt::AnswerRequest;

/// A hosted model that answers one packaged question with one completion.
///
/// Implementations make a single round trip: no retries, no streaming and no
/// memory of earlier requests. Every remote failure comes back as an error the
/// caller can show to the user.
#[async_trait]
pub trait AnswerService {
    async fn ask(&self, request: &AnswerRequest) -> Result<String>;
}

#[async_trait]
impl<T> AnswerService for &T
where
    T: AnswerService + Sync + ?Sized,
{
    async fn ask(&self, request: &AnswerRequest) -> Result<String> {
        (**self).ask(request).await
    }
}
