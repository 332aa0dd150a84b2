use super::PoemService;
use crate::models::{PoemRequest, PoemResponse};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

pub struct MockPoemClient {
    poem_responses: Arc<Mutex<Vec<String>>>,
    failure: Arc<Mutex<Option<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockPoemClient {
    pub fn new() -> Self {
        Self {
            poem_responses: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_poem_response(self, poem: String) -> Self {
        self.poem_responses.lock().unwrap().push(poem);
        self
    }

    pub fn with_failure(self, message: String) -> Self {
        *self.failure.lock().unwrap() = Some(message);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockPoemClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PoemService for MockPoemClient {
    async fn generate_poem(&self, request: &PoemRequest) -> Result<PoemResponse> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(Error::Generation(message));
        }

        // The mock still enforces the request contract.
        crate::models::CanonicalImage::from_data_uri(&request.photo_data_uri)
            .map_err(|e| Error::Generation(format!("Invalid photo payload: {}", e)))?;

        let responses = self.poem_responses.lock().unwrap();
        if responses.is_empty() {
            Ok(PoemResponse {
                poem: "A quiet image, rendered into verse".to_string(),
            })
        } else {
            let index = (*count - 1) % responses.len();
            Ok(PoemResponse {
                poem: responses[index].clone(),
            })
        }
    }
}
