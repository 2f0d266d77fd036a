use std::sync::Arc;

use crate::llm::{Generator, LlmError};

/// Reply the model is told to give when the context lacks the answer.
pub const NOT_IN_CONTEXT: &str = "answer is not available in the context";

/// Builds the grounded prompt and asks the generator for an answer.
pub struct AnswerGenerator {
    generator: Arc<dyn Generator>,
    temperature: f64,
}

impl AnswerGenerator {
    pub fn new(generator: Arc<dyn Generator>, temperature: f64) -> Self {
        Self {
            generator,
            temperature,
        }
    }

    pub async fn answer(&self, question: &str, chunks: &[String]) -> Result<String, LlmError> {
        let prompt = build_prompt(question, chunks);
        tracing::debug!(
            model = self.generator.model(),
            context_chunks = chunks.len(),
            prompt_chars = prompt.chars().count(),
            "Generating answer"
        );
        self.generator.generate(&prompt, self.temperature).await
    }
}

pub fn build_prompt(question: &str, chunks: &[String]) -> String {
    let context = chunks.join("\n\n");
    format!(
        "Answer the question as detailed as possible from the provided context, \
make sure to provide all the details. If the answer is not in the provided context, \
just say, \"{}\". Don't provide the wrong answer.\n\n\
Context:\n{}\n\n\
Question:\n{}\n\n\
Answer:",
        NOT_IN_CONTEXT, context, question
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::testing::EchoGenerator;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingGenerator {
        temperatures: Mutex<Vec<f64>>,
    }

    #[async_trait]
    impl Generator for RecordingGenerator {
        fn model(&self) -> &str {
            "recording"
        }

        async fn generate(&self, _prompt: &str, temperature: f64) -> Result<String, LlmError> {
            self.temperatures.lock().unwrap().push(temperature);
            Ok("ok".to_string())
        }
    }

    #[test]
    fn prompt_layout() {
        let prompt = build_prompt("Who?", &["first".to_string(), "second".to_string()]);
        assert!(prompt.starts_with("Answer the question as detailed as possible"));
        assert!(prompt.contains("just say, \"answer is not available in the context\"."));
        assert!(prompt.ends_with("Context:\nfirst\n\nsecond\n\nQuestion:\nWho?\n\nAnswer:"));
    }

    #[tokio::test]
    async fn answer_passes_prompt_to_generator() {
        let answers = AnswerGenerator::new(Arc::new(EchoGenerator), 0.7);
        let chunks = vec!["The launch is on Friday.".to_string()];

        let reply = answers.answer("When is the launch?", &chunks).await.unwrap();
        assert!(reply.contains("Context:\nThe launch is on Friday."));
        assert!(reply.contains("Question:\nWhen is the launch?"));
    }

    #[tokio::test]
    async fn uses_configured_temperature() {
        let recorder = Arc::new(RecordingGenerator {
            temperatures: Mutex::new(Vec::new()),
        });
        let answers = AnswerGenerator::new(recorder.clone(), 0.3);

        answers.answer("q", &[]).await.unwrap();
        assert_eq!(*recorder.temperatures.lock().unwrap(), vec![0.3]);
    }
}
