//! Oracle capability: free-text questions delegated to a hosted language
//! model. The model's reply is opaque text passed through to the user.

#[cfg(feature = "http")]
use crate::config::OracleConfig;
#[cfg(feature = "http")]
use color_eyre::eyre::eyre;
use color_eyre::Result;

/// System persona sent with every request.
pub const SYSTEM_PROMPT: &str =
    "Ты эксперт по анализу опросов, отвечай кратко, по делу, дружелюбно, на русском.";

/// Assembles the user prompt: the statistics digest stands in for the raw
/// rows, followed by the question and the structured-answer instructions.
pub fn build_prompt(question: &str, digest: &str) -> String {
    format!(
        "Ты — эксперт по анализу опросов. Вот статистика по данным:{}\n\
         Пользователь спрашивает: {}\n\n\
         Отвечай структурировано и дружелюбно, используй эмодзи для каждого смыслового блока:\n\
         - 📝 Вывод\n\
         - 📊 Ключевые цифры\n\
         - 🔍 Причины/объяснения\n\
         - 💡 Рекомендации\n\
         - 🚀 Следующий шаг\n\
         Если вопрос сравнения — сравни группы с эмодзи. Если вопрос анализа — дай причины и \
         советы. Если не хватает данных — честно скажи. Всегда предлагай следующий шаг для \
         пользователя. Пиши кратко, понятно, по делу, на русском языке.",
        digest, question
    )
}

/// Conversational capability injected into the assistant. A failed call is a
/// terminal per-request failure; the core never retries.
pub trait Oracle {
    fn ask(&self, question: &str, digest: &str) -> Result<String>;
}

/// Placeholder used when no API key is configured; every call fails and the
/// assistant turns that into its friendly failure message.
pub struct UnconfiguredOracle;

impl Oracle for UnconfiguredOracle {
    fn ask(&self, _question: &str, _digest: &str) -> Result<String> {
        Err(color_eyre::eyre::eyre!("Oracle API key is not configured"))
    }
}

/// Client for an OpenAI-compatible chat completions endpoint.
#[cfg(feature = "http")]
pub struct OpenAiOracle {
    api_key: String,
    config: OracleConfig,
}

#[cfg(feature = "http")]
impl OpenAiOracle {
    pub fn new(api_key: impl Into<String>, config: OracleConfig) -> Self {
        Self {
            api_key: api_key.into(),
            config,
        }
    }
}

#[cfg(feature = "http")]
impl Oracle for OpenAiOracle {
    fn ask(&self, question: &str, digest: &str) -> Result<String> {
        let payload = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": build_prompt(question, digest)},
            ],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
        });
        let response: serde_json::Value = ureq::post(&self.config.endpoint)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(payload)
            .map_err(|e| eyre!("Oracle request failed: {}", e))?
            .into_json()?;
        response
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| eyre!("Oracle reply carried no content"))
    }
}
