//! HTTP knowledge connectors
//!
//! One typed response schema per endpoint; every lookup is best-effort and
//! collapses to an empty string on request or parse failure.

use async_trait::async_trait;

use crate::config::ConnectorConfig;

use super::Knowledge;

/// Instant-answer response (DuckDuckGo-style)
#[derive(serde::Deserialize)]
struct InstantAnswer {
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "Answer", default)]
    answer: String,
    #[serde(rename = "Definition", default)]
    definition: String,
}

/// Encyclopedia page summary (Wikipedia REST)
#[derive(serde::Deserialize)]
struct PageSummary {
    #[serde(default)]
    extract: String,
}

/// Random joke with setup and punchline
#[derive(serde::Deserialize)]
struct JokeResponse {
    setup: String,
    punchline: String,
}

/// Dictionary entry; only the first definition of the first meaning is used
#[derive(serde::Deserialize)]
struct DictionaryEntry {
    meanings: Vec<DictionaryMeaning>,
}

#[derive(serde::Deserialize)]
struct DictionaryMeaning {
    definitions: Vec<DictionaryDefinition>,
}

#[derive(serde::Deserialize)]
struct DictionaryDefinition {
    definition: String,
}

/// Current-weather response (open-meteo)
#[derive(serde::Deserialize)]
struct WeatherResponse {
    current_weather: CurrentWeather,
}

#[derive(serde::Deserialize)]
struct CurrentWeather {
    temperature: f64,
}

/// Knowledge lookups over HTTP
pub struct HttpKnowledge {
    client: reqwest::Client,
    config: ConnectorConfig,
}

impl HttpKnowledge {
    /// Create a connector set from endpoint configuration
    #[must_use]
    pub fn new(config: ConnectorConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Option<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| tracing::debug!(url, error = %e, "connector request failed"))
            .ok()?;

        if !response.status().is_success() {
            tracing::debug!(url, status = %response.status(), "connector non-success status");
            return None;
        }

        response
            .json()
            .await
            .inspect_err(|e| tracing::debug!(url, error = %e, "connector parse failed"))
            .ok()
    }
}

#[async_trait]
impl Knowledge for HttpKnowledge {
    async fn joke(&self) -> String {
        let Some(joke) = self.fetch_json::<JokeResponse>(&self.config.joke_url).await else {
            return String::new();
        };
        format!("{} ... {}", joke.setup, joke.punchline)
    }

    async fn definition(&self, word: &str) -> String {
        let url = format!(
            "{}/{}",
            self.config.dictionary_url,
            urlencoding::encode(word)
        );
        self.fetch_json::<Vec<DictionaryEntry>>(&url)
            .await
            .and_then(|entries| {
                let entry = entries.into_iter().next()?;
                let meaning = entry.meanings.into_iter().next()?;
                let definition = meaning.definitions.into_iter().next()?;
                Some(definition.definition)
            })
            .unwrap_or_default()
    }

    async fn weather(&self) -> String {
        let url = format!(
            "{}?latitude={}&longitude={}&current_weather=true",
            self.config.weather_url, self.config.latitude, self.config.longitude
        );
        self.fetch_json::<WeatherResponse>(&url)
            .await
            .map(|w| {
                format!(
                    "The current temperature is {}\u{b0}C.",
                    w.current_weather.temperature
                )
            })
            .unwrap_or_default()
    }

    async fn answer(&self, query: &str) -> String {
        let url = format!(
            "{}?q={}&format=json",
            self.config.answer_url,
            urlencoding::encode(query)
        );
        self.fetch_json::<InstantAnswer>(&url)
            .await
            .map(|data| {
                // First non-empty of abstract, answer, definition
                [data.abstract_text, data.answer, data.definition]
                    .into_iter()
                    .find(|field| !field.is_empty())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    async fn summary(&self, query: &str) -> String {
        let url = format!(
            "{}/{}",
            self.config.summary_url,
            urlencoding::encode(query)
        );
        self.fetch_json::<PageSummary>(&url)
            .await
            .map(|page| page.extract)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instant_answer_field_priority() {
        let data: InstantAnswer = serde_json::from_str(
            r#"{"AbstractText": "", "Answer": "42", "Definition": "ignored"}"#,
        )
        .unwrap();

        let best = [data.abstract_text, data.answer, data.definition]
            .into_iter()
            .find(|field| !field.is_empty())
            .unwrap_or_default();
        assert_eq!(best, "42");
    }

    #[test]
    fn instant_answer_tolerates_missing_fields() {
        let data: InstantAnswer = serde_json::from_str("{}").unwrap();
        assert!(data.abstract_text.is_empty());
        assert!(data.answer.is_empty());
        assert!(data.definition.is_empty());
    }

    #[test]
    fn dictionary_takes_first_of_first_of_first() {
        let entries: Vec<DictionaryEntry> = serde_json::from_str(
            r#"[
                {"meanings": [
                    {"definitions": [
                        {"definition": "primary"},
                        {"definition": "secondary"}
                    ]},
                    {"definitions": [{"definition": "other meaning"}]}
                ]},
                {"meanings": [{"definitions": [{"definition": "other entry"}]}]}
            ]"#,
        )
        .unwrap();

        let first = entries
            .into_iter()
            .next()
            .and_then(|e| e.meanings.into_iter().next())
            .and_then(|m| m.definitions.into_iter().next())
            .map(|d| d.definition)
            .unwrap();
        assert_eq!(first, "primary");
    }

    #[test]
    fn joke_joins_setup_and_punchline() {
        let joke: JokeResponse = serde_json::from_str(
            r#"{"setup": "Why did the chicken cross the road?", "punchline": "To get to the other side."}"#,
        )
        .unwrap();
        let text = format!("{} ... {}", joke.setup, joke.punchline);
        assert_eq!(
            text,
            "Why did the chicken cross the road? ... To get to the other side."
        );
    }

    #[test]
    fn weather_formats_temperature() {
        let data: WeatherResponse =
            serde_json::from_str(r#"{"current_weather": {"temperature": 27.5}}"#).unwrap();
        let text = format!(
            "The current temperature is {}\u{b0}C.",
            data.current_weather.temperature
        );
        assert_eq!(text, "The current temperature is 27.5°C.");
    }
}
