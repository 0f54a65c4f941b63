use super::ClassificationOracle;
use crate::config::OracleConfig;
use crate::error::Error;
use crate::model::{Classification, Item, ItemKind};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

const STANDARD_CATEGORIES: &[&str] = &[
    "Sims/Custom_Content",
    "Sims/Mods",
    "Sims/Saves",
    "3D_Assets/Models",
    "3D_Assets/Prints",
    "Documents/Taxes",
    "Documents/Statements",
    "Software",
    "Archives",
    "Images",
    "Torrents",
    "Contacts",
    "Misc",
];

/// Classifies batches through the Gemini `generateContent` REST API with a
/// JSON response schema.
pub struct GeminiOracle {
    client: Client,
    url: String,
    api_key: String,
}

/// Wire shape of one item in the prompt.
#[derive(Debug, Serialize)]
struct PromptItem<'a> {
    id: u64,
    filename: &'a str,
    kind: ItemKind,
    #[serde(skip_serializing_if = "str::is_empty")]
    extension: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiOracle {
    pub fn new(config: &OracleConfig) -> Result<Self, Error> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            Error::Other("no API key configured; set GEMINI_API_KEY or oracle.api_key".to_string())
        })?;
        let client = Client::builder().timeout(config.timeout()).build()?;
        let url = format!(
            "{}/models/{}:generateContent",
            config.endpoint.trim_end_matches('/'),
            config.model
        );
        Ok(Self {
            client,
            url,
            api_key,
        })
    }
}

impl ClassificationOracle for GeminiOracle {
    fn classify(&self, batch: &[Item]) -> Result<Vec<Classification>, Error> {
        let body = request_body(&build_prompt(batch)?);

        info!("Sending {} items to Gemini...", batch.len());
        let response: GenerateResponse = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;
        info!("Received response from Gemini.");

        let text = response_text(response)?;
        parse_classifications(&text)
    }
}

fn build_prompt(batch: &[Item]) -> Result<String, Error> {
    let records: Vec<PromptItem<'_>> = batch
        .iter()
        .map(|item| PromptItem {
            id: item.id,
            filename: &item.name,
            kind: item.kind,
            extension: &item.extension,
        })
        .collect();

    let categories = STANDARD_CATEGORIES
        .iter()
        .map(|c| format!("- {}", c))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(format!(
        "You are an expert file organizer. Analyze the following list of file and folder names \
         and extensions. For each entry, determine a concise, descriptive folder path. \
         The path can be one or two levels deep, using a forward slash (/) as a separator \
         (e.g., 'Sims/Mods', 'Documents/Taxes'). Use the following standardized categories where \
         appropriate, but you can also create new, fitting categories if needed:\n{}\n\
         Return ONLY a valid JSON list matching the provided schema, echoing each id and filename. \
         Entries to categorize:\n{}",
        categories,
        serde_json::to_string(&records)?
    ))
}

fn request_body(prompt: &str) -> serde_json::Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "INTEGER", "description": "The unique identifier for the entry." },
                        "filename": { "type": "STRING", "description": "The exact original name." },
                        "category": {
                            "type": "STRING",
                            "description": "A folder path, up to two levels deep (e.g., 'Sims/Mods', 'Documents')."
                        }
                    },
                    "required": ["id", "filename", "category"]
                }
            }
        }
    })
}

fn response_text(response: GenerateResponse) -> Result<String, Error> {
    response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .find_map(|part| part.text)
        .ok_or_else(|| Error::Oracle("response contained no candidate text".to_string()))
}

/// Parse the model's JSON array, tolerating a surrounding markdown code fence.
fn parse_classifications(text: &str) -> Result<Vec<Classification>, Error> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    let results: Vec<Classification> = serde_json::from_str(body.trim())?;
    debug!("Parsed {} classifications", results.len());
    Ok(results)
}
