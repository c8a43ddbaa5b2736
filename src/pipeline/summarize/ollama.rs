//! Ollama-backed summarization model.
//!
//! Fine-tuning derives a named Ollama model from the base model whose
//! conversation history holds one user/assistant exchange per training
//! example. The Modelfile equivalent and a manifest are persisted so the
//! next start can load the tuned model directly.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::artifact::{read_manifest, write_artifact, ArtifactManifest};
use super::backend::{ModelBackend, ModelHandle, ModelOrigin};
use super::corpus::TrainingExample;
use super::SummarizeError;

/// Fixed sampling seed; with temperature 0 and top_k 1 decoding is greedy.
const DECODING_SEED: u64 = 42;

const TUNED_SYSTEM_PROMPT: &str = "You summarize medical text. Follow the instruction at the \
start of each request and answer with the summary only.";

/// Ollama HTTP client for summarization.
pub struct OllamaBackend {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
    base_model: String,
    tuned_model: String,
}

impl OllamaBackend {
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        base_model: &str,
        tuned_model: &str,
    ) -> Result<Self, SummarizeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SummarizeError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
            base_model: base_model.to_string(),
            tuned_model: tuned_model.to_string(),
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> SummarizeError {
        if e.is_connect() {
            SummarizeError::OllamaConnection(self.base_url.clone())
        } else if e.is_timeout() {
            SummarizeError::HttpClient(format!("Request timed out after {}s", self.timeout_secs))
        } else {
            SummarizeError::HttpClient(e.to_string())
        }
    }

    fn check_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, SummarizeError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(SummarizeError::OllamaError {
            status: status.as_u16(),
            body,
        })
    }

    fn post<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::blocking::Response, SummarizeError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| self.map_send_error(e))?;
        Self::check_status(response)
    }

    /// Names of all locally available models.
    pub fn list_models(&self) -> Result<Vec<String>, SummarizeError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.map_send_error(e))?;
        let parsed: TagsResponse = Self::check_status(response)?
            .json()
            .map_err(|e| SummarizeError::ResponseParsing(e.to_string()))?;
        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }

    pub fn is_model_available(&self, model: &str) -> Result<bool, SummarizeError> {
        Ok(self
            .list_models()?
            .iter()
            .any(|listed| model_matches(listed, model)))
    }

    fn pull(&self, model: &str) -> Result<(), SummarizeError> {
        tracing::info!(model, "Pulling model from Ollama registry");
        self.post(
            "/api/pull",
            &PullRequest {
                model,
                stream: false,
            },
        )?;
        Ok(())
    }

    fn ensure_base_model(&self) -> Result<(), SummarizeError> {
        if self.is_model_available(&self.base_model)? {
            return Ok(());
        }
        self.pull(&self.base_model)?;
        if self.is_model_available(&self.base_model)? {
            Ok(())
        } else {
            Err(SummarizeError::ModelMissing(self.base_model.clone()))
        }
    }
}

/// `llama3.2` matches `llama3.2:latest`; a tagged name must match exactly.
fn model_matches(listed: &str, wanted: &str) -> bool {
    if listed == wanted {
        return true;
    }
    match listed.split_once(':') {
        Some((name, tag)) if !wanted.contains(':') => name == wanted && tag == "latest",
        _ => false,
    }
}

/// Modelfile equivalent of a fine-tuning request, kept for reproduction
/// with `ollama create -f Modelfile`.
pub fn render_modelfile(base_model: &str, examples: &[TrainingExample]) -> String {
    let mut out = format!("FROM {base_model}\n");
    out.push_str("PARAMETER temperature 0\n");
    out.push_str("PARAMETER top_k 1\n");
    out.push_str(&format!("PARAMETER seed {DECODING_SEED}\n"));
    out.push_str(&format!("SYSTEM \"\"\"{TUNED_SYSTEM_PROMPT}\"\"\"\n"));
    for example in examples {
        out.push_str(&format!("MESSAGE user \"\"\"{}\"\"\"\n", example.input));
        out.push_str(&format!("MESSAGE assistant \"\"\"{}\"\"\"\n", example.target));
    }
    out
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_k: u32,
    seed: u64,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct CreateRequest<'a> {
    model: &'a str,
    from: &'a str,
    system: &'a str,
    messages: Vec<ChatMessage<'a>>,
    parameters: CreateParameters,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct CreateParameters {
    temperature: f32,
    top_k: u32,
    seed: u64,
}

#[derive(Serialize)]
struct PullRequest<'a> {
    model: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<TagsModel>,
}

#[derive(Deserialize)]
struct TagsModel {
    name: String,
}

impl ModelBackend for OllamaBackend {
    fn load_tuned(&self, artifact_dir: &Path) -> Result<ModelHandle, SummarizeError> {
        let manifest = read_manifest(artifact_dir)?;
        if !self.is_model_available(&manifest.model)? {
            return Err(SummarizeError::ModelMissing(manifest.model));
        }
        Ok(ModelHandle {
            name: manifest.model,
            origin: ModelOrigin::Tuned,
        })
    }

    fn fine_tune(
        &self,
        examples: &[TrainingExample],
        artifact_dir: &Path,
    ) -> Result<ModelHandle, SummarizeError> {
        self.ensure_base_model()?;

        let messages = examples
            .iter()
            .flat_map(|ex| {
                [
                    ChatMessage {
                        role: "user",
                        content: ex.input.as_str(),
                    },
                    ChatMessage {
                        role: "assistant",
                        content: ex.target.as_str(),
                    },
                ]
            })
            .collect();

        tracing::info!(
            model = %self.tuned_model,
            base = %self.base_model,
            examples = examples.len(),
            "Creating tuned model"
        );
        self.post(
            "/api/create",
            &CreateRequest {
                model: &self.tuned_model,
                from: &self.base_model,
                system: TUNED_SYSTEM_PROMPT,
                messages,
                parameters: CreateParameters {
                    temperature: 0.0,
                    top_k: 1,
                    seed: DECODING_SEED,
                },
                stream: false,
            },
        )?;

        let manifest = ArtifactManifest {
            model: self.tuned_model.clone(),
            base_model: self.base_model.clone(),
            examples: examples.len(),
            created_at: Utc::now(),
        };
        let modelfile = render_modelfile(&self.base_model, examples);
        write_artifact(artifact_dir, &manifest, Some(&modelfile))?;

        Ok(ModelHandle {
            name: manifest.model,
            origin: ModelOrigin::Trained,
        })
    }

    fn load_base(&self) -> Result<ModelHandle, SummarizeError> {
        self.ensure_base_model()?;
        Ok(ModelHandle {
            name: self.base_model.clone(),
            origin: ModelOrigin::Base,
        })
    }

    fn generate(
        &self,
        model: &ModelHandle,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, SummarizeError> {
        let parsed: GenerateResponse = self
            .post(
                "/api/generate",
                &GenerateRequest {
                    model: &model.name,
                    prompt,
                    stream: false,
                    options: GenerateOptions {
                        temperature: 0.0,
                        top_k: 1,
                        seed: DECODING_SEED,
                        num_predict: max_tokens,
                    },
                },
            )?
            .json()
            .map_err(|e| SummarizeError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response.trim().to_string())
    }
}
