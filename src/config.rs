use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Clinsum";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Attached verbatim to every summary-bearing response.
pub const DISCLAIMER: &str =
    "This summary is AI-generated. Consult a healthcare professional before making decisions.";

/// Pages whose trimmed text layer is shorter than this are OCR'd.
pub const SCANNED_PAGE_MIN_CHARS: usize = 10;
/// Upscale factor applied when rasterizing a scanned page for OCR.
pub const SCANNED_PAGE_RENDER_SCALE: f32 = 2.0;

pub const PATIENT_PROMPT_PREFIX: &str = "summarize for patient in plain words: ";
pub const CLINICIAN_PROMPT_PREFIX: &str = "summarize clinically with medical terms: ";
pub const PATIENT_MAX_TOKENS: u32 = 160;
pub const CLINICIAN_MAX_TOKENS: u32 = 200;

/// Training example truncation, in tokens.
pub const TRAIN_MAX_INPUT_TOKENS: usize = 256;
pub const TRAIN_MAX_TARGET_TOKENS: usize = 128;

/// Number of sections echoed back by the upload endpoint.
pub const SECTIONS_PREVIEW_LEN: usize = 5;

const DEFAULT_BIND: &str = "127.0.0.1:8000";
const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
const DEFAULT_BASE_MODEL: &str = "llama3.2:1b";
const DEFAULT_TUNED_MODEL: &str = "clinsum-med";
const DEFAULT_OLLAMA_TIMEOUT_SECS: u64 = 300;
const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "http://localhost:3000",
    "http://127.0.0.1:3000",
];

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "clinsum=info,clinsum_lib=info,tower_http=info"
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub ollama_host: String,
    pub ollama_timeout_secs: u64,
    pub base_model: String,
    pub tuned_model: String,
    pub corpus_path: PathBuf,
    pub tesseract_binary: String,
    pub ocr_lang: String,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    /// Build from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let data_dir = get("CLINSUM_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let bind_raw = get("CLINSUM_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            var: "CLINSUM_BIND",
            reason: format!("{bind_raw}: {e}"),
        })?;

        let ollama_timeout_secs = match get("CLINSUM_OLLAMA_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                var: "CLINSUM_OLLAMA_TIMEOUT_SECS",
                reason: format!("{raw}: {e}"),
            })?,
            None => DEFAULT_OLLAMA_TIMEOUT_SECS,
        };

        let corpus_path = get("CLINSUM_CORPUS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("data").join("medical_qa.json"));

        let cors_origins = match get("CLINSUM_CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Self {
            bind_addr,
            ollama_host: get("OLLAMA_HOST").unwrap_or_else(|| DEFAULT_OLLAMA_HOST.to_string()),
            ollama_timeout_secs,
            base_model: get("CLINSUM_BASE_MODEL").unwrap_or_else(|| DEFAULT_BASE_MODEL.to_string()),
            tuned_model: get("CLINSUM_TUNED_MODEL")
                .unwrap_or_else(|| DEFAULT_TUNED_MODEL.to_string()),
            corpus_path,
            tesseract_binary: get("CLINSUM_TESSERACT").unwrap_or_else(|| "tesseract".to_string()),
            ocr_lang: get("CLINSUM_OCR_LANG").unwrap_or_else(|| "eng".to_string()),
            cors_origins,
            data_dir,
        })
    }

    /// Directory holding one JSON file per ingested document.
    pub fn storage_dir(&self) -> PathBuf {
        self.data_dir.join("storage")
    }

    /// Directory holding the fine-tuned model's manifest and Modelfile.
    pub fn artifact_dir(&self) -> PathBuf {
        self.data_dir.join("models").join(&self.tuned_model)
    }
}

/// ~/Clinsum/ when a home directory is known, else ./clinsum-data
fn default_data_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(APP_NAME),
        None => PathBuf::from("clinsum-data"),
    }
}
