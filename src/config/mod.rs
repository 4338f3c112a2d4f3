// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 SpyEdge contributors

//! Configuration management for SpyEdge

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Collaborator (generative AI) endpoint configuration
    pub collaborator: CollaboratorConfig,

    /// Mining defaults
    #[serde(default)]
    pub search: SearchConfig,

    /// Prompt templates
    #[serde(default)]
    pub prompts: PromptConfig,

    /// Web UI settings
    #[serde(default)]
    pub web: WebConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CollaboratorConfig {
    pub api_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key. The key itself
    /// never lives in the config file.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SearchConfig {
    /// Implicit query used when the search box is empty (discovery mode).
    #[serde(default = "default_discovery_query")]
    pub discovery_query: String,
    /// How many ads to request per mining run.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    /// Likes above this mark an ad as a winner regardless of trend.
    #[serde(default = "default_winner_likes")]
    pub winner_likes_threshold: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PromptConfig {
    /// Discovery-mode mining prompt. Placeholders: `{count}`, `{region}`.
    pub discovery: String,
    /// Keyword mining prompt. Placeholders: `{query}`, `{region}`.
    pub refine: String,
    /// Per-ad analysis prompt. Placeholders: `{title}`, `{clicks}`.
    pub analysis: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExportConfig {
    #[serde(default = "default_export_dir")]
    pub dir: String,
}

// Default value functions
fn default_api_key_env() -> String { "GEMINI_API_KEY".to_string() }
fn default_timeout() -> u64 { 120 }
fn default_discovery_query() -> String { "Produtos dropshipping virais".to_string() }
fn default_batch_size() -> u32 { 15 }
fn default_winner_likes() -> u64 { 800 }
fn default_web_host() -> String { "127.0.0.1".to_string() }
fn default_web_port() -> u16 { 8080 }
fn default_export_dir() -> String { "exports".to_string() }

const PROMPT_CRITERIA: &str = "\n\nCRITÉRIOS:\n\
    1. \"sourceUrl\": Link da Ad Library ou Loja.\n\
    2. \"thumbnail\": Imagem do criativo.\n\
    3. Estime os cliques com base no engajamento (Geralmente 10x a 20x o número \
    de likes para anúncios vencedores).";

fn default_discovery_prompt() -> String {
    format!(
        "AJA COMO UM INVESTIGADOR DE ADS DE ELITE.\n\
         OBJETIVO: Encontrar anúncios REAIS e seus links de origem na Biblioteca de Anúncios.\n\n\
         Busque {{count}} anúncios de dropshipping vencedores em alta agora em {{region}}.{}",
        PROMPT_CRITERIA
    )
}

fn default_refine_prompt() -> String {
    format!(
        "AJA COMO UM INVESTIGADOR DE ADS DE ELITE.\n\
         OBJETIVO: Encontrar anúncios REAIS e seus links de origem na Biblioteca de Anúncios.\n\n\
         Busque anúncios específicos para o termo: \"{{query}}\" em {{region}}.{}",
        PROMPT_CRITERIA
    )
}

fn default_analysis_prompt() -> String {
    "Analise o anúncio: {title}. Cliques estimados: {clicks}. \
     Crie uma estratégia para duplicar o CTR."
        .to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            collaborator: CollaboratorConfig::default(),
            search: SearchConfig::default(),
            prompts: PromptConfig::default(),
            web: WebConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            api_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-3-pro-preview".to_string(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            discovery_query: default_discovery_query(),
            batch_size: default_batch_size(),
            winner_likes_threshold: default_winner_likes(),
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            discovery: default_discovery_prompt(),
            refine: default_refine_prompt(),
            analysis: default_analysis_prompt(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: default_export_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::SpyEdgeError::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Read the collaborator API key from the configured environment variable.
    pub fn api_key(&self) -> crate::Result<String> {
        std::env::var(&self.collaborator.api_key_env).map_err(|_| {
            crate::SpyEdgeError::Config(format!(
                "API key environment variable '{}' is not set",
                self.collaborator.api_key_env
            ))
        })
    }
}
