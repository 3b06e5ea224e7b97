//! Configuração do Consentor carregada a partir de `consentor.toml`.
//!
//! A struct [`ConsentorConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `CONSENTOR_STORE` tem precedência sobre o arquivo.

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

/// Configuração de nível superior carregada de `consentor.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsentorConfig {
    /// Caminho do arquivo JSON que armazena os consentimentos.
    #[serde(default = "default_store_path")]
    pub store_path: String,

    /// Minutos até a expiração de um consentimento recém-criado.
    #[serde(default = "default_ttl_minutes")]
    pub default_ttl_minutes: i64,

    /// Capacidade do canal de entrada de eventos.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

// Valor padrão para o arquivo de armazenamento: "consents.json".
fn default_store_path() -> String {
    "consents.json".to_string()
}

// Valor padrão para a expiração: 1 minuto.
fn default_ttl_minutes() -> i64 {
    1
}

// Valor padrão para a capacidade do canal: 64.
fn default_queue_capacity() -> usize {
    64
}

impl Default for ConsentorConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            default_ttl_minutes: default_ttl_minutes(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl ConsentorConfig {
    /// Carrega a configuração de `consentor.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self> {
        let path = Path::new("consentor.toml");
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<ConsentorConfig>(&contents)?
        } else {
            Self::default()
        };

        // Variável de ambiente tem precedência sobre o arquivo de configuração.
        if let Ok(store) = std::env::var("CONSENTOR_STORE")
            && !store.is_empty()
        {
            config.store_path = store;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = ConsentorConfig::default();
        assert_eq!(config.store_path, "consents.json");
        assert_eq!(config.default_ttl_minutes, 1);
        assert_eq!(config.queue_capacity, 64);
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            store_path = "/var/lib/consentor/consents.json"
            default_ttl_minutes = 15
        "#;
        let config: ConsentorConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.store_path, "/var/lib/consentor/consents.json");
        assert_eq!(config.default_ttl_minutes, 15);
        assert_eq!(config.queue_capacity, 64);
    }

    #[test]
    fn load_falls_back_to_defaults() {
        // No ambiente de teste, tipicamente não há consentor.toml no diretório de trabalho.
        let config = ConsentorConfig::load().unwrap();
        assert_eq!(config.default_ttl_minutes, 1);
    }
}
