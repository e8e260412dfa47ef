use crate::error::{IntegraCarError, Result};
use integracar_common::{EngineConfig, ReferenceData};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuração do usuário (`~/.config/integracar/config.json`)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    /// JSON de referência mesclado sobre o preset do ES
    pub reference: Option<PathBuf>,
    /// Planilha usada quando o comando não recebe arquivo
    pub default_input: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.engine.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.engine.validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| IntegraCarError::Config("diretório home não encontrado".into()))?;
        Ok(home.join(".config").join("integracar").join("config.json"))
    }

    /// Preset do ES com o JSON de referência por cima (o argumento tem prioridade)
    pub fn reference_data(&self, override_path: Option<&Path>) -> Result<ReferenceData> {
        let mut data = ReferenceData::espirito_santo();
        if let Some(path) = override_path.or(self.reference.as_deref()) {
            if !path.exists() {
                return Err(IntegraCarError::FileNotFound(path.display().to_string()));
            }
            let custom = ReferenceData::from_file(path)?;
            data.merge(&custom);
        }
        Ok(data)
    }

    /// Arquivo de entrada: argumento ou o padrão configurado
    pub fn input_path(&self, arg: Option<PathBuf>) -> Result<PathBuf> {
        arg.or_else(|| self.default_input.clone())
            .ok_or(IntegraCarError::MissingInput)
    }

    pub fn set_default_deadline(&mut self, days: i64) -> Result<()> {
        self.engine.default_deadline_days = days;
        self.engine.validate()?;
        Ok(())
    }
}
