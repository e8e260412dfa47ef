use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntegraCarError {
    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Arquivo não encontrado: {0}")]
    FileNotFound(String),

    #[error("Formato não suportado: {0} (use .csv, .xlsx, .xls ou .ods)")]
    UnsupportedFormat(String),

    #[error("Nenhuma planilha de entrada. Informe o arquivo ou use `integracar config --set-input ARQUIVO`")]
    MissingInput,

    #[error("Erro ao ler CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Erro ao ler planilha: {0}")]
    Spreadsheet(String),

    #[error("Data inválida: {0}")]
    InvalidDate(String),

    #[error("Erro de JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] integracar_common::Error),
}

pub type Result<T> = std::result::Result<T, IntegraCarError>;
