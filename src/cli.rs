use crate::export::ExportFormat;
use clap::{Args, Parser, Subcommand};
use integracar_common::{Dimension, RecordFilter, StatusClass};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "integracar")]
#[command(about = "Normalização e classificação de processos CAR", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log detalhado (colunas detectadas, correspondências aproximadas)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON de referência mesclado sobre o preset do ES
    #[arg(long, global = true)]
    pub reference: Option<PathBuf>,

    /// Data de referência para o prazo (padrão: agora)
    #[arg(long, global = true)]
    pub today: Option<String>,
}

/// Filtros comuns aos relatórios
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Campus (aceita variações: "campus alegre", "ALEGRE")
    #[arg(long)]
    pub campus: Option<String>,

    /// Município
    #[arg(long)]
    pub municipio: Option<String>,

    /// Avaliador
    #[arg(long)]
    pub avaliador: Option<String>,

    /// Classe do status (concluido/em_analise/pendente/outros/indefinido)
    #[arg(long)]
    pub status: Option<StatusClass>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> RecordFilter {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        RecordFilter {
            campus: non_empty(&self.campus),
            municipio: non_empty(&self.municipio),
            avaliador: non_empty(&self.avaliador),
            status_class: self.status,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mostra o papel detectado para cada coluna
    Columns {
        /// Planilha (CSV/XLSX); padrão: config --set-input
        input: Option<PathBuf>,
    },

    /// Indicadores do recorte: classes, meta, rankings
    Summary {
        input: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Itens por ranking (padrão: configuração)
        #[arg(long)]
        top: Option<usize>,

        /// Saída em JSON
        #[arg(long)]
        json: bool,
    },

    /// Tabela dimensão × status
    Pivot {
        input: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Dimensão das linhas (campus/municipio/avaliador)
        #[arg(short, long, default_value = "campus")]
        dimension: Dimension,

        /// Quantidade de linhas
        #[arg(long)]
        top: Option<usize>,

        /// Colunas por classe em vez dos rótulos de status
        #[arg(long)]
        by_class: bool,
    },

    /// Processos em aberto perto do prazo ou atrasados
    Pendencias {
        input: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Saída em JSON
        #[arg(long)]
        json: bool,
    },

    /// Pontos por município com centroides
    Mapa {
        input: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Saída em JSON
        #[arg(long)]
        json: bool,
    },

    /// Exporta o recorte filtrado
    Export {
        input: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Formato (csv/xlsx)
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// Arquivo ou diretório de saída
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Inclui a aba de pivô no XLSX
        #[arg(long)]
        pivot: Option<Dimension>,
    },

    /// Mostra/edita a configuração
    Config {
        /// Mostra a configuração
        #[arg(long)]
        show: bool,

        /// Prazo padrão em dias
        #[arg(long)]
        set_default_deadline: Option<i64>,

        /// JSON de referência padrão
        #[arg(long)]
        set_reference: Option<PathBuf>,

        /// Planilha padrão
        #[arg(long)]
        set_input: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_summary_with_filters() {
        let cli = Cli::try_parse_from([
            "integracar",
            "summary",
            "car.csv",
            "--campus",
            "alegre",
            "--status",
            "pendente",
            "--today",
            "2024-06-30",
        ])
        .unwrap();

        assert_eq!(cli.today.as_deref(), Some("2024-06-30"));
        match cli.command {
            Commands::Summary { input, filter, json, .. } => {
                assert_eq!(input, Some(PathBuf::from("car.csv")));
                assert!(!json);
                let filter = filter.to_filter();
                assert_eq!(filter.campus.as_deref(), Some("alegre"));
                assert_eq!(filter.status_class, Some(StatusClass::Pending));
            }
            _ => panic!("esperado summary"),
        }
    }

    #[test]
    fn test_parse_pivot_dimension() {
        let cli = Cli::try_parse_from(["integracar", "pivot", "-d", "municipio"]).unwrap();
        match cli.command {
            Commands::Pivot { dimension, input, .. } => {
                assert_eq!(dimension, Dimension::Municipio);
                assert!(input.is_none());
            }
            _ => panic!("esperado pivot"),
        }
        assert!(Cli::try_parse_from(["integracar", "pivot", "-d", "estado"]).is_err());
    }

    #[test]
    fn test_empty_filter_values_ignored() {
        let args = FilterArgs { campus: Some("  ".into()), ..FilterArgs::default() };
        assert!(args.to_filter().is_empty());
    }
}
