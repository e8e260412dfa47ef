//! Dados de referência
//!
//! Listas oficiais (municípios, campi), tabelas de apelidos e correções de
//! digitação. São dados, não código: podem vir de um JSON e ser mesclados
//! sobre a predefinição do Espírito Santo.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Município oficial com centroide opcional (lon, lat)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Municipality {
    pub name: String,
    #[serde(default)]
    pub centroid: Option<[f64; 2]>,
}

/// Tabelas por tipo de entidade
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityTables<T> {
    pub municipio: T,
    pub campus: T,
    pub avaliador: T,
}

/// Conjunto completo de dados de referência
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceData {
    /// Municípios oficiais, na ordem usada para desempate
    pub municipalities: Vec<Municipality>,
    /// Campi oficiais
    pub campuses: Vec<String>,
    /// Apelido (texto livre) → rótulo canônico
    pub aliases: EntityTables<BTreeMap<String, String>>,
    /// Correções literais aplicadas à chave antes da busca (errado, certo)
    pub typo_fixes: EntityTables<Vec<(String, String)>>,
    /// Sufixos de UF removidos dos municípios ("ES", "Espírito Santo")
    pub region_suffixes: Vec<String>,
    /// Prefixos removidos dos campi ("Ifes", "Campus")
    pub campus_prefixes: Vec<String>,
    /// Rótulos de status esperados no pivô, em ordem de coluna
    pub status_labels: Vec<String>,
}

impl ReferenceData {
    /// Predefinições embutidas
    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "es" | "espirito-santo" | "espírito santo" => Some(Self::espirito_santo()),
            "vazio" | "empty" => Some(Self::default()),
            _ => None,
        }
    }

    /// Lê de um arquivo JSON
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Lê de uma string JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let data: Self = serde_json::from_str(json)?;
        Ok(data)
    }

    /// Mescla outro conjunto (o que vem depois prevalece)
    ///
    /// Listas oficiais não vazias substituem as atuais; apelidos e
    /// correções são acumulados.
    pub fn merge(&mut self, other: &ReferenceData) {
        if !other.municipalities.is_empty() {
            self.municipalities = other.municipalities.clone();
        }
        if !other.campuses.is_empty() {
            self.campuses = other.campuses.clone();
        }
        if !other.region_suffixes.is_empty() {
            self.region_suffixes = other.region_suffixes.clone();
        }
        if !other.campus_prefixes.is_empty() {
            self.campus_prefixes = other.campus_prefixes.clone();
        }
        if !other.status_labels.is_empty() {
            self.status_labels = other.status_labels.clone();
        }

        self.aliases.municipio.extend(other.aliases.municipio.clone());
        self.aliases.campus.extend(other.aliases.campus.clone());
        self.aliases.avaliador.extend(other.aliases.avaliador.clone());

        self.typo_fixes.municipio.extend(other.typo_fixes.municipio.iter().cloned());
        self.typo_fixes.campus.extend(other.typo_fixes.campus.iter().cloned());
        self.typo_fixes.avaliador.extend(other.typo_fixes.avaliador.iter().cloned());
    }

    /// Centroide de um município canônico
    pub fn centroid(&self, name: &str) -> Option<[f64; 2]> {
        self.municipalities
            .iter()
            .find(|m| m.name == name)
            .and_then(|m| m.centroid)
    }

    /// Espírito Santo: 78 municípios, campi do Ifes
    pub fn espirito_santo() -> Self {
        let municipalities = ES_MUNICIPALITIES
            .iter()
            .map(|(name, lon, lat)| Municipality {
                name: (*name).into(),
                centroid: Some([*lon, *lat]),
            })
            .collect();

        let mut data = Self {
            municipalities,
            campuses: IFES_CAMPUSES.iter().map(|c| (*c).into()).collect(),
            region_suffixes: vec!["ES".into(), "Espírito Santo".into(), "Espirito Santo".into()],
            campus_prefixes: vec!["Ifes".into(), "Campus".into()],
            status_labels: vec![
                "01 - Digitalizado e Autuado".into(),
                "02 - Reprovado".into(),
                "03 - Aprovado".into(),
                "04 - Cancelado".into(),
                "05 - Sem parecer".into(),
            ],
            ..Default::default()
        };

        // apelidos de municípios
        let municipio = &mut data.aliases.municipio;
        municipio.insert("Cachoeiro".into(), "Cachoeiro de Itapemirim".into());
        municipio.insert("Cach. de Itapemirim".into(), "Cachoeiro de Itapemirim".into());
        municipio.insert("Barra de S. Francisco".into(), "Barra de São Francisco".into());
        municipio.insert("São Gabriel".into(), "São Gabriel da Palha".into());
        municipio.insert("Santa Maria".into(), "Santa Maria de Jetibá".into());
        municipio.insert("Venda Nova".into(), "Venda Nova do Imigrante".into());
        municipio.insert("Domingos Martins (Campinho)".into(), "Domingos Martins".into());
        municipio.insert("Presidente Kenedy".into(), "Presidente Kennedy".into());
        municipio.insert("Lindenberg".into(), "Governador Lindenberg".into());

        // apelidos de campi
        let campus = &mut data.aliases.campus;
        campus.insert("Centro Serrano".into(), "Centro-Serrano".into());
        campus.insert("Santa Maria de Jetibá".into(), "Centro-Serrano".into());
        campus.insert("Cachoeiro".into(), "Cachoeiro de Itapemirim".into());
        campus.insert("Venda Nova".into(), "Venda Nova do Imigrante".into());
        campus.insert("Barra de S. Francisco".into(), "Barra de São Francisco".into());

        // erros de digitação frequentes, corrigidos antes da busca
        data.typo_fixes.municipio = vec![
            ("itapemerim".into(), "itapemirim".into()),
            ("itapimirim".into(), "itapemirim".into()),
            ("cachoeira de".into(), "cachoeiro de".into()),
            ("santa tereza".into(), "santa teresa".into()),
            ("sao matheus".into(), "sao mateus".into()),
            ("sooretema".into(), "sooretama".into()),
        ];
        data.typo_fixes.campus = vec![
            ("itapemerim".into(), "itapemirim".into()),
            ("santa tereza".into(), "santa teresa".into()),
            ("sao matheus".into(), "sao mateus".into()),
        ];

        data
    }
}

/// (nome oficial, longitude, latitude)
const ES_MUNICIPALITIES: &[(&str, f64, f64)] = &[
    ("Afonso Cláudio", -41.126, -20.074),
    ("Água Doce do Norte", -40.985, -18.548),
    ("Águia Branca", -40.735, -18.984),
    ("Alegre", -41.532, -20.763),
    ("Alfredo Chaves", -40.737, -20.639),
    ("Alto Rio Novo", -41.023, -19.062),
    ("Anchieta", -40.642, -20.800),
    ("Apiacá", -41.569, -21.152),
    ("Aracruz", -40.273, -19.820),
    ("Atílio Vivácqua", -41.196, -20.913),
    ("Baixo Guandu", -41.015, -19.517),
    ("Barra de São Francisco", -40.889, -18.755),
    ("Boa Esperança", -40.296, -18.540),
    ("Bom Jesus do Norte", -41.680, -21.118),
    ("Brejetuba", -41.290, -20.153),
    ("Cachoeiro de Itapemirim", -41.112, -20.846),
    ("Cariacica", -40.416, -20.264),
    ("Castelo", -41.183, -20.604),
    ("Colatina", -40.626, -19.539),
    ("Conceição da Barra", -39.730, -18.592),
    ("Conceição do Castelo", -41.240, -20.363),
    ("Divino de São Lourenço", -41.699, -20.620),
    ("Domingos Martins", -40.659, -20.365),
    ("Dores do Rio Preto", -41.841, -20.693),
    ("Ecoporanga", -40.833, -18.371),
    ("Fundão", -40.403, -19.936),
    ("Governador Lindenberg", -40.460, -19.233),
    ("Guaçuí", -41.677, -20.773),
    ("Guarapari", -40.505, -20.673),
    ("Ibatiba", -41.509, -20.234),
    ("Ibiraçu", -40.373, -19.836),
    ("Ibitirama", -41.670, -20.546),
    ("Iconha", -40.812, -20.791),
    ("Irupi", -41.644, -20.350),
    ("Itaguaçu", -40.858, -19.803),
    ("Itapemirim", -40.834, -21.009),
    ("Itarana", -40.875, -19.875),
    ("Iúna", -41.536, -20.353),
    ("Jaguaré", -39.983, -18.908),
    ("Jerônimo Monteiro", -41.395, -20.797),
    ("João Neiva", -40.386, -19.756),
    ("Laranja da Terra", -41.062, -19.900),
    ("Linhares", -39.855, -19.394),
    ("Mantenópolis", -41.124, -18.865),
    ("Marataízes", -40.828, -21.039),
    ("Marechal Floriano", -40.669, -20.415),
    ("Marilândia", -40.539, -19.413),
    ("Mimoso do Sul", -41.359, -21.063),
    ("Montanha", -40.366, -18.126),
    ("Mucurici", -40.514, -18.096),
    ("Muniz Freire", -41.415, -20.465),
    ("Muqui", -41.344, -20.951),
    ("Nova Venécia", -40.397, -18.715),
    ("Pancas", -40.851, -19.222),
    ("Pedro Canário", -39.957, -18.300),
    ("Pinheiros", -40.217, -18.414),
    ("Piúma", -40.730, -20.835),
    ("Ponto Belo", -40.541, -18.125),
    ("Presidente Kennedy", -41.052, -21.096),
    ("Rio Bananal", -40.336, -19.268),
    ("Rio Novo do Sul", -40.936, -20.862),
    ("Santa Leopoldina", -40.525, -20.100),
    ("Santa Maria de Jetibá", -40.743, -20.030),
    ("Santa Teresa", -40.600, -19.936),
    ("São Domingos do Norte", -40.627, -19.142),
    ("São Gabriel da Palha", -40.536, -19.018),
    ("São José do Calçado", -41.664, -21.028),
    ("São Mateus", -39.864, -18.720),
    ("São Roque do Canaã", -40.652, -19.741),
    ("Serra", -40.307, -20.121),
    ("Sooretama", -40.090, -19.189),
    ("Vargem Alta", -41.006, -20.670),
    ("Venda Nova do Imigrante", -41.126, -20.330),
    ("Viana", -40.495, -20.393),
    ("Vila Pavão", -40.607, -18.613),
    ("Vila Valério", -40.390, -18.993),
    ("Vila Velha", -40.292, -20.329),
    ("Vitória", -40.308, -20.315),
];

const IFES_CAMPUSES: &[&str] = &[
    "Alegre",
    "Aracruz",
    "Barra de São Francisco",
    "Cachoeiro de Itapemirim",
    "Cariacica",
    "Centro-Serrano",
    "Colatina",
    "Guarapari",
    "Ibatiba",
    "Itapina",
    "Linhares",
    "Montanha",
    "Nova Venécia",
    "Piúma",
    "Santa Teresa",
    "São Mateus",
    "Serra",
    "Venda Nova do Imigrante",
    "Viana",
    "Vila Velha",
    "Vitória",
];
