//! Casamento aproximado por distância de edição
//!
//! As chaves comparadas já devem estar normalizadas (`text::normalize`).

use crate::config::FuzzyConfig;

/// Melhor candidato encontrado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuzzyMatch<'a> {
    /// Posição do candidato na lista
    pub index: usize,
    pub candidate: &'a str,
    pub distance: usize,
}

/// Distância de Levenshtein entre duas chaves
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // duas linhas da matriz bastam
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = if a_char == b_char { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1)
                .min(curr[j] + 1)
                .min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Candidato mais próximo da chave
///
/// Empate: vence o primeiro candidato na ordem de iteração. Igualdade
/// exata encerra a busca com distância 0.
pub fn best_match<'a, I>(key: &str, candidates: I) -> Option<FuzzyMatch<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<FuzzyMatch<'a>> = None;

    for (index, candidate) in candidates.into_iter().enumerate() {
        if candidate == key {
            return Some(FuzzyMatch { index, candidate, distance: 0 });
        }

        let distance = levenshtein_distance(key, candidate);
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(FuzzyMatch { index, candidate, distance });
        }
    }

    best
}

/// Indica se a distância é aceitável para a chave
pub fn accepts(config: &FuzzyConfig, key: &str, distance: usize) -> bool {
    distance <= config.max_distance(key)
}

/// Busca o melhor candidato e aplica o limiar
///
/// Retorna `None` quando nenhum candidato fica dentro da tolerância; o
/// chamador deve então usar o texto limpo original.
pub fn match_within<'a, I>(config: &FuzzyConfig, key: &str, candidates: I) -> Option<FuzzyMatch<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    best_match(key, candidates).filter(|m| accepts(config, key, m.distance))
}
