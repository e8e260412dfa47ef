//! Normalização de texto
//!
//! Gera a chave de comparação usada por todos os outros módulos:
//! - traços Unicode → `-`, espaços especiais → espaço
//! - minúsculas, sem acentos
//! - espaços colapsados e aparados

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Partículas que ficam em minúsculas no título ("Cachoeiro de Itapemirim")
const LOWERCASE_PARTICLES: &[&str] = &["de", "da", "do", "das", "dos", "e", "di", "du"];

/// Gera a chave canônica de comparação
///
/// Entrada vazia retorna string vazia. Idempotente:
/// `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let folded = fold_separators(text).to_lowercase();
    let stripped: String = folded.nfd().filter(|c| !is_combining_mark(*c)).collect();
    collapse_whitespace(&stripped)
}

/// Limpa o texto preservando caixa e acentos (usado para exibição)
pub fn clean(text: &str) -> String {
    collapse_whitespace(&fold_separators(text))
}

/// Troca variantes de traço e de espaço pelos equivalentes ASCII
///
/// Exportações sujas de planilha trazem `–`, `—`, NBSP e afins.
pub fn fold_separators(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\u{2010}'..='\u{2015}' | '\u{2212}' | '\u{FE58}' | '\u{FE63}' | '\u{FF0D}' => Some('-'),
            '\u{00A0}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}' => Some(' '),
            // invisíveis
            '\u{00AD}' | '\u{200B}'..='\u{200D}' | '\u{2060}' | '\u{FEFF}' => None,
            _ => Some(c),
        })
        .collect()
}

/// Apara e colapsa qualquer sequência de espaços em um único espaço
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Indica se o texto está todo em maiúsculas ou todo em minúsculas
pub fn has_uniform_case(text: &str) -> bool {
    let has_upper = text.chars().any(char::is_uppercase);
    let has_lower = text.chars().any(char::is_lowercase);
    has_upper != has_lower
}

/// Converte para título ("SÃO MATEUS" → "São Mateus")
///
/// Só é aplicado quando a caixa é uniforme; texto com caixa mista é
/// devolvido como veio.
pub fn title_case(text: &str) -> String {
    if !has_uniform_case(text) {
        return text.to_string();
    }

    text.split(' ')
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i > 0 && LOWERCASE_PARTICLES.contains(&lower.as_str()) {
                lower
            } else {
                lower
                    .split('-')
                    .map(capitalize)
                    .collect::<Vec<_>>()
                    .join("-")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut upper = first.to_uppercase();
            // "ß" vira "SS": mantém o original para não alterar a chave
            let head = match (upper.next(), upper.next()) {
                (Some(u), None) => u,
                _ => first,
            };
            std::iter::once(head).chain(chars).collect()
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize(" Cachoeiro   de Itapemírim "), "cachoeiro de itapemirim");
        assert_eq!(normalize("cachoeiro de itapemirim"), "cachoeiro de itapemirim");
        assert_eq!(normalize("SÃO MATEUS"), "sao mateus");
        assert_eq!(normalize("Iúna"), "iuna");
    }

    #[test]
    fn test_normalize_empty_and_odd_inputs() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("12345"), "12345");
        assert_eq!(normalize("!?.;"), "!?.;");
    }

    #[test]
    fn test_normalize_dashes_and_nbsp() {
        assert_eq!(normalize("Serra\u{00A0}–\u{00A0}ES"), "serra - es");
        assert_eq!(normalize("Serra — ES"), "serra - es");
        assert_eq!(normalize("Serra\u{2212}ES"), "serra-es");
        assert_eq!(normalize("Vi\u{00AD}tória\u{200B}"), "vitoria");
    }

    #[test]
    fn test_normalize_idempotent() {
        let inputs = [
            "  Água Doce do Norte ",
            "İstanbul",
            "Conceição\u{00A0}da Barra",
            "MARIA  DAS GRAÇAS",
            "03 - Aprovado",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_clean_keeps_case_and_accents() {
        assert_eq!(clean("  São\u{00A0}\u{00A0}Mateus  "), "São Mateus");
        assert_eq!(clean("Serra – ES"), "Serra - ES");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("SÃO MATEUS"), "São Mateus");
        assert_eq!(title_case("cachoeiro de itapemirim"), "Cachoeiro de Itapemirim");
        assert_eq!(title_case("MARIA DAS GRAÇAS E SILVA"), "Maria das Graças e Silva");
        assert_eq!(title_case("CENTRO-SERRANO"), "Centro-Serrano");
        // caixa mista é preservada
        assert_eq!(title_case("João da SILVA"), "João da SILVA");
    }

    #[test]
    fn test_title_case_keeps_key() {
        for input in ["STRAßE", "ÁGUA DOCE", "de la cruz"] {
            assert_eq!(normalize(&title_case(input)), normalize(input));
        }
    }
}
