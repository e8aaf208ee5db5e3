//! Domain-aware stopword filtering and suffix stemming.
//!
//! Tokens arrive already normalized (lower-case, ascii-folded), so every set
//! and rule here is written in folded form. Only tokens of three or more
//! letters ever reach this module; shorter chat particles ("ne", "ta") never
//! survive tokenization in the first place.

use std::collections::HashSet;
use std::sync::LazyLock;

/// General Portuguese stopwords, ascii-folded, three letters and up.
const GENERAL_STOPWORDS: &[&str] = &[
    "que", "nao", "uma", "com", "para", "por", "mais", "das", "dos", "mas", "foi", "sao", "tem",
    "seu", "sua", "ser", "nos", "esta", "estao", "tinha", "foram", "essa", "num", "nem", "suas",
    "meu", "minha", "numa", "pelos", "pelas", "elas", "eles", "qual", "lhe", "deles", "delas",
    "essas", "esses", "este", "isso", "isto", "dele", "dela", "entre", "sem", "aos",
    "seus", "quem", "nas", "meus", "era", "eram", "tambem", "pela", "pelo", "ate", "uns", "umas",
    "esse", "estes", "estas", "aquele", "aquela", "aquilo", "fosse", "tenho", "tinham", "houve",
];

/// Domain stopwords for gym feedback: words that show up constantly but carry
/// no sentiment signal. Grouped by the kind of noise they are.
const DOMAIN_STOPWORDS: &[&str] = &[
    // temporal
    "hoje", "ontem", "amanha", "sempre", "nunca", "agora", "cedo", "tarde", "dia", "dias",
    "semana", "semanas", "mes", "meses", "ano", "anos", "vez", "vezes", "durante", "hora",
    "horas", "horario", "horarios",
    // quantifiers
    "muito", "muita", "muitos", "muitas", "pouco", "pouca", "todo", "toda", "todos", "todas",
    "tudo", "nada", "algum", "alguma", "varios", "varias", "bastante", "demais", "menos",
    "quase", "somente", "apenas",
    // generic opinion scaffolding
    "coisa", "coisas", "jeito", "acho", "achei", "parece", "pareceu", "fica", "ficou", "tipo",
    "sobre",
    // fillers
    "pra", "pro", "pras", "pros", "aqui", "ali", "entao", "assim", "cara", "olha",
    // connectives
    "porque", "pois", "portanto", "porem", "contudo", "entretanto", "quando", "enquanto",
    "como", "onde", "ainda", "depois", "antes", "alem", "apesar",
    // vocatives
    "voce", "voces", "pessoal", "galera", "gente",
];

static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    GENERAL_STOPWORDS
        .iter()
        .chain(DOMAIN_STOPWORDS.iter())
        .copied()
        .collect()
});

/// Minimum stem length left behind by the plural rules. Keeps short words
/// like "mes" from being mangled into nonsense.
const MIN_STEM_LEN: usize = 3;

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

/// Stem a normalized token via the first matching suffix rule.
///
/// Rules are tried in priority order and never chain; a plural rule only
/// matches when the remaining stem is long enough. Tokens no rule matches
/// are returned unchanged.
pub fn stem(token: &str) -> String {
    if let Some(base) = token.strip_suffix("oes") {
        return format!("{base}ao");
    }
    if let Some(base) = token.strip_suffix("aes") {
        return format!("{base}ao");
    }
    if let Some(base) = token.strip_suffix("coes") {
        return format!("{base}cao");
    }
    if let Some(base) = token.strip_suffix("mente") {
        return base.to_string();
    }
    if let Some(base) = token.strip_suffix("s") {
        if base.len() >= MIN_STEM_LEN {
            return base.to_string();
        }
    }
    if let Some(base) = token.strip_suffix("es") {
        if base.len() >= MIN_STEM_LEN {
            return base.to_string();
        }
    }
    token.to_string()
}

/// Filter-then-stem step used by the word-frequency aggregator.
///
/// Returns `None` for stopwords, the stemmed token otherwise.
pub fn filter_and_stem(token: &str) -> Option<String> {
    if is_stopword(token) {
        return None;
    }
    Some(stem(token))
}
