//! Gene identifier normalization and subgenome parsing.
//!
//! Every identifier comparison in the crate (homology joins, feature store
//! lookups, caller-supplied gene lists) goes through [`normalize_id`] with
//! the owning assembly's pattern, so the same raw spelling always lands in
//! the same ID space.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::data_structs::typedef::GeneId;
use crate::error::Result;

/// Normalizes a raw gene identifier against an optional extraction pattern.
///
/// Rules, in order:
/// 1. leading/trailing whitespace is stripped;
/// 2. without a pattern, the stripped value is returned as-is;
/// 3. with a pattern, capture group 1 of the first match is returned when
///    the pattern defines one, else the full match;
/// 4. a non-matching pattern falls back to the stripped value.
///
/// The function is idempotent: normalizing an already normalized identifier
/// returns it unchanged.
pub fn normalize_id(
    raw: &str,
    pattern: Option<&Regex>,
) -> GeneId {
    let stripped = raw.trim();
    let Some(re) = pattern
    else {
        return stripped.to_string();
    };
    match re.captures(stripped) {
        Some(caps) => {
            match caps.get(1) {
                Some(group) => group.as_str().to_string(),
                None => caps.get(0).map(|m| m.as_str()).unwrap_or(stripped).to_string(),
            }
        },
        None => stripped.to_string(),
    }
}

/// Compiles an optional pattern string once per descriptor.
pub fn compile_pattern(pattern: Option<&str>) -> Result<Option<Regex>> {
    pattern.map(Regex::new).transpose().map_err(Into::into)
}

static SUBGENOME_INNER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[_.\s]([AD])(\d{2})G").unwrap());
static SUBGENOME_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^GH_([AD])(\d{2})G").unwrap());

/// Extracts the subgenome letter and two-digit chromosome from a cotton
/// gene identifier, e.g. `Ghir_A01G001234` -> `('A', "01")`.
///
/// Tries the delimiter-anchored form first, then the bare `GH_` prefix
/// form. Identifiers matching neither yield `None`.
pub fn parse_subgenome(gene_id: &str) -> Option<(char, String)> {
    let caps = SUBGENOME_INNER
        .captures(gene_id)
        .or_else(|| SUBGENOME_PREFIX.captures(gene_id))?;
    let letter = caps
        .get(1)?
        .as_str()
        .chars()
        .next()?
        .to_ascii_uppercase();
    let chromosome = caps.get(2)?.as_str().to_string();
    Some((letter, chromosome))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("  Ghir_A01G001234.1  ", None, "Ghir_A01G001234.1")]
    #[case("Ghir_A01G001234.1", Some(r"^(\w+?)\.\d+$"), "Ghir_A01G001234")]
    #[case("Ghir_A01G001234", Some(r"^(\w+?)\.\d+$"), "Ghir_A01G001234")]
    #[case("gene=AT1G01010;", Some(r"AT\dG\d{5}"), "AT1G01010")]
    fn normalization_rules(
        #[case] raw: &str,
        #[case] pattern: Option<&str>,
        #[case] expected: &str,
    ) {
        let compiled = compile_pattern(pattern).unwrap();
        assert_eq!(normalize_id(raw, compiled.as_ref()), expected);
    }

    #[test]
    fn normalization_is_idempotent() {
        let re = compile_pattern(Some(r"^(\w+?)\.\d+$")).unwrap();
        let once = normalize_id(" Ghir_D05G003210.2 ", re.as_ref());
        let twice = normalize_id(&once, re.as_ref());
        assert_eq!(once, twice);
    }

    #[rstest]
    #[case("Ghir_A01G001234", Some(('A', "01")))]
    #[case("Gh_d05G123400", Some(('D', "05")))]
    #[case("GH_A12G000100", Some(('A', "12")))]
    #[case("AT1G01010", None)]
    fn subgenome_grammar(
        #[case] gene_id: &str,
        #[case] expected: Option<(char, &str)>,
    ) {
        let parsed = parse_subgenome(gene_id);
        assert_eq!(
            parsed,
            expected.map(|(l, c)| (l, c.to_string()))
        );
    }
}
