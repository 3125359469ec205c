//! Camel-case word splitting for asset names.

pub const SEPARATOR: char = '_';

/// Words shorter than this carry no search value.
pub const MIN_WORD_LEN: usize = 3;

/// Splits an identifier into its camel-case segments, dropping digits and
/// hyphens. Case is preserved and short segments are kept.
///
/// A boundary goes before an uppercase letter (not at index 0) when the
/// previous character is not uppercase, or when the next character is
/// lowercase. That splits both `myWord` and `MYWord` before `Word`.
/// Literal `_` in the input also separates.
pub fn split_camel_case(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut marked = String::with_capacity(name.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && is_boundary(&chars, i) {
            marked.push(SEPARATOR);
        }
        if !c.is_ascii_digit() && c != '-' {
            marked.push(c);
        }
    }
    marked
        .split(SEPARATOR)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

fn is_boundary(chars: &[char], i: usize) -> bool {
    if !chars[i].is_ascii_uppercase() {
        return false;
    }
    let prev_upper = chars[i - 1].is_ascii_uppercase();
    let next_lower = chars.get(i + 1).is_some_and(|c| c.is_ascii_lowercase());
    !prev_upper || next_lower
}

/// Lower-cased index keys for an asset name.
pub fn tokenize(name: &str) -> Vec<String> {
    tokenize_with(name, MIN_WORD_LEN)
}

pub fn tokenize_with(name: &str, min_len: usize) -> Vec<String> {
    split_camel_case(name)
        .into_iter()
        .filter(|w| w.chars().count() >= min_len)
        .map(|w| w.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_suffix_is_stripped() {
        assert_eq!(tokenize("BarrelOldWood02"), ["barrel", "old", "wood"]);
    }

    #[test]
    fn all_caps_stays_whole() {
        assert_eq!(tokenize("AWS"), ["aws"]);
    }

    #[test]
    fn acronym_then_word() {
        assert_eq!(split_camel_case("MYWord"), ["MY", "Word"]);
        assert_eq!(tokenize("MYWord"), ["word"]);
        assert_eq!(split_camel_case("myWord"), ["my", "Word"]);
    }

    #[test]
    fn synty_style_names() {
        assert_eq!(
            tokenize("SM_Prop_Barrel_01"),
            ["prop", "barrel"],
            "SM is too short, underscores separate"
        );
        assert_eq!(
            tokenize("SM_Bld_House-Large_02B"),
            ["bld", "house", "large"]
        );
    }

    #[test]
    fn digits_between_words_still_split() {
        assert_eq!(split_camel_case("Wood02Big"), ["Wood", "Big"]);
    }

    #[test]
    fn doubled_separators_collapse() {
        assert_eq!(split_camel_case("__Fence__Post"), ["Fence", "Post"]);
        assert!(split_camel_case("").is_empty());
        assert!(split_camel_case("0123-45").is_empty());
    }

    #[test]
    fn deterministic() {
        let a = tokenize("TreeLargePineSnowy03");
        assert_eq!(a, tokenize("TreeLargePineSnowy03"));
        assert_eq!(a, ["tree", "large", "pine", "snowy"]);
    }

    #[test]
    fn custom_min_len() {
        assert_eq!(tokenize_with("OxCartBig", 2), ["ox", "cart", "big"]);
    }
}
