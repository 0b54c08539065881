const UMLAUTS: [(char, &str); 7] = [
    ('ä', "ae"),
    ('ö', "oe"),
    ('ü', "ue"),
    ('ß', "ss"),
    ('Ä', "Ae"),
    ('Ö', "Oe"),
    ('Ü', "Ue"),
];

/// Reduce a tag value to a path-safe camel-case token.
///
/// Umlauts are transliterated, every space separated word is title-cased with
/// parentheses dropped, the words are glued together and anything that is not
/// an ASCII letter or digit is removed: `"Über (Live) set!"` → `"UeberLiveSet"`.
pub fn clear_string(value: &str) -> String {
    let mut spelled = String::with_capacity(value.len());
    for c in value.chars() {
        match UMLAUTS.iter().find(|(u, _)| *u == c) {
            Some((_, ascii)) => spelled.push_str(ascii),
            None => spelled.push(c),
        }
    }

    let camel: String = spelled.to_lowercase().split(' ').map(title_case).collect();

    camel.chars().filter(char::is_ascii_alphanumeric).collect()
}

fn title_case(word: &str) -> String {
    let word: String = word.chars().filter(|c| *c != '(' && *c != ')').collect();
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
