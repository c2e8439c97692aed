/// Converts a display or folder name into a slug.
///
/// Lowercases, folds Latin-1 accented letters to their base letter, drops
/// anything that is not an ASCII letter, digit, `_`, `-` or whitespace,
/// collapses runs of `-` and whitespace into a single `-`, and trims `-`
/// and `_` from both ends.
///
/// `"Hollow Knight"` → `"hollow-knight"`, `"Pokémon: Red"` → `"pokemon-red"`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut separator = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        let c = fold_accent(c);
        if c.is_ascii_alphanumeric() || c == '_' {
            if separator && !slug.is_empty() {
                slug.push('-');
            }
            separator = false;
            slug.push(c);
        } else if c == '-' || c.is_whitespace() {
            separator = true;
        }
    }

    slug.trim_matches(['-', '_']).to_string()
}

/// Maps letters whose compatibility decomposition is an ASCII letter plus
/// combining marks to that letter. Anything else is returned unchanged.
fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => c,
    }
}
