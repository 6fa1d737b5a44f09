/// Trims a value and maps blank or null-like placeholders to `None`.
pub fn clean(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    match trimmed {
        "" | "nan" | "NaN" | "None" | "null" => None,
        _ if trimmed.len() == value.len() => Some(value),
        _ => Some(trimmed.to_string()),
    }
}

pub fn strip_html(input: &str) -> String {
    let mut result = String::new();
    let mut inside_tag = false;

    for c in input.chars() {
        if c == '<' {
            inside_tag = true;
        } else if c == '>' {
            inside_tag = false;
            result.push(' ');
        } else if !inside_tag {
            result.push(c);
        }
    }

    collapse_whitespace(
        &result
            .replace("&nbsp;", " ")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&"),
    )
}

pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// File-name friendly fragment of a search term.
pub fn slug(term: &str, max_chars: usize) -> String {
    term.trim()
        .chars()
        .map(|c| match c {
            ' ' => '_',
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            other => other,
        })
        .take(max_chars)
        .collect()
}

pub fn truncate_chars(input: &str, max_chars: usize) -> String {
    input.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_maps_placeholders_to_none() {
        assert_eq!(clean(Some(" nan ".into())), None);
        assert_eq!(clean(Some("".into())), None);
        assert_eq!(clean(None), None);
        assert_eq!(clean(Some(" Acme ".into())), Some("Acme".into()));
    }

    #[test]
    fn slug_replaces_spaces_and_truncates() {
        assert_eq!(slug("desenvolvedor python", 25), "desenvolvedor_python");
        assert_eq!(slug("a b/c", 3), "a_b");
        assert_eq!(slug("engenharia de software sênior", 25).chars().count(), 25);
    }

    #[test]
    fn strip_html_keeps_text_only() {
        assert_eq!(strip_html("<p>Olá&nbsp;<b>mundo</b></p>"), "Olá mundo");
    }
}
