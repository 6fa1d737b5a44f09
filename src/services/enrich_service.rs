use lazy_static::lazy_static;
use regex::Regex;

use crate::models::posting::Posting;
use crate::patterns::{recruiter_name_patterns, EMAIL_PATTERN, IMAGE_SUFFIXES};

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(EMAIL_PATTERN).unwrap();

    // One alternation in priority order: the leftmost label in the text wins,
    // ties at the same offset go to the earlier pattern.
    static ref RECRUITER_NAME_REGEX: Regex =
        Regex::new(&recruiter_name_patterns().join("|")).unwrap();
}

/// Fills `recruiter_email` and `recruiter_name` on every posting. Each row is
/// enriched from its own fields only.
pub fn enrich(postings: Vec<Posting>) -> Vec<Posting> {
    postings.into_iter().map(enrich_one).collect()
}

pub fn enrich_one(mut posting: Posting) -> Posting {
    let description = posting.description.as_deref().unwrap_or_default();

    posting.recruiter_email = posting
        .raw_contact_hint
        .as_deref()
        .map(str::trim)
        .filter(|hint| !hint.is_empty())
        .map(str::to_string)
        .or_else(|| extract_email(description));
    posting.recruiter_name = extract_recruiter_name(description);
    posting
}

/// First email-shaped token that is not an embedded image file name.
pub fn extract_email(text: &str) -> Option<String> {
    EMAIL_REGEX
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|candidate| {
            let lower = candidate.to_lowercase();
            !IMAGE_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
        })
        .map(str::to_string)
}

pub fn extract_recruiter_name(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let captures = RECRUITER_NAME_REGEX.captures(text)?;
    captures
        .iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str().trim().to_string())
        .find(|name| !name.is_empty())
}

/// Rows that received an email and a name respectively.
pub fn contact_counts(postings: &[Posting]) -> (usize, usize) {
    let emails = postings.iter().filter(|p| p.recruiter_email.is_some()).count();
    let names = postings.iter().filter(|p| p.recruiter_name.is_some()).count();
    (emails, names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_file_names_are_not_contacts() {
        assert_eq!(
            extract_email("logo@cdn.example.png e contato jane@acme.com").as_deref(),
            Some("jane@acme.com")
        );
        assert_eq!(extract_email("banner@2x.JPG"), None);
        assert_eq!(extract_email(""), None);
    }

    #[test]
    fn the_first_label_in_the_text_wins() {
        let text = "Vaga aberta! Posted by Carlos Lima. Recrutadora: Maria Silva";
        assert_eq!(extract_recruiter_name(text).as_deref(), Some("Carlos Lima"));
        assert_eq!(
            extract_recruiter_name("Hiring Manager: Paula Reis").as_deref(),
            Some("Paula Reis")
        );
        assert_eq!(extract_recruiter_name("Sem contato informado"), None);
    }

    #[test]
    fn labels_ignore_case_but_names_must_be_capitalised() {
        assert_eq!(
            extract_recruiter_name("CONTATO: João Pereira").as_deref(),
            Some("João Pereira")
        );
        assert_eq!(extract_recruiter_name("contato: joão pereira"), None);
        assert_eq!(
            extract_recruiter_name("please contact Ana Souza at the office").as_deref(),
            Some("Ana Souza")
        );
    }
}
