//! Pattern tables used by enrichment, filtering and the post adapters.
//!
//! Kept as plain data so each table can be extended and tested on its own;
//! the services compile them once on first use.

use crate::dto::search_dto::Seniority;

pub const EMAIL_PATTERN: &str = r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}";

/// Email-shaped tokens ending in these are embedded image names, not contacts.
pub const IMAGE_SUFFIXES: &[&str] = &[".png", ".jpg", ".gif", ".svg"];

/// A capitalised name of two to four words.
const NAME: &str = r"([A-ZÀ-Ú][a-zà-ú]+(?:\s+[A-ZÀ-Ú][a-zà-ú]+){1,3})";

/// Recruiter name labels in priority order. `{name}` is replaced by [`NAME`];
/// labels are case-insensitive, the captured name is not.
pub const RECRUITER_NAME_PATTERNS: &[&str] = &[
    r"(?i:recrut[ao]dor[a]?)\s*[:：]\s*{name}",
    r"(?i:contato)\s*[:：]\s*{name}",
    r"(?i:posted\s+by)\s+{name}",
    r"(?i:hiring\s+manager)\s*[:：]\s*{name}",
    r"(?i:contact)\s+{name}\s+(?i:at)\b",
    r"(?i:recruiter)\s*[:：]\s*{name}",
    r"(?i:respons[aá]vel)\s*[:：]\s*{name}",
    r"(?i:apply\s+to)\s+{name}",
];

pub fn recruiter_name_patterns() -> Vec<String> {
    RECRUITER_NAME_PATTERNS
        .iter()
        .map(|pattern| pattern.replace("{name}", NAME))
        .collect()
}

pub const REMOTE_PATTERN: &str = r"(?i)\bremoto\b|\bremote\b";

const TRAINEE: &[&str] = &[
    r"\btrainee\b",
    r"\bestagi[aá]ri[oa]?\b",
    r"\best[aá]gio\b",
    r"\bstage\b",
    r"\bintern(?:ship)?\b",
    r"\baprendiz\b",
    r"\bjovem\s+aprendiz\b",
    r"\bprograma\s+de\s+est[aá]gio\b",
];

const JUNIOR: &[&str] = &[
    r"\bj[uú]nior\b",
    r"\bjr\.?\b",
    r"\bentry[\s\-]?level\b",
    r"\brec[eé]m[\s\-]?formad[oa]\b",
    r"\bsem\s+experi[eê]ncia\b",
    r"\bpouca\s+experi[eê]ncia\b",
    r"\biniciante\b",
    r"\bprimeiro\s+emprego\b",
    r"\bn[ií]vel\s+inicial\b",
    r"\bn[ií]vel\s+j[uú]nior\b",
    r"\b0\s*[aà]\s*2\s+anos?\b",
    r"\bat[eé]\s+2\s+anos?\b",
    r"\bat[eé]\s+1\s+ano\b",
    r"\bjovem\s+profissional\b",
    r"\bjovem\s+talento\b",
    r"\bearly[\s\-]?career\b",
    r"\bformand[oa]\b",
    r"\bjunior\s+developer\b",
    r"\bjunior\s+dev\b",
    r"\bdev\s+j[uú]nior\b",
];

const PLENO: &[&str] = &[
    r"\bpleno\b",
    r"\bn[ií]vel\s+pleno\b",
    r"\bmid[\s\-]?level\b",
    r"\bmiddle\b",
    r"\bintermedi[aá]ri[oa]\b",
    r"\b[23]\s*[aà]\s*5\s+anos?\b",
    r"\b2\+\s*anos?\b",
    r"\banalista\b",
];

const SENIOR: &[&str] = &[
    r"\bs[eê]nior\b",
    r"\bsr\.?\b",
    r"\bn[ií]vel\s+s[eê]nior\b",
    r"\bespecialista\b",
    r"\btech\s+lead\b",
    r"\bengenheiro\s+s[eê]nior\b",
    r"\b5\s*\+\s*anos?\b",
    r"\bmais\s+de\s+5\s+anos?\b",
    r"\b6\s*[aà]\s*\d+\s+anos?\b",
    r"\bprincipal\s+engineer\b",
    r"\bstaff\s+engineer\b",
    r"\barchitect\b",
    r"\barquiteto\b",
    r"\blead\s+developer\b",
    r"\blead\s+dev\b",
];

pub fn seniority_patterns(level: Seniority) -> &'static [&'static str] {
    match level {
        Seniority::Trainee => TRAINEE,
        Seniority::Junior => JUNIOR,
        Seniority::Pleno => PLENO,
        Seniority::Senior => SENIOR,
    }
}

/// Phrases that mark a social post as a job announcement.
pub const JOB_POST_PHRASES: &[&str] = &[
    "estamos contratando",
    "vaga aberta",
    "vagas abertas",
    "oportunidade de emprego",
    "estou contratando",
    "vagas disponíveis",
    "processo seletivo",
    "we are hiring",
    "job opening",
    "now hiring",
    "join our team",
    "looking for",
    "procurando profissional",
    "buscamos profissional",
];

/// Lower-case stems a forum post must contain to count as a job post.
pub const FORUM_JOB_KEYWORDS: &[&str] = &[
    "vaga",
    "contrat",
    "hiring",
    "oportunidade",
    "emprego",
    "trabalho",
    "job",
];
