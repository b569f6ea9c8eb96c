use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Ambiguity policy is STRICT and a simple name had more than one
    /// candidate that nothing disambiguated (spec §4.2 "Disambiguation",
    /// spec §7 `RESOLVE_FAIL`).
    #[error("ambiguous reference to `{simple_name}`: candidates are {}", candidates.join(", "))]
    Ambiguous {
        simple_name: String,
        candidates: Vec<String>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
