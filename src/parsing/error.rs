use thiserror::Error;

use super::Language;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Language {0} is disabled in configuration")]
    LanguageDisabled(Language),

    #[error("Failed to initialize {language} parser: {reason}")]
    ParserInit { language: Language, reason: String },
}
