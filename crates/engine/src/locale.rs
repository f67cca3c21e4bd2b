use std::collections::BTreeMap;

use roxmltree::{Document, Node};
use thiserror::Error;

pub const DEFAULT_LANGUAGE: &str = "en";

const RIGHT_TO_LEFT_LANGUAGES: [&str; 4] = ["ar", "he", "fa", "ur"];

/// Primary subtag only, so `ar-EG` counts as right-to-left.
pub fn is_right_to_left(language: &str) -> bool {
    let primary = language.split(['-', '_']).next().unwrap_or(language);
    RIGHT_TO_LEFT_LANGUAGES
        .iter()
        .any(|rtl| rtl.eq_ignore_ascii_case(primary))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocaleError {
    #[error("malformed locale XML at {line}:{column}: {message}")]
    Malformed {
        line: u32,
        column: u32,
        message: String,
    },
    #[error("root element must be <Locales> ({line}:{column})")]
    InvalidRoot { line: u32, column: u32 },
    #[error("<{element}> is missing attribute '{attribute}' ({line}:{column})")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
        line: u32,
        column: u32,
    },
    #[error("duplicate message '{key}' in language '{language}' ({line}:{column})")]
    DuplicateMessage {
        language: String,
        key: String,
        line: u32,
        column: u32,
    },
    #[error("unexpected element <{element}> ({line}:{column})")]
    UnexpectedElement {
        element: String,
        line: u32,
        column: u32,
    },
}

/// Language code to message table, in the order languages were declared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocaleTable {
    languages: Vec<(String, BTreeMap<String, String>)>,
}

impl LocaleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        language: impl Into<String>,
        key: impl Into<String>,
        text: impl Into<String>,
    ) {
        let language = language.into();
        let messages = match self.languages.iter().position(|(code, _)| *code == language) {
            Some(index) => &mut self.languages[index].1,
            None => {
                self.languages.push((language, BTreeMap::new()));
                let last = self.languages.len() - 1;
                &mut self.languages[last].1
            }
        };
        messages.insert(key.into(), text.into());
    }

    /// Parses `<Locales><Language code=".."><Message key="..">text</Message>`.
    pub fn from_xml(raw: &str) -> Result<Self, LocaleError> {
        let doc = Document::parse(raw).map_err(|error| LocaleError::Malformed {
            line: error.pos().row,
            column: error.pos().col,
            message: error.to_string(),
        })?;

        let root = doc.root_element();
        if root.tag_name().name() != "Locales" {
            let (line, column) = position_of(&doc, root);
            return Err(LocaleError::InvalidRoot { line, column });
        }

        let mut table = Self::new();
        for language in root.children().filter(|node| node.is_element()) {
            expect_element(&doc, language, "Language")?;
            let code = required_attribute(&doc, language, "code")?;
            // Declared languages keep their slot even with no messages.
            if !table.languages.iter().any(|(known, _)| known == code) {
                table.languages.push((code.to_string(), BTreeMap::new()));
            }

            for message in language.children().filter(|node| node.is_element()) {
                expect_element(&doc, message, "Message")?;
                let key = required_attribute(&doc, message, "key")?;
                if table.lookup(code, key).is_some() {
                    let (line, column) = position_of(&doc, message);
                    return Err(LocaleError::DuplicateMessage {
                        language: code.to_string(),
                        key: key.to_string(),
                        line,
                        column,
                    });
                }
                table.insert(code, key, message.text().unwrap_or_default().trim());
            }
        }
        Ok(table)
    }

    pub fn lookup(&self, language: &str, key: &str) -> Option<&str> {
        self.languages
            .iter()
            .find(|(code, _)| code == language)
            .and_then(|(_, messages)| messages.get(key))
            .map(String::as_str)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().map(|(code, _)| code.as_str())
    }

    pub fn has_language(&self, language: &str) -> bool {
        self.languages().any(|code| code == language)
    }
}

fn position_of(doc: &Document<'_>, node: Node<'_, '_>) -> (u32, u32) {
    let pos = doc.text_pos_at(node.range().start);
    (pos.row, pos.col)
}

fn expect_element(doc: &Document<'_>, node: Node<'_, '_>, name: &str) -> Result<(), LocaleError> {
    if node.tag_name().name() == name {
        return Ok(());
    }
    let (line, column) = position_of(doc, node);
    Err(LocaleError::UnexpectedElement {
        element: node.tag_name().name().to_string(),
        line,
        column,
    })
}

fn required_attribute<'a>(
    doc: &Document<'_>,
    node: Node<'a, '_>,
    attribute: &'static str,
) -> Result<&'a str, LocaleError> {
    node.attribute(attribute).ok_or_else(|| {
        let (line, column) = position_of(doc, node);
        LocaleError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute,
            line,
            column,
        }
    })
}

/// `(language, key) -> text`, falling back to the key itself.
#[derive(Debug, Clone, Default)]
pub struct LocalizationResolver {
    table: LocaleTable,
}

impl LocalizationResolver {
    pub fn new(table: LocaleTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &LocaleTable {
        &self.table
    }

    pub fn resolve<'a>(&'a self, language: &str, key: &'a str) -> &'a str {
        self.table.lookup(language, key).unwrap_or(key)
    }

    pub fn is_right_to_left(&self, language: &str) -> bool {
        is_right_to_left(language)
    }

    /// Next declared language after `current`, wrapping. Unknown or missing
    /// `current` yields the first declared language.
    pub fn next_language(&self, current: &str) -> String {
        let codes = self.table.languages().collect::<Vec<_>>();
        let Some(first) = codes.first() else {
            return current.to_string();
        };
        match codes.iter().position(|code| *code == current) {
            Some(index) => codes[(index + 1) % codes.len()].to_string(),
            None => (*first).to_string(),
        }
    }
}
