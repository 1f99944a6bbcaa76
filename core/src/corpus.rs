//! Parsed corpus documents and readers for the supported corpus file shapes.
//!
//! Only `Document::body` is ever tokenized; title and dateline are kept so
//! callers can display them, but they never reach the index.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::Deserialize;

use crate::error::{IndexError, Result};

lazy_static! {
    static ref REUTERS: Regex =
        Regex::new(r"(?si)<REUTERS\b([^>]*)>(.*?)</REUTERS>").expect("valid regex");
    static ref NEWID: Regex = Regex::new(r#"(?i)\bNEWID\s*=\s*"([^"]*)""#).expect("valid regex");
    static ref TEXT: Regex = Regex::new(r"(?si)<TEXT\b[^>]*>(.*?)</TEXT>").expect("valid regex");
    static ref TITLE: Regex = Regex::new(r"(?si)<TITLE>(.*?)</TITLE>").expect("valid regex");
    static ref DATELINE: Regex =
        Regex::new(r"(?si)<DATELINE>(.*?)</DATELINE>").expect("valid regex");
    static ref TAG: Regex = Regex::new(r"<[^>]*>").expect("valid regex");
    static ref ENTITY: Regex = Regex::new(r"&(#\d+|lt|gt|amp|quot|apos);").expect("valid regex");
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Identifier as written in the corpus; parsed into a DocId by the index builder.
    pub id: Option<String>,
    pub title: Option<String>,
    pub dateline: Option<String>,
    pub body: String,
}

impl Document {
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self { id: Some(id.into()), body: body.into(), ..Default::default() }
    }
}

fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| match &caps[1] {
            "lt" => "<".to_string(),
            "gt" => ">".to_string(),
            "amp" => "&".to_string(),
            "quot" => "\"".to_string(),
            "apos" => "'".to_string(),
            num => num[1..]
                .parse::<u32>()
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_default(),
        })
        .into_owned()
}

fn inner_text(caps: Option<Captures<'_>>) -> Option<String> {
    caps.map(|c| decode_entities(TAG.replace_all(&c[1], "\n").trim()))
}

/// Parse every `<REUTERS>` article of an SGML corpus file.
///
/// The body is the article's `<TEXT>` element without its `<TITLE>` and
/// `<DATELINE>` children, remaining markup turned into line breaks.
pub fn parse_sgml(text: &str) -> Vec<Document> {
    REUTERS
        .captures_iter(text)
        .map(|article| {
            let id = NEWID.captures(&article[1]).map(|c| c[1].to_string());
            let Some(content) = TEXT.captures(&article[2]).map(|c| c[1].to_string()) else {
                return Document { id, ..Default::default() };
            };
            let title = inner_text(TITLE.captures(&content));
            let dateline = inner_text(DATELINE.captures(&content));
            let stripped = TITLE.replace_all(&content, "\n");
            let stripped = DATELINE.replace_all(&stripped, "\n");
            let body = decode_entities(&TAG.replace_all(&stripped, "\n"));
            Document { id, title, dateline, body }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InputId {
    Number(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct InputDoc {
    #[serde(default)]
    id: Option<InputId>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    dateline: Option<String>,
    #[serde(default)]
    body: String,
}

impl From<InputDoc> for Document {
    fn from(doc: InputDoc) -> Self {
        let id = doc.id.map(|id| match id {
            InputId::Number(n) => n.to_string(),
            InputId::Text(s) => s,
        });
        Document { id, title: doc.title, dateline: doc.dateline, body: doc.body }
    }
}

/// A JSON array of documents, or a single document object.
pub fn parse_json(text: &str) -> Result<Vec<Document>> {
    let json: serde_json::Value =
        serde_json::from_str(text).map_err(|e| IndexError::parse(format!("corpus JSON: {e}")))?;
    let docs = match json {
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .map(serde_json::from_value::<InputDoc>)
            .collect::<std::result::Result<Vec<_>, _>>(),
        obj @ serde_json::Value::Object(_) => {
            serde_json::from_value::<InputDoc>(obj).map(|d| vec![d])
        }
        _ => return Err(IndexError::parse("corpus JSON must be an object or an array of objects")),
    }
    .map_err(|e| IndexError::parse(format!("corpus document: {e}")))?;
    Ok(docs.into_iter().map(Document::from).collect())
}

/// One JSON document per line; blank lines are skipped.
pub fn parse_jsonl(text: &str) -> Result<Vec<Document>> {
    let mut docs = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let doc: InputDoc = serde_json::from_str(line)
            .map_err(|e| IndexError::parse(format!("corpus line {}: {e}", lineno + 1)))?;
        docs.push(doc.into());
    }
    Ok(docs)
}
