//! Typed answer keys, submissions and per-family grading parameters.
//!
//! Questions arrive with `answer_data` and `type_config` as loose JSON, and
//! submissions as whatever the test-taker's client sent. Each payload has two
//! readers:
//!
//! - `lenient` never fails. Missing or mistyped fields read as empty, so a
//!   malformed question grades as incorrect instead of erroring.
//! - `strict` returns a [`GradingError`] naming the first field that does
//!   not match the family. The authoring-time validator uses it.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::config::GradingDefaults;
use crate::error::GradingError;
use crate::family::Family;

/// Blank id used when a completion submission is a bare string.
pub const LEGACY_BLANK_ID: &str = "BLANK_1";

// ---------------------------------------------------------------------------
// Lenient JSON accessors
// ---------------------------------------------------------------------------

fn field<'a>(value: &'a Value, names: &[&str]) -> Option<&'a Value> {
    let obj = value.as_object()?;
    names.iter().find_map(|n| obj.get(*n))
}

/// Scalar to text. Numbers and booleans keep their JSON spelling.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn text_map(value: Option<&Value>) -> BTreeMap<String, String> {
    value
        .and_then(Value::as_object)
        .map(|obj| obj.iter().map(|(k, v)| (k.clone(), text_of(v))).collect())
        .unwrap_or_default()
}

/// A list of texts, accepting a lone scalar as a one-element list.
fn text_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter(|v| !v.is_array() && !v.is_object() && !v.is_null())
            .map(text_of)
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(Value::Object(_)) => Vec::new(),
        Some(scalar) => vec![text_of(scalar)],
    }
}

fn flag(value: &Value, names: &[&str]) -> bool {
    field(value, names).and_then(Value::as_bool).unwrap_or(false)
}

fn count(value: &Value, names: &[&str], default: usize) -> usize {
    match field(value, names) {
        Some(v) => v
            .as_u64()
            .map(|n| n as usize)
            .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as usize))
            .unwrap_or(default),
        None => default,
    }
}

// ---------------------------------------------------------------------------
// Strict JSON accessors
// ---------------------------------------------------------------------------

struct Strict {
    family: Family,
    what: &'static str,
}

impl Strict {
    fn err(&self, field: &str, expected: &'static str) -> GradingError {
        GradingError::shape(self.family, self.what, field, expected)
    }

    fn object<'a>(&self, value: &'a Value, field: &str) -> Result<&'a Map<String, Value>, GradingError> {
        value.as_object().ok_or_else(|| self.err(field, "an object"))
    }

    fn required<'a>(&self, obj: &'a Map<String, Value>, names: &[&str]) -> Result<&'a Value, GradingError> {
        names
            .iter()
            .find_map(|n| obj.get(*n))
            .ok_or_else(|| self.err(names[0], "a value"))
    }

    fn string(&self, value: &Value, field: &str) -> Result<String, GradingError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.err(field, "a string"))
    }

    fn string_map(&self, value: &Value, field: &str) -> Result<BTreeMap<String, String>, GradingError> {
        self.object(value, field)?
            .iter()
            .map(|(k, v)| Ok((k.clone(), self.string(v, &format!("{field}.{k}"))?)))
            .collect()
    }

    fn string_list(&self, value: &Value, field: &str) -> Result<Vec<String>, GradingError> {
        match value {
            Value::String(s) => Ok(vec![s.clone()]),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| self.string(v, &format!("{field}[{i}]")))
                .collect(),
            _ => Err(self.err(field, "a string or a list of strings")),
        }
    }

    fn opt_bool(&self, obj: &Map<String, Value>, names: &[&str]) -> Result<bool, GradingError> {
        match names.iter().find_map(|n| obj.get(*n)) {
            None | Some(Value::Null) => Ok(false),
            Some(v) => v.as_bool().ok_or_else(|| self.err(names[0], "a boolean")),
        }
    }

    fn opt_count(&self, obj: &Map<String, Value>, names: &[&str], default: usize) -> Result<usize, GradingError> {
        match names.iter().find_map(|n| obj.get(*n)) {
            None | Some(Value::Null) => Ok(default),
            Some(v) => v
                .as_u64()
                .filter(|n| *n > 0)
                .map(|n| n as usize)
                .ok_or_else(|| self.err(names[0], "a positive integer")),
        }
    }
}

// ---------------------------------------------------------------------------
// Answer keys
// ---------------------------------------------------------------------------

/// Accepted answers for one diagram label.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelAnswer {
    /// Pre-listed alternatives, compared literally (no optional-word expansion).
    Alternatives(Vec<String>),
    /// A single answer, expanded for optional words.
    Single(String),
}

/// Reference data for the legacy single-value family.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleKey {
    pub correct_answer: String,
    pub alternative_answers: Vec<String>,
    pub case_sensitive: bool,
}

/// The author-supplied correct answer of a question, one shape per family.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerKey {
    /// blank id → acceptable texts.
    Completion(BTreeMap<String, Vec<String>>),
    /// item number → option letter.
    Matching(BTreeMap<String, String>),
    /// Correct option letters.
    Mcq(Vec<String>),
    /// statement number → TRUE / FALSE / NOT GIVEN (or YES / NO / NOT GIVEN).
    Tfng(BTreeMap<String, String>),
    /// label id → accepted answers.
    Diagram(BTreeMap<String, LabelAnswer>),
    /// Acceptable texts.
    ShortAnswer(Vec<String>),
    Simple(SimpleKey),
}

impl AnswerKey {
    pub fn family(&self) -> Family {
        match self {
            AnswerKey::Completion(_) => Family::Completion,
            AnswerKey::Matching(_) => Family::Matching,
            AnswerKey::Mcq(_) => Family::Mcq,
            AnswerKey::Tfng(_) => Family::Tfng,
            AnswerKey::Diagram(_) => Family::Diagram,
            AnswerKey::ShortAnswer(_) => Family::ShortAnswer,
            AnswerKey::Simple(_) => Family::Simple,
        }
    }

    /// Read `answer_data`, defaulting anything missing or mistyped.
    pub fn lenient(family: Family, data: &Value) -> AnswerKey {
        match family {
            Family::Completion => AnswerKey::Completion(
                field(data, &["blanks"])
                    .and_then(Value::as_object)
                    .map(|obj| {
                        obj.iter()
                            .map(|(k, v)| (k.clone(), text_list(Some(v))))
                            .collect()
                    })
                    .unwrap_or_default(),
            ),
            Family::Matching => AnswerKey::Matching(text_map(field(data, &["mappings"]))),
            Family::Mcq => AnswerKey::Mcq(text_list(field(data, &["correct_options", "correct"]))),
            Family::Tfng => AnswerKey::Tfng(text_map(field(data, &["answers"]))),
            Family::Diagram => AnswerKey::Diagram(
                field(data, &["labels"])
                    .and_then(Value::as_object)
                    .map(|obj| {
                        obj.iter()
                            .map(|(k, v)| {
                                let answer = match v {
                                    Value::Array(_) => LabelAnswer::Alternatives(text_list(Some(v))),
                                    other => LabelAnswer::Single(text_of(other)),
                                };
                                (k.clone(), answer)
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
            ),
            Family::ShortAnswer => {
                AnswerKey::ShortAnswer(text_list(field(data, &["correct_answers"])))
            }
            Family::Simple => AnswerKey::Simple(SimpleKey {
                correct_answer: field(data, &["correct_answer"]).map(text_of).unwrap_or_default(),
                alternative_answers: text_list(field(data, &["alternative_answers"])),
                case_sensitive: flag(data, &["case_sensitive"]),
            }),
        }
    }

    /// Read `answer_data`, rejecting shapes that do not fit `family`.
    pub fn strict(family: Family, data: &Value) -> Result<AnswerKey, GradingError> {
        let s = Strict {
            family,
            what: "answer data",
        };
        let obj = s.object(data, "answer_data")?;

        let key = match family {
            Family::Completion => {
                let blanks = s.object(s.required(obj, &["blanks"])?, "blanks")?;
                AnswerKey::Completion(
                    blanks
                        .iter()
                        .map(|(k, v)| Ok((k.clone(), s.string_list(v, &format!("blanks.{k}"))?)))
                        .collect::<Result<_, GradingError>>()?,
                )
            }
            Family::Matching => {
                AnswerKey::Matching(s.string_map(s.required(obj, &["mappings"])?, "mappings")?)
            }
            Family::Mcq => AnswerKey::Mcq(s.string_list(
                s.required(obj, &["correct_options", "correct"])?,
                "correct_options",
            )?),
            Family::Tfng => {
                AnswerKey::Tfng(s.string_map(s.required(obj, &["answers"])?, "answers")?)
            }
            Family::Diagram => {
                let labels = s.object(s.required(obj, &["labels"])?, "labels")?;
                AnswerKey::Diagram(
                    labels
                        .iter()
                        .map(|(k, v)| {
                            let path = format!("labels.{k}");
                            let answer = match v {
                                Value::String(single) => LabelAnswer::Single(single.clone()),
                                other => LabelAnswer::Alternatives(s.string_list(other, &path)?),
                            };
                            Ok((k.clone(), answer))
                        })
                        .collect::<Result<_, GradingError>>()?,
                )
            }
            Family::ShortAnswer => AnswerKey::ShortAnswer(
                s.string_list(s.required(obj, &["correct_answers"])?, "correct_answers")?,
            ),
            Family::Simple => AnswerKey::Simple(SimpleKey {
                correct_answer: s.string(s.required(obj, &["correct_answer"])?, "correct_answer")?,
                alternative_answers: match obj.get("alternative_answers") {
                    None | Some(Value::Null) => Vec::new(),
                    Some(v) => s.string_list(v, "alternative_answers")?,
                },
                case_sensitive: s.opt_bool(obj, &["case_sensitive"])?,
            }),
        };

        Ok(key)
    }

    /// Number of independently scored sub-parts declared by the key.
    pub fn part_count(&self) -> usize {
        match self {
            AnswerKey::Completion(m) => m.len(),
            AnswerKey::Matching(m) | AnswerKey::Tfng(m) => m.len(),
            AnswerKey::Diagram(m) => m.len(),
            AnswerKey::Mcq(_) | AnswerKey::ShortAnswer(_) | AnswerKey::Simple(_) => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

/// A test-taker's answer, one shape per family.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Completion(BTreeMap<String, String>),
    Matching(BTreeMap<String, String>),
    Mcq(Vec<String>),
    Tfng(BTreeMap<String, String>),
    Diagram(BTreeMap<String, String>),
    ShortAnswer(String),
    Simple(String),
}

impl Submission {
    pub fn family(&self) -> Family {
        match self {
            Submission::Completion(_) => Family::Completion,
            Submission::Matching(_) => Family::Matching,
            Submission::Mcq(_) => Family::Mcq,
            Submission::Tfng(_) => Family::Tfng,
            Submission::Diagram(_) => Family::Diagram,
            Submission::ShortAnswer(_) => Family::ShortAnswer,
            Submission::Simple(_) => Family::Simple,
        }
    }

    /// Read a submitted answer, defaulting anything missing or mistyped.
    pub fn lenient(family: Family, answer: &Value) -> Submission {
        match family {
            Family::Completion => Submission::Completion(match answer {
                Value::String(s) => BTreeMap::from([(LEGACY_BLANK_ID.to_string(), s.clone())]),
                other => text_map(field(other, &["blanks"])),
            }),
            Family::Matching => Submission::Matching(text_map(field(answer, &["mappings"]))),
            Family::Mcq => Submission::Mcq(match answer {
                Value::Object(_) => text_list(field(answer, &["selected"])),
                other => text_list(Some(other)),
            }),
            Family::Tfng => Submission::Tfng(text_map(field(answer, &["answers"]))),
            Family::Diagram => Submission::Diagram(text_map(field(answer, &["labels"]))),
            Family::ShortAnswer => Submission::ShortAnswer(match answer {
                Value::Object(_) => field(answer, &["text"]).map(text_of).unwrap_or_default(),
                other => text_of(other),
            }),
            Family::Simple => Submission::Simple(match answer {
                Value::Object(_) => field(answer, &["text", "answer"]).map(text_of).unwrap_or_default(),
                other => text_of(other),
            }),
        }
    }

    /// Read a submitted answer, rejecting shapes that do not fit `family`.
    pub fn strict(family: Family, answer: &Value) -> Result<Submission, GradingError> {
        let s = Strict {
            family,
            what: "submission",
        };

        let submission = match family {
            Family::Completion => match answer {
                Value::String(text) => {
                    Submission::Completion(BTreeMap::from([(LEGACY_BLANK_ID.to_string(), text.clone())]))
                }
                other => {
                    let obj = s.object(other, "answer")?;
                    Submission::Completion(s.string_map(s.required(obj, &["blanks"])?, "blanks")?)
                }
            },
            Family::Matching => {
                let obj = s.object(answer, "answer")?;
                Submission::Matching(s.string_map(s.required(obj, &["mappings"])?, "mappings")?)
            }
            Family::Mcq => match answer {
                Value::Object(obj) => {
                    Submission::Mcq(s.string_list(s.required(obj, &["selected"])?, "selected")?)
                }
                other => Submission::Mcq(s.string_list(other, "answer")?),
            },
            Family::Tfng => {
                let obj = s.object(answer, "answer")?;
                Submission::Tfng(s.string_map(s.required(obj, &["answers"])?, "answers")?)
            }
            Family::Diagram => {
                let obj = s.object(answer, "answer")?;
                Submission::Diagram(s.string_map(s.required(obj, &["labels"])?, "labels")?)
            }
            Family::ShortAnswer => match answer {
                Value::Object(obj) => {
                    Submission::ShortAnswer(s.string(s.required(obj, &["text"])?, "text")?)
                }
                other => Submission::ShortAnswer(s.string(other, "answer")?),
            },
            Family::Simple => match answer {
                Value::Object(obj) => {
                    Submission::Simple(s.string(s.required(obj, &["text", "answer"])?, "text")?)
                }
                other => Submission::Simple(s.string(other, "answer")?),
            },
        };

        Ok(submission)
    }
}

// ---------------------------------------------------------------------------
// Type configuration
// ---------------------------------------------------------------------------

/// Word budget and case handling for one completion blank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlankConfig {
    pub max_words: usize,
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionConfig {
    /// Per-blank settings keyed by blank id.
    pub blanks: BTreeMap<String, BlankConfig>,
    /// Applied to blanks without their own entry.
    pub default_blank: BlankConfig,
    /// Template text with `[BLANK_n]` markers, if the author supplied one.
    pub template: Option<String>,
}

impl CompletionConfig {
    pub fn blank(&self, blank_id: &str) -> BlankConfig {
        self.blanks.get(blank_id).copied().unwrap_or(self.default_blank)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchingConfig {
    pub allow_option_reuse: bool,
    /// Declared item numbers.
    pub items: Vec<String>,
    /// Declared option letters.
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct McqConfig {
    pub allow_multiple: bool,
    /// Declared option labels.
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagramConfig {
    pub max_words_per_label: usize,
    pub image_url: Option<String>,
    /// Declared label ids.
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShortAnswerConfig {
    pub max_words: usize,
    pub case_sensitive: bool,
}

/// Per-family grading parameters (`type_config`).
#[derive(Debug, Clone, PartialEq)]
pub enum TypeConfig {
    Completion(CompletionConfig),
    Matching(MatchingConfig),
    Mcq(McqConfig),
    Tfng,
    Diagram(DiagramConfig),
    ShortAnswer(ShortAnswerConfig),
    Simple,
}

/// Pull identifiers out of a list of objects, e.g. `[{"letter": "A"}, ...]`.
fn ids_of(list: Option<&Value>, names: &[&str]) -> Vec<String> {
    list.and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(_) => field(item, names).map(text_of),
                    Value::String(s) => Some(s.clone()),
                    _ => None,
                })
                .filter(|id| !id.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

const BLANK_ID: &[&str] = &["blank_id", "id"];
const MAX_WORDS: &[&str] = &["max_words", "maxWords"];
const CASE_SENSITIVE: &[&str] = &["case_sensitive", "caseSensitive"];
const ALLOW_MULTIPLE: &[&str] = &["allow_multiple", "multi_select"];
const ALLOW_REUSE: &[&str] = &["allow_option_reuse", "allow_multiple_use"];
const MAX_WORDS_PER_LABEL: &[&str] = &["max_words_per_label", "maxWordsPerLabel"];
const ITEM_ID: &[&str] = &["item_number", "number"];
const OPTION_ID: &[&str] = &["option_label", "letter", "label"];
const LABEL_ID: &[&str] = &["id", "label_id"];
const TEMPLATE: &[&str] = &["template_text", "template"];

impl TypeConfig {
    pub fn family(&self) -> Family {
        match self {
            TypeConfig::Completion(_) => Family::Completion,
            TypeConfig::Matching(_) => Family::Matching,
            TypeConfig::Mcq(_) => Family::Mcq,
            TypeConfig::Tfng => Family::Tfng,
            TypeConfig::Diagram(_) => Family::Diagram,
            TypeConfig::ShortAnswer(_) => Family::ShortAnswer,
            TypeConfig::Simple => Family::Simple,
        }
    }

    /// Read `type_config`, filling gaps from `defaults`.
    pub fn lenient(family: Family, config: &Value, defaults: &GradingDefaults) -> TypeConfig {
        match family {
            Family::Completion => {
                let default_blank = BlankConfig {
                    max_words: defaults.completion_max_words,
                    case_sensitive: false,
                };
                let blanks = field(config, &["blanks"])
                    .and_then(Value::as_array)
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(|b| {
                                let id = field(b, BLANK_ID).map(text_of)?;
                                Some((
                                    id,
                                    BlankConfig {
                                        max_words: count(b, MAX_WORDS, default_blank.max_words),
                                        case_sensitive: flag(b, CASE_SENSITIVE),
                                    },
                                ))
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                TypeConfig::Completion(CompletionConfig {
                    blanks,
                    default_blank,
                    template: field(config, TEMPLATE).and_then(Value::as_str).map(str::to_string),
                })
            }
            Family::Matching => TypeConfig::Matching(MatchingConfig {
                allow_option_reuse: flag(config, ALLOW_REUSE),
                items: ids_of(field(config, &["items"]), ITEM_ID),
                options: ids_of(field(config, &["options"]), OPTION_ID),
            }),
            Family::Mcq => TypeConfig::Mcq(McqConfig {
                allow_multiple: flag(config, ALLOW_MULTIPLE),
                options: ids_of(field(config, &["options"]), OPTION_ID),
            }),
            Family::Tfng => TypeConfig::Tfng,
            Family::Diagram => TypeConfig::Diagram(DiagramConfig {
                max_words_per_label: count(config, MAX_WORDS_PER_LABEL, defaults.diagram_max_words),
                image_url: field(config, &["image_url"]).and_then(Value::as_str).map(str::to_string),
                labels: ids_of(field(config, &["labels"]), LABEL_ID),
            }),
            Family::ShortAnswer => TypeConfig::ShortAnswer(ShortAnswerConfig {
                max_words: count(config, MAX_WORDS, defaults.short_answer_max_words),
                case_sensitive: flag(config, CASE_SENSITIVE),
            }),
            Family::Simple => TypeConfig::Simple,
        }
    }

    /// Read `type_config`, rejecting mistyped fields. A null config is
    /// treated as empty.
    pub fn strict(family: Family, config: &Value, defaults: &GradingDefaults) -> Result<TypeConfig, GradingError> {
        let s = Strict {
            family,
            what: "type config",
        };
        let empty = Map::new();
        let obj = match config {
            Value::Null => &empty,
            other => s.object(other, "type_config")?,
        };

        match family {
            Family::Completion => {
                let mut blanks = BTreeMap::new();
                if let Some(list) = obj.get("blanks") {
                    let items = list.as_array().ok_or_else(|| s.err("blanks", "a list"))?;
                    for (i, item) in items.iter().enumerate() {
                        let path = format!("blanks[{i}]");
                        let b = s.object(item, &path)?;
                        let id = s.string(s.required(b, BLANK_ID)?, &format!("{path}.blank_id"))?;
                        let blank = BlankConfig {
                            max_words: s.opt_count(b, MAX_WORDS, defaults.completion_max_words)?,
                            case_sensitive: s.opt_bool(b, CASE_SENSITIVE)?,
                        };
                        blanks.insert(id, blank);
                    }
                }
                let template = match TEMPLATE.iter().find_map(|n| obj.get(*n)) {
                    None | Some(Value::Null) => None,
                    Some(v) => Some(s.string(v, "template_text")?),
                };
                Ok(TypeConfig::Completion(CompletionConfig {
                    blanks,
                    default_blank: BlankConfig {
                        max_words: defaults.completion_max_words,
                        case_sensitive: false,
                    },
                    template,
                }))
            }
            Family::Diagram => Ok(TypeConfig::Diagram(DiagramConfig {
                max_words_per_label: s.opt_count(obj, MAX_WORDS_PER_LABEL, defaults.diagram_max_words)?,
                image_url: match obj.get("image_url") {
                    None | Some(Value::Null) => None,
                    Some(v) => Some(s.string(v, "image_url")?),
                },
                labels: ids_of(obj.get("labels"), LABEL_ID),
            })),
            Family::ShortAnswer => Ok(TypeConfig::ShortAnswer(ShortAnswerConfig {
                max_words: s.opt_count(obj, MAX_WORDS, defaults.short_answer_max_words)?,
                case_sensitive: s.opt_bool(obj, CASE_SENSITIVE)?,
            })),
            Family::Matching => {
                s.opt_bool(obj, ALLOW_REUSE)?;
                Ok(TypeConfig::lenient(family, config, defaults))
            }
            Family::Mcq => {
                s.opt_bool(obj, ALLOW_MULTIPLE)?;
                Ok(TypeConfig::lenient(family, config, defaults))
            }
            Family::Tfng | Family::Simple => Ok(TypeConfig::lenient(family, config, defaults)),
        }
    }
}
