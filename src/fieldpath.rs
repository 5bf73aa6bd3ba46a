//! Field paths into unstructured JSON
//!
//! A field path addresses a value inside an object: `spec.forProvider.region`,
//! `spec.forProvider.tags[0]`, `metadata.labels[app.kubernetes.io/name]`.
//! Bracketed segments holding a non-negative integer index into arrays; any
//! other bracketed text is a map key, which is how keys containing dots are
//! written.

use serde_json::{Map, Value};

/// One step of a parsed field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Field(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldPathError {
    #[error("field path is empty")]
    Empty,

    #[error("{path}: empty field name at position {position}")]
    EmptyField { path: String, position: usize },

    #[error("{path}: unterminated '[' at position {position}")]
    Unterminated { path: String, position: usize },

    #[error("{path}: empty brackets at position {position}")]
    EmptyBrackets { path: String, position: usize },

    #[error("{path}: unexpected character '{found}' at position {position}")]
    Unexpected {
        path: String,
        position: usize,
        found: char,
    },

    #[error("{path}: {segment} is not an object")]
    NotAnObject { path: String, segment: String },

    #[error("{path}: {segment} is not an array")]
    NotAnArray { path: String, segment: String },

    #[error("{path}: index {index} is past the end of {segment} and above {MAX_PADDED_INDEX}")]
    IndexTooLarge {
        path: String,
        segment: String,
        index: usize,
    },
}

/// Highest index a write may pad an array up to. Indexes into existing
/// elements are always allowed.
pub const MAX_PADDED_INDEX: usize = 4096;

/// Split a field path into segments.
pub fn parse(path: &str) -> Result<Vec<Segment>, FieldPathError> {
    if path.is_empty() {
        return Err(FieldPathError::Empty);
    }

    let mut segments = Vec::new();
    let mut name = String::new();
    // A field name is required here: start of path or right after a '.'.
    let mut expect_name = true;
    // Right after ']' only '.' or '[' may follow.
    let mut after_bracket = false;
    let mut chars = path.char_indices();

    while let Some((position, c)) = chars.next() {
        match c {
            '.' => {
                if name.is_empty() && !after_bracket {
                    return Err(FieldPathError::EmptyField {
                        path: path.to_string(),
                        position,
                    });
                }
                if !name.is_empty() {
                    segments.push(Segment::Field(std::mem::take(&mut name)));
                }
                expect_name = true;
                after_bracket = false;
            }
            '[' => {
                if !name.is_empty() {
                    segments.push(Segment::Field(std::mem::take(&mut name)));
                } else if expect_name && !segments.is_empty() {
                    // "a.[0]"
                    return Err(FieldPathError::EmptyField {
                        path: path.to_string(),
                        position,
                    });
                }
                let mut inner = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    inner.push(c);
                }
                if !closed {
                    return Err(FieldPathError::Unterminated {
                        path: path.to_string(),
                        position,
                    });
                }
                if inner.is_empty() {
                    return Err(FieldPathError::EmptyBrackets {
                        path: path.to_string(),
                        position,
                    });
                }
                segments.push(match inner.parse::<usize>() {
                    Ok(index) => Segment::Index(index),
                    Err(_) => Segment::Field(inner),
                });
                expect_name = false;
                after_bracket = true;
            }
            ']' => {
                return Err(FieldPathError::Unexpected {
                    path: path.to_string(),
                    position,
                    found: c,
                });
            }
            c => {
                if after_bracket {
                    return Err(FieldPathError::Unexpected {
                        path: path.to_string(),
                        position,
                        found: c,
                    });
                }
                name.push(c);
                expect_name = false;
            }
        }
    }

    if !name.is_empty() {
        segments.push(Segment::Field(name));
    } else if expect_name {
        return Err(FieldPathError::EmptyField {
            path: path.to_string(),
            position: path.len(),
        });
    }

    Ok(segments)
}

/// Read the value at `path`, if every segment exists.
pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let segments = parse(path).ok()?;
    segments.iter().try_fold(root, |current, segment| match segment {
        Segment::Field(name) => current.as_object()?.get(name),
        Segment::Index(index) => current.as_array()?.get(*index),
    })
}

/// Read the string at `path`.
pub fn get_str<'a>(root: &'a Value, path: &str) -> Option<&'a str> {
    get(root, path).and_then(Value::as_str)
}

/// Write `value` at `path`, creating intermediate objects and arrays as
/// needed. Arrays are padded with nulls up to the written index. Writing
/// through an existing scalar is an error.
pub fn set(root: &mut Value, path: &str, value: Value) -> Result<(), FieldPathError> {
    let segments = parse(path)?;
    let last = segments.len() - 1;
    let mut current = root;

    for (i, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Field(name) => {
                if current.is_null() {
                    *current = Value::Object(Map::new());
                }
                let map = match current {
                    Value::Object(map) => map,
                    _ => {
                        return Err(FieldPathError::NotAnObject {
                            path: path.to_string(),
                            segment: describe(&segments[..i]),
                        });
                    }
                };
                if i == last {
                    map.insert(name.clone(), value);
                    return Ok(());
                }
                current = map.entry(name.clone()).or_insert(Value::Null);
            }
            Segment::Index(index) => {
                if current.is_null() {
                    *current = Value::Array(Vec::new());
                }
                let items = match current {
                    Value::Array(items) => items,
                    _ => {
                        return Err(FieldPathError::NotAnArray {
                            path: path.to_string(),
                            segment: describe(&segments[..i]),
                        });
                    }
                };
                if items.len() <= *index {
                    if *index > MAX_PADDED_INDEX {
                        return Err(FieldPathError::IndexTooLarge {
                            path: path.to_string(),
                            segment: describe(&segments[..i]),
                            index: *index,
                        });
                    }
                    items.resize(index + 1, Value::Null);
                }
                if i == last {
                    items[*index] = value;
                    return Ok(());
                }
                current = &mut items[*index];
            }
        }
    }

    Ok(())
}

fn describe(segments: &[Segment]) -> String {
    if segments.is_empty() {
        return "root".to_string();
    }
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Field(name) if name.contains('.') => out.push_str(&format!("[{}]", name)),
            Segment::Field(name) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(name);
            }
            Segment::Index(index) => out.push_str(&format!("[{}]", index)),
        }
    }
    out
}
