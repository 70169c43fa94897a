use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A segment of a JSON path such as `data[0].first_name` or `data.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathToken {
    Field(String),
    Index(usize),
    Len,
}

pub fn tokenize_path(path: &str) -> Vec<PathToken> {
    let mut tokens = Vec::new();
    for segment in path.split('.') {
        if segment.is_empty() {
            continue;
        }
        if segment == "len()" {
            tokens.push(PathToken::Len);
            continue;
        }
        let Some(bracket_pos) = segment.find('[') else {
            tokens.push(PathToken::Field(segment.to_string()));
            continue;
        };
        let field = &segment[..bracket_pos];
        if !field.is_empty() {
            tokens.push(PathToken::Field(field.to_string()));
        }
        let mut rest = &segment[bracket_pos..];
        while let Some(start) = rest.find('[') {
            let end = rest.find(']').expect("unclosed bracket in JSON path");
            let index: usize = rest[start + 1..end]
                .parse()
                .expect("non-numeric array index in JSON path");
            tokens.push(PathToken::Index(index));
            rest = &rest[end + 1..];
        }
    }
    tokens
}

/// Resolve `path` against `root`. Missing segments resolve to `null`.
pub fn resolve_path(root: &Value, path: &str) -> Value {
    let mut current = root.clone();
    for token in tokenize_path(path) {
        current = match token {
            PathToken::Field(name) => current.get(&name).cloned().unwrap_or(Value::Null),
            PathToken::Index(idx) => current.get(idx).cloned().unwrap_or(Value::Null),
            PathToken::Len => match &current {
                Value::Array(a) => Value::from(a.len()),
                Value::Object(o) => Value::from(o.len()),
                other => panic!("len() applied to non-collection in path \"{path}\": got {other}"),
            },
        };
    }
    current
}

/// JSON-path assertions over a serialized result.
///
/// ```ignore
/// JsonAssert::new(&result)
///     .assert_path("recordsFiltered", 1)
///     .assert_path("data[0].first_name", "Cromie");
/// ```
pub struct JsonAssert {
    root: Value,
}

impl JsonAssert {
    pub fn new(value: &impl Serialize) -> Self {
        let root = serde_json::to_value(value).expect("value must serialize to JSON");
        Self { root }
    }

    pub fn assert_path(self, path: &str, expected: impl Into<Value>) -> Self {
        let actual = resolve_path(&self.root, path);
        let expected = expected.into();
        assert_eq!(
            actual, expected,
            "JSON path \"{path}\" assertion failed\n  Expected: {expected}\n  Actual:   {actual}\n  Body: {}",
            self.root
        );
        self
    }

    pub fn assert_path_fn(self, path: &str, predicate: impl FnOnce(&Value) -> bool) -> Self {
        let actual = resolve_path(&self.root, path);
        assert!(
            predicate(&actual),
            "JSON path \"{path}\" predicate failed\n  Value: {actual}\n  Body: {}",
            self.root
        );
        self
    }

    /// Extract and deserialize the value at `path`.
    pub fn path<T: DeserializeOwned>(&self, path: &str) -> T {
        let value = resolve_path(&self.root, path);
        serde_json::from_value(value.clone())
            .unwrap_or_else(|e| panic!("Failed to deserialize JSON path \"{path}\": {e}\n  Value: {value}"))
    }

    pub fn root(&self) -> &Value {
        &self.root
    }
}
