//! GraphQL rendering and response unwrapping for generative `Get` queries.

use serde_json::Value;

use crate::error::LlmError;
use crate::types::{GenerateResult, GenerativeInstruction, SearchRecord, SearchRequest};

const ADDITIONAL: &str = "_additional";

/// Render `request` as a GraphQL `Get` document.
pub fn render_query(request: &SearchRequest) -> Result<String, LlmError> {
    validate_name("collection", &request.collection)?;
    for property in &request.properties {
        validate_name("property", property)?;
    }
    if request.near_text.concepts.is_empty() {
        return Err(LlmError::InvalidInput(
            "nearText needs at least one concept".to_string(),
        ));
    }

    let concepts = request
        .near_text
        .concepts
        .iter()
        .map(|c| quote(c))
        .collect::<Result<Vec<_>, _>>()?
        .join(", ");

    let mut near_text = format!("concepts: [{concepts}]");
    if let Some(distance) = request.near_text.distance {
        if !distance.is_finite() {
            return Err(LlmError::InvalidInput(format!(
                "nearText distance must be finite, got {distance}"
            )));
        }
        near_text.push_str(&format!(", distance: {distance}"));
    }

    let mut arguments = vec![format!("nearText: {{{near_text}}}")];
    if let Some(limit) = request.limit {
        arguments.push(format!("limit: {limit}"));
    }

    let mut selection: Vec<String> = request.properties.clone();
    if let Some(generate) = &request.generate {
        let block = match generate {
            GenerativeInstruction::SinglePrompt(prompt) => format!(
                "generate(singleResult: {{prompt: {}}}) {{ singleResult error }}",
                quote(prompt)?
            ),
            GenerativeInstruction::GroupedTask(task) => format!(
                "generate(groupedResult: {{task: {}}}) {{ groupedResult error }}",
                quote(task)?
            ),
        };
        selection.push(format!("{ADDITIONAL} {{ {block} }}"));
    }
    if selection.is_empty() {
        // GraphQL requires a non-empty selection set.
        selection.push(format!("{ADDITIONAL} {{ id }}"));
    }

    Ok(format!(
        "{{ Get {{ {}({}) {{ {} }} }} }}",
        request.collection,
        arguments.join(", "),
        selection.join(" ")
    ))
}

/// Unwrap `data.Get.<collection>` into records.
///
/// A non-empty `errors` array fails with its first message.
pub fn parse_response(collection: &str, body: &Value) -> Result<Vec<SearchRecord>, LlmError> {
    if let Some(errors) = body.get("errors")
        && !errors.is_null()
    {
        let first = errors.as_array().and_then(|list| list.first());
        let message = first
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| errors.to_string());
        if first.is_some() || !errors.is_array() {
            return Err(LlmError::SearchError(message));
        }
    }

    let items = body
        .get("data")
        .and_then(|d| d.get("Get"))
        .and_then(|g| g.get(collection))
        .ok_or_else(|| {
            LlmError::ParseError(format!("response has no data.Get.{collection}"))
        })?;

    let items = match items {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => {
            return Err(LlmError::ParseError(format!(
                "data.Get.{collection} is not a list: {other}"
            )));
        }
    };

    items.iter().map(parse_record).collect()
}

fn parse_record(item: &Value) -> Result<SearchRecord, LlmError> {
    let mut properties = item
        .as_object()
        .cloned()
        .ok_or_else(|| LlmError::ParseError(format!("search record is not an object: {item}")))?;

    let generate = match properties.remove(ADDITIONAL) {
        Some(additional) => match additional.get("generate") {
            Some(Value::Null) | None => None,
            Some(g) => Some(serde_json::from_value::<GenerateResult>(g.clone())?),
        },
        None => None,
    };

    Ok(SearchRecord {
        properties,
        generate,
    })
}

fn quote(s: &str) -> Result<String, LlmError> {
    // A JSON string literal is a valid GraphQL string literal.
    Ok(serde_json::to_string(s)?)
}

fn validate_name(kind: &str, name: &str) -> Result<(), LlmError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(LlmError::InvalidInput(format!(
            "'{name}' is not a valid GraphQL {kind} name"
        )))
    }
}
