//! OpenAPI fragment describing one books API generation.

use serde_json::{json, Value};
use utoipa::PartialSchema;

use super::models::{Book, BookEnvelope, BookList};
use super::schema::{BookInput, BookPatchInput};

fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}

fn json_content(schema: Value) -> Value {
    json!({ "application/json": { "schema": schema } })
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": json_content(schema_ref("ErrorResponse"))
    })
}

/// Responses every operation can produce besides its success case.
fn common_errors(has_id: bool, has_body: bool) -> serde_json::Map<String, Value> {
    let mut responses = serde_json::Map::new();
    if has_id || has_body {
        responses.insert("400".into(), error_response("Invalid path parameter or body"));
    }
    responses.insert("401".into(), error_response("Missing or invalid bearer token"));
    if has_id {
        responses.insert("404".into(), error_response("Book not found"));
    }
    responses.insert("500".into(), error_response("Internal Server Error"));
    responses
}

struct Operation<'a> {
    summary: &'a str,
    tag: &'a str,
    has_id: bool,
    body: Option<&'a str>,
    status: &'a str,
    description: &'a str,
    response: &'a str,
}

impl Operation<'_> {
    fn render(&self) -> Value {
        let mut responses = common_errors(self.has_id, self.body.is_some());
        responses.insert(
            self.status.into(),
            json!({
                "description": self.description,
                "content": json_content(schema_ref(self.response))
            }),
        );

        let mut operation = json!({
            "summary": self.summary,
            "tags": [self.tag],
            "security": [{ "Bearer": [] }],
            "responses": responses
        });

        if self.has_id {
            operation["parameters"] = json!([{
                "name": "id",
                "in": "path",
                "required": true,
                "schema": { "type": "integer", "format": "int64" },
                "example": 1
            }]);
        }
        if let Some(body) = self.body {
            operation["requestBody"] = json!({
                "required": true,
                "content": json_content(schema_ref(body))
            });
        }

        operation
    }
}

/// Build the paths and schemas for a books router; paths are relative to its base path.
pub fn fragment(tag: &str) -> Value {
    let list = Operation {
        summary: "List books",
        tag,
        has_id: false,
        body: None,
        status: "200",
        description: "All books ordered by id",
        response: "BookList",
    };
    let create = Operation {
        summary: "Create a book",
        tag,
        has_id: false,
        body: Some("CreateBook"),
        status: "201",
        description: "The created book",
        response: "BookEnvelope",
    };
    let get = Operation {
        summary: "Get a book by id",
        tag,
        has_id: true,
        body: None,
        status: "200",
        description: "A single book",
        response: "BookEnvelope",
    };
    let replace = Operation {
        summary: "Replace a book",
        tag,
        has_id: true,
        body: Some("CreateBook"),
        status: "200",
        description: "The updated book",
        response: "Book",
    };
    let patch = Operation {
        summary: "Partially update a book",
        tag,
        has_id: true,
        body: Some("UpdateBook"),
        status: "200",
        description: "The patched book",
        response: "Book",
    };
    let delete = Operation {
        summary: "Delete a book",
        tag,
        has_id: true,
        body: None,
        status: "200",
        description: "The deleted book",
        response: "Book",
    };

    json!({
        "paths": {
            "": {
                "get": list.render(),
                "post": create.render()
            },
            "/{id}": {
                "get": get.render(),
                "put": replace.render(),
                "patch": patch.render(),
                "delete": delete.render()
            }
        },
        "components": {
            "schemas": {
                "Book": Book::schema(),
                "BookList": BookList::schema(),
                "BookEnvelope": BookEnvelope::schema(),
                "CreateBook": BookInput::schema(),
                "UpdateBook": BookPatchInput::schema()
            }
        }
    })
}
