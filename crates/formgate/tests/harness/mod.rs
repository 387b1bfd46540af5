//! Shared schemas and request helpers for the integration tests.

#![allow(dead_code)]

use formgate::{
    Field, FieldBuilder, FieldType, Form, Input, QueryRequest, Schema, SchemaBuilder, Setting,
    Value, ValueType,
};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::Arc;

pub fn re(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

pub fn query(q: &str) -> QueryRequest {
    formgate_logging::init_test_logging();
    QueryRequest::parse(q)
}

pub fn names(fields: &[Field<'_>]) -> Vec<String> {
    fields.iter().map(|f| f.name().to_string()).collect()
}

/// Strip one trailing line break, like a line-oriented input box would.
fn chomp(s: &str) -> &str {
    s.strip_suffix("\r\n")
        .or_else(|| s.strip_suffix('\n'))
        .or_else(|| s.strip_suffix('\r'))
        .unwrap_or(s)
}

/// A form exercising most field options.
pub fn test_schema() -> Arc<Schema> {
    formgate_logging::init_test_logging();
    let schema = SchemaBuilder::new("test_form")
        .required(FieldBuilder::new("query").code("q"))
        .field(
            FieldBuilder::new("email")
                .title("Email")
                .form_title("Your email")
                .error_title("email address")
                .matches(re("@"))
                .field_type(FieldType::Email),
        )
        .field(
            FieldBuilder::new("age")
                .min(1.0)
                .max(200.0)
                .filter(|s| Some(s.parse::<i128>().map_or_else(|_| Value::from(s), Value::Int)))
                .accepts([ValueType::Int])
                .tag("filter"),
        )
        .field(
            FieldBuilder::new("rate")
                .inf(0.0)
                .sup(1.0)
                .reject(re("(?i)[a-z]"))
                .reject(re("[-+]"))
                .tags(Setting::computed(|_| {
                    vec!["filter".to_string(), "float".to_string()]
                }))
                .tag("mix")
                .disabled(true),
        )
        .field(
            FieldBuilder::new("text")
                .max_size(1000)
                .min_bytesize(2)
                .max_bytesize(1999)
                .no_filter(),
        )
        .field(
            FieldBuilder::new("password")
                .title("Password")
                .min_size(6)
                .max_size(16)
                .matches(re("[A-Z]"))
                .matches(re("[a-z]"))
                .matches(re(r"\d"))
                .msg("Password must contain one lowercase and one uppercase letter and one digit")
                .field_type(FieldType::Password)
                .filter(|s| Some(Value::from(chomp(s)))),
        )
        .array(
            FieldBuilder::new("opts")
                .min_count(2)
                .max_count(3)
                .matches(re(r"^[01]$"))
                .check(|c| {
                    let ones = match c.value() {
                        Some(Value::Array(items)) => {
                            items.iter().filter(|v| v.to_f64() == 1.0).count()
                        }
                        _ => 0,
                    };
                    if ones != 1 {
                        c.report("Only one option may be set");
                    }
                }),
        )
        .hash(
            FieldBuilder::new("on")
                .min_count(2)
                .max_count(4)
                .matches(re(r"^\d$"))
                .hidden()
                .test(|c, value| {
                    if value.to_f64() > 8.0 {
                        c.report("%p value is too large");
                    }
                }),
        )
        .build()
        .unwrap();
    Arc::new(schema)
}

/// Post `params` on top of `q=1` and render the outcome: the query string of a
/// valid form, else its error messages joined by `:`.
pub fn post(params: Vec<(&str, Input)>) -> String {
    let mut request: IndexMap<String, Input> = IndexMap::new();
    request.insert("q".to_string(), Input::text("1"));
    for (code, input) in params {
        request.insert(code.to_string(), input);
    }
    let form = Form::from_request(test_schema(), &request);
    if form.is_valid() {
        form.query_string()
    } else {
        form.error_messages().join(":")
    }
}

/// Six steps; `intro` and `post` have no fields.
pub fn steps_schema() -> Arc<Schema> {
    formgate_logging::init_test_logging();
    let schema = SchemaBuilder::new("steps_form")
        .steps(&[
            ("intro", Some("Intro")),
            ("email", Some("Email")),
            ("name", Some("Name")),
            ("address", Some("Address")),
            ("message", Some("Message")),
            ("post", None),
        ])
        .required(FieldBuilder::new("email").tag("email"))
        .field(FieldBuilder::new("first_name").tag("name"))
        .field(FieldBuilder::new("last_name").tag("name"))
        .field(FieldBuilder::new("street").tag("address"))
        .field(FieldBuilder::new("city").tag("address"))
        .field(FieldBuilder::new("zip").tag("address"))
        .required(FieldBuilder::new("message").tag("message"))
        .field(FieldBuilder::new("comment").tag("message"))
        .field(FieldBuilder::new("url").hidden())
        .build()
        .unwrap();
    Arc::new(schema)
}

/// Parameters which make the given step valid.
pub fn step_params(step: Option<&str>) -> &'static str {
    match step {
        Some("email") => "email=john@foo.com",
        Some("message") => "message=blah",
        _ => "",
    }
}
