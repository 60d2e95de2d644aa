use std::sync::Arc;

use async_graphql::dynamic::Schema;
use people_engine::{
    build_engine,
    graphql::{build_schema, SchemaOptions},
    registry::{ArgumentShape, ArgumentSpec, ArgumentType, FieldDescriptor, OperationDescriptor, OutputShape, ScalarType},
    Dataset, EntityKind, Hobby, Person, RecordStore, ResolutionEngine, Resolved, SchemaRegistry, MAX_RECORD_ID,
};
use serde_json::{json, Value};

fn schema() -> Schema {
    let engine = build_engine(Dataset {
        hobbies: vec![
            Hobby {
                id: 1,
                name: "chess".to_string(),
            },
            Hobby {
                id: 2,
                name: "running".to_string(),
            },
        ],
        people: vec![Person {
            id: 1,
            name: "Ada".to_string(),
            hobbies: vec![1, 2],
        }],
    })
    .unwrap();

    build_schema(engine, SchemaOptions::default()).unwrap()
}

async fn execute(schema: &Schema, query: &str) -> Value {
    serde_json::to_value(schema.execute(query).await).unwrap()
}

#[tokio::test]
async fn person_with_hobbies() {
    let schema = schema();

    let response = execute(&schema, "{ person(id: 1) { id name hobbies { id name } } }").await;

    insta::assert_json_snapshot!(response, @r#"
    {
      "data": {
        "person": {
          "id": "1",
          "name": "Ada",
          "hobbies": [
            {
              "id": "1",
              "name": "chess"
            },
            {
              "id": "2",
              "name": "running"
            }
          ]
        }
      }
    }
    "#);
}

#[tokio::test]
async fn missing_records_are_null() {
    let schema = schema();

    let response = execute(&schema, "{ hobby(id: 999) { id name } person(id: 5) { name } }").await;

    insta::assert_json_snapshot!(response, @r#"
    {
      "data": {
        "hobby": null,
        "person": null
      }
    }
    "#);
}

#[tokio::test]
async fn add_person_then_list_people() {
    let schema = schema();

    let response = execute(
        &schema,
        r#"mutation { addPerson(person: { name: "Grace", hobbies: [1, 3] }) { id name hobbies { name } } }"#,
    )
    .await;

    insta::assert_json_snapshot!(response, @r#"
    {
      "data": {
        "addPerson": {
          "id": "2",
          "name": "Grace",
          "hobbies": [
            {
              "name": "chess"
            },
            null
          ]
        }
      }
    }
    "#);

    let response = execute(&schema, "{ people { id name } hobbies { name } }").await;

    insta::assert_json_snapshot!(response, @r#"
    {
      "data": {
        "people": [
          {
            "id": "1",
            "name": "Ada"
          },
          {
            "id": "2",
            "name": "Grace"
          }
        ],
        "hobbies": [
          {
            "name": "chess"
          },
          {
            "name": "running"
          }
        ]
      }
    }
    "#);
}

#[tokio::test]
async fn variables_feed_the_grouped_input() {
    let schema = schema();

    let request = async_graphql::Request::new(
        "mutation($person: CreatePersonInput!) { addPerson(person: $person) { name hobbies { id } } }",
    )
    .variables(async_graphql::Variables::from_json(serde_json::json!({
        "person": { "name": "Linus", "hobbies": [2] }
    })));

    let response = serde_json::to_value(schema.execute(request).await).unwrap();

    insta::assert_json_snapshot!(response, @r#"
    {
      "data": {
        "addPerson": {
          "name": "Linus",
          "hobbies": [
            {
              "id": "2"
            }
          ]
        }
      }
    }
    "#);
}

#[tokio::test]
async fn wrong_argument_types_are_rejected() {
    let schema = schema();

    let response = schema.execute(r#"{ person(id: "one") { name } }"#).await;

    assert_eq!(1, response.errors.len());
    assert_eq!(async_graphql::Value::Null, response.data);
}

#[test]
fn derived_sdl() {
    let sdl = schema().sdl();

    for expected in [
        "person(id: Int!): Person",
        "people: [Person!]!",
        "hobby(id: Int!): Hobby",
        "hobbies: [Hobby!]!",
        "addPerson(person: CreatePersonInput!): Person!",
        "input CreatePersonInput",
        "hobbies: [Int!]!",
        "hobbies: [Hobby]!",
        "type Mutation",
    ] {
        assert!(sdl.contains(expected), "`{expected}` not found in:\n{sdl}");
    }
}

#[tokio::test]
async fn introspection_can_be_disabled() {
    let engine = build_engine(Dataset::builtin()).unwrap();
    let schema = build_schema(engine, SchemaOptions { introspection: false }).unwrap();

    let response = execute(&schema, "{ __schema { queryType { name } } }").await;
    assert!(!response.to_string().contains(r#""Query""#), "{response}");

    let response = schema.execute("{ hobbies { name } }").await;
    assert!(response.errors.is_empty());
}

/// Keeps the parts of each error a client branches on.
fn errors(response: &Value) -> Value {
    let errors = response["errors"].as_array().cloned().unwrap_or_default();

    errors
        .iter()
        .map(|error| {
            json!({
                "message": error["message"],
                "path": error["path"],
                "code": error["extensions"]["code"],
            })
        })
        .collect()
}

#[tokio::test]
async fn engine_errors_carry_their_code() {
    let registry = SchemaRegistry::builder()
        .register_entity(
            EntityKind::Hobby,
            [
                FieldDescriptor::scalar("id", "id", ScalarType::Id),
                FieldDescriptor::scalar("name", "name", ScalarType::String),
            ],
        )
        .register_operation(OperationDescriptor::query(
            "strict",
            ArgumentShape::none().with(ArgumentSpec::optional("limit", ArgumentType::Int)),
            OutputShape::optional(EntityKind::Hobby),
            |_, args| {
                args.int("limit")?;
                Ok(Resolved::NotFound)
            },
        ))
        .register_operation(OperationDescriptor::query(
            "reseed",
            ArgumentShape::none(),
            OutputShape::optional(EntityKind::Hobby),
            |store, _| {
                store.append(
                    Hobby {
                        id: 1,
                        name: "go".to_string(),
                    }
                    .into(),
                )?;
                Ok(Resolved::NotFound)
            },
        ))
        .register_operation(OperationDescriptor::query(
            "misdeclared",
            ArgumentShape::none(),
            OutputShape::optional(EntityKind::Hobby),
            |_, _| Ok(Resolved::Many(Vec::new())),
        ))
        .build()
        .unwrap();

    let store = RecordStore::seeded(Dataset {
        hobbies: vec![Hobby {
            id: 1,
            name: "chess".to_string(),
        }],
        people: vec![],
    })
    .unwrap();

    let engine = ResolutionEngine::new(Arc::new(registry), Arc::new(store));
    let schema = build_schema(engine, SchemaOptions::default()).unwrap();

    let mut all = Vec::new();

    for (field, query) in [
        ("strict", "{ strict { id } }"),
        ("reseed", "{ reseed { id } }"),
        ("misdeclared", "{ misdeclared { id } }"),
    ] {
        let response = execute(&schema, query).await;
        assert_eq!(json!({ field: null }), response["data"]);

        all.extend(errors(&response).as_array().cloned().unwrap_or_default());
    }

    insta::assert_json_snapshot!(all, @r#"
    [
      {
        "message": "missing required argument `limit` for `strict`",
        "path": [
          "strict"
        ],
        "code": "VALIDATION_ERROR"
      },
      {
        "message": "Hobby with id 1 already exists",
        "path": [
          "reseed"
        ],
        "code": "DUPLICATE_ID"
      },
      {
        "message": "contract violation: `misdeclared` is declared to return Optional Hobby, got a list",
        "path": [
          "misdeclared"
        ],
        "code": "INTERNAL_SERVER_ERROR"
      }
    ]
    "#);
}

#[tokio::test]
async fn exhausted_ids_surface_as_an_internal_error() {
    let engine = build_engine(Dataset {
        hobbies: vec![],
        people: vec![Person {
            id: MAX_RECORD_ID,
            name: "Ada".to_string(),
            hobbies: vec![],
        }],
    })
    .unwrap();
    let schema = build_schema(engine, SchemaOptions::default()).unwrap();

    let response = execute(&schema, "{ person(id: 2147483647) { name } }").await;
    insta::assert_json_snapshot!(response, @r#"
    {
      "data": {
        "person": {
          "name": "Ada"
        }
      }
    }
    "#);

    let response = execute(
        &schema,
        r#"mutation { addPerson(person: { name: "Grace", hobbies: [] }) { id } }"#,
    )
    .await;

    assert_eq!(Value::Null, response["data"]);
    insta::assert_json_snapshot!(errors(&response), @r#"
    [
      {
        "message": "no Person ids left to allocate",
        "path": [
          "addPerson"
        ],
        "code": "INTERNAL_SERVER_ERROR"
      }
    ]
    "#);
}
