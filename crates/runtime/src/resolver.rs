//! Executing resolver plans
//!
//! A call runs in four steps: verify security, rebuild the request from the
//! field arguments, issue one fetch, then shape the response for the field's
//! result type. All state is local to the call.

use crate::auth::VerifyAuth;
use crate::connection::convert_array_to_connection;
use crate::cursor::{derive_window, CursorArgs};
use crate::fetch::{Fetch, FetchRequest};
use crate::{Result, RuntimeError};
use serde_json::{Map, Value};
use std::sync::Arc;
use swagger_graphql_common::{
    BodyMapping, BodyReader, BodyTemplate, ObjectMapping, ParamBinding, ResolverPlan,
    ResponseShape,
};
use tracing::debug;

/// Host capabilities a resolver call runs against
#[derive(Clone)]
pub struct ResolverContext {
    fetch: Arc<dyn Fetch>,
    verify_auth: Option<Arc<dyn VerifyAuth>>,
}

impl ResolverContext {
    pub fn new(fetch: impl Fetch + 'static) -> Self {
        Self {
            fetch: Arc::new(fetch),
            verify_auth: None,
        }
    }

    /// Install an authorization hook
    pub fn with_verify_auth(mut self, verify_auth: impl VerifyAuth + 'static) -> Self {
        self.verify_auth = Some(Arc::new(verify_auth));
        self
    }
}

/// Run `plan` for one field invocation with `arguments`
pub async fn execute(
    plan: &ResolverPlan,
    arguments: &Map<String, Value>,
    ctx: &ResolverContext,
) -> Result<Value> {
    if let (Some(security), Some(verify_auth)) = (&plan.security, &ctx.verify_auth) {
        verify_auth
            .verify(security)
            .map_err(RuntimeError::Unauthorized)?;
    }

    let mut options = arguments.clone();
    if let Some(mapping) = &plan.body_mapping {
        restore_body_keys(&mut options, mapping);
    }

    let request = build_request(plan, &options)?;
    debug!(
        endpoint = %plan.operation_id,
        method = %request.method,
        path = %plan.request.path,
        "dispatching fetch"
    );

    let response = ctx
        .fetch
        .fetch(&plan.request.path, request)
        .await
        .map_err(RuntimeError::Fetch)?;

    let data = match plan.body_reader {
        BodyReader::Json => response.json()?,
        BodyReader::Text => Value::String(response.text().to_string()),
    };

    shape_response(&plan.response, data, options)
}

/// Rename legalized keys of the body argument back to their original keys
///
/// The walk follows the value, so nested objects are restored at any depth
/// and list elements one by one.
pub fn restore_body_keys(options: &mut Map<String, Value>, mapping: &BodyMapping) {
    if let Some(body) = options.get_mut(&mapping.argument) {
        restore_value(body, 0, &mapping.objects);
    }
}

fn restore_value(value: &mut Value, object: usize, objects: &[ObjectMapping]) {
    match value {
        Value::Array(items) => {
            for item in items {
                restore_value(item, object, objects);
            }
        }
        Value::Object(map) => {
            let Some(shape) = objects.get(object) else {
                return;
            };
            for field in &shape.fields {
                let Some(mut child) = map.remove(&field.name) else {
                    continue;
                };
                if let Some(nested) = field.object {
                    restore_value(&mut child, nested, objects);
                }
                map.insert(field.original_name.clone(), child);
            }
        }
        _ => {}
    }
}

/// Assemble the fetch options from the request template
pub fn build_request(plan: &ResolverPlan, options: &Map<String, Value>) -> Result<FetchRequest> {
    let template = &plan.request;

    let mut qs = bind(&template.query, options);
    if template.paginate {
        let window = derive_window(&CursorArgs::from_arguments(options))?;
        let qs = qs.get_or_insert_with(Map::new);
        if let Some(offset) = window.offset {
            qs.insert("offset".to_string(), Value::from(offset));
        }
        if let Some(limit) = window.limit {
            qs.insert("limit".to_string(), Value::from(limit));
        }
    }

    let json = match &template.body {
        Some(BodyTemplate::Argument(argument)) => options.get(argument).cloned(),
        Some(BodyTemplate::Form(bindings)) => bind(bindings, options).map(Value::Object),
        None => None,
    };

    Ok(FetchRequest {
        method: template.method.clone(),
        endpoint_name: plan.operation_id.clone(),
        qs,
        path_params: bind(&template.path_params, options),
        headers: bind(&template.headers, options),
        json,
    })
}

/// Wire-named values of the supplied arguments; `None` when nothing is bound
fn bind(bindings: &[ParamBinding], options: &Map<String, Value>) -> Option<Map<String, Value>> {
    if bindings.is_empty() {
        return None;
    }

    Some(
        bindings
            .iter()
            .filter_map(|binding| {
                options
                    .get(&binding.argument)
                    .map(|value| (binding.name.clone(), value.clone()))
            })
            .collect(),
    )
}

/// Shape a fetched body into the field's result value
pub fn shape_response(
    shape: &ResponseShape,
    data: Value,
    options: Map<String, Value>,
) -> Result<Value> {
    match shape {
        ResponseShape::Empty => {
            let mut envelope = Map::new();
            envelope.insert("rawResponseBody".to_string(), data);
            envelope.insert("rawInputOptions".to_string(), Value::Object(options));
            Ok(Value::Object(envelope))
        }
        ResponseShape::Connection {
            root_property: None,
        } => convert_array_to_connection(None, into_nodes(data)?),
        ResponseShape::Connection {
            root_property: Some(property),
        } => {
            let Value::Object(envelope) = data else {
                return Err(RuntimeError::UnexpectedResponse(format!(
                    "expected an object holding '{}'",
                    property
                )));
            };
            let nodes = into_nodes(envelope.get(property).cloned().unwrap_or(Value::Null))?;
            convert_array_to_connection(Some(&envelope), nodes)
        }
        ResponseShape::RootProperty { property } => {
            Ok(data.get(property).cloned().unwrap_or(Value::Null))
        }
        ResponseShape::Plain => Ok(data),
    }
}

fn into_nodes(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(nodes) => Ok(nodes),
        Value::Null => Ok(Vec::new()),
        other => Err(RuntimeError::UnexpectedResponse(format!(
            "expected a list, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MockVerifyAuth;
    use crate::cursor::{encode_offset, NOOP_CURSOR};
    use crate::fetch::{FetchResponse, MockFetch};
    use serde_json::json;
    use swagger_graphql_common::{FieldMapping, RequestTemplate, SecurityConfig};

    fn plan(request: RequestTemplate, response: ResponseShape) -> ResolverPlan {
        ResolverPlan {
            operation_id: "testOp".to_string(),
            request,
            security: None,
            body_mapping: None,
            response,
            body_reader: BodyReader::Json,
        }
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_plain_get() {
        let mut fetch = MockFetch::new();
        fetch
            .expect_fetch()
            .withf(|path, request| {
                path == "/pets/{petId}"
                    && request.method == "GET"
                    && request.endpoint_name == "testOp"
                    && request.path_params == json!({"petId": "7"}).as_object().cloned()
                    && request.qs.is_none()
            })
            .times(1)
            .returning(|_, _| Ok(FetchResponse::new(r#"{"id": "7"}"#)));

        let plan = plan(
            RequestTemplate {
                path: "/pets/{petId}".to_string(),
                method: "GET".to_string(),
                path_params: vec![ParamBinding::new("petId", "petId")],
                ..Default::default()
            },
            ResponseShape::Plain,
        );

        let value = execute(&plan, &args(json!({"petId": "7"})), &ResolverContext::new(fetch))
            .await
            .unwrap();
        assert_eq!(value, json!({"id": "7"}));
    }

    #[tokio::test]
    async fn test_connection_merges_window_into_query() {
        let mut fetch = MockFetch::new();
        fetch
            .expect_fetch()
            .withf(|_, request| {
                request.qs == json!({"tag": "dog", "offset": 25, "limit": 2}).as_object().cloned()
            })
            .returning(|_, _| {
                Ok(FetchResponse::new(
                    r#"{"pagination": {"offset": 25, "count": 100}, "items": [{"id": 1}, {"id": 2}]}"#,
                ))
            });

        let plan = plan(
            RequestTemplate {
                path: "/pets".to_string(),
                method: "GET".to_string(),
                query: vec![ParamBinding::new("tag", "tag")],
                paginate: true,
                ..Default::default()
            },
            ResponseShape::Connection {
                root_property: Some("items".to_string()),
            },
        );

        let arguments = args(json!({"tag": "dog", "first": 2, "after": encode_offset(24)}));
        let value = execute(&plan, &arguments, &ResolverContext::new(fetch))
            .await
            .unwrap();

        assert_eq!(value["totalCount"], 100);
        assert_eq!(value["edges"][0]["cursor"], encode_offset(25));
        assert_eq!(value["pageInfo"]["hasPreviousPage"], true);
        assert_eq!(value["items"], json!([{"id": 1}, {"id": 2}]));
    }

    #[tokio::test]
    async fn test_bare_list_connection() {
        let mut fetch = MockFetch::new();
        fetch
            .expect_fetch()
            .withf(|_, request| request.qs == Some(Map::new()))
            .returning(|_, _| Ok(FetchResponse::new(r#"[1, 2]"#)));

        let plan = plan(
            RequestTemplate {
                path: "/numbers".to_string(),
                method: "GET".to_string(),
                paginate: true,
                ..Default::default()
            },
            ResponseShape::Connection {
                root_property: None,
            },
        );

        let value = execute(&plan, &Map::new(), &ResolverContext::new(fetch))
            .await
            .unwrap();
        assert_eq!(value["totalCount"], 2);
        assert_eq!(value["edges"][1]["cursor"], NOOP_CURSOR);
        assert_eq!(value["nodes"], json!([1, 2]));
    }

    #[tokio::test]
    async fn test_malformed_cursor_aborts_before_fetch() {
        let mut fetch = MockFetch::new();
        fetch.expect_fetch().never();

        let plan = plan(
            RequestTemplate {
                path: "/pets".to_string(),
                method: "GET".to_string(),
                paginate: true,
                ..Default::default()
            },
            ResponseShape::Connection {
                root_property: None,
            },
        );

        let err = execute(
            &plan,
            &args(json!({"first": 1, "after": "bogus"})),
            &ResolverContext::new(fetch),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RuntimeError::Cursor(_)));
    }

    #[tokio::test]
    async fn test_empty_response_envelope() {
        let mut fetch = MockFetch::new();
        fetch
            .expect_fetch()
            .returning(|_, _| Ok(FetchResponse::new("deleted")));

        let mut plan = plan(
            RequestTemplate {
                path: "/pets/{petId}".to_string(),
                method: "DELETE".to_string(),
                path_params: vec![ParamBinding::new("petId", "petId")],
                ..Default::default()
            },
            ResponseShape::Empty,
        );
        plan.body_reader = BodyReader::Text;

        let value = execute(&plan, &args(json!({"petId": "1"})), &ResolverContext::new(fetch))
            .await
            .unwrap();
        assert_eq!(
            value,
            json!({"rawResponseBody": "deleted", "rawInputOptions": {"petId": "1"}})
        );
    }

    #[tokio::test]
    async fn test_root_property_and_restored_body_keys() {
        let mut fetch = MockFetch::new();
        fetch
            .expect_fetch()
            .withf(|_, request| {
                request.json
                    == Some(json!({"1": "one", "inner": {"bad-name": 2}, "ok": true}))
            })
            .returning(|_, _| Ok(FetchResponse::new(r#"{"thing": {"id": 9}}"#)));

        let mut plan = plan(
            RequestTemplate {
                path: "/things".to_string(),
                method: "POST".to_string(),
                body: Some(BodyTemplate::Argument("thing".to_string())),
                ..Default::default()
            },
            ResponseShape::RootProperty {
                property: "thing".to_string(),
            },
        );
        plan.body_mapping = Some(BodyMapping {
            argument: "thing".to_string(),
            objects: vec![
                ObjectMapping {
                    fields: vec![
                        renamed("_1", "1", None),
                        renamed("inner", "inner", Some(1)),
                    ],
                },
                ObjectMapping {
                    fields: vec![renamed("badName", "bad-name", None)],
                },
            ],
        });

        let arguments = args(json!({"thing": {"_1": "one", "inner": {"badName": 2}, "ok": true}}));
        let value = execute(&plan, &arguments, &ResolverContext::new(fetch))
            .await
            .unwrap();
        assert_eq!(value, json!({"id": 9}));
    }

    #[tokio::test]
    async fn test_form_body() {
        let mut fetch = MockFetch::new();
        fetch
            .expect_fetch()
            .withf(|_, request| request.json == Some(json!({"user_name": "ann"})))
            .returning(|_, _| Ok(FetchResponse::new("true")));

        let plan = plan(
            RequestTemplate {
                path: "/login".to_string(),
                method: "POST".to_string(),
                body: Some(BodyTemplate::Form(vec![
                    ParamBinding::new("user_name", "userName"),
                    ParamBinding::new("password", "password"),
                ])),
                ..Default::default()
            },
            ResponseShape::Plain,
        );

        let value = execute(&plan, &args(json!({"userName": "ann"})), &ResolverContext::new(fetch))
            .await
            .unwrap();
        assert_eq!(value, json!(true));
    }

    #[tokio::test]
    async fn test_security_hook() {
        let security = SecurityConfig {
            security: vec![[("api_key".to_string(), Vec::new())].into_iter().collect()],
            ..Default::default()
        };

        let mut fetch = MockFetch::new();
        fetch.expect_fetch().never();
        let mut verify = MockVerifyAuth::new();
        verify
            .expect_verify()
            .withf(|config| config.security[0].contains_key("api_key"))
            .times(1)
            .returning(|_| Err("missing api key".to_string()));

        let mut plan = plan(
            RequestTemplate {
                path: "/secret".to_string(),
                method: "GET".to_string(),
                ..Default::default()
            },
            ResponseShape::Plain,
        );
        plan.security = Some(security);

        let ctx = ResolverContext::new(fetch).with_verify_auth(verify);
        let err = execute(&plan, &Map::new(), &ctx).await.unwrap_err();
        assert!(matches!(err, RuntimeError::Unauthorized(ref reason) if reason == "missing api key"));
    }

    #[tokio::test]
    async fn test_hook_skipped_without_security() {
        let mut fetch = MockFetch::new();
        fetch
            .expect_fetch()
            .returning(|_, _| Ok(FetchResponse::new("{}")));
        let mut verify = MockVerifyAuth::new();
        verify.expect_verify().never();

        let plan = plan(
            RequestTemplate {
                path: "/open".to_string(),
                method: "GET".to_string(),
                ..Default::default()
            },
            ResponseShape::Plain,
        );

        let ctx = ResolverContext::new(fetch).with_verify_auth(verify);
        assert_eq!(execute(&plan, &Map::new(), &ctx).await.unwrap(), json!({}));
    }

    fn renamed(name: &str, original_name: &str, object: Option<usize>) -> FieldMapping {
        FieldMapping {
            name: name.to_string(),
            original_name: original_name.to_string(),
            object,
        }
    }

    fn tree_mapping() -> BodyMapping {
        BodyMapping {
            argument: "tree".to_string(),
            objects: vec![
                ObjectMapping {
                    fields: vec![
                        renamed("treeLabel", "tree-label", None),
                        renamed("subTree", "sub-tree", Some(0)),
                        renamed("leaves", "leaves", Some(1)),
                    ],
                },
                ObjectMapping {
                    fields: vec![renamed("leafName", "leaf-name", None)],
                },
            ],
        }
    }

    #[test]
    fn test_restore_recursive_body() {
        let mut options = args(json!({"tree": {
            "treeLabel": "a",
            "subTree": {"treeLabel": "b", "subTree": {"treeLabel": "c"}}
        }}));
        restore_body_keys(&mut options, &tree_mapping());

        assert_eq!(
            Value::Object(options),
            json!({"tree": {
                "tree-label": "a",
                "sub-tree": {"tree-label": "b", "sub-tree": {"tree-label": "c"}}
            }})
        );
    }

    #[test]
    fn test_restore_list_elements() {
        let mut options = args(json!({"tree": {
            "leaves": [{"leafName": "x"}, {"leafName": "y"}, null],
            "subTree": {"leaves": [{"leafName": "z"}]}
        }}));
        restore_body_keys(&mut options, &tree_mapping());

        assert_eq!(
            Value::Object(options),
            json!({"tree": {
                "leaves": [{"leaf-name": "x"}, {"leaf-name": "y"}, null],
                "sub-tree": {"leaves": [{"leaf-name": "z"}]}
            }})
        );
    }

    #[test]
    fn test_restore_ignores_missing_body() {
        let mut options = args(json!({"other": 1}));
        restore_body_keys(&mut options, &tree_mapping());
        assert_eq!(Value::Object(options), json!({"other": 1}));
    }
}
