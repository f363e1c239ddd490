//! Request body serialization and response body deserialization.
//!
//! # Design
//! Member names come from the type's serde derive on both directions, so a
//! body always reads back into the shape that produced it. Wire DTOs opt
//! into camelCase with `#[serde(rename_all = "camelCase")]`; map keys are
//! data and go out exactly as given. A missing payload still produces an
//! (empty) JSON body so the content type is never omitted.
//!
//! On the way back, an empty or whitespace-only body is not an error and
//! yields the target's `Default`. Anything else must parse.

use std::fmt::Display;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::http::{APPLICATION_JSON, APPLICATION_JSON_UTF8};

/// Body of a POST, PUT or PATCH request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    /// No payload. Sent as an empty JSON body.
    #[default]
    Empty,
    /// Structured JSON.
    Json(Value),
    /// Sent verbatim, without structured serialization.
    Raw(String),
}

impl Payload {
    /// Serialize `data` now, with the member names its `Serialize` impl picks.
    pub fn json<B>(data: &B) -> Result<Self>
    where
        B: Serialize + ?Sized,
    {
        serde_json::to_value(data)
            .map(Payload::Json)
            .map_err(ApiError::Serialization)
    }

    /// String cast of `data`, sent as-is.
    pub fn raw(data: impl Display) -> Self {
        Payload::Raw(data.to_string())
    }

    /// Flag-style constructor: `dont_serialize` picks the string cast over JSON.
    /// A missing value casts to an empty raw body.
    pub fn from_data<B>(data: Option<&B>, dont_serialize: bool) -> Result<Self>
    where
        B: Serialize + Display + ?Sized,
    {
        match (data, dont_serialize) {
            (None, true) => Ok(Payload::Raw(String::new())),
            (None, false) => Ok(Payload::Empty),
            (Some(data), true) => Ok(Payload::raw(data)),
            (Some(data), false) => Payload::json(data),
        }
    }

    /// Body text and content type to put on the wire.
    pub fn into_body(self) -> Result<(String, &'static str)> {
        match self {
            Payload::Empty => Ok((String::new(), APPLICATION_JSON)),
            Payload::Json(value) => {
                let body = serde_json::to_string(&value).map_err(ApiError::Serialization)?;
                Ok((body, APPLICATION_JSON))
            }
            Payload::Raw(text) => Ok((text, APPLICATION_JSON_UTF8)),
        }
    }
}

/// Serialize an optional value to a JSON body. `None` yields `""`.
pub fn serialize_body<B>(data: Option<&B>) -> Result<String>
where
    B: Serialize + ?Sized,
{
    match data {
        None => Ok(String::new()),
        Some(data) => Payload::json(data)?.into_body().map(|(body, _)| body),
    }
}

/// Parse a response body into `T`, or `T::default()` when the body is blank.
pub fn deserialize_body<T>(body: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if body.trim().is_empty() {
        tracing::trace!("empty response body, using default value");
        return Ok(T::default());
    }
    serde_json::from_str(body).map_err(ApiError::Deserialization)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Order {
        order_id: u64,
        customer_name: String,
        lines: Vec<Line>,
    }

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Line {
        unit_price: f64,
    }

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Person {
        first_name: String,
        age: u32,
    }

    #[test]
    fn camel_case_dto_goes_out_camel_cased() {
        let order = Order {
            order_id: 7,
            customer_name: "Grace".to_string(),
            lines: vec![Line { unit_price: 9.5 }],
        };
        let (body, content_type) = Payload::json(&order).unwrap().into_body().unwrap();
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["orderId"], 7);
        assert_eq!(value["customerName"], "Grace");
        assert_eq!(value["lines"][0]["unitPrice"], 9.5);
        assert_eq!(content_type, APPLICATION_JSON);
    }

    #[test]
    fn map_keys_are_sent_as_given() {
        let map = BTreeMap::from([("user_id", 1), ("userId", 2), ("field_1", 3)]);
        let value: Value = serde_json::from_str(&serialize_body(Some(&map)).unwrap()).unwrap();
        let fields = value.as_object().unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(value["user_id"], 1);
        assert_eq!(value["userId"], 2);
        assert_eq!(value["field_1"], 3);
    }

    #[test]
    fn empty_payload_is_empty_json_body() {
        let (body, content_type) = Payload::Empty.into_body().unwrap();
        assert_eq!(body, "");
        assert_eq!(content_type, APPLICATION_JSON);
        assert_eq!(serialize_body::<Order>(None).unwrap(), "");
    }

    #[test]
    fn raw_payload_is_sent_verbatim() {
        let (body, content_type) = Payload::raw("{not: json}").into_body().unwrap();
        assert_eq!(body, "{not: json}");
        assert_eq!(content_type, APPLICATION_JSON_UTF8);
    }

    #[test]
    fn from_data_follows_dont_serialize_flag() {
        assert_eq!(Payload::from_data::<str>(None, false).unwrap(), Payload::Empty);
        assert_eq!(
            Payload::from_data(Some("hello"), true).unwrap(),
            Payload::Raw("hello".to_string())
        );
        assert_eq!(
            Payload::from_data(Some("hello"), false).unwrap(),
            Payload::Json(Value::String("hello".to_string()))
        );
    }

    #[test]
    fn missing_raw_data_keeps_raw_content_type() {
        let payload = Payload::from_data::<str>(None, true).unwrap();
        let (body, content_type) = payload.into_body().unwrap();
        assert_eq!(body, "");
        assert_eq!(content_type, APPLICATION_JSON_UTF8);
    }

    #[test]
    fn blank_body_yields_default() {
        let order: Order = deserialize_body("").unwrap();
        assert_eq!(order, Order::default());
        let things: Vec<Order> = deserialize_body("  \n").unwrap();
        assert!(things.is_empty());
        let maybe: Option<Order> = deserialize_body("").unwrap();
        assert!(maybe.is_none());
    }

    #[test]
    fn malformed_body_is_a_parse_error() {
        let err = deserialize_body::<Order>("<html>oops</html>").unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn serialized_body_reads_back_into_same_shape() {
        let order = Order {
            order_id: 7,
            customer_name: "Grace".to_string(),
            lines: vec![Line { unit_price: 9.5 }],
        };
        let body = serialize_body(Some(&order)).unwrap();
        let back: Order = deserialize_body(&body).unwrap();
        assert_eq!(back, order);
    }

    #[test]
    fn plain_struct_reads_back_into_same_shape() {
        let person = Person {
            first_name: "Ada".to_string(),
            age: 36,
        };
        let body = serialize_body(Some(&person)).unwrap();
        let back: Person = deserialize_body(&body).unwrap();
        assert_eq!(back, person);
    }
}
