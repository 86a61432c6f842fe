//! Declarative endpoint tables
//!
//! Each adapter declares its REST surface as `{tier: {verb: {path: weight}}}`.
//! Weights are relative rate-limit costs; scheduling against them happens
//! outside this crate.

use serde_json::Value;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::safe::{value_to_string, Params};
use crate::adapters::types::HttpMethod;

/// Access tier of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiTier {
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Endpoint {
    pub tier: ApiTier,
    pub method: HttpMethod,
    pub path: &'static str,
    pub weight: f64,
}

/// Build a `&'static [Endpoint]` from `tier method "path" => weight` rows.
#[macro_export]
macro_rules! endpoint_table {
    ($($tier:ident $method:ident $path:literal => $weight:expr),* $(,)?) => {
        &[
            $($crate::adapters::endpoints::Endpoint {
                tier: $crate::adapters::endpoints::ApiTier::$tier,
                method: $crate::adapters::types::HttpMethod::$method,
                path: $path,
                weight: $weight,
            }),*
        ]
    };
}

#[derive(Debug, Clone, Copy)]
pub struct EndpointTable {
    pub endpoints: &'static [Endpoint],
}

impl EndpointTable {
    pub const fn new(endpoints: &'static [Endpoint]) -> Self {
        Self { endpoints }
    }

    pub fn find(&self, tier: ApiTier, method: HttpMethod, path: &str) -> Option<&Endpoint> {
        self.endpoints
            .iter()
            .find(|e| e.tier == tier && e.method == method && e.path == path)
    }

    pub fn weight(&self, tier: ApiTier, method: HttpMethod, path: &str) -> Option<f64> {
        self.find(tier, method, path).map(|e| e.weight)
    }

    /// Fail with `NotSupported` for routes the venue does not declare
    pub fn ensure(&self, exchange: &str, tier: ApiTier, method: HttpMethod, path: &str) -> ExchangeResult<&Endpoint> {
        self.find(tier, method, path).ok_or_else(|| {
            ExchangeError::NotSupported(format!(
                "{} has no {:?} {} {} endpoint",
                exchange, tier, method, path
            ))
        })
    }
}

/// Substitute `{name}` placeholders from `params`, removing used keys
pub fn implode_path(path: &str, params: &mut Params) -> String {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        match rest[start..].find('}') {
            Some(end) => {
                let key = &rest[start + 1..start + end];
                match params.remove(key).as_ref().and_then(value_to_string) {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(&rest[start..=start + end]),
                }
                rest = &rest[start + end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn encode_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `k=v&k=v` with percent-encoded values, in key order
pub fn urlencode(params: &Params) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(&encode_value(v))))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TABLE: EndpointTable = EndpointTable::new(crate::endpoint_table![
        Public Get "api/depth/{pair}" => 5.0,
        Private Post "orders/cancel" => 0.5,
    ]);

    #[test]
    fn test_weight_lookup() {
        assert_eq!(TABLE.weight(ApiTier::Public, HttpMethod::Get, "api/depth/{pair}"), Some(5.0));
        assert_eq!(TABLE.weight(ApiTier::Private, HttpMethod::Post, "orders/cancel"), Some(0.5));
        assert_eq!(TABLE.weight(ApiTier::Public, HttpMethod::Post, "orders/cancel"), None);
    }

    #[test]
    fn test_ensure_unknown_route() {
        let err = TABLE.ensure("indodax", ApiTier::Public, HttpMethod::Get, "nope").unwrap_err();
        assert!(matches!(err, ExchangeError::NotSupported(_)));
    }

    #[test]
    fn test_implode_path_consumes_params() {
        let mut params = Params::new();
        params.insert("pair".into(), json!("btc_idr"));
        params.insert("limit".into(), json!(5));
        assert_eq!(implode_path("api/depth/{pair}", &mut params), "api/depth/btc_idr");
        assert!(params.get("pair").is_none());
        assert!(params.get("limit").is_some());
    }

    #[test]
    fn test_urlencode_sorted_and_escaped() {
        let mut params = Params::new();
        params.insert("symbol".into(), json!("BTC USDT"));
        params.insert("limit".into(), json!(10));
        assert_eq!(urlencode(&params), "limit=10&symbol=BTC%20USDT");
    }
}
