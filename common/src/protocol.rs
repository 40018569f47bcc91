//! リモート設定ドキュメント
//!
//! 設定配信サーバーが返すJSONの形式:
//!
//! ```json
//! {
//!   "https://service1.api.com": ["192.168.1.10:8080", "192.168.1.11:8080"],
//!   "https://service2.api.com": ["10.0.0.5:3000"]
//! }
//! ```

use serde::Deserialize;
use std::collections::HashMap;

use crate::error::CommonResult;
use crate::types::EndpointMap;

/// リモート設定ドキュメント
///
/// 値が `null` のキーはアドレス0件のキーとして扱う。
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct EndpointDocument {
    entries: HashMap<String, Option<Vec<String>>>,
}

impl EndpointDocument {
    /// JSONバイト列からデコード
    pub fn from_slice(body: &[u8]) -> CommonResult<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// [`EndpointMap`] に変換
    pub fn into_endpoint_map(self) -> EndpointMap {
        self.entries
            .into_iter()
            .map(|(key, addrs)| (key, addrs.unwrap_or_default()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_document() {
        let body = br#"{"svc":["10.0.0.1:80","10.0.0.2:80"],"other":["10.0.0.3:443"]}"#;
        let map = EndpointDocument::from_slice(body).unwrap().into_endpoint_map();

        assert_eq!(map.len(), 2);
        assert_eq!(map["svc"], vec!["10.0.0.1:80", "10.0.0.2:80"]);
        assert_eq!(map["other"], vec!["10.0.0.3:443"]);
    }

    #[test]
    fn test_decode_null_value_as_empty_list() {
        let map = EndpointDocument::from_slice(br#"{"svc":null}"#)
            .unwrap()
            .into_endpoint_map();

        assert_eq!(map["svc"], Vec::<String>::new());
    }

    #[test]
    fn test_decode_empty_object() {
        let map = EndpointDocument::from_slice(b"{}").unwrap().into_endpoint_map();
        assert!(map.is_empty());
    }

    #[test]
    fn test_decode_rejects_wrong_shapes() {
        // 配列のトップレベル
        assert!(EndpointDocument::from_slice(br#"["10.0.0.1:80"]"#).is_err());
        // 値が文字列
        assert!(EndpointDocument::from_slice(br#"{"svc":"10.0.0.1:80"}"#).is_err());
        // 配列要素が数値
        assert!(EndpointDocument::from_slice(br#"{"svc":[8080]}"#).is_err());
        // 壊れたJSON
        assert!(EndpointDocument::from_slice(br#"{"svc":["#).is_err());
    }
}
