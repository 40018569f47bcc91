//! Property-based tests for endpoint selection

use endpoint_finder::balancer::Selector;
use endpoint_finder::common::types::endpoint_map;
use endpoint_finder::registry::EndpointStore;
use proptest::prelude::*;

proptest! {
    /// 稼働中が1つでもあれば必ず選ばれ、選ばれるのは稼働中のみ
    #[test]
    fn select_one_only_returns_healthy(flags in proptest::collection::vec(any::<bool>(), 0..16)) {
        let addresses: Vec<String> = (0..flags.len()).map(|i| format!("10.0.0.{}:80", i + 1)).collect();
        let store = EndpointStore::from_map(endpoint_map([("svc", addresses.clone())]));
        let list = store.lookup("svc").unwrap_or_default();
        for (endpoint, healthy) in list.iter().zip(&flags) {
            endpoint.set_healthy(*healthy);
        }
        let selector = Selector::new(store);

        let healthy: Vec<&String> = addresses
            .iter()
            .zip(&flags)
            .filter(|(_, h)| **h)
            .map(|(a, _)| a)
            .collect();

        for _ in 0..8 {
            match selector.select_one("svc") {
                Some(addr) => prop_assert!(healthy.contains(&&addr)),
                None => prop_assert!(healthy.is_empty()),
            }
        }
    }

    /// リセット後は新しいアドレスだけが選ばれる
    #[test]
    fn reset_replaces_selection_domain(n in 1usize..8) {
        let store = EndpointStore::from_map(endpoint_map([("svc", vec!["192.168.0.1:80"])]));
        let selector = Selector::new(store.clone());
        let fresh: Vec<String> = (0..n).map(|i| format!("172.16.0.{}:443", i + 1)).collect();

        store.reset(endpoint_map([("svc", fresh.clone())]));

        let picked = selector.select_one("svc");
        prop_assert!(picked.map(|a| fresh.contains(&a)).unwrap_or(false));
    }
}
