use crate::domain::model::{MonetizationType, Offer, ServiceName, ServiceOffers};
use std::collections::{HashMap, HashSet};

/// 依 monetization type 篩選 offers，並以服務顯示名稱分組。
///
/// `allowed` 為空時不篩選。分組順序為各服務在輸入中第一次出現的順序；
/// 同一服務的多筆 offers 全部保留。
pub fn filter_and_group(offers: &[Offer], allowed: &HashSet<MonetizationType>) -> Vec<ServiceOffers> {
    let mut groups: Vec<ServiceOffers> = Vec::new();
    let mut positions: HashMap<ServiceName, usize> = HashMap::new();

    for offer in offers
        .iter()
        .filter(|offer| allowed.is_empty() || allowed.contains(&offer.monetization_type))
    {
        let service = offer.service_name();
        match positions.get(&service) {
            Some(&position) => groups[position].offers.push(offer.clone()),
            None => {
                positions.insert(service.clone(), groups.len());
                groups.push(ServiceOffers {
                    service,
                    offers: vec![offer.clone()],
                });
            }
        }
    }

    groups
}

pub fn service_names(groups: &[ServiceOffers]) -> Vec<ServiceName> {
    groups.iter().map(|group| group.service.clone()).collect()
}
